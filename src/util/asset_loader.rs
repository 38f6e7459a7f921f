use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use minijinja::{Environment, Error, State};
use sha2::{Digest, Sha256};

const STATIC_DIR: &str = "static";

/// Exposes an `asset(path)` template function that appends a content hash to
/// static asset URLs so browsers pick up changed files. Hashes are computed
/// once per path and cached for the process lifetime.
#[derive(Debug, Default)]
pub struct AssetLoader {
    cache: RwLock<HashMap<String, String>>,
}

impl AssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asset_path(&self, path: &str) -> String {
        if let Some(hashed) = self.cache.read().unwrap().get(path) {
            return hashed.clone();
        }

        let file_path = Path::new(STATIC_DIR).join(path);
        let hashed = match fs::read(file_path) {
            Ok(contents) => {
                let mut hasher = Sha256::new();
                hasher.update(contents);
                format!("/{}/{}?v={:x}", STATIC_DIR, path, hasher.finalize())
            }
            // Missing files get an unhashed URL; the 404 shows up in the
            // browser rather than breaking template rendering.
            Err(_) => format!("/{}/{}", STATIC_DIR, path),
        };

        self.cache
            .write()
            .unwrap()
            .insert(path.to_string(), hashed.clone());
        hashed
    }

    pub fn register(&self, env: &mut Environment<'_>) {
        let loader = self.clone();
        env.add_function(
            "asset",
            move |_state: &State, path: String| -> Result<String, Error> {
                Ok(loader.asset_path(&path))
            },
        );
    }
}

impl Clone for AssetLoader {
    fn clone(&self) -> Self {
        AssetLoader {
            cache: RwLock::new(self.cache.read().unwrap().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_assets_fall_back_to_plain_urls() {
        let loader = AssetLoader::new();
        assert_eq!(
            loader.asset_path("does-not-exist.css"),
            "/static/does-not-exist.css"
        );
    }
}
