use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::models::User;

/// The persisted "session" record. This is the demo's stand-in for browser
/// local storage: exactly one current-user record, loaded at startup, saved
/// on login and removed on logout.
pub trait UserStorage: Send + Sync {
    fn load(&self) -> Result<Option<User>, StorageError>;
    fn save(&self, user: &User) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error")]
    Io(#[from] io::Error),
    #[error("stored user record is not valid JSON")]
    Serde(#[from] serde_json::Error),
}

/// JSON file on disk, one user record per file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UserStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<User>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let user = serde_json::from_str(&contents)?;
                Ok(Some(user))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, user: &User) -> Result<(), StorageError> {
        debug!(path = %self.path.display(), user = %user.id, "persisting current user");
        fs::write(&self.path, serde_json::to_string_pretty(user)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use uuid::Uuid;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "priya@example.com".to_string(),
            name: "priya".to_string(),
            role: Role::User,
            department: "Computer Science".to_string(),
            phone: "9876543210".to_string(),
            srm_email: "sample@srmist.edu.in".to_string(),
            personal_email: "priya@example.com".to_string(),
            section: "C".to_string(),
        }
    }

    fn temp_storage() -> JsonFileStorage {
        let path = std::env::temp_dir().join(format!("universe_user_{}.json", Uuid::new_v4()));
        JsonFileStorage::new(path)
    }

    #[test]
    fn load_on_missing_file_is_none() {
        let storage = temp_storage();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let storage = temp_storage();
        let user = sample_user();
        storage.save(&user).unwrap();
        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded.id, user.id);
        assert_eq!(loaded.email, user.email);
        storage.clear().unwrap();
    }

    #[test]
    fn clear_removes_the_record_and_is_idempotent() {
        let storage = temp_storage();
        storage.save(&sample_user()).unwrap();
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        // Clearing an already-cleared store is fine.
        storage.clear().unwrap();
    }
}
