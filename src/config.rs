use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub rust_log: String,
    /// Where the persisted current-user record lives.
    pub user_store_path: PathBuf,
    /// Artificial delay applied to login and checkout submits to mimic a
    /// network round trip. Set to 0 to disable.
    pub simulated_latency: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // A .env file is optional; plain environment variables work too.
        dotenvy::dotenv().ok();
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "debug".into());
        let user_store_path = env::var("USER_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("universe_user.json"));
        let latency_ms = match env::var("SIMULATED_LATENCY_MS") {
            Ok(raw) => raw.parse::<u64>()?,
            Err(_) => 750,
        };

        Ok(Self {
            bind_addr,
            rust_log,
            user_store_path,
            simulated_latency: Duration::from_millis(latency_ms),
        })
    }
}
