mod auth;
mod checkout;
mod config;
mod error;
mod models;
mod qr;
mod router;
mod routes;
mod storage;
mod store;
mod util;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::storage::{JsonFileStorage, UserStorage};
use crate::store::UniverseStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let storage: Arc<dyn UserStorage> = Arc::new(JsonFileStorage::new(&config.user_store_path));
    let store = Arc::new(UniverseStore::new());

    // Restore the persisted current-user record, if one survived a previous
    // run without logging out.
    if let Some(user) = storage.load()? {
        info!(user = %user.id, "restored persisted user");
        store.upsert_user(user);
    }

    let bind_addr = config.bind_addr.clone();
    let app = router::create_router(store, storage, Arc::new(config));

    let listener = TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(router::shutdown_signal())
        .await?;

    Ok(())
}
