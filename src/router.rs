use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, get_service, post},
};
use axum_login::{
    AuthManagerLayerBuilder,
    tower_sessions::{
        Expiry, MemoryStore, SessionManagerLayer,
        cookie::{SameSite, time},
    },
};
use chrono::{DateTime, NaiveDate};
use minijinja::Environment;
use tokio::signal;
use tower_http::services::ServeDir;

use crate::auth::{self, user::AuthSession};
use crate::config::Config;
use crate::error::AppError;
use crate::routes::{checkout, dashboard, events, organizer, tickets};
use crate::storage::UserStorage;
use crate::store::UniverseStore;
use crate::util::asset_loader::AssetLoader;
use crate::util::format::{format_date, format_price};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UniverseStore>,
    pub storage: Arc<dyn UserStorage>,
    pub templates: Arc<Environment<'static>>,
    pub config: Arc<Config>,
}

pub fn create_router(
    store: Arc<UniverseStore>,
    storage: Arc<dyn UserStorage>,
    config: Arc<Config>,
) -> Router {
    let templates = setup_templates();

    let state = AppState {
        store,
        storage,
        templates: Arc::new(templates),
        config,
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(1)));

    // Auth service: the session layer combined with our backend, providing
    // the auth session as a request extension.
    let backend = auth::user::Backend::new(state.store.clone(), state.storage.clone());
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    Router::new()
        .route("/", get(index))
        .route("/events", get(events::list))
        .route("/events/{id}", get(events::detail))
        .route("/checkout/{id}", get(checkout::show))
        .route("/checkout/{id}/attendee", post(checkout::submit_attendee))
        .route("/checkout/{id}/payment", post(checkout::submit_payment))
        .route("/checkout/{id}/back", post(checkout::go_back))
        .route("/checkout/{id}/confirm", post(checkout::confirm))
        .route("/success", get(checkout::success))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/tickets/{id}/qr.png", get(tickets::qr_png))
        .route("/organizer/dashboard", get(organizer::dashboard))
        .route(
            "/organizer/create-event",
            get(organizer::create_event_form).post(organizer::create_event),
        )
        .merge(auth::router::router())
        .fallback(not_found)
        .with_state(state)
        .nest_service("/static", get_service(ServeDir::new("static")))
        .layer(auth_layer)
}

fn setup_templates() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_loader(minijinja::path_loader("templates"));
    AssetLoader::new().register(&mut env);

    env.add_filter("price", |price: u64| format_price(price));
    // Event dates serialize as ISO strings; timestamps as RFC 3339. Either
    // way, show a long-form date.
    env.add_filter("display_date", |value: String| -> String {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
            return format_date(dt.date_naive());
        }
        match NaiveDate::parse_from_str(&value, "%Y-%m-%d") {
            Ok(date) => format_date(date),
            Err(_) => value,
        }
    });
    env
}

/// Render a template against the shared environment.
pub fn render(
    state: &AppState,
    name: &str,
    ctx: minijinja::Value,
) -> Result<Html<String>, AppError> {
    let tmpl = state.templates.get_template(name)?;
    Ok(Html(tmpl.render(ctx)?))
}

async fn index(State(state): State<AppState>, auth_session: AuthSession) -> Result<Response, AppError> {
    match auth_session.user {
        Some(user) => Ok(Redirect::to(user.role.home_path()).into_response()),
        None => {
            let html = render(&state, "index.html", minijinja::context! {})?;
            Ok(html.into_response())
        }
    }
}

async fn not_found(State(state): State<AppState>) -> Result<Response, AppError> {
    let html = render(&state, "not_found.html", minijinja::context! {})?;
    Ok((StatusCode::NOT_FOUND, html).into_response())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
