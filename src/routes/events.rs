use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use minijinja::context;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::user::AuthSession;
use crate::error::AppError;
use crate::models::EventCategory;
use crate::router::{AppState, render};
use crate::util::format::empty_state_message;

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
struct CategoryOption {
    value: &'static str,
    label: &'static str,
}

fn category_options() -> Vec<CategoryOption> {
    EventCategory::ALL
        .into_iter()
        .map(|c| CategoryOption {
            value: c.as_str(),
            label: c.label(),
        })
        .collect()
}

pub async fn list(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Query(query): Query<EventsQuery>,
) -> Result<Response, AppError> {
    // "all" and unknown values both mean no category filter.
    let category = query
        .category
        .as_deref()
        .and_then(|c| c.parse::<EventCategory>().ok());
    let search = query.q.as_deref().unwrap_or("");

    let events = state.store.filter_events(category, search);
    let empty_message = empty_state_message(search, category);

    let html = render(
        &state,
        "events.html",
        context! {
            user => auth_session.user,
            events => events,
            categories => category_options(),
            active_category => category.map(|c| c.as_str()).unwrap_or("all"),
            query => search,
            empty_message => empty_message,
        },
    )?;
    Ok(html.into_response())
}

pub async fn detail(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let Some(event) = state.store.event(id) else {
        let html = render(&state, "not_found.html", context! { user => auth_session.user })?;
        return Ok((StatusCode::NOT_FOUND, html).into_response());
    };

    let html = render(
        &state,
        "event_detail.html",
        context! {
            user => auth_session.user,
            event => event,
        },
    )?;
    Ok(html.into_response())
}
