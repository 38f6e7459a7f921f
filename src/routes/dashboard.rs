use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use minijinja::context;
use serde::{Deserialize, Serialize};

use crate::auth::user::AuthSession;
use crate::error::AppError;
use crate::models::{Event, Ticket};
use crate::router::{AppState, render};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub tab: Option<String>,
}

/// A ticket joined with its event for display.
#[derive(Debug, Serialize)]
struct TicketView {
    ticket: Ticket,
    event: Event,
}

pub async fn dashboard(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    let Some(user) = auth_session.user else {
        return Ok(Redirect::to("/login").into_response());
    };

    let tab = query.tab.as_deref().unwrap_or("all");
    let today = Utc::now().date_naive();

    let tickets: Vec<TicketView> = state
        .store
        .tickets_for_user(user.id)
        .into_iter()
        .filter_map(|ticket| {
            let event = state.store.event(ticket.event_id)?;
            Some(TicketView { ticket, event })
        })
        .filter(|view| match tab {
            "upcoming" => view.event.date >= today,
            "past" => view.event.date < today,
            _ => true,
        })
        .collect();

    let html = render(
        &state,
        "dashboard.html",
        context! {
            user => user,
            tickets => tickets,
            active_tab => tab,
        },
    )?;
    Ok(html.into_response())
}
