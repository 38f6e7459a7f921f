use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::auth::user::AuthSession;
use crate::error::AppError;
use crate::models::TicketStatus;
use crate::qr::ticket_qr_png;
use crate::router::AppState;

/// Serve the scannable QR image for a confirmed ticket. Presentational
/// only; nothing decodes these.
pub async fn qr_png(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let Some(user) = auth_session.user else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };

    let ticket = state.store.ticket(id).ok_or(AppError::NotFound)?;
    if ticket.user_id != user.id || ticket.status != TicketStatus::Confirmed {
        return Err(AppError::NotFound);
    }
    let event = state.store.event(ticket.event_id).ok_or(AppError::NotFound)?;

    let png = ticket_qr_png(&ticket, &event)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}
