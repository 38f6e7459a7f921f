use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_login::tower_sessions::Session;
use minijinja::context;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::user::AuthSession;
use crate::checkout::{
    AttendeeDetails, CheckoutState, CheckoutStep, SESSION_KEY, clamp_quantity, issue_ticket,
};
use crate::util::validation::field_errors;
use crate::error::AppError;
use crate::models::{Event, User};
use crate::router::{AppState, render};

/// Raw attendee form as posted. Quantity arrives as whatever was typed,
/// numeric or not, and is clamped to [1, 10] before validation; text that
/// does not parse as a number counts as the minimum.
#[derive(Debug, Deserialize)]
pub struct AttendeeForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub quantity: String,
}

impl AttendeeForm {
    fn into_details(self) -> AttendeeDetails {
        let quantity = self.quantity.trim().parse::<i64>().unwrap_or(1);
        AttendeeDetails {
            name: self.name,
            email: self.email,
            phone: self.phone,
            department: self.department,
            quantity: clamp_quantity(quantity),
        }
    }
}

/// The payment step's fields are decorative: collected for display parity
/// with a real checkout, never validated or stored.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub expiry: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub cardholder: String,
}

fn no_errors() -> std::collections::BTreeMap<String, String> {
    std::collections::BTreeMap::new()
}

async fn wizard_state(
    session: &Session,
    event_id: Uuid,
    user: &User,
) -> Result<CheckoutState, AppError> {
    match session.get::<CheckoutState>(SESSION_KEY).await? {
        // Switching events restarts the wizard; otherwise entered data is
        // kept across steps and back-navigation.
        Some(state) if state.event_id == event_id => Ok(state),
        _ => {
            let state = CheckoutState::new(event_id, user);
            session.insert(SESSION_KEY, &state).await?;
            Ok(state)
        }
    }
}

fn render_step(
    app: &AppState,
    user: &User,
    event: &Event,
    wizard: &CheckoutState,
    errors: std::collections::BTreeMap<String, String>,
) -> Result<Response, AppError> {
    let subtotal = u64::from(event.price) * u64::from(wizard.attendee.quantity);
    let html = render(
        app,
        wizard.step.template(),
        context! {
            user => user,
            event => event,
            attendee => &wizard.attendee,
            step_title => wizard.step.title(),
            subtotal => subtotal,
            errors => errors,
        },
    )?;
    Ok(html.into_response())
}

async fn not_found_page(app: &AppState, user: &User) -> Result<Response, AppError> {
    let html = render(app, "not_found.html", context! { user => user })?;
    Ok((StatusCode::NOT_FOUND, html).into_response())
}

pub async fn show(
    State(state): State<AppState>,
    auth_session: AuthSession,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let Some(user) = auth_session.user else {
        return Ok(Redirect::to("/login").into_response());
    };
    let Some(event) = state.store.event(id) else {
        return not_found_page(&state, &user).await;
    };

    let wizard = wizard_state(&session, id, &user).await?;
    render_step(&state, &user, &event, &wizard, no_errors())
}

pub async fn submit_attendee(
    State(state): State<AppState>,
    auth_session: AuthSession,
    session: Session,
    Path(id): Path<Uuid>,
    Form(form): Form<AttendeeForm>,
) -> Result<Response, AppError> {
    let Some(user) = auth_session.user else {
        return Ok(Redirect::to("/login").into_response());
    };
    let Some(event) = state.store.event(id) else {
        return not_found_page(&state, &user).await;
    };

    let mut wizard = wizard_state(&session, id, &user).await?;
    let details = form.into_details();

    if let Err(errors) = details.validate() {
        // Keep what was typed so the user can correct it in place.
        wizard.attendee = details;
        wizard.step = CheckoutStep::AttendeeInfo;
        session.insert(SESSION_KEY, &wizard).await?;
        return render_step(&state, &user, &event, &wizard, field_errors(&errors));
    }

    wizard.attendee = details;
    wizard.step = CheckoutStep::PaymentDetails;
    session.insert(SESSION_KEY, &wizard).await?;
    Ok(Redirect::to(&format!("/checkout/{id}")).into_response())
}

pub async fn submit_payment(
    State(state): State<AppState>,
    auth_session: AuthSession,
    session: Session,
    Path(id): Path<Uuid>,
    Form(_form): Form<PaymentForm>,
) -> Result<Response, AppError> {
    let Some(user) = auth_session.user else {
        return Ok(Redirect::to("/login").into_response());
    };
    if state.store.event(id).is_none() {
        return not_found_page(&state, &user).await;
    }

    let mut wizard = wizard_state(&session, id, &user).await?;
    // Confirmation is only reachable from the payment step; a direct POST
    // from an earlier step is bounced back to the wizard.
    if !wizard.advance(CheckoutStep::Confirmation) {
        return Ok(Redirect::to(&format!("/checkout/{id}")).into_response());
    }
    session.insert(SESSION_KEY, &wizard).await?;
    Ok(Redirect::to(&format!("/checkout/{id}")).into_response())
}

pub async fn go_back(
    State(_state): State<AppState>,
    auth_session: AuthSession,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let Some(user) = auth_session.user else {
        return Ok(Redirect::to("/login").into_response());
    };

    let mut wizard = wizard_state(&session, id, &user).await?;
    match wizard.step.back() {
        Some(step) => {
            wizard.step = step;
            session.insert(SESSION_KEY, &wizard).await?;
            Ok(Redirect::to(&format!("/checkout/{id}")).into_response())
        }
        // Backing out of the first step leaves the wizard entirely.
        None => Ok(Redirect::to(&format!("/events/{id}")).into_response()),
    }
}

pub async fn confirm(
    State(state): State<AppState>,
    auth_session: AuthSession,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let Some(user) = auth_session.user else {
        return Ok(Redirect::to("/login").into_response());
    };
    let Some(event) = state.store.event(id) else {
        return not_found_page(&state, &user).await;
    };

    let wizard = wizard_state(&session, id, &user).await?;
    if wizard.step != CheckoutStep::Confirmation {
        return Ok(Redirect::to(&format!("/checkout/{id}")).into_response());
    }

    // Simulated payment processing; there is no backend call and no real
    // failure condition behind this delay.
    sleep(state.config.simulated_latency).await;

    let ticket = issue_ticket(&event, &wizard.attendee, user.id);
    info!(
        ticket = %ticket.id,
        event = %event.id,
        price = ticket.price,
        "ticket purchased"
    );
    state.store.add_ticket(ticket);
    session.remove::<CheckoutState>(SESSION_KEY).await?;

    Ok(Redirect::to("/success").into_response())
}

pub async fn success(
    State(state): State<AppState>,
    auth_session: AuthSession,
) -> Result<Response, AppError> {
    let Some(user) = auth_session.user else {
        return Ok(Redirect::to("/login").into_response());
    };
    // Straight to browsing if there is nothing to celebrate.
    let Some(ticket) = state.store.latest_ticket_for_user(user.id) else {
        return Ok(Redirect::to("/events").into_response());
    };
    let Some(event) = state.store.event(ticket.event_id) else {
        return Ok(Redirect::to("/events").into_response());
    };

    let html = render(
        &state,
        "success.html",
        context! {
            user => user,
            ticket => ticket,
            event => event,
        },
    )?;
    Ok(html.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(quantity: &str) -> AttendeeForm {
        AttendeeForm {
            name: "Priya Sharma".to_string(),
            email: "priya@srmist.edu.in".to_string(),
            phone: "9876543210".to_string(),
            department: "CSE".to_string(),
            quantity: quantity.to_string(),
        }
    }

    #[test]
    fn typed_quantity_is_clamped_whatever_the_input() {
        assert_eq!(form("15").into_details().quantity, 10);
        assert_eq!(form("0").into_details().quantity, 1);
        assert_eq!(form(" 7 ").into_details().quantity, 7);
        // Non-numeric text falls back to the minimum instead of failing the
        // whole form submission.
        assert_eq!(form("lots").into_details().quantity, 1);
        assert_eq!(form("").into_details().quantity, 1);
    }
}
