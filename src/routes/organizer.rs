use std::collections::BTreeMap;

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use minijinja::context;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::user::AuthSession;
use crate::util::validation::field_errors;
use crate::error::AppError;
use crate::models::{Event, EventCategory, Role, User};
use crate::router::{AppState, render};

fn require_organizer(auth_session: &AuthSession) -> Result<User, Response> {
    match &auth_session.user {
        Some(user) if user.role == Role::Organizer => Ok(user.clone()),
        _ => Err(Redirect::to("/login").into_response()),
    }
}

pub async fn dashboard(
    State(state): State<AppState>,
    auth_session: AuthSession,
) -> Result<Response, AppError> {
    let user = match require_organizer(&auth_session) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let html = render(
        &state,
        "organizer_dashboard.html",
        context! {
            user => user,
            stats => state.store.stats(),
            events => state.store.events(),
        },
    )?;
    Ok(html.into_response())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEventForm {
    #[validate(length(min = 5, message = "Title must be at least 5 characters"))]
    pub title: String,
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,
    #[validate(length(min = 30, message = "Details must be at least 30 characters"))]
    pub details: String,
    pub category: EventCategory,
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,
    #[validate(length(min = 1, message = "Time is required"))]
    pub time: String,
    #[validate(length(min = 5, message = "Venue must be at least 5 characters"))]
    pub venue: String,
    #[validate(length(min = 3, message = "Organizer name is required"))]
    pub organizer: String,
    #[validate(range(min = 0, max = 1_000_000, message = "Price must be between 0 and 1,000,000"))]
    pub price: i64,
    #[validate(range(
        min = 1,
        max = 100_000,
        message = "Tickets available must be between 1 and 100,000"
    ))]
    pub tickets_available: i64,
    #[validate(length(min = 1, message = "Registration deadline is required"))]
    pub registration_deadline: String,
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image: String,
    /// "free" forces the price to 0 regardless of what was entered.
    pub ticket_type: String,
}

impl CreateEventForm {
    /// Validation beyond the derive: the date fields must actually parse.
    fn checked(&self) -> Result<(NaiveDate, NaiveDate), BTreeMap<String, String>> {
        let mut errors = match self.validate() {
            Ok(()) => BTreeMap::new(),
            Err(e) => field_errors(&e),
        };

        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d");
        if date.is_err() && !errors.contains_key("date") {
            errors.insert("date".to_string(), "Enter a valid date".to_string());
        }
        let deadline = NaiveDate::parse_from_str(&self.registration_deadline, "%Y-%m-%d");
        if deadline.is_err() && !errors.contains_key("registration_deadline") {
            errors.insert(
                "registration_deadline".to_string(),
                "Enter a valid date".to_string(),
            );
        }

        match (date, deadline) {
            (Ok(date), Ok(deadline)) if errors.is_empty() => Ok((date, deadline)),
            _ => Err(errors),
        }
    }

    fn into_event(self, date: NaiveDate, deadline: NaiveDate) -> Event {
        let price = if self.ticket_type == "free" {
            0
        } else {
            self.price.clamp(0, 1_000_000) as u32
        };
        Event {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            date,
            time: self.time,
            venue: self.venue,
            organizer: self.organizer,
            price,
            category: self.category,
            image: self.image,
            details: self.details,
            tickets_available: self.tickets_available.clamp(1, 100_000) as u32,
            registration_deadline: deadline,
        }
    }
}

pub async fn create_event_form(
    State(state): State<AppState>,
    auth_session: AuthSession,
) -> Result<Response, AppError> {
    let user = match require_organizer(&auth_session) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let html = render(
        &state,
        "create_event.html",
        context! {
            user => &user,
            categories => EventCategory::ALL.map(|c| c.as_str()),
            errors => BTreeMap::<String, String>::new(),
            organizer_name => user.name,
        },
    )?;
    Ok(html.into_response())
}

pub async fn create_event(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Form(form): Form<CreateEventForm>,
) -> Result<Response, AppError> {
    let user = match require_organizer(&auth_session) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let (date, deadline) = match form.checked() {
        Ok(dates) => dates,
        Err(errors) => {
            let html = render(
                &state,
                "create_event.html",
                context! {
                    user => &user,
                    categories => EventCategory::ALL.map(|c| c.as_str()),
                    errors => errors,
                    form => form,
                    organizer_name => user.name,
                },
            )?;
            return Ok(html.into_response());
        }
    };

    let event = form.into_event(date, deadline);
    info!(event = %event.id, title = %event.title, "event created");
    state.store.add_event(event);

    Ok(Redirect::to("/organizer/dashboard").into_response())
}
