use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Event, Ticket, TicketStatus, User};

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 10;

/// Session key holding the in-flight wizard state.
pub const SESSION_KEY: &str = "checkout.state";

/// The three operator-visible steps of the wizard. Transitions are strictly
/// linear; "back" returns to the previous step with the entered data intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStep {
    AttendeeInfo,
    PaymentDetails,
    Confirmation,
}

impl CheckoutStep {
    pub fn back(self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::AttendeeInfo => None,
            CheckoutStep::PaymentDetails => Some(CheckoutStep::AttendeeInfo),
            CheckoutStep::Confirmation => Some(CheckoutStep::PaymentDetails),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CheckoutStep::AttendeeInfo => "Checkout",
            CheckoutStep::PaymentDetails => "Payment",
            CheckoutStep::Confirmation => "Confirm Purchase",
        }
    }

    /// Template rendered for this step.
    pub fn template(self) -> &'static str {
        match self {
            CheckoutStep::AttendeeInfo => "checkout_attendee.html",
            CheckoutStep::PaymentDetails => "checkout_payment.html",
            CheckoutStep::Confirmation => "checkout_confirm.html",
        }
    }
}

/// The validated attendee form carried forward through every step.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttendeeDetails {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 10, message = "Phone number must be at least 10 characters"))]
    pub phone: String,
    #[validate(length(min = 2, message = "Department is required"))]
    pub department: String,
    #[validate(range(min = 1, max = 10, message = "Maximum 10 tickets per transaction"))]
    pub quantity: u32,
}

impl AttendeeDetails {
    /// Prefill from the logged-in user, the way the original form does.
    pub fn prefilled(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            department: user.department.clone(),
            quantity: MIN_QUANTITY,
        }
    }
}

/// Per-session wizard state, serialized into the tower session so that
/// navigating back and forth never loses entered data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutState {
    pub event_id: Uuid,
    pub step: CheckoutStep,
    pub attendee: AttendeeDetails,
}

impl CheckoutState {
    pub fn new(event_id: Uuid, user: &User) -> Self {
        Self {
            event_id,
            step: CheckoutStep::AttendeeInfo,
            attendee: AttendeeDetails::prefilled(user),
        }
    }

    /// Move to `next` only when it is the immediate successor of the current
    /// step. Skipping forward (and with it, the earlier step's validation) is
    /// refused.
    pub fn advance(&mut self, next: CheckoutStep) -> bool {
        if next.back() == Some(self.step) {
            self.step = next;
            true
        } else {
            false
        }
    }
}

/// Clamp whatever was typed into the quantity input to the [1, 10] range.
pub fn clamp_quantity(raw: i64) -> u32 {
    raw.clamp(i64::from(MIN_QUANTITY), i64::from(MAX_QUANTITY)) as u32
}

/// Synthesize the confirmed ticket on final confirmation. Always exactly one
/// ticket per completed checkout, priced at `event.price * quantity`. The
/// product is computed in u64 so no form-creatable price can overflow it.
pub fn issue_ticket(event: &Event, attendee: &AttendeeDetails, user_id: Uuid) -> Ticket {
    Ticket {
        id: Uuid::new_v4(),
        event_id: event.id,
        user_id,
        purchase_date: Utc::now(),
        status: TicketStatus::Confirmed,
        price: u64::from(event.price) * u64::from(attendee.quantity),
        user_name: attendee.name.clone(),
        user_department: attendee.department.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sample_events;
    use crate::util::validation::field_errors;

    fn attendee() -> AttendeeDetails {
        AttendeeDetails {
            name: "Priya Sharma".to_string(),
            email: "priya@srmist.edu.in".to_string(),
            phone: "9876543210".to_string(),
            department: "CSE".to_string(),
            quantity: 2,
        }
    }

    #[test]
    fn quantity_is_clamped_to_range() {
        assert_eq!(clamp_quantity(15), 10);
        assert_eq!(clamp_quantity(0), 1);
        assert_eq!(clamp_quantity(-3), 1);
        assert_eq!(clamp_quantity(7), 7);
    }

    #[test]
    fn invalid_email_blocks_the_attendee_step() {
        let mut details = attendee();
        details.email = "not-an-email".to_string();
        let errors = details.validate().unwrap_err();
        let fields = field_errors(&errors);
        assert_eq!(
            fields.get("email").map(String::as_str),
            Some("Please enter a valid email address")
        );

        // A corrected resubmission passes.
        details.email = "priya@srmist.edu.in".to_string();
        assert!(details.validate().is_ok());
    }

    #[test]
    fn short_phone_and_empty_department_are_rejected() {
        let mut details = attendee();
        details.phone = "12345".to_string();
        details.department = String::new();
        let fields = field_errors(&details.validate().unwrap_err());
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("department"));
        assert!(!fields.contains_key("name"));
    }

    #[test]
    fn back_transitions_are_linear() {
        assert_eq!(CheckoutStep::Confirmation.back(), Some(CheckoutStep::PaymentDetails));
        assert_eq!(CheckoutStep::PaymentDetails.back(), Some(CheckoutStep::AttendeeInfo));
        assert_eq!(CheckoutStep::AttendeeInfo.back(), None);
    }

    #[test]
    fn forward_steps_cannot_be_skipped() {
        let mut state = CheckoutState {
            event_id: Uuid::new_v4(),
            step: CheckoutStep::AttendeeInfo,
            attendee: attendee(),
        };
        // Jumping straight to confirmation from the first step is refused,
        // so unvalidated attendee data can never reach a ticket.
        assert!(!state.advance(CheckoutStep::Confirmation));
        assert_eq!(state.step, CheckoutStep::AttendeeInfo);

        assert!(state.advance(CheckoutStep::PaymentDetails));
        assert!(state.advance(CheckoutStep::Confirmation));
        assert_eq!(state.step, CheckoutStep::Confirmation);
    }

    #[test]
    fn issued_ticket_is_confirmed_at_price_times_quantity() {
        let event = &sample_events()[0];
        let user_id = Uuid::new_v4();
        let ticket = issue_ticket(event, &attendee(), user_id);
        assert_eq!(ticket.status, TicketStatus::Confirmed);
        assert_eq!(ticket.price, u64::from(event.price) * 2);
        assert_eq!(ticket.event_id, event.id);
        assert_eq!(ticket.user_id, user_id);
        assert_eq!(ticket.user_name, "Priya Sharma");
    }

    #[test]
    fn max_priced_ticket_does_not_overflow() {
        let mut event = sample_events().remove(0);
        event.price = 1_000_000;
        let mut details = attendee();
        details.quantity = MAX_QUANTITY;
        let ticket = issue_ticket(&event, &details, Uuid::new_v4());
        assert_eq!(ticket.price, 10_000_000);
    }

    #[test]
    fn free_event_tickets_cost_nothing() {
        let events = sample_events();
        let free = events.iter().find(|e| e.price == 0).unwrap();
        let ticket = issue_ticket(free, &attendee(), Uuid::new_v4());
        assert_eq!(ticket.price, 0);
    }
}
