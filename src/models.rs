use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A logged-in account. Fabricated at login/signup (no credential
/// verification happens anywhere) and persisted through the storage port
/// until logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub department: String,
    pub phone: String,
    pub srm_email: String,
    pub personal_email: String,
    pub section: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Organizer,
}

impl Role {
    /// Landing page after a successful login for this role.
    pub fn home_path(self) -> &'static str {
        match self {
            Role::User => "/events",
            Role::Organizer => "/organizer/dashboard",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: String,
    pub venue: String,
    pub organizer: String,
    pub price: u32,
    pub category: EventCategory,
    pub image: String,
    pub details: String,
    pub tickets_available: u32,
    pub registration_deadline: NaiveDate,
}

/// The six fixed event categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Hackathon,
    Ideathon,
    Workshop,
    Milan,
    Aarush,
    Roadshow,
}

impl EventCategory {
    pub const ALL: [EventCategory; 6] = [
        EventCategory::Hackathon,
        EventCategory::Ideathon,
        EventCategory::Workshop,
        EventCategory::Milan,
        EventCategory::Aarush,
        EventCategory::Roadshow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventCategory::Hackathon => "hackathon",
            EventCategory::Ideathon => "ideathon",
            EventCategory::Workshop => "workshop",
            EventCategory::Milan => "milan",
            EventCategory::Aarush => "aarush",
            EventCategory::Roadshow => "roadshow",
        }
    }

    /// Human-facing label used by the filter bar.
    pub fn label(self) -> &'static str {
        match self {
            EventCategory::Hackathon => "Hackathon",
            EventCategory::Ideathon => "Ideathon",
            EventCategory::Workshop => "Workshop",
            EventCategory::Milan => "Milan",
            EventCategory::Aarush => "Aarush",
            EventCategory::Roadshow => "Roadshow",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown event category: {0}")]
pub struct ParseCategoryError(String);

impl FromStr for EventCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// A purchased ticket. Only ever created by the checkout flow, always
/// `Confirmed`; it never transitions afterwards. The price is
/// `event.price * quantity` at purchase time; the quantity itself is not
/// stored on the ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub purchase_date: DateTime<Utc>,
    pub status: TicketStatus,
    pub price: u64,
    pub user_name: String,
    pub user_department: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl TicketStatus {
    pub fn label(self) -> &'static str {
        match self {
            TicketStatus::Pending => "Pending",
            TicketStatus::Confirmed => "Confirmed",
            TicketStatus::Cancelled => "Cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for category in EventCategory::ALL {
            assert_eq!(category.as_str().parse::<EventCategory>().unwrap(), category);
        }
        assert!("concert".parse::<EventCategory>().is_err());
    }

    #[test]
    fn role_home_paths() {
        assert_eq!(Role::User.home_path(), "/events");
        assert_eq!(Role::Organizer.home_path(), "/organizer/dashboard");
    }
}
