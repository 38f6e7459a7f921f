use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Event, EventCategory, Ticket, User};

/// The single in-process application store. Every view reads through it and
/// every mutation goes through one of its methods; nothing else holds state.
///
/// `tickets_available` on events is advisory only: selling tickets never
/// decrements it, so overselling is possible. That mirrors the demo's
/// intent and is left as-is.
#[derive(Debug, Default)]
pub struct UniverseStore {
    events: RwLock<Vec<Event>>,
    tickets: RwLock<Vec<Ticket>>,
    users: RwLock<HashMap<Uuid, User>>,
}

/// Aggregate numbers for the organizer dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_events: usize,
    pub upcoming_events: usize,
    pub past_events: usize,
    pub tickets_sold: usize,
    pub total_revenue: u64,
}

impl UniverseStore {
    /// A store pre-seeded with the sample events.
    pub fn new() -> Self {
        let store = Self::default();
        {
            let mut events = store.events.write().unwrap();
            *events = sample_events();
        }
        store
    }

    #[cfg(test)]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.read().unwrap().clone()
    }

    pub fn event(&self, id: Uuid) -> Option<Event> {
        self.events.read().unwrap().iter().find(|e| e.id == id).cloned()
    }

    pub fn add_event(&self, event: Event) {
        self.events.write().unwrap().push(event);
    }

    /// Linear filter by category and case-insensitive substring match over
    /// title, description, venue and organizer. Natural list order.
    pub fn filter_events(&self, category: Option<EventCategory>, query: &str) -> Vec<Event> {
        let needle = query.trim().to_lowercase();
        self.events
            .read()
            .unwrap()
            .iter()
            .filter(|e| category.is_none_or(|c| e.category == c))
            .filter(|e| {
                needle.is_empty()
                    || e.title.to_lowercase().contains(&needle)
                    || e.description.to_lowercase().contains(&needle)
                    || e.venue.to_lowercase().contains(&needle)
                    || e.organizer.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub fn add_ticket(&self, ticket: Ticket) {
        self.tickets.write().unwrap().push(ticket);
    }

    pub fn ticket(&self, id: Uuid) -> Option<Ticket> {
        self.tickets.read().unwrap().iter().find(|t| t.id == id).cloned()
    }

    pub fn tickets_for_user(&self, user_id: Uuid) -> Vec<Ticket> {
        self.tickets
            .read()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    /// The most recently purchased ticket for a user, used by the success
    /// page right after checkout.
    pub fn latest_ticket_for_user(&self, user_id: Uuid) -> Option<Ticket> {
        self.tickets
            .read()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id)
            .max_by_key(|t| t.purchase_date)
            .cloned()
    }

    pub fn ticket_count(&self) -> usize {
        self.tickets.read().unwrap().len()
    }

    pub fn upsert_user(&self, user: User) {
        self.users.write().unwrap().insert(user.id, user);
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.users.read().unwrap().get(&id).cloned()
    }

    pub fn stats(&self) -> DashboardStats {
        let today = Utc::now().date_naive();
        let events = self.events.read().unwrap();
        let tickets = self.tickets.read().unwrap();
        DashboardStats {
            total_events: events.len(),
            upcoming_events: events.iter().filter(|e| e.date >= today).count(),
            past_events: events.iter().filter(|e| e.date < today).count(),
            tickets_sold: tickets.len(),
            total_revenue: tickets.iter().map(|t| t.price).sum(),
        }
    }
}

fn fixture_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// The hard-coded sample events loaded at startup.
pub fn sample_events() -> Vec<Event> {
    vec![
        Event {
            id: Uuid::new_v4(),
            title: "Hackathon 2025".to_string(),
            description: "48-hour coding challenge with exciting prizes".to_string(),
            date: fixture_date(2025, 6, 15),
            time: "10:00 AM".to_string(),
            venue: "Tech Building, Block 5".to_string(),
            organizer: "CodeClub SRM".to_string(),
            price: 500,
            category: EventCategory::Hackathon,
            image: "https://images.unsplash.com/photo-1504384308090-c894fdcc538d".to_string(),
            details: "Join us for the biggest hackathon of the year! Form teams of up to 4 \
                      members and solve real-world problems with innovative solutions. Top \
                      teams win cash prizes and internship opportunities."
                .to_string(),
            tickets_available: 200,
            registration_deadline: fixture_date(2025, 6, 10),
        },
        Event {
            id: Uuid::new_v4(),
            title: "Aarush 2025".to_string(),
            description: "Annual technical and cultural fest".to_string(),
            date: fixture_date(2025, 3, 20),
            time: "9:00 AM".to_string(),
            venue: "Main Campus Grounds".to_string(),
            organizer: "Student Council".to_string(),
            price: 1200,
            category: EventCategory::Aarush,
            image: "https://images.unsplash.com/photo-1522158637959-30385a09e0da".to_string(),
            details: "Aarush is SRM's annual techno-cultural fest that brings together \
                      students from across the country. Experience three days of \
                      competitions, workshops, and star-studded performances."
                .to_string(),
            tickets_available: 5000,
            registration_deadline: fixture_date(2025, 3, 15),
        },
        Event {
            id: Uuid::new_v4(),
            title: "AI Workshop Series".to_string(),
            description: "Learn Machine Learning and AI fundamentals".to_string(),
            date: fixture_date(2025, 7, 5),
            time: "2:00 PM".to_string(),
            venue: "University Building 2, Room 304".to_string(),
            organizer: "AI Club SRM".to_string(),
            price: 300,
            category: EventCategory::Workshop,
            image: "https://images.unsplash.com/photo-1485827404703-89b55fcc595e".to_string(),
            details: "A comprehensive 3-day workshop on Machine Learning and AI \
                      fundamentals. Learn from industry experts and get hands-on experience \
                      with real projects. Certificate provided upon completion."
                .to_string(),
            tickets_available: 50,
            registration_deadline: fixture_date(2025, 7, 1),
        },
        Event {
            id: Uuid::new_v4(),
            title: "Milan 2025".to_string(),
            description: "Cultural extravaganza with dance, music and more".to_string(),
            date: fixture_date(2025, 4, 10),
            time: "6:00 PM".to_string(),
            venue: "Auditorium".to_string(),
            organizer: "Cultural Committee".to_string(),
            price: 800,
            category: EventCategory::Milan,
            image: "https://images.unsplash.com/photo-1533174072545-7a4b6ad7a6c3".to_string(),
            details: "Milan is SRM's cultural fest that celebrates diverse art forms. \
                      Participate in competitions for dance, music, fashion, and more. \
                      Witness performances by celebrity artists."
                .to_string(),
            tickets_available: 1000,
            registration_deadline: fixture_date(2025, 4, 5),
        },
        Event {
            id: Uuid::new_v4(),
            title: "Startup Ideathon".to_string(),
            description: "Present your business ideas to investors".to_string(),
            date: fixture_date(2025, 5, 25),
            time: "11:00 AM".to_string(),
            venue: "Business School, Conference Hall".to_string(),
            organizer: "E-Cell SRM".to_string(),
            price: 250,
            category: EventCategory::Ideathon,
            image: "https://images.unsplash.com/photo-1559223607-a43c990c692c".to_string(),
            details: "Got a groundbreaking business idea? Present it to a panel of \
                      investors and industry experts. The best ideas receive mentorship and \
                      funding opportunities to turn them into reality."
                .to_string(),
            tickets_available: 80,
            registration_deadline: fixture_date(2025, 5, 20),
        },
        Event {
            id: Uuid::new_v4(),
            title: "Tech Roadshow 2025".to_string(),
            description: "Showcase of latest technological innovations".to_string(),
            date: fixture_date(2025, 8, 12),
            time: "10:30 AM".to_string(),
            venue: "Central Quadrangle".to_string(),
            organizer: "Tech Club".to_string(),
            price: 0,
            category: EventCategory::Roadshow,
            image: "https://images.unsplash.com/photo-1563986768609-322da13575f3".to_string(),
            details: "Experience the future of technology at SRM's Tech Roadshow. See \
                      demonstrations of robots, drones, VR/AR experiences, and other \
                      cutting-edge innovations developed by students and faculty."
                .to_string(),
            tickets_available: 300,
            registration_deadline: fixture_date(2025, 8, 10),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TicketStatus;

    fn ticket(user_id: Uuid, event_id: Uuid, price: u64) -> Ticket {
        Ticket {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            purchase_date: Utc::now(),
            status: TicketStatus::Confirmed,
            price,
            user_name: "Priya".to_string(),
            user_department: "CSE".to_string(),
        }
    }

    #[test]
    fn seeds_six_sample_events() {
        let store = UniverseStore::new();
        assert_eq!(store.events().len(), 6);
    }

    #[test]
    fn filters_by_category() {
        let store = UniverseStore::new();
        let workshops = store.filter_events(Some(EventCategory::Workshop), "");
        assert_eq!(workshops.len(), 1);
        assert_eq!(workshops[0].title, "AI Workshop Series");
    }

    #[test]
    fn search_is_case_insensitive_and_spans_fields() {
        let store = UniverseStore::new();
        // Matches the venue of the hackathon fixture.
        let hits = store.filter_events(None, "tech building");
        assert_eq!(hits.len(), 1);
        // Matches organizer names.
        let hits = store.filter_events(None, "CLUB");
        assert!(hits.len() >= 2);
    }

    #[test]
    fn category_and_search_combine() {
        let store = UniverseStore::new();
        let hits = store.filter_events(Some(EventCategory::Milan), "auditorium");
        assert_eq!(hits.len(), 1);
        let misses = store.filter_events(Some(EventCategory::Milan), "tech building");
        assert!(misses.is_empty());
    }

    #[test]
    fn selling_tickets_never_touches_availability() {
        let store = UniverseStore::new();
        let event = store.events().remove(0);
        let before = event.tickets_available;
        store.add_ticket(ticket(Uuid::new_v4(), event.id, u64::from(event.price)));
        assert_eq!(store.event(event.id).unwrap().tickets_available, before);
    }

    #[test]
    fn latest_ticket_wins_by_purchase_date() {
        let store = UniverseStore::empty();
        let user = Uuid::new_v4();
        let event = Uuid::new_v4();
        let mut older = ticket(user, event, 100);
        older.purchase_date = Utc::now() - chrono::Duration::minutes(5);
        let newer = ticket(user, event, 200);
        let newer_id = newer.id;
        store.add_ticket(older);
        store.add_ticket(newer);
        assert_eq!(store.latest_ticket_for_user(user).unwrap().id, newer_id);
        assert!(store.latest_ticket_for_user(Uuid::new_v4()).is_none());
    }

    #[test]
    fn revenue_sums_ticket_prices() {
        let store = UniverseStore::new();
        let user = Uuid::new_v4();
        let event = store.events().remove(0);
        store.add_ticket(ticket(user, event.id, 500));
        store.add_ticket(ticket(user, event.id, 1500));
        let stats = store.stats();
        assert_eq!(stats.tickets_sold, 2);
        assert_eq!(stats.total_revenue, 2000);
        assert_eq!(stats.total_events, 6);
    }
}
