pub mod checkout;
pub mod dashboard;
pub mod events;
pub mod organizer;
pub mod tickets;
