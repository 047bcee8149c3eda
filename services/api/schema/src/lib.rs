//! sea-orm entities for the EventHub database.

pub mod events;
pub mod registrations;
pub mod users;
