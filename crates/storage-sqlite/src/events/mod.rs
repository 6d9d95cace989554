//! SQLite storage implementation for audit events.

mod model;
mod repository;

pub use model::AuditEventDB;
pub use repository::EventRepository;
