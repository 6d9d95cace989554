//! Audit events recorded during an import run.

mod event_model;
mod event_traits;

pub use event_model::{AuditEvent, Severity};
pub use event_traits::EventRepositoryTrait;
