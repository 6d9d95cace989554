//! SQLite storage implementation for the content tree.

mod model;
mod repository;

pub use model::ContentNodeDB;
pub use repository::ContentRepository;
