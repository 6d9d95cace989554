//! SQLite storage implementation for checkpoints.

mod model;
mod repository;

pub use model::RecordMappingDB;
pub use repository::RecordMappingRepository;
