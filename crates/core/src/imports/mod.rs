//! Import runs and the import session.

mod import_model;
mod import_service;
mod import_traits;

#[cfg(test)]
mod import_service_tests;

pub use import_model::ImportRun;
pub use import_service::ImportService;
pub use import_traits::ImportRunRepositoryTrait;
