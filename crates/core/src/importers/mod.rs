//! Importers turn records into nodes.

mod importer_context;
mod importer_registry;
mod importer_traits;
mod node_importer;
mod record_hooks;


pub use importer_context::ImporterContext;
pub use importer_registry::{ImporterFactory, ImporterRegistry};
pub use importer_traits::{value_as_string, value_by_path, Importer};
pub use node_importer::{NodeImporter, NodeImporterOptions};
pub use record_hooks::{begin_record, end_record, process_records};
