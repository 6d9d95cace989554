//! Mapping of record data onto node properties.

mod comparison;
mod dimensions_importer;
mod property_mapper;
mod property_validity;

pub use comparison::{loose_eq, values_equal};
pub use dimensions_importer::DimensionsImporter;
pub use property_mapper::NodePropertyMapper;
pub use property_validity::ProviderPropertyValidity;
