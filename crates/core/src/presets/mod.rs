//! Run-time view of preset parts.

mod part_definition;

pub use part_definition::PresetPartDefinition;
