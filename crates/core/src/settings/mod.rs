//! Preset registry and global importer settings.

mod settings_model;

pub use settings_model::{
    DataTypeSettings, NodeTypeSettings, PartSettings, PresetSettings, PropertyComparison,
    Settings, SourceSettings,
};
