//! Settings models, loaded from a TOML preset file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::content::Dimensions;
use crate::data_types::{ExternalResourceOptions, HtmlContentOptions};
use crate::errors::{ConfigurationError, Error, Result};

/// How the property mapper decides whether a value changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyComparison {
    /// Coercive comparison (`"1"` equals `1`)
    #[default]
    Loose,
    /// Typed JSON equality
    Strict,
}

/// Root settings object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub presets: BTreeMap<String, PresetSettings>,
    /// Named database sources for query based data providers
    #[serde(default)]
    pub sources: BTreeMap<String, SourceSettings>,
    #[serde(default)]
    pub node_types: BTreeMap<String, NodeTypeSettings>,
    /// Dimension presets, e.g. `en = { language = "en" }`
    #[serde(default)]
    pub dimensions: BTreeMap<String, Dimensions>,
    #[serde(default)]
    pub data_types: DataTypeSettings,
    #[serde(default)]
    pub property_comparison: PropertyComparison,
    /// Emit `Node:Processed:*` events for updated or unchanged nodes
    #[serde(default = "default_true")]
    pub record_log_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            presets: BTreeMap::new(),
            sources: BTreeMap::new(),
            node_types: BTreeMap::new(),
            dimensions: BTreeMap::new(),
            data_types: DataTypeSettings::default(),
            property_comparison: PropertyComparison::default(),
            record_log_enabled: true,
        }
    }
}

/// A named import job made of ordered parts.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PresetSettings {
    #[serde(default)]
    pub parts: Vec<PartSettings>,
}

/// One data provider / importer pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartSettings {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub data_provider: Option<String>,
    #[serde(default)]
    pub data_provider_options: Map<String, Value>,
    #[serde(default)]
    pub importer: Option<String>,
    #[serde(default)]
    pub importer_options: Map<String, Value>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    /// Run the part in a single step even if a batch size is configured
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NodeTypeSettings {
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub super_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataTypeSettings {
    #[serde(default)]
    pub html_content: HtmlContentOptions,
    #[serde(default)]
    pub external_resource: ExternalResourceOptions,
}

fn default_true() -> bool {
    true
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigurationError::Parse(e.to_string()).into())
    }

    /// Reads and parses a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigurationError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let settings = Self::from_toml_str(&content)?;
        log::debug!(
            "Loaded {} preset(s) from {}",
            settings.presets.len(),
            path.display()
        );
        Ok(settings)
    }

    /// Returns a preset, failing when it is unknown or has no parts.
    pub fn preset(&self, name: &str) -> Result<&PresetSettings> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| ConfigurationError::PresetNotFound(name.to_string()))?;
        if preset.parts.is_empty() {
            return Err(ConfigurationError::MissingParts(name.to_string()).into());
        }
        Ok(preset)
    }

    pub fn part(&self, preset: &str, part: &str) -> Result<&PartSettings> {
        self.preset(preset)?
            .parts
            .iter()
            .find(|p| p.name == part)
            .ok_or_else(|| {
                Error::Configuration(ConfigurationError::PartNotFound {
                    preset: preset.to_string(),
                    part: part.to_string(),
                })
            })
    }

    pub fn source(&self, name: &str) -> Option<&SourceSettings> {
        self.sources.get(name)
    }

    /// Resolves a dimension preset name; a leading `@` is ignored.
    pub fn dimension_preset(&self, name: &str) -> Result<&Dimensions> {
        let key = name.trim_start_matches('@');
        self.dimensions
            .get(key)
            .ok_or_else(|| ConfigurationError::UnknownDimensionPreset(key.to_string()).into())
    }
}
