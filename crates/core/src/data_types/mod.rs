//! Value converters applied to raw record fields.

mod date;
mod external_resource;
mod html_content;
mod slug;
mod string_value;

pub use date::parse_date;
pub use external_resource::{
    ExternalResource, ExternalResourceOptions, ResourceReference, StoredResource,
};
pub use html_content::{HtmlContent, HtmlContentOptions, PatternReplacement};
pub use slug::slugify;
pub use string_value::{integer, string_value};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{Error, Result};
use crate::settings::DataTypeSettings;

/// Names usable in an importer's `property_types` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataTypeKind {
    String,
    Integer,
    Slug,
    Date,
    HtmlContent,
    ExternalResource,
}

/// Converts record values with the configured data type options.
pub struct DataTypeConverter {
    html_content: HtmlContent,
    external_resource: Option<ExternalResource>,
}

impl DataTypeConverter {
    pub fn new(settings: &DataTypeSettings) -> Result<Self> {
        let external_resource = if settings.external_resource.download_directory.is_some() {
            Some(ExternalResource::new(&settings.external_resource)?)
        } else {
            None
        };
        Ok(Self {
            html_content: HtmlContent::new(&settings.html_content)?,
            external_resource,
        })
    }

    pub async fn convert(&self, kind: DataTypeKind, value: &Value) -> Result<Value> {
        let converted = match kind {
            DataTypeKind::String => json!(string_value(&as_text(value))),
            DataTypeKind::Integer => json!(integer(&as_text(value))),
            DataTypeKind::Slug => json!(slugify(&as_text(value))),
            DataTypeKind::Date => match parse_date(value)? {
                Some(date) => json!(date.to_rfc3339()),
                None => Value::Null,
            },
            DataTypeKind::HtmlContent => json!(self.html_content.convert(&as_text(value))),
            DataTypeKind::ExternalResource => {
                let resource = self.external_resource.as_ref().ok_or_else(|| {
                    Error::missing_option(
                        "download_directory",
                        "data_types.external_resource settings",
                    )
                })?;
                serde_json::to_value(resource.fetch_value(value).await?)?
            }
        };
        Ok(converted)
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_convert_by_kind() {
        let converter = DataTypeConverter::new(&DataTypeSettings::default()).unwrap();
        assert_eq!(
            converter.convert(DataTypeKind::Integer, &json!("42 km")).await.unwrap(),
            json!(42)
        );
        assert_eq!(
            converter.convert(DataTypeKind::Slug, &json!("Zürich West")).await.unwrap(),
            json!("zuerich-west")
        );
        assert_eq!(
            converter.convert(DataTypeKind::String, &json!(7)).await.unwrap(),
            json!("7")
        );
        assert_eq!(
            converter.convert(DataTypeKind::Date, &json!(0)).await.unwrap(),
            Value::Null
        );
    }

    #[tokio::test]
    async fn test_external_resource_needs_download_directory() {
        let converter = DataTypeConverter::new(&DataTypeSettings::default()).unwrap();
        let result = converter
            .convert(
                DataTypeKind::ExternalResource,
                &json!({"source_uri": "http://localhost/a.png", "filename": "a.png"}),
            )
            .await;
        assert!(result.is_err());
    }
}
