use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{DataTypeError, Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalResourceOptions {
    #[serde(default)]
    pub download_directory: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExternalResourceOptions {
    fn default() -> Self {
        Self {
            download_directory: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    50
}

/// Record value describing a file to fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceReference {
    pub source_uri: String,
    pub filename: String,
    #[serde(default)]
    pub override_filename: Option<String>,
    #[serde(default)]
    pub temporary_prefix: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub force_download: bool,
}

/// A downloaded file, identified by its content hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResource {
    pub path: String,
    pub sha256: String,
    pub filename: String,
}

/// Downloads external files into the configured download directory.
pub struct ExternalResource {
    download_directory: PathBuf,
    client: reqwest::Client,
}

impl ExternalResource {
    pub fn new(options: &ExternalResourceOptions) -> Result<Self> {
        let download_directory = options
            .download_directory
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| Error::missing_option("download_directory", "external resource options"))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| DataTypeError::InvalidResource(e.to_string()))?;
        Ok(Self {
            download_directory: PathBuf::from(download_directory),
            client,
        })
    }

    /// Parses a record value (`{"source_uri": .., "filename": ..}`) and fetches it.
    pub async fn fetch_value(&self, value: &serde_json::Value) -> Result<StoredResource> {
        let reference: ResourceReference = serde_json::from_value(value.clone()).map_err(|e| {
            DataTypeError::InvalidResource(format!(
                "value must be an object with source_uri and filename: {}",
                e
            ))
        })?;
        self.fetch(&reference).await
    }

    pub async fn fetch(&self, reference: &ResourceReference) -> Result<StoredResource> {
        let source_uri = reference.source_uri.trim();
        let filename = reference.filename.trim();
        if source_uri.is_empty() || filename.is_empty() {
            return Err(DataTypeError::InvalidResource(
                "source_uri and filename must not be empty".to_string(),
            )
            .into());
        }

        let mut local_path = self.local_path(reference);
        std::fs::create_dir_all(&self.download_directory)?;

        let content_type = if reference.force_download || !local_path.is_file() {
            self.download(source_uri, &local_path, reference).await?
        } else {
            log::debug!(
                "External resource \"{}\" skipped, local file \"{}\" exists",
                source_uri,
                local_path.display()
            );
            None
        };

        if extension_of(filename).is_none() {
            let guessed = content_type.as_deref().and_then(extension_for_media_type);
            log::debug!(
                "Guessed extension for \"{}\" ({}): {:?}",
                source_uri,
                filename,
                guessed
            );
            if let Some(extension) = guessed {
                let renamed = PathBuf::from(format!("{}.{}", local_path.display(), extension));
                if !renamed.is_file() {
                    std::fs::copy(&local_path, &renamed)?;
                }
                local_path = renamed;
            }
        }

        let bytes = std::fs::read(&local_path)?;
        let sha256 = hex::encode(Sha256::digest(&bytes));
        Ok(StoredResource {
            filename: local_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: local_path.display().to_string(),
            sha256,
        })
    }

    /// Local file name: `[<prefix>-]<override or stem>[.<ext>]`.
    fn local_path(&self, reference: &ResourceReference) -> PathBuf {
        let filename = reference.filename.trim();
        let stem = reference
            .override_filename
            .as_deref()
            .map(str::trim)
            .unwrap_or_else(|| {
                Path::new(filename)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(filename)
            });
        let mut name = match extension_of(filename) {
            Some(extension) => format!("{}.{}", stem, extension),
            None => stem.to_string(),
        };
        if let Some(prefix) = reference.temporary_prefix.as_deref() {
            name = format!("{}-{}", prefix.trim(), name);
        }
        self.download_directory.join(name.trim())
    }

    async fn download(
        &self,
        source_uri: &str,
        destination: &Path,
        reference: &ResourceReference,
    ) -> Result<Option<String>> {
        let download_error = |message: String| DataTypeError::Download {
            uri: source_uri.to_string(),
            message,
        };

        let mut request = self.client.get(source_uri.replace(' ', "%20"));
        if let (Some(username), Some(password)) = (&reference.username, &reference.password) {
            request = request.basic_auth(username, Some(password));
        }
        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| download_error(e.to_string()))?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_lowercase());
        let bytes = response
            .bytes()
            .await
            .map_err(|e| download_error(e.to_string()))?;
        std::fs::write(destination, &bytes)?;

        log::debug!(
            "External resource \"{}\" downloaded to \"{}\"",
            source_uri,
            destination.display()
        );
        Ok(content_type)
    }
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

fn extension_for_media_type(media_type: &str) -> Option<&'static str> {
    let extension = match media_type {
        "image/jpeg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/tiff" => "tiff",
        "application/pdf" => "pdf",
        "application/zip" => "zip",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        "text/plain" => "txt",
        "text/csv" => "csv",
        "text/html" => "html",
        _ => return None,
    };
    Some(extension)
}
