use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

use super::{DataProvider, ProviderRequest, Record};
use crate::errors::{DataProviderError, Error, Result};

/// `skip_header = true` skips one line, a number skips that many.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum SkipHeader {
    Flag(bool),
    Lines(usize),
}

impl SkipHeader {
    fn lines(self) -> usize {
        match self {
            SkipHeader::Flag(true) => 1,
            SkipHeader::Flag(false) => 0,
            SkipHeader::Lines(n) => n,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CsvOptions {
    pub csv_file_path: Option<String>,
    #[serde(default)]
    pub csv_delimiter: Option<String>,
    #[serde(default)]
    pub csv_enclosure: Option<String>,
    #[serde(default)]
    pub skip_header: Option<SkipHeader>,
    /// Field names for the positional columns
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Reads records from a CSV file.
///
/// Records with an empty first field are dropped before numbering, so a
/// window shorter than the limit always means the file is exhausted.
#[derive(Debug)]
pub struct CsvDataProvider {
    path: PathBuf,
    delimiter: u8,
    enclosure: u8,
    skip_lines: usize,
    columns: Vec<String>,
    offset: usize,
    limit: Option<usize>,
}

impl CsvDataProvider {
    pub fn from_request(request: &ProviderRequest<'_>) -> Result<Self> {
        let options: CsvOptions = request.parse_options()?;
        let context = format!(
            "preset part \"{}/{}\" settings",
            request.context.preset, request.context.part
        );
        let path = options
            .csv_file_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| Error::missing_option("csv_file_path", &context))?;
        if !path.is_file() {
            return Err(DataProviderError::FileNotFound(path.display().to_string()).into());
        }

        let delimiter = single_byte(options.csv_delimiter.as_deref(), b',', "csv_delimiter", &context)?;
        let enclosure = single_byte(options.csv_enclosure.as_deref(), b'"', "csv_enclosure", &context)?;
        let (offset, limit) = request.window();

        log::debug!(
            "CSV provider will read from \"{}\", using {} as delimiter and {} as enclosure character",
            path.display(),
            delimiter as char,
            enclosure as char
        );

        Ok(Self {
            path,
            delimiter,
            enclosure,
            skip_lines: options.skip_header.map(SkipHeader::lines).unwrap_or(0),
            columns: options.columns,
            offset,
            limit,
        })
    }

    fn to_record(&self, fields: &csv::StringRecord) -> Record {
        fields
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                let key = self
                    .columns
                    .get(idx)
                    .cloned()
                    .unwrap_or_else(|| idx.to_string());
                (key, Value::String(value.to_string()))
            })
            .collect()
    }
}

impl DataProvider for CsvDataProvider {
    fn fetch(&mut self) -> Result<Vec<Record>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.enclosure)
            .from_path(&self.path)?;

        let mut records = Vec::new();
        let mut lines = 0usize;
        let mut position = 0usize;
        for result in reader.records() {
            let fields = result?;
            lines += 1;
            if lines <= self.skip_lines {
                continue;
            }
            if fields.get(0).map(str::is_empty).unwrap_or(true) {
                continue;
            }
            if position >= self.offset && self.limit.map_or(true, |l| position < self.offset + l) {
                records.push(self.to_record(&fields));
            }
            position += 1;
            if let Some(limit) = self.limit {
                if position >= self.offset + limit {
                    break;
                }
            }
        }

        log::debug!(
            "{}: read {} lines and found {} records",
            self.path.display(),
            lines,
            records.len()
        );
        Ok(records)
    }
}

fn single_byte(value: Option<&str>, default: u8, option: &str, context: &str) -> Result<u8> {
    match value {
        None => Ok(default),
        Some(s) if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        Some(_) => Err(Error::missing_option(option, context)),
    }
}
