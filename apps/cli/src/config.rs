use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "./data/importer.db";
const DEFAULT_SETTINGS_PATH: &str = "./importer.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Environment configuration of the binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub settings_path: PathBuf,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            db_path: non_empty("CI_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            settings_path: non_empty("CI_SETTINGS")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH)),
            log_format: non_empty("CI_LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(LogFormat::Text),
        }
    }
}
