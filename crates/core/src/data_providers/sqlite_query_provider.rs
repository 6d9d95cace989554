use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{DataProvider, ProviderRequest, Record};
use crate::constants::DEFAULT_SOURCE;
use crate::errors::{DataProviderError, Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct SqliteQueryOptions {
    #[serde(default)]
    pub source: Option<String>,
    pub query: Option<String>,
}

/// Runs a SQL query against a named SQLite source.
pub struct SqliteQueryDataProvider {
    connection: Connection,
    query: String,
    offset: usize,
    limit: Option<usize>,
}

impl SqliteQueryDataProvider {
    pub fn from_request(request: &ProviderRequest<'_>) -> Result<Self> {
        let options: SqliteQueryOptions = request.parse_options()?;
        let context = format!(
            "preset part \"{}/{}\" settings",
            request.context.preset, request.context.part
        );
        let query = options
            .query
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| Error::missing_option("query", &context))?;
        let source_name = options.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string());
        let source = request
            .context
            .settings
            .source(&source_name)
            .ok_or_else(|| DataProviderError::UnknownSource(source_name.clone()))?;

        let connection = Connection::open_with_flags(
            &source.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let (offset, limit) = request.window();

        Ok(Self {
            connection,
            query: query.trim().trim_end_matches(';').to_string(),
            offset,
            limit,
        })
    }
}

impl DataProvider for SqliteQueryDataProvider {
    fn fetch(&mut self) -> Result<Vec<Record>> {
        let sql = match self.limit {
            Some(_) => format!("SELECT * FROM ({}) LIMIT ?1 OFFSET ?2", self.query),
            None => self.query.clone(),
        };
        let mut statement = self.connection.prepare(&sql)?;
        let columns: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<Record> {
            let mut record = Record::new();
            for (idx, name) in columns.iter().enumerate() {
                record.insert(name.clone(), to_json(row.get_ref(idx)?));
            }
            Ok(record)
        };

        let rows = match self.limit {
            Some(limit) => statement
                .query_map(params![limit as i64, self.offset as i64], map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
            None => statement
                .query_map([], map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        log::debug!("Query returned {} records", rows.len());
        Ok(rows)
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => json!(i),
        ValueRef::Real(f) => json!(f),
        ValueRef::Text(bytes) => json!(String::from_utf8_lossy(bytes)),
        ValueRef::Blob(bytes) => json!(hex::encode(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_providers::ProviderContext;
    use crate::settings::{Settings, SourceSettings};
    use crate::test_support::InMemoryVaultRepository;
    use crate::vault::Vault;
    use serde_json::Map;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn request_context(path: &str) -> ProviderContext {
        let mut settings = Settings::default();
        settings.sources.insert(
            "default".to_string(),
            SourceSettings {
                path: path.to_string(),
            },
        );
        ProviderContext {
            preset: "news".to_string(),
            part: "articles".to_string(),
            settings: Arc::new(settings),
            vault: Vault::new("news", Arc::new(InMemoryVaultRepository::default())),
        }
    }

    #[test]
    fn test_query_is_windowed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("source.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE articles (id INTEGER PRIMARY KEY, title TEXT, score REAL);
             INSERT INTO articles VALUES (1, 'One', 1.5), (2, 'Two', NULL), (3, 'Three', 3.0);",
        )
        .unwrap();
        drop(conn);

        let options: Map<String, Value> =
            json!({"query": "SELECT id, title, score FROM articles ORDER BY id;"})
                .as_object()
                .cloned()
                .unwrap();
        let request = ProviderRequest {
            options: &options,
            offset: Some(1),
            limit: Some(5),
            context: request_context(&path.display().to_string()),
        };
        let records = SqliteQueryDataProvider::from_request(&request)
            .unwrap()
            .fetch()
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], json!(2));
        assert_eq!(records[0]["score"], Value::Null);
        assert_eq!(records[1]["title"], json!("Three"));
    }

    #[test]
    fn test_unknown_source_fails() {
        let options: Map<String, Value> = json!({"query": "SELECT 1", "source": "legacy"})
            .as_object()
            .cloned()
            .unwrap();
        let request = ProviderRequest {
            options: &options,
            offset: None,
            limit: None,
            context: request_context("/tmp/unused.db"),
        };
        assert!(matches!(
            SqliteQueryDataProvider::from_request(&request),
            Err(Error::DataProvider(DataProviderError::UnknownSource(_)))
        ));
    }
}
