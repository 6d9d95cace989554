use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use serde_json::Value;
use std::sync::Arc;

use contentimport_core::vault::VaultRepositoryTrait;
use contentimport_core::Result;
use contentimport_core::utils::time_utils::now_utc;

use super::model::VaultEntryDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::vault_entries;
use crate::utils::timestamp_to_text;

pub struct VaultRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl VaultRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        VaultRepository { pool, writer }
    }
}

#[async_trait]
impl VaultRepositoryTrait for VaultRepository {
    fn get(&self, preset: &str, key_hash: &str) -> Result<Option<Value>> {
        let mut conn = get_connection(&self.pool)?;
        let stored = vault_entries::table
            .find((preset, key_hash))
            .select(vault_entries::value)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        match stored {
            Some(text) => Ok(Some(
                serde_json::from_str(&text).map_err(StorageError::from)?,
            )),
            None => Ok(None),
        }
    }

    async fn set(&self, preset: &str, key_hash: &str, value: Value) -> Result<()> {
        let entry = VaultEntryDB {
            preset: preset.to_string(),
            key_hash: key_hash.to_string(),
            value: serde_json::to_string(&value).map_err(StorageError::from)?,
            created_at: timestamp_to_text(&now_utc()),
        };
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(vault_entries::table)
                    .values(&entry)
                    .on_conflict((vault_entries::preset, vault_entries::key_hash))
                    .do_update()
                    .set(vault_entries::value.eq(&entry.value))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn flush(&self, preset: &str) -> Result<usize> {
        let preset = preset.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let removed =
                    diesel::delete(vault_entries::table.filter(vault_entries::preset.eq(preset)))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                Ok(removed)
            })
            .await
    }
}
