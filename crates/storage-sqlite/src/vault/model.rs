use diesel::prelude::*;

#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::vault_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VaultEntryDB {
    pub preset: String,
    pub key_hash: String,
    pub value: String,
    pub created_at: String,
}
