//! SQLite signature store.
//!
//! File-based persistent storage; `in_memory()` backs tests. SQLite has no
//! native `ON UPDATE` clause for timestamp columns, so an `AFTER UPDATE`
//! trigger refreshes `UPDATED_TIME` on every row modification.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::domain::{SignatureRecord, SignatureStore};
use crate::error::Result;

mod sql {
    pub const INSERT_SIGNATURE: &str = "INSERT INTO AM_API_MINHASH \
         (API_UUID, SIGNATURE_BLOB, ORGANIZATION, CREATED_TIME, UPDATED_TIME) \
         VALUES (?1, ?2, ?3, ?4, ?5)";

    pub const UPDATE_SIGNATURE: &str = "UPDATE AM_API_MINHASH SET SIGNATURE_BLOB = ?1, UPDATED_TIME = ?2 \
         WHERE API_UUID = ?3 AND ORGANIZATION = ?4";

    pub const GET_SIGNATURE: &str = "SELECT API_UUID, SIGNATURE_BLOB, ORGANIZATION, CREATED_TIME, UPDATED_TIME \
         FROM AM_API_MINHASH WHERE API_UUID = ?1 AND ORGANIZATION = ?2";

    pub const GET_ALL_SIGNATURES: &str = "SELECT API_UUID, SIGNATURE_BLOB, ORGANIZATION, CREATED_TIME, UPDATED_TIME \
         FROM AM_API_MINHASH";

    pub const GET_ALL_SIGNATURES_BY_ORG: &str = "SELECT API_UUID, SIGNATURE_BLOB, ORGANIZATION, CREATED_TIME, UPDATED_TIME \
         FROM AM_API_MINHASH WHERE ORGANIZATION = ?1";

    pub const DELETE_SIGNATURE: &str =
        "DELETE FROM AM_API_MINHASH WHERE API_UUID = ?1 AND ORGANIZATION = ?2";

    pub const DELETE_ALL_SIGNATURES_BY_ORG: &str =
        "DELETE FROM AM_API_MINHASH WHERE ORGANIZATION = ?1";

    pub const CHECK_SIGNATURE_EXISTS: &str =
        "SELECT 1 FROM AM_API_MINHASH WHERE API_UUID = ?1 AND ORGANIZATION = ?2";
}

/// SQLite-backed `SignatureStore` implementation.
#[derive(Clone)]
pub struct SqliteSignatureStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSignatureStore {
    /// Opens (or creates) a store at the given path.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Creates an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS AM_API_MINHASH (
                API_UUID TEXT NOT NULL,
                SIGNATURE_BLOB BLOB NOT NULL,
                ORGANIZATION TEXT NOT NULL,
                CREATED_TIME INTEGER NOT NULL,
                UPDATED_TIME INTEGER NOT NULL,
                PRIMARY KEY (API_UUID, ORGANIZATION)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS IDX_AM_API_MINHASH_ORG
             ON AM_API_MINHASH(ORGANIZATION)",
            [],
        )?;

        // SQLite has no ON UPDATE for timestamp columns.
        conn.execute(
            "CREATE TRIGGER IF NOT EXISTS TRG_AM_API_MINHASH_UPDATED
             AFTER UPDATE ON AM_API_MINHASH
             FOR EACH ROW
             BEGIN
                 UPDATE AM_API_MINHASH SET UPDATED_TIME = strftime('%s', 'now')
                 WHERE API_UUID = NEW.API_UUID AND ORGANIZATION = NEW.ORGANIZATION;
             END",
            [],
        )?;

        Ok(())
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<SignatureRecord> {
        Ok(SignatureRecord {
            api_uuid: row.get(0)?,
            signature_blob: row.get(1)?,
            organization: row.get(2)?,
            created_time: DateTime::from_timestamp(row.get(3)?, 0).unwrap_or_default(),
            updated_time: DateTime::from_timestamp(row.get(4)?, 0).unwrap_or_default(),
        })
    }
}

impl SignatureStore for SqliteSignatureStore {
    fn insert(&self, record: &SignatureRecord) -> Result<()> {
        let conn = self.conn.lock()?;
        let now = Utc::now().timestamp();
        conn.execute(
            sql::INSERT_SIGNATURE,
            params![
                &record.api_uuid,
                &record.signature_blob,
                &record.organization,
                now,
                now
            ],
        )?;

        debug!(api_uuid = %record.api_uuid, "stored signature");
        Ok(())
    }

    fn update(&self, record: &SignatureRecord) -> Result<()> {
        let conn = self.conn.lock()?;
        let now = Utc::now().timestamp();
        let updated = conn.execute(
            sql::UPDATE_SIGNATURE,
            params![
                &record.signature_blob,
                now,
                &record.api_uuid,
                &record.organization
            ],
        )?;

        if updated == 0 {
            tracing::warn!(api_uuid = %record.api_uuid, "no signature found to update");
        } else {
            debug!(api_uuid = %record.api_uuid, "updated signature");
        }
        Ok(())
    }

    fn get(&self, api_uuid: &str, organization: &str) -> Result<Option<SignatureRecord>> {
        let conn = self.conn.lock()?;
        let record = conn
            .query_row(sql::GET_SIGNATURE, params![api_uuid, organization], |row| {
                Self::map_row(row)
            })
            .optional()?;
        Ok(record)
    }

    fn get_all(&self) -> Result<Vec<SignatureRecord>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(sql::GET_ALL_SIGNATURES)?;
        let records = stmt
            .query_map([], |row| Self::map_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn get_all_by_organization(&self, organization: &str) -> Result<Vec<SignatureRecord>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(sql::GET_ALL_SIGNATURES_BY_ORG)?;
        let records = stmt
            .query_map(params![organization], |row| Self::map_row(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn delete(&self, api_uuid: &str, organization: &str) -> Result<()> {
        let conn = self.conn.lock()?;
        let deleted = conn.execute(sql::DELETE_SIGNATURE, params![api_uuid, organization])?;
        debug!(api_uuid, deleted, "deleted signature rows");
        Ok(())
    }

    fn delete_all_by_organization(&self, organization: &str) -> Result<()> {
        let conn = self.conn.lock()?;
        let deleted = conn.execute(sql::DELETE_ALL_SIGNATURES_BY_ORG, params![organization])?;
        debug!(organization, deleted, "deleted organization signature rows");
        Ok(())
    }

    fn exists(&self, api_uuid: &str, organization: &str) -> Result<bool> {
        let conn = self.conn.lock()?;
        let found = conn
            .query_row(
                sql::CHECK_SIGNATURE_EXISTS,
                params![api_uuid, organization],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}
