// src/core/storage/sqlite.rs

//! SQLite-backed record store.
//!
//! Records live in a flag-style table: one row per CommentID, tagged with the
//! instrument (`Test_name`) it belongs to, holding the JSON document in `Data`
//! and the protected metadata in their own columns.

use super::RecordStore;
use crate::core::ToolkitError;
use crate::core::value::{CompletionFlag, Document, Record, RecordMetadata, decode_document};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use tracing::debug;

/// The default name of the table holding instrument data.
pub const DEFAULT_FLAG_TABLE: &str = "flag";

/// SQLite implementation of [`RecordStore`].
pub struct SqliteStore {
    conn: Mutex<Connection>,
    table: String,
}

impl SqliteStore {
    /// Opens (or creates) a database file and makes sure the flag table exists.
    pub fn open(path: &Path, table: &str) -> Result<Self, ToolkitError> {
        let conn = Connection::open(path)
            .map_err(|e| ToolkitError::Storage(format!("open {}: {e}", path.display())))?;
        Self::init_with_connection(conn, table)
    }

    /// Creates an in-memory database (for testing).
    pub fn open_in_memory(table: &str) -> Result<Self, ToolkitError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ToolkitError::Storage(format!("open_in_memory: {e}")))?;
        Self::init_with_connection(conn, table)
    }

    fn init_with_connection(conn: Connection, table: &str) -> Result<Self, ToolkitError> {
        validate_table_name(table)?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                CommentID TEXT PRIMARY KEY,
                Test_name TEXT NOT NULL,
                Data TEXT,
                Date_taken TEXT,
                Examiner TEXT,
                Candidate_Age TEXT,
                Window_Difference TEXT,
                Required_elements_completed TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_test_name ON {table}(Test_name);"
        ))
        .map_err(|e| ToolkitError::Storage(format!("init_schema: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
        })
    }

    /// Inserts or replaces a record. Used to seed databases.
    pub fn insert(&self, instrument: &str, record: &Record) -> Result<(), ToolkitError> {
        let data = serde_json::to_string(&record.document)?;
        let conn = self.conn.lock();
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (CommentID, Test_name, Data, Date_taken, Examiner, Candidate_Age, Window_Difference)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                self.table
            ),
            params![
                record.comment_id,
                instrument,
                data,
                record.metadata.date_taken,
                record.metadata.examiner,
                record.metadata.candidate_age,
                record.metadata.window_difference,
            ],
        )?;
        Ok(())
    }

    /// Reads the `Required_elements_completed` column of one record.
    pub fn completion_flag(&self, comment_id: &str) -> Result<Option<String>, ToolkitError> {
        let conn = self.conn.lock();
        let flag = conn
            .query_row(
                &format!(
                    "SELECT Required_elements_completed FROM {} WHERE CommentID = ?1",
                    self.table
                ),
                params![comment_id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(flag.flatten())
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<(String, Option<String>, RecordMetadata)> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            RecordMetadata {
                date_taken: row.get(2)?,
                examiner: row.get(3)?,
                candidate_age: row.get(4)?,
                window_difference: row.get(5)?,
            },
        ))
    }
}

impl RecordStore for SqliteStore {
    fn fetch_all(&self, instrument: &str) -> Result<Vec<Record>, ToolkitError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT CommentID, Data, Date_taken, Examiner, Candidate_Age, Window_Difference
             FROM {} WHERE Test_name = ?1 ORDER BY rowid",
            self.table
        ))?;
        let rows = stmt
            .query_map(params![instrument], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(comment_id, data, metadata)| -> Result<Record, ToolkitError> {
                let document = decode_document(data.as_deref())?;
                Ok(Record {
                    comment_id,
                    document,
                    metadata,
                })
            })
            .collect()
    }

    fn update_record(
        &self,
        instrument: &str,
        comment_id: &str,
        document: &Document,
    ) -> Result<bool, ToolkitError> {
        let data = serde_json::to_string(document)?;
        let conn = self.conn.lock();
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET Data = ?1 WHERE CommentID = ?2 AND Test_name = ?3",
                self.table
            ),
            params![data, comment_id, instrument],
        )?;
        debug!(instrument, comment_id, updated, "updated record document");
        Ok(updated > 0)
    }

    fn instrument_exists(&self, instrument: &str) -> Result<bool, ToolkitError> {
        let conn = self.conn.lock();
        let found = conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE Test_name = ?1 LIMIT 1", self.table),
                params![instrument],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn instruments(&self) -> Result<Vec<String>, ToolkitError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT DISTINCT Test_name FROM {} ORDER BY Test_name",
            self.table
        ))?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn set_completion_flag(
        &self,
        instrument: &str,
        comment_id: &str,
        flag: CompletionFlag,
    ) -> Result<bool, ToolkitError> {
        let conn = self.conn.lock();
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET Required_elements_completed = ?1 WHERE CommentID = ?2 AND Test_name = ?3",
                self.table
            ),
            params![flag.as_ref(), comment_id, instrument],
        )?;
        Ok(updated > 0)
    }
}

/// Table names are interpolated into SQL, so only plain identifiers are accepted.
pub fn validate_table_name(table: &str) -> Result<(), ToolkitError> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ToolkitError::InvalidTableName(table.to_string()))
    }
}
