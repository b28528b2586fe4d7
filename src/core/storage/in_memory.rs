// src/core/storage/in_memory.rs

//! A map-backed record store for tests, benches and dry runs.

use super::RecordStore;
use crate::core::ToolkitError;
use crate::core::value::{CompletionFlag, Document, Record};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct StoredInstrument {
    records: IndexMap<String, Record>,
    flags: IndexMap<String, CompletionFlag>,
}

/// In-memory record store keyed by instrument, then CommentID.
///
/// Insertion order is the iteration order. Clone-friendly via Arc, so a test can
/// keep a handle while a toolkit owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    instruments: Arc<RwLock<BTreeMap<String, StoredInstrument>>>,
    writes: Arc<RwLock<u64>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record.
    pub fn insert(&self, instrument: &str, record: Record) {
        let mut instruments = self.instruments.write();
        instruments
            .entry(instrument.to_string())
            .or_default()
            .records
            .insert(record.comment_id.clone(), record);
    }

    /// Returns a copy of one record.
    pub fn get(&self, instrument: &str, comment_id: &str) -> Option<Record> {
        self.instruments
            .read()
            .get(instrument)
            .and_then(|stored| stored.records.get(comment_id))
            .cloned()
    }

    /// Returns the completion flag last written for a record, if any.
    pub fn completion_flag(&self, instrument: &str, comment_id: &str) -> Option<CompletionFlag> {
        self.instruments
            .read()
            .get(instrument)
            .and_then(|stored| stored.flags.get(comment_id))
            .copied()
    }

    /// The number of successful `update_record` calls so far.
    pub fn write_count(&self) -> u64 {
        *self.writes.read()
    }
}

impl RecordStore for InMemoryStore {
    fn fetch_all(&self, instrument: &str) -> Result<Vec<Record>, ToolkitError> {
        Ok(self
            .instruments
            .read()
            .get(instrument)
            .map(|stored| stored.records.values().cloned().collect())
            .unwrap_or_default())
    }

    fn update_record(
        &self,
        instrument: &str,
        comment_id: &str,
        document: &Document,
    ) -> Result<bool, ToolkitError> {
        let mut instruments = self.instruments.write();
        let Some(record) = instruments
            .get_mut(instrument)
            .and_then(|stored| stored.records.get_mut(comment_id))
        else {
            return Ok(false);
        };
        record.document = document.clone();
        *self.writes.write() += 1;
        Ok(true)
    }

    fn instrument_exists(&self, instrument: &str) -> Result<bool, ToolkitError> {
        Ok(self
            .instruments
            .read()
            .get(instrument)
            .is_some_and(|stored| !stored.records.is_empty()))
    }

    fn instruments(&self) -> Result<Vec<String>, ToolkitError> {
        Ok(self
            .instruments
            .read()
            .iter()
            .filter(|(_, stored)| !stored.records.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn set_completion_flag(
        &self,
        instrument: &str,
        comment_id: &str,
        flag: CompletionFlag,
    ) -> Result<bool, ToolkitError> {
        let mut instruments = self.instruments.write();
        let Some(stored) = instruments.get_mut(instrument) else {
            return Ok(false);
        };
        if !stored.records.contains_key(comment_id) {
            return Ok(false);
        }
        stored.flags.insert(comment_id.to_string(), flag);
        Ok(true)
    }
}
