// src/core/storage/mod.rs

//! The persistence collaborator consumed by the toolkit, and its backends.

use crate::core::ToolkitError;
use crate::core::value::{CompletionFlag, Document, Record};

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Abstract storage for instrument records.
///
/// The toolkit never creates or deletes records. It reads every record of one
/// instrument and writes back whole documents, one row at a time. Methods take
/// `&self`; backends use interior mutability.
pub trait RecordStore {
    /// Returns every record stored for `instrument`, in storage order.
    fn fetch_all(&self, instrument: &str) -> Result<Vec<Record>, ToolkitError>;

    /// Replaces the document of one record. Returns false if no row was updated.
    fn update_record(
        &self,
        instrument: &str,
        comment_id: &str,
        document: &Document,
    ) -> Result<bool, ToolkitError>;

    /// Returns true if at least one record exists for `instrument`.
    fn instrument_exists(&self, instrument: &str) -> Result<bool, ToolkitError>;

    /// Returns the distinct instrument names present in storage, sorted.
    fn instruments(&self) -> Result<Vec<String>, ToolkitError>;

    /// Writes the `Required_elements_completed` flag of one record.
    fn set_completion_flag(
        &self,
        instrument: &str,
        comment_id: &str,
        flag: CompletionFlag,
    ) -> Result<bool, ToolkitError>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn fetch_all(&self, instrument: &str) -> Result<Vec<Record>, ToolkitError> {
        (**self).fetch_all(instrument)
    }

    fn update_record(
        &self,
        instrument: &str,
        comment_id: &str,
        document: &Document,
    ) -> Result<bool, ToolkitError> {
        (**self).update_record(instrument, comment_id, document)
    }

    fn instrument_exists(&self, instrument: &str) -> Result<bool, ToolkitError> {
        (**self).instrument_exists(instrument)
    }

    fn instruments(&self) -> Result<Vec<String>, ToolkitError> {
        (**self).instruments()
    }

    fn set_completion_flag(
        &self,
        instrument: &str,
        comment_id: &str,
        flag: CompletionFlag,
    ) -> Result<bool, ToolkitError> {
        (**self).set_completion_flag(instrument, comment_id, flag)
    }
}
