// src/core/mod.rs

//! The central module containing the record model, storage backends and the
//! field-mutation toolkit.

pub mod errors;
pub mod migrations;
pub mod storage;
pub mod toolkit;
pub mod value;

pub use errors::ToolkitError;
pub use storage::{InMemoryStore, RecordStore, SqliteStore};
pub use toolkit::{Action, ActionOutcome, ConditionSet, MutationToolkit, TransformOp};
pub use value::{Document, FieldValue, Record, RecordMetadata};
