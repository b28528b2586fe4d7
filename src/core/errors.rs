// src/core/errors.rs

//! Defines the primary error type for the toolkit.

use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing every failure the toolkit can report.
///
/// A mutation that simply matches nothing is not an error: it returns a change
/// count of zero. Only the variants below abort a command.
#[derive(Error, Debug, Clone)]
pub enum ToolkitError {
    /// An attempt to rename, drop or modify one of the protected metadata fields.
    #[error("Can not alter metadata value '{0}'")]
    Metadata(String),

    /// A numeric transform received a value that is not numeric.
    #[error("Non-numeric value '{value}' given for {op} operation")]
    InvalidOperand { op: String, value: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Instrument '{0}' does not exist")]
    UnknownInstrument(String),

    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Invalid table name '{0}'")]
    InvalidTableName(String),

    #[error("Storage Error: {0}")]
    Storage(String),

    #[error("JSON Error: {0}")]
    Json(Arc<serde_json::Error>),
}

impl PartialEq for ToolkitError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ToolkitError::Metadata(s1), ToolkitError::Metadata(s2)) => s1 == s2,
            (
                ToolkitError::InvalidOperand { op: o1, value: v1 },
                ToolkitError::InvalidOperand { op: o2, value: v2 },
            ) => o1 == o2 && v1 == v2,
            (ToolkitError::UnknownInstrument(s1), ToolkitError::UnknownInstrument(s2)) => s1 == s2,
            (ToolkitError::UnknownOperation(s1), ToolkitError::UnknownOperation(s2)) => s1 == s2,
            (ToolkitError::InvalidArguments(s1), ToolkitError::InvalidArguments(s2)) => s1 == s2,
            (ToolkitError::InvalidTableName(s1), ToolkitError::InvalidTableName(s2)) => s1 == s2,
            (ToolkitError::Storage(s1), ToolkitError::Storage(s2)) => s1 == s2,
            (ToolkitError::Json(e1), ToolkitError::Json(e2)) => e1.to_string() == e2.to_string(),
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

// --- From trait implementations for easy error conversion ---

impl From<serde_json::Error> for ToolkitError {
    fn from(e: serde_json::Error) -> Self {
        ToolkitError::Json(Arc::new(e))
    }
}

impl From<rusqlite::Error> for ToolkitError {
    fn from(e: rusqlite::Error) -> Self {
        ToolkitError::Storage(e.to_string())
    }
}
