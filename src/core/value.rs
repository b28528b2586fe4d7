// src/core/value.rs

//! The record model shared by the toolkit and the storage backends.
//!
//! A record's data lives in a flat JSON document mapping field names to scalars.
//! Values are a closed set (`String | Number | Bool | Null`) so that every
//! conversion the transforms perform is explicit.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;
use strum_macros::{AsRefStr, Display, EnumString};

/// The protected fields. They may be read and used in conditions, never altered.
pub const METADATA_FIELDS: [&str; 4] = [
    "Date_taken",
    "Examiner",
    "Candidate_Age",
    "Window_Difference",
];

/// Suffix of the advisory status field that accompanies some instrument fields.
pub const STATUS_SUFFIX: &str = "_status";

/// Returns true if `field` names one of the protected metadata fields.
pub fn is_metadata_field(field: &str) -> bool {
    METADATA_FIELDS.contains(&field)
}

/// A single scalar stored in a record document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl FieldValue {
    /// The string form used for every equality comparison.
    pub fn as_comparable(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => format_json_number(n),
            FieldValue::String(s) => s.clone(),
        }
    }

    /// Interprets the value as a number. Strings count as numeric when their
    /// trimmed content parses as a finite float.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Null | FieldValue::Bool(_) => None,
            FieldValue::Number(n) => n.as_f64(),
            FieldValue::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        }
    }

    /// Compares two values the way conditions do: by their string form.
    pub fn loosely_equals(&self, other: &FieldValue) -> bool {
        self.as_comparable() == other.as_comparable()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_comparable())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(Number::from(n))
    }
}

/// Formats a serde_json::Number to a string, omitting trailing `.0` for whole numbers.
pub fn format_json_number(num: &Number) -> String {
    match num.as_f64() {
        Some(f)
            if num.is_f64() && f.fract() == 0.0 && f < i64::MAX as f64 && f >= i64::MIN as f64 =>
        {
            (f as i64).to_string()
        }
        _ => num.to_string(),
    }
}

/// Converts an arithmetic result back to a JSON number, keeping whole numbers
/// integral. Returns `None` for NaN and infinities.
pub fn number_from_f64(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value < i64::MAX as f64 && value >= i64::MIN as f64 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

/// A record's JSON document. Key order is preserved end to end.
pub type Document = IndexMap<String, FieldValue>;

/// Decodes a stored JSON document. An empty or missing payload is an empty document.
pub fn decode_document(raw: Option<&str>) -> Result<Document, serde_json::Error> {
    match raw {
        Some(text) if !text.trim().is_empty() => serde_json::from_str(text),
        _ => Ok(Document::new()),
    }
}

/// Protected metadata carried alongside a record's document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    #[serde(rename = "Date_taken")]
    pub date_taken: Option<String>,
    #[serde(rename = "Examiner")]
    pub examiner: Option<String>,
    #[serde(rename = "Candidate_Age")]
    pub candidate_age: Option<String>,
    #[serde(rename = "Window_Difference")]
    pub window_difference: Option<String>,
}

impl RecordMetadata {
    /// Looks up a metadata value by its field name.
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            "Date_taken" => self.date_taken.as_deref(),
            "Examiner" => self.examiner.as_deref(),
            "Candidate_Age" => self.candidate_age.as_deref(),
            "Window_Difference" => self.window_difference.as_deref(),
            _ => None,
        }
    }
}

/// One stored row: a unique CommentID, its document and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub comment_id: String,
    pub document: Document,
    #[serde(default)]
    pub metadata: RecordMetadata,
}

impl Record {
    pub fn new(comment_id: impl Into<String>, document: Document) -> Self {
        Self {
            comment_id: comment_id.into(),
            document,
            metadata: RecordMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: RecordMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// The value written to the `Required_elements_completed` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
pub enum CompletionFlag {
    #[strum(serialize = "Y")]
    Yes,
    #[strum(serialize = "N")]
    No,
}

impl CompletionFlag {
    /// Maps a legacy `Data_entry_completion_status` value to a flag.
    pub fn from_legacy_status(status: &FieldValue) -> Option<Self> {
        match status {
            FieldValue::String(s) if s == "Complete" => Some(CompletionFlag::Yes),
            FieldValue::String(s) if s == "Incomplete" => Some(CompletionFlag::No),
            _ => None,
        }
    }
}
