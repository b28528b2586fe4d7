// src/core/toolkit/predicate.rs

//! Equality-AND conditions over record fields.

use crate::core::ToolkitError;
use crate::core::value::Record;
use indexmap::IndexMap;
use serde::Serialize;

/// An ordered set of `field = value` conditions combined with logical AND.
///
/// Values are compared as strings. An empty set matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConditionSet {
    conditions: IndexMap<String, String>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ConditionSet::insert`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Adds a condition. A repeated field replaces the earlier expected value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.conditions.insert(field.into(), value.into());
    }

    /// Builds a set from flat `field value field value ...` arguments.
    pub fn from_flat_args<S: AsRef<str>>(args: &[S]) -> Result<Self, ToolkitError> {
        if args.len() % 2 != 0 {
            return Err(ToolkitError::InvalidArguments(format!(
                "conditions must be field/value pairs, got {} argument(s)",
                args.len()
            )));
        }
        Ok(args
            .chunks_exact(2)
            .fold(Self::new(), |set, pair| set.with(pair[0].as_ref(), pair[1].as_ref())))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.conditions.iter().map(|(f, v)| (f.as_str(), v.as_str()))
    }

    /// Returns true if every condition's field exists on the record, in its
    /// document or its metadata, with a value equal to the expected one.
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            match record.document.get(field) {
                Some(value) => value.as_comparable() == *expected,
                None => record.metadata.get(field) == Some(expected.as_str()),
            }
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |set, (field, value)| set.with(field, value))
    }
}
