// src/core/toolkit/mod.rs

//! The field-mutation toolkit: locates records by condition, applies a change to
//! one field of each record's JSON document, persists what changed and reports
//! how many records were altered.

pub mod accessor;
pub mod action;
pub mod predicate;
pub mod transform;

pub use self::action::{Action, ActionOutcome};
pub use self::predicate::ConditionSet;
pub use self::transform::TransformOp;

use crate::core::ToolkitError;
use crate::core::storage::RecordStore;
use crate::core::value::{Document, FieldValue, Record, STATUS_SUFFIX, is_metadata_field};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

/// A record's identifier paired with its whole document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSelection {
    pub comment_id: String,
    pub document: Document,
}

/// A record's identifier paired with the value of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSelection {
    pub comment_id: String,
    pub value: FieldValue,
}

/// Operates on the records of a single instrument through a [`RecordStore`].
pub struct MutationToolkit<S: RecordStore> {
    store: S,
    instrument: String,
}

impl<S: RecordStore> MutationToolkit<S> {
    /// Creates a toolkit for `instrument`. Fails if the store holds no records
    /// for that instrument.
    pub fn new(store: S, instrument: impl Into<String>) -> Result<Self, ToolkitError> {
        let instrument = instrument.into();
        if !store.instrument_exists(&instrument)? {
            return Err(ToolkitError::UnknownInstrument(instrument));
        }
        Ok(Self { store, instrument })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns true if `field` is a protected metadata field.
    pub fn check_metadata(&self, field: &str) -> bool {
        is_metadata_field(field)
    }

    /// Rejects protected metadata fields before any storage access.
    pub fn ensure_not_metadata(&self, field: &str) -> Result<(), ToolkitError> {
        if self.check_metadata(field) {
            return Err(ToolkitError::Metadata(field.to_string()));
        }
        Ok(())
    }

    /// Returns true if any record carries a `<field>_status` companion field.
    pub fn status_field_exists(&self, field: &str) -> Result<bool, ToolkitError> {
        let status_field = format!("{field}{STATUS_SUFFIX}");
        Ok(self
            .store
            .fetch_all(&self.instrument)?
            .iter()
            .any(|record| record.document.contains_key(&status_field)))
    }

    fn matching(&self, conditions: &ConditionSet) -> Result<Vec<Record>, ToolkitError> {
        let mut records = self.store.fetch_all(&self.instrument)?;
        records.retain(|record| conditions.matches(record));
        Ok(records)
    }

    /// CommentIDs of the records matching `conditions`.
    pub fn select(&self, conditions: &ConditionSet) -> Result<Vec<String>, ToolkitError> {
        Ok(self
            .matching(conditions)?
            .into_iter()
            .map(|record| record.comment_id)
            .collect())
    }

    /// CommentIDs and full documents of the records matching `conditions`.
    pub fn select_all(
        &self,
        conditions: &ConditionSet,
    ) -> Result<Vec<DocumentSelection>, ToolkitError> {
        Ok(self
            .matching(conditions)?
            .into_iter()
            .map(|record| DocumentSelection {
                comment_id: record.comment_id,
                document: record.document,
            })
            .collect())
    }

    /// CommentIDs and the value of `target` for matching records that have it.
    pub fn select_field(
        &self,
        target: &str,
        conditions: &ConditionSet,
    ) -> Result<Vec<FieldSelection>, ToolkitError> {
        Ok(self
            .matching(conditions)?
            .into_iter()
            .filter_map(|mut record| {
                record
                    .document
                    .shift_remove(target)
                    .map(|value| FieldSelection {
                        comment_id: record.comment_id,
                        value,
                    })
            })
            .collect())
    }

    /// Renames a field in every record that has it and lacks `new_name`.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<u64, ToolkitError> {
        self.ensure_not_metadata(old_name)?;
        self.ensure_not_metadata(new_name)?;
        self.apply_bulk("rename", old_name, None, |record| {
            Ok(accessor::rename(&record.document, old_name, new_name))
        })
    }

    /// Removes a field from every record that has it.
    pub fn drop(&self, field: &str) -> Result<u64, ToolkitError> {
        self.ensure_not_metadata(field)?;
        self.apply_bulk("drop", field, None, |record| {
            Ok(accessor::drop(&record.document, field))
        })
    }

    /// Sets `field` to `value` on every matching record.
    ///
    /// Records already holding an equal value are left alone and not counted.
    /// Without `overrule` only records that already have the field are
    /// eligible; with it the field is created where missing.
    pub fn modify(
        &self,
        field: &str,
        value: &FieldValue,
        conditions: &ConditionSet,
        overrule: bool,
    ) -> Result<u64, ToolkitError> {
        self.ensure_not_metadata(field)?;
        self.apply_bulk("modify", field, Some(conditions), |record| {
            match accessor::get(&record.document, field) {
                Some(current) if current.loosely_equals(value) => Ok(None),
                None if !overrule => Ok(None),
                _ => Ok(Some(accessor::set(&record.document, field, value.clone()))),
            }
        })
    }

    /// Applies `op` with `operand` to `field` on every matching record (every
    /// record when `conditions` is `None`) that has the field.
    ///
    /// Without `overrule`, an invalid operand or a failing transform aborts the
    /// whole call before anything is written. With `overrule`, the operand is
    /// not pre-checked and records whose transform fails are skipped.
    pub fn custom_modify(
        &self,
        field: &str,
        op: TransformOp,
        operand: &FieldValue,
        conditions: Option<&ConditionSet>,
        overrule: bool,
    ) -> Result<u64, ToolkitError> {
        self.ensure_not_metadata(field)?;
        if !overrule {
            op.validate_operand(operand)?;
        }
        self.apply_bulk("custom_modify", field, conditions, |record| {
            let Some(current) = accessor::get(&record.document, field) else {
                return Ok(None);
            };
            let updated = match op.apply(current, operand) {
                Ok(updated) => updated,
                Err(e) if overrule => {
                    warn!(
                        comment_id = %record.comment_id,
                        field,
                        operation = %op,
                        "skipping record: {e}"
                    );
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };
            let unchanged = if op.is_numeric() {
                updated.as_number() == current.as_number()
            } else {
                updated.loosely_equals(current)
            };
            if unchanged {
                return Ok(None);
            }
            Ok(Some(accessor::set(&record.document, field, updated)))
        })
    }

    /// Plans every change first, then writes the documents that differ.
    ///
    /// `change` returns the new document for a record, `None` to leave it
    /// alone, or an error that aborts the call with nothing written.
    fn apply_bulk<F>(
        &self,
        action: &str,
        field: &str,
        conditions: Option<&ConditionSet>,
        mut change: F,
    ) -> Result<u64, ToolkitError>
    where
        F: FnMut(&Record) -> Result<Option<Document>, ToolkitError>,
    {
        let _span = info_span!("bulk", action, instrument = %self.instrument, field).entered();

        let mut planned = Vec::new();
        for record in self.store.fetch_all(&self.instrument)? {
            if let Some(conditions) = conditions
                && !conditions.matches(&record)
            {
                continue;
            }
            if let Some(document) = change(&record)?
                && document != record.document
            {
                planned.push((record.comment_id, document));
            }
        }

        let mut changed = 0;
        for (comment_id, document) in &planned {
            if self
                .store
                .update_record(&self.instrument, comment_id, document)?
            {
                debug!(comment_id = %comment_id, "record updated");
                changed += 1;
            } else {
                warn!(comment_id = %comment_id, "record vanished before it could be updated");
            }
        }

        info!(planned = planned.len(), changed, "{action} finished");
        Ok(changed)
    }
}
