// src/core/toolkit/action.rs

//! Typed toolkit commands and their results.

use super::{ConditionSet, DocumentSelection, FieldSelection, MutationToolkit, TransformOp};
use crate::core::ToolkitError;
use crate::core::storage::RecordStore;
use crate::core::value::FieldValue;
use serde::Serialize;
use strum_macros::IntoStaticStr;
use tracing::info;

/// One toolkit operation with its arguments.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Select {
        conditions: ConditionSet,
    },
    SelectAll {
        conditions: ConditionSet,
    },
    SelectField {
        target: String,
        conditions: ConditionSet,
    },
    Rename {
        old_name: String,
        new_name: String,
    },
    Drop {
        field: String,
    },
    Modify {
        field: String,
        value: FieldValue,
        conditions: ConditionSet,
        overrule: bool,
    },
    CustomModify {
        field: String,
        op: TransformOp,
        operand: FieldValue,
        conditions: Option<ConditionSet>,
        overrule: bool,
    },
}

/// What an [`Action`] produced.
#[derive(Debug, Clone, PartialEq, Serialize, IntoStaticStr)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionOutcome {
    Ids {
        comment_ids: Vec<String>,
    },
    Documents {
        records: Vec<DocumentSelection>,
    },
    Values {
        records: Vec<FieldSelection>,
    },
    /// A mutation finished. `status_field` reports whether a `<field>_status`
    /// companion exists; it is advisory only.
    Changed {
        count: u64,
        status_field: bool,
    },
}

impl ActionOutcome {
    /// The `kind` tag this outcome serializes with.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl Action {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// The field a mutating action writes to, `None` for selects.
    pub fn mutated_field(&self) -> Option<&str> {
        match self {
            Action::Select { .. } | Action::SelectAll { .. } | Action::SelectField { .. } => None,
            Action::Rename { old_name, .. } => Some(old_name),
            Action::Drop { field }
            | Action::Modify { field, .. }
            | Action::CustomModify { field, .. } => Some(field),
        }
    }

    /// Runs the action against `toolkit`.
    pub fn execute<S: RecordStore>(
        &self,
        toolkit: &MutationToolkit<S>,
    ) -> Result<ActionOutcome, ToolkitError> {
        info!(action = self.name(), instrument = toolkit.instrument(), "executing");

        let count = match self {
            Action::Select { conditions } => {
                return Ok(ActionOutcome::Ids {
                    comment_ids: toolkit.select(conditions)?,
                });
            }
            Action::SelectAll { conditions } => {
                return Ok(ActionOutcome::Documents {
                    records: toolkit.select_all(conditions)?,
                });
            }
            Action::SelectField { target, conditions } => {
                return Ok(ActionOutcome::Values {
                    records: toolkit.select_field(target, conditions)?,
                });
            }
            Action::Rename { old_name, new_name } => toolkit.rename(old_name, new_name)?,
            Action::Drop { field } => toolkit.drop(field)?,
            Action::Modify {
                field,
                value,
                conditions,
                overrule,
            } => toolkit.modify(field, value, conditions, *overrule)?,
            Action::CustomModify {
                field,
                op,
                operand,
                conditions,
                overrule,
            } => toolkit.custom_modify(field, *op, operand, conditions.as_ref(), *overrule)?,
        };

        let status_field = match self.mutated_field() {
            Some(field) => toolkit.status_field_exists(field)?,
            None => false,
        };
        Ok(ActionOutcome::Changed {
            count,
            status_field,
        })
    }
}
