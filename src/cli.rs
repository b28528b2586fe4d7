// src/cli.rs

//! Command-line model of the `json_data` binary and rendering of its results.

use crate::core::ToolkitError;
use crate::core::toolkit::{Action, ActionOutcome, ConditionSet, TransformOp};
use crate::core::value::{FieldValue, METADATA_FIELDS, STATUS_SUFFIX};
use clap::{Args, Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Trailing literal that bypasses value validation.
pub const OVERRULE_KEYWORD: &str = "overrule";

#[derive(Debug, Parser)]
#[command(name = "json_data", version)]
#[command(about = "View and manipulate instrument JSON data")]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Path to the SQLite database, overriding the configuration.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Select CommentIDs where FIELD has VALUE.
    Select(SelectArgs),
    /// Select CommentIDs and full data where FIELD has VALUE.
    #[command(alias = "selectall")]
    SelectAll(SelectArgs),
    /// Select CommentIDs and the value of SELECTED where FIELD has VALUE.
    #[command(alias = "selectfield")]
    SelectField(SelectFieldArgs),
    /// Rename the field OLD to NEW.
    Rename(RenameArgs),
    /// Drop FIELD. Data held in the field is lost.
    Drop(DropArgs),
    /// Set FIELD to NEW_VALUE where the conditions hold.
    Modify(ModifyArgs),
    /// Apply add, multiply, divide or concat to FIELD.
    #[command(alias = "custommodify")]
    CustomModify(CustomModifyArgs),
    /// Move Data_entry_completion_status into the Required_elements_completed flag.
    MigrateCompletionFlag,
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    pub instrument: String,
    pub field: String,
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

#[derive(Debug, Args)]
pub struct SelectFieldArgs {
    pub instrument: String,
    pub selected: String,
    pub field: String,
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    pub instrument: String,
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Args)]
pub struct DropArgs {
    pub instrument: String,
    pub field: String,
}

#[derive(Debug, Args)]
pub struct ModifyArgs {
    pub instrument: String,
    pub field: String,
    #[arg(allow_hyphen_values = true)]
    pub new_value: String,
    /// Condition field/value pairs, optionally followed by `overrule`.
    pub trailing: Vec<String>,
    /// Bypass value validation.
    #[arg(long)]
    pub overrule: bool,
}

#[derive(Debug, Args)]
pub struct CustomModifyArgs {
    pub instrument: String,
    pub field: String,
    /// One of add, multiply, divide, concat.
    pub operation: String,
    #[arg(allow_hyphen_values = true)]
    pub operand: String,
    /// Condition field/value pairs, optionally followed by `overrule`.
    pub trailing: Vec<String>,
    /// Bypass value validation.
    #[arg(long)]
    pub overrule: bool,
}

/// A fully parsed invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Toolkit { instrument: String, action: Action },
    MigrateCompletionFlag,
}

/// Strips a trailing `overrule` keyword, combining it with the `--overrule` flag.
///
/// The keyword is only recognised when it is left over after the condition
/// pairs, so `Field overrule` stays a condition on the value `overrule`.
pub fn split_overrule(mut trailing: Vec<String>, flag: bool) -> (Vec<String>, bool) {
    let keyword = trailing.len() % 2 == 1
        && trailing.last().is_some_and(|last| last == OVERRULE_KEYWORD);
    if keyword {
        trailing.pop();
    }
    (trailing, flag || keyword)
}

impl Command {
    /// Converts parsed arguments into a typed request.
    pub fn into_request(self) -> Result<Request, ToolkitError> {
        let (instrument, action) = match self {
            Command::MigrateCompletionFlag => return Ok(Request::MigrateCompletionFlag),
            Command::Select(args) => (
                args.instrument,
                Action::Select {
                    conditions: ConditionSet::new().with(args.field, args.value),
                },
            ),
            Command::SelectAll(args) => (
                args.instrument,
                Action::SelectAll {
                    conditions: ConditionSet::new().with(args.field, args.value),
                },
            ),
            Command::SelectField(args) => (
                args.instrument,
                Action::SelectField {
                    target: args.selected,
                    conditions: ConditionSet::new().with(args.field, args.value),
                },
            ),
            Command::Rename(args) => (
                args.instrument,
                Action::Rename {
                    old_name: args.old_name,
                    new_name: args.new_name,
                },
            ),
            Command::Drop(args) => (args.instrument, Action::Drop { field: args.field }),
            Command::Modify(args) => {
                let (pairs, overrule) = split_overrule(args.trailing, args.overrule);
                (
                    args.instrument,
                    Action::Modify {
                        field: args.field,
                        value: FieldValue::String(args.new_value),
                        conditions: ConditionSet::from_flat_args(&pairs)?,
                        overrule,
                    },
                )
            }
            Command::CustomModify(args) => {
                let op = TransformOp::parse(&args.operation)?;
                let (pairs, overrule) = split_overrule(args.trailing, args.overrule);
                let conditions = if pairs.is_empty() {
                    None
                } else {
                    Some(ConditionSet::from_flat_args(&pairs)?)
                };
                (
                    args.instrument,
                    Action::CustomModify {
                        field: args.field,
                        op,
                        operand: FieldValue::String(args.operand),
                        conditions,
                        overrule,
                    },
                )
            }
        };
        Ok(Request::Toolkit { instrument, action })
    }
}

fn describe_conditions(conditions: &ConditionSet) -> String {
    if conditions.is_empty() {
        return "any record".to_string();
    }
    conditions
        .iter()
        .map(|(field, value)| format!("the field {field} has the value {value}"))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Renders the human-readable report of an action's outcome.
///
/// Fails when `outcome` is not the kind `action` produces.
pub fn render_outcome(
    action: &Action,
    instrument: &str,
    outcome: &ActionOutcome,
) -> Result<String, ToolkitError> {
    let mut out = String::new();
    match (action, outcome) {
        (Action::Select { conditions }, ActionOutcome::Ids { comment_ids }) => {
            let _ = writeln!(
                out,
                "The following is a list of CommentIDs where {} in the instrument {instrument}:",
                describe_conditions(conditions)
            );
            for comment_id in comment_ids {
                let _ = writeln!(out, "{comment_id}");
            }
        }
        (Action::SelectAll { conditions }, ActionOutcome::Documents { records }) => {
            let _ = writeln!(
                out,
                "The following is a list of CommentIDs and full data where {} in the instrument {instrument}:",
                describe_conditions(conditions)
            );
            for record in records {
                let data = serde_json::to_string(&record.document)?;
                let _ = writeln!(out, "{}: {data}", record.comment_id);
            }
        }
        (Action::SelectField { target, conditions }, ActionOutcome::Values { records }) => {
            let _ = writeln!(
                out,
                "The following is a list of CommentIDs and values for field {target} where {} in the instrument {instrument}:",
                describe_conditions(conditions)
            );
            for record in records {
                let _ = writeln!(out, "{}: {}", record.comment_id, record.value);
            }
        }
        (
            Action::Rename { .. }
            | Action::Drop { .. }
            | Action::Modify { .. }
            | Action::CustomModify { .. },
            ActionOutcome::Changed {
                count,
                status_field,
            },
        ) => {
            if *count > 0 {
                let _ = writeln!(out, "The command was performed with {count} changes made.");
            } else {
                let _ = writeln!(out, "{}", no_changes_message(action));
            }
            if *status_field && let Some(field) = action.mutated_field() {
                let _ = writeln!(
                    out,
                    "*** A status field {field}{STATUS_SUFFIX} has been detected. ***"
                );
            }
        }
        (
            Action::Select { .. }
            | Action::SelectAll { .. }
            | Action::SelectField { .. }
            | Action::Rename { .. }
            | Action::Drop { .. }
            | Action::Modify { .. }
            | Action::CustomModify { .. },
            ActionOutcome::Ids { .. }
            | ActionOutcome::Documents { .. }
            | ActionOutcome::Values { .. }
            | ActionOutcome::Changed { .. },
        ) => {
            return Err(ToolkitError::InvalidArguments(format!(
                "{} cannot report outcome kind {}",
                action.name(),
                outcome.kind()
            )));
        }
    }
    Ok(out)
}

fn no_changes_message(action: &Action) -> String {
    match action {
        Action::Rename { old_name, new_name } => format!(
            "No changes were made in the database. The field {old_name} may not exist or there may already be a field named {new_name}"
        ),
        Action::Drop { field } => {
            format!("No changes were made in the database. The field {field} was not found.")
        }
        Action::Modify {
            field,
            value,
            conditions,
            ..
        } => format!(
            "No changes were made in the database. Possible reasons include field {field} or a condition field do not exist, no record matches where {}, or the field {field} already has the value {value}",
            describe_conditions(conditions)
        ),
        _ => "No changes were made in the database.".to_string(),
    }
}

/// The banner printed when a command targets a protected field.
pub fn metadata_error_banner() -> String {
    let rule = "#".repeat(57);
    format!(
        "{rule}\nCan not alter metadata values:\n{}\n{rule}\n",
        METADATA_FIELDS.join("\n")
    )
}
