// src/core/toolkit/transform.rs

//! The scalar operations `customModify` can apply to a field.

use crate::core::ToolkitError;
use crate::core::value::{FieldValue, format_json_number, number_from_f64};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A pure function from (current value, operand) to the new value.
pub type TransformFn = fn(&FieldValue, &FieldValue) -> Result<FieldValue, ToolkitError>;

/// The closed set of transforms, parsed from their lowercase names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter, Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransformOp {
    Add,
    Multiply,
    Divide,
    Concat,
}

impl TransformOp {
    /// Parses an operation name, reporting unknown names as `UnknownOperation`.
    pub fn parse(name: &str) -> Result<Self, ToolkitError> {
        name.to_ascii_lowercase()
            .parse()
            .map_err(|_| ToolkitError::UnknownOperation(name.to_string()))
    }

    /// The function implementing this operation.
    pub fn function(self) -> TransformFn {
        match self {
            TransformOp::Add => add,
            TransformOp::Multiply => multiply,
            TransformOp::Divide => divide,
            TransformOp::Concat => concat,
        }
    }

    pub fn apply(self, current: &FieldValue, operand: &FieldValue) -> Result<FieldValue, ToolkitError> {
        (self.function())(current, operand)
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, TransformOp::Concat)
    }

    /// Checks the operand alone, before any record is touched. Skipped when the
    /// caller overrules validation.
    pub fn validate_operand(self, operand: &FieldValue) -> Result<(), ToolkitError> {
        if !self.is_numeric() {
            return Ok(());
        }
        let value = numeric(self.verb(), operand)?;
        if self == TransformOp::Divide && value == 0.0 {
            return Err(ToolkitError::DivisionByZero);
        }
        Ok(())
    }

    fn verb(self) -> &'static str {
        match self {
            TransformOp::Add => "addition",
            TransformOp::Multiply => "multiplication",
            TransformOp::Divide => "division",
            TransformOp::Concat => "concatenation",
        }
    }
}

fn numeric(op: &str, value: &FieldValue) -> Result<f64, ToolkitError> {
    value.as_number().ok_or_else(|| ToolkitError::InvalidOperand {
        op: op.to_string(),
        value: value.as_comparable(),
    })
}

/// Builds the result in the same representation as the current value: strings
/// stay strings, numbers stay numbers.
fn arithmetic_result(op: &str, current: &FieldValue, result: f64) -> Result<FieldValue, ToolkitError> {
    let number = number_from_f64(result).ok_or_else(|| ToolkitError::InvalidOperand {
        op: op.to_string(),
        value: current.as_comparable(),
    })?;
    Ok(match current {
        FieldValue::String(_) => FieldValue::String(format_json_number(&number)),
        _ => FieldValue::Number(number),
    })
}

pub fn add(current: &FieldValue, operand: &FieldValue) -> Result<FieldValue, ToolkitError> {
    let lhs = numeric("addition", current)?;
    let rhs = numeric("addition", operand)?;
    arithmetic_result("addition", current, lhs + rhs)
}

pub fn multiply(current: &FieldValue, operand: &FieldValue) -> Result<FieldValue, ToolkitError> {
    let lhs = numeric("multiplication", current)?;
    let rhs = numeric("multiplication", operand)?;
    arithmetic_result("multiplication", current, lhs * rhs)
}

pub fn divide(current: &FieldValue, operand: &FieldValue) -> Result<FieldValue, ToolkitError> {
    let lhs = numeric("division", current)?;
    let rhs = numeric("division", operand)?;
    if rhs == 0.0 {
        return Err(ToolkitError::DivisionByZero);
    }
    arithmetic_result("division", current, lhs / rhs)
}

pub fn concat(current: &FieldValue, operand: &FieldValue) -> Result<FieldValue, ToolkitError> {
    let mut joined = current.as_comparable();
    joined.push_str(&operand.as_comparable());
    Ok(FieldValue::String(joined))
}
