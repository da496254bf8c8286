use std::borrow::Cow;

use crate::error::DialogueError;
use crate::types::Operand;

/// Tolerance used whenever two floats are compared for equality.
pub const FLOAT_EPSILON: f32 = 0.00001;

/// A runtime value. String payloads either borrow the loaded program or own
/// their text; only owned values may be handed to variable storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    None,
    String(Cow<'a, str>),
    Bool(bool),
    Float(f32),
}

impl<'a> Value<'a> {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Float(_) => "float",
        }
    }

    pub fn as_float(&self) -> Result<f32, DialogueError> {
        match self {
            Self::Float(value) => Ok(*value),
            other => Err(type_mismatch("float", other)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, DialogueError> {
        match self {
            Self::Bool(value) => Ok(*value),
            other => Err(type_mismatch("bool", other)),
        }
    }

    pub fn as_str(&self) -> Result<&str, DialogueError> {
        match self {
            Self::String(value) => Ok(value.as_ref()),
            other => Err(type_mismatch("string", other)),
        }
    }

    /// Reads a float that must carry no fractional part.
    pub fn as_int(&self) -> Result<i32, DialogueError> {
        let value = self.as_float()?;
        if value.fract() != 0.0 || !value.is_finite() {
            return Err(DialogueError::new(
                "VALUE_NOT_INTEGER",
                format!("Expected an integral float, got {}.", value),
            ));
        }
        if value < i32::MIN as f32 || value >= i32::MAX as f32 {
            return Err(DialogueError::new(
                "VALUE_NOT_INTEGER",
                format!("Float {} does not fit in an integer.", value),
            ));
        }
        Ok(value as i32)
    }

    pub fn into_owned(self) -> Value<'static> {
        match self {
            Self::None => Value::None,
            Self::String(text) => Value::String(Cow::Owned(text.into_owned())),
            Self::Bool(value) => Value::Bool(value),
            Self::Float(value) => Value::Float(value),
        }
    }

    pub fn borrowed(text: &'a str) -> Self {
        Self::String(Cow::Borrowed(text))
    }

    pub fn owned(text: impl Into<String>) -> Self {
        Self::String(Cow::Owned(text.into()))
    }
}

impl<'a> From<&'a Operand> for Value<'a> {
    fn from(operand: &'a Operand) -> Self {
        match operand {
            Operand::String(text) => Value::borrowed(text),
            Operand::Bool(value) => Value::Bool(*value),
            Operand::Float(value) => Value::Float(*value),
        }
    }
}

pub fn floats_equal(left: f32, right: f32) -> bool {
    (left - right).abs() <= FLOAT_EPSILON
}

fn type_mismatch(expected: &str, actual: &Value<'_>) -> DialogueError {
    DialogueError::new(
        "VALUE_TYPE_MISMATCH",
        format!("Expected {}, got {}.", expected, actual.type_name()),
    )
}
