//! Raw string to typed value conversion

use thiserror::Error;

use crate::format::parse_number;
use crate::schema::{Value, VarType};

const TRUE_TOKENS: [&str; 4] = ["true", "1", "yes", "on"];
const FALSE_TOKENS: [&str; 4] = ["false", "0", "no", "off"];

/// A raw value that cannot be read as the declared type
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct CoercionError {
    pub raw: String,
    pub target: VarType,
    pub message: String,
}

impl CoercionError {
    fn new(raw: &str, target: VarType, message: String) -> Self {
        Self {
            raw: raw.to_string(),
            target,
            message,
        }
    }
}

/// Convert `raw` into a value of type `target`
pub fn coerce(raw: &str, target: VarType) -> Result<Value, CoercionError> {
    match target {
        VarType::String => Ok(Value::String(raw.to_string())),
        VarType::Number => parse_number(raw).map(Value::Number).ok_or_else(|| {
            CoercionError::new(raw, target, format!("Expected a number, received \"{}\"", raw))
        }),
        VarType::Boolean => parse_boolean(raw).map(Value::Boolean).ok_or_else(|| {
            CoercionError::new(
                raw,
                target,
                format!(
                    "Expected a boolean ({} or {}), received \"{}\"",
                    TRUE_TOKENS.join("/"),
                    FALSE_TOKENS.join("/"),
                    raw
                ),
            )
        }),
    }
}

fn parse_boolean(raw: &str) -> Option<bool> {
    let lowered = raw.to_ascii_lowercase();
    if TRUE_TOKENS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}
