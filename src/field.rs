//! Per-variable validation
//!
//! Checks run in a fixed order and stop at the first failure:
//! presence, coercion, enum, format, numeric range, string length, custom pattern.

use regex::Regex;
use tracing::{debug, warn};

use crate::coerce::coerce;
use crate::format::FormatError;
use crate::schema::{Value, VarType, VariableSpec};
use crate::validator::{ErrorKind, ValidationError, ValidationWarning, WarningKind};

/// What validating a single variable produced
///
/// Each variant carries at most one error, one warning and one parsed value, and never an error
/// together with a warning.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    /// Value present and valid
    Parsed(Value),
    /// Value absent, declared default used
    Defaulted(Value, ValidationWarning),
    /// Value present and valid, but the variable is deprecated
    Deprecated(Value, ValidationWarning),
    /// Value failed a check
    Failed(ValidationError),
    /// Optional value absent with no default
    Skipped,
}

impl FieldOutcome {
    pub fn value(&self) -> Option<&Value> {
        match self {
            FieldOutcome::Parsed(value)
            | FieldOutcome::Defaulted(value, _)
            | FieldOutcome::Deprecated(value, _) => Some(value),
            FieldOutcome::Failed(_) | FieldOutcome::Skipped => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            FieldOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn warning(&self) -> Option<&ValidationWarning> {
        match self {
            FieldOutcome::Defaulted(_, warning) | FieldOutcome::Deprecated(_, warning) => {
                Some(warning)
            }
            _ => None,
        }
    }

    /// Split into the three result collections' contributions
    pub fn into_parts(
        self,
    ) -> (
        Option<ValidationError>,
        Option<ValidationWarning>,
        Option<Value>,
    ) {
        match self {
            FieldOutcome::Parsed(value) => (None, None, Some(value)),
            FieldOutcome::Defaulted(value, warning) | FieldOutcome::Deprecated(value, warning) => {
                (None, Some(warning), Some(value))
            }
            FieldOutcome::Failed(error) => (Some(error), None, None),
            FieldOutcome::Skipped => (None, None, None),
        }
    }
}

/// Validate one variable's raw value against its spec
pub fn validate_field(name: &str, raw: Option<&str>, spec: &VariableSpec) -> FieldOutcome {
    let raw = match raw.filter(|value| !value.is_empty()) {
        Some(raw) => raw,
        None => return absent(name, spec),
    };

    let value = match coerce(raw, spec.var_type) {
        Ok(value) => value,
        Err(err) => {
            return FieldOutcome::Failed(
                ValidationError::new(name, ErrorKind::InvalidType, err.message)
                    .expected(spec.var_type.as_str())
                    .received(raw),
            );
        }
    };

    if let Some(error) = check_enum(name, raw, spec)
        .or_else(|| check_format(name, raw, spec))
        .or_else(|| check_range(name, raw, &value, spec))
        .or_else(|| check_length(name, raw, &value, spec))
        .or_else(|| check_pattern(name, raw, spec))
    {
        return FieldOutcome::Failed(error);
    }

    match &spec.deprecated {
        Some(note) => {
            let warning = ValidationWarning::new(
                name,
                WarningKind::Deprecated,
                format!("{} is deprecated: {}", name, note),
            );
            FieldOutcome::Deprecated(value, warning)
        }
        None => FieldOutcome::Parsed(value),
    }
}

fn absent(name: &str, spec: &VariableSpec) -> FieldOutcome {
    match (&spec.default, spec.required) {
        (Some(default), _) => {
            let warning = ValidationWarning::new(
                name,
                WarningKind::DefaultApplied,
                format!("{} is not set, using default value {}", name, default),
            );
            FieldOutcome::Defaulted(default.clone(), warning)
        }
        (None, true) => FieldOutcome::Failed(
            ValidationError::new(
                name,
                ErrorKind::Missing,
                format!("Required variable {} is not set", name),
            )
            .expected(spec.var_type.as_str()),
        ),
        (None, false) => FieldOutcome::Skipped,
    }
}

fn check_enum(name: &str, raw: &str, spec: &VariableSpec) -> Option<ValidationError> {
    let allowed = spec.enum_values()?;
    if allowed.iter().any(|member| member == raw) {
        return None;
    }

    let expected = allowed.join(", ");
    Some(
        ValidationError::new(
            name,
            ErrorKind::InvalidEnum,
            format!("Value \"{}\" is not one of: {}", raw, expected),
        )
        .expected(expected)
        .received(raw),
    )
}

fn check_format(name: &str, raw: &str, spec: &VariableSpec) -> Option<ValidationError> {
    let format = spec.format.as_ref()?;
    if format.is_unknown() {
        debug!(variable = name, format = %format, "unknown format, skipping check");
    }

    match format.check(raw) {
        Ok(true) => None,
        Ok(false) => Some(
            ValidationError::new(
                name,
                ErrorKind::InvalidFormat,
                format!("Value \"{}\" does not match format {}", raw, format),
            )
            .expected(format.to_string())
            .received(raw),
        ),
        Err(FormatError::InvalidPattern { pattern, details }) => Some(
            ValidationError::new(
                name,
                ErrorKind::InvalidFormat,
                format!("Invalid regex pattern in format: {} ({})", pattern, details),
            )
            .expected(format.to_string())
            .received(raw),
        ),
    }
}

fn check_range(
    name: &str,
    raw: &str,
    value: &Value,
    spec: &VariableSpec,
) -> Option<ValidationError> {
    if spec.var_type != VarType::Number {
        return None;
    }
    let number = value.as_f64()?;

    if let Some(min) = spec.min
        && number < min
    {
        return Some(
            ValidationError::new(
                name,
                ErrorKind::InvalidRange,
                format!("Value {} is less than minimum {}", number, min),
            )
            .expected(format!(">= {}", min))
            .received(raw),
        );
    }

    if let Some(max) = spec.max
        && number > max
    {
        return Some(
            ValidationError::new(
                name,
                ErrorKind::InvalidRange,
                format!("Value {} is greater than maximum {}", number, max),
            )
            .expected(format!("<= {}", max))
            .received(raw),
        );
    }

    None
}

fn check_length(
    name: &str,
    raw: &str,
    value: &Value,
    spec: &VariableSpec,
) -> Option<ValidationError> {
    if spec.var_type != VarType::String {
        return None;
    }
    let length = value.as_str()?.chars().count();

    if let Some(min) = spec.min_length
        && length < min
    {
        return Some(
            ValidationError::new(
                name,
                ErrorKind::InvalidRange,
                format!("Length {} is less than minimum length {}", length, min),
            )
            .expected(format!("length >= {}", min))
            .received(raw),
        );
    }

    if let Some(max) = spec.max_length
        && length > max
    {
        return Some(
            ValidationError::new(
                name,
                ErrorKind::InvalidRange,
                format!("Length {} is greater than maximum length {}", length, max),
            )
            .expected(format!("length <= {}", max))
            .received(raw),
        );
    }

    None
}

fn check_pattern(name: &str, raw: &str, spec: &VariableSpec) -> Option<ValidationError> {
    let pattern = spec.pattern.as_ref()?;

    // A pattern that does not compile is ignored rather than failing the variable
    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => {
            warn!(variable = name, pattern = %pattern, error = %e, "ignoring invalid pattern");
            return None;
        }
    };

    if regex.is_match(raw) {
        return None;
    }

    Some(
        ValidationError::new(
            name,
            ErrorKind::InvalidFormat,
            format!("Value \"{}\" does not match pattern {}", raw, pattern),
        )
        .expected(pattern.clone())
        .received(raw),
    )
}
