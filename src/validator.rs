//! Environment validation engine
//!
//! [`validate`] runs every declared variable through the field validator in schema order and
//! collects the outcomes into a single [`ValidationResult`]. The engine holds no state: the same
//! schema and environment always produce the same result.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info};

use crate::field::{FieldOutcome, validate_field};
use crate::schema::{Environment, Schema, Value};

/// Name prefixes of ambient shell/session variables never reported as unused
pub const SYSTEM_VARIABLE_PREFIXES: &[&str] = &[
    "PATH",
    "HOME",
    "USER",
    "SHELL",
    "TERM",
    "LANG",
    "LC_",
    "PWD",
    "OLDPWD",
    "TMPDIR",
    "TEMP",
    "TMP",
    "HOSTNAME",
    "LOGNAME",
    "DISPLAY",
    "WAYLAND_",
    "XDG_",
    "SSH_",
    "DBUS_",
    "SHLVL",
    "EDITOR",
    "PAGER",
    "COLORTERM",
    "npm_",
    "RUST_LOG",
];

/// Ambient variables matched by exact name only (`_` is the shell's last-command variable)
pub const SYSTEM_VARIABLE_NAMES: &[&str] = &["_"];

/// Whether `key` belongs to the ambient system environment
pub fn is_system_variable(key: &str) -> bool {
    SYSTEM_VARIABLE_NAMES.contains(&key)
        || SYSTEM_VARIABLE_PREFIXES
            .iter()
            .any(|prefix| key.starts_with(prefix))
}

/// Category of a validation error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Missing,
    InvalidType,
    InvalidFormat,
    InvalidEnum,
    InvalidRange,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Missing => "missing",
            ErrorKind::InvalidType => "invalid_type",
            ErrorKind::InvalidFormat => "invalid_format",
            ErrorKind::InvalidEnum => "invalid_enum",
            ErrorKind::InvalidRange => "invalid_range",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a validation warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Unused,
    DefaultApplied,
    Deprecated,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::Unused => "unused",
            WarningKind::DefaultApplied => "default_applied",
            WarningKind::Deprecated => "deprecated",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable that failed validation
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{variable}: {message}")]
pub struct ValidationError {
    pub variable: String,
    pub message: String,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

impl ValidationError {
    pub fn new(variable: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            message: message.into(),
            kind,
            expected: None,
            received: None,
        }
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn received(mut self, received: impl Into<String>) -> Self {
        self.received = Some(received.into());
        self
    }
}

/// A non-blocking observation about a variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub variable: String,
    pub message: String,
    pub kind: WarningKind,
}

impl ValidationWarning {
    pub fn new(variable: impl Into<String>, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            message: message.into(),
            kind,
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.variable, self.message)
    }
}

/// Typed values keyed by variable name, in schema order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedValues(Vec<(String, Value)>);

impl ParsedValues {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ParsedValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Outcome of validating one environment against one schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// True iff `errors` is empty
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub parsed: ParsedValues,
}

impl ValidationResult {
    pub fn errors_for<'a>(&'a self, variable: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.variable == variable)
    }

    pub fn warnings_for<'a>(
        &'a self,
        variable: &'a str,
    ) -> impl Iterator<Item = &'a ValidationWarning> {
        self.warnings.iter().filter(move |w| w.variable == variable)
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Validation options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Warn about environment keys the schema does not declare
    pub strict: bool,
}

impl ValidationOptions {
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

/// Validate `env` against `schema`
pub fn validate(schema: &Schema, env: &Environment, options: &ValidationOptions) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut parsed = Vec::new();

    for (name, spec) in schema.iter() {
        let outcome = validate_field(name, env.get(name), spec);
        debug!(variable = name, outcome = outcome_label(&outcome), "validated variable");

        let (error, warning, value) = outcome.into_parts();
        errors.extend(error);
        warnings.extend(warning);
        if let Some(value) = value {
            parsed.push((name.to_string(), value));
        }
    }

    if options.strict {
        let declared = schema.name_set();
        warnings.extend(
            env.keys()
                .filter(|key| !declared.contains(key) && !is_system_variable(key))
                .map(|key| {
                    ValidationWarning::new(
                        key,
                        WarningKind::Unused,
                        format!("{} is set but not declared in the schema", key),
                    )
                }),
        );
    }

    info!(
        variables = schema.len(),
        errors = errors.len(),
        warnings = warnings.len(),
        strict = options.strict,
        "validation complete"
    );

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
        parsed: ParsedValues(parsed),
    }
}

/// Convenience wrapper returning only the validity flag
pub fn is_valid(schema: &Schema, env: &Environment) -> bool {
    validate(schema, env, &ValidationOptions::default()).valid
}

fn outcome_label(outcome: &FieldOutcome) -> &'static str {
    match outcome {
        FieldOutcome::Parsed(_) => "parsed",
        FieldOutcome::Defaulted(..) => "defaulted",
        FieldOutcome::Deprecated(..) => "deprecated",
        FieldOutcome::Failed(_) => "failed",
        FieldOutcome::Skipped => "skipped",
    }
}
