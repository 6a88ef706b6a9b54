//! Format checks
//!
//! The set of named formats is fixed, so it is modelled as a closed enum instead of a lookup
//! table. Two variants sit outside the table: [`Format::Regex`] carries a free-form pattern
//! written as `regex:<pattern>`, and [`Format::Unknown`] keeps any other name. Unknown formats
//! never fail a value.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix marking a free-form regular expression format
pub const REGEX_PREFIX: &str = "regex:";

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static UUID_REGEX: OnceLock<Regex> = OnceLock::new();
static BASE64_REGEX: OnceLock<Regex> = OnceLock::new();
static HEX_REGEX: OnceLock<Regex> = OnceLock::new();
static ALPHANUMERIC_REGEX: OnceLock<Regex> = OnceLock::new();

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("built-in format pattern must compile"))
}

fn email_regex() -> &'static Regex {
    cached(&EMAIL_REGEX, r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
}

fn uuid_regex() -> &'static Regex {
    cached(
        &UUID_REGEX,
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
    )
}

fn base64_regex() -> &'static Regex {
    cached(&BASE64_REGEX, r"^[A-Za-z0-9+/]*={0,2}$")
}

fn hex_regex() -> &'static Regex {
    cached(&HEX_REGEX, r"^[0-9a-fA-F]+$")
}

fn alphanumeric_regex() -> &'static Regex {
    cached(&ALPHANUMERIC_REGEX, r"^[a-zA-Z0-9]+$")
}

/// A format that could not be evaluated at all
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("Invalid regex pattern: {pattern} - {details}")]
    InvalidPattern { pattern: String, details: String },
}

/// Format constraint declared on a variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Format {
    Url,
    Email,
    Uuid,
    Json,
    Base64,
    Hex,
    Alphanumeric,
    Port,
    Positive,
    Integer,
    Percentage,
    /// `regex:<pattern>`
    Regex(String),
    /// Any name outside the built-in table
    Unknown(String),
}

impl Format {
    /// Parse a format name; never fails, unrecognised names become [`Format::Unknown`]
    pub fn parse(name: &str) -> Self {
        if let Some(pattern) = name.strip_prefix(REGEX_PREFIX) {
            return Format::Regex(pattern.to_string());
        }

        match name {
            "url" => Format::Url,
            "email" => Format::Email,
            "uuid" => Format::Uuid,
            "json" => Format::Json,
            "base64" => Format::Base64,
            "hex" => Format::Hex,
            "alphanumeric" => Format::Alphanumeric,
            "port" => Format::Port,
            "positive" => Format::Positive,
            "integer" => Format::Integer,
            "percentage" => Format::Percentage,
            other => Format::Unknown(other.to_string()),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Format::Unknown(_))
    }

    /// Check a raw value against this format
    pub fn check(&self, value: &str) -> Result<bool, FormatError> {
        let matched = match self {
            Format::Url => url::Url::parse(value).is_ok(),
            Format::Email => email_regex().is_match(value),
            Format::Uuid => uuid_regex().is_match(value),
            Format::Json => serde_json::from_str::<serde_json::Value>(value).is_ok(),
            Format::Base64 => base64_regex().is_match(value) && value.len() % 4 == 0,
            Format::Hex => hex_regex().is_match(value),
            Format::Alphanumeric => alphanumeric_regex().is_match(value),
            Format::Port => parse_integer(value).is_some_and(|port| (1..=65535).contains(&port)),
            Format::Positive => parse_number(value).is_some_and(|n| n > 0.0),
            Format::Integer => parse_number(value).is_some_and(|n| n.fract() == 0.0),
            Format::Percentage => parse_number(value).is_some_and(|n| (0.0..=100.0).contains(&n)),
            Format::Regex(pattern) => {
                let regex = Regex::new(pattern).map_err(|e| FormatError::InvalidPattern {
                    pattern: pattern.clone(),
                    details: e.to_string(),
                })?;
                regex.is_match(value)
            }
            Format::Unknown(_) => true,
        };
        Ok(matched)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Url => "url",
            Format::Email => "email",
            Format::Uuid => "uuid",
            Format::Json => "json",
            Format::Base64 => "base64",
            Format::Hex => "hex",
            Format::Alphanumeric => "alphanumeric",
            Format::Port => "port",
            Format::Positive => "positive",
            Format::Integer => "integer",
            Format::Percentage => "percentage",
            Format::Regex(pattern) => return write!(f, "{}{}", REGEX_PREFIX, pattern),
            Format::Unknown(name) => name,
        };
        f.write_str(name)
    }
}

impl From<String> for Format {
    fn from(name: String) -> Self {
        Format::parse(&name)
    }
}

impl From<Format> for String {
    fn from(format: Format) -> Self {
        format.to_string()
    }
}

/// Finite number parse shared by the numeric formats and the number coercion
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}
