//! Schema data model
//!
//! A [`Schema`] is an ordered set of [`VariableSpec`]s keyed by variable name. Declaration order is
//! part of the contract: results, generated files and console output all follow it, so the map is
//! kept as a vector of entries rather than a hash map, including when it is deserialized.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SchemaError;
use crate::format::Format;

/// Declared type of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    String,
    Number,
    Boolean,
}

impl VarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarType::String => "string",
            VarType::Number => "number",
            VarType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed variable value, produced by coercion or taken from a declared default
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl Value {
    pub fn var_type(&self) -> VarType {
        match self {
            Value::String(_) => VarType::String,
            Value::Number(_) => VarType::Number,
            Value::Boolean(_) => VarType::Boolean,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

/// Largest integer an f64 represents exactly (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl Visitor<'_> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, number or boolean")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
                Ok(Value::Boolean(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
                Ok(Value::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
                Ok(Value::Number(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
                Ok(Value::Number(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
                Ok(Value::String(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
                Ok(Value::String(v))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

fn default_required() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// Declared contract for a single variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableSpec {
    #[serde(rename = "type")]
    pub var_type: VarType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(default = "default_required", skip_serializing_if = "is_true")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(
        rename = "enum",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub allowed: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Set when the variable is scheduled for removal; the text is surfaced as a warning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl VariableSpec {
    /// Create a required spec of the given type with no further constraints
    pub fn new(var_type: VarType) -> Self {
        Self {
            var_type,
            format: None,
            required: true,
            default: None,
            allowed: None,
            pattern: None,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            description: None,
            deprecated: None,
        }
    }

    pub fn string() -> Self {
        Self::new(VarType::String)
    }

    pub fn number() -> Self {
        Self::new(VarType::Number)
    }

    pub fn boolean() -> Self {
        Self::new(VarType::Boolean)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_format(mut self, format: impl AsRef<str>) -> Self {
        self.format = Some(Format::parse(format.as_ref()));
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecated = Some(message.into());
        self
    }

    /// Non-empty enum members, if any
    pub fn enum_values(&self) -> Option<&[String]> {
        self.allowed.as_deref().filter(|values| !values.is_empty())
    }

    /// Whether an absent value is acceptable (optional or covered by a default)
    pub fn may_be_absent(&self) -> bool {
        !self.required || self.default.is_some()
    }
}

/// Ordered mapping from variable name to its specification
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    variables: Vec<(String, VariableSpec)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, replacing an existing declaration of the same name in place
    pub fn with_variable(mut self, name: impl Into<String>, spec: VariableSpec) -> Self {
        self.insert(name.into(), spec);
        self
    }

    fn insert(&mut self, name: String, spec: VariableSpec) {
        match self.variables.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = spec,
            None => self.variables.push((name, spec)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&VariableSpec> {
        self.variables
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, spec)| spec)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Variables in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableSpec)> {
        self.variables
            .iter()
            .map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(name, _)| name.as_str())
    }

    pub fn name_set(&self) -> HashSet<&str> {
        self.names().collect()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Structural checks a loader runs before handing the schema to the validator
    pub fn check(&self) -> Result<(), SchemaError> {
        for (name, spec) in self.iter() {
            if name.trim().is_empty() {
                return Err(SchemaError::EmptyName);
            }

            if let Some(default) = &spec.default
                && default.var_type() != spec.var_type
            {
                return Err(SchemaError::DefaultTypeMismatch {
                    variable: name.to_string(),
                    declared: spec.var_type,
                    actual: default.var_type(),
                });
            }

            if let (Some(min), Some(max)) = (spec.min, spec.max)
                && min > max
            {
                return Err(SchemaError::InvalidBounds {
                    variable: name.to_string(),
                    details: format!("min {} is greater than max {}", min, max),
                });
            }

            if let (Some(min), Some(max)) = (spec.min_length, spec.max_length)
                && min > max
            {
                return Err(SchemaError::InvalidBounds {
                    variable: name.to_string(),
                    details: format!("minLength {} is greater than maxLength {}", min, max),
                });
            }
        }
        Ok(())
    }
}

impl<N: Into<String>> FromIterator<(N, VariableSpec)> for Schema {
    fn from_iter<T: IntoIterator<Item = (N, VariableSpec)>>(iter: T) -> Self {
        let mut schema = Schema::new();
        for (name, spec) in iter {
            schema.insert(name.into(), spec);
        }
        schema
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.variables.len()))?;
        for (name, spec) in &self.variables {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = Schema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of variable names to variable specifications")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Schema, A::Error> {
                let mut variables: Vec<(String, VariableSpec)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, spec)) = access.next_entry::<String, VariableSpec>()? {
                    if variables.iter().any(|(existing, _)| *existing == name) {
                        return Err(de::Error::custom(format!(
                            "duplicate variable `{}`",
                            name
                        )));
                    }
                    variables.push((name, spec));
                }
                Ok(Schema { variables })
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}

/// Raw key/value input being validated
///
/// Keys are kept sorted so that anything derived from iterating the environment (strict-mode
/// warnings, debug output) is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment(BTreeMap<String, String>);

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Environment {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl From<HashMap<String, String>> for Environment {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for Environment {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_preserves_json_declaration_order() {
        let json = r#"{
            "ZETA": { "type": "string" },
            "ALPHA": { "type": "number", "required": false, "default": 3000 },
            "MIDDLE": { "type": "boolean" }
        }"#;

        let schema: Schema = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = schema.names().collect();
        assert_eq!(names, vec!["ZETA", "ALPHA", "MIDDLE"]);
    }

    #[test]
    fn test_schema_preserves_toml_declaration_order() {
        let content = r#"
[ZETA]
type = "string"

[ALPHA]
type = "number"
default = 3000
"#;

        let schema: Schema = toml::from_str(content).unwrap();
        let names: Vec<&str> = schema.names().collect();
        assert_eq!(names, vec!["ZETA", "ALPHA"]);
        assert_eq!(
            schema.get("ALPHA").unwrap().default,
            Some(Value::Number(3000.0))
        );
    }

    #[test]
    fn test_spec_field_names_and_defaults() {
        let json = r#"{
            "type": "string",
            "minLength": 3,
            "maxLength": 8,
            "enum": ["a", "b"],
            "format": "regex:^[a-z]+$"
        }"#;

        let spec: VariableSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.var_type, VarType::String);
        assert!(spec.required);
        assert_eq!(spec.min_length, Some(3));
        assert_eq!(spec.max_length, Some(8));
        assert_eq!(spec.enum_values(), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(spec.format, Some(Format::Regex("^[a-z]+$".to_string())));
    }

    #[test]
    fn test_duplicate_variable_rejected() {
        let content = r#"
ALPHA = { type = "string" }
"ALPHA" = { type = "number" }
"#;
        // TOML itself rejects the duplicate key; JSON relies on the visitor
        assert!(toml::from_str::<Schema>(content).is_err());

        let json = r#"{ "A": { "type": "string" }, "A": { "type": "number" } }"#;
        let err = serde_json::from_str::<Schema>(json).unwrap_err();
        assert!(err.to_string().contains("duplicate variable"));
    }

    #[test]
    fn test_with_variable_replaces_in_place() {
        let schema = Schema::new()
            .with_variable("A", VariableSpec::string())
            .with_variable("B", VariableSpec::string())
            .with_variable("A", VariableSpec::number());

        let names: Vec<&str> = schema.names().collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(schema.get("A").unwrap().var_type, VarType::Number);
    }

    #[test]
    fn test_value_serializes_whole_numbers_as_integers() {
        assert_eq!(serde_json::to_string(&Value::Number(3000.0)).unwrap(), "3000");
        assert_eq!(serde_json::to_string(&Value::Number(0.5)).unwrap(), "0.5");
        assert_eq!(serde_json::to_string(&Value::Boolean(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&Value::from("x")).unwrap(), "\"x\"");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Number(8080.0).to_string(), "8080");
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Boolean(false).to_string(), "false");
    }

    #[test]
    fn test_check_rejects_mismatched_default() {
        let schema = Schema::new().with_variable("PORT", VariableSpec::number().with_default("3000"));
        assert!(matches!(
            schema.check(),
            Err(SchemaError::DefaultTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_check_rejects_inverted_bounds() {
        let schema = Schema::new().with_variable(
            "PORT",
            VariableSpec::number().with_min(10.0).with_max(1.0),
        );
        assert!(matches!(schema.check(), Err(SchemaError::InvalidBounds { .. })));

        let schema = Schema::new().with_variable(
            "NAME",
            VariableSpec::string().with_min_length(5).with_max_length(2),
        );
        assert!(matches!(schema.check(), Err(SchemaError::InvalidBounds { .. })));
    }

    #[test]
    fn test_check_accepts_well_formed_schema() {
        let schema = Schema::new()
            .with_variable("PORT", VariableSpec::number().with_default(3000))
            .with_variable("DEBUG", VariableSpec::boolean().optional());
        assert!(schema.check().is_ok());
    }

    #[test]
    fn test_environment_from_pairs() {
        let env: Environment = [("B", "2"), ("A", "1")].into_iter().collect();
        assert_eq!(env.get("A"), Some("1"));
        assert_eq!(env.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
