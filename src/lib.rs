//! # validate-env Library
//!
//! Validates environment variables against a declarative schema: raw strings are coerced into
//! typed values, checked against formats, ranges, lengths, enums and patterns, and reported as
//! structured errors and warnings.
//!
//! ```
//! use validate_env::{Environment, Schema, ValidationOptions, VariableSpec, Value, validate};
//!
//! let schema = Schema::new()
//!     .with_variable("NODE_ENV", VariableSpec::string().with_enum(["development", "production"]))
//!     .with_variable("PORT", VariableSpec::number().optional().with_default(3000));
//!
//! let env: Environment = [("NODE_ENV", "production")].into_iter().collect();
//! let result = validate(&schema, &env, &ValidationOptions::default());
//!
//! assert!(result.valid);
//! assert_eq!(result.parsed.get("PORT"), Some(&Value::Number(3000.0)));
//! ```

pub mod cli;
pub mod coerce;
pub mod config;
pub mod env_loader;
pub mod error;
pub mod field;
pub mod format;
pub mod generator;
pub mod logging;
pub mod output;
pub mod schema;
pub mod schema_loader;
pub mod validator;

pub use cli::{Cli, OutputFormat, VerbosityLevel};
pub use coerce::{CoercionError, coerce};
pub use config::{Config, ConfigError, ConfigManager};
pub use env_loader::EnvLoader;
pub use error::{Error, Result, SchemaError};
pub use field::{FieldOutcome, validate_field};
pub use format::{Format, FormatError};
pub use generator::{generate_env_example, generate_typescript};
pub use output::Output;
pub use schema::{Environment, Schema, Value, VarType, VariableSpec};
pub use schema_loader::{SchemaFormat, SchemaLoader};
pub use validator::{
    ErrorKind, ParsedValues, ValidationError, ValidationOptions, ValidationResult,
    ValidationWarning, WarningKind, is_valid, validate,
};
