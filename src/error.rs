use std::path::PathBuf;

use thiserror::Error;

use crate::schema::VarType;

/// Main application error type covering everything outside the validation core
///
/// Validation problems in an environment are never reported through this type; they are data in
/// a [`ValidationResult`](crate::validator::ValidationResult).
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema parsing error: {path} - {details}")]
    SchemaParsing { path: PathBuf, details: String },

    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("Schema file not found in {dir}")]
    SchemaNotFound { dir: PathBuf },

    #[error("Unsupported schema file format: {0}")]
    UnsupportedFormat(String),

    #[error("Environment file error: {path} - {details}")]
    EnvFile { path: PathBuf, details: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Structural problems found in a schema before it is used for validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Variable names must not be empty")]
    EmptyName,

    #[error("Default for {variable} is a {actual}, but the variable is declared as {declared}")]
    DefaultTypeMismatch {
        variable: String,
        declared: VarType,
        actual: VarType,
    },

    #[error("Invalid bounds for {variable}: {details}")]
    InvalidBounds { variable: String, details: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let io_error = Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "File not found",
        ));
        assert!(io_error.to_string().contains("IO error"));

        let parsing = Error::SchemaParsing {
            path: PathBuf::from("env.schema.json"),
            details: "expected value at line 1".to_string(),
        };
        assert!(parsing.to_string().contains("Schema parsing error"));
        assert!(parsing.to_string().contains("env.schema.json"));
        assert!(parsing.to_string().contains("expected value"));

        let env_file = Error::EnvFile {
            path: PathBuf::from(".env.local"),
            details: "line 3".to_string(),
        };
        assert!(env_file.to_string().contains(".env.local"));
    }

    #[test]
    fn test_schema_error_display() {
        let mismatch = SchemaError::DefaultTypeMismatch {
            variable: "PORT".to_string(),
            declared: VarType::Number,
            actual: VarType::String,
        };
        let text = mismatch.to_string();
        assert!(text.contains("PORT"));
        assert!(text.contains("number"));
        assert!(text.contains("string"));
    }

    #[test]
    fn test_schema_error_conversion() {
        let err: Error = SchemaError::EmptyName.into();
        match err {
            Error::Schema(SchemaError::EmptyName) => (),
            _ => panic!("Expected Error::Schema"),
        }
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error as _;

        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err = Error::Io(io_error);

        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "File not found");
    }
}
