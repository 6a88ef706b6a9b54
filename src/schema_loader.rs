use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::Schema;

/// File names probed, in order, when no schema path is given
pub const SCHEMA_FILE_NAMES: [&str; 4] = [
    "env.schema.json",
    ".env.schema.json",
    "env.schema.toml",
    ".env.schema.toml",
];

/// Serialization format of a schema document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Json,
    Toml,
}

impl SchemaFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Result<Self>> {
        let ext = path.extension()?.to_str()?;
        Some(match ext {
            "json" => Ok(SchemaFormat::Json),
            "toml" => Ok(SchemaFormat::Toml),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        })
    }
}

/// Locates, parses and structurally checks schema files
pub struct SchemaLoader;

impl SchemaLoader {
    /// Load and check a schema file (JSON or TOML)
    pub async fn load_from_file(path: &Path) -> Result<Schema> {
        let content = tokio::fs::read_to_string(path).await?;

        let schema = match SchemaFormat::from_path(path) {
            Some(format) => Self::parse_str(&content, format?, path)?,
            None => {
                // Try JSON first, then TOML
                Self::parse_str(&content, SchemaFormat::Json, path)
                    .or_else(|_| Self::parse_str(&content, SchemaFormat::Toml, path))?
            }
        };

        debug!(path = %path.display(), variables = schema.len(), "loaded schema");
        Ok(schema)
    }

    /// Parse and check schema text; `origin` is only used in error messages
    pub fn parse_str(content: &str, format: SchemaFormat, origin: &Path) -> Result<Schema> {
        let parsed: std::result::Result<Schema, String> = match format {
            SchemaFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            SchemaFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        };

        let schema = parsed.map_err(|details| Error::SchemaParsing {
            path: origin.to_path_buf(),
            details,
        })?;

        schema.check()?;
        Ok(schema)
    }

    /// Find the first known schema file name in `dir`
    pub async fn find_schema_file(dir: &Path) -> Result<PathBuf> {
        for name in SCHEMA_FILE_NAMES {
            let path = dir.join(name);
            if tokio::fs::try_exists(&path).await? {
                return Ok(path);
            }
        }

        Err(Error::SchemaNotFound {
            dir: dir.to_path_buf(),
        })
    }

    /// Load the schema at `path`, or discover one in `dir` when no path is given
    pub async fn resolve(path: Option<&Path>, dir: &Path) -> Result<Schema> {
        match path {
            Some(path) => Self::load_from_file(path).await,
            None => {
                let found = Self::find_schema_file(dir).await?;
                Self::load_from_file(&found).await
            }
        }
    }
}
