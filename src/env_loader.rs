//! Environment assembly from dotenv files and the process environment
//!
//! Files are parsed with `dotenvy`, but nothing is ever exported into the process environment:
//! the values only end up in the returned [`Environment`].

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::schema::Environment;

#[derive(Debug, Clone)]
struct EnvSource {
    path: PathBuf,
    optional: bool,
}

/// Builds an [`Environment`] from layered sources
///
/// Later sources override earlier ones; the process environment, when enabled, is applied last.
#[derive(Debug, Clone, Default)]
pub struct EnvLoader {
    sources: Vec<EnvSource>,
    process_env: bool,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dotenv file that must exist
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(EnvSource {
            path: path.into(),
            optional: false,
        });
        self
    }

    /// Add a dotenv file that is skipped when missing
    pub fn optional_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(EnvSource {
            path: path.into(),
            optional: true,
        });
        self
    }

    /// Overlay the current process environment after all files
    pub fn with_process_env(mut self, enabled: bool) -> Self {
        self.process_env = enabled;
        self
    }

    pub async fn load(&self) -> Result<Environment> {
        let mut env = Environment::new();

        for source in &self.sources {
            if source.optional && !tokio::fs::try_exists(&source.path).await? {
                debug!(path = %source.path.display(), "optional env file not found, skipping");
                continue;
            }
            let entries = Self::read_file(&source.path).await?;
            debug!(path = %source.path.display(), entries = entries.len(), "loaded env file");
            env.extend(entries);
        }

        if self.process_env {
            env.extend(process_vars());
        }

        Ok(env)
    }

    /// Parse a single dotenv file into ordered key/value pairs
    pub async fn read_file(path: &Path) -> Result<Vec<(String, String)>> {
        let content = tokio::fs::read(path).await.map_err(|e| Error::EnvFile {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        Self::parse_bytes(&content, path)
    }

    /// Parse dotenv content; `origin` is only used in error messages
    pub fn parse_bytes(content: &[u8], origin: &Path) -> Result<Vec<(String, String)>> {
        dotenvy::from_read_iter(content)
            .map(|item| {
                item.map_err(|e| Error::EnvFile {
                    path: origin.to_path_buf(),
                    details: e.to_string(),
                })
            })
            .collect()
    }
}

/// Process variables whose name and value are both valid UTF-8; anything else is skipped
fn process_vars() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os().filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
        (Ok(key), Ok(value)) => Some((key, value)),
        (Ok(key), Err(_)) => {
            warn!(variable = %key, "skipping process variable with a non UTF-8 value");
            None
        }
        (Err(key), _) => {
            warn!(variable = ?key, "skipping process variable with a non UTF-8 name");
            None
        }
    })
}
