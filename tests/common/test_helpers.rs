use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// JSON schema shared by the integration tests
pub const APP_SCHEMA_JSON: &str = r#"{
  "NODE_ENV": {
    "type": "string",
    "enum": ["development", "production", "test"],
    "description": "Runtime mode"
  },
  "PORT": { "type": "number", "required": false, "default": 3000, "format": "port" },
  "DATABASE_URL": { "type": "string", "format": "url" },
  "FEATURE_FLAGS": { "type": "string", "required": false, "format": "json" },
  "ENABLE_CACHE": { "type": "boolean", "required": false, "default": false },
  "WORKERS": { "type": "number", "required": false, "min": 1, "max": 16 }
}"#;

/// Temporary project directory holding a schema and dotenv files
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    pub fn with_schema(self) -> Self {
        self.write("env.schema.json", APP_SCHEMA_JSON);
        self
    }
}
