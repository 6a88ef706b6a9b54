use crate::cli::{Cli, Command, OutputFormat, VerbosityLevel};
use crate::coerce::coerce;
use crate::schema::VarType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Tool configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub schema: SchemaConfig,
    pub environment: EnvironmentConfig,
    pub validation: ValidationSettings,
    pub output: OutputConfig,
}

/// Where the schema comes from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SchemaConfig {
    /// Schema file; discovered in the working directory when unset
    pub path: Option<PathBuf>,
}

/// Where the validated environment comes from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Dotenv files, applied in order; `.env` is read if present when empty
    pub files: Vec<PathBuf>,
    /// Overlay the process environment after the files
    pub process_env: bool,
}

/// Validation behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ValidationSettings {
    /// Warn about variables the schema does not declare
    pub strict: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormatConfig,
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (errors only)
    pub quiet: bool,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    #[default]
    Human,
    Json,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
        }
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            files: vec![],
            process_env: true,
        }
    }
}

impl Config {
    pub fn verbosity(&self) -> VerbosityLevel {
        if self.output.quiet {
            VerbosityLevel::Quiet
        } else if self.output.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        Self::load_config_with(&SystemEnvProvider, cli).await
    }

    /// Load configuration reading overrides from a custom environment provider
    pub async fn load_config_with(env: &impl EnvProvider, cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            config = Self::load_from_file(config_path).await?;
        } else if let Some(found_config) = Self::find_config_file().await? {
            config = found_config;
        }

        config = Self::apply_environment_overrides_with(env, config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        let config_names = [
            "validate-env.toml",
            "validate-env.json",
            ".validate-env.toml",
            ".validate-env.json",
        ];

        // Check current directory first
        for name in &config_names {
            let path = PathBuf::from(name);
            if tokio::fs::try_exists(&path).await? {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("validate-env");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if tokio::fs::try_exists(&path).await? {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(schema) = env.get("VALIDATE_ENV_SCHEMA") {
            config.schema.path = Some(PathBuf::from(schema));
        }

        if let Some(files) = env.get("VALIDATE_ENV_FILES") {
            config.environment.files = files
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
        }

        if let Some(process_env) = env.get("VALIDATE_ENV_PROCESS_ENV") {
            config.environment.process_env = parse_flag("VALIDATE_ENV_PROCESS_ENV", &process_env)?;
        }

        if let Some(strict) = env.get("VALIDATE_ENV_STRICT") {
            config.validation.strict = parse_flag("VALIDATE_ENV_STRICT", &strict)?;
        }

        if let Some(verbose) = env.get("VALIDATE_ENV_VERBOSE") {
            config.output.verbose = parse_flag("VALIDATE_ENV_VERBOSE", &verbose)?;
        }

        if let Some(quiet) = env.get("VALIDATE_ENV_QUIET") {
            config.output.quiet = parse_flag("VALIDATE_ENV_QUIET", &quiet)?;
        }

        if let Some(format) = env.get("VALIDATE_ENV_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid VALIDATE_ENV_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration; only flags given on the command line override
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
        }

        match &cli.command {
            Command::Check(args) => {
                if let Some(schema) = &args.schema {
                    config.schema.path = Some(schema.clone());
                }
                if !args.env_files.is_empty() {
                    config.environment.files = args.env_files.clone();
                }
                if args.no_process_env {
                    config.environment.process_env = false;
                }
                if args.strict {
                    config.validation.strict = true;
                }
                if let Some(format) = args.format {
                    config.output.format = format.into();
                }
            }
            Command::Example(args) | Command::Types(args) => {
                if let Some(schema) = &args.schema {
                    config.schema.path = Some(schema.clone());
                }
            }
        }

        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        if let Some(path) = &config.schema.path
            && path.as_os_str().is_empty()
        {
            return Err(ConfigError::Validation(
                "Schema path must not be empty".to_string(),
            ));
        }

        if config
            .environment
            .files
            .iter()
            .any(|path| path.as_os_str().is_empty())
        {
            return Err(ConfigError::Validation(
                "Environment file paths must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Boolean overrides accept the same tokens as boolean variables
fn parse_flag(name: &str, value: &str) -> Result<bool> {
    coerce(value, VarType::Boolean)
        .ok()
        .and_then(|parsed| parsed.as_bool())
        .ok_or_else(|| ConfigError::Environment(format!("Invalid {} value: {}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    /// Mock environment variable provider for testing
    #[derive(Default)]
    struct MockEnvProvider {
        vars: HashMap<String, String>,
    }

    impl MockEnvProvider {
        fn new() -> Self {
            Self::default()
        }

        fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
            self.vars.insert(key.into(), value.into());
        }
    }

    impl EnvProvider for MockEnvProvider {
        fn get(&self, key: &str) -> Option<String> {
            self.vars.get(key).cloned()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.schema.path, None);
        assert!(config.environment.files.is_empty());
        assert!(config.environment.process_env);
        assert!(!config.validation.strict);
        assert_eq!(config.output.format, OutputFormatConfig::Human);
        assert_eq!(config.verbosity(), VerbosityLevel::Normal);
    }

    #[tokio::test]
    async fn test_load_toml_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("validate-env.toml");

        let toml_content = r#"
[schema]
path = "config/env.schema.json"

[environment]
files = [".env", ".env.local"]
process_env = false

[validation]
strict = true

[output]
format = "json"
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = ConfigManager::load_from_file(&config_path).await.unwrap();

        assert_eq!(
            config.schema.path,
            Some(PathBuf::from("config/env.schema.json"))
        );
        assert_eq!(
            config.environment.files,
            vec![PathBuf::from(".env"), PathBuf::from(".env.local")]
        );
        assert!(!config.environment.process_env);
        assert!(config.validation.strict);
        assert_eq!(config.output.format, OutputFormatConfig::Json);
        // Sections left out keep their defaults
        assert!(!config.output.verbose);
    }

    #[tokio::test]
    async fn test_load_json_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("validate-env.json");

        fs::write(
            &config_path,
            r#"{ "validation": { "strict": true }, "output": { "quiet": true } }"#,
        )
        .unwrap();

        let config = ConfigManager::load_from_file(&config_path).await.unwrap();
        assert!(config.validation.strict);
        assert!(config.output.quiet);
        assert!(config.environment.process_env);
    }

    #[tokio::test]
    async fn test_unsupported_file_format() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        fs::write(&config_path, "invalid: yaml").unwrap();

        match ConfigManager::load_from_file(&config_path).await {
            Err(ConfigError::UnsupportedFormat(ext)) => assert_eq!(ext, "yaml"),
            other => panic!("Expected UnsupportedFormat error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        fs::write(&config_path, "invalid toml [[[").unwrap();

        let result = ConfigManager::load_from_file(&config_path).await;
        assert!(matches!(result.unwrap_err(), ConfigError::TomlParsing(_)));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        fs::write(&config_path, "{ invalid json }").unwrap();

        let result = ConfigManager::load_from_file(&config_path).await;
        assert!(matches!(result.unwrap_err(), ConfigError::JsonParsing(_)));
    }

    #[test]
    fn test_environment_overrides() {
        let mut mock_env = MockEnvProvider::new();
        mock_env.set("VALIDATE_ENV_SCHEMA", "/srv/app/env.schema.toml");
        mock_env.set("VALIDATE_ENV_FILES", ".env, .env.production");
        mock_env.set("VALIDATE_ENV_PROCESS_ENV", "false");
        mock_env.set("VALIDATE_ENV_STRICT", "yes");
        mock_env.set("VALIDATE_ENV_FORMAT", "JSON");

        let config =
            ConfigManager::apply_environment_overrides_with(&mock_env, Config::default()).unwrap();

        assert_eq!(
            config.schema.path,
            Some(PathBuf::from("/srv/app/env.schema.toml"))
        );
        assert_eq!(
            config.environment.files,
            vec![PathBuf::from(".env"), PathBuf::from(".env.production")]
        );
        assert!(!config.environment.process_env);
        assert!(config.validation.strict);
        assert_eq!(config.output.format, OutputFormatConfig::Json);
    }

    #[test]
    fn test_invalid_environment_values() {
        let mut mock_env = MockEnvProvider::new();
        mock_env.set("VALIDATE_ENV_STRICT", "sometimes");

        let result = ConfigManager::apply_environment_overrides_with(&mock_env, Config::default());
        assert!(matches!(result.unwrap_err(), ConfigError::Environment(_)));

        let mut mock_env = MockEnvProvider::new();
        mock_env.set("VALIDATE_ENV_FORMAT", "yaml");
        let result = ConfigManager::apply_environment_overrides_with(&mock_env, Config::default());
        assert!(matches!(result.unwrap_err(), ConfigError::Environment(_)));
    }

    #[test]
    fn test_merge_with_cli() {
        let cli = Cli::try_parse_from([
            "validate-env",
            "--verbose",
            "check",
            "--schema",
            "schema.json",
            "--env-file",
            ".env.test",
            "--no-process-env",
            "--strict",
            "--format",
            "json",
        ])
        .unwrap();

        let config = ConfigManager::merge_with_cli(Config::default(), &cli);

        assert_eq!(config.schema.path, Some(PathBuf::from("schema.json")));
        assert_eq!(config.environment.files, vec![PathBuf::from(".env.test")]);
        assert!(!config.environment.process_env);
        assert!(config.validation.strict);
        assert!(config.output.verbose);
        assert_eq!(config.output.format, OutputFormatConfig::Json);
    }

    #[test]
    fn test_cli_quiet_overrides_file_verbose() {
        let cli = Cli::try_parse_from(["validate-env", "types", "--quiet"]).unwrap();

        let mut base = Config::default();
        base.output.verbose = true;

        let config = ConfigManager::merge_with_cli(base, &cli);
        assert_eq!(config.verbosity(), VerbosityLevel::Quiet);
        assert!(ConfigManager::validate_config(&config).is_ok());
    }

    #[test]
    fn test_cli_without_flags_keeps_file_values() {
        let cli = Cli::try_parse_from(["validate-env", "check"]).unwrap();

        let mut base = Config::default();
        base.validation.strict = true;
        base.output.format = OutputFormatConfig::Json;
        base.environment.files = vec![PathBuf::from(".env.ci")];

        let config = ConfigManager::merge_with_cli(base.clone(), &cli);
        assert_eq!(config, base);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(ConfigManager::validate_config(&config).is_ok());

        config.output.verbose = true;
        config.output.quiet = true;
        assert!(ConfigManager::validate_config(&config).is_err());

        config.output.quiet = false;
        config.environment.files = vec![PathBuf::new()];
        assert!(ConfigManager::validate_config(&config).is_err());

        config.environment.files = vec![];
        config.schema.path = Some(PathBuf::new());
        assert!(ConfigManager::validate_config(&config).is_err());
    }

    #[test]
    fn test_output_format_conversion() {
        assert_eq!(
            OutputFormatConfig::from(OutputFormat::Json),
            OutputFormatConfig::Json
        );
        assert_eq!(
            OutputFormat::from(OutputFormatConfig::Human),
            OutputFormat::Human
        );
    }

    #[tokio::test]
    async fn test_load_config_integration() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        fs::write(
            &config_path,
            "[validation]\nstrict = true\n\n[output]\nformat = \"json\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "validate-env",
            "--config",
            config_path.to_str().unwrap(),
            "check",
            "--format",
            "human",
        ])
        .unwrap();

        let mut mock_env = MockEnvProvider::new();
        mock_env.set("VALIDATE_ENV_QUIET", "true");

        let config = ConfigManager::load_config_with(&mock_env, &cli).await.unwrap();

        // File value survives, CLI overrides file, environment fills in the rest
        assert!(config.validation.strict);
        assert_eq!(config.output.format, OutputFormatConfig::Human);
        assert!(config.output.quiet);
    }
}
