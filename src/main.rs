use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::debug;

use validate_env::cli::{Cli, Command};
use validate_env::config::{Config, ConfigManager};
use validate_env::{
    EnvLoader, Output, Schema, SchemaLoader, ValidationOptions, generate_env_example,
    generate_typescript, logging, validate,
};

/// Exit status when the environment fails validation
const EXIT_INVALID: u8 = 1;
/// Exit status for operational failures (bad config, unreadable schema, ...)
const EXIT_FAILURE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = ConfigManager::load_config(cli)
        .await
        .context("Failed to load configuration")?;

    logging::init_logging(config.verbosity());
    debug!(?config, "effective configuration");

    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let schema = SchemaLoader::resolve(config.schema.path.as_deref(), &cwd)
        .await
        .context("Failed to load schema")?;

    match &cli.command {
        Command::Check(_) => check(&config, &schema).await,
        Command::Example(args) => {
            emit(args.output.as_deref(), &generate_env_example(&schema)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Types(args) => {
            emit(args.output.as_deref(), &generate_typescript(&schema)).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn check(config: &Config, schema: &Schema) -> Result<ExitCode> {
    let mut loader = EnvLoader::new().with_process_env(config.environment.process_env);
    if config.environment.files.is_empty() {
        loader = loader.optional_file(".env");
    } else {
        for file in &config.environment.files {
            loader = loader.file(file);
        }
    }

    let env = loader.load().await.context("Failed to load environment")?;
    let options = ValidationOptions {
        strict: config.validation.strict,
    };
    let result = validate(schema, &env, &options);

    let output = Output::new(config.verbosity());
    print!(
        "{}",
        output.render(config.output.format.into(), &result, schema)?
    );

    Ok(if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_INVALID)
    })
}

async fn emit(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
