//! Output and Reporting
//!
//! Renders a [`ValidationResult`] as per-variable status lines or as JSON.

use crate::cli::{OutputFormat, VerbosityLevel};
use crate::error::Result;
use crate::schema::Schema;
use crate::validator::{ValidationResult, WarningKind};

/// Output formatter for validation results
pub struct Output {
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    /// Formatter with colours forced on or off
    pub fn with_colors(verbosity: VerbosityLevel, show_colors: bool) -> Self {
        Self {
            verbosity,
            show_colors,
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    pub fn render(
        &self,
        format: OutputFormat,
        result: &ValidationResult,
        schema: &Schema,
    ) -> Result<String> {
        match format {
            OutputFormat::Human => Ok(self.format_result(result, schema)),
            OutputFormat::Json => Self::format_json(result),
        }
    }

    pub fn format_json(result: &ValidationResult) -> Result<String> {
        let mut json = serde_json::to_string_pretty(result)?;
        json.push('\n');
        Ok(json)
    }

    pub fn format_result(&self, result: &ValidationResult, schema: &Schema) -> String {
        let mut output = String::new();

        if self.verbosity == VerbosityLevel::Quiet {
            for error in &result.errors {
                output.push_str(&format!(
                    "{} {} - {}\n",
                    self.colorize("✗", "31"),
                    error.variable,
                    error.message
                ));
            }
            return output;
        }

        output.push_str("Environment Validation:\n");
        for name in schema.names() {
            output.push_str(&self.format_variable(name, result));
        }

        let undeclared: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::Unused)
            .collect();
        if !undeclared.is_empty() {
            output.push_str("\nUndeclared variables:\n");
            for warning in undeclared {
                output.push_str(&format!(
                    "  {} {}\n",
                    self.colorize("?", "36"),
                    warning.variable
                ));
            }
        }

        output.push('\n');
        output.push_str(&self.format_summary(result, schema));
        output
    }

    fn format_variable(&self, name: &str, result: &ValidationResult) -> String {
        if let Some(error) = result.errors_for(name).next() {
            let mut line = format!(
                "  {} {} - {}\n",
                self.colorize("✗", "31"),
                name,
                error.message
            );
            if self.verbosity >= VerbosityLevel::Verbose {
                if let Some(expected) = &error.expected {
                    line.push_str(&format!("      expected: {}\n", expected));
                }
                if let Some(received) = &error.received {
                    line.push_str(&format!("      received: {}\n", received));
                }
            }
            return line;
        }

        let Some(value) = result.parsed.get(name) else {
            return format!("  {} {} (not set)\n", self.colorize("-", "36"), name);
        };

        // Values are only echoed in verbose mode; they may be secrets
        let shown = if self.verbosity >= VerbosityLevel::Verbose {
            format!(" = {}", value)
        } else {
            String::new()
        };

        match result.warnings_for(name).next() {
            Some(warning) => {
                let note = match warning.kind {
                    WarningKind::DefaultApplied => "default".to_string(),
                    _ => warning.message.clone(),
                };
                format!(
                    "  {} {}{} ({})\n",
                    self.colorize("!", "33"),
                    name,
                    shown,
                    note
                )
            }
            None => format!("  {} {}{}\n", self.colorize("✓", "32"), name, shown),
        }
    }

    fn format_summary(&self, result: &ValidationResult, schema: &Schema) -> String {
        let status = if result.valid {
            self.colorize("VALID", "32")
        } else {
            self.colorize("INVALID", "31")
        };

        format!(
            "Result: {} ({} variable{}, {} error{}, {} warning{})\n",
            status,
            schema.len(),
            plural(schema.len()),
            result.errors.len(),
            plural(result.errors.len()),
            result.warnings.len(),
            plural(result.warnings.len())
        )
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Environment, VariableSpec};
    use crate::validator::{ValidationOptions, validate};

    fn schema() -> Schema {
        Schema::new()
            .with_variable("API_KEY", VariableSpec::string())
            .with_variable("PORT", VariableSpec::number().with_default(3000))
            .with_variable("DEBUG", VariableSpec::boolean().optional())
            .with_variable("NODE_ENV", VariableSpec::string())
    }

    fn result(schema: &Schema) -> ValidationResult {
        let env: Environment = [("NODE_ENV", "production"), ("EXTRA", "1")]
            .into_iter()
            .collect();
        validate(schema, &env, &ValidationOptions::strict())
    }

    #[test]
    fn test_human_output() {
        let schema = schema();
        let output = Output::with_colors(VerbosityLevel::Normal, false);
        let text = output.format_result(&result(&schema), &schema);

        assert!(text.contains("✗ API_KEY - Required variable API_KEY is not set"));
        assert!(text.contains("! PORT (default)"));
        assert!(text.contains("- DEBUG (not set)"));
        assert!(text.contains("✓ NODE_ENV\n"));
        assert!(text.contains("Undeclared variables:\n  ? EXTRA"));
        assert!(text.contains("Result: INVALID (4 variables, 1 error, 2 warnings)"));
        assert!(!text.contains("production"));
    }

    #[test]
    fn test_verbose_output_shows_values_and_expectations() {
        let schema = schema();
        let output = Output::with_colors(VerbosityLevel::Verbose, false);
        let text = output.format_result(&result(&schema), &schema);

        assert!(text.contains("✓ NODE_ENV = production"));
        assert!(text.contains("! PORT = 3000 (default)"));
        assert!(text.contains("expected: string"));
    }

    #[test]
    fn test_quiet_output_lists_only_errors() {
        let schema = schema();
        let output = Output::with_colors(VerbosityLevel::Quiet, false);
        let text = output.format_result(&result(&schema), &schema);

        assert_eq!(text, "✗ API_KEY - Required variable API_KEY is not set\n");
    }

    #[test]
    fn test_colors() {
        let schema = schema();
        let output = Output::with_colors(VerbosityLevel::Normal, true);
        let text = output.format_result(&result(&schema), &schema);
        assert!(text.contains("\x1b[31m✗\x1b[0m"));
    }

    #[test]
    fn test_json_output() {
        let schema = schema();
        let json = Output::format_json(&result(&schema)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["valid"], false);
        assert_eq!(value["errors"][0]["kind"], "missing");
        assert_eq!(value["parsed"]["PORT"], 3000);
        assert_eq!(value["warnings"][1]["kind"], "unused");
    }
}
