//! Text generators driven by a schema: `.env.example` files and TypeScript declarations

use std::fmt::Write;

use crate::schema::{Schema, VarType, VariableSpec};

/// Render a `.env.example` document listing every variable in schema order
pub fn generate_env_example(schema: &Schema) -> String {
    let mut out = String::new();

    for (index, (name, spec)) in schema.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }

        if let Some(description) = &spec.description {
            for line in description.lines() {
                let _ = writeln!(out, "# {}", line);
            }
        }
        let _ = writeln!(out, "# {}", describe(spec));
        if let Some(note) = &spec.deprecated {
            let _ = writeln!(out, "# DEPRECATED: {}", note);
        }

        let value = spec
            .default
            .as_ref()
            .map(|default| dotenv_value(&default.to_string()))
            .unwrap_or_default();
        let _ = writeln!(out, "{}={}", name, value);
    }

    out
}

/// Quote a value so a dotenv parser reads it back unchanged
fn dotenv_value(value: &str) -> String {
    let needs_quotes = value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$'));
    if !needs_quotes {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '$' => quoted.push_str("\\$"),
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// One-line summary of a spec's constraints
fn describe(spec: &VariableSpec) -> String {
    let mut parts = vec![
        spec.var_type.to_string(),
        if spec.required { "required" } else { "optional" }.to_string(),
    ];

    if let Some(format) = &spec.format {
        parts.push(format!("format: {}", format));
    }
    if let Some(values) = spec.enum_values() {
        parts.push(format!("one of: {}", values.join(", ")));
    }
    if spec.var_type == VarType::Number {
        match (spec.min, spec.max) {
            (Some(min), Some(max)) => parts.push(format!("range: {}..{}", min, max)),
            (Some(min), None) => parts.push(format!("min: {}", min)),
            (None, Some(max)) => parts.push(format!("max: {}", max)),
            (None, None) => {}
        }
    }
    if spec.var_type == VarType::String {
        match (spec.min_length, spec.max_length) {
            (Some(min), Some(max)) => parts.push(format!("length: {}..{}", min, max)),
            (Some(min), None) => parts.push(format!("min length: {}", min)),
            (None, Some(max)) => parts.push(format!("max length: {}", max)),
            (None, None) => {}
        }
    }
    if let Some(pattern) = &spec.pattern {
        parts.push(format!("pattern: {}", pattern));
    }
    if let Some(default) = &spec.default {
        parts.push(format!("default: {}", dotenv_value(&default.to_string())));
    }

    parts.join(", ")
}

/// Render a TypeScript declaration that types `process.env` after the schema
pub fn generate_typescript(schema: &Schema) -> String {
    let mut out = String::new();
    out.push_str("// Generated by validate-env. Do not edit by hand.\n\n");
    out.push_str("declare namespace NodeJS {\n");
    out.push_str("  interface ProcessEnv {\n");

    for (name, spec) in schema.iter() {
        let mut doc = Vec::new();
        if let Some(description) = &spec.description {
            doc.extend(description.lines().map(str::to_string));
        }
        if let Some(default) = &spec.default {
            doc.push(format!("@default {}", default));
        }
        if let Some(note) = &spec.deprecated {
            doc.push(format!("@deprecated {}", note));
        }
        match doc.as_slice() {
            [] => {}
            [single] => {
                let _ = writeln!(out, "    /** {} */", single);
            }
            lines => {
                out.push_str("    /**\n");
                for line in lines {
                    let _ = writeln!(out, "     * {}", line);
                }
                out.push_str("     */\n");
            }
        }

        let optional = if spec.may_be_absent() { "?" } else { "" };
        let _ = writeln!(
            out,
            "    readonly {}{}: {};",
            ts_property(name),
            optional,
            ts_type(spec)
        );
    }

    out.push_str("  }\n");
    out.push_str("}\n");
    out
}

/// Environment values are always strings at runtime; enums narrow to literal unions
fn ts_type(spec: &VariableSpec) -> String {
    match spec.enum_values() {
        Some(values) => values
            .iter()
            .map(|value| format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\"")))
            .collect::<Vec<_>>()
            .join(" | "),
        None => "string".to_string(),
    }
}

fn ts_property(name: &str) -> String {
    let is_identifier = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if is_identifier {
        name.to_string()
    } else {
        format!("\"{}\"", name)
    }
}
