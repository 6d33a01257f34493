//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use serde_json::Value;
use vclgen_core::VariableMap;

use crate::cli::OutputFormat;
use crate::context::{CliError, CliResult};

pub(crate) fn render_variables(variables: &VariableMap, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let text = serde_json::to_string_pretty(variables)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
            println!("{text}");
        }
        OutputFormat::Table => {
            for line in variable_rows(variables) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn variable_rows(variables: &VariableMap) -> Vec<String> {
    let mut rows = vec![format!("{:<24} VALUE", "NAME")];
    rows.extend(
        variables
            .iter()
            .map(|(name, value)| format!("{name:<24} {}", summarize(value))),
    );
    rows
}

fn summarize(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Array(items) if items.is_empty() => "-".to_string(),
        Value::Bool(flag) => String::from(if *flag { "yes" } else { "no" }),
        Value::String(text) if text.is_empty() => "-".to_string(),
        Value::String(text) if text.contains('\n') => {
            format!("<{} lines>", text.lines().count())
        }
        Value::String(text) => text.clone(),
        Value::Array(items) if items.iter().all(|item| item.get("ip").is_some()) => items
            .iter()
            .filter_map(|item| item.get("ip").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
