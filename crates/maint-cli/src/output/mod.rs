//! Output formatting module for maint-stats
//!
//! Provides text, JSON, and pretty output formats for CLI output.

use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON format - machine-readable output
    Json,
    /// Plain text format - one line per record
    #[default]
    Text,
    /// Pretty format - aligned columns for reading in a terminal
    Pretty,
}

/// Formatter that can output data in text, JSON, or pretty format
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Create a new formatter with the specified output format
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format data according to the configured output format
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
            OutputFormat::Text => Ok(render_text(&serde_json::to_value(data)?)),
            OutputFormat::Pretty => Ok(render_pretty(&serde_json::to_value(data)?)),
        }
    }

    /// Format and print data to stdout
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn print<T: Serialize>(&self, data: &T) -> Result<()> {
        let output = self.format(data)?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{output}")?;
        Ok(())
    }

    /// Format and print a list with a custom empty message
    ///
    /// For JSON format, wraps the array in a named object with a count field.
    /// For other formats, prints the list normally.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn print_list<T: Serialize>(
        &self,
        data: &[T],
        empty_message: &str,
        collection_name: &str,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::to_string_pretty(&envelope(data, collection_name)?)?;
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{output}")?;
                Ok(())
            }
            OutputFormat::Text | OutputFormat::Pretty => {
                if data.is_empty() {
                    let mut stdout = io::stdout().lock();
                    writeln!(stdout, "{empty_message}")?;
                    Ok(())
                } else {
                    self.print(&data)
                }
            }
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

/// Wrap a list in `{ <collection_name>: [...], "count": n }`
fn envelope<T: Serialize>(data: &[T], collection_name: &str) -> Result<serde_json::Value> {
    let mut map = serde_json::Map::new();
    map.insert(collection_name.to_string(), serde_json::to_value(data)?);
    map.insert("count".to_string(), serde_json::json!(data.len()));
    Ok(serde_json::Value::Object(map))
}

/// Fields rendered bare, in this order, at the start of a text line
const LEAD_KEYS: [&str; 2] = ["when", "kind"];

/// Render a JSON value as concise text
fn render_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            let mut parts = Vec::new();

            for key in &LEAD_KEYS {
                if let Some(val) = map.get(*key) {
                    parts.push(render_field_value(val));
                }
            }

            for (key, val) in map {
                if !LEAD_KEYS.contains(&key.as_str()) {
                    match val {
                        serde_json::Value::Array(arr) if arr.is_empty() => {}
                        serde_json::Value::Null => {}
                        _ => {
                            parts.push(format!("{}:{}", key, render_field_value(val)));
                        }
                    }
                }
            }
            parts.join("  ")
        }
        serde_json::Value::Array(arr) => {
            arr.iter().map(render_text).collect::<Vec<_>>().join("\n")
        }
        _ => render_field_value(value),
    }
}

/// Render a JSON value with lead fields padded into columns
fn render_pretty(value: &serde_json::Value) -> String {
    let serde_json::Value::Array(rows) = value else {
        return render_text(value);
    };

    let widths: Vec<usize> = LEAD_KEYS
        .iter()
        .map(|key| {
            rows.iter()
                .filter_map(|row| row.get(*key))
                .map(|v| render_field_value(v).len())
                .max()
                .unwrap_or(0)
        })
        .collect();

    rows.iter()
        .map(|row| {
            let mut line = String::new();
            for (key, width) in LEAD_KEYS.iter().zip(widths.iter().copied()) {
                let cell = row.get(*key).map(render_field_value).unwrap_or_default();
                line.push_str(&format!("{cell:<width$}  "));
            }
            if let serde_json::Value::Object(map) = row {
                let rest: Vec<String> = map
                    .iter()
                    .filter(|(k, v)| !LEAD_KEYS.contains(&k.as_str()) && !v.is_null())
                    .map(|(k, v)| format!("{}:{}", k, render_field_value(v)))
                    .collect();
                line.push_str(&rest.join("  "));
            }
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a single field value as concise text
fn render_field_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => {
            if s.contains(' ') || s.contains('\n') {
                format!("\"{}\"", s.replace('\n', "\\n"))
            } else {
                s.clone()
            }
        }
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(render_field_value).collect();
            format!("[{}]", items.join(","))
        }
        serde_json::Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| format!("{}:{}", k, render_field_value(v)))
                .collect();
            format!("{{{}}}", parts.join(","))
        }
    }
}
