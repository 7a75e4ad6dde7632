//! Output format configuration for log records
//!
//! Sinks receive bytes, not records: each sink task renders the record with
//! the sink's own [`OutputFormat`] and [`ColorMode`] before calling `write`.
//!
//! - Text: `[ 2025-01-08 10:30:45.123 ] [ INFO  ] [ 0000000000000001 ] [ main             ] main.rs:12 main: Request processed`
//! - Json: one object per line with the same fields

use super::log_record::{truncate, LogRecord};
use super::timestamp::format_timestamp;
use colored::Color;
use std::fmt::Display;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Output format for log records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text line (default)
    #[default]
    Text,

    /// JSON object per line for machine processing
    Json,
}

/// When a sink's text output gets ANSI colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// Colors only if the sink writes to a terminal
    #[default]
    Auto,
    Never,
    Always,
}

impl ColorMode {
    pub fn use_colors(self, is_terminal: bool) -> bool {
        match self {
            ColorMode::Auto => is_terminal,
            ColorMode::Never => false,
            ColorMode::Always => true,
        }
    }
}

/// Field widths of the text line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldBounds {
    /// Module column is padded to this width
    pub module_width: usize,
    pub file_len: usize,
    pub func_len: usize,
}

impl Default for FieldBounds {
    fn default() -> Self {
        Self {
            module_width: 16,
            file_len: 64,
            func_len: 64,
        }
    }
}

impl OutputFormat {
    /// Render a record, newline included
    pub fn format(&self, record: &LogRecord, use_colors: bool, bounds: &FieldBounds) -> String {
        match self {
            OutputFormat::Text => format_text(record, use_colors, bounds),
            OutputFormat::Json => format_json(record, bounds),
        }
    }
}

/// Render a record the way the built-in sinks do
pub fn format_record(
    record: &LogRecord,
    format: OutputFormat,
    use_colors: bool,
    bounds: &FieldBounds,
) -> String {
    format.format(record, use_colors, bounds)
}

fn format_text(record: &LogRecord, use_colors: bool, bounds: &FieldBounds) -> String {
    let timestamp = format_timestamp(record.timestamp);
    let level = format!("{:<5}", record.level.as_str());
    let thread = format!("{:016x}", record.thread_id);
    let module = format!("{:<width$}", &*record.module, width = bounds.module_width);
    let file = truncate(&record.file, bounds.file_len);
    let func = truncate(&record.func, bounds.func_len);

    if use_colors {
        format!(
            "[ {} ] [ {} ] [ {} ] [ {} ] {}:{} {}: {}\n",
            sgr(BOLD, timestamp),
            sgr(&record.level.color_code().to_fg_str(), level),
            sgr(BOLD, thread),
            sgr(BOLD, module),
            sgr(&Color::Cyan.to_fg_str(), file),
            sgr(&Color::Yellow.to_fg_str(), record.line),
            sgr(&Color::Magenta.to_fg_str(), func),
            record.message
        )
    } else {
        format!(
            "[ {} ] [ {} ] [ {} ] [ {} ] {}:{} {}: {}\n",
            timestamp, level, thread, module, file, record.line, func, record.message
        )
    }
}

const BOLD: &str = "1";

/// Wrap `text` in an SGR escape, regardless of where the bytes end up
///
/// `Colorize` consults stdout and `NO_COLOR` on its own, which would
/// override the sink's [`ColorMode`].
fn sgr(code: &str, text: impl Display) -> String {
    format!("\x1b[{}m{}\x1b[0m", code, text)
}

fn format_json(record: &LogRecord, bounds: &FieldBounds) -> String {
    let value: Value = json!({
        "timestamp": format_timestamp(record.timestamp),
        "timestamp_ns": record.timestamp,
        "level": record.level.as_str(),
        "thread_id": format!("{:016x}", record.thread_id),
        "module": &*record.module,
        "file": truncate(&record.file, bounds.file_len),
        "line": record.line,
        "func": truncate(&record.func, bounds.func_len),
        "message": record.message,
    });
    let mut line = value.to_string();
    line.push('\n');
    line
}
