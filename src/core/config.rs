//! Logger configuration
//!
//! Every bound the engine works with (queue size, registry sizes, name and
//! field lengths) is a plain value here, fixed when the logger is built.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::output_format::{ColorMode, FieldBounds};
use serde::{Deserialize, Serialize};

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_MAX_MODULES: usize = 8;
pub const DEFAULT_MAX_SINKS: usize = 8;
pub const DEFAULT_NAME_LENGTH: usize = 16;
pub const DEFAULT_MESSAGE_LENGTH: usize = 512;
pub const DEFAULT_FIELD_LENGTH: usize = 64;
pub const DEFAULT_MODULE_NAME: &str = "main";
pub const DEFAULT_SINK_NAME: &str = "stderr";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Level used by `Inherit` thresholds and by the default module
    pub default_level: LogLevel,
    /// Records the queue holds before producers block
    pub queue_capacity: usize,
    pub max_modules: usize,
    pub max_sinks: usize,
    pub module_name_length: usize,
    pub sink_name_length: usize,
    /// Longer messages are cut at a char boundary
    pub message_length: usize,
    /// Bound of the file and function fields in formatted output
    pub field_length: usize,
    pub default_module_name: String,
    pub default_sink_name: String,
    /// Register the stderr sink at bootstrap
    pub default_sink: bool,
    pub default_sink_color_mode: ColorMode,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_modules: DEFAULT_MAX_MODULES,
            max_sinks: DEFAULT_MAX_SINKS,
            module_name_length: DEFAULT_NAME_LENGTH,
            sink_name_length: DEFAULT_NAME_LENGTH,
            message_length: DEFAULT_MESSAGE_LENGTH,
            field_length: DEFAULT_FIELD_LENGTH,
            default_module_name: DEFAULT_MODULE_NAME.to_string(),
            default_sink_name: DEFAULT_SINK_NAME.to_string(),
            default_sink: true,
            default_sink_color_mode: ColorMode::Auto,
        }
    }
}

impl LoggerConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("queue_capacity", self.queue_capacity),
            ("max_modules", self.max_modules),
            ("max_sinks", self.max_sinks),
            ("module_name_length", self.module_name_length),
            ("sink_name_length", self.sink_name_length),
            ("message_length", self.message_length),
            ("field_length", self.field_length),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(LoggerError::config(
                    "LoggerConfig",
                    format!("{} must be at least 1", field),
                ));
            }
        }

        let name = &self.default_module_name;
        if name.is_empty() || name.len() > self.module_name_length {
            return Err(LoggerError::config(
                "LoggerConfig",
                format!(
                    "default_module_name '{}' must be 1..={} bytes",
                    name, self.module_name_length
                ),
            ));
        }

        let name = &self.default_sink_name;
        if self.default_sink && (name.is_empty() || name.len() > self.sink_name_length) {
            return Err(LoggerError::config(
                "LoggerConfig",
                format!(
                    "default_sink_name '{}' must be 1..={} bytes",
                    name, self.sink_name_length
                ),
            ));
        }
        Ok(())
    }

    pub fn field_bounds(&self) -> FieldBounds {
        FieldBounds {
            module_width: self.module_name_length,
            file_len: self.field_length,
            func_len: self.field_length,
        }
    }
}
