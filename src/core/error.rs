//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Which registry a configuration error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    Module,
    Sink,
}

impl std::fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryKind::Module => write!(f, "module"),
            RegistryKind::Sink => write!(f, "sink"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Name is empty or longer than the registry allows
    #[error("Invalid {kind} name '{name}': must be 1..={max_len} bytes")]
    NameInvalid {
        kind: RegistryKind,
        name: String,
        max_len: usize,
    },

    /// Name already registered
    #[error("A {kind} named '{name}' is already registered")]
    DuplicateName { kind: RegistryKind, name: String },

    /// Registry has no free slot left
    #[error("The {kind} registry is full ({capacity} entries)")]
    RegistryFull { kind: RegistryKind, capacity: usize },

    /// A level that cannot be used in this position (e.g. Inherit as the default)
    #[error("Invalid level for {context}")]
    InvalidLevel { context: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// The sink refused to open, registration aborted
    #[error("Sink '{name}' failed to open: {source}")]
    SinkOpenFailed {
        name: String,
        #[source]
        source: Box<LoggerError>,
    },

    /// Logger is shutting down or already stopped
    #[error("Logger shutdown in progress")]
    ShutdownInProgress,

    /// A background thread panicked and could not be joined cleanly
    #[error("Logger thread '{thread}' panicked")]
    WorkerPanicked { thread: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn name_invalid(kind: RegistryKind, name: impl Into<String>, max_len: usize) -> Self {
        LoggerError::NameInvalid {
            kind,
            name: name.into(),
            max_len,
        }
    }

    pub fn duplicate(kind: RegistryKind, name: impl Into<String>) -> Self {
        LoggerError::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    pub fn registry_full(kind: RegistryKind, capacity: usize) -> Self {
        LoggerError::RegistryFull { kind, capacity }
    }

    pub fn invalid_level(context: impl Into<String>) -> Self {
        LoggerError::InvalidLevel {
            context: context.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn sink_open(name: impl Into<String>, source: LoggerError) -> Self {
        LoggerError::SinkOpenFailed {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// True for errors produced by registration or configuration calls
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoggerError::NameInvalid { .. }
                | LoggerError::DuplicateName { .. }
                | LoggerError::RegistryFull { .. }
                | LoggerError::InvalidLevel { .. }
                | LoggerError::InvalidConfiguration { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::registry_full(RegistryKind::Module, 8);
        assert!(matches!(err, LoggerError::RegistryFull { .. }));
        assert!(err.is_configuration());

        let err = LoggerError::config("LoggerConfig", "queue_capacity must be positive");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        assert!(!LoggerError::ShutdownInProgress.is_configuration());
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::name_invalid(RegistryKind::Sink, "", 16);
        assert_eq!(err.to_string(), "Invalid sink name '': must be 1..=16 bytes");

        let err = LoggerError::duplicate(RegistryKind::Module, "db");
        assert_eq!(err.to_string(), "A module named 'db' is already registered");

        let err = LoggerError::registry_full(RegistryKind::Sink, 8);
        assert_eq!(err.to_string(), "The sink registry is full (8 entries)");
    }

    #[test]
    fn test_sink_open_error_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::sink_open("file", LoggerError::from(io_err));

        assert!(err.to_string().contains("'file'"));
        let source = std::error::Error::source(&err).expect("source is kept");
        assert!(source.to_string().contains("access denied"));
    }
}
