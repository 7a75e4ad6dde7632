//! Logging macros for ergonomic log message formatting.
//!
//! Every macro captures the call site's file, line and enclosing function
//! name, and formats its arguments like `format!`. The message is only
//! formatted when the module admits the level.
//!
//! # Examples
//!
//! ```
//! use rust_fanout_logger::prelude::*;
//! use rust_fanout_logger::{error, info};
//!
//! let logger = Logger::builder().default_sink(false).build().unwrap();
//!
//! // Default module
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // Explicit module, by handle or by name
//! let db = logger.register_module("db", LogLevel::Warn, true).unwrap();
//! error!(logger, &db, "query failed: {}", "timeout");
//! let name = "db";
//! error!(logger, name, "pool exhausted");
//! ```

/// Name of the enclosing function, without its module path
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        let name = name.strip_suffix("::f").unwrap_or(name);
        let name = name.trim_end_matches("::{{closure}}");
        match name.rfind("::") {
            Some(pos) => &name[pos + 2..],
            None => name,
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __location {
    () => {
        $crate::Location::new(file!(), line!(), $crate::__function_name!())
    };
}

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_fanout_logger::prelude::*;
/// # let logger = Logger::builder().default_sink(false).build().unwrap();
/// use rust_fanout_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
///
/// let net = logger.register_module("net", LogLevel::Debug, true).unwrap();
/// log!(logger, &net, LogLevel::Debug, "{} bytes read", 42);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $fmt:literal $($arg:tt)*) => {
        $logger.log(
            $crate::ModuleRef::Default,
            $level,
            $crate::__location!(),
            format_args!($fmt $($arg)*),
        )
    };
    ($logger:expr, $module:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($module, $level, $crate::__location!(), format_args!($($arg)+))
    };
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use rust_fanout_logger::prelude::*;
/// # let logger = Logger::builder().default_sink(false).build().unwrap();
/// # logger.set_module_level(&logger.default_module(), LogLevel::Trace);
/// use rust_fanout_logger::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $fmt:literal $($arg:tt)*) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $fmt $($arg)*)
    };
    ($logger:expr, $module:expr, $($arg:tt)+) => {
        $crate::log!($logger, $module, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $fmt:literal $($arg:tt)*) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $fmt $($arg)*)
    };
    ($logger:expr, $module:expr, $($arg:tt)+) => {
        $crate::log!($logger, $module, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_fanout_logger::prelude::*;
/// # let logger = Logger::builder().default_sink(false).build().unwrap();
/// use rust_fanout_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $fmt:literal $($arg:tt)*) => {
        $crate::log!($logger, $crate::LogLevel::Info, $fmt $($arg)*)
    };
    ($logger:expr, $module:expr, $($arg:tt)+) => {
        $crate::log!($logger, $module, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $fmt:literal $($arg:tt)*) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $fmt $($arg)*)
    };
    ($logger:expr, $module:expr, $($arg:tt)+) => {
        $crate::log!($logger, $module, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $fmt:literal $($arg:tt)*) => {
        $crate::log!($logger, $crate::LogLevel::Error, $fmt $($arg)*)
    };
    ($logger:expr, $module:expr, $($arg:tt)+) => {
        $crate::log!($logger, $module, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
///
/// Only logs; the process keeps running.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $fmt:literal $($arg:tt)*) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $fmt $($arg)*)
    };
    ($logger:expr, $module:expr, $($arg:tt)+) => {
        $crate::log!($logger, $module, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn capture() -> (Logger, MemorySink) {
        let memory = MemorySink::new();
        let captured = memory.clone();
        let logger = Logger::builder()
            .default_sink(false)
            .default_level(LogLevel::Trace)
            .sink("mem", SinkOptions::new(LogLevel::Trace), memory)
            .build()
            .unwrap();
        (logger, captured)
    }

    #[test]
    fn test_function_name() {
        assert_eq!(__function_name!(), "test_function_name");
        let from_closure = || __function_name!();
        assert_eq!(from_closure(), "test_function_name");
    }

    #[test]
    fn test_macros_capture_location() {
        let (logger, captured) = capture();
        info!(logger, "value {}", 7);
        logger.shutdown().unwrap();

        let lines = captured.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("macros.rs:"));
        assert!(lines[0].contains(" test_macros_capture_location: value 7"));
    }

    #[test]
    fn test_level_macros() {
        let (logger, captured) = capture();
        trace!(logger, "t");
        debug!(logger, "d");
        info!(logger, "i");
        warn!(logger, "w");
        error!(logger, "e");
        fatal!(logger, "f");
        logger.shutdown().unwrap();

        let levels: Vec<bool> = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR", "FATAL"]
            .iter()
            .zip(captured.lines())
            .map(|(level, line)| line.contains(level))
            .collect();
        assert_eq!(levels, vec![true; 6]);
    }

    #[test]
    fn test_module_argument() {
        let (logger, captured) = capture();
        let db = logger.register_module("db", LogLevel::Warn, true).unwrap();

        assert_eq!(info!(logger, &db, "hidden"), LogOutcome::FilteredOut);
        assert_eq!(warn!(logger, &db, "shown {}", 1), LogOutcome::Queued);
        let name = String::from("db");
        assert_eq!(error!(logger, &name, "by name"), LogOutcome::Queued);
        logger.shutdown().unwrap();

        let lines = captured.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.contains("[ db ")));
    }
}
