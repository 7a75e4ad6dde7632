//! Sink implementations

pub mod memory;
pub mod stderr;

#[cfg(feature = "file")]
pub mod file;

#[cfg(feature = "network")]
pub mod network;

pub use memory::MemorySink;
pub use stderr::StderrSink;

#[cfg(feature = "file")]
pub use file::FileSink;

#[cfg(feature = "network")]
pub use network::TcpSink;

pub use crate::core::Sink;
