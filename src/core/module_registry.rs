//! Module registry
//!
//! A module is a named source of records with its own threshold and enable
//! flag. Call sites check their module on every log call, so each entry has
//! its own lock and two threads logging to different modules never contend.

use super::error::{RegistryKind, Result};
use super::log_level::{Level, LogLevel};
use super::registry::{Named, Registry};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Outcome of checking a record's level against a module or sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Enabled and at or above the entry's own level
    Admit,
    /// Enabled, but the entry inherits: compare against the default level
    AdmitInherited,
    Reject,
}

impl Admission {
    /// Apply the default level to an inherited admission
    #[inline]
    pub fn admits(self, level: LogLevel, default: LogLevel) -> bool {
        match self {
            Admission::Admit => true,
            Admission::AdmitInherited => level >= default,
            Admission::Reject => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Threshold {
    pub(crate) level: Level,
    pub(crate) enabled: bool,
}

impl Threshold {
    #[inline]
    pub(crate) fn check(&self, level: LogLevel) -> Admission {
        if !self.enabled {
            return Admission::Reject;
        }
        match self.level {
            Level::Inherit => Admission::AdmitInherited,
            Level::Concrete(min) if level >= min => Admission::Admit,
            Level::Concrete(_) => Admission::Reject,
        }
    }
}

pub struct ModuleEntry {
    name: Arc<str>,
    threshold: RwLock<Threshold>,
}

impl ModuleEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub fn level(&self) -> Level {
        self.threshold.read().level
    }

    pub fn is_enabled(&self) -> bool {
        self.threshold.read().enabled
    }

    pub fn check(&self, level: LogLevel) -> Admission {
        self.threshold.read().check(level)
    }

    pub(crate) fn set_level(&self, level: Level) {
        self.threshold.write().level = level;
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.threshold.write().enabled = enabled;
    }
}

impl Named for ModuleEntry {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ModuleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let threshold = *self.threshold.read();
        f.debug_struct("ModuleEntry")
            .field("name", &self.name)
            .field("level", &threshold.level)
            .field("enabled", &threshold.enabled)
            .finish()
    }
}

/// Handle to a registered module, cheap to clone and valid for the logger's lifetime
#[derive(Debug, Clone)]
pub struct ModuleHandle(pub(crate) Arc<ModuleEntry>);

impl ModuleHandle {
    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn level(&self) -> Level {
        self.0.level()
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_enabled()
    }
}

impl PartialEq for ModuleHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ModuleHandle {}

pub struct ModuleRegistry {
    inner: Registry<ModuleEntry>,
}

impl ModuleRegistry {
    pub fn new(capacity: usize, max_name_len: usize) -> Self {
        Self {
            inner: Registry::new(RegistryKind::Module, capacity, max_name_len),
        }
    }

    pub fn register(&self, name: &str, level: Level, enabled: bool) -> Result<ModuleHandle> {
        self.inner
            .register_with(name, || {
                Ok(Arc::new(ModuleEntry {
                    name: Arc::from(name),
                    threshold: RwLock::new(Threshold { level, enabled }),
                }))
            })
            .map(ModuleHandle)
    }

    pub fn find(&self, name: &str) -> Option<ModuleHandle> {
        self.inner.find(name).map(ModuleHandle)
    }

    pub fn set_level(&self, handle: &ModuleHandle, level: Level) {
        handle.0.set_level(level);
    }

    pub fn set_enabled(&self, handle: &ModuleHandle, enabled: bool) {
        handle.0.set_enabled(enabled);
    }

    pub fn check(&self, handle: &ModuleHandle, level: LogLevel) -> Admission {
        handle.0.check(level)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn names(&self) -> Vec<String> {
        self.inner
            .snapshot()
            .iter()
            .map(|entry| entry.name().to_string())
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.inner.clear();
    }
}
