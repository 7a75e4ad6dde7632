//! Fixed-capacity, append-only name table shared by the module and sink registries
//!
//! Appends are serialized by the table-wide lock; each entry guards its own
//! mutable fields so the hot path never touches this lock except for name
//! lookups, which only take it shared.

use super::error::{LoggerError, RegistryKind, Result};
use parking_lot::RwLock;
use std::sync::Arc;

pub(crate) trait Named {
    fn name(&self) -> &str;
}

pub(crate) struct Registry<E> {
    kind: RegistryKind,
    capacity: usize,
    max_name_len: usize,
    entries: RwLock<Vec<Arc<E>>>,
}

impl<E: Named> Registry<E> {
    pub(crate) fn new(kind: RegistryKind, capacity: usize, max_name_len: usize) -> Self {
        Self {
            kind,
            capacity,
            max_name_len,
            entries: RwLock::new(Vec::with_capacity(capacity)),
        }
    }

    /// Validate `name`, then append the entry produced by `build`
    ///
    /// `build` runs with the table locked, after every check passed. If it
    /// fails, the table is left untouched.
    pub(crate) fn register_with<F>(&self, name: &str, build: F) -> Result<Arc<E>>
    where
        F: FnOnce() -> Result<Arc<E>>,
    {
        let mut entries = self.entries.write();
        self.validate_name(name)?;
        if entries.iter().any(|entry| entry.name() == name) {
            return Err(LoggerError::duplicate(self.kind, name));
        }
        if entries.len() >= self.capacity {
            return Err(LoggerError::registry_full(self.kind, self.capacity));
        }

        let entry = build()?;
        entries.push(Arc::clone(&entry));
        Ok(entry)
    }

    pub(crate) fn validate_name(&self, name: &str) -> Result<()> {
        if name.is_empty() || name.len() > self.max_name_len {
            return Err(LoggerError::name_invalid(self.kind, name, self.max_name_len));
        }
        Ok(())
    }

    pub(crate) fn find(&self, name: &str) -> Option<Arc<E>> {
        self.entries
            .read()
            .iter()
            .find(|entry| entry.name() == name)
            .cloned()
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<E>> {
        self.entries.read().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn clear(&self) {
        self.entries.write().clear();
    }
}
