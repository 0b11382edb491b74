//! Cross-run phone → name memory.
//!
//! The store is injected: the resolver reads it between a phone-map miss
//! and the positional/placeholder fallback, and writes every successful
//! resolution. Entries are only ever written, never required, so a no-op
//! implementation is always safe.

use std::collections::HashMap;

/// Key-value store of normalized phone number → resolved beneficiary name.
pub trait NameCache {
    fn get(&self, phone: &str) -> Option<String>;
    fn put(&mut self, phone: &str, name: &str);
}

/// Cache that remembers nothing.
#[derive(Debug, Default)]
pub struct NoCache;

impl NameCache for NoCache {
    fn get(&self, _phone: &str) -> Option<String> {
        None
    }

    fn put(&mut self, _phone: &str, _name: &str) {}
}

/// In-memory cache; last writer wins.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: HashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NameCache for MemoryCache {
    fn get(&self, phone: &str) -> Option<String> {
        self.entries.get(phone).cloned()
    }

    fn put(&mut self, phone: &str, name: &str) {
        self.entries.insert(phone.to_string(), name.to_string());
    }
}
