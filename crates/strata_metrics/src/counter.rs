//! Named counters for tracking pipeline activity

use std::collections::BTreeMap;

/// Monotonic named counters (commands applied, entities created, ...).
///
/// Backed by a `BTreeMap` so reports come out in a stable order.
#[derive(Debug, Default)]
pub struct Counter {
    counters: BTreeMap<String, usize>,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            counters: BTreeMap::new(),
        }
    }

    pub fn increment(&mut self, name: &str, value: usize) {
        if let Some(slot) = self.counters.get_mut(name) {
            *slot += value;
        } else {
            self.counters.insert(name.to_owned(), value);
        }
    }

    pub fn set(&mut self, name: &str, value: usize) {
        self.counters.insert(name.to_owned(), value);
    }

    pub fn get(&self, name: &str) -> usize {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn reset_all(&mut self) {
        self.counters.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counters.iter().map(|(name, value)| (name.as_str(), *value))
    }
}
