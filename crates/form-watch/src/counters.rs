//! Numeric counters backing usage logging.

use std::collections::HashMap;

pub const FORM_MOUNT_TIME: &str = "FORM_MOUNT_TIME";
pub const FORM_START: &str = "FORM_START";
pub const NUMBER_OF_SUBMITS: &str = "NUMBER_OF_SUBMITS";
pub const FAILED_ATTEMPTS: &str = "FAILED_ATTEMPTS";

/// String-keyed numeric store scoped to one form session.
pub trait CounterStore {
    /// Current value; missing keys read as 0.
    fn get(&self, key: &str) -> i64;
    fn set(&mut self, key: &str, value: i64);
}

/// In-memory [`CounterStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCounters {
    values: HashMap<String, i64>,
}

impl SessionCounters {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for SessionCounters {
    fn get(&self, key: &str) -> i64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    fn set(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }
}
