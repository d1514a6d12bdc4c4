//! Data Store
//!
//! The authoritative mapping from key to current value. Only the update
//! dispatcher writes to it; keys are never removed.

use std::collections::HashMap;

use crate::value::{strict_eq, Value};

/// Key/value store backing all bindings.
#[derive(Debug, Default)]
pub struct DataStore {
    values: HashMap<String, Value>,
}

impl DataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value, or `None` if the key was never set.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Store `value` under `name` unless it is strictly equal to the current value.
    ///
    /// Returns whether the store changed.
    pub(crate) fn replace(&mut self, name: &str, value: &Value) -> bool {
        if strict_eq(self.values.get(name), value) {
            return false;
        }
        self.values.insert(name.to_string(), value.clone());
        true
    }

    /// Number of keys ever set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key was ever set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `name` has been set.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replace_reports_changes() {
        let mut store = DataStore::new();
        assert!(store.get("k").is_none());

        assert!(store.replace("k", &json!(1)));
        assert!(!store.replace("k", &json!(1)));
        assert!(store.replace("k", &json!(2)));
        assert_eq!(store.get("k"), Some(&json!(2)));
    }

    #[test]
    fn null_is_a_change_from_absent() {
        let mut store = DataStore::new();
        assert!(store.replace("k", &Value::Null));
        assert!(store.contains("k"));
        assert!(!store.replace("k", &Value::Null));
        assert_eq!(store.len(), 1);
    }
}
