//! Filter Registry
//!
//! Filters are named, pure transforms applied when a value is read for
//! display. They never see change detection, which always compares raw
//! stored values.

use std::collections::HashMap;
use std::fmt;

use crate::value::Value;

/// A display-time value transform.
pub type Filter = Box<dyn Fn(&Value) -> Value + Send + Sync>;

/// Filters keyed by the variable name they apply to.
#[derive(Default)]
pub struct FilterRegistry {
    filters: HashMap<String, Filter>,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the filter for `name`.
    pub fn set<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Box::new(filter));
    }

    /// Apply the filter for `name` to `raw`, if one is registered.
    ///
    /// A registered filter always runs; an unset key reaches it as `null`,
    /// so a filter can supply a default.
    pub fn apply(&self, name: &str, raw: Option<&Value>) -> Option<Value> {
        match self.filters.get(name) {
            Some(filter) => Some(filter(raw.unwrap_or(&Value::Null))),
            None => raw.cloned(),
        }
    }

    /// Whether a filter is registered for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("names", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unregistered_filter_returns_raw() {
        let filters = FilterRegistry::new();
        assert_eq!(filters.apply("x", Some(&json!(5))), Some(json!(5)));
        assert_eq!(filters.apply("x", None), None);
    }

    #[test]
    fn registered_filter_sees_unset_key_as_null() {
        let mut filters = FilterRegistry::new();
        filters.set("name", |v| if v.is_null() { json!("guest") } else { v.clone() });

        assert_eq!(filters.apply("name", None), Some(json!("guest")));
        assert_eq!(filters.apply("name", Some(&json!("ada"))), Some(json!("ada")));
    }

    #[test]
    fn registered_filter_transforms() {
        let mut filters = FilterRegistry::new();
        filters.set("x", |v| json!(v.as_i64().unwrap_or(0) * 2));
        assert!(filters.contains("x"));
        assert_eq!(filters.apply("x", Some(&json!(5))), Some(json!(10)));
    }

    #[test]
    fn set_overwrites() {
        let mut filters = FilterRegistry::new();
        filters.set("x", |_| json!("first"));
        filters.set("x", |_| json!("second"));
        assert_eq!(filters.apply("x", Some(&json!(1))), Some(json!("second")));
    }
}
