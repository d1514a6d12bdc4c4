//! Event Handler Registry
//!
//! Named subscription lists. The dispatcher fires two kinds of events:
//!
//! - `update.<key>` once per changed key, before any re-render, with the new value;
//! - `update` once per batch, after all re-renders, with an object holding
//!   only the keys that changed.
//!
//! Handlers are appended and never removed.

use indexmap::IndexMap;
use std::fmt;

use crate::error::{EngineError, HandlerError, Result};
use crate::value::Value;

/// Name of the per-batch event.
pub const UPDATE_EVENT: &str = "update";

/// Name of the per-key event for `key`.
pub fn key_event(key: &str) -> String {
    format!("{UPDATE_EVENT}.{key}")
}

/// An event handler.
pub type Handler = Box<dyn Fn(&Value) -> Result<(), HandlerError> + Send + Sync>;

/// Event name → handlers in registration order.
#[derive(Default)]
pub struct EventHandlers {
    handlers: IndexMap<String, Vec<Handler>>,
}

impl EventHandlers {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for `event`.
    pub fn bind<F>(&mut self, event: impl Into<String>, handler: F)
    where
        F: Fn(&Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.handlers
            .entry(event.into())
            .or_default()
            .push(Box::new(handler));
    }

    /// Invoke every handler for `event` in registration order.
    ///
    /// The first failing handler stops the remaining ones.
    pub fn call(&self, event: &str, payload: &Value) -> Result<()> {
        let Some(handlers) = self.handlers.get(event) else {
            return Ok(());
        };

        for handler in handlers {
            handler(payload).map_err(|source| EngineError::handler(event, source))?;
        }
        Ok(())
    }

    /// Number of handlers bound to `event`.
    pub fn count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<_> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("EventHandlers").field("events", &counts).finish()
    }
}
