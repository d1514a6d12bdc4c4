//! Engine Options
//!
//! Options are read when the engine initializes. Recognized keys are typed;
//! anything else is kept verbatim for application code to read back.

use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::value::Value;

fn default_autobind() -> bool {
    true
}

fn default_tick_interval_ms() -> u64 {
    1000
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Run discovery over the whole document on `init`.
    #[serde(default = "default_autobind")]
    pub autobind: bool,

    /// Interval of the periodic value source, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Unrecognized options.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            autobind: default_autobind(),
            tick_interval_ms: default_tick_interval_ms(),
            extra: IndexMap::new(),
        }
    }
}

impl Options {
    /// Parse options from a JSON object; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set one option by name.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            "autobind" => {
                self.autobind = value
                    .as_bool()
                    .ok_or_else(|| EngineError::invalid_option(name, "a boolean"))?;
            }
            "tick_interval_ms" => {
                self.tick_interval_ms = value
                    .as_u64()
                    .filter(|ms| *ms > 0)
                    .ok_or_else(|| EngineError::invalid_option(name, "a positive integer"))?;
            }
            _ => {
                self.extra.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    /// Read an option by name.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            "autobind" => Some(Value::Bool(self.autobind)),
            "tick_interval_ms" => Some(Value::from(self.tick_interval_ms)),
            _ => self.extra.get(name).cloned(),
        }
    }

    /// The periodic value source interval.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
