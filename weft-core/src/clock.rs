//! Periodic Value Source
//!
//! The only self-driving input: on a fixed interval the clock posts
//! `{ "time": "<HH:MM:SS>" }` into the shell's queue. It never touches the
//! engine directly.

use std::time::Duration;

use chrono::Local;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::shell::ShellHandle;
use crate::value::{batch, Batch};

/// Key written by the clock.
pub const TIME_KEY: &str = "time";

/// Default time format (local wall-clock time).
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Wall-clock value source.
#[derive(Debug, Clone)]
pub struct Clock {
    interval: Duration,
    format: String,
}

impl Clock {
    /// Create a clock ticking every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }

    /// Use a custom `chrono` format string.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// The tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The batch for the current instant.
    pub fn tick(&self) -> Batch {
        let now = Local::now().format(&self.format).to_string();
        batch([(TIME_KEY, now)])
    }

    /// Post a tick into `queue` every interval until the queue closes.
    ///
    /// The first tick is posted one interval from now; callers seed the
    /// initial value themselves.
    pub fn spawn(self, queue: ShellHandle) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if queue.update(self.tick()).is_err() {
                    debug!("queue closed, clock stopped");
                    break;
                }
            }
        })
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
