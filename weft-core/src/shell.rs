//! Shell
//!
//! The shell turns every input into a task on one queue and applies tasks
//! one at a time, so no two dispatcher runs ever interleave. Inputs come
//! from three places: the clock, the host (through a [`ShellHandle`]), and
//! application code holding the shell itself.
//!
//! # Startup
//!
//! [`Shell::start`] runs the initialization sequence:
//!
//! 1. engine init (discovery over the document when `autobind` is on);
//! 2. seed the store with a first clock value;
//! 3. start the clock;
//! 4. send `requestUpdate` to the host.
//!
//! [`Shell::run`] then drains the queue until a [`Task::Shutdown`] arrives.
//! A task that fails is logged and skipped; later tasks still run.

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::binding::SubtreeScanner;
use crate::bridge::REQUEST_UPDATE;
use crate::clock::Clock;
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::value::{batch, Batch, Value};

/// A unit of work for the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Apply a batch.
    Update(Batch),
    /// Set one key.
    Set(String, Value),
    /// Send a payload to the host.
    Action(Value),
    /// Stop `run`.
    Shutdown,
}

/// Cloneable sender into a shell's queue.
#[derive(Debug, Clone)]
pub struct ShellHandle {
    sender: UnboundedSender<Task>,
}

impl ShellHandle {
    /// Create a handle and the receiving end of its queue.
    pub fn channel() -> (Self, UnboundedReceiver<Task>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Post a task.
    pub fn post(&self, task: Task) -> Result<()> {
        self.sender.send(task).map_err(|_| EngineError::QueueClosed)
    }

    /// Post a batch.
    pub fn update(&self, batch: Batch) -> Result<()> {
        self.post(Task::Update(batch))
    }

    /// Post a single-key update.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        self.post(Task::Set(name.into(), value.into()))
    }

    /// Post a host action.
    pub fn action(&self, payload: impl Into<Value>) -> Result<()> {
        self.post(Task::Action(payload.into()))
    }

    /// Ask the shell to stop.
    pub fn shutdown(&self) -> Result<()> {
        self.post(Task::Shutdown)
    }
}

/// Owner of an engine and its task queue.
pub struct Shell {
    engine: Engine,
    clock: Clock,
    handle: ShellHandle,
    receiver: UnboundedReceiver<Task>,
    ticker: Option<JoinHandle<()>>,
}

impl Shell {
    /// Wrap an engine. The clock interval comes from the engine's options.
    pub fn new(engine: Engine) -> Self {
        let clock = Clock::new(engine.options().tick_interval());
        let (handle, receiver) = ShellHandle::channel();
        Self {
            engine,
            clock,
            handle,
            receiver,
            ticker: None,
        }
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// A handle for posting tasks.
    pub fn handle(&self) -> ShellHandle {
        self.handle.clone()
    }

    /// The engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The engine, mutably; for binding and registering handlers.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Run the initialization sequence against a document root.
    ///
    /// The clock only starts when called inside a tokio runtime.
    pub fn start<S>(&mut self, root: &S) -> Result<()>
    where
        S: SubtreeScanner + ?Sized,
    {
        let bound = self.engine.init(root);
        info!(bindings = bound.len(), "engine initialized");

        self.engine.update(self.clock.tick())?;

        match tokio::runtime::Handle::try_current() {
            Ok(_) => {
                if let Some(previous) = self.ticker.take() {
                    previous.abort();
                }
                self.ticker = Some(self.clock.clone().spawn(self.handle()));
            }
            Err(_) => warn!("no tokio runtime, clock not started"),
        }

        self.engine.action(REQUEST_UPDATE);
        Ok(())
    }

    /// Apply one task.
    pub fn apply(&mut self, task: Task) -> Result<()> {
        match task {
            Task::Update(batch) => self.engine.update(batch).map(drop),
            Task::Set(name, value) => self.engine.update(batch([(name, value)])).map(drop),
            Task::Action(payload) => {
                self.engine.action(payload);
                Ok(())
            }
            Task::Shutdown => Ok(()),
        }
    }

    /// Apply every task already queued, without waiting. Returns how many ran.
    ///
    /// Stops early at a `Shutdown` task, which also stops the clock.
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            if task == Task::Shutdown {
                debug!("shutdown requested");
                self.stop_clock();
                break;
            }
            self.apply_logged(task);
            ran += 1;
        }
        ran
    }

    /// Apply tasks as they arrive until a `Shutdown` task.
    pub async fn run(&mut self) {
        while let Some(task) = self.receiver.recv().await {
            if task == Task::Shutdown {
                debug!("shutdown requested");
                break;
            }
            self.apply_logged(task);
        }
        self.stop_clock();
    }

    /// Whether the clock task is running.
    pub fn is_clock_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|ticker| !ticker.is_finished())
    }

    fn apply_logged(&mut self, task: Task) {
        if let Err(err) = self.apply(task) {
            error!(%err, "task failed");
        }
    }

    fn stop_clock(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.stop_clock();
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("engine", &self.engine)
            .field("clock", &self.clock)
            .field("running", &self.ticker.is_some())
            .finish()
    }
}
