//! Host Bridge
//!
//! One-way, fire-and-forget messages to the environment hosting the view.
//! The engine works without a bridge; in that case every send is dropped.
//!
//! A message is a bare string, a list, or an object conventionally carrying
//! an `action` field: `{ "action": "log", "message": "..." }`.

use std::io::Write;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{trace, warn};

use crate::value::{Map, Value};

/// Action sent once the shell has finished starting up.
pub const REQUEST_UPDATE: &str = "requestUpdate";

/// Action name used by `log`.
pub const LOG_ACTION: &str = "log";

/// An outbound host message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostMessage {
    /// A bare action name.
    Text(String),
    /// A structured payload.
    Object(Map<String, Value>),
    /// A list payload, delivered as is.
    List(Vec<Value>),
}

impl HostMessage {
    /// Accept strings, objects and lists; scalars and empty strings are rejected.
    pub fn from_payload(payload: Value) -> Option<Self> {
        match payload {
            Value::String(s) if !s.is_empty() => Some(Self::Text(s)),
            Value::Object(map) => Some(Self::Object(map)),
            Value::Array(items) => Some(Self::List(items)),
            _ => None,
        }
    }

    /// `{ "action": "log", "message": message }`.
    pub fn log(message: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("action".into(), Value::String(LOG_ACTION.into()));
        map.insert("message".into(), Value::String(message.into()));
        Self::Object(map)
    }

    /// The action name, if any.
    pub fn action(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Object(map) => map.get("action").and_then(Value::as_str),
            Self::List(_) => None,
        }
    }
}

/// Outbound channel to a host environment.
///
/// Delivery is best effort; implementations log failures and move on.
pub trait HostBridge: Send + Sync {
    /// Deliver one message.
    fn post(&self, message: &HostMessage);
}

/// Bridge backed by a tokio unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelBridge {
    sender: UnboundedSender<HostMessage>,
}

impl ChannelBridge {
    /// Wrap a sender.
    pub fn new(sender: UnboundedSender<HostMessage>) -> Self {
        Self { sender }
    }
}

impl HostBridge for ChannelBridge {
    fn post(&self, message: &HostMessage) {
        if self.sender.send(message.clone()).is_err() {
            trace!(?message, "host channel closed, message dropped");
        }
    }
}

/// Bridge writing MessagePack-encoded messages to a byte sink, one value per message.
pub struct MsgPackBridge<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> MsgPackBridge<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> HostBridge for MsgPackBridge<W> {
    fn post(&self, message: &HostMessage) {
        let bytes = match rmp_serde::to_vec_named(message) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(%err, "failed to encode host message");
                return;
            }
        };

        let mut writer = self.writer.lock();
        if let Err(err) = writer.write_all(&bytes).and_then(|()| writer.flush()) {
            warn!(%err, "failed to write host message");
        }
    }
}
