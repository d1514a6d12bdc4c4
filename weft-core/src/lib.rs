//! Weft Core
//!
//! This crate provides the core runtime for Weft, a reactive template
//! binding engine for lightweight markup views. It keeps a small key/value
//! store synchronized with visible content by re-evaluating `{variable}`
//! templates whenever the keys they reference change.
//!
//! It implements:
//!
//! - Template compilation and all-occurrence substitution
//! - A variable → render function index built as templates are bound
//! - The update dispatcher: equality-gated, deduplicated re-rendering
//! - Event handlers, display filters and a one-way host bridge
//! - A headless markup tree and a single-queue shell driving the engine
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `template`: token extraction and class-toggle conditions
//! - `binding`: render functions, the binding registry and discovery traits
//! - `engine`: the engine context object and the `update` dispatcher
//! - `dom`: a headless element/text tree that can be scanned and rendered into
//! - `shell`: the task queue, clock and startup sequence
//!
//! # Example
//!
//! ```rust
//! use weft_core::dom::Element;
//! use weft_core::Engine;
//!
//! let body = Element::new("body")
//!     .with_child(Element::new("p").with_text("{count} items"));
//!
//! let mut engine = Engine::new();
//! engine.init(&body);
//!
//! engine.set("count", 3).unwrap();
//! assert_eq!(body.text_content(), "3 items");
//! ```

pub mod binding;
pub mod bridge;
pub mod clock;
pub mod dom;
pub mod engine;
pub mod error;
pub mod events;
pub mod filter;
pub mod options;
pub mod shell;
pub mod store;
pub mod template;
pub mod value;

pub use binding::{BindRequest, RenderId, RenderTarget, SubtreeScanner, TargetRef};
pub use bridge::{HostBridge, HostMessage};
pub use engine::Engine;
pub use error::{EngineError, HandlerError, Result};
pub use options::Options;
pub use shell::{Shell, ShellHandle, Task};
pub use value::{batch, Batch, Value};
