//! Render Functions
//!
//! A render function is the unit of reactive output: it recomputes one piece
//! of content and writes it to one target. Rather than an opaque closure it
//! is a tagged value, so the registry can deduplicate by [`RenderId`] and
//! tests can inspect what was bound.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::template::{ClassCondition, Template};
use crate::value::{display, is_truthy, Value};

/// Prefix marking a class-toggle property.
pub const CLASS_PREFIX: &str = "@class.";

/// Prefix marking an attribute property.
pub const ATTRIBUTE_PREFIX: char = '@';

/// Unique identity of a render function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderId(u64);

impl RenderId {
    /// Generate a new unique render id.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for RenderId {
    fn default() -> Self {
        Self::new()
    }
}

/// Something a render function writes into.
///
/// Implemented by the headless tree in [`crate::dom`]; hosts with their own
/// node types implement it directly.
pub trait RenderTarget: Send + Sync + fmt::Debug {
    /// Assign a named content property, e.g. `innerText` or `nodeValue`.
    fn set_field(&self, field: &str, content: &str);

    /// Set an attribute.
    fn set_attribute(&self, name: &str, value: &str);

    /// Add or remove a class.
    fn toggle_class(&self, class: &str, present: bool);
}

/// Shared handle to a render target.
pub type TargetRef = Arc<dyn RenderTarget>;

/// The property a binding writes to, parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// A content property such as `innerText`.
    Field(String),
    /// `@name`: the attribute `name`.
    Attribute(String),
    /// `@class.name`: presence of class `name`.
    Class(String),
}

impl Property {
    /// Parse a property name.
    pub fn parse(name: &str) -> Self {
        if let Some(class) = name.strip_prefix(CLASS_PREFIX) {
            Self::Class(class.to_string())
        } else if let Some(attribute) = name.strip_prefix(ATTRIBUTE_PREFIX) {
            Self::Attribute(attribute.to_string())
        } else {
            Self::Field(name.to_string())
        }
    }
}

/// What a render function does when applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderAction {
    /// Substitute the template and assign it to a content property.
    Field { field: String, template: Template },
    /// Substitute the template and set it as an attribute.
    Attribute { name: String, template: Template },
    /// Toggle a class by the truthiness of one variable.
    Class { class: String, condition: ClassCondition },
}

impl RenderAction {
    /// Variable names this action reads.
    pub fn variables(&self) -> Vec<&str> {
        match self {
            Self::Field { template, .. } | Self::Attribute { template, .. } => {
                template.variables().collect()
            }
            Self::Class { condition, .. } => vec![condition.variable()],
        }
    }
}

/// A bound render function: one target plus one action.
pub struct RenderFn {
    id: RenderId,
    target: TargetRef,
    action: RenderAction,
}

impl RenderFn {
    /// Create a render function with a fresh identity.
    pub fn new(target: TargetRef, action: RenderAction) -> Self {
        Self {
            id: RenderId::new(),
            target,
            action,
        }
    }

    /// Identity of this render function.
    pub fn id(&self) -> RenderId {
        self.id
    }

    /// The action performed on apply.
    pub fn action(&self) -> &RenderAction {
        &self.action
    }

    /// The target written on apply.
    pub fn target(&self) -> &TargetRef {
        &self.target
    }

    /// Variable names this render function depends on.
    pub fn variables(&self) -> Vec<&str> {
        self.action.variables()
    }

    /// Recompute and write the content.
    ///
    /// `read` returns the filtered value of a variable.
    pub fn apply<R>(&self, read: R)
    where
        R: Fn(&str) -> Option<Value>,
    {
        match &self.action {
            RenderAction::Class { class, condition } => {
                let value = read(condition.variable());
                let present = condition.holds(is_truthy(value.as_ref()));
                self.target.toggle_class(class, present);
            }
            RenderAction::Attribute { name, template } => {
                let content = template.render(|var| display(read(var).as_ref()));
                self.target.set_attribute(name, &content);
            }
            RenderAction::Field { field, template } => {
                let content = template.render(|var| display(read(var).as_ref()));
                self.target.set_field(field, &content);
            }
        }
    }
}

impl fmt::Debug for RenderFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderFn")
            .field("id", &self.id)
            .field("action", &self.action)
            .finish()
    }
}
