//! Bindings
//!
//! A binding ties a target (an element, a text node, an attribute or a class)
//! to a template. Binding produces a [`RenderFn`], which the
//! [`BindingRegistry`] indexes under every variable the template reads. When
//! a variable changes, the update dispatcher looks up its consumers here and
//! applies each one at most once per batch.
//!
//! Binding requests usually come from a [`SubtreeScanner`], which walks some
//! markup tree and reports `(target, property, format)` triples without
//! touching engine state.

mod registry;
mod render;

pub use registry::BindingRegistry;
pub use render::{
    Property, RenderAction, RenderFn, RenderId, RenderTarget, TargetRef, ATTRIBUTE_PREFIX,
    CLASS_PREFIX,
};

/// Property name used for text-node bindings.
pub const NODE_VALUE: &str = "nodeValue";

/// Property name used by `bind_content`.
pub const INNER_TEXT: &str = "innerText";

/// A request to bind `format` to `property` of `target`.
#[derive(Debug, Clone)]
pub struct BindRequest {
    pub target: TargetRef,
    pub property: String,
    pub format: String,
}

impl BindRequest {
    /// Create a bind request.
    pub fn new(target: TargetRef, property: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            target,
            property: property.into(),
            format: format.into(),
        }
    }
}

/// Discovers bindable content in a subtree.
///
/// Scanners only report requests; the engine performs the binding.
pub trait SubtreeScanner {
    /// Produce bind requests in document order.
    fn scan(&self) -> Vec<BindRequest>;
}

impl SubtreeScanner for Vec<BindRequest> {
    fn scan(&self) -> Vec<BindRequest> {
        self.clone()
    }
}
