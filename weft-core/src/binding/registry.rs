//! Binding Registry
//!
//! Index from variable name to the render functions that read it. The
//! registry owns every render function in creation order and never removes
//! one; there is no unbind.

use indexmap::{IndexMap, IndexSet};

use super::render::{RenderFn, RenderId};

/// Variable → render function index.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    renders: IndexMap<RenderId, RenderFn>,
    by_variable: IndexMap<String, IndexSet<RenderId>>,
}

impl BindingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a render function and subscribe it to every
    /// variable it reads.
    pub fn register(&mut self, render: RenderFn) -> RenderId {
        let id = render.id();
        let variables: Vec<String> = render.variables().into_iter().map(String::from).collect();
        self.renders.insert(id, render);
        for variable in variables {
            self.subscribe(&variable, id);
        }
        id
    }

    /// Subscribe `id` to `variable`.
    ///
    /// Returns `false` if it was already subscribed; the set keeps one entry.
    pub fn subscribe(&mut self, variable: &str, id: RenderId) -> bool {
        self.by_variable
            .entry(variable.to_string())
            .or_default()
            .insert(id)
    }

    /// Render functions subscribed to `variable`, in subscription order.
    pub fn consumers(&self, variable: &str) -> impl Iterator<Item = RenderId> + '_ {
        self.by_variable
            .get(variable)
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    /// Look up a render function.
    pub fn get(&self, id: RenderId) -> Option<&RenderFn> {
        self.renders.get(&id)
    }

    /// Number of registered render functions.
    pub fn len(&self) -> usize {
        self.renders.len()
    }

    /// Whether no render function is registered.
    pub fn is_empty(&self) -> bool {
        self.renders.is_empty()
    }

    /// Number of distinct variables with at least one consumer.
    pub fn variable_count(&self) -> usize {
        self.by_variable.len()
    }
}
