//! Binding Engine
//!
//! [`Engine`] is the context object owning every piece of engine state: the
//! data store, the filter and binding registries, the event handler table,
//! the options and the optional host bridge. Each engine is independent, so
//! tests build a fresh one per case.
//!
//! All operations are synchronous and run to completion. The engine is the
//! only writer of its store, and only [`Engine::update`] writes to it.

mod dispatch;

use tracing::{debug, trace};

use crate::binding::{
    BindRequest, BindingRegistry, Property, RenderAction, RenderFn, RenderId, SubtreeScanner,
    TargetRef, INNER_TEXT,
};
use crate::bridge::{HostBridge, HostMessage};
use crate::error::{HandlerError, Result};
use crate::events::EventHandlers;
use crate::filter::FilterRegistry;
use crate::options::Options;
use crate::store::DataStore;
use crate::template::{ClassCondition, Template};
use crate::value::{batch, Batch, Value};

/// The reactive binding engine.
pub struct Engine {
    store: DataStore,
    filters: FilterRegistry,
    bindings: BindingRegistry,
    handlers: EventHandlers,
    options: Options,
    bridge: Option<Box<dyn HostBridge>>,
}

impl Engine {
    /// Create an engine with default options and no host bridge.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Create an engine with the given options.
    pub fn with_options(options: Options) -> Self {
        Self {
            store: DataStore::new(),
            filters: FilterRegistry::new(),
            bindings: BindingRegistry::new(),
            handlers: EventHandlers::new(),
            options,
            bridge: None,
        }
    }

    /// Attach a host bridge.
    pub fn with_bridge(mut self, bridge: impl HostBridge + 'static) -> Self {
        self.set_bridge(bridge);
        self
    }

    /// Attach or replace the host bridge.
    pub fn set_bridge(&mut self, bridge: impl HostBridge + 'static) {
        self.bridge = Some(Box::new(bridge));
    }

    /// Current options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Set an option. Takes effect at the next `init`.
    pub fn set_option(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.options.set(name, value.into())
    }

    /// Register or replace the display filter for `name`.
    pub fn set_filter<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.filters.set(name, filter);
    }

    /// Read a value, filtered unless `skip_filters` is set.
    pub fn get(&self, name: &str, skip_filters: bool) -> Option<Value> {
        if skip_filters {
            self.store.get(name).cloned()
        } else {
            self.get_value(name)
        }
    }

    /// Read a value through its filter.
    pub fn get_value(&self, name: &str) -> Option<Value> {
        self.filters.apply(name, self.store.get(name))
    }

    /// Set one key. Shorthand for a single-key [`Engine::update`].
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<Batch> {
        let name: String = name.into();
        let value: Value = value.into();
        self.update(batch([(name, value)]))
    }

    /// Append a handler for `event`.
    pub fn bind<F>(&mut self, event: impl Into<String>, handler: F)
    where
        F: Fn(&Value) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.handlers.bind(event, handler);
    }

    /// Invoke every handler bound to `event`.
    pub fn call_handlers(&self, event: &str, payload: &Value) -> Result<()> {
        self.handlers.call(event, payload)
    }

    /// Bind `format` to `property` of `target` and render it once.
    ///
    /// Returns the id of the registered render function, or `None` when the
    /// format references no variable and was rendered statically.
    pub fn bind_property(
        &mut self,
        target: TargetRef,
        property: &str,
        format: &str,
    ) -> Option<RenderId> {
        let action = match Property::parse(property) {
            Property::Class(class) => match ClassCondition::parse(format) {
                Some(condition) => RenderAction::Class { class, condition },
                None => {
                    trace!(property, format, "class toggle without variable");
                    target.toggle_class(&class, format.starts_with('!'));
                    return None;
                }
            },
            Property::Attribute(name) => RenderAction::Attribute {
                name,
                template: Template::compile(format),
            },
            Property::Field(field) => RenderAction::Field {
                field,
                template: Template::compile(format),
            },
        };

        let render = RenderFn::new(target, action);
        self.apply(&render);

        if render.variables().is_empty() {
            trace!(property, format, "static template rendered once");
            return None;
        }

        let id = self.bindings.register(render);
        debug!(?id, property, format, "bound template");
        Some(id)
    }

    /// Bind `format` as the text content of each target.
    pub fn bind_content<I>(&mut self, targets: I, format: &str) -> Vec<RenderId>
    where
        I: IntoIterator<Item = TargetRef>,
    {
        targets
            .into_iter()
            .filter_map(|target| self.bind_property(target, INNER_TEXT, format))
            .collect()
    }

    /// Bind everything `scanner` discovers. Returns the ids of reactive bindings.
    pub fn autobind<S>(&mut self, scanner: &S) -> Vec<RenderId>
    where
        S: SubtreeScanner + ?Sized,
    {
        let requests = scanner.scan();
        debug!(requests = requests.len(), "autobind");
        requests
            .into_iter()
            .filter_map(|BindRequest { target, property, format }| {
                self.bind_property(target, &property, &format)
            })
            .collect()
    }

    /// Initialize against a document root, running discovery if enabled.
    pub fn init<S>(&mut self, root: &S) -> Vec<RenderId>
    where
        S: SubtreeScanner + ?Sized,
    {
        if self.options.autobind {
            self.autobind(root)
        } else {
            debug!("autobind disabled");
            Vec::new()
        }
    }

    /// Send a payload to the host. Only strings, objects and lists are delivered.
    pub fn action(&self, payload: impl Into<Value>) {
        let Some(bridge) = &self.bridge else {
            trace!("no host bridge, action dropped");
            return;
        };

        match HostMessage::from_payload(payload.into()) {
            Some(message) => bridge.post(&message),
            None => trace!("unsupported action payload dropped"),
        }
    }

    /// Send a `log` action to the host.
    pub fn log(&self, message: impl Into<String>) {
        if let Some(bridge) = &self.bridge {
            bridge.post(&HostMessage::log(message));
        }
    }

    /// The binding registry.
    pub fn bindings(&self) -> &BindingRegistry {
        &self.bindings
    }

    /// The data store.
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    fn apply(&self, render: &RenderFn) {
        render.apply(|name| self.get_value(name));
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("store", &self.store)
            .field("bindings", &self.bindings.len())
            .field("handlers", &self.handlers)
            .field("options", &self.options)
            .field("bridge", &self.bridge.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::RenderTarget;
    use crate::bridge::ChannelBridge;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Slot {
        text: Mutex<String>,
        writes: Mutex<usize>,
        classes: Mutex<Vec<String>>,
    }

    impl RenderTarget for Slot {
        fn set_field(&self, _: &str, content: &str) {
            *self.text.lock() = content.to_string();
            *self.writes.lock() += 1;
        }

        fn set_attribute(&self, name: &str, value: &str) {
            *self.text.lock() = format!("{name}={value}");
            *self.writes.lock() += 1;
        }

        fn toggle_class(&self, class: &str, present: bool) {
            let mut classes = self.classes.lock();
            classes.retain(|c| c != class);
            if present {
                classes.push(class.to_string());
            }
        }
    }

    #[test]
    fn filter_isolation() {
        let mut engine = Engine::new();
        engine.set_filter("x", |v| json!(v.as_i64().unwrap_or(0) * 2));
        engine.set("x", 5).unwrap();

        assert_eq!(engine.get("x", false), Some(json!(10)));
        assert_eq!(engine.get("x", true), Some(json!(5)));
        assert_eq!(engine.get("missing", false), None);
    }

    #[test]
    fn bind_renders_immediately() {
        let mut engine = Engine::new();
        engine.set("name", "world").unwrap();

        let slot = Arc::new(Slot::default());
        let id = engine.bind_property(slot.clone(), INNER_TEXT, "Hello {name}{suffix}");

        assert!(id.is_some());
        assert_eq!(*slot.text.lock(), "Hello world");
        assert_eq!(engine.bindings().consumers("suffix").count(), 1);
    }

    #[test]
    fn static_template_is_not_registered() {
        let mut engine = Engine::new();
        let slot = Arc::new(Slot::default());

        assert!(engine.bind_property(slot.clone(), INNER_TEXT, "plain").is_none());
        assert!(engine.bindings().is_empty());
        assert_eq!(*slot.text.lock(), "plain");
    }

    #[test]
    fn class_toggle_without_variable() {
        let mut engine = Engine::new();
        let slot = Arc::new(Slot::default());

        assert!(engine.bind_property(slot.clone(), "@class.on", "!").is_none());
        assert_eq!(*slot.classes.lock(), vec!["on"]);
    }

    #[test]
    fn bind_content_binds_every_target() {
        let mut engine = Engine::new();
        let a = Arc::new(Slot::default());
        let b = Arc::new(Slot::default());

        let ids = engine.bind_content([a.clone() as TargetRef, b.clone() as TargetRef], "{n}");
        assert_eq!(ids.len(), 2);

        engine.set("n", 3).unwrap();
        assert_eq!(*a.text.lock(), "3");
        assert_eq!(*b.text.lock(), "3");
    }

    #[test]
    fn init_respects_autobind_option() {
        let slot: TargetRef = Arc::new(Slot::default());
        let requests = vec![BindRequest::new(slot, "@title", "{t}")];

        let mut engine = Engine::new();
        engine.set_option("autobind", false).unwrap();
        assert!(engine.init(&requests).is_empty());

        let mut engine = Engine::new();
        assert_eq!(engine.init(&requests).len(), 1);
    }

    #[test]
    fn actions_without_bridge_are_dropped() {
        let engine = Engine::new();
        engine.action("requestUpdate");
        engine.log("nobody listens");
    }

    #[test]
    fn actions_reach_the_bridge() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let engine = Engine::new().with_bridge(ChannelBridge::new(tx));

        engine.action("requestUpdate");
        engine.action(json!(42));
        engine.action(json!({"action": "open", "url": "about:blank"}));
        engine.action(Value::from(vec![json!("a")]));
        engine.log("hi");

        assert_eq!(rx.try_recv().unwrap(), HostMessage::Text("requestUpdate".into()));
        assert_eq!(rx.try_recv().unwrap().action(), Some("open"));
        assert_eq!(rx.try_recv().unwrap(), HostMessage::List(vec![json!("a")]));
        assert_eq!(rx.try_recv().unwrap(), HostMessage::log("hi"));
        assert!(rx.try_recv().is_err());
    }
}
