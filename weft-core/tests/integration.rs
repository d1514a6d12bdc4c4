//! Integration Tests for the Binding Engine
//!
//! These tests drive the engine through the headless tree, the way a host
//! view would: build markup, autobind it, then push values.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use serde_json::json;
use weft_core::binding::INNER_TEXT;
use weft_core::dom::{Element, Text};
use weft_core::{batch, Engine, Value};

fn counter() -> Arc<AtomicI32> {
    Arc::new(AtomicI32::new(0))
}

/// Test that setting the same value twice fires nothing the second time.
#[test]
fn repeated_value_is_a_noop() {
    let body = Element::new("body").with_child(Element::new("p").with_text("{k}"));
    let mut engine = Engine::new();
    engine.init(&body);

    let fired = counter();
    let fired_clone = fired.clone();
    engine.bind("update.k", move |_| {
        fired_clone.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    engine.set("k", "v").unwrap();
    let text = body.select("p")[0].text_nodes()[0].clone();
    text.set_value("tampered");

    engine.set("k", "v").unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    // No re-render happened, so the manual edit survives.
    assert_eq!(text.value(), "tampered");
}

/// Test that a template reading two changed keys renders once.
#[test]
fn template_with_two_keys_renders_once() {
    let text = Text::new("{a} and {b}");
    let history = Arc::new(parking_lot::Mutex::new(Vec::new()));

    let mut engine = Engine::new();
    engine.bind_property(text.as_target(), "nodeValue", "{a} and {b}");

    let history_clone = history.clone();
    let watched = text.clone();
    engine.bind("update", move |_| {
        history_clone.lock().push(watched.value());
        Ok(())
    });

    engine.update(batch([("a", 1), ("b", 2)])).unwrap();
    assert_eq!(text.value(), "1 and 2");
    assert_eq!(*history.lock(), vec!["1 and 2"]);
}

/// Test that keys nobody reads do not disturb bound content.
#[test]
fn unrelated_keys_leave_content_alone() {
    let body = Element::new("body").with_child(Element::new("p").with_text("b={b}"));
    let mut engine = Engine::new();
    engine.init(&body);
    engine.set("b", 1).unwrap();

    let text = body.select("p")[0].text_nodes()[0].clone();
    text.set_value("untouched");
    engine.set("a", 1).unwrap();

    assert_eq!(text.value(), "untouched");
}

/// Test that filters apply to display but not to raw reads.
#[test]
fn filters_shape_display_only() {
    let body = Element::new("body").with_child(Element::new("span").with_text("{x}"));
    let mut engine = Engine::new();
    engine.set_filter("x", |v| json!(v.as_i64().unwrap_or(0) * 2));
    engine.init(&body);

    engine.set("x", 5).unwrap();
    assert_eq!(engine.get("x", false), Some(json!(10)));
    assert_eq!(engine.get("x", true), Some(json!(5)));
    assert_eq!(body.text_content(), "10");
}

/// Test that a filter can supply a default for a key that was never set.
#[test]
fn filter_defaults_unset_key() {
    let body = Element::new("body").with_child(Element::new("p").with_text("Hi {name}"));
    let mut engine = Engine::new();
    engine.set_filter("name", |v| if v.is_null() { json!("guest") } else { v.clone() });
    engine.init(&body);

    assert_eq!(engine.get("name", false), Some(json!("guest")));
    assert_eq!(engine.get("name", true), None);
    assert_eq!(body.text_content(), "Hi guest");

    engine.set("name", "ada").unwrap();
    assert_eq!(body.text_content(), "Hi ada");
}

/// Test that a filter never masks a change in the raw value.
#[test]
fn change_detection_uses_raw_values() {
    let mut engine = Engine::new();
    engine.set_filter("x", |_| json!("constant"));

    assert_eq!(engine.set("x", 1).unwrap().len(), 1);
    assert_eq!(engine.set("x", 2).unwrap().len(), 1);
}

/// Test class toggles, plain and negated.
#[test]
fn class_toggles_follow_flag() {
    let on = Element::new("div").with_attribute("@class.active", "{flag}");
    let off = Element::new("div").with_attribute("@class.active", "!{flag}");
    let body = Element::new("body").with_child(on.clone()).with_child(off.clone());

    let mut engine = Engine::new();
    engine.init(&body);
    assert!(!on.has_class("active"));
    assert!(off.has_class("active"));

    engine.set("flag", true).unwrap();
    assert!(on.has_class("active"));
    assert!(!off.has_class("active"));

    engine.set("flag", "").unwrap();
    assert!(!on.has_class("active"));
    assert!(off.has_class("active"));
}

/// Test that bare variable names work as class conditions too.
#[test]
fn class_toggle_with_bare_name() {
    let el = Element::new("div").with_attribute("@class.hidden", "!visible");
    let body = Element::new("body").with_child(el.clone());

    let mut engine = Engine::new();
    engine.init(&body);
    assert!(el.has_class("hidden"));

    engine.set("visible", 1).unwrap();
    assert!(!el.has_class("hidden"));
}

/// Test that every occurrence of a token is substituted.
#[test]
fn every_occurrence_is_substituted() {
    let body = Element::new("body").with_child(Element::new("p").with_text("{x}-{x}"));
    let mut engine = Engine::new();
    engine.init(&body);

    engine.set("x", 7).unwrap();
    assert_eq!(body.text_content(), "7-7");
}

/// Test that static content renders once and is never revisited.
#[test]
fn static_content_is_never_rebound() {
    let target = Element::new("p");
    let mut engine = Engine::new();

    assert!(engine
        .bind_property(target.as_target(), INNER_TEXT, "Static text")
        .is_none());
    assert_eq!(target.text_content(), "Static text");

    engine.set("anything", 1).unwrap();
    assert!(engine.bindings().is_empty());
}

/// Test that the batch handler only sees keys that changed.
#[test]
fn batch_handler_payload_is_reduced() {
    let mut engine = Engine::new();
    engine.update(batch([("b", 1), ("c", 1)])).unwrap();

    let seen = Arc::new(parking_lot::Mutex::new(Value::Null));
    let seen_clone = seen.clone();
    engine.bind("update", move |payload| {
        *seen_clone.lock() = payload.clone();
        Ok(())
    });

    engine.update(batch([("a", 1), ("b", 1), ("c", 1)])).unwrap();
    assert_eq!(*seen.lock(), json!({"a": 1}));
}

/// Test attribute bindings and missing keys rendering as empty text.
#[test]
fn attribute_binding_with_missing_key() {
    let link = Element::new("a").with_attribute("@href", "/users/{id}{suffix}");
    let body = Element::new("body").with_child(link.clone());

    let mut engine = Engine::new();
    engine.init(&body);
    assert_eq!(link.attribute("href").as_deref(), Some("/users/"));

    engine.set("id", 42).unwrap();
    assert_eq!(link.attribute("href").as_deref(), Some("/users/42"));
}

/// Test that script and style text is never bound.
#[test]
fn opaque_elements_are_skipped() {
    let script = Element::new("script").with_text("let v = '{secret}';");
    let body = Element::new("body").with_child(script.clone());

    let mut engine = Engine::new();
    engine.init(&body);
    engine.set("secret", "leaked").unwrap();

    assert_eq!(script.text_content(), "let v = '{secret}';");
}

/// Test binding content on a selection.
#[test]
fn bind_content_on_selection() {
    let body = Element::new("body")
        .with_child(Element::new("li").with_class("item"))
        .with_child(Element::new("li").with_class("item"))
        .with_child(Element::new("li"));

    let mut engine = Engine::new();
    let targets = body.select(".item").iter().map(Element::as_target).collect::<Vec<_>>();
    let ids = engine.bind_content(targets, "#{n}");
    assert_eq!(ids.len(), 2);

    engine.set("n", 1).unwrap();
    assert_eq!(body.text_content(), "#1#1");
}

/// Test that autobinding a selection binds the selected elements themselves.
#[test]
fn autobind_on_selection() {
    let card = Element::new("div")
        .with_class("card")
        .with_attribute("@title", "{tip}")
        .with_text("Hi {name}");
    let outside = Element::new("p").with_text("{name}");
    let body = Element::new("body")
        .with_child(card.clone())
        .with_child(outside.clone());

    let mut engine = Engine::new();
    let cards = body.select(".card");
    assert_eq!(engine.autobind(&cards[..]).len(), 2);

    engine.update(batch([("tip", "hint"), ("name", "ada")])).unwrap();
    assert_eq!(card.attribute("title").as_deref(), Some("hint"));
    assert_eq!(card.text_content(), "Hi ada");
    assert_eq!(outside.text_content(), "{name}");
}
