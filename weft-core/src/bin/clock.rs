//! Headless clock demo.
//!
//! Builds a small document, starts a shell and prints the rendered text
//! each time a batch is applied. Runs for the number of seconds given as the
//! first argument (default 3). Set `RUST_LOG=weft_core=debug` for engine logs.

use std::time::Duration;

use tokio::sync::mpsc::unbounded_channel;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use weft_core::bridge::ChannelBridge;
use weft_core::dom::Element;
use weft_core::{Engine, Shell, Value};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let seconds = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(3);

    let body = Element::new("body")
        .with_child(Element::new("h1").with_text("It is {time}"))
        .with_child(
            Element::new("p")
                .with_attribute("@class.late", "{late}")
                .with_text("{greeting}, {name}!"),
        );

    let (host_tx, mut host_rx) = unbounded_channel();
    let mut engine = Engine::new().with_bridge(ChannelBridge::new(host_tx));
    engine.set_filter("name", |v| Value::from(v.as_str().unwrap_or_default().to_uppercase()));

    let page = body.clone();
    engine.bind("update", move |_| {
        println!("{}", page.text_content());
        Ok(())
    });

    let mut shell = Shell::new(engine);

    tokio::spawn(async move {
        while let Some(message) = host_rx.recv().await {
            info!(?message, "host received");
        }
    });

    if let Err(err) = shell.start(&body) {
        eprintln!("startup failed: {err}");
        return;
    }

    let driver = shell.handle();
    tokio::spawn(async move {
        let greeting = weft_core::batch([
            ("greeting", Value::from("Hello")),
            ("name", Value::from("world")),
        ]);
        if let Err(err) = driver.update(greeting) {
            warn!(%err, "failed to post greeting");
        }
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        if let Err(err) = driver.set("late", true) {
            warn!(%err, "failed to post late flag");
        }
        if let Err(err) = driver.shutdown() {
            warn!(%err, "failed to post shutdown");
        }
    });

    shell.run().await;
    info!(classes = ?body.select("p")[0].classes(), "done");
}
