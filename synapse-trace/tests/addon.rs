//! The tracing addon observes without intervening.

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use synapse_graph::runtime;
use synapse_trace::TracingAddon;
use tokio::sync::mpsc;

#[tokio::test(flavor = "multi_thread")]
async fn installed_addon_does_not_disturb_the_flow() {
    tracing_subscriber::fmt().with_test_writer().try_init().ok();
    runtime().install(&TracingAddon::new());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let input = runtime().ns("com.synapse.traced", HashMap::new()).input("in");
    input
        .map("pass", |s| Ok(s.clone()))
        .unwrap()
        .act("capture", move |s| {
            tx.send(s.payload().clone()).ok();
            Ok(Value::Null)
        })
        .unwrap();

    input.push(5).unwrap();
    let payload = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out")
        .expect("channel closed");
    assert_eq!(payload[synapse_core::ANON_KEY], Value::from(5));
}
