//! Runtime semantics of the node graph: edges, observers, error
//! propagation, flow correlation. Everything here runs against the default
//! tokio executor.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use synapse_core::{ANON_KEY, Signal, SignalError};
use synapse_graph::{Namespace, NodeKind, Stage, runtime, to_flow_func};
use tokio::sync::mpsc;

fn ns() -> Namespace {
    runtime().ns("com.synapse.test", HashMap::new())
}

async fn recv<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for signal")
        .expect("channel closed")
}

fn anon_i64(signal: &Signal) -> i64 {
    signal
        .value::<i64>(ANON_KEY)
        .expect("anon payload is numeric")
        .expect("anon payload present")
}

#[tokio::test(flavor = "multi_thread")]
async fn chained_maps_transform_in_topological_order() {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let input = ns().input("in");
    input
        .map("x2", |s| Ok(s.derive(anon_i64(s) * 2)))
        .unwrap()
        .map("+1", |s| Ok(s.derive(anon_i64(s) + 1)))
        .unwrap()
        .act("capture", move |s| {
            tx.send(anon_i64(s)).ok();
            Ok(Value::Null)
        })
        .unwrap();

    input.push(10).unwrap();
    assert_eq!(recv(&mut rx).await, 21);
}

#[tokio::test(flavor = "multi_thread")]
async fn actuator_result_rides_the_payload() {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let input = ns().input("in");
    input
        .act("greet", |s| Ok(Value::from(format!("hi {}", anon_i64(s)))))
        .unwrap()
        .act("capture", move |s| {
            let greeting = s.result().cloned();
            tx.send((anon_i64(s), greeting)).ok();
            Ok(Value::Null)
        })
        .unwrap();

    input.push(7).unwrap();
    let (value, greeting) = recv(&mut rx).await;
    assert_eq!(value, 7);
    assert_eq!(greeting, Some(Value::from("hi 7")));
}

#[tokio::test(flavor = "multi_thread")]
async fn filter_drops_rejected_signals() {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let input = ns().input("in");
    input
        .when("even", |s| Ok(anon_i64(s) % 2 == 0))
        .unwrap()
        .act("capture", move |s| {
            tx.send(anon_i64(s)).ok();
            Ok(Value::Null)
        })
        .unwrap();

    input.push(3).unwrap();
    input.push(4).unwrap();
    // Only the accepted signal arrives.
    assert_eq!(recv(&mut rx).await, 4);
    assert!(
        tokio::time::timeout(Duration::from_millis(200), rx.recv())
            .await
            .is_err()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn edges_are_idempotent_by_node_id() {
    let ns = ns();
    let a = ns.input("a");
    let b = ns.output("b");

    a.to("edge", &b).unwrap();
    a.to("edge again", &b).unwrap();

    assert_eq!(a.downstreams().len(), 1);
    assert_eq!(b.upstreams().len(), 1);
    assert!(a.downstreams().contains_key(b.id()));
}

#[tokio::test(flavor = "multi_thread")]
async fn local_observers_fire_in_registration_order() {
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let node = ns().input("watched");
    {
        let order = Arc::clone(&order);
        node.observe_fn(move |_, event| {
            if event.stage == Stage::OnReceive {
                order.lock().push("first");
            }
            Ok(())
        });
    }
    {
        let order = Arc::clone(&order);
        node.observe_fn(move |_, event| {
            if event.stage == Stage::OnReceive {
                order.lock().push("second");
            }
            Ok(())
        });
    }

    node.push(1).unwrap();
    assert_eq!(*order.lock(), vec!["first", "second"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn observer_error_aborts_the_push() {
    let node = ns().input("strict");
    node.observe_fn(|_, _| Err(synapse_core::ObserverError::Failed("nope".into())));

    assert!(node.push(1).is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn error_signals_pass_through_non_handler_processors_unchanged() {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let input = ns().input("in");
    input
        .map("x2", |s| Ok(s.derive(anon_i64(s) * 2)))
        .unwrap()
        .when("never", |_| Ok(false))
        .unwrap()
        .act("side-effect", |_| Ok(Value::Null))
        .unwrap()
        .errors("capture", move |s, _| {
            let message = s.error().map(|e| e.message.clone()).unwrap_or_default();
            tx.send((s.id().clone(), message)).ok();
            Ok(())
        })
        .unwrap();

    let failed = Signal::new(SignalError::new("boom"));
    let pushed_id = failed.id().clone();
    input.push(failed).unwrap();

    let (seen_id, message) = recv(&mut rx).await;
    assert_eq!(seen_id, pushed_id);
    assert_eq!(message, "boom");
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_callback_becomes_an_error_signal() {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let input = ns().input("in");
    input
        .map("explode", |_| Err(SignalError::new("exploded")))
        .unwrap()
        .errors("capture", move |s, _| {
            tx.send(s.error().map(|e| e.message.clone())).ok();
            Ok(())
        })
        .unwrap();

    input.push(1).unwrap();
    assert_eq!(recv(&mut rx).await, Some("exploded".to_owned()));
}

#[tokio::test(flavor = "multi_thread")]
async fn error_handler_rethrow_resumes_the_data_path() {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let input = ns().input("in");
    input
        .act("fail", |_| Err(SignalError::new("boom")))
        .unwrap()
        .errors("repair", |s, outlet| {
            outlet.send(s.without_error().derive(100));
            Ok(())
        })
        .unwrap()
        .act("capture", move |s| {
            tx.send((anon_i64(s), s.is_error())).ok();
            Ok(Value::Null)
        })
        .unwrap();

    input.push(1).unwrap();
    assert_eq!(recv(&mut rx).await, (100, false));
}

#[tokio::test(flavor = "multi_thread")]
async fn deferred_sensor_emits_once_watched() {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let sensor = ns().sensor(
        "ticker",
        |options, emitter| {
            emitter.emit(format!("seen {options}"));
        },
        true,
    );
    sensor
        .act("capture", move |s| {
            tx.send(s.value::<String>(ANON_KEY).unwrap()).ok();
            Ok(Value::Null)
        })
        .unwrap();

    sensor.watch("options-string");
    assert_eq!(recv(&mut rx).await, Some("seen options-string".to_owned()));
}

#[tokio::test(flavor = "multi_thread")]
async fn sensor_drops_upstream_data_signals() {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let ns = ns();
    let input = ns.input("in");
    let sensor = ns.sensor("quiet", |_, _| {}, true);
    input.to("into sensor", sensor.node()).unwrap();
    sensor
        .act("capture", move |s| {
            tx.send(anon_i64(s)).ok();
            Ok(Value::Null)
        })
        .unwrap();

    input.push(5).unwrap();
    assert!(
        tokio::time::timeout(Duration::from_millis(200), rx.recv())
            .await
            .is_err()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn namespace_factories_stamp_kind_and_metadata() {
    let mut metadata = HashMap::new();
    metadata.insert("owner".to_owned(), "platform".to_owned());
    let ns = runtime().ns("com.synapse.stamped", metadata);

    let node = ns.map("@doubler step", |s| Ok(s.clone()));
    assert_eq!(node.kind(), NodeKind::Processor);
    assert_eq!(node.namespace(), "com.synapse.stamped");
    assert_eq!(node.full_name(), "com.synapse.stamped.doubler");
    assert_eq!(node.meta_value("owner").as_deref(), Some("platform"));
    assert_eq!(
        node.meta_value("namespace").as_deref(),
        Some("com.synapse.stamped")
    );

    // Chained nodes inherit the prefix but not the factory metadata.
    let chained = node.act("next", |_| Ok(Value::Null)).unwrap();
    assert_eq!(chained.namespace(), "com.synapse.stamped");
    assert_eq!(chained.meta_value("owner"), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn flow_func_is_memoized_and_installs_one_observer() {
    let ns = ns();
    let input = ns.input("flow in");
    let output = ns.output("flow out");
    input.to("direct", &output).unwrap();

    let _first = to_flow_func(&input, &output);
    let _second = to_flow_func(&input, &output);

    assert_eq!(output.observers().len(), 1);
    assert!(input.flow_func(output.id()).is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn flow_call_correlates_response_to_request() {
    let ns = ns();
    let input = ns.input("flow in");
    let output = ns.output("flow out");
    input
        .map("x2", |s| Ok(s.derive(anon_i64(s) * 2)))
        .unwrap()
        .to("out", &output)
        .unwrap();

    let flow = to_flow_func(&input, &output);

    // Interleaved calls resolve by signal id, not arrival order.
    let (a, b) = tokio::join!(flow.call(10), flow.call(100));
    assert_eq!(a.unwrap()[ANON_KEY], Value::from(20));
    assert_eq!(b.unwrap()[ANON_KEY], Value::from(200));
}

#[tokio::test(flavor = "multi_thread")]
async fn flow_call_surfaces_domain_errors() {
    let ns = ns();
    let input = ns.input("flow in");
    let output = ns.output("flow out");
    input
        .act("fail", |_| Err(SignalError::new("downstream broke")))
        .unwrap()
        .to("out", &output)
        .unwrap();

    let flow = to_flow_func(&input, &output);
    let error = flow.call(1).await.unwrap_err();
    assert_eq!(error.message, "downstream broke");
}

#[tokio::test(flavor = "multi_thread")]
async fn flow_call_timeout_reclaims_dropped_signals() {
    let ns = ns();
    let input = ns.input("flow in");
    let output = ns.output("flow out");
    input
        .when("drop everything", |_| Ok(false))
        .unwrap()
        .to("out", &output)
        .unwrap();

    let flow = to_flow_func(&input, &output);
    let error = flow
        .call_timeout(1, Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(error.message.contains("timed out"));
}

#[tokio::test(flavor = "multi_thread")]
async fn flow_callback_variant_delivers_the_payload() {
    let ns = ns();
    let input = ns.input("flow in");
    let output = ns.output("flow out");
    input
        .map("+1", |s| Ok(s.derive(anon_i64(s) + 1)))
        .unwrap()
        .to("out", &output)
        .unwrap();

    let flow = to_flow_func(&input, &output);
    let (tx, mut rx) = mpsc::unbounded_channel();
    flow.call_with(41, move |result| {
        tx.send(result.map(|p| p[ANON_KEY].clone())).ok();
    })
    .unwrap();

    assert_eq!(recv(&mut rx).await.unwrap(), Value::from(42));
}
