//! # synapse-graph — concurrent node runtime for signal graphs
//!
//! Assemble nodes into a directed graph and push data through it: each node
//! transforms its signal on an independent task and forwards the result to
//! its downstreams.
//!
//! ## The pieces
//!
//! | Piece | Types | What it does |
//! |-------|-------|--------------|
//! | Node | [`Node`], [`NodeKind`] | Identity, edges, receive/send entry points, operator chains |
//! | Processors | [`Processor`], six variants | Per-operator semantics on the data and error paths |
//! | Executor | [`Executor`], [`TokioExecutor`] | Dispatches each processing step on its own task |
//! | Observers | [`Observer`], [`NodeEvent`] | Read-only taps at `onReceive` / `send` / `to` |
//! | Namespace | [`Namespace`] | Factory scope stamping prefix + metadata |
//! | Flow bridge | [`FlowFunc`], [`to_flow_func`] | A sub-graph as one call/return contract |
//! | Runtime | [`runtime`], [`Addon`] | Process-wide executor, global observers |
//!
//! ## Error propagation
//!
//! Domain errors travel inside the envelope: a failing operator callback
//! turns its signal into an error signal, and every processor except the
//! dedicated error handler forwards error signals untouched. Placing
//! `errors("…", handler)` anywhere after a failing operator intercepts its
//! error; the handler can rethrow a repaired signal to resume the flow.
//!
//! ## Concurrency
//!
//! `push` returns once the processing step is scheduled; downstream fan-out
//! runs one task per sibling with no ordering between them. Two signals
//! pushed into the same node may be processed concurrently — there is no
//! per-node FIFO. Everything must run inside a tokio runtime.
//!
//! ## Example
//!
//! ```no_run
//! use synapse_graph::runtime;
//! use synapse_core::ANON_KEY;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let ns = runtime().ns("com.example", Default::default());
//! let input = ns.input("in");
//! let output = ns.output("out");
//!
//! input
//!     .map("x2", |s| {
//!         let v = s.value::<i64>(ANON_KEY)?.unwrap_or_default();
//!         Ok(s.derive(v * 2))
//!     })?
//!     .to("out", &output)?;
//!
//! let flow = synapse_graph::to_flow_func(&input, &output);
//! let payload = flow.call(21).await?;
//! assert_eq!(payload[ANON_KEY], serde_json::json!(42));
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod actuator;
pub mod endpoint;
pub mod errors;
pub mod executor;
pub mod filter;
pub mod flow;
pub mod map;
pub mod namespace;
pub mod node;
pub mod observer;
pub mod processor;
pub mod runtime;
pub mod sensor;

// Re-exports for convenience
pub use actuator::ActProcessor;
pub use endpoint::EndpointProcessor;
pub use errors::ErrorHandlerProcessor;
pub use executor::{Executor, TokioExecutor};
pub use filter::FilterProcessor;
pub use flow::{FLOW_DEST_TAG, FlowCallback, FlowFunc, to_flow_func};
pub use map::MapProcessor;
pub use namespace::Namespace;
pub use node::{Node, NodeKind};
pub use observer::{FnObserver, NodeEvent, Observer, Stage};
pub use processor::{Entry, Outlet, Processor};
pub use runtime::{Addon, Runtime, runtime};
pub use sensor::{Emitter, Sensor, SensorProcessor, WatchFn};
