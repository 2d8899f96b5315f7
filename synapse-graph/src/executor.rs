//! The executor — dispatches one processing step on an independent task.

use crate::node::Node;
use crate::processor::{Entry, Outlet};
use synapse_core::Signal;

/// Pluggable dispatcher for processing steps.
///
/// The executor isolates node code from the caller: `push` returns as soon
/// as the step is scheduled. Swappable process-wide through the runtime
/// registry, so instrumented or pooled executors can replace the default
/// without touching graph code.
pub trait Executor: Send + Sync {
    /// Dispatch the selected processor entry point for `signal` at `node`
    /// on an independent task.
    fn schedule(&self, entry: Entry, node: Node, signal: Signal);

    /// Start executing. A placeholder for executors that separate
    /// scheduling from running (thread pools, batching executors); the
    /// default executor runs steps as they are scheduled.
    fn execute(&self) {}
}

/// The default executor: one `tokio` task per processing step.
///
/// A processor error is converted into an error signal and forwarded
/// through the node's send, taking the error path at each downstream.
pub struct TokioExecutor;

impl TokioExecutor {
    /// Create the default executor.
    pub fn new() -> Self {
        Self
    }
}

impl Default for TokioExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for TokioExecutor {
    fn schedule(&self, entry: Entry, node: Node, signal: Signal) {
        tokio::spawn(async move {
            let outlet = Outlet::new(node.clone());
            let result = match entry {
                Entry::OnSignal => node.processor().on_signal(signal.clone(), &outlet).await,
                Entry::OnError => node.processor().on_error(signal.clone(), &outlet).await,
            };

            if let Err(error) = result {
                tracing::debug!(
                    node = %node.full_name(),
                    %error,
                    "processor failed; forwarding as error signal"
                );
                outlet.send(signal.with_error(error));
            }
        });
    }
}
