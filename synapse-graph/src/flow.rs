//! The flow bridge — a sub-graph as a single call/return contract.
//!
//! [`to_flow_func`] turns an (input, output) node pair into a callable that
//! pushes a request into the input and resolves with the correlated
//! response leaving the output. Correlation rides on two mechanisms: a
//! routing tag naming the destination output, and the signal id, which
//! every derivation preserves.
//!
//! The id contract is on user code: operators between input and output must
//! derive signals (`derive`, `with*`) rather than create fresh ones with
//! `Signal::new` — a fresh id mid-chain orphans the response and the
//! registered callback waits forever. Prefer [`FlowFunc::call_timeout`]
//! when the chain can drop a signal (a filter, an error handler that
//! swallows), so abandoned correlations are reclaimed.

use crate::node::Node;
use crate::observer::{NodeEvent, Observer, Stage};
use std::sync::Arc;
use std::time::Duration;
use synapse_core::{ObserverError, Payload, Signal, SignalData, SignalError, SignalId};
use tokio::sync::oneshot;

/// Tag naming the output node a flow signal is destined for.
pub const FLOW_DEST_TAG: &str = "__to_node_dest__";

/// Completion callback invoked with the correlated response.
pub type FlowCallback = Box<dyn FnOnce(Result<Payload, SignalError>) + Send>;

/// Installed once on every flow output: resolves the per-signal callback
/// when a signal tagged for this output is sent.
struct FlowOutputObserver;

impl Observer for FlowOutputObserver {
    fn on_event(&self, node: &Node, event: &NodeEvent<'_>) -> Result<(), ObserverError> {
        if event.stage != Stage::Send {
            return Ok(());
        }
        let Some(signal) = event.signal else {
            return Ok(());
        };
        let Some(dest) = signal.tag(FLOW_DEST_TAG) else {
            return Ok(());
        };
        if dest != node.id().as_str() {
            return Ok(());
        }
        let Some(callback) = node.take_signal_callback(signal.id()) else {
            return Ok(());
        };

        match signal.error() {
            Some(error) => callback(Err(error.clone())),
            None => callback(Ok(signal.payload().clone())),
        }
        Ok(())
    }
}

/// A callable view of a sub-graph between an input and an output node.
///
/// Cheap to clone; clones share the same correlation registries. Repeated
/// [`to_flow_func`] calls for the same pair return the memoized instance.
#[derive(Clone)]
pub struct FlowFunc {
    input: Node,
    output: Node,
}

impl FlowFunc {
    /// Tag, register, push. Returns the signal id so callers can reclaim
    /// the callback slot.
    fn dispatch(
        &self,
        data: impl Into<SignalData>,
        callback: FlowCallback,
    ) -> Result<SignalId, ObserverError> {
        let signal = Signal::new(data).with_tag(FLOW_DEST_TAG, self.output.id().as_str());
        let id = signal.id().clone();

        self.output.add_signal_callback(id.clone(), callback);
        if let Err(error) = self.input.push(signal) {
            self.output.take_signal_callback(&id);
            return Err(error);
        }
        Ok(id)
    }

    /// Send a request and block (asynchronously) until the correlated
    /// response leaves the output node.
    ///
    /// Returns the response payload, or the domain error when the response
    /// is an error signal. If the chain drops the signal, this pends
    /// forever — see [`FlowFunc::call_timeout`].
    pub async fn call(&self, data: impl Into<SignalData>) -> Result<Payload, SignalError> {
        let (tx, rx) = oneshot::channel();
        self.dispatch(
            data,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        )
        .map_err(|error| SignalError::new(error.to_string()))?;

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(SignalError::new("flow output dropped before responding")),
        }
    }

    /// Like [`FlowFunc::call`], but gives up after `timeout`, reclaiming
    /// the callback slot so a dropped signal does not leak it.
    pub async fn call_timeout(
        &self,
        data: impl Into<SignalData>,
        timeout: Duration,
    ) -> Result<Payload, SignalError> {
        let (tx, rx) = oneshot::channel();
        let id = self
            .dispatch(
                data,
                Box::new(move |result| {
                    let _ = tx.send(result);
                }),
            )
            .map_err(|error| SignalError::new(error.to_string()))?;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(SignalError::new("flow output dropped before responding")),
            Err(_) => {
                self.output.take_signal_callback(&id);
                Err(SignalError::new(format!(
                    "flow response timed out after {timeout:?}"
                )))
            }
        }
    }

    /// Callback variant: send a request and invoke `done` with the
    /// correlated response, on whatever task the output's send runs on.
    pub fn call_with<F>(&self, data: impl Into<SignalData>, done: F) -> Result<(), ObserverError>
    where
        F: FnOnce(Result<Payload, SignalError>) + Send + 'static,
    {
        self.dispatch(data, Box::new(done)).map(|_| ())
    }
}

/// Convert an (input, output) node pair into a flow function.
///
/// The first call for a given output installs its flow-output observer; the
/// first call for a given pair memoizes the function on the input node.
pub fn to_flow_func(input: &Node, output: &Node) -> FlowFunc {
    output.install_flow_output(Arc::new(FlowOutputObserver));

    if let Some(existing) = input.flow_func(output.id()) {
        return existing;
    }

    let flow = FlowFunc {
        input: input.clone(),
        output: output.clone(),
    };
    input.add_flow_func(output.id().clone(), flow.clone());
    flow
}
