//! The processing contract every node variant implements.

use crate::node::Node;
use async_trait::async_trait;
use synapse_core::{Signal, SignalData, SignalError};

/// Which processor entry point the executor dispatches.
///
/// Chosen by the node at receive time: error signals take the error path,
/// everything else the data path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// The data path — [`Processor::on_signal`].
    OnSignal,
    /// The error path — [`Processor::on_error`].
    OnError,
}

/// A node's processing strategy.
///
/// Both entry points receive the signal and an [`Outlet`] to forward
/// through. A returned error is converted by the executor into an error
/// signal (`signal.with_error(err)`) and forwarded downstream — errors flow
/// along the same graph as data, so recovery can be placed declaratively
/// with an error-handler node.
///
/// Every built-in variant except the error handler forwards error signals
/// unchanged from `on_error`; that transparency is what lets an error
/// handler placed anywhere after a failing operator intercept its error.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Handle a data signal.
    async fn on_signal(&self, signal: Signal, outlet: &Outlet) -> Result<(), SignalError>;

    /// Handle an error signal.
    async fn on_error(&self, signal: Signal, outlet: &Outlet) -> Result<(), SignalError>;
}

/// The send port handed to a processor.
///
/// Forwards to the owning node's `send`. An observer veto at that point is
/// a programmer error; since the processor runs on a detached task with no
/// caller to surface it to, the outlet logs the veto and drops the signal.
#[derive(Clone)]
pub struct Outlet {
    node: Node,
}

impl Outlet {
    pub(crate) fn new(node: Node) -> Self {
        Self { node }
    }

    /// Forward data to the node's downstreams.
    pub fn send(&self, data: impl Into<SignalData>) {
        if let Err(error) = self.node.send(data) {
            tracing::error!(
                node = %self.node.full_name(),
                %error,
                "send aborted by observer; signal dropped"
            );
        }
    }
}
