#![deny(missing_docs)]
//! Concrete [`Observer`] addon using the [`tracing`] crate.
//!
//! Emits structured `tracing` events for every node lifecycle point. Wire
//! to any `tracing`-compatible subscriber (`tracing-subscriber` for stdout,
//! `tracing-opentelemetry` for OpenTelemetry export).
//!
//! # Event levels
//!
//! | Event | Level |
//! |-------|-------|
//! | `synapse.node.receive`, `synapse.node.send` | `DEBUG` |
//! | `synapse.node.link` | `INFO` |
//!
//! Signal traffic is DEBUG because a busy graph emits two events per signal
//! per node; topology changes are rare and INFO.

use std::sync::Arc;
use synapse_core::ObserverError;
use synapse_graph::{Addon, Node, NodeEvent, Observer, Stage};

/// An [`Observer`] that emits structured [`tracing`] events.
///
/// Observes but never intervenes — always returns `Ok`.
///
/// # Example
///
/// ```no_run
/// use synapse_graph::runtime;
/// use synapse_trace::TracingAddon;
///
/// runtime().install(&TracingAddon::new());
/// ```
pub struct TracingObserver;

impl TracingObserver {
    /// Create a new `TracingObserver`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for TracingObserver {
    fn on_event(&self, node: &Node, event: &NodeEvent<'_>) -> Result<(), ObserverError> {
        match event.stage {
            Stage::OnReceive => {
                if let Some(signal) = event.signal {
                    tracing::debug!(
                        node = %node.full_name(),
                        kind = %node.kind(),
                        signal = %signal.id(),
                        is_error = signal.is_error(),
                        "synapse.node.receive"
                    );
                }
            }
            Stage::Send => {
                if let Some(signal) = event.signal {
                    tracing::debug!(
                        node = %node.full_name(),
                        kind = %node.kind(),
                        signal = %signal.id(),
                        is_error = signal.is_error(),
                        downstreams = node.downstreams().len(),
                        "synapse.node.send"
                    );
                }
            }
            Stage::To => {
                if let Some(downstream) = event.downstream {
                    tracing::info!(
                        from = %node.full_name(),
                        to = %downstream.full_name(),
                        kind = %downstream.kind(),
                        "synapse.node.link"
                    );
                }
            }
        }
        Ok(())
    }
}

/// Addon contributing a [`TracingObserver`] as a global observer.
pub struct TracingAddon;

impl TracingAddon {
    /// Create a new `TracingAddon`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingAddon {
    fn default() -> Self {
        Self::new()
    }
}

impl Addon for TracingAddon {
    fn observers(&self) -> Vec<Arc<dyn Observer>> {
        vec![Arc::new(TracingObserver::new())]
    }
}
