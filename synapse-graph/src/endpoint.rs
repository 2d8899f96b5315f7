//! Endpoint operators — transparent entry and exit points of a sub-graph.

use crate::processor::{Outlet, Processor};
use async_trait::async_trait;
use synapse_core::{Signal, SignalError};

/// Processor backing the input and output endpoints. Forwards everything.
///
/// Endpoints carry no behavior of their own; they mark the boundary a flow
/// bridge attaches to.
pub struct EndpointProcessor;

#[async_trait]
impl Processor for EndpointProcessor {
    async fn on_signal(&self, signal: Signal, outlet: &Outlet) -> Result<(), SignalError> {
        outlet.send(signal);
        Ok(())
    }

    async fn on_error(&self, signal: Signal, outlet: &Outlet) -> Result<(), SignalError> {
        outlet.send(signal);
        Ok(())
    }
}
