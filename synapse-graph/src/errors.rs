//! The error-handler operator — the one place error signals are observed.

use crate::processor::{Outlet, Processor};
use async_trait::async_trait;
use synapse_core::{Signal, SignalError};

/// Processor backing the error-handler operator.
///
/// Data signals pass through untouched. Error signals invoke the user
/// handler, which may rethrow a (usually derived) signal through the outlet
/// to resume the flow, or simply return to swallow the error.
pub struct ErrorHandlerProcessor<F> {
    handler: F,
}

impl<F> ErrorHandlerProcessor<F>
where
    F: Fn(&Signal, &Outlet) -> Result<(), SignalError> + Send + Sync,
{
    /// Wrap an error-handling callback.
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F> Processor for ErrorHandlerProcessor<F>
where
    F: Fn(&Signal, &Outlet) -> Result<(), SignalError> + Send + Sync,
{
    async fn on_signal(&self, signal: Signal, outlet: &Outlet) -> Result<(), SignalError> {
        outlet.send(signal);
        Ok(())
    }

    async fn on_error(&self, signal: Signal, outlet: &Outlet) -> Result<(), SignalError> {
        (self.handler)(&signal, outlet)
    }
}
