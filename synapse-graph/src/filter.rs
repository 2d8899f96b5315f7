//! The filter operator — forwards a signal iff the predicate accepts it.

use crate::processor::{Outlet, Processor};
use async_trait::async_trait;
use synapse_core::{Signal, SignalError};

/// Processor backing the filter (a.k.a. when) operator.
pub struct FilterProcessor<F> {
    accept: F,
}

impl<F> FilterProcessor<F>
where
    F: Fn(&Signal) -> Result<bool, SignalError> + Send + Sync,
{
    /// Wrap an acceptance predicate.
    pub fn new(accept: F) -> Self {
        Self { accept }
    }
}

#[async_trait]
impl<F> Processor for FilterProcessor<F>
where
    F: Fn(&Signal) -> Result<bool, SignalError> + Send + Sync,
{
    async fn on_signal(&self, signal: Signal, outlet: &Outlet) -> Result<(), SignalError> {
        if (self.accept)(&signal)? {
            outlet.send(signal);
        }
        Ok(())
    }

    async fn on_error(&self, signal: Signal, outlet: &Outlet) -> Result<(), SignalError> {
        outlet.send(signal);
        Ok(())
    }
}
