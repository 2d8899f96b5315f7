//! The map operator — derives a new signal from each data signal.

use crate::processor::{Outlet, Processor};
use async_trait::async_trait;
use synapse_core::{Signal, SignalError};

/// Processor backing the map (a.k.a. processor) operator.
///
/// On the data path the user callback computes the next signal; a callback
/// error becomes an error signal downstream. Error signals pass through
/// untouched.
pub struct MapProcessor<F> {
    process: F,
}

impl<F> MapProcessor<F>
where
    F: Fn(&Signal) -> Result<Signal, SignalError> + Send + Sync,
{
    /// Wrap a transform callback.
    pub fn new(process: F) -> Self {
        Self { process }
    }
}

#[async_trait]
impl<F> Processor for MapProcessor<F>
where
    F: Fn(&Signal) -> Result<Signal, SignalError> + Send + Sync,
{
    async fn on_signal(&self, signal: Signal, outlet: &Outlet) -> Result<(), SignalError> {
        let next = (self.process)(&signal)?;
        outlet.send(next);
        Ok(())
    }

    async fn on_error(&self, signal: Signal, outlet: &Outlet) -> Result<(), SignalError> {
        outlet.send(signal);
        Ok(())
    }
}
