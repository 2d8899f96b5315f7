//! The actuator operator — performs a side effect on each data signal.

use crate::processor::{Outlet, Processor};
use async_trait::async_trait;
use serde_json::Value;
use synapse_core::{Signal, SignalError};

/// Processor backing the actuator (a.k.a. do) operator.
///
/// The callback's result is forwarded alongside the original payload under
/// the reserved result key, so downstream operators see both the input and
/// what the actuator produced.
pub struct ActProcessor<F> {
    act: F,
}

impl<F> ActProcessor<F>
where
    F: Fn(&Signal) -> Result<Value, SignalError> + Send + Sync,
{
    /// Wrap an action callback.
    pub fn new(act: F) -> Self {
        Self { act }
    }
}

#[async_trait]
impl<F> Processor for ActProcessor<F>
where
    F: Fn(&Signal) -> Result<Value, SignalError> + Send + Sync,
{
    async fn on_signal(&self, signal: Signal, outlet: &Outlet) -> Result<(), SignalError> {
        let result = (self.act)(&signal)?;
        outlet.send(signal.with_result(result));
        Ok(())
    }

    async fn on_error(&self, signal: Signal, outlet: &Outlet) -> Result<(), SignalError> {
        outlet.send(signal);
        Ok(())
    }
}
