//! The sensor operator — emits signals from the external world.

use crate::node::Node;
use crate::processor::{Outlet, Processor};
use async_trait::async_trait;
use std::sync::Arc;
use synapse_core::{Signal, SignalData, SignalError};

/// The options string passed to a watcher started at construction.
pub(crate) const DEFAULT_WATCH_OPTIONS: &str = "initiated";

/// A watcher callback: observes the external world and emits data into the
/// graph, any number of times. Runs on a blocking-capable task, so it may
/// block (poll a socket, sleep between samples) freely.
pub type WatchFn = dyn Fn(&str, &Emitter) + Send + Sync;

/// The emit port handed to a watcher. Each `emit` performs the sensor's
/// send, fanning out to its downstreams.
pub struct Emitter {
    node: Node,
}

impl Emitter {
    /// Emit data from the external world into the graph.
    pub fn emit(&self, data: impl Into<SignalData>) {
        if let Err(error) = self.node.send(data) {
            tracing::error!(
                node = %self.node.full_name(),
                %error,
                "emit aborted by observer; signal dropped"
            );
        }
    }
}

/// Processor backing the sensor operator.
///
/// Sensors are sources: signals pushed at them from upstream are dropped.
/// Error signals still pass through, so a sensor wired mid-graph does not
/// hide failures.
pub struct SensorProcessor;

#[async_trait]
impl Processor for SensorProcessor {
    async fn on_signal(&self, _signal: Signal, _outlet: &Outlet) -> Result<(), SignalError> {
        // sensors do not accept upstream data signals
        Ok(())
    }

    async fn on_error(&self, signal: Signal, outlet: &Outlet) -> Result<(), SignalError> {
        outlet.send(signal);
        Ok(())
    }
}

/// A sensor node together with its watcher.
///
/// Dereferences to [`Node`], so edges and operator chains hang off it
/// directly: `sensor.map("…", f)?`.
pub struct Sensor {
    node: Node,
    watch: Arc<WatchFn>,
}

impl Sensor {
    pub(crate) fn new(node: Node, watch: Arc<WatchFn>) -> Self {
        Self { node, watch }
    }

    /// The underlying graph node.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Start watching the external world with the given options.
    ///
    /// The watcher runs on its own blocking-capable task; each of its emits
    /// performs the sensor's send. Must be called from within a tokio
    /// runtime.
    pub fn watch(&self, options: &str) {
        let watch = Arc::clone(&self.watch);
        let emitter = Emitter {
            node: self.node.clone(),
        };
        let options = options.to_owned();
        tokio::task::spawn_blocking(move || watch(&options, &emitter));
    }
}

impl std::ops::Deref for Sensor {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}
