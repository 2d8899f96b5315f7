//! The process-wide runtime registry: executor, global observers, and the
//! namespace factory.

use crate::executor::{Executor, TokioExecutor};
use crate::flow::FlowFunc;
use crate::namespace::Namespace;
use crate::node::Node;
use crate::observer::Observer;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// An external collaborator contributing global observers and a lifecycle.
///
/// Addons are pure consumers of the observer surface — a tracing exporter,
/// a topology inspector. Their observers fire on every node; any IO they
/// need happens on their own tasks, started from [`Addon::run`].
pub trait Addon: Send + Sync {
    /// The global observers this addon contributes.
    fn observers(&self) -> Vec<Arc<dyn Observer>>;

    /// Start the addon's background work, if any.
    fn run(&self) {}

    /// Stop the addon's background work, if any. Best-effort.
    fn stop(&self) {}
}

/// Process-wide holder for the active executor, the global observer list,
/// and the default namespace.
///
/// Initialized lazily at first use; there is no teardown. Executor and
/// observers are expected to be configured during startup, before signals
/// flow.
pub struct Runtime {
    executor: RwLock<Arc<dyn Executor>>,
    observers: RwLock<Vec<Arc<dyn Observer>>>,
    default_namespace: Namespace,
}

static RUNTIME: Lazy<Runtime> = Lazy::new(|| Runtime {
    executor: RwLock::new(Arc::new(TokioExecutor::new())),
    observers: RwLock::new(Vec::new()),
    default_namespace: Namespace::default(),
});

/// The process-wide runtime registry.
pub fn runtime() -> &'static Runtime {
    &RUNTIME
}

impl Runtime {
    /// Replace the active executor.
    pub fn set_executor(&self, executor: Arc<dyn Executor>) {
        *self.executor.write() = executor;
    }

    /// The active executor.
    pub fn executor(&self) -> Arc<dyn Executor> {
        Arc::clone(&self.executor.read())
    }

    /// Attach an addon: merge its observers into the global list, then
    /// start it.
    pub fn install(&self, addon: &dyn Addon) {
        self.observers.write().extend(addon.observers());
        addon.run();
    }

    /// Snapshot of the global observers, in installation order.
    pub fn global_observers(&self) -> Vec<Arc<dyn Observer>> {
        self.observers.read().clone()
    }

    /// Create a namespace with a dotted prefix and shared metadata.
    pub fn ns(&self, namespace: &str, metadata: HashMap<String, String>) -> Namespace {
        Namespace::new(namespace, metadata)
    }

    /// The root namespace (empty prefix, no metadata).
    pub fn default_ns(&self) -> &Namespace {
        &self.default_namespace
    }

    /// Convert an (input, output) node pair into a flow function. See
    /// [`crate::flow::to_flow_func`].
    pub fn to_flow_func(&self, input: &Node, output: &Node) -> FlowFunc {
        crate::flow::to_flow_func(input, output)
    }
}
