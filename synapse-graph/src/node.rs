//! The node — identity, graph edges, observers, and the receive/send
//! entry points of the concurrent runtime.

use crate::actuator::ActProcessor;
use crate::endpoint::EndpointProcessor;
use crate::errors::ErrorHandlerProcessor;
use crate::filter::FilterProcessor;
use crate::flow::{FlowCallback, FlowFunc};
use crate::map::MapProcessor;
use crate::observer::{NodeEvent, Observer};
use crate::processor::{Entry, Processor};
use crate::runtime::runtime;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use synapse_core::{NodeId, ObserverError, Signal, SignalData, SignalError, SignalId};

/// The role a node plays in a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A plain node with a custom processor.
    Node,
    /// Emits signals from the external world.
    Sensor,
    /// Transforms signals (the map operator).
    Processor,
    /// Drops or passes signals.
    Filter,
    /// Performs a side effect and records its result.
    Actuator,
    /// Consumes or rethrows error signals.
    ErrorHandler,
    /// Pass-through entry point of a sub-graph.
    InputEndpoint,
    /// Pass-through exit point of a sub-graph.
    OutputEndpoint,
}

impl NodeKind {
    /// The short role tag used in metadata and traces.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Node => "node",
            NodeKind::Sensor => "sensor",
            NodeKind::Processor => "processor",
            NodeKind::Filter => "filter",
            NodeKind::Actuator => "actuator",
            NodeKind::ErrorHandler => "errorhandler",
            NodeKind::InputEndpoint => "endpoint.input",
            NodeKind::OutputEndpoint => "endpoint.output",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static NAME_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[A-Za-z0-9_-]+").expect("valid regex"));
static TAG_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"#[A-Za-z0-9_-]+").expect("valid regex"));
static ANY_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[@#][A-Za-z0-9_-]+").expect("valid regex"));
static LEADING_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+").expect("valid regex"));

/// Split a construction comment into `@name`, `#tag`s, and the residual
/// human label (leading whitespace stripped).
fn parse_comment(comment: &str) -> (String, Vec<String>, String) {
    let name = NAME_TOKEN
        .find(comment)
        .map(|m| m.as_str()[1..].to_owned())
        .unwrap_or_default();
    let tags = TAG_TOKEN
        .find_iter(comment)
        .map(|m| m.as_str()[1..].to_owned())
        .collect();
    let residue = ANY_TOKEN.replace_all(comment, "");
    let residue = LEADING_WHITESPACE.replace(&residue, "").into_owned();
    (name, tags, residue)
}

struct NodeInner {
    id: NodeId,
    name: String,
    namespace: String,
    comment: String,
    tags: Vec<String>,
    kind: RwLock<NodeKind>,
    meta: RwLock<HashMap<String, String>>,
    // Reverse edges are introspection-only; Weak keeps cyclic graphs
    // collectable.
    upstreams: RwLock<HashMap<NodeId, Weak<NodeInner>>>,
    downstreams: RwLock<HashMap<NodeId, Node>>,
    observers: RwLock<Vec<Arc<dyn Observer>>>,
    processor: Arc<dyn Processor>,
    flow_output: Mutex<Option<Arc<dyn Observer>>>,
    flow_funcs: Mutex<HashMap<NodeId, FlowFunc>>,
    signal_callbacks: Mutex<HashMap<SignalId, FlowCallback>>,
}

/// A vertex of a signal graph.
///
/// `Node` is a cheap handle: clones share the same underlying vertex, which
/// is what the edge maps, operator builders, and executor hand around.
///
/// Nothing prevents a cyclic graph (`a.to(b); b.to(a)` is accepted); a
/// signal entering a cycle is re-dispatched forever by the executor. Keep
/// graphs acyclic or break cycles with a filter.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

impl Node {
    /// Create a node from a construction comment, a namespace, and a
    /// processor.
    ///
    /// The comment grammar is `@name` (at most one), `#tag` (any number),
    /// with the rest kept as a human label. Without `@name` the node's name
    /// is its id. Metadata is seeded with the `namespace` key.
    pub fn create(
        comment: &str,
        namespace: impl Into<String>,
        processor: impl Processor + 'static,
    ) -> Self {
        let namespace = namespace.into();
        let (name, tags, residue) = parse_comment(comment);
        let mut meta = HashMap::new();
        meta.insert("namespace".to_owned(), namespace.clone());

        Self {
            inner: Arc::new(NodeInner {
                id: NodeId::generate(),
                name,
                namespace,
                comment: residue,
                tags,
                kind: RwLock::new(NodeKind::Node),
                meta: RwLock::new(meta),
                upstreams: RwLock::new(HashMap::new()),
                downstreams: RwLock::new(HashMap::new()),
                observers: RwLock::new(Vec::new()),
                processor: Arc::new(processor),
                flow_output: Mutex::new(None),
                flow_funcs: Mutex::new(HashMap::new()),
                signal_callbacks: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The node id.
    pub fn id(&self) -> &NodeId {
        &self.inner.id
    }

    /// The node's local name: the parsed `@name`, or the id when the
    /// comment carried none.
    pub fn name(&self) -> &str {
        if self.inner.name.is_empty() {
            self.inner.id.as_str()
        } else {
            &self.inner.name
        }
    }

    /// The dotted namespace prefix.
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// `namespace + "." + name`.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.inner.namespace, self.name())
    }

    /// The residual human label parsed from the construction comment.
    pub fn comment(&self) -> &str {
        &self.inner.comment
    }

    /// The role tag of this node.
    pub fn kind(&self) -> NodeKind {
        *self.inner.kind.read()
    }

    /// Stamp the role tag. Called by the operator builders and namespace
    /// factories; custom node assemblies may use it too.
    pub fn set_kind(&self, kind: NodeKind) {
        *self.inner.kind.write() = kind;
    }

    /// The `#tag`s parsed from the construction comment.
    pub fn tags(&self) -> &[String] {
        &self.inner.tags
    }

    /// Whether the construction comment carried the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.inner.tags.iter().any(|t| t == tag)
    }

    /// Attach a metadata pair, returning `self` for chaining.
    pub fn add_meta(&self, name: impl Into<String>, value: impl Into<String>) -> &Self {
        self.inner.meta.write().insert(name.into(), value.into());
        self
    }

    /// Snapshot of all metadata.
    pub fn meta(&self) -> HashMap<String, String> {
        self.inner.meta.read().clone()
    }

    /// Look up one metadata value.
    pub fn meta_value(&self, name: &str) -> Option<String> {
        self.inner.meta.read().get(name).cloned()
    }

    /// The processing strategy of this node.
    pub fn processor(&self) -> Arc<dyn Processor> {
        Arc::clone(&self.inner.processor)
    }

    /// Snapshot of the downstream edges, keyed by node id.
    pub fn downstreams(&self) -> HashMap<NodeId, Node> {
        self.inner.downstreams.read().clone()
    }

    /// Snapshot of the upstream edges still alive, keyed by node id.
    pub fn upstreams(&self) -> HashMap<NodeId, Node> {
        self.inner
            .upstreams
            .read()
            .iter()
            .filter_map(|(id, weak)| {
                weak.upgrade().map(|inner| (id.clone(), Node { inner }))
            })
            .collect()
    }

    /// Register a local observer. Local observers fire after the global
    /// ones, in registration order.
    pub fn observe(&self, observer: Arc<dyn Observer>) {
        self.inner.observers.write().push(observer);
    }

    /// Register a closure as a local observer.
    pub fn observe_fn<F>(&self, f: F)
    where
        F: Fn(&Node, &NodeEvent<'_>) -> Result<(), ObserverError> + Send + Sync + 'static,
    {
        self.observe(Arc::new(crate::observer::FnObserver::new(f)));
    }

    /// Snapshot of the local observers.
    pub fn observers(&self) -> Vec<Arc<dyn Observer>> {
        self.inner.observers.read().clone()
    }

    fn notify(&self, event: &NodeEvent<'_>) -> Result<(), ObserverError> {
        for observer in runtime().global_observers() {
            observer.on_event(self, event)?;
        }
        let locals = self.observers();
        for observer in locals {
            observer.on_event(self, event)?;
        }
        Ok(())
    }

    /// Push data into this node for processing.
    ///
    /// The data is wrapped into a [`Signal`] (an existing signal passes
    /// through unchanged), `onReceive` observers fire, and the processing
    /// step is handed to the executor on an independent task. Returns once
    /// the step is scheduled.
    ///
    /// Must be called from within a tokio runtime.
    pub fn push(&self, data: impl Into<SignalData>) -> Result<(), ObserverError> {
        let signal = Signal::new(data);
        self.notify(&NodeEvent::receive(&signal))?;

        let entry = if signal.is_error() {
            Entry::OnError
        } else {
            Entry::OnSignal
        };
        runtime().executor().schedule(entry, self.clone(), signal);
        Ok(())
    }

    /// Send data to every downstream of this node.
    ///
    /// `send` observers fire first; each downstream is then pushed on its
    /// own task. Siblings proceed concurrently with no ordering guarantee.
    /// Every downstream receives the same signal.
    pub fn send(&self, data: impl Into<SignalData>) -> Result<(), ObserverError> {
        let signal = Signal::new(data);
        self.notify(&NodeEvent::send(&signal))?;

        let downstreams: Vec<Node> = self.inner.downstreams.read().values().cloned().collect();
        for downstream in downstreams {
            let signal = signal.clone();
            tokio::spawn(async move {
                if let Err(error) = downstream.push(signal) {
                    tracing::error!(
                        node = %downstream.full_name(),
                        %error,
                        "push aborted by observer; signal dropped"
                    );
                }
            });
        }
        Ok(())
    }

    /// Connect this node to a downstream node, returning the downstream so
    /// chains compose.
    ///
    /// `to` observers fire with the downstream as extra data before the
    /// edge is recorded. Installing the same edge twice is idempotent. The
    /// comment labels the edge for humans; the runtime does not interpret
    /// it.
    pub fn to(&self, _comment: &str, next: &Node) -> Result<Node, ObserverError> {
        self.notify(&NodeEvent::link(next))?;

        self.inner
            .downstreams
            .write()
            .insert(next.id().clone(), next.clone());
        next.inner
            .upstreams
            .write()
            .insert(self.id().clone(), Arc::downgrade(&self.inner));

        Ok(next.clone())
    }

    fn chain(&self, comment: &str, node: Node, kind: NodeKind) -> Result<Node, ObserverError> {
        node.set_kind(kind);
        self.to(comment, &node)
    }

    /// Chain a map operator: `process` derives a new signal from each data
    /// signal.
    pub fn map<F>(&self, comment: &str, process: F) -> Result<Node, ObserverError>
    where
        F: Fn(&Signal) -> Result<Signal, SignalError> + Send + Sync + 'static,
    {
        let node = Node::create(comment, self.namespace(), MapProcessor::new(process));
        self.chain(comment, node, NodeKind::Processor)
    }

    /// Chain a filter operator: signals are forwarded iff `accept` returns
    /// true.
    pub fn when<F>(&self, comment: &str, accept: F) -> Result<Node, ObserverError>
    where
        F: Fn(&Signal) -> Result<bool, SignalError> + Send + Sync + 'static,
    {
        let node = Node::create(comment, self.namespace(), FilterProcessor::new(accept));
        self.chain(comment, node, NodeKind::Filter)
    }

    /// Alias of [`Node::when`].
    pub fn filter<F>(&self, comment: &str, accept: F) -> Result<Node, ObserverError>
    where
        F: Fn(&Signal) -> Result<bool, SignalError> + Send + Sync + 'static,
    {
        self.when(comment, accept)
    }

    /// Chain an actuator: `act` performs a side effect and its result is
    /// forwarded under the reserved result key.
    pub fn act<F>(&self, comment: &str, act: F) -> Result<Node, ObserverError>
    where
        F: Fn(&Signal) -> Result<Value, SignalError> + Send + Sync + 'static,
    {
        let node = Node::create(comment, self.namespace(), ActProcessor::new(act));
        self.chain(comment, node, NodeKind::Actuator)
    }

    /// Chain an error handler: the only operator that observes error
    /// signals. `handler` may rethrow through the outlet or swallow.
    pub fn errors<F>(&self, comment: &str, handler: F) -> Result<Node, ObserverError>
    where
        F: Fn(&Signal, &crate::processor::Outlet) -> Result<(), SignalError>
            + Send
            + Sync
            + 'static,
    {
        let node = Node::create(
            comment,
            self.namespace(),
            ErrorHandlerProcessor::new(handler),
        );
        self.chain(comment, node, NodeKind::ErrorHandler)
    }

    /// Chain a pass-through input endpoint.
    pub fn input(&self, comment: &str) -> Result<Node, ObserverError> {
        let node = Node::create(comment, self.namespace(), EndpointProcessor);
        self.chain(comment, node, NodeKind::InputEndpoint)
    }

    /// Chain a pass-through output endpoint.
    pub fn output(&self, comment: &str) -> Result<Node, ObserverError> {
        let node = Node::create(comment, self.namespace(), EndpointProcessor);
        self.chain(comment, node, NodeKind::OutputEndpoint)
    }

    /* Flow-bridge registries. Used by `flow`; public so alternative
     * bridges can reuse the same correlation slots. */

    /// The flow-output observer installed on this node, if any.
    pub fn flow_output_observer(&self) -> Option<Arc<dyn Observer>> {
        self.inner.flow_output.lock().clone()
    }

    /// Install the flow-output observer once. Returns false (without
    /// registering) when one is already installed.
    pub fn install_flow_output(&self, observer: Arc<dyn Observer>) -> bool {
        let mut slot = self.inner.flow_output.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(Arc::clone(&observer));
        drop(slot);
        self.observe(observer);
        true
    }

    /// Memoize a flow function keyed by its output node.
    pub fn add_flow_func(&self, output: NodeId, flow: FlowFunc) {
        self.inner.flow_funcs.lock().insert(output, flow);
    }

    /// Look up a memoized flow function by output node.
    pub fn flow_func(&self, output: &NodeId) -> Option<FlowFunc> {
        self.inner.flow_funcs.lock().get(output).cloned()
    }

    /// Register a completion callback for one signal id.
    pub fn add_signal_callback(&self, signal: SignalId, callback: FlowCallback) {
        self.inner.signal_callbacks.lock().insert(signal, callback);
    }

    /// Remove and return the completion callback for one signal id.
    pub fn take_signal_callback(&self, signal: &SignalId) -> Option<FlowCallback> {
        self.inner.signal_callbacks.lock().remove(signal)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.inner.id)
            .field("full_name", &self.full_name())
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}
