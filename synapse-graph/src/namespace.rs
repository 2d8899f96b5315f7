//! The namespace — factory scope stamping new nodes with a dotted prefix
//! and shared metadata.

use crate::actuator::ActProcessor;
use crate::endpoint::EndpointProcessor;
use crate::errors::ErrorHandlerProcessor;
use crate::filter::FilterProcessor;
use crate::map::MapProcessor;
use crate::node::{Node, NodeKind};
use crate::processor::Outlet;
use crate::sensor::{DEFAULT_WATCH_OPTIONS, Emitter, Sensor, SensorProcessor};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use synapse_core::{Signal, SignalError};

/// A factory scope for root nodes.
///
/// Every node created through a namespace inherits its dotted prefix and a
/// copy of its metadata. Nodes created through the operator chain builders
/// inherit the prefix only — factory metadata is not propagated along
/// edges.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    namespace: String,
    metadata: HashMap<String, String>,
}

impl Namespace {
    /// Create a namespace with a dotted prefix and shared metadata.
    pub fn new(namespace: impl Into<String>, metadata: HashMap<String, String>) -> Self {
        Self {
            namespace: namespace.into(),
            metadata,
        }
    }

    /// The dotted prefix.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The metadata copied into every node this namespace creates.
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    fn stamp(&self, node: &Node, kind: NodeKind) {
        for (name, value) in &self.metadata {
            node.add_meta(name.clone(), value.clone());
        }
        node.set_kind(kind);
    }

    /// Create a sensor node. The watcher starts immediately unless
    /// `defer_watch` is set, in which case call [`Sensor::watch`] later.
    pub fn sensor<F>(&self, comment: &str, watch: F, defer_watch: bool) -> Sensor
    where
        F: Fn(&str, &Emitter) + Send + Sync + 'static,
    {
        let node = Node::create(comment, &self.namespace, SensorProcessor);
        self.stamp(&node, NodeKind::Sensor);

        let sensor = Sensor::new(node, Arc::new(watch));
        if !defer_watch {
            sensor.watch(DEFAULT_WATCH_OPTIONS);
        }
        sensor
    }

    /// Create a filter node.
    pub fn filter<F>(&self, comment: &str, accept: F) -> Node
    where
        F: Fn(&Signal) -> Result<bool, SignalError> + Send + Sync + 'static,
    {
        let node = Node::create(comment, &self.namespace, FilterProcessor::new(accept));
        self.stamp(&node, NodeKind::Filter);
        node
    }

    /// Alias of [`Namespace::filter`].
    pub fn when<F>(&self, comment: &str, accept: F) -> Node
    where
        F: Fn(&Signal) -> Result<bool, SignalError> + Send + Sync + 'static,
    {
        self.filter(comment, accept)
    }

    /// Create a processor (map) node.
    pub fn processor<F>(&self, comment: &str, process: F) -> Node
    where
        F: Fn(&Signal) -> Result<Signal, SignalError> + Send + Sync + 'static,
    {
        let node = Node::create(comment, &self.namespace, MapProcessor::new(process));
        self.stamp(&node, NodeKind::Processor);
        node
    }

    /// Alias of [`Namespace::processor`].
    pub fn map<F>(&self, comment: &str, process: F) -> Node
    where
        F: Fn(&Signal) -> Result<Signal, SignalError> + Send + Sync + 'static,
    {
        self.processor(comment, process)
    }

    /// Create an actuator node.
    pub fn actuator<F>(&self, comment: &str, act: F) -> Node
    where
        F: Fn(&Signal) -> Result<Value, SignalError> + Send + Sync + 'static,
    {
        let node = Node::create(comment, &self.namespace, ActProcessor::new(act));
        self.stamp(&node, NodeKind::Actuator);
        node
    }

    /// Alias of [`Namespace::actuator`].
    pub fn act<F>(&self, comment: &str, act: F) -> Node
    where
        F: Fn(&Signal) -> Result<Value, SignalError> + Send + Sync + 'static,
    {
        self.actuator(comment, act)
    }

    /// Create an error-handler node.
    pub fn errors<F>(&self, comment: &str, handler: F) -> Node
    where
        F: Fn(&Signal, &Outlet) -> Result<(), SignalError> + Send + Sync + 'static,
    {
        let node = Node::create(
            comment,
            &self.namespace,
            ErrorHandlerProcessor::new(handler),
        );
        self.stamp(&node, NodeKind::ErrorHandler);
        node
    }

    /// Create an input endpoint node.
    pub fn input(&self, comment: &str) -> Node {
        let node = Node::create(comment, &self.namespace, EndpointProcessor);
        self.stamp(&node, NodeKind::InputEndpoint);
        node
    }

    /// Create an output endpoint node.
    pub fn output(&self, comment: &str) -> Node {
        let node = Node::create(comment, &self.namespace, EndpointProcessor);
        self.stamp(&node, NodeKind::OutputEndpoint);
        node
    }
}
