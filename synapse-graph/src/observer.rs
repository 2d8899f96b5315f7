//! The observer surface — read-only taps on every node's lifecycle.
//!
//! Observers fire at three points: when a node receives a signal, when it
//! sends one downstream, and when an edge is installed. Global observers
//! (contributed by addons through the runtime registry) fire before the
//! node's local observers; within each bucket, registration order is
//! honored. The first error aborts the remaining observers and the
//! operation that triggered them.

use crate::node::Node;
use synapse_core::{ObserverError, Signal};

/// Which lifecycle point an event was emitted at.
///
/// The wire names (`onReceive`, `send`, `to`) are stable — external
/// inspectors key on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// A signal arrived at the node, before scheduling.
    OnReceive,
    /// A signal is about to fan out to the node's downstreams.
    Send,
    /// A downstream edge is being installed.
    To,
}

impl Stage {
    /// The stable wire name of this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::OnReceive => "onReceive",
            Stage::Send => "send",
            Stage::To => "to",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an observer sees at a lifecycle point.
///
/// `signal` is present for [`Stage::OnReceive`] and [`Stage::Send`];
/// `downstream` only for [`Stage::To`].
#[derive(Debug, Clone, Copy)]
pub struct NodeEvent<'a> {
    /// The lifecycle point.
    pub stage: Stage,
    /// The signal being received or sent.
    pub signal: Option<&'a Signal>,
    /// The downstream node of the edge being installed.
    pub downstream: Option<&'a Node>,
}

impl<'a> NodeEvent<'a> {
    pub(crate) fn receive(signal: &'a Signal) -> Self {
        Self {
            stage: Stage::OnReceive,
            signal: Some(signal),
            downstream: None,
        }
    }

    pub(crate) fn send(signal: &'a Signal) -> Self {
        Self {
            stage: Stage::Send,
            signal: Some(signal),
            downstream: None,
        }
    }

    pub(crate) fn link(downstream: &'a Node) -> Self {
        Self {
            stage: Stage::To,
            signal: None,
            downstream: Some(downstream),
        }
    }
}

/// A tap invoked at every lifecycle event of a node.
///
/// Observers are read-only with respect to signals and must be total
/// functions; an error return is treated as a programmer error and aborts
/// the operation that fired the event. Observers run inline on the
/// triggering task — an implementation that needs to do IO should enqueue
/// and flush from its own task instead.
pub trait Observer: Send + Sync {
    /// Called at each lifecycle point of every node this observer watches.
    fn on_event(&self, node: &Node, event: &NodeEvent<'_>) -> Result<(), ObserverError>;
}

/// Adapter turning a closure into an [`Observer`].
pub struct FnObserver<F> {
    f: F,
}

impl<F> FnObserver<F>
where
    F: Fn(&Node, &NodeEvent<'_>) -> Result<(), ObserverError> + Send + Sync,
{
    /// Wrap a closure as an observer.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Observer for FnObserver<F>
where
    F: Fn(&Node, &NodeEvent<'_>) -> Result<(), ObserverError> + Send + Sync,
{
    fn on_event(&self, node: &Node, event: &NodeEvent<'_>) -> Result<(), ObserverError> {
        (self.f)(node, event)
    }
}
