#![deny(missing_docs)]
//! # synapse — umbrella crate
//!
//! Provides a single import surface for synapse signal graphs. Re-exports
//! the envelope and runtime crates behind feature flags, plus a `prelude`
//! for the happy path.

#[cfg(feature = "core")]
pub use synapse_core;
#[cfg(feature = "core")]
pub use synapse_graph;
#[cfg(feature = "trace")]
pub use synapse_trace;

/// Happy-path imports for assembling signal graphs.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use synapse_core::{
        ANON_KEY, FromValue, NodeId, ObserverError, Payload, PayloadError, RESULT_KEY, Signal,
        SignalData, SignalError, SignalId,
    };

    #[cfg(feature = "core")]
    pub use synapse_graph::{
        Addon, Emitter, Entry, Executor, FlowFunc, Namespace, Node, NodeEvent, NodeKind, Observer,
        Outlet, Processor, Sensor, Stage, runtime, to_flow_func,
    };

    #[cfg(feature = "trace")]
    pub use synapse_trace::{TracingAddon, TracingObserver};
}
