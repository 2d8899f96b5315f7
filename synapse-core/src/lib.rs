//! # synapse-core — signal envelope and payload protocol
//!
//! Foundation types for synapse graphs: the immutable-update [`Signal`]
//! envelope, the typed-payload conversion protocol, typed ids, and the error
//! vocabulary shared by the runtime crates.
//!
//! ## The envelope discipline
//!
//! Signals are values. Operators never mutate a signal in place — they
//! derive fresh ones (`derive`, `with`, `with_tag`, `with_error`, …), and
//! every derivation preserves the id assigned at creation. Correlation
//! machinery (the flow bridge in `synapse-graph`) depends on that
//! preservation; it is a contract, not an implementation detail.
//!
//! ## Dependency Notes
//!
//! Payloads are `serde_json::Value` maps. This is an intentional choice:
//! a signal graph is heterogeneous by nature, and `serde_json::Value` is the
//! de facto dynamic value in the Rust ecosystem. Typed access is recovered
//! at the edges through [`FromValue`] sinks and [`Signal::decode`].

#![deny(missing_docs)]

pub mod error;
pub mod id;
pub mod payload;
pub mod signal;

// Re-exports for convenience
pub use error::{ObserverError, PayloadError, SignalError};
pub use id::{NodeId, SignalId};
pub use payload::{FromValue, Payload};
pub use signal::{ANON_KEY, RESULT_KEY, Signal, SignalData};
