//! Typed ID wrappers for node and signal identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers prevent mixing up node ids and signal ids — both are
/// routing keys (edge maps, callback registries) and confusing them would
/// fail silently. They are just strings underneath; the runtime always
/// mints them itself, so `generate` is the only constructor.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Generate a fresh time-ordered ID (UUID v7).
            ///
            /// Time-ordering matters: downstream traces sorted by id read in
            /// creation order.
            pub fn generate() -> Self {
                Self(uuid::Uuid::now_v7().to_string())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_id!(NodeId, "Unique identifier for a node in a signal graph.");
typed_id!(SignalId, "Unique identifier for a signal envelope.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = SignalId::generate();
        let b = SignalId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_ids_are_time_ordered() {
        let earlier = NodeId::generate();
        // UUID v7 only orders across distinct timestamps.
        std::thread::sleep(std::time::Duration::from_millis(2));
        let later = NodeId::generate();
        assert!(earlier.as_str() < later.as_str());
    }
}
