//! The signal envelope — the value that moves through a graph.
//!
//! A [`Signal`] is an immutable-update value: every operation that "changes"
//! a signal returns a fresh one and leaves the receiver untouched. The id is
//! assigned once, when the signal is created from raw data, and preserved by
//! every derivation — this is the property that lets a flow bridge correlate
//! the envelope leaving an output node with the one that entered the input.

use crate::error::{PayloadError, SignalError};
use crate::id::SignalId;
use crate::payload::{FromValue, Payload};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Payload key holding the single unnamed value of a scalar push.
pub const ANON_KEY: &str = "__anon__";

/// Payload key holding an actuator's auxiliary output.
pub const RESULT_KEY: &str = "__result__";

/// Raw data accepted wherever a signal can be created or derived.
///
/// Classification happens here, once: a map becomes the payload, an error
/// becomes an error signal, an existing signal passes through unchanged,
/// and any other value is wrapped under [`ANON_KEY`].
#[derive(Debug, Clone)]
pub enum SignalData {
    /// A named payload map.
    Map(Payload),
    /// A single unnamed value.
    Value(Value),
    /// A domain error.
    Error(SignalError),
    /// An existing signal, passed through as-is.
    Signal(Signal),
}

impl From<Payload> for SignalData {
    fn from(payload: Payload) -> Self {
        SignalData::Map(payload)
    }
}

impl From<Value> for SignalData {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => SignalData::Map(map),
            other => SignalData::Value(other),
        }
    }
}

impl From<SignalError> for SignalData {
    fn from(error: SignalError) -> Self {
        SignalData::Error(error)
    }
}

impl From<Signal> for SignalData {
    fn from(signal: Signal) -> Self {
        SignalData::Signal(signal)
    }
}

macro_rules! scalar_data {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for SignalData {
                fn from(value: $ty) -> Self {
                    SignalData::Value(Value::from(value))
                }
            }
        )+
    };
}

scalar_data!(bool, i32, i64, u32, u64, f64, &str, String);

/// The envelope delivering data through a graph.
///
/// Serialization uses the stable wire casing (`ID`, `Seq`, `Error`, `End`,
/// `Payload`, `Tags`) that external inspectors expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "ID")]
    id: SignalId,
    /// Alias of the id, kept as a stored field for wire compatibility.
    #[serde(rename = "Seq")]
    seq: SignalId,
    #[serde(rename = "Error")]
    error: Option<SignalError>,
    /// Reserved terminator flag. Carried but consumed by no operator.
    #[serde(rename = "End")]
    end: bool,
    #[serde(rename = "Payload")]
    payload: Payload,
    #[serde(rename = "Tags")]
    tags: HashMap<String, String>,
}

impl Signal {
    /// Create a signal from raw data, assigning a fresh time-ordered id.
    ///
    /// Passing an existing [`Signal`] returns it unchanged — its id is NOT
    /// reassigned.
    pub fn new(data: impl Into<SignalData>) -> Self {
        match data.into() {
            SignalData::Signal(signal) => signal,
            SignalData::Map(payload) => Self::assemble(payload, None),
            SignalData::Error(error) => Self::assemble(Payload::new(), Some(error)),
            SignalData::Value(value) => {
                let mut payload = Payload::new();
                payload.insert(ANON_KEY.to_owned(), value);
                Self::assemble(payload, None)
            }
        }
    }

    fn assemble(payload: Payload, error: Option<SignalError>) -> Self {
        let id = SignalId::generate();
        Self {
            seq: id.clone(),
            id,
            error,
            end: false,
            payload,
            tags: HashMap::new(),
        }
    }

    /// Derive a new signal from this one, keeping id, seq, end, and tags.
    ///
    /// The payload is classified from `data` exactly as in [`Signal::new`].
    /// The receiver's error carries over unless the derivation itself is an
    /// error. Deriving from a [`Signal`] returns that signal. To derive with
    /// the receiver's payload intact, use `clone()`.
    pub fn derive(&self, data: impl Into<SignalData>) -> Self {
        let (payload, error) = match data.into() {
            SignalData::Signal(signal) => return signal,
            SignalData::Map(payload) => (payload, self.error.clone()),
            SignalData::Error(error) => (Payload::new(), Some(error)),
            SignalData::Value(value) => {
                let mut payload = Payload::new();
                payload.insert(ANON_KEY.to_owned(), value);
                (payload, self.error.clone())
            }
        };

        Self {
            id: self.id.clone(),
            seq: self.seq.clone(),
            error,
            end: self.end,
            payload,
            tags: self.tags.clone(),
        }
    }

    /// The stable signal id.
    pub fn id(&self) -> &SignalId {
        &self.id
    }

    /// Alias of [`Signal::id`].
    pub fn seq(&self) -> &SignalId {
        &self.seq
    }

    /// The domain error, when this is an error signal.
    pub fn error(&self) -> Option<&SignalError> {
        self.error.as_ref()
    }

    /// Whether this signal takes the error path at each node.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The reserved terminator flag.
    pub fn end(&self) -> bool {
        self.end
    }

    /// The payload map.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The tag map.
    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    /// Look up a raw payload value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Typed payload read through a [`FromValue`] sink.
    ///
    /// Returns `Ok(None)` when the key is absent; a present value that fails
    /// to coerce is an error.
    pub fn value<T: FromValue>(&self, key: &str) -> Result<Option<T>, PayloadError> {
        match self.payload.get(key) {
            None => Ok(None),
            Some(raw) => T::from_value(raw).map(Some),
        }
    }

    /// Structured payload read for plain `serde` types.
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PayloadError> {
        match self.payload.get(key) {
            None => Ok(None),
            Some(raw) => serde_json::from_value(raw.clone())
                .map(Some)
                .map_err(PayloadError::from),
        }
    }

    /// Return a fresh signal whose payload equals this one's plus the pair.
    pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut payload = self.payload.clone();
        payload.insert(key.into(), value.into());
        self.derive(payload)
    }

    /// Store an actuator's auxiliary output under [`RESULT_KEY`].
    pub fn with_result(&self, result: impl Into<Value>) -> Self {
        self.with(RESULT_KEY, result)
    }

    /// Read the auxiliary output stored by [`Signal::with_result`].
    pub fn result(&self) -> Option<&Value> {
        self.get(RESULT_KEY)
    }

    /// Return a fresh error signal. The payload is left untouched.
    pub fn with_error(&self, error: impl Into<SignalError>) -> Self {
        let mut next = self.clone();
        next.error = Some(error.into());
        next
    }

    /// Return a fresh signal with the error cleared.
    ///
    /// This is how an error handler rethrows a repaired signal: clearing
    /// the error puts the derivation back on the data path while the id
    /// keeps correlating it with the originating push.
    pub fn without_error(&self) -> Self {
        let mut next = self.clone();
        next.error = None;
        next
    }

    /// Look up a tag.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// Return a fresh signal carrying this tag.
    pub fn with_tag(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.tags.insert(name.into(), value.into());
        next
    }

    /// Return a fresh signal without the named tag.
    pub fn without_tag(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.tags.remove(name);
        next
    }

    /// Serialize the signal as a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload_of(pairs: &[(&str, Value)]) -> Payload {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn scalar_wraps_under_anon_key() {
        let signal = Signal::new(10);
        assert_eq!(signal.get(ANON_KEY), Some(&json!(10)));
        assert_eq!(signal.payload().len(), 1);
        assert!(!signal.is_error());
    }

    #[test]
    fn map_becomes_the_payload() {
        let signal = Signal::new(payload_of(&[("a", json!(1)), ("b", json!("two"))]));
        assert_eq!(signal.get("a"), Some(&json!(1)));
        assert_eq!(signal.get("b"), Some(&json!("two")));
        assert!(signal.get(ANON_KEY).is_none());
    }

    #[test]
    fn json_object_value_becomes_the_payload() {
        let signal = Signal::new(json!({"x": 5}));
        assert_eq!(signal.get("x"), Some(&json!(5)));
    }

    #[test]
    fn error_wrap_empties_the_payload() {
        let signal = Signal::new(SignalError::new("boom"));
        assert!(signal.is_error());
        assert!(signal.payload().is_empty());
        assert_eq!(signal.error().unwrap().message, "boom");
    }

    #[test]
    fn wrapping_a_signal_is_identity() {
        let original = Signal::new(10);
        let id = original.id().clone();
        let rewrapped = Signal::new(original);
        assert_eq!(rewrapped.id(), &id);
    }

    #[test]
    fn fresh_signals_get_fresh_ids() {
        let a = Signal::new(1);
        let b = Signal::new(1);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a.seq());
    }

    #[test]
    fn derive_preserves_id_and_tags() {
        let signal = Signal::new(10).with_tag("route", "a");
        let derived = signal.derive(20);
        assert_eq!(derived.id(), signal.id());
        assert_eq!(derived.tag("route"), Some("a"));
        assert_eq!(derived.get(ANON_KEY), Some(&json!(20)));
    }

    #[test]
    fn derive_carries_the_receivers_error() {
        let failed = Signal::new(10).with_error("boom");
        let derived = failed.derive(20);
        assert_eq!(derived.error().unwrap().message, "boom");
    }

    #[test]
    fn clone_preserves_payload_by_value() {
        let signal = Signal::new(payload_of(&[("k", json!(7))]));
        let copy = signal.clone();
        assert_eq!(copy.id(), signal.id());
        assert_eq!(copy.get("k"), Some(&json!(7)));
    }

    #[test]
    fn with_does_not_mutate_the_receiver() {
        let signal = Signal::new(payload_of(&[("a", json!(1))]));
        let updated = signal.with("b", 2);
        assert!(signal.get("b").is_none());
        assert_eq!(updated.get("a"), Some(&json!(1)));
        assert_eq!(updated.get("b"), Some(&json!(2)));
        assert_eq!(updated.id(), signal.id());
    }

    #[test]
    fn tag_updates_do_not_mutate_the_receiver() {
        let signal = Signal::new(1).with_tag("keep", "yes");
        let tagged = signal.with_tag("extra", "1");
        let untagged = tagged.without_tag("keep");

        assert!(signal.tag("extra").is_none());
        assert_eq!(tagged.tag("keep"), Some("yes"));
        assert_eq!(tagged.tag("extra"), Some("1"));
        assert!(untagged.tag("keep").is_none());
        assert_eq!(untagged.id(), signal.id());
    }

    #[test]
    fn with_error_keeps_the_payload() {
        let signal = Signal::new(payload_of(&[("a", json!(1))]));
        let failed = signal.with_error("late failure");
        assert!(signal.error().is_none());
        assert_eq!(failed.get("a"), Some(&json!(1)));
        assert_eq!(failed.id(), signal.id());
    }

    #[test]
    fn without_error_returns_to_the_data_path() {
        let failed = Signal::new(payload_of(&[("a", json!(1))])).with_error("boom");
        let repaired = failed.without_error();
        assert!(failed.is_error());
        assert!(!repaired.is_error());
        assert_eq!(repaired.get("a"), Some(&json!(1)));
        assert_eq!(repaired.id(), failed.id());
    }

    #[test]
    fn result_round_trip() {
        let signal = Signal::new(10).with_result("done");
        assert_eq!(signal.result(), Some(&json!("done")));
        assert_eq!(signal.get(ANON_KEY), Some(&json!(10)));
    }

    #[test]
    fn typed_reads_report_absence_and_mismatch_distinctly() {
        let signal = Signal::new(payload_of(&[("n", json!("12")), ("s", json!("abc"))]));
        assert_eq!(signal.value::<i64>("n").unwrap(), Some(12));
        assert_eq!(signal.value::<i64>("missing").unwrap(), None);
        assert!(signal.value::<i64>("s").is_err());
    }

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Reading {
        sensor: String,
        celsius: f64,
    }

    #[test]
    fn decode_reads_structured_payload_values() {
        let signal = Signal::new(payload_of(&[(
            "reading",
            json!({"sensor": "probe-1", "celsius": 21.5}),
        )]));

        let reading = signal.decode::<Reading>("reading").unwrap();
        assert_eq!(
            reading,
            Some(Reading {
                sensor: "probe-1".to_owned(),
                celsius: 21.5,
            })
        );
        assert_eq!(signal.decode::<Reading>("missing").unwrap(), None);
    }

    #[test]
    fn decode_reports_shape_mismatches() {
        let signal = Signal::new(payload_of(&[("reading", json!("not an object"))]));
        let error = signal.decode::<Reading>("reading").unwrap_err();
        assert!(matches!(error, PayloadError::Decode(_)));
    }

    #[test]
    fn json_uses_stable_wire_casing() {
        let signal = Signal::new(10);
        let text = signal.to_json().unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        for field in ["ID", "Seq", "Error", "End", "Payload", "Tags"] {
            assert!(parsed.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(parsed["ID"], parsed["Seq"]);
        assert_eq!(parsed["Payload"][ANON_KEY], json!(10));
    }
}
