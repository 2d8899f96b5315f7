//! Typed views over heterogeneous payload values.
//!
//! Payload maps are `serde_json::Value` underneath — the graph does not
//! constrain what flows through it. Reads go through [`FromValue`] sinks
//! that coerce the raw value into a concrete type. Numeric sinks accept
//! int, float, and numeric strings; everything else converts by identity.

use crate::error::PayloadError;
use serde_json::Value;

/// The payload map carried by every signal.
pub type Payload = serde_json::Map<String, Value>;

/// A typed sink for a raw payload value.
///
/// Implement this for domain types that want lenient coercion. Types that
/// are plain `serde` shapes don't need it — `Signal::decode` covers those.
pub trait FromValue: Sized {
    /// Coerce a raw payload value into `Self`, or report why it can't be.
    fn from_value(value: &Value) -> Result<Self, PayloadError>;
}

fn shape_of(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(_) => "bool".to_owned(),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".to_owned(),
        Value::Object(_) => "object".to_owned(),
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, PayloadError> {
        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Ok(v)
                } else if let Some(v) = n.as_f64() {
                    Ok(v as i64)
                } else {
                    Err(PayloadError::TypeMismatch {
                        expected: "i64",
                        found: shape_of(value),
                    })
                }
            }
            Value::String(s) => s.parse::<i64>().map_err(|_| PayloadError::Parse {
                expected: "i64",
                value: s.clone(),
            }),
            _ => Err(PayloadError::TypeMismatch {
                expected: "i64",
                found: shape_of(value),
            }),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, PayloadError> {
        match value {
            Value::Number(n) => n.as_f64().ok_or_else(|| PayloadError::TypeMismatch {
                expected: "f64",
                found: shape_of(value),
            }),
            Value::String(s) => s.parse::<f64>().map_err(|_| PayloadError::Parse {
                expected: "f64",
                value: s.clone(),
            }),
            _ => Err(PayloadError::TypeMismatch {
                expected: "f64",
                found: shape_of(value),
            }),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, PayloadError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(PayloadError::TypeMismatch {
                expected: "String",
                found: shape_of(value),
            }),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, PayloadError> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(PayloadError::TypeMismatch {
                expected: "bool",
                found: shape_of(value),
            }),
        }
    }
}
