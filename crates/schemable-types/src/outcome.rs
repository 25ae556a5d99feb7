//! Evaluation results: loaded data plus a structured error tree.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::Value;

/// A recursive error report mirroring the shape of the input.
///
/// Leaf failures are messages; mapping and sequence failures are maps from
/// key (or index) to a nested error. An absent error is `None` at the
/// [`Outcome`] level, never an empty map.
#[derive(Debug, Clone, PartialEq)]
pub enum Errors {
    Message(String),
    Map(IndexMap<Value, Errors>),
}

impl Errors {
    pub fn message(msg: impl Into<String>) -> Self {
        Errors::Message(msg.into())
    }

    /// Build an error map from key/error pairs, keeping their order.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<Value>,
        I: IntoIterator<Item = (K, Errors)>,
    {
        Errors::Map(entries.into_iter().map(|(k, e)| (k.into(), e)).collect())
    }

    pub fn as_message(&self) -> Option<&str> {
        match self {
            Errors::Message(msg) => Some(msg),
            Errors::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<Value, Errors>> {
        match self {
            Errors::Map(map) => Some(map),
            Errors::Message(_) => None,
        }
    }

    /// Look up the sub-error for `key` in a structural error.
    pub fn get(&self, key: &Value) -> Option<&Errors> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Prefix a leaf message with `bad value: `; structural errors pass through.
    pub fn into_bad_value(self) -> Self {
        match self {
            Errors::Message(msg) => Errors::Message(format!("bad value: {msg}")),
            nested => nested,
        }
    }
}

impl From<&str> for Errors {
    fn from(msg: &str) -> Self {
        Errors::Message(msg.to_string())
    }
}

impl From<String> for Errors {
    fn from(msg: String) -> Self {
        Errors::Message(msg)
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Errors::Message(msg) => f.write_str(msg),
            Errors::Map(map) => {
                f.write_str("{")?;
                for (i, (k, e)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match e {
                        Errors::Message(msg) => write!(f, "{k}: {msg:?}")?,
                        nested => write!(f, "{k}: {nested}")?,
                    }
                }
                f.write_str("}")
            }
        }
    }
}

impl Serialize for Errors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Errors::Message(msg) => serializer.serialize_str(msg),
            Errors::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, e) in map {
                    out.serialize_entry(&k.key_string(), e)?;
                }
                out.end()
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Outcome
// ══════════════════════════════════════════════════════════════════════════════

/// The `(data, errors)` pair produced by one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Loaded data; `None` when nothing could be loaded.
    pub data: Option<Value>,
    /// Error tree; `None` when evaluation succeeded.
    pub errors: Option<Errors>,
}

impl Outcome {
    /// Build an outcome, normalising an empty error map to `None`.
    pub fn new(data: Option<Value>, errors: Option<Errors>) -> Self {
        let errors = match errors {
            Some(Errors::Map(map)) if map.is_empty() => None,
            other => other,
        };
        Self { data, errors }
    }

    /// A successful load of `data`.
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    /// A leaf-level failure with no loaded data.
    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: Some(Errors::Message(msg.into())),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_none()
    }

    /// Split into `Ok(data)` on success or `Err(errors)` on failure.
    pub fn into_result(self) -> Result<Option<Value>, Errors> {
        match self.errors {
            None => Ok(self.data),
            Some(errors) => Err(errors),
        }
    }
}
