//! Error types shared by the compiler and the evaluator.

use thiserror::Error;

use crate::{Errors, Value};

/// Generic message carried by every strict-mode failure.
pub const VALIDATION_FAILED: &str = "Schema validation failed";

/// A malformed spec, detected while compiling it.
///
/// Configuration errors are never produced during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A type spec listed no types.
    #[error("type schema spec must be a type or a non-empty tuple of types")]
    EmptyTypeSet,

    /// A sequence spec did not hold exactly one element spec.
    #[error("list schema spec must contain exactly one element spec, found {0}")]
    SequenceArity(usize),

    /// A spec kind that cannot act as a mapping key.
    #[error("{0} cannot be used as a dict key schema")]
    InvalidKey(String),

    /// `Optional` wrapping something other than a literal or a type.
    #[error("optional key must wrap a value or a type, found {0}")]
    InvalidOptional(String),

    /// A default was declared on an optional type key.
    #[error("optional key {0} cannot declare a default: only value keys can")]
    DefaultOnTypeKey(String),

    /// The same key schema was declared twice in one mapping.
    #[error("duplicate dict key schema {0}")]
    DuplicateKey(String),

    /// A `Use`/`Select` value schema sits under a non-literal key.
    #[error("injected value for key {0} requires a value key")]
    InjectedKey(String),
}

/// Failure signalled by a caller-supplied predicate or transform.
///
/// `kind` names the failure class (e.g. `ValueError`, `KeyError`) and
/// `message` describes it; both are surfaced in the validation message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct CallError {
    pub kind: String,
    pub message: String,
}

impl CallError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Raised by strict-mode evaluation when the outcome carries errors.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}: {errors}")]
pub struct SchemaError {
    /// Always [`VALIDATION_FAILED`].
    pub message: String,
    /// The full error tree.
    pub errors: Errors,
    /// Partially loaded data, if any.
    pub data: Option<Value>,
    /// The unmodified input.
    pub original: Value,
}

impl SchemaError {
    pub fn new(errors: Errors, data: Option<Value>, original: Value) -> Self {
        Self {
            message: VALIDATION_FAILED.to_string(),
            errors,
            data,
            original,
        }
    }
}
