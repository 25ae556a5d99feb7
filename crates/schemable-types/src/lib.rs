//! Shared types for schemable.
//!
//! This crate defines the dynamic [`Value`] model, runtime [`Kind`]s, the
//! [`Outcome`]/[`Errors`] evaluation contract, and the error types used by
//! the compiler and the evaluator.

mod error;
mod kind;
mod outcome;
mod value;

pub use error::{CallError, ConfigError, SchemaError, VALIDATION_FAILED};
pub use kind::Kind;
pub use outcome::{Errors, Outcome};
pub use value::{Map, Value};

/// Result type for spec compilation.
pub type CompileResult<T> = std::result::Result<T, ConfigError>;
