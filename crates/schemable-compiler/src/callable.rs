//! Caller-supplied callables: predicates, transforms and value providers.
//!
//! Every callable carries a label used in validation messages. The engine
//! never inspects a callable beyond calling it and reading its label.

use std::fmt;
use std::sync::Arc;

use schemable_types::{CallError, Value};

type PredicateFn = dyn Fn(&Value) -> Result<bool, CallError> + Send + Sync;
type TransformFn = dyn Fn(&Value) -> Result<Value, CallError> + Send + Sync;
type ProviderFn = dyn Fn() -> Value + Send + Sync;

// ══════════════════════════════════════════════════════════════════════════════
// Predicate
// ══════════════════════════════════════════════════════════════════════════════

/// A boolean check. Passing values are loaded unchanged.
#[derive(Clone)]
pub struct Predicate {
    label: String,
    func: Arc<PredicateFn>,
}

impl Predicate {
    /// Wrap an infallible check.
    pub fn new<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(move |value: &Value| Ok(func(value))),
        }
    }

    /// Wrap a check that may itself fail.
    pub fn fallible<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, CallError> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn call(&self, value: &Value) -> Result<bool, CallError> {
        (self.func)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.label).finish()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Transform
// ══════════════════════════════════════════════════════════════════════════════

/// A value-replacing callable. Its return value becomes the loaded data.
#[derive(Clone)]
pub struct Transform {
    label: String,
    func: Arc<TransformFn>,
}

impl Transform {
    pub fn new<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn call(&self, value: &Value) -> Result<Value, CallError> {
        (self.func)(value)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transform").field(&self.label).finish()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// ValueSource
// ══════════════════════════════════════════════════════════════════════════════

/// A constant, or a zero-argument provider invoked fresh on every use.
///
/// Backs both optional-key defaults and `Use` injections.
#[derive(Clone)]
pub enum ValueSource {
    Static(Value),
    Generated { label: String, func: Arc<ProviderFn> },
}

impl ValueSource {
    pub fn generated<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        ValueSource::Generated {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    /// Produce the value. Providers run on every call.
    pub fn get(&self) -> Value {
        match self {
            ValueSource::Static(value) => value.clone(),
            ValueSource::Generated { func, .. } => func(),
        }
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Static(value) => f.debug_tuple("Static").field(value).finish(),
            ValueSource::Generated { label, .. } => {
                f.debug_tuple("Generated").field(label).finish()
            }
        }
    }
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Static(value) => write!(f, "{value}"),
            ValueSource::Generated { label, .. } => f.write_str(label),
        }
    }
}

impl From<Value> for ValueSource {
    fn from(value: Value) -> Self {
        ValueSource::Static(value)
    }
}
