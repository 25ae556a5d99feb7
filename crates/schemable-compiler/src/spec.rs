//! User-authored specs.
//!
//! A [`Spec`] describes validity with plain data plus a few explicit
//! wrappers. It is compiled once into a [`Node`] tree; nothing here is
//! evaluated directly.
//!
//! ```text
//! Spec::from(Value)       raw data: lists → list schema, maps → dict schema,
//!                         type objects → type check, anything else → equality
//! Kind / Spec::types      instance check against one or more kinds
//! Optional                marks a dict key optional, with an optional default
//! All / Any               pipeline / alternatives
//! Predicate / Transform   caller-supplied check / value replacement
//! Use / Select            value injection / field extraction
//! ```

use std::sync::Arc;

use schemable_types::{Kind, Value};

use crate::callable::{Predicate, Transform, ValueSource};
use crate::node::Node;

/// A declarative description of valid data.
#[derive(Debug, Clone)]
pub enum Spec {
    /// Matched by equality.
    Value(Value),
    /// Matched by instance check against any of the kinds.
    Type(Vec<Kind>),
    /// A list schema: exactly one element spec.
    List(Vec<Spec>),
    /// A dict schema: key spec → value spec, in declaration order.
    Map(Vec<(Spec, Spec)>),
    Optional(Optional),
    Predicate(Predicate),
    Transform(Transform),
    All(Vec<Spec>),
    Any(Vec<Spec>),
    Use(Use),
    Select(Select),
    /// An already compiled node, embedded as-is.
    Compiled(Arc<Node>),
}

impl Spec {
    /// Convert raw data into a spec by inspecting its shape: lists become list
    /// schemas, maps become dict schemas, type objects become type checks and
    /// every other value is matched by equality.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::List(items) => Spec::List(items.into_iter().map(Spec::from_value).collect()),
            Value::Map(map) => Spec::Map(
                map.into_iter()
                    .map(|(k, v)| (Spec::from_value(k), Spec::from_value(v)))
                    .collect(),
            ),
            Value::Type(kind) => Spec::Type(vec![kind]),
            other => Spec::Value(other),
        }
    }

    /// Equality against `value`, even when it is a list or a map.
    pub fn literal(value: impl Into<Value>) -> Self {
        Spec::Value(value.into())
    }

    /// Instance check against a tuple of kinds.
    pub fn types(kinds: impl IntoIterator<Item = Kind>) -> Self {
        Spec::Type(kinds.into_iter().collect())
    }

    /// A list schema over one element spec.
    pub fn list(element: impl Into<Spec>) -> Self {
        Spec::List(vec![element.into()])
    }

    /// A dict schema from key/value spec pairs. See also [`spec_map!`](crate::spec_map).
    pub fn map<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Spec, Spec)>,
    {
        Spec::Map(entries.into_iter().collect())
    }

    /// Every spec must pass, each fed the previous one's data.
    pub fn all(specs: impl IntoIterator<Item = Spec>) -> Self {
        Spec::All(specs.into_iter().collect())
    }

    /// The first passing spec wins.
    pub fn any(specs: impl IntoIterator<Item = Spec>) -> Self {
        Spec::Any(specs.into_iter().collect())
    }

    pub fn predicate<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Spec::Predicate(Predicate::new(label, func))
    }

    pub fn transform<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, schemable_types::CallError> + Send + Sync + 'static,
    {
        Spec::Transform(Transform::new(label, func))
    }
}

/// Build a dict [`Spec`] from `key => value` pairs.
///
/// ```
/// use schemable_compiler::{spec_map, Optional, Spec};
/// use schemable_types::Kind;
///
/// let spec = spec_map! {
///     "name" => Kind::Str,
///     Optional::new("age").with_default(0) => Kind::Int,
/// };
/// assert!(matches!(spec, Spec::Map(ref entries) if entries.len() == 2));
/// ```
#[macro_export]
macro_rules! spec_map {
    () => {
        $crate::Spec::Map(::std::vec::Vec::new())
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Spec::Map(::std::vec![
            $(($crate::Spec::from($key), $crate::Spec::from($value))),+
        ])
    };
}

// ══════════════════════════════════════════════════════════════════════════════
// Wrappers
// ══════════════════════════════════════════════════════════════════════════════

/// Marks a dict key as optional.
///
/// Wraps a value or a type key spec. Value keys may carry a default that is
/// inserted when the key is absent from the input.
#[derive(Debug, Clone)]
pub struct Optional {
    pub(crate) key: Box<Spec>,
    pub(crate) default: Option<ValueSource>,
}

impl Optional {
    pub fn new(key: impl Into<Spec>) -> Self {
        Self {
            key: Box::new(key.into()),
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(ValueSource::Static(value.into()));
        self
    }

    /// A default computed by `func` on every evaluation that needs it.
    pub fn with_default_fn<F>(mut self, label: impl Into<String>, func: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(ValueSource::generated(label, func));
        self
    }
}

/// Ignores its input and produces a constant or a generated value.
///
/// Inside a dict schema it injects its key regardless of the input keys.
#[derive(Debug, Clone)]
pub struct Use(pub(crate) ValueSource);

impl Use {
    pub fn value(value: impl Into<Value>) -> Self {
        Use(ValueSource::Static(value.into()))
    }

    pub fn with<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Use(ValueSource::generated(label, func))
    }
}

/// Extracts data from a mapping input.
///
/// Inside a dict schema it is fed the whole input mapping rather than the
/// value under its own key, so it can derive keys from sibling fields.
#[derive(Debug, Clone)]
pub struct Select {
    pub(crate) field: Option<Value>,
    pub(crate) transform: Option<Transform>,
}

impl Select {
    /// The value under `field`.
    pub fn field(field: impl Into<Value>) -> Self {
        Self {
            field: Some(field.into()),
            transform: None,
        }
    }

    /// The value under `field`, passed through `transform`.
    pub fn field_with(field: impl Into<Value>, transform: Transform) -> Self {
        Self {
            field: Some(field.into()),
            transform: Some(transform),
        }
    }

    /// `transform` applied to the whole mapping.
    pub fn with(transform: Transform) -> Self {
        Self {
            field: None,
            transform: Some(transform),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Conversions
// ══════════════════════════════════════════════════════════════════════════════

impl From<Value> for Spec {
    fn from(value: Value) -> Self {
        Spec::from_value(value)
    }
}

impl From<&str> for Spec {
    fn from(s: &str) -> Self {
        Spec::Value(Value::from(s))
    }
}

impl From<String> for Spec {
    fn from(s: String) -> Self {
        Spec::Value(Value::Str(s))
    }
}

impl From<bool> for Spec {
    fn from(b: bool) -> Self {
        Spec::Value(Value::Bool(b))
    }
}

impl From<i32> for Spec {
    fn from(n: i32) -> Self {
        Spec::Value(Value::from(n))
    }
}

impl From<i64> for Spec {
    fn from(n: i64) -> Self {
        Spec::Value(Value::Int(n))
    }
}

impl From<f64> for Spec {
    fn from(n: f64) -> Self {
        Spec::Value(Value::Float(n))
    }
}

impl From<Kind> for Spec {
    fn from(kind: Kind) -> Self {
        Spec::Type(vec![kind])
    }
}

impl From<Optional> for Spec {
    fn from(optional: Optional) -> Self {
        Spec::Optional(optional)
    }
}

impl From<Predicate> for Spec {
    fn from(predicate: Predicate) -> Self {
        Spec::Predicate(predicate)
    }
}

impl From<Transform> for Spec {
    fn from(transform: Transform) -> Self {
        Spec::Transform(transform)
    }
}

impl From<Use> for Spec {
    fn from(u: Use) -> Self {
        Spec::Use(u)
    }
}

impl From<Select> for Spec {
    fn from(select: Select) -> Self {
        Spec::Select(select)
    }
}

impl From<Arc<Node>> for Spec {
    fn from(node: Arc<Node>) -> Self {
        Spec::Compiled(node)
    }
}
