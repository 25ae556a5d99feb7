//! Compiled validator nodes.
//!
//! A [`Node`] is the immutable, evaluable form of one [`Spec`](crate::Spec).
//! Children are held behind [`Arc`] so one compiled node can be shared by
//! several parents; nothing in a node changes after compilation.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use schemable_types::{Kind, Value};

use crate::callable::{Predicate, Transform, ValueSource};
use crate::options::ExtraPolicy;

/// One compiled validator.
#[derive(Debug)]
pub enum Node {
    /// Equality with a constant.
    Literal(Value),
    /// Instance check against a set of kinds.
    Type(TypeCheck),
    Predicate(Predicate),
    Transform(Transform),
    /// List schema.
    Sequence(Sequence),
    /// Dict schema.
    Structural(Structural),
    /// Optional dict key; evaluates as its wrapped key.
    Optional(OptionalKey),
    /// Pipeline: each node is fed the previous node's data.
    All(Vec<Arc<Node>>),
    /// Alternatives: the first passing node wins.
    Any(Vec<Arc<Node>>),
    /// Ignores its input.
    Use(ValueSource),
    /// Field extraction; wraps an `All` pipeline over transforms.
    Select(Arc<Node>),
}

impl Node {
    /// Short description of the node's kind, used in configuration errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Literal(_) => "value schema",
            Node::Type(_) => "type schema",
            Node::Predicate(_) => "predicate",
            Node::Transform(_) => "transform",
            Node::Sequence(_) => "list schema",
            Node::Structural(_) => "dict schema",
            Node::Optional(_) => "optional key",
            Node::All(_) => "all schema",
            Node::Any(_) => "any schema",
            Node::Use(_) => "use schema",
            Node::Select(_) => "select schema",
        }
    }

    /// Whether this node can test dict keys.
    pub fn is_key_capable(&self) -> bool {
        match self {
            Node::Literal(_) | Node::Type(_) | Node::Predicate(_) | Node::Optional(_) => true,
            Node::All(nodes) | Node::Any(nodes) => nodes.iter().all(|n| n.is_key_capable()),
            _ => false,
        }
    }

    /// Whether a dict schema feeds this node the whole input mapping.
    pub fn is_injector(&self) -> bool {
        matches!(self, Node::Use(_) | Node::Select(_))
    }

    /// The constant this key matches exactly, if any.
    pub fn exact_key(&self) -> Option<&Value> {
        match self {
            Node::Literal(value) => Some(value),
            Node::Optional(opt) => opt.key.exact_key(),
            _ => None,
        }
    }

    /// The value a key schema is reported under, e.g. in
    /// `missing required key` errors.
    pub fn key_identity(&self) -> Value {
        match self {
            Node::Literal(value) => value.clone(),
            Node::Type(check) => match check.kinds.as_slice() {
                [kind] => Value::Type(*kind),
                kinds => Value::List(kinds.iter().copied().map(Value::Type).collect()),
            },
            Node::Optional(opt) => opt.key.key_identity(),
            other => Value::Str(other.to_string()),
        }
    }

    /// Two candidate value schemas that would validate identically.
    pub fn same_as(a: &Arc<Node>, b: &Arc<Node>) -> bool {
        if Arc::ptr_eq(a, b) {
            return true;
        }
        match (a.as_ref(), b.as_ref()) {
            (Node::Literal(x), Node::Literal(y)) => x == y,
            (Node::Type(x), Node::Type(y)) => x.kinds == y.kinds,
            _ => false,
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, nodes: &[Arc<Node>]) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{node}")?;
    }
    Ok(())
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(value) => write!(f, "{value}"),
            Node::Type(check) => write!(f, "{check}"),
            Node::Predicate(p) => f.write_str(p.label()),
            Node::Transform(t) => f.write_str(t.label()),
            Node::Sequence(seq) => write!(f, "[{}]", seq.element),
            Node::Structural(dict) => {
                f.write_str("{")?;
                for (i, entry) in dict.entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", entry.key, entry.value)?;
                }
                f.write_str("}")
            }
            Node::Optional(opt) => write!(f, "{}", opt.key),
            Node::All(nodes) => {
                f.write_str("all(")?;
                write_joined(f, nodes)?;
                f.write_str(")")
            }
            Node::Any(nodes) => {
                f.write_str("any(")?;
                write_joined(f, nodes)?;
                f.write_str(")")
            }
            Node::Use(source) => write!(f, "use({source})"),
            Node::Select(inner) => write!(f, "select({inner})"),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Leaves
// ══════════════════════════════════════════════════════════════════════════════

/// A non-empty set of kinds; a value passes if it is an instance of any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCheck {
    kinds: Vec<Kind>,
}

impl TypeCheck {
    /// Callers guarantee `kinds` is non-empty.
    pub(crate) fn new(kinds: Vec<Kind>) -> Self {
        Self { kinds }
    }

    pub fn kinds(&self) -> &[Kind] {
        &self.kinds
    }

    pub fn accepts(&self, value: &Value) -> bool {
        self.kinds.iter().any(|kind| kind.matches(value))
    }

    /// Expected kind names sorted case-insensitively and joined by `or`.
    pub fn expected(&self) -> String {
        let mut names: Vec<&str> = self.kinds.iter().map(|k| k.name()).collect();
        names.sort_by_key(|name| name.to_lowercase());
        names.join(" or ")
    }
}

impl fmt::Display for TypeCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kinds.as_slice() {
            [kind] => write!(f, "{kind}"),
            kinds => {
                f.write_str("(")?;
                for (i, kind) in kinds.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{kind}")?;
                }
                f.write_str(")")
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Sequence
// ══════════════════════════════════════════════════════════════════════════════

/// Validates every element of a list against one element schema.
#[derive(Debug)]
pub struct Sequence {
    element: Arc<Node>,
}

impl Sequence {
    pub(crate) fn new(element: Arc<Node>) -> Self {
        Self { element }
    }

    /// The element pipeline (always an `All` node).
    pub fn element(&self) -> &Arc<Node> {
        &self.element
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Optional key
// ══════════════════════════════════════════════════════════════════════════════

/// An optional dict key wrapping a literal or a type check.
#[derive(Debug)]
pub struct OptionalKey {
    key: Arc<Node>,
    default: Option<ValueSource>,
}

impl OptionalKey {
    pub(crate) fn new(key: Arc<Node>, default: Option<ValueSource>) -> Self {
        Self { key, default }
    }

    pub fn key(&self) -> &Arc<Node> {
        &self.key
    }

    pub fn default(&self) -> Option<&ValueSource> {
        self.default.as_ref()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Structural
// ══════════════════════════════════════════════════════════════════════════════

/// One key schema / value schema pair of a dict schema.
#[derive(Debug)]
pub struct Entry {
    key: Arc<Node>,
    value: Arc<Node>,
    identity: Value,
}

impl Entry {
    pub(crate) fn new(key: Arc<Node>, value: Arc<Node>) -> Self {
        let identity = key.key_identity();
        Self {
            key,
            value,
            identity,
        }
    }

    pub fn key(&self) -> &Arc<Node> {
        &self.key
    }

    pub fn value(&self) -> &Arc<Node> {
        &self.value
    }

    /// What this entry's key is reported under.
    pub fn identity(&self) -> &Value {
        &self.identity
    }

    pub fn is_required(&self) -> bool {
        !matches!(self.key.as_ref(), Node::Optional(_))
    }

    pub fn is_injected(&self) -> bool {
        self.value.is_injector()
    }
}

/// A dict schema.
///
/// Entries are ordered with exact (value) keys first, then all other keys,
/// each group in declaration order.
#[derive(Debug)]
pub struct Structural {
    entries: Vec<Entry>,
    /// Exact key → entry index.
    exact: IndexMap<Value, usize>,
    /// Optional value keys with a default.
    defaults: Vec<(Value, ValueSource)>,
    extra: ExtraPolicy,
    /// Rendered, sorted list of every key schema, for `bad key` errors.
    accepted_keys: String,
}

impl Structural {
    pub(crate) fn new(entries: Vec<Entry>, extra: ExtraPolicy) -> Self {
        let exact = entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.key.exact_key().map(|k| (k.clone(), i)))
            .collect();

        let defaults = entries
            .iter()
            .filter_map(|e| match e.key.as_ref() {
                Node::Optional(opt) => match (opt.key.exact_key(), &opt.default) {
                    (Some(key), Some(default)) => Some((key.clone(), default.clone())),
                    _ => None,
                },
                _ => None,
            })
            .collect();

        let mut labels: Vec<String> = entries.iter().map(|e| e.key.to_string()).collect();
        labels.sort();
        let accepted_keys = format!("[{}]", labels.join(", "));

        Self {
            entries,
            exact,
            defaults,
            extra,
            accepted_keys,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Index of the entry whose key equals `key` exactly.
    pub fn exact_match(&self, key: &Value) -> Option<usize> {
        self.exact.get(key).copied()
    }

    pub fn defaults(&self) -> &[(Value, ValueSource)] {
        &self.defaults
    }

    pub fn extra(&self) -> ExtraPolicy {
        self.extra
    }

    pub fn accepted_keys(&self) -> &str {
        &self.accepted_keys
    }
}
