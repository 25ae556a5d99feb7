//! Spec compiler: turns a [`Spec`] into an immutable [`Node`] tree.
//!
//! Entry point: [`Compiler::compile`] (or the free [`compile`]).
//!
//! Every malformed spec is rejected here with a [`ConfigError`]; a tree that
//! compiles never fails structurally at evaluation time.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::trace;

use schemable_types::{CallError, CompileResult, ConfigError, Kind, Value};

use crate::callable::Transform;
use crate::node::{Entry, Node, OptionalKey, Sequence, Structural, TypeCheck};
use crate::options::CompileOptions;
use crate::spec::{Optional, Select, Spec};

/// Compile `spec` with `options`.
pub fn compile(spec: &Spec, options: CompileOptions) -> CompileResult<Arc<Node>> {
    Compiler::new(options).compile(spec)
}

/// Compiles specs under one set of [`CompileOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Compile one spec into a node.
    ///
    /// Embedded nodes are returned as-is, so recompiling a compiled tree is
    /// idempotent.
    pub fn compile(&self, spec: &Spec) -> CompileResult<Arc<Node>> {
        let node = match spec {
            Spec::Compiled(node) => return Ok(Arc::clone(node)),
            Spec::Value(value) => Node::Literal(value.clone()),
            Spec::Type(kinds) => Node::Type(self.compile_type(kinds)?),
            Spec::List(items) => Node::Sequence(self.compile_list(items)?),
            Spec::Map(entries) => Node::Structural(self.compile_map(entries)?),
            Spec::Optional(optional) => Node::Optional(self.compile_optional(optional)?),
            Spec::Predicate(predicate) => Node::Predicate(predicate.clone()),
            Spec::Transform(transform) => Node::Transform(transform.clone()),
            Spec::All(specs) => Node::All(self.compile_each(specs)?),
            Spec::Any(specs) => Node::Any(self.compile_each(specs)?),
            Spec::Use(u) => Node::Use(u.0.clone()),
            Spec::Select(select) => Node::Select(self.compile_select(select)),
        };
        Ok(Arc::new(node))
    }

    fn compile_each(&self, specs: &[Spec]) -> CompileResult<Vec<Arc<Node>>> {
        specs.iter().map(|s| self.compile(s)).collect()
    }

    // ── Leaves ────────────────────────────────────────────────────────────

    fn compile_type(&self, kinds: &[Kind]) -> CompileResult<TypeCheck> {
        if kinds.is_empty() {
            return Err(ConfigError::EmptyTypeSet);
        }
        Ok(TypeCheck::new(kinds.to_vec()))
    }

    // ── List ──────────────────────────────────────────────────────────────

    fn compile_list(&self, items: &[Spec]) -> CompileResult<Sequence> {
        let [element] = items else {
            return Err(ConfigError::SequenceArity(items.len()));
        };
        let element = Arc::new(Node::All(vec![self.compile(element)?]));
        Ok(Sequence::new(element))
    }

    // ── Dict ──────────────────────────────────────────────────────────────

    fn compile_map(&self, pairs: &[(Spec, Spec)]) -> CompileResult<Structural> {
        let mut exact = Vec::new();
        let mut other = Vec::new();
        let mut identities = HashSet::new();

        for (key_spec, value_spec) in pairs {
            let key = self.compile_key(key_spec)?;
            let value = self.compile(value_spec)?;

            if value.is_injector() && key.exact_key().is_none() {
                return Err(ConfigError::InjectedKey(key.to_string()));
            }
            // Errors are keyed by identity, so two keys may never share one.
            if !identities.insert(key.key_identity()) {
                return Err(ConfigError::DuplicateKey(key.to_string()));
            }

            let entry = Entry::new(key, value);
            if entry.key().exact_key().is_some() {
                exact.push(entry);
            } else {
                other.push(entry);
            }
        }

        trace!(
            exact = exact.len(),
            other = other.len(),
            extra = %self.options.extra,
            "compiled dict schema"
        );

        exact.extend(other);
        Ok(Structural::new(exact, self.options.extra))
    }

    fn compile_key(&self, spec: &Spec) -> CompileResult<Arc<Node>> {
        let key = self.compile(spec)?;
        if !key.is_key_capable() {
            return Err(ConfigError::InvalidKey(key.kind_name().to_string()));
        }
        Ok(key)
    }

    fn compile_optional(&self, optional: &Optional) -> CompileResult<OptionalKey> {
        let key = match optional.key.as_ref() {
            Spec::Value(value) => Arc::new(Node::Literal(value.clone())),
            Spec::Type(kinds) => Arc::new(Node::Type(self.compile_type(kinds)?)),
            Spec::Compiled(node) if matches!(node.as_ref(), Node::Literal(_) | Node::Type(_)) => {
                Arc::clone(node)
            }
            other => {
                let node = self.compile(other)?;
                return Err(ConfigError::InvalidOptional(node.kind_name().to_string()));
            }
        };

        if optional.default.is_some() && key.exact_key().is_none() {
            return Err(ConfigError::DefaultOnTypeKey(key.to_string()));
        }

        Ok(OptionalKey::new(key, optional.default.clone()))
    }

    // ── Select ────────────────────────────────────────────────────────────

    /// `Select` is a plain pipeline: map check, field getter, then the
    /// optional transform.
    fn compile_select(&self, select: &Select) -> Arc<Node> {
        let mut steps = vec![Arc::new(Node::Type(TypeCheck::new(vec![Kind::Map])))];
        if let Some(field) = &select.field {
            steps.push(Arc::new(Node::Transform(field_getter(field.clone()))));
        }
        if let Some(transform) = &select.transform {
            steps.push(Arc::new(Node::Transform(transform.clone())));
        }
        Arc::new(Node::All(steps))
    }
}

/// A transform reading `field` out of a mapping, failing with `KeyError`.
fn field_getter(field: Value) -> Transform {
    Transform::new("get", move |value| {
        value
            .get(&field)
            .cloned()
            .ok_or_else(|| CallError::new("KeyError", field.to_string()))
    })
}
