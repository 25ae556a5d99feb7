//! Core node evaluator.
//!
//! Walks a compiled [`Node`] tree against an input and produces an
//! [`Outcome`]. Evaluation never mutates the tree and never fails outright:
//! every failure, including a caller callable's [`CallError`], ends up in
//! `Outcome::errors`.
//!
//! [`CallError`]: schemable_types::CallError

use indexmap::IndexMap;
use std::sync::Arc;

use tracing::{debug, trace};

use schemable_compiler::{
    ExtraPolicy, Node, Predicate, Sequence, Structural, Transform, TypeCheck, ValueSource,
};
use schemable_types::{Errors, Kind, Map, Outcome, Value};

/// Evaluate `node` against `input`.
pub fn evaluate(node: &Node, input: &Value) -> Outcome {
    match node {
        Node::Literal(expected) => eval_literal(expected, input),
        Node::Type(check) => eval_type(check, input),
        Node::Predicate(predicate) => eval_predicate(predicate, input),
        Node::Transform(transform) => eval_transform(transform, input),
        Node::Sequence(seq) => eval_sequence(seq, input),
        Node::Structural(dict) => eval_structural(dict, input),
        Node::Optional(opt) => evaluate(opt.key(), input),
        Node::All(nodes) => eval_all(nodes, input),
        Node::Any(nodes) => eval_any(nodes, input),
        Node::Use(source) => eval_use(source),
        Node::Select(pipeline) => evaluate(pipeline, input),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Leaves
// ══════════════════════════════════════════════════════════════════════════════

fn eval_literal(expected: &Value, input: &Value) -> Outcome {
    if input == expected {
        Outcome::ok(input.clone())
    } else {
        Outcome::fail(format!(
            "value error, expected {expected} but found {input}"
        ))
    }
}

fn eval_type(check: &TypeCheck, input: &Value) -> Outcome {
    if check.accepts(input) {
        Outcome::ok(input.clone())
    } else {
        Outcome::fail(type_error(&check.expected(), input))
    }
}

fn type_error(expected: &str, input: &Value) -> String {
    format!("type error, expected {expected} but found {}", input.kind())
}

fn eval_predicate(predicate: &Predicate, input: &Value) -> Outcome {
    match predicate.call(input) {
        Ok(true) => Outcome::ok(input.clone()),
        Ok(false) => Outcome::fail(format!(
            "{}({input}) should evaluate to true",
            predicate.label()
        )),
        Err(err) => Outcome::fail(format!(
            "{}({input}) should not raise an exception: {err}",
            predicate.label()
        )),
    }
}

fn eval_transform(transform: &Transform, input: &Value) -> Outcome {
    match transform.call(input) {
        Ok(value) => Outcome::ok(value),
        Err(err) => Outcome::fail(format!(
            "{}({input}) should not raise an exception: {err}",
            transform.label()
        )),
    }
}

fn eval_use(source: &ValueSource) -> Outcome {
    Outcome::ok(source.get())
}

// ══════════════════════════════════════════════════════════════════════════════
// Combinators
// ══════════════════════════════════════════════════════════════════════════════

/// Fail-fast pipeline: later nodes never see data from a failed step.
fn eval_all(nodes: &[Arc<Node>], input: &Value) -> Outcome {
    let mut outcome = Outcome::ok(input.clone());
    for node in nodes {
        let current = outcome.data.take().unwrap_or(Value::Null);
        outcome = evaluate(node, &current);
        if outcome.errors.is_some() {
            break;
        }
    }
    outcome
}

/// First success wins; otherwise the last attempt's outcome.
///
/// Each attempt is fed the previous attempt's data when it produced any,
/// and the original input otherwise.
fn eval_any(nodes: &[Arc<Node>], input: &Value) -> Outcome {
    let mut outcome = Outcome::ok(input.clone());
    for node in nodes {
        let attempt = outcome.data.take().unwrap_or_else(|| input.clone());
        outcome = evaluate(node, &attempt);
        if outcome.is_ok() {
            break;
        }
    }
    outcome
}

// ══════════════════════════════════════════════════════════════════════════════
// Sequence
// ══════════════════════════════════════════════════════════════════════════════

fn eval_sequence(seq: &Sequence, input: &Value) -> Outcome {
    let Some(items) = input.as_list() else {
        return Outcome::fail(type_error(Kind::List.name(), input));
    };

    let mut data = Vec::new();
    let mut errors = IndexMap::new();

    for (index, item) in items.iter().enumerate() {
        let outcome = evaluate(seq.element(), item);
        if let Some(err) = outcome.errors {
            errors.insert(Value::from(index), err.into_bad_value());
        }
        // Elements loading to null are filtered out.
        if let Some(value) = outcome.data.filter(|v| !v.is_null()) {
            data.push(value);
        }
    }

    let data = if data.is_empty() && !errors.is_empty() {
        None
    } else {
        Some(Value::List(data))
    };
    Outcome::new(data, Some(Errors::Map(errors)))
}

// ══════════════════════════════════════════════════════════════════════════════
// Structural
// ══════════════════════════════════════════════════════════════════════════════

/// Accumulates one dict evaluation.
struct DictState {
    data: Map,
    errors: IndexMap<Value, Errors>,
    /// Per-entry: did any input key match this key schema?
    seen: Vec<bool>,
}

impl DictState {
    fn record(&mut self, key: &Value, outcome: Outcome) {
        let failed = outcome.errors.is_some();
        if let Some(err) = outcome.errors {
            self.errors.insert(key.clone(), err.into_bad_value());
        }
        match outcome.data {
            Some(value) => {
                self.data.insert(key.clone(), value);
            }
            None if !failed => {
                self.data.insert(key.clone(), Value::Null);
            }
            None => {}
        }
    }
}

fn eval_structural(dict: &Structural, input: &Value) -> Outcome {
    let Some(obj) = input.as_map() else {
        return Outcome::fail(type_error(Kind::Map.name(), input));
    };

    let entries = dict.entries();
    let mut state = DictState {
        data: Map::new(),
        errors: IndexMap::new(),
        seen: vec![false; entries.len()],
    };

    // 1. Injected values see the whole input and claim their keys.
    let mut injected = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        if !entry.is_injected() {
            continue;
        }
        let key = entry.identity();
        state.seen[idx] = true;
        state.record(key, evaluate(entry.value(), input));
        injected.push(key);
    }

    // 2. Resolve every input key against the key schemas.
    for (key, value) in obj {
        if injected.contains(&key) {
            continue;
        }

        let candidates = match dict.exact_match(key) {
            Some(idx) => {
                state.seen[idx] = true;
                vec![Arc::clone(entries[idx].value())]
            }
            None => match_key_schemas(dict, key, &mut state.seen),
        };

        let outcome = match candidates.as_slice() {
            [] => {
                apply_extra_policy(dict, key, value, &mut state);
                continue;
            }
            [single] => evaluate(single, value),
            many => {
                debug!(%key, candidates = many.len(), "dict key matched several key schemas");
                eval_any(many, value)
            }
        };
        state.record(key, outcome);
    }

    // 3. Required key schemas nothing matched.
    for (idx, entry) in entries.iter().enumerate() {
        if entry.is_required() && !state.seen[idx] {
            state
                .errors
                .insert(entry.identity().clone(), Errors::message("missing required key"));
        }
    }

    // 4. Defaults for absent optional keys, computed fresh.
    for (key, default) in dict.defaults() {
        if !state.data.contains_key(key) {
            state.data.insert(key.clone(), default.get());
        }
    }

    // Empty data is only a load when the input itself was empty and valid.
    let data = if state.data.is_empty() && (!state.errors.is_empty() || !obj.is_empty()) {
        None
    } else {
        Some(Value::Map(state.data))
    };
    Outcome::new(data, Some(Errors::Map(state.errors)))
}

/// Every distinct value schema whose key schema accepts `key`.
fn match_key_schemas(dict: &Structural, key: &Value, seen: &mut [bool]) -> Vec<Arc<Node>> {
    let mut candidates: Vec<Arc<Node>> = Vec::new();
    for (idx, entry) in dict.entries().iter().enumerate() {
        if entry.is_injected() || !evaluate(entry.key(), key).is_ok() {
            continue;
        }
        seen[idx] = true;
        if !candidates.iter().any(|c| Node::same_as(c, entry.value())) {
            candidates.push(Arc::clone(entry.value()));
        }
    }
    candidates
}

fn apply_extra_policy(dict: &Structural, key: &Value, value: &Value, state: &mut DictState) {
    match dict.extra() {
        ExtraPolicy::Allow => {
            state.data.insert(key.clone(), value.clone());
        }
        ExtraPolicy::Deny => {
            trace!(%key, "denied extra dict key");
            state.errors.insert(
                key.clone(),
                Errors::message(format!("bad key: not in {}", dict.accepted_keys())),
            );
        }
        ExtraPolicy::Ignore => {
            trace!(%key, "ignored extra dict key");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemable_compiler::{compile, CompileOptions, Spec};

    fn run(spec: Spec, input: Value) -> Outcome {
        let node = compile(&spec, CompileOptions::default()).unwrap();
        evaluate(&node, &input)
    }

    #[test]
    fn test_literal_messages() {
        assert_eq!(run(Spec::from(1), Value::Int(1)), Outcome::ok(Value::Int(1)));
        assert_eq!(
            run(Spec::from(5), Value::from("a")),
            Outcome::fail("value error, expected 5 but found \"a\"")
        );
    }

    #[test]
    fn test_type_messages() {
        assert_eq!(
            run(Spec::from(Kind::Str), Value::Int(1)),
            Outcome::fail("type error, expected str but found int")
        );
        assert_eq!(
            run(Spec::from(Kind::Str), Value::Type(Kind::Str)),
            Outcome::fail("type error, expected str but found type")
        );
        assert_eq!(
            run(Spec::types([Kind::Str, Kind::Float, Kind::Bool]), Value::Null),
            Outcome::fail("type error, expected bool or float or str but found null")
        );
    }

    #[test]
    fn test_type_check_on_type_values() {
        let outcome = run(Spec::from(Kind::Type), Value::Type(Kind::Int));
        assert_eq!(outcome, Outcome::ok(Value::Type(Kind::Int)));
    }

    #[test]
    fn test_empty_all_and_any_are_identity() {
        assert_eq!(run(Spec::all([]), Value::Int(3)), Outcome::ok(Value::Int(3)));
        assert_eq!(run(Spec::any([]), Value::Int(3)), Outcome::ok(Value::Int(3)));
    }

    #[test]
    fn test_sequence_rejects_non_list() {
        assert_eq!(
            run(Spec::list(Kind::Int), Value::from("abc")),
            Outcome::fail("type error, expected list but found str")
        );
    }

    #[test]
    fn test_structural_rejects_non_map() {
        assert_eq!(
            run(Spec::map([]), Value::list(Vec::<Value>::new())),
            Outcome::fail("type error, expected map but found list")
        );
    }
}
