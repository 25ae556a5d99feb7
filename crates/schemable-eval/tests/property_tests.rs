//! Property tests for evaluation invariants, plus shared-schema concurrency.

use proptest::prelude::*;

use schemable_compiler::{spec_map, Spec};
use schemable_eval::Schema;
use schemable_types::{Errors, Kind, Outcome, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e6..1.0e6f64).prop_map(Value::Float),
        "[a-z]{0,6}".prop_map(Value::Str),
    ]
}

fn kind() -> impl Strategy<Value = Kind> {
    prop_oneof![
        Just(Kind::Null),
        Just(Kind::Bool),
        Just(Kind::Int),
        Just(Kind::Float),
        Just(Kind::Str),
        Just(Kind::List),
        Just(Kind::Map),
        Just(Kind::Any),
    ]
}

/// Ints load, strings fail: enough to exercise partial sequences.
fn int_or_str() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        "[a-z]{1,4}".prop_map(Value::Str),
    ]
}

proptest! {
    #[test]
    fn literal_accepts_only_equal_values(expected in scalar(), input in scalar()) {
        let schema = Schema::new(Spec::literal(expected.clone())).unwrap();
        let outcome = schema.validate(&input);
        if input == expected {
            prop_assert_eq!(outcome, Outcome::ok(input));
        } else {
            prop_assert_eq!(outcome.data, None);
            let message = format!("value error, expected {expected} but found {input}");
            prop_assert_eq!(outcome.errors, Some(Errors::message(message)));
        }
    }

    #[test]
    fn type_check_agrees_with_kind(kind in kind(), input in scalar()) {
        let schema = Schema::new(kind).unwrap();
        let outcome = schema.validate(&input);
        prop_assert_eq!(outcome.is_ok(), kind.matches(&input));
        if outcome.is_ok() {
            prop_assert_eq!(outcome.data, Some(input));
        }
    }

    #[test]
    fn sequence_keeps_passing_elements_in_order(items in prop::collection::vec(int_or_str(), 0..12)) {
        let schema = Schema::new(Spec::list(Kind::Int)).unwrap();
        let outcome = schema.validate(&Value::list(items.clone()));

        let passing: Vec<Value> = items.iter().filter(|v| v.as_int().is_some()).cloned().collect();
        let failing: Vec<Value> = items
            .iter()
            .enumerate()
            .filter(|(_, v)| v.as_int().is_none())
            .map(|(i, _)| Value::from(i))
            .collect();

        match &outcome.errors {
            None => prop_assert!(failing.is_empty()),
            Some(errors) => {
                let keys: Vec<Value> = errors.as_map().unwrap().keys().cloned().collect();
                prop_assert_eq!(keys, failing.clone());
            }
        }
        if passing.is_empty() && !failing.is_empty() {
            prop_assert_eq!(outcome.data, None);
        } else {
            prop_assert_eq!(outcome.data, Some(Value::List(passing)));
        }
    }

    #[test]
    fn loaded_dict_data_reloads_cleanly(
        entries in prop::collection::vec(("[a-z]{1,4}", int_or_str()), 0..8),
    ) {
        let schema = Schema::new(spec_map! { Kind::Str => Kind::Int }).unwrap();
        let input = Value::map(entries);
        let first = schema.validate(&input);
        if let Some(data) = first.data {
            let second = schema.validate(&data);
            prop_assert_eq!(second, Outcome::ok(data));
        }
    }
}

#[test]
fn schema_is_shared_across_threads() {
    let schema = Schema::new(spec_map! { "id" => Kind::Int, Kind::Str => Kind::Str }).unwrap();
    std::thread::scope(|scope| {
        for id in 0..8i64 {
            let schema = &schema;
            scope.spawn(move || {
                let input = Value::map([(Value::from("id"), Value::Int(id)), (Value::from("name"), Value::from("n"))]);
                for _ in 0..100 {
                    assert_eq!(schema.validate(&input), Outcome::ok(input.clone()));
                }
            });
        }
    });
}
