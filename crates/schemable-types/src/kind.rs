//! Runtime value kinds.
//!
//! A [`Kind`] plays the role of a "type object" in specs: a type check
//! succeeds when the input's kind is one of the expected kinds, and a
//! kind can itself be carried around as a value ([`Value::Type`]).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Value;

/// A runtime type that values can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    Map,
    /// Type objects themselves (`Value::Type`).
    Type,
    /// Every value is an instance of `Any`.
    Any,
}

impl Kind {
    /// Name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Type => "type",
            Kind::Any => "any",
        }
    }

    /// Whether `value` is an instance of this kind.
    pub fn matches(self, value: &Value) -> bool {
        self == Kind::Any || value.kind() == self
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_matches_everything() {
        assert!(Kind::Any.matches(&Value::Null));
        assert!(Kind::Any.matches(&Value::Type(Kind::Str)));
        assert!(Kind::Any.matches(&Value::from("a")));
    }

    #[test]
    fn test_type_kind_matches_type_values_only() {
        assert!(Kind::Type.matches(&Value::Type(Kind::Int)));
        assert!(!Kind::Type.matches(&Value::Int(1)));
        assert!(!Kind::Str.matches(&Value::Type(Kind::Str)));
    }

    #[test]
    fn test_bool_is_not_int() {
        assert!(!Kind::Int.matches(&Value::Bool(true)));
        assert!(Kind::Bool.matches(&Value::Bool(true)));
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&Kind::Str).unwrap();
        assert_eq!(json, "\"str\"");
        let back: Kind = serde_json::from_str("\"map\"").unwrap();
        assert_eq!(back, Kind::Map);
    }
}
