//! Compilation options.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a dict schema does with input keys that match no key schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraPolicy {
    /// Pass unmatched keys through into the loaded data.
    Allow,
    /// Report unmatched keys as errors.
    Deny,
    /// Drop unmatched keys silently.
    #[default]
    Ignore,
}

impl fmt::Display for ExtraPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}

/// Options applied to a whole compiled tree.
///
/// `extra` reaches every dict schema the compiler creates. `strict` is read
/// only by the outermost schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub extra: ExtraPolicy,
    pub strict: bool,
}

impl CompileOptions {
    pub fn with_extra(mut self, extra: ExtraPolicy) -> Self {
        self.extra = extra;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = CompileOptions::default();
        assert_eq!(opts.extra, ExtraPolicy::Ignore);
        assert!(!opts.strict);
    }

    #[test]
    fn test_deserialize_partial_options() {
        let opts: CompileOptions = serde_json::from_str(r#"{"extra": "deny"}"#).unwrap();
        assert_eq!(opts, CompileOptions::default().with_extra(ExtraPolicy::Deny));

        let opts: CompileOptions = serde_json::from_str(r#"{"strict": true}"#).unwrap();
        assert_eq!(opts.extra, ExtraPolicy::Ignore);
        assert!(opts.strict);
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let parsed: Result<CompileOptions, _> = serde_json::from_str(r#"{"extra": "maybe"}"#);
        assert!(parsed.is_err());
    }
}
