//! Schema: compile once, evaluate many times.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use schemable_compiler::{compile, CompileOptions, Node, Spec};
use schemable_types::{CompileResult, Outcome, SchemaError, Value};

use crate::evaluator::evaluate;

/// A compiled spec plus the options it was compiled with.
///
/// Cloning is cheap: the compiled tree is shared. A `Schema` can be embedded
/// in another spec (`Spec::from(&schema)`); it then keeps its own extra-key
/// policy, while its strict flag only matters when it is evaluated directly.
#[derive(Debug, Clone)]
pub struct Schema {
    root: Arc<Node>,
    options: CompileOptions,
}

impl Schema {
    /// Compile `spec` with default options.
    pub fn new(spec: impl Into<Spec>) -> CompileResult<Self> {
        Self::with_options(spec, CompileOptions::default())
    }

    pub fn with_options(spec: impl Into<Spec>, options: CompileOptions) -> CompileResult<Self> {
        let root = compile(&spec.into(), options)?;
        debug!(
            root = root.kind_name(),
            extra = %options.extra,
            strict = options.strict,
            "compiled schema"
        );
        Ok(Self { root, options })
    }

    /// The compiled tree.
    pub fn node(&self) -> &Arc<Node> {
        &self.root
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    pub fn is_strict(&self) -> bool {
        self.options.strict
    }

    /// Evaluate without strict mode, whatever the schema was built with.
    pub fn validate(&self, input: &Value) -> Outcome {
        evaluate(&self.root, input)
    }

    /// Evaluate, failing with [`SchemaError`] on errors if the schema is strict.
    pub fn evaluate(&self, input: &Value) -> Result<Outcome, SchemaError> {
        self.evaluate_with(input, self.options.strict)
    }

    /// Evaluate with an explicit strict flag, overriding the schema's own.
    pub fn evaluate_with(&self, input: &Value, strict: bool) -> Result<Outcome, SchemaError> {
        let outcome = self.validate(input);
        if !strict {
            return Ok(outcome);
        }
        match outcome.errors {
            None => Ok(outcome),
            Some(errors) => {
                trace!(%errors, "strict schema validation failed");
                Err(SchemaError::new(errors, outcome.data, input.clone()))
            }
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

impl From<&Schema> for Spec {
    fn from(schema: &Schema) -> Self {
        Spec::Compiled(Arc::clone(&schema.root))
    }
}

impl From<Schema> for Spec {
    fn from(schema: Schema) -> Self {
        Spec::Compiled(schema.root)
    }
}
