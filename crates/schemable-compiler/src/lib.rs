//! schemable compiler: turns declarative specs into validator trees.
//!
//! ```text
//! Spec (data + wrappers) → Compiler → Arc<Node> (immutable, shareable)
//! ```
//!
//! The resulting tree is walked by `schemable-eval`.

pub mod callable;
pub mod compiler;
pub mod node;
pub mod options;
pub mod spec;

pub use callable::{Predicate, Transform, ValueSource};
pub use compiler::{compile, Compiler};
pub use node::{Entry, Node, OptionalKey, Sequence, Structural, TypeCheck};
pub use options::{CompileOptions, ExtraPolicy};
pub use spec::{Optional, Select, Spec, Use};
