//! schemable evaluator: applies compiled validator trees to data.
//!
//! [`Schema`] is the usual entry point: it compiles a spec once and can then
//! be evaluated against any number of inputs, from any number of threads.
//! [`evaluate`] walks a bare [`Node`](schemable_compiler::Node) tree.

pub mod evaluator;
pub mod schema;

pub use evaluator::evaluate;
pub use schema::Schema;
