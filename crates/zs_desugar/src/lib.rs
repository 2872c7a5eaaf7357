//! Desugaring passes that rewrite JavaScript into a minimal core subset.
//!
//! Transforms, in the order the [`Pipeline`] runs them:
//! - multi-declarator and destructuring declarations → one plain declaration
//!   per binding (`let [a, b] = e` → `let tmp = e; let a = tmp[0]; ...`)
//! - `continue` → `break` out of a labeled block around the loop body
//! - `for`, `for-in`, `for-of`, `do-while` → `while`
//! - `switch` → a labeled block of `if` statements
//! - `try/finally` → `try/catch` followed by the finally body and a rethrow
//!
//! Every synthetic name comes from one [`NameAllocator`] per compilation unit,
//! seeded by the [`ScopeTracker`] so it never collides with a name of the input.

pub mod builder;
pub mod context;
pub mod continue_break;
pub mod desugar;
pub mod error;
pub mod finally;
pub mod loops;
pub mod names;
pub mod pipeline;
pub mod scope;
pub mod source;
pub mod switch;
pub mod validate;
pub mod var_decl;

#[cfg(test)]
mod test_util;

pub use context::PassContext;
pub use desugar::{desugar_module, desugar_program, transform};
pub use error::InvariantViolation;
pub use names::NameAllocator;
pub use pipeline::{Pipeline, TransformResult};
pub use scope::ScopeTracker;
pub use source::{for_in_helper_epilogue, transform_code, transform_code_with, TransformOutput};
