//! ECMAScript AST for zero-sugar.
//!
//! Re-exports the standard SWC AST and adds the types every stage of the
//! pipeline shares:
//! - [`Diagnostic`] and its classification
//! - [`DesugarConfig`], the per-pass switches

pub use swc_ecma_ast::*;

mod config;
mod diagnostic;

pub use config::{ConfigError, DesugarConfig, DEFAULT_FOR_IN_HELPER, FOR_IN_HELPER_SOURCE};
pub use diagnostic::{Diagnostic, DiagnosticKind, Provenance, Severity};
