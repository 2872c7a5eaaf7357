//! JavaScript parser and printer adapters.
//!
//! The desugaring core works on an already-parsed `swc_ecma_ast` tree. This
//! crate is the thin layer on both sides of it:
//!
//! - [`parse_js`] feeds source text to the SWC parser
//! - [`print_program`] renders a tree back to source (optionally with a
//!   source map) and [`dump_ast`] serialises it as JSON for debugging

pub mod parse;
pub mod print;

pub use parse::{parse_js, ParseResult, SyntaxErrorAt, SyntaxErrors};
pub use print::{dump_ast, print_program, Printed};
