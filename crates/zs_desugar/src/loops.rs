//! Loop normalizer: `for`, `for-in`, `for-of` and `do-while` become `while`.
//!
//! Every lowered loop has the shape
//!
//! ```js
//! while (test) { L: { body } update; }
//! ```
//!
//! where `L` is the label the continue rewriter already put on the body, or a
//! fresh one. Loops are rewritten innermost first.

mod do_while;
mod for_stmt;
mod iteration;

use swc_common::util::take::Take;
use swc_ecma_ast as ast;
use swc_ecma_visit::{Visit, VisitMut, VisitMutWith, VisitWith};

use crate::builder::{into_block, labeled};
use crate::context::PassContext;

pub fn normalize_loops(program: &mut ast::Program, cx: &mut PassContext) {
    program.visit_mut_with(&mut LoopNormalizer { cx });
}

pub struct LoopNormalizer<'a> {
    cx: &'a mut PassContext,
}

impl VisitMut for LoopNormalizer<'_> {
    fn visit_mut_stmt(&mut self, stmt: &mut ast::Stmt) {
        stmt.visit_mut_children_with(self);

        match stmt {
            ast::Stmt::For(_) => {
                if let ast::Stmt::For(for_stmt) = stmt.take() {
                    *stmt = for_stmt::lower_for(for_stmt, self.cx);
                }
            }
            ast::Stmt::DoWhile(_) => {
                if let ast::Stmt::DoWhile(do_while) = stmt.take() {
                    *stmt = do_while::lower_do_while(do_while, self.cx);
                }
            }
            ast::Stmt::ForOf(_) => {
                if let ast::Stmt::ForOf(for_of) = stmt.take() {
                    *stmt = match iteration::lower_for_of(for_of, self.cx) {
                        Ok(lowered) => lowered,
                        Err((original, reason)) => {
                            self.cx.unsupported(original.span, reason);
                            ast::Stmt::ForOf(original)
                        }
                    };
                }
            }
            ast::Stmt::ForIn(_) => {
                if let ast::Stmt::ForIn(for_in) = stmt.take() {
                    *stmt = match iteration::lower_for_in(for_in, self.cx) {
                        Ok(lowered) => lowered,
                        Err((original, reason)) => {
                            self.cx.unsupported(original.span, reason);
                            ast::Stmt::ForIn(original)
                        }
                    };
                }
            }
            _ => {}
        }
    }
}

/// `L: { body }`, reusing a synthetic label an earlier pass put on the body.
pub(crate) fn labeled_body(body: Box<ast::Stmt>, cx: &mut PassContext) -> ast::Stmt {
    match *body {
        ast::Stmt::Labeled(l) if cx.names.is_synthetic_label(&l.label.sym) => ast::Stmt::Labeled(l),
        other => {
            let label = cx.names.fresh_label("L");
            labeled(label, ast::Stmt::Block(into_block(other)))
        }
    }
}

/// Whether a function or arrow is created anywhere inside `node`.
pub(crate) fn creates_closure<N: VisitWith<ClosureFinder>>(node: &N) -> bool {
    let mut finder = ClosureFinder { found: false };
    node.visit_with(&mut finder);
    finder.found
}

pub(crate) struct ClosureFinder {
    found: bool,
}

impl Visit for ClosureFinder {
    fn visit_function(&mut self, _: &ast::Function) {
        self.found = true;
    }

    fn visit_arrow_expr(&mut self, _: &ast::ArrowExpr) {
        self.found = true;
    }
}
