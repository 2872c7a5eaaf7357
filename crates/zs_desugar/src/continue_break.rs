//! Continue-to-break rewriter.
//!
//! ```js
//! while (x) { if (y) continue; f(); }
//! // becomes
//! while (x) L: { if (y) break L; f(); }
//! ```
//!
//! Only loops targeted by at least one `continue` are touched, so input that
//! has no `continue` is returned unchanged.

use swc_common::util::take::Take;
use swc_ecma_ast as ast;
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::builder::{break_stmt, into_block, labeled};
use crate::context::PassContext;
use crate::error::InvariantViolation;

pub fn rewrite_continues(program: &mut ast::Program, cx: &mut PassContext) {
    program.visit_mut_with(&mut ContinueRewriter {
        cx,
        targets: Vec::new(),
    });
}

/// An enclosing statement a `continue` may resolve through.
struct Target {
    /// Set for labeled statements.
    label: Option<String>,
    is_loop: bool,
    /// Body label, allocated by the first `continue` that targets this loop.
    body_label: Option<ast::Ident>,
}

pub struct ContinueRewriter<'a> {
    cx: &'a mut PassContext,
    targets: Vec<Target>,
}

impl ContinueRewriter<'_> {
    fn resolve(&self, label: Option<&ast::Ident>) -> Result<usize, InvariantViolation> {
        match label {
            None => self
                .targets
                .iter()
                .rposition(|t| t.is_loop)
                .ok_or(InvariantViolation::OrphanContinue),
            Some(label) => {
                let unresolved = || InvariantViolation::UnresolvedLabel {
                    keyword: "continue",
                    label: label.sym.to_string(),
                };
                let labeled = self
                    .targets
                    .iter()
                    .rposition(|t| t.label.as_deref() == Some(&*label.sym))
                    .ok_or_else(unresolved)?;
                self.targets[labeled..]
                    .iter()
                    .position(|t| t.is_loop)
                    .map(|offset| labeled + offset)
                    .ok_or_else(unresolved)
            }
        }
    }

    fn rewrite_continue(&mut self, stmt: &mut ast::Stmt) {
        let ast::Stmt::Continue(cont) = stmt else {
            return;
        };
        let span = cont.span;
        let index = match self.resolve(cont.label.as_ref()) {
            Ok(index) => index,
            Err(violation) => {
                self.cx.violation(violation, span);
                return;
            }
        };

        let cx = &mut *self.cx;
        let label = self.targets[index]
            .body_label
            .get_or_insert_with(|| cx.names.fresh_label("L"))
            .clone();
        tracing::debug!(label = %label.sym, "continue rewritten to break");
        *stmt = break_stmt(Some(label));
    }

    fn with_fresh_targets(&mut self, f: impl FnOnce(&mut Self)) {
        let saved = std::mem::take(&mut self.targets);
        f(self);
        self.targets = saved;
    }
}

fn loop_body(stmt: &mut ast::Stmt) -> Option<&mut Box<ast::Stmt>> {
    match stmt {
        ast::Stmt::While(s) => Some(&mut s.body),
        ast::Stmt::DoWhile(s) => Some(&mut s.body),
        ast::Stmt::For(s) => Some(&mut s.body),
        ast::Stmt::ForIn(s) => Some(&mut s.body),
        ast::Stmt::ForOf(s) => Some(&mut s.body),
        _ => None,
    }
}

impl VisitMut for ContinueRewriter<'_> {
    fn visit_mut_stmt(&mut self, stmt: &mut ast::Stmt) {
        match stmt {
            ast::Stmt::Labeled(labeled_stmt) => {
                self.targets.push(Target {
                    label: Some(labeled_stmt.label.sym.to_string()),
                    is_loop: false,
                    body_label: None,
                });
                labeled_stmt.body.visit_mut_with(self);
                self.targets.pop();
            }
            ast::Stmt::Continue(_) => self.rewrite_continue(stmt),
            _ => {
                if loop_body(stmt).is_none() {
                    stmt.visit_mut_children_with(self);
                    return;
                }

                self.targets.push(Target {
                    label: None,
                    is_loop: true,
                    body_label: None,
                });
                stmt.visit_mut_children_with(self);
                let target = self.targets.pop();

                if let (Some(label), Some(body)) =
                    (target.and_then(|t| t.body_label), loop_body(stmt))
                {
                    let inner = into_block((**body).take());
                    **body = labeled(label, ast::Stmt::Block(inner));
                }
            }
        }
    }

    fn visit_mut_function(&mut self, n: &mut ast::Function) {
        self.with_fresh_targets(|this| n.visit_mut_children_with(this));
    }

    fn visit_mut_arrow_expr(&mut self, n: &mut ast::ArrowExpr) {
        self.with_fresh_targets(|this| n.visit_mut_children_with(this));
    }

    fn visit_mut_constructor(&mut self, n: &mut ast::Constructor) {
        self.with_fresh_targets(|this| n.visit_mut_children_with(this));
    }

    fn visit_mut_getter_prop(&mut self, n: &mut ast::GetterProp) {
        self.with_fresh_targets(|this| n.visit_mut_children_with(this));
    }

    fn visit_mut_setter_prop(&mut self, n: &mut ast::SetterProp) {
        self.with_fresh_targets(|this| n.visit_mut_children_with(this));
    }

    fn visit_mut_static_block(&mut self, n: &mut ast::StaticBlock) {
        self.with_fresh_targets(|this| n.visit_mut_children_with(this));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_pass, run_pass};
    use zs_ast::DiagnosticKind;

    fn check(input: &str, expected: &str) {
        assert_pass(rewrite_continues, input, expected);
    }

    #[test]
    fn bare_continue_breaks_the_body_block() {
        check(
            "while (x) { if (y) continue; f(); }",
            "while (x) L: { if (y) break L; f(); }",
        );
    }

    #[test]
    fn loops_without_continue_are_untouched() {
        check(
            "for (let i = 0; i < n; i++) { if (i) break; }",
            "for (let i = 0; i < n; i++) { if (i) break; }",
        );
    }

    #[test]
    fn bare_continue_targets_the_innermost_loop() {
        check(
            "outer: while (o) { while (t) { continue; } }",
            "outer: while (o) { while (t) L: { break L; } }",
        );
    }

    #[test]
    fn labeled_continue_follows_label_chains() {
        check(
            "a: b: for (;;) { for (;;) { continue a; } }",
            "a: b: for (;;) L: { for (;;) { break L; } }",
        );
    }

    #[test]
    fn continues_to_one_loop_share_a_label() {
        check(
            "do { if (a) continue; if (b) continue; } while (c);",
            "do L: { if (a) break L; if (b) break L; } while (c);",
        );
    }

    #[test]
    fn non_block_bodies_are_wrapped() {
        check(
            "for (const k in o) continue;",
            "for (const k in o) L: { break L; }",
        );
    }

    #[test]
    fn continue_inside_switch_targets_the_loop() {
        check(
            "for (x of xs) { switch (x) { case 1: continue; } }",
            "for (x of xs) L: { switch (x) { case 1: break L; } }",
        );
    }

    #[test]
    fn functions_start_a_fresh_target_stack() {
        check(
            "while (a) { items.forEach(function () { for (;;) continue; }); continue; }",
            "while (a) L1: { items.forEach(function () { for (;;) L: { break L; } }); break L1; }",
        );
    }

    #[test]
    fn label_names_avoid_the_input() {
        check(
            "L: while (x) { continue L; }",
            "L: while (x) L1: { break L1; }",
        );
    }

    #[test]
    fn orphan_continue_is_an_invariant_violation() {
        let mut program = crate::test_util::parse_program("f();");
        let mut cx = PassContext::new(&program, Default::default());
        let orphan = ast::Stmt::Continue(ast::ContinueStmt {
            span: swc_common::DUMMY_SP,
            label: None,
        });
        if let ast::Program::Module(module) = &mut program {
            module.body.push(ast::ModuleItem::Stmt(orphan));
        }
        rewrite_continues(&mut program, &mut cx);
        assert_eq!(cx.diagnostics.len(), 1);
        assert_eq!(
            cx.diagnostics[0].kind,
            DiagnosticKind::InternalInvariantViolation
        );
    }

    #[test]
    fn rewritten_code_reparses() {
        let (code, diagnostics) =
            run_pass("x: for (;;) { y: for (;;) { continue x; continue y; } }", rewrite_continues);
        assert!(diagnostics.is_empty());
        assert!(code.contains("break L"));
        assert!(code.contains("break L1"));
    }
}
