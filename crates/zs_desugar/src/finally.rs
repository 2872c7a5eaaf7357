//! Finally eliminator.
//!
//! ```js
//! try { A } catch (p) { B } finally { F }
//! // becomes
//! {
//!   let threw = false;
//!   let err;
//!   try { A } catch (p) { try { B } catch (e) { threw = true; err = e; } }
//!   { F }
//!   if (threw) throw err;
//! }
//! ```
//!
//! A `return`, `break` or `continue` that leaves `A` or `B` skips `F` in the
//! rewritten code. Such exits are reported as known limitations.

use swc_common::{util::take::Take, Span, DUMMY_SP};
use swc_ecma_ast as ast;
use swc_ecma_visit::{Visit, VisitMut, VisitMutWith, VisitWith};

use crate::builder::{
    assign_to, block, block_stmt, bool_lit, expr_stmt, ident, if_stmt, throw_stmt, var_decl,
};
use crate::context::PassContext;

pub fn eliminate_finally(program: &mut ast::Program, cx: &mut PassContext) {
    program.visit_mut_with(&mut FinallyEliminator { cx });
}

pub struct FinallyEliminator<'a> {
    cx: &'a mut PassContext,
}

impl VisitMut for FinallyEliminator<'_> {
    fn visit_mut_stmt(&mut self, stmt: &mut ast::Stmt) {
        stmt.visit_mut_children_with(self);

        let ast::Stmt::Try(try_stmt) = stmt else {
            return;
        };
        if try_stmt.finalizer.is_none() {
            return;
        }

        for (span, exit) in early_exits(try_stmt) {
            self.cx.limitation(
                span,
                format!("`{exit}` leaves the `try` without running its `finally` block"),
            );
        }

        if let ast::Stmt::Try(try_stmt) = stmt.take() {
            *stmt = lower_try(*try_stmt, self.cx);
        }
    }
}

fn lower_try(try_stmt: ast::TryStmt, cx: &mut PassContext) -> ast::Stmt {
    let ast::TryStmt {
        span,
        block: protected,
        handler,
        finalizer,
    } = try_stmt;

    let Some(finalizer) = finalizer else {
        return ast::Stmt::Try(Box::new(ast::TryStmt {
            span,
            block: protected,
            handler,
            finalizer: None,
        }));
    };

    let threw = cx.names.fresh_name("threw");
    let err = cx.names.fresh_name("err");
    let caught = cx.names.fresh_name("e");

    let record = ast::CatchClause {
        span: DUMMY_SP,
        param: Some(ast::Pat::Ident(caught.clone().into())),
        body: block(vec![
            expr_stmt(assign_to(&threw, bool_lit(true))),
            expr_stmt(assign_to(&err, ident(&caught))),
        ]),
    };

    let guarded = match handler {
        None => ast::TryStmt {
            span: DUMMY_SP,
            block: protected,
            handler: Some(record),
            finalizer: None,
        },
        Some(ast::CatchClause {
            span: catch_span,
            param,
            body,
        }) => {
            let inner = ast::Stmt::Try(Box::new(ast::TryStmt {
                span: DUMMY_SP,
                block: body,
                handler: Some(record),
                finalizer: None,
            }));
            ast::TryStmt {
                span: DUMMY_SP,
                block: protected,
                handler: Some(ast::CatchClause {
                    span: catch_span,
                    param,
                    body: block(vec![inner]),
                }),
                finalizer: None,
            }
        }
    };

    tracing::debug!(threw = %threw.sym, "lowered try/finally");
    block_stmt(
        span,
        vec![
            var_decl(ast::VarDeclKind::Let, &threw, Some(bool_lit(false))),
            var_decl(ast::VarDeclKind::Let, &err, None),
            ast::Stmt::Try(Box::new(guarded)),
            ast::Stmt::Block(finalizer),
            if_stmt(ident(&threw), throw_stmt(ident(&err)), None),
        ],
    )
}

/// `return`, `break` and `continue` statements that leave the protected
/// block or the handler of `try_stmt`.
fn early_exits(try_stmt: &ast::TryStmt) -> Vec<(Span, &'static str)> {
    let mut finder = ExitFinder::default();
    try_stmt.block.visit_with(&mut finder);
    if let Some(handler) = &try_stmt.handler {
        handler.body.visit_with(&mut finder);
    }
    finder.exits
}

#[derive(Default)]
struct ExitFinder {
    labels: Vec<String>,
    loops: usize,
    breakable: usize,
    exits: Vec<(Span, &'static str)>,
}

impl ExitFinder {
    fn has_label(&self, label: &ast::Ident) -> bool {
        self.labels.iter().any(|l| *l == *label.sym)
    }

    fn in_loop(&mut self, f: impl FnOnce(&mut Self)) {
        self.loops += 1;
        self.breakable += 1;
        f(self);
        self.loops -= 1;
        self.breakable -= 1;
    }
}

impl Visit for ExitFinder {
    fn visit_return_stmt(&mut self, n: &ast::ReturnStmt) {
        self.exits.push((n.span, "return"));
    }

    fn visit_break_stmt(&mut self, n: &ast::BreakStmt) {
        let escapes = match &n.label {
            None => self.breakable == 0,
            Some(label) => !self.has_label(label),
        };
        if escapes {
            self.exits.push((n.span, "break"));
        }
    }

    fn visit_continue_stmt(&mut self, n: &ast::ContinueStmt) {
        let escapes = match &n.label {
            None => self.loops == 0,
            Some(label) => !self.has_label(label),
        };
        if escapes {
            self.exits.push((n.span, "continue"));
        }
    }

    fn visit_labeled_stmt(&mut self, n: &ast::LabeledStmt) {
        self.labels.push(n.label.sym.to_string());
        n.body.visit_with(self);
        self.labels.pop();
    }

    fn visit_while_stmt(&mut self, n: &ast::WhileStmt) {
        self.in_loop(|this| n.visit_children_with(this));
    }

    fn visit_do_while_stmt(&mut self, n: &ast::DoWhileStmt) {
        self.in_loop(|this| n.visit_children_with(this));
    }

    fn visit_for_stmt(&mut self, n: &ast::ForStmt) {
        self.in_loop(|this| n.visit_children_with(this));
    }

    fn visit_for_in_stmt(&mut self, n: &ast::ForInStmt) {
        self.in_loop(|this| n.visit_children_with(this));
    }

    fn visit_for_of_stmt(&mut self, n: &ast::ForOfStmt) {
        self.in_loop(|this| n.visit_children_with(this));
    }

    fn visit_switch_stmt(&mut self, n: &ast::SwitchStmt) {
        self.breakable += 1;
        n.visit_children_with(self);
        self.breakable -= 1;
    }

    fn visit_function(&mut self, _: &ast::Function) {}

    fn visit_arrow_expr(&mut self, _: &ast::ArrowExpr) {}

    fn visit_class(&mut self, _: &ast::Class) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_pass, run_pass};
    use zs_ast::DiagnosticKind;

    fn check(input: &str, expected: &str) {
        assert_pass(eliminate_finally, input, expected);
    }

    #[test]
    fn try_finally() {
        check(
            "try { a(); } finally { b(); }",
            "{
                let threw = false;
                let err;
                try { a(); } catch (e) { threw = true; err = e; }
                { b(); }
                if (threw) throw err;
            }",
        );
    }

    #[test]
    fn try_catch_finally_guards_the_handler() {
        check(
            "try { a(); } catch (x) { h(x); } finally { b(); }",
            "{
                let threw = false;
                let err;
                try { a(); } catch (x) { try { h(x); } catch (e) { threw = true; err = e; } }
                { b(); }
                if (threw) throw err;
            }",
        );
    }

    #[test]
    fn optional_catch_binding() {
        check(
            "try { a(); } catch { b(); } finally { c(); }",
            "{
                let threw = false;
                let err;
                try { a(); } catch { try { b(); } catch (e) { threw = true; err = e; } }
                { c(); }
                if (threw) throw err;
            }",
        );
    }

    #[test]
    fn nested_tries_are_lowered_inside_out() {
        check(
            "try { try { a(); } finally { b(); } } finally { c(); }",
            "{
                let threw1 = false;
                let err1;
                try {
                    {
                        let threw = false;
                        let err;
                        try { a(); } catch (e) { threw = true; err = e; }
                        { b(); }
                        if (threw) throw err;
                    }
                } catch (e1) { threw1 = true; err1 = e1; }
                { c(); }
                if (threw1) throw err1;
            }",
        );
    }

    #[test]
    fn names_avoid_the_input() {
        check(
            "try { e(threw); } finally {}",
            "{
                let threw1 = false;
                let err;
                try { e(threw); } catch (e1) { threw1 = true; err = e1; }
                {}
                if (threw1) throw err;
            }",
        );
    }

    #[test]
    fn try_catch_is_untouched() {
        check("try { a(); } catch (e) { b(e); }", "try { a(); } catch (e) { b(e); }");
    }

    #[test]
    fn early_exits_are_reported_as_limitations() {
        let (_, diagnostics) = run_pass(
            "function f() { try { return 1; } finally { g(); } }",
            eliminate_finally,
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::KnownLimitation);
        assert!(diagnostics[0].message.contains("`return`"));
        assert!(!diagnostics[0].is_error());

        let (_, diagnostics) = run_pass(
            "out: while (x) { try { if (y) break; continue out; } finally { g(); } }",
            eliminate_finally,
        );
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn exits_that_stay_inside_the_try_are_fine() {
        let (_, diagnostics) = run_pass(
            "try { while (x) { if (y) break; continue; } inner: { break inner; } g(() => { return 1; }); } finally { h(); }",
            eliminate_finally,
        );
        assert!(diagnostics.is_empty());
    }
}
