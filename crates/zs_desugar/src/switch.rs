//! Switch desugarer.
//!
//! A `switch` becomes a labeled block of `if` statements. Unlabeled `break`s
//! that exit the switch become `break S`. The discriminant is evaluated
//! exactly once.
//!
//! With `default` absent or last, a `matched` flag tracks fall-through:
//!
//! ```js
//! S: {
//!   let matched = false;
//!   let disc = x;
//!   if (!matched && disc === 1) matched = true;
//!   if (matched) { a(); }
//!   matched = true;
//!   if (matched) { c(); break S; }
//! }
//! ```
//!
//! A `default` in the middle is only taken after every later test failed, so
//! the entry case is selected first and bodies run by index:
//!
//! ```js
//! S: {
//!   let disc = x;
//!   let caseIndex = 1;
//!   if (disc === 1) caseIndex = 0; else if (disc === 2) caseIndex = 2;
//!   if (caseIndex <= 0) { a(); }
//!   if (caseIndex <= 1) { c(); }
//!   if (caseIndex <= 2) { b(); }
//! }
//! ```

use swc_common::{util::take::Take, Span, DUMMY_SP};
use swc_ecma_ast as ast;
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::builder::{
    assign_to, bin, block, block_stmt, bool_lit, expr_stmt, ident, if_stmt, labeled, not,
    num_lit, undefined, var_decl, var_decl_pat,
};
use crate::context::PassContext;

pub fn desugar_switches(program: &mut ast::Program, cx: &mut PassContext) {
    program.visit_mut_with(&mut SwitchDesugarer { cx });
}

pub struct SwitchDesugarer<'a> {
    cx: &'a mut PassContext,
}

impl VisitMut for SwitchDesugarer<'_> {
    fn visit_mut_stmt(&mut self, stmt: &mut ast::Stmt) {
        stmt.visit_mut_children_with(self);

        let ast::Stmt::Switch(switch) = stmt else {
            return;
        };
        if let Some((span, reason)) = unsupported_case_body(switch) {
            self.cx.unsupported(span, reason);
            return;
        }
        if let ast::Stmt::Switch(switch) = stmt.take() {
            *stmt = lower_switch(switch, self.cx);
        }
    }
}

fn unsupported_case_body(switch: &ast::SwitchStmt) -> Option<(Span, &'static str)> {
    switch
        .cases
        .iter()
        .flat_map(|case| &case.cons)
        .find_map(|stmt| match stmt {
            ast::Stmt::Decl(ast::Decl::Using(using)) => {
                Some((using.span, "`using` declaration in a case body"))
            }
            ast::Stmt::Decl(ast::Decl::Var(var))
                if var.kind != ast::VarDeclKind::Var
                    && var.decls.iter().any(|d| !matches!(d.name, ast::Pat::Ident(_))) =>
            {
                Some((var.span, "destructuring lexical declaration in a case body"))
            }
            _ => None,
        })
}

fn lower_switch(switch: ast::SwitchStmt, cx: &mut PassContext) -> ast::Stmt {
    let ast::SwitchStmt {
        span,
        discriminant,
        mut cases,
    } = switch;

    if cases.is_empty() {
        return expr_stmt(discriminant);
    }

    let label = cx.names.fresh_label("S");
    let mut retarget = BreakRetargeter { label: &label };
    let mut hoisted = Hoisted::default();
    for case in &mut cases {
        case.cons.visit_mut_with(&mut retarget);
        hoisted.collect(&mut case.cons);
    }

    let (mut stmts, chain) = match cases.iter().position(|c| c.test.is_none()) {
        Some(default) if default + 1 < cases.len() => index_form(discriminant, default, cases, cx),
        _ => flag_form(discriminant, cases, cx),
    };

    if hoisted.is_empty() {
        stmts.extend(chain);
    } else {
        let mut scoped = hoisted.into_stmts();
        scoped.extend(chain);
        stmts.push(ast::Stmt::Block(block(scoped)));
    }

    tracing::debug!(label = %label.sym, "lowered switch");
    labeled(label, block_stmt(span, stmts))
}

/// Returns the declarations that evaluate the discriminant and the
/// statements that select and run the cases.
fn flag_form(
    discriminant: Box<ast::Expr>,
    cases: Vec<ast::SwitchCase>,
    cx: &mut PassContext,
) -> (Vec<ast::Stmt>, Vec<ast::Stmt>) {
    let matched = cx.names.fresh_name("matched");
    let disc = cx.names.fresh_name("disc");

    let head = vec![
        var_decl(ast::VarDeclKind::Let, &matched, Some(bool_lit(false))),
        var_decl(ast::VarDeclKind::Let, &disc, Some(discriminant)),
    ];

    let mut chain = Vec::new();
    for case in cases {
        let set_matched = expr_stmt(assign_to(&matched, bool_lit(true)));
        match case.test {
            Some(test) => {
                let enters = bin(
                    ast::BinaryOp::LogicalAnd,
                    not(ident(&matched)),
                    bin(ast::BinaryOp::EqEqEq, ident(&disc), test),
                );
                chain.push(if_stmt(enters, set_matched, None));
            }
            None => chain.push(set_matched),
        }
        if !case.cons.is_empty() {
            chain.push(if_stmt(ident(&matched), block_stmt(DUMMY_SP, case.cons), None));
        }
    }
    (head, chain)
}

fn index_form(
    discriminant: Box<ast::Expr>,
    default: usize,
    cases: Vec<ast::SwitchCase>,
    cx: &mut PassContext,
) -> (Vec<ast::Stmt>, Vec<ast::Stmt>) {
    let disc = cx.names.fresh_name("disc");
    let case_index = cx.names.fresh_name("caseIndex");

    let head = vec![
        var_decl(ast::VarDeclKind::Let, &disc, Some(discriminant)),
        var_decl(ast::VarDeclKind::Let, &case_index, Some(num_lit(default))),
    ];

    let mut tests = Vec::new();
    let mut bodies = Vec::new();
    for (index, case) in cases.into_iter().enumerate() {
        if let Some(test) = case.test {
            tests.push((index, test));
        }
        bodies.push((index, case.cons));
    }

    let select = tests.into_iter().rev().fold(None, |alt, (index, test)| {
        Some(if_stmt(
            bin(ast::BinaryOp::EqEqEq, ident(&disc), test),
            expr_stmt(assign_to(&case_index, num_lit(index))),
            alt,
        ))
    });

    let mut chain: Vec<ast::Stmt> = select.into_iter().collect();
    for (index, cons) in bodies {
        if cons.is_empty() {
            continue;
        }
        let reached = bin(ast::BinaryOp::LtEq, ident(&case_index), num_lit(index));
        chain.push(if_stmt(reached, block_stmt(DUMMY_SP, cons), None));
    }
    (head, chain)
}

/// Lexical declarations at the top level of case bodies. The switch body is
/// one scope, so they must stay visible across the `if` blocks.
#[derive(Default)]
struct Hoisted {
    names: Vec<ast::Ident>,
    functions: Vec<ast::Stmt>,
}

impl Hoisted {
    fn is_empty(&self) -> bool {
        self.names.is_empty() && self.functions.is_empty()
    }

    /// Move declarations out of `cons`, leaving assignments in their place.
    fn collect(&mut self, cons: &mut Vec<ast::Stmt>) {
        let mut out = Vec::with_capacity(cons.len());
        for stmt in cons.drain(..) {
            match stmt {
                ast::Stmt::Decl(ast::Decl::Var(var)) if var.kind != ast::VarDeclKind::Var => {
                    let kind = var.kind;
                    for declarator in var.decls {
                        match declarator.name {
                            ast::Pat::Ident(binding) => {
                                let value = declarator.init.unwrap_or_else(undefined);
                                out.push(expr_stmt(assign_to(&binding.id, value)));
                                self.names.push(binding.id);
                            }
                            other => out.push(var_decl_pat(
                                declarator.span,
                                kind,
                                other,
                                declarator.init,
                            )),
                        }
                    }
                }
                ast::Stmt::Decl(ast::Decl::Class(class)) => {
                    let ast::ClassDecl { ident: name, class, .. } = class;
                    let expr = Box::new(ast::Expr::Class(ast::ClassExpr {
                        ident: Some(name.clone()),
                        class,
                    }));
                    out.push(expr_stmt(assign_to(&name, expr)));
                    self.names.push(name);
                }
                ast::Stmt::Decl(ast::Decl::Fn(function)) => {
                    self.functions.push(ast::Stmt::Decl(ast::Decl::Fn(function)));
                }
                other => out.push(other),
            }
        }
        *cons = out;
    }

    fn into_stmts(self) -> Vec<ast::Stmt> {
        let mut stmts: Vec<ast::Stmt> = self
            .names
            .iter()
            .map(|name| var_decl(ast::VarDeclKind::Let, name, None))
            .collect();
        stmts.extend(self.functions);
        stmts
    }
}

/// Points unlabeled `break`s that exit the switch at its new label.
struct BreakRetargeter<'a> {
    label: &'a ast::Ident,
}

impl VisitMut for BreakRetargeter<'_> {
    fn visit_mut_stmt(&mut self, stmt: &mut ast::Stmt) {
        match stmt {
            ast::Stmt::Break(b) if b.label.is_none() => b.label = Some(self.label.clone()),
            ast::Stmt::While(_)
            | ast::Stmt::DoWhile(_)
            | ast::Stmt::For(_)
            | ast::Stmt::ForIn(_)
            | ast::Stmt::ForOf(_)
            | ast::Stmt::Switch(_) => {}
            _ => stmt.visit_mut_children_with(self),
        }
    }

    fn visit_mut_function(&mut self, _: &mut ast::Function) {}

    fn visit_mut_arrow_expr(&mut self, _: &mut ast::ArrowExpr) {}

    fn visit_mut_class(&mut self, _: &mut ast::Class) {}
}
