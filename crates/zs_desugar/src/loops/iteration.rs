//! `for-of` and `for-in` lowering.
//!
//! ```js
//! for (const x of xs) body
//! // becomes
//! {
//!   let iter = xs[Symbol.iterator]();
//!   let step;
//!   while (!(step = iter.next()).done) { const x = step.value; L: { body } }
//! }
//! ```
//!
//! `for-in` has the same shape, with the iterator produced by the configured
//! key helper instead.

use swc_common::DUMMY_SP;
use swc_ecma_ast as ast;

use super::labeled_body;
use crate::builder::{
    assign, assign_to, block_stmt, call, computed, expr_stmt, global, ident, member, not,
    pat_to_assign_target, var_decl, while_stmt,
};
use crate::context::PassContext;
use crate::var_decl::{needs_split, split_var_decl};

type Rejected<T> = (T, &'static str);

/// The per-iteration binding of a loop head.
enum Head {
    Decl(Box<ast::VarDecl>),
    Assign(ast::AssignTarget),
}

impl Head {
    fn from_for_head(head: ast::ForHead) -> Result<Self, Rejected<ast::ForHead>> {
        match head {
            ast::ForHead::VarDecl(decl) if decl.decls.len() == 1 => Ok(Head::Decl(decl)),
            ast::ForHead::VarDecl(decl) => Err((
                ast::ForHead::VarDecl(decl),
                "loop head with several declarators",
            )),
            ast::ForHead::UsingDecl(decl) => Err((
                ast::ForHead::UsingDecl(decl),
                "`using` declaration in a loop head",
            )),
            ast::ForHead::Pat(pat) => match pat_to_assign_target(*pat) {
                Ok(target) => Ok(Head::Assign(target)),
                Err(pat) => Err((
                    ast::ForHead::Pat(Box::new(pat)),
                    "unsupported assignment target in a loop head",
                )),
            },
        }
    }

    /// Statements binding `value` to the head, run at the top of each iteration.
    fn bind(self, value: Box<ast::Expr>, cx: &mut PassContext) -> Vec<ast::Stmt> {
        match self {
            Head::Decl(mut decl) => {
                if let Some(declarator) = decl.decls.first_mut() {
                    declarator.init = Some(value);
                }
                if needs_split(&decl) {
                    split_var_decl(*decl, cx)
                } else {
                    vec![ast::Stmt::Decl(ast::Decl::Var(decl))]
                }
            }
            Head::Assign(target) => vec![expr_stmt(assign(target, value))],
        }
    }
}

pub(super) fn lower_for_of(
    stmt: ast::ForOfStmt,
    cx: &mut PassContext,
) -> Result<ast::Stmt, Rejected<ast::ForOfStmt>> {
    if stmt.is_await {
        return Err((stmt, "`for await` loop"));
    }
    if cx.scopes.is_bound_at("Symbol", stmt.span) {
        return Err((stmt, "`for-of` loop where `Symbol` is a local binding"));
    }

    let ast::ForOfStmt {
        span,
        is_await,
        left,
        right,
        body,
    } = stmt;

    let head = match Head::from_for_head(left) {
        Ok(head) => head,
        Err((left, reason)) => {
            let original = ast::ForOfStmt {
                span,
                is_await,
                left,
                right,
                body,
            };
            return Err((original, reason));
        }
    };

    let iter = cx.names.fresh_name("iter");
    let init = call(computed(right, member(global("Symbol"), "iterator")), vec![]);
    tracing::debug!("lowered for-of loop");
    Ok(lower_iteration(span, iter, init, head, body, cx))
}

pub(super) fn lower_for_in(
    stmt: ast::ForInStmt,
    cx: &mut PassContext,
) -> Result<ast::Stmt, Rejected<ast::ForInStmt>> {
    if let ast::ForHead::VarDecl(decl) = &stmt.left {
        if decl.decls.iter().any(|d| d.init.is_some()) {
            return Err((stmt, "initialised `for-in` head"));
        }
    }
    if cx.scopes.is_bound_at(&cx.config.for_in_helper, stmt.span) {
        return Err((stmt, "`for-in` loop where the key helper's name is a local binding"));
    }

    let ast::ForInStmt {
        span,
        left,
        right,
        body,
    } = stmt;

    let head = match Head::from_for_head(left) {
        Ok(head) => head,
        Err((left, reason)) => {
            let original = ast::ForInStmt {
                span,
                left,
                right,
                body,
            };
            return Err((original, reason));
        }
    };

    let keys = cx.names.fresh_name("keys");
    let init = call(global(&cx.config.for_in_helper), vec![right]);
    tracing::debug!(helper = %cx.config.for_in_helper, "lowered for-in loop");
    Ok(lower_iteration(span, keys, init, head, body, cx))
}

fn lower_iteration(
    span: swc_common::Span,
    iterator: ast::Ident,
    init: Box<ast::Expr>,
    head: Head,
    body: Box<ast::Stmt>,
    cx: &mut PassContext,
) -> ast::Stmt {
    let step = cx.names.fresh_name("step");

    let mut iteration = head.bind(member(ident(&step), "value"), cx);
    iteration.push(labeled_body(body, cx));

    let next = call(member(ident(&iterator), "next"), vec![]);
    let test = not(member(assign_to(&step, next), "done"));

    block_stmt(
        span,
        vec![
            var_decl(ast::VarDeclKind::Let, &iterator, Some(init)),
            var_decl(ast::VarDeclKind::Let, &step, None),
            while_stmt(DUMMY_SP, test, iteration),
        ],
    )
}
