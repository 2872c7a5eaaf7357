use swc_common::DUMMY_SP;
use swc_ecma_ast as ast;

use super::{creates_closure, labeled_body};
use crate::builder::{block_stmt, bool_lit, expr_stmt, while_stmt};
use crate::context::PassContext;
use crate::var_decl::{needs_split, split_var_decl};

/// `for (init; test; update) body` → `{ init; while (test) { L: { body } update; } }`
pub(super) fn lower_for(stmt: ast::ForStmt, cx: &mut PassContext) -> ast::Stmt {
    if let Some(ast::VarDeclOrExpr::VarDecl(decl)) = &stmt.init {
        if decl.kind != ast::VarDeclKind::Var
            && (creates_closure(&*stmt.body)
                || stmt.test.as_deref().is_some_and(|e| creates_closure(e))
                || stmt.update.as_deref().is_some_and(|e| creates_closure(e)))
        {
            cx.limitation(
                stmt.span,
                "closures created in this loop share one binding for all iterations",
            );
        }
    }

    let ast::ForStmt {
        span,
        init,
        test,
        update,
        body,
    } = stmt;

    let mut prelude = match init {
        None => Vec::new(),
        Some(ast::VarDeclOrExpr::VarDecl(decl)) if needs_split(&decl) => split_var_decl(*decl, cx),
        Some(ast::VarDeclOrExpr::VarDecl(decl)) => vec![ast::Stmt::Decl(ast::Decl::Var(decl))],
        Some(ast::VarDeclOrExpr::Expr(expr)) => vec![expr_stmt(expr)],
    };

    let mut body = vec![labeled_body(body, cx)];
    if let Some(update) = update {
        body.push(expr_stmt(update));
    }
    let test = test.unwrap_or_else(|| bool_lit(true));

    tracing::debug!(with_init = !prelude.is_empty(), "lowered for loop");
    if prelude.is_empty() {
        return while_stmt(span, test, body);
    }
    prelude.push(while_stmt(DUMMY_SP, test, body));
    block_stmt(span, prelude)
}
