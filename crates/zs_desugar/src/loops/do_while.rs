use swc_ecma_ast as ast;

use super::labeled_body;
use crate::builder::{bool_lit, break_stmt, if_stmt, not, while_stmt};
use crate::context::PassContext;

/// `do body while (test)` → `while (true) { L: { body } if (!test) break; }`
pub(super) fn lower_do_while(stmt: ast::DoWhileStmt, cx: &mut PassContext) -> ast::Stmt {
    let ast::DoWhileStmt { span, test, body } = stmt;
    let body = labeled_body(body, cx);
    let exit = if_stmt(not(test), break_stmt(None), None);
    tracing::debug!("lowered do-while loop");
    while_stmt(span, bool_lit(true), vec![body, exit])
}
