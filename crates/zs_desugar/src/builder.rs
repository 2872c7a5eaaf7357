//! Constructors for the synthetic nodes the passes emit.
//!
//! Synthetic nodes carry `DUMMY_SP`. The printer does not insert
//! parentheses, so every constructor that nests an expression under an
//! operator wraps it in a `ParenExpr` when its precedence requires one.

use swc_common::{Span, SyntaxContext, DUMMY_SP};
use swc_ecma_ast as ast;

pub fn ident(id: &ast::Ident) -> Box<ast::Expr> {
    Box::new(ast::Expr::Ident(id.clone()))
}

pub fn global(name: &str) -> Box<ast::Expr> {
    Box::new(ast::Expr::Ident(ast::Ident::new_no_ctxt(name.into(), DUMMY_SP)))
}

pub fn bool_lit(value: bool) -> Box<ast::Expr> {
    Box::new(ast::Expr::Lit(ast::Lit::Bool(ast::Bool {
        span: DUMMY_SP,
        value,
    })))
}

pub fn num_lit(value: usize) -> Box<ast::Expr> {
    Box::new(ast::Expr::Lit(ast::Lit::Num(ast::Number {
        span: DUMMY_SP,
        value: value as f64,
        raw: None,
    })))
}

/// `void 0`
pub fn undefined() -> Box<ast::Expr> {
    unary(ast::UnaryOp::Void, num_lit(0))
}

pub fn unary(op: ast::UnaryOp, arg: Box<ast::Expr>) -> Box<ast::Expr> {
    Box::new(ast::Expr::Unary(ast::UnaryExpr {
        span: DUMMY_SP,
        op,
        arg: paren_min(arg, UNARY),
    }))
}

pub fn not(arg: Box<ast::Expr>) -> Box<ast::Expr> {
    unary(ast::UnaryOp::Bang, arg)
}

pub fn bin(op: ast::BinaryOp, left: Box<ast::Expr>, right: Box<ast::Expr>) -> Box<ast::Expr> {
    let p = bin_precedence(op);
    Box::new(ast::Expr::Bin(ast::BinExpr {
        span: DUMMY_SP,
        op,
        left: paren_min(left, p),
        right: paren_min(right, p + 1),
    }))
}

pub fn cond(test: Box<ast::Expr>, cons: Box<ast::Expr>, alt: Box<ast::Expr>) -> Box<ast::Expr> {
    Box::new(ast::Expr::Cond(ast::CondExpr {
        span: DUMMY_SP,
        test: paren_min(test, COND + 1),
        cons: paren_min(cons, ASSIGN),
        alt: paren_min(alt, ASSIGN),
    }))
}

/// `obj.name`
pub fn member(obj: Box<ast::Expr>, name: &str) -> Box<ast::Expr> {
    member_prop(
        obj,
        ast::MemberProp::Ident(ast::IdentName::new(name.into(), DUMMY_SP)),
    )
}

/// `obj[key]`
pub fn computed(obj: Box<ast::Expr>, key: Box<ast::Expr>) -> Box<ast::Expr> {
    member_prop(
        obj,
        ast::MemberProp::Computed(ast::ComputedPropName {
            span: DUMMY_SP,
            expr: key,
        }),
    )
}

pub fn member_prop(obj: Box<ast::Expr>, prop: ast::MemberProp) -> Box<ast::Expr> {
    Box::new(ast::Expr::Member(ast::MemberExpr {
        span: DUMMY_SP,
        obj: paren_min(obj, MEMBER),
        prop,
    }))
}

pub fn call(callee: Box<ast::Expr>, args: Vec<Box<ast::Expr>>) -> Box<ast::Expr> {
    Box::new(ast::Expr::Call(ast::CallExpr {
        span: DUMMY_SP,
        callee: ast::Callee::Expr(paren_min(callee, MEMBER)),
        args: args
            .into_iter()
            .map(|expr| ast::ExprOrSpread {
                spread: None,
                expr: paren_min(expr, ASSIGN),
            })
            .collect(),
        type_args: None,
        ..Default::default()
    }))
}

pub fn assign(left: ast::AssignTarget, right: Box<ast::Expr>) -> Box<ast::Expr> {
    Box::new(ast::Expr::Assign(ast::AssignExpr {
        span: DUMMY_SP,
        op: ast::AssignOp::Assign,
        left,
        right: paren_min(right, ASSIGN),
    }))
}

pub fn assign_to(id: &ast::Ident, right: Box<ast::Expr>) -> Box<ast::Expr> {
    assign(
        ast::AssignTarget::Simple(ast::SimpleAssignTarget::Ident(id.clone().into())),
        right,
    )
}

pub fn empty_object() -> Box<ast::Expr> {
    Box::new(ast::Expr::Object(ast::ObjectLit {
        span: DUMMY_SP,
        props: Vec::new(),
    }))
}

/// An expression statement, parenthesised when the expression would
/// otherwise be read as a block, declaration or pattern.
pub fn expr_stmt(expr: Box<ast::Expr>) -> ast::Stmt {
    let expr = if starts_ambiguously(&expr) {
        paren(expr)
    } else {
        expr
    };
    ast::Stmt::Expr(ast::ExprStmt {
        span: DUMMY_SP,
        expr,
    })
}

pub fn var_decl(kind: ast::VarDeclKind, id: &ast::Ident, init: Option<Box<ast::Expr>>) -> ast::Stmt {
    var_decl_pat(
        DUMMY_SP,
        kind,
        ast::Pat::Ident(id.clone().into()),
        init,
    )
}

pub fn var_decl_pat(
    span: Span,
    kind: ast::VarDeclKind,
    name: ast::Pat,
    init: Option<Box<ast::Expr>>,
) -> ast::Stmt {
    ast::Stmt::Decl(ast::Decl::Var(Box::new(ast::VarDecl {
        span,
        ctxt: SyntaxContext::empty(),
        kind,
        declare: false,
        decls: vec![ast::VarDeclarator {
            span,
            name,
            init,
            definite: false,
        }],
    })))
}

pub fn block(stmts: Vec<ast::Stmt>) -> ast::BlockStmt {
    ast::BlockStmt {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        stmts,
    }
}

pub fn block_stmt(span: Span, stmts: Vec<ast::Stmt>) -> ast::Stmt {
    ast::Stmt::Block(ast::BlockStmt {
        span,
        ctxt: SyntaxContext::empty(),
        stmts,
    })
}

/// Reuse `stmt` if it already is a block, otherwise wrap it in one.
pub fn into_block(stmt: ast::Stmt) -> ast::BlockStmt {
    match stmt {
        ast::Stmt::Block(block) => block,
        other => block(vec![other]),
    }
}

pub fn labeled(label: ast::Ident, body: ast::Stmt) -> ast::Stmt {
    ast::Stmt::Labeled(ast::LabeledStmt {
        span: DUMMY_SP,
        label,
        body: Box::new(body),
    })
}

pub fn break_stmt(label: Option<ast::Ident>) -> ast::Stmt {
    ast::Stmt::Break(ast::BreakStmt {
        span: DUMMY_SP,
        label,
    })
}

pub fn if_stmt(test: Box<ast::Expr>, cons: ast::Stmt, alt: Option<ast::Stmt>) -> ast::Stmt {
    ast::Stmt::If(ast::IfStmt {
        span: DUMMY_SP,
        test,
        cons: Box::new(cons),
        alt: alt.map(Box::new),
    })
}

pub fn while_stmt(span: Span, test: Box<ast::Expr>, body: Vec<ast::Stmt>) -> ast::Stmt {
    ast::Stmt::While(ast::WhileStmt {
        span,
        test,
        body: Box::new(ast::Stmt::Block(block(body))),
    })
}

pub fn throw_stmt(arg: Box<ast::Expr>) -> ast::Stmt {
    ast::Stmt::Throw(ast::ThrowStmt {
        span: DUMMY_SP,
        arg,
    })
}

/// Convert a for-in/of head or pattern into an assignment target.
pub fn pat_to_assign_target(pat: ast::Pat) -> Result<ast::AssignTarget, ast::Pat> {
    use ast::{AssignTarget, AssignTargetPat, SimpleAssignTarget};

    match pat {
        ast::Pat::Ident(id) => Ok(AssignTarget::Simple(SimpleAssignTarget::Ident(id))),
        ast::Pat::Array(a) => Ok(AssignTarget::Pat(AssignTargetPat::Array(a))),
        ast::Pat::Object(o) => Ok(AssignTarget::Pat(AssignTargetPat::Object(o))),
        ast::Pat::Expr(expr) => match *expr {
            ast::Expr::Ident(id) => Ok(AssignTarget::Simple(SimpleAssignTarget::Ident(id.into()))),
            ast::Expr::Member(m) => Ok(AssignTarget::Simple(SimpleAssignTarget::Member(m))),
            ast::Expr::SuperProp(s) => Ok(AssignTarget::Simple(SimpleAssignTarget::SuperProp(s))),
            ast::Expr::Paren(p) => Ok(AssignTarget::Simple(SimpleAssignTarget::Paren(p))),
            other => Err(ast::Pat::Expr(Box::new(other))),
        },
        other => Err(other),
    }
}

const ASSIGN: u8 = 1;
const COND: u8 = 2;
const UNARY: u8 = 14;
const MEMBER: u8 = 17;

fn paren(expr: Box<ast::Expr>) -> Box<ast::Expr> {
    Box::new(ast::Expr::Paren(ast::ParenExpr {
        span: DUMMY_SP,
        expr,
    }))
}

fn paren_min(expr: Box<ast::Expr>, min: u8) -> Box<ast::Expr> {
    if precedence(&expr) < min {
        paren(expr)
    } else {
        expr
    }
}

fn precedence(expr: &ast::Expr) -> u8 {
    match expr {
        ast::Expr::Seq(_) => 0,
        ast::Expr::Assign(_) | ast::Expr::Arrow(_) | ast::Expr::Yield(_) => ASSIGN,
        ast::Expr::Cond(_) => COND,
        ast::Expr::Bin(b) => bin_precedence(b.op),
        ast::Expr::Unary(_) | ast::Expr::Await(_) => UNARY,
        ast::Expr::Update(_) => 15,
        ast::Expr::New(n) if n.args.is_none() => 16,
        ast::Expr::OptChain(_) => 16,
        _ => MEMBER,
    }
}

fn bin_precedence(op: ast::BinaryOp) -> u8 {
    use ast::BinaryOp::*;

    match op {
        NullishCoalescing | LogicalOr => 3,
        LogicalAnd => 4,
        BitOr => 5,
        BitXor => 6,
        BitAnd => 7,
        EqEq | NotEq | EqEqEq | NotEqEq => 8,
        Lt | LtEq | Gt | GtEq | InstanceOf | In => 9,
        LShift | RShift | ZeroFillRShift => 10,
        Add | Sub => 11,
        Mul | Div | Mod => 12,
        Exp => 13,
    }
}

fn starts_ambiguously(expr: &ast::Expr) -> bool {
    match expr {
        ast::Expr::Object(_) | ast::Expr::Fn(_) | ast::Expr::Class(_) => true,
        ast::Expr::Assign(a) => matches!(
            a.left,
            ast::AssignTarget::Pat(ast::AssignTargetPat::Object(_))
        ),
        ast::Expr::Bin(b) => starts_ambiguously(&b.left),
        ast::Expr::Member(m) => starts_ambiguously(&m.obj),
        ast::Expr::Cond(c) => starts_ambiguously(&c.test),
        ast::Expr::Seq(s) => s.exprs.first().is_some_and(|e| starts_ambiguously(e)),
        ast::Expr::Call(c) => match &c.callee {
            ast::Callee::Expr(callee) => starts_ambiguously(callee),
            _ => false,
        },
        _ => false,
    }
}
