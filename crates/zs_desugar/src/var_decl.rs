//! Declaration normalizer.
//!
//! `let a = 1, [b, c = d] = e;` becomes one declaration per binding:
//!
//! ```js
//! let a = 1;
//! let tmp = e;
//! let b = tmp[0];
//! let tmp1 = tmp[1];
//! let c = tmp1 === void 0 ? d : tmp1;
//! ```
//!
//! Every initializer is evaluated exactly once and in source order.

use swc_common::{util::take::Take, Span, SyntaxContext, DUMMY_SP};
use swc_ecma_ast as ast;
use swc_ecma_visit::{VisitMut, VisitMutWith};

use crate::builder::{
    bin, block_stmt, call, computed, cond, empty_object, expr_stmt, global, ident, member,
    member_prop, num_lit, unary, undefined, var_decl, var_decl_pat,
};
use crate::context::PassContext;

pub fn normalize_declarations(program: &mut ast::Program, cx: &mut PassContext) {
    program.visit_mut_with(&mut DeclarationNormalizer { cx });
}

pub struct DeclarationNormalizer<'a> {
    cx: &'a mut PassContext,
}

/// Whether the declaration has several declarators or a pattern target.
pub(crate) fn needs_split(decl: &ast::VarDecl) -> bool {
    decl.decls.len() > 1
        || decl
            .decls
            .iter()
            .any(|d| !matches!(d.name, ast::Pat::Ident(_)))
}

impl VisitMut for DeclarationNormalizer<'_> {
    fn visit_mut_module_items(&mut self, items: &mut Vec<ast::ModuleItem>) {
        let mut out = Vec::with_capacity(items.len());
        for item in items.drain(..) {
            match item {
                ast::ModuleItem::Stmt(ast::Stmt::Decl(ast::Decl::Var(mut var)))
                    if needs_split(&var) =>
                {
                    var.visit_mut_children_with(self);
                    out.extend(
                        split_var_decl(*var, self.cx)
                            .into_iter()
                            .map(ast::ModuleItem::Stmt),
                    );
                }
                ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportDecl(ast::ExportDecl {
                    span,
                    decl: ast::Decl::Var(mut var),
                })) if needs_split(&var) => {
                    var.visit_mut_children_with(self);
                    for stmt in split_var_decl(*var, self.cx) {
                        out.push(self.reexport(span, stmt));
                    }
                }
                mut other => {
                    other.visit_mut_with(self);
                    out.push(other);
                }
            }
        }
        *items = out;
    }

    fn visit_mut_stmts(&mut self, stmts: &mut Vec<ast::Stmt>) {
        let mut out = Vec::with_capacity(stmts.len());
        for stmt in stmts.drain(..) {
            match stmt {
                ast::Stmt::Decl(ast::Decl::Var(mut var)) if needs_split(&var) => {
                    var.visit_mut_children_with(self);
                    out.extend(split_var_decl(*var, self.cx));
                }
                mut other => {
                    other.visit_mut_with(self);
                    out.push(other);
                }
            }
        }
        *stmts = out;
    }

    // Only reached for declarations in single-statement positions, like
    // `if (x) var a, b;`; statement lists are spliced above.
    fn visit_mut_stmt(&mut self, stmt: &mut ast::Stmt) {
        stmt.visit_mut_children_with(self);
        let ast::Stmt::Decl(ast::Decl::Var(var)) = stmt else {
            return;
        };
        if !needs_split(var) {
            return;
        }
        let span = var.span;
        if let ast::Stmt::Decl(ast::Decl::Var(var)) = stmt.take() {
            *stmt = block_stmt(span, split_var_decl(*var, self.cx));
        }
    }
}

impl DeclarationNormalizer<'_> {
    /// Bound names stay exported; temporaries become plain declarations.
    fn reexport(&self, span: Span, stmt: ast::Stmt) -> ast::ModuleItem {
        match stmt {
            ast::Stmt::Decl(ast::Decl::Var(var)) if !self.is_temporary(&var) => {
                ast::ModuleItem::ModuleDecl(ast::ModuleDecl::ExportDecl(ast::ExportDecl {
                    span,
                    decl: ast::Decl::Var(var),
                }))
            }
            other => ast::ModuleItem::Stmt(other),
        }
    }

    fn is_temporary(&self, var: &ast::VarDecl) -> bool {
        var.decls.iter().all(|d| match &d.name {
            ast::Pat::Ident(id) => self.cx.names.is_synthetic(&id.id.sym),
            _ => false,
        })
    }
}

/// Split a declaration into single-declarator, pattern-free declarations of
/// the same kind.
///
/// A declarator with an unsupported shape is reported and emitted untouched
/// as its own declaration.
pub(crate) fn split_var_decl(decl: ast::VarDecl, cx: &mut PassContext) -> Vec<ast::Stmt> {
    let ast::VarDecl {
        span,
        ctxt,
        kind,
        declare,
        decls,
    } = decl;

    let mut decomposer = Decomposer {
        kind,
        cx,
        out: Vec::new(),
    };
    for declarator in decls {
        decomposer.declarator(span, ctxt, declare, declarator);
    }
    decomposer.out
}

fn unsupported_pattern(pat: &ast::Pat) -> Option<&'static str> {
    match pat {
        ast::Pat::Ident(_) => None,
        ast::Pat::Array(array) => array.elems.iter().flatten().find_map(unsupported_pattern),
        ast::Pat::Rest(rest) => unsupported_pattern(&rest.arg),
        ast::Pat::Object(object) => object.props.iter().find_map(|prop| match prop {
            ast::ObjectPatProp::KeyValue(kv) => unsupported_pattern(&kv.value),
            ast::ObjectPatProp::Assign(_) => None,
            ast::ObjectPatProp::Rest(rest) => match &*rest.arg {
                ast::Pat::Ident(_) => None,
                _ => Some("object rest element with a non-identifier target"),
            },
        }),
        ast::Pat::Assign(assign) => unsupported_pattern(&assign.left),
        ast::Pat::Expr(_) => Some("expression used as a declaration pattern"),
        ast::Pat::Invalid(_) => Some("invalid declaration pattern"),
    }
}

fn has_object_rest(pat: &ast::Pat) -> bool {
    match pat {
        ast::Pat::Array(array) => array.elems.iter().flatten().any(has_object_rest),
        ast::Pat::Rest(rest) => has_object_rest(&rest.arg),
        ast::Pat::Object(object) => object.props.iter().any(|prop| match prop {
            ast::ObjectPatProp::KeyValue(kv) => has_object_rest(&kv.value),
            ast::ObjectPatProp::Assign(_) => false,
            ast::ObjectPatProp::Rest(_) => true,
        }),
        ast::Pat::Assign(assign) => has_object_rest(&assign.left),
        ast::Pat::Ident(_) | ast::Pat::Expr(_) | ast::Pat::Invalid(_) => false,
    }
}

struct Decomposer<'a> {
    kind: ast::VarDeclKind,
    cx: &'a mut PassContext,
    out: Vec<ast::Stmt>,
}

impl Decomposer<'_> {
    fn declarator(
        &mut self,
        span: Span,
        ctxt: SyntaxContext,
        declare: bool,
        declarator: ast::VarDeclarator,
    ) {
        let reason = match (&declarator.name, &declarator.init) {
            (ast::Pat::Ident(_), _) => None,
            (_, None) => Some("destructuring declaration without an initializer"),
            (pat, Some(_)) => unsupported_pattern(pat),
        }
        .or_else(|| {
            // The rest copy calls `Object.assign`.
            (has_object_rest(&declarator.name)
                && self.cx.scopes.is_bound_at("Object", declarator.span))
            .then_some("object rest element where `Object` is a local binding")
        });

        if matches!(declarator.name, ast::Pat::Ident(_)) || reason.is_some() {
            if let Some(reason) = reason {
                self.cx.unsupported(declarator.span, reason);
            }
            self.out.push(ast::Stmt::Decl(ast::Decl::Var(Box::new(ast::VarDecl {
                span,
                ctxt,
                kind: self.kind,
                declare,
                decls: vec![declarator],
            }))));
            return;
        }

        let ast::VarDeclarator { name, init, .. } = declarator;
        if let Some(init) = init {
            self.bind(name, init);
        }
    }

    fn bind(&mut self, pat: ast::Pat, value: Box<ast::Expr>) {
        match pat {
            ast::Pat::Ident(id) => {
                self.out
                    .push(var_decl_pat(DUMMY_SP, self.kind, ast::Pat::Ident(id), Some(value)));
            }
            ast::Pat::Assign(ast::AssignPat { left, right, .. }) => {
                let t = self.temp(value);
                let value = cond(
                    bin(ast::BinaryOp::EqEqEq, ident(&t), undefined()),
                    right,
                    ident(&t),
                );
                self.bind(*left, value);
            }
            ast::Pat::Array(array) => {
                let source = self.source(value);
                for (index, elem) in array.elems.into_iter().enumerate() {
                    match elem {
                        None => {}
                        Some(ast::Pat::Rest(rest)) => {
                            let tail = call(member(ident(&source), "slice"), vec![num_lit(index)]);
                            self.bind(*rest.arg, tail);
                        }
                        Some(pat) => self.bind(pat, computed(ident(&source), num_lit(index))),
                    }
                }
            }
            ast::Pat::Object(object) => {
                let source = self.source(value);
                let mut seen = Vec::new();
                for prop in object.props {
                    match prop {
                        ast::ObjectPatProp::KeyValue(kv) => {
                            let key = self.key(kv.key);
                            seen.push(key.clone());
                            self.bind(*kv.value, member_prop(ident(&source), key));
                        }
                        ast::ObjectPatProp::Assign(ast::AssignPatProp { span, key, value }) => {
                            let prop = ast::MemberProp::Ident(ast::IdentName::new(
                                key.id.sym.clone(),
                                key.id.span,
                            ));
                            seen.push(prop.clone());
                            let target = match value {
                                Some(default) => ast::Pat::Assign(ast::AssignPat {
                                    span,
                                    left: Box::new(ast::Pat::Ident(key)),
                                    right: default,
                                }),
                                None => ast::Pat::Ident(key),
                            };
                            self.bind(target, member_prop(ident(&source), prop));
                        }
                        ast::ObjectPatProp::Rest(rest) => {
                            let copy = call(
                                member(global("Object"), "assign"),
                                vec![empty_object(), ident(&source)],
                            );
                            match *rest.arg {
                                ast::Pat::Ident(target) => {
                                    let name = target.id.clone();
                                    self.out.push(var_decl_pat(
                                        DUMMY_SP,
                                        self.kind,
                                        ast::Pat::Ident(target),
                                        Some(copy),
                                    ));
                                    for key in &seen {
                                        let removed = member_prop(ident(&name), key.clone());
                                        self.out
                                            .push(expr_stmt(unary(ast::UnaryOp::Delete, removed)));
                                    }
                                }
                                other => self.bind(other, copy),
                            }
                        }
                    }
                }
            }
            ast::Pat::Rest(rest) => self.bind(*rest.arg, value),
            other => {
                self.out
                    .push(var_decl_pat(DUMMY_SP, self.kind, other, Some(value)));
            }
        }
    }

    fn key(&mut self, key: ast::PropName) -> ast::MemberProp {
        let computed_key = |expr: Box<ast::Expr>| {
            ast::MemberProp::Computed(ast::ComputedPropName {
                span: DUMMY_SP,
                expr,
            })
        };
        match key {
            ast::PropName::Ident(name) => ast::MemberProp::Ident(name),
            ast::PropName::Str(s) => computed_key(Box::new(ast::Expr::Lit(ast::Lit::Str(s)))),
            ast::PropName::Num(n) => computed_key(Box::new(ast::Expr::Lit(ast::Lit::Num(n)))),
            ast::PropName::BigInt(b) => {
                computed_key(Box::new(ast::Expr::Lit(ast::Lit::BigInt(b))))
            }
            ast::PropName::Computed(c) => {
                if matches!(&*c.expr, ast::Expr::Lit(ast::Lit::Str(_) | ast::Lit::Num(_))) {
                    computed_key(c.expr)
                } else {
                    let key = self.cx.names.fresh_name("key");
                    self.out.push(var_decl(self.kind, &key, Some(c.expr)));
                    computed_key(ident(&key))
                }
            }
        }
    }

    /// The identifier a pattern reads from: a temporary holding `value`, or
    /// `value` itself when it already is one.
    fn source(&mut self, value: Box<ast::Expr>) -> ast::Ident {
        if let ast::Expr::Ident(id) = &*value {
            if self.cx.names.is_synthetic(&id.sym) {
                return id.clone();
            }
        }
        self.temp(value)
    }

    fn temp(&mut self, value: Box<ast::Expr>) -> ast::Ident {
        let t = self.cx.names.fresh_name("tmp");
        self.out.push(var_decl(self.kind, &t, Some(value)));
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_pass, parse_program, print_stmts, run_pass};
    use zs_ast::{DesugarConfig, DiagnosticKind};

    fn check(input: &str, expected: &str) {
        assert_pass(normalize_declarations, input, expected);
    }

    #[test]
    fn splits_declarators_and_array_patterns() {
        check(
            "let a = 1, [b] = arr;",
            "let a = 1; let tmp = arr; let b = tmp[0];",
        );
    }

    #[test]
    fn array_elisions_defaults_and_rest() {
        check(
            "const [, x = f(), ...zs] = arr;",
            "const tmp = arr;
             const tmp1 = tmp[1];
             const x = tmp1 === void 0 ? f() : tmp1;
             const zs = tmp.slice(2);",
        );
    }

    #[test]
    fn object_keys_and_rest() {
        check(
            r#"var { a, "b-c": b, 0: z, [k()]: c, ...rest } = o;"#,
            r#"var tmp = o;
               var a = tmp.a;
               var b = tmp["b-c"];
               var z = tmp[0];
               var key = k();
               var c = tmp[key];
               var rest = Object.assign({}, tmp);
               delete rest.a;
               delete rest["b-c"];
               delete rest[0];
               delete rest[key];"#,
        );
    }

    #[test]
    fn nested_patterns_bind_intermediates() {
        check(
            "let { p: [q], r: { s } = {} } = o;",
            "let tmp = o;
             let tmp1 = tmp.p;
             let q = tmp1[0];
             let tmp2 = tmp.r;
             let tmp3 = tmp2 === void 0 ? {} : tmp2;
             let s = tmp3.s;",
        );
    }

    #[test]
    fn single_statement_position_gets_a_block() {
        check(
            "if (c) var a = 1, b = 2; else f();",
            "if (c) { var a = 1; var b = 2; } else f();",
        );
    }

    #[test]
    fn nested_functions_are_normalized() {
        check(
            "function f() { const { x } = g(); return () => { let y, z; }; }",
            "function f() { const tmp = g(); const x = tmp.x; return () => { let y; let z; }; }",
        );
    }

    #[test]
    fn exported_bindings_stay_exported() {
        check(
            "export const [a, b] = pair, c = 1;",
            "const tmp = pair; export const a = tmp[0]; export const b = tmp[1]; export const c = 1;",
        );
    }

    #[test]
    fn avoids_names_used_by_the_input() {
        check(
            "let [a] = tmp; tmp1();",
            "let tmp2 = tmp; let a = tmp2[0]; tmp1();",
        );
    }

    #[test]
    fn single_identifier_declarations_are_untouched() {
        check("let a = 1; for (var i = 0;;) {}", "let a = 1; for (var i = 0;;) {}");
    }

    #[test]
    fn pattern_without_initializer_is_kept_and_reported() {
        let program = parse_program("let [a] = x;");
        let mut cx = crate::PassContext::new(&program, DesugarConfig::default());
        let ast::Program::Module(module) = program else {
            panic!("expected a module");
        };
        let Some(ast::ModuleItem::Stmt(ast::Stmt::Decl(ast::Decl::Var(mut var)))) =
            module.body.into_iter().next()
        else {
            panic!("expected a declaration");
        };
        var.decls[0].init = None;

        let out = split_var_decl(*var, &mut cx);
        assert_eq!(out.len(), 1);
        assert_eq!(cx.diagnostics.len(), 1);
        assert_eq!(cx.diagnostics[0].kind, DiagnosticKind::UnsupportedSyntax);
        assert_eq!(print_stmts(out), "let [a];");
    }

    #[test]
    fn object_rest_is_kept_when_object_is_shadowed() {
        let (code, diagnostics) = run_pass(
            "function g(Object) { const { a, ...rest } = o; }
             function h() { const { b, ...more } = o; }",
            normalize_declarations,
        );
        assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnsupportedSyntax);
        assert!(diagnostics[0].message.contains("`Object`"));
        assert!(code.contains("...rest"), "{code}");
        // The unshadowed sibling is still lowered.
        assert!(code.contains("Object.assign({}, tmp"), "{code}");
        assert!(!code.contains("...more"), "{code}");
    }

    #[test]
    fn local_object_binding_only_matters_for_rest() {
        check(
            "let Object = 1; const { a } = o;",
            "let Object = 1; const tmp = o; const a = tmp.a;",
        );
    }
}
