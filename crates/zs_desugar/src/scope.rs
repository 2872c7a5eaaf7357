//! Read-only scope analysis.
//!
//! [`ScopeTracker::analyze`] walks a program once and records which names are
//! bound in which scope, every identifier that occurs anywhere, and every
//! statement label. Passes never mutate the result. The [`NameAllocator`]
//! consumes it to pick names that cannot collide, and passes that emit a
//! reference to a global ask [`ScopeTracker::is_bound_at`] whether a local
//! binding would capture it.
//!
//! [`NameAllocator`]: crate::names::NameAllocator

use rustc_hash::FxHashSet;
use swc_common::{Span, DUMMY_SP};
use swc_ecma_ast as ast;
use swc_ecma_visit::{Visit, VisitWith};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Program,
    Function,
    Block,
    Catch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Param,
    CatchParam,
    Import,
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Span of the node that opens the scope; dummy for the program.
    pub span: Span,
    pub parent: Option<ScopeId>,
    pub bindings: Vec<Binding>,
}

#[derive(Debug)]
pub struct ScopeTracker {
    scopes: Vec<Scope>,
    names: FxHashSet<String>,
    labels: FxHashSet<String>,
}

impl ScopeTracker {
    pub fn analyze(program: &ast::Program) -> Self {
        let mut collector = Collector {
            tracker: ScopeTracker {
                scopes: vec![Scope {
                    kind: ScopeKind::Program,
                    span: DUMMY_SP,
                    parent: None,
                    bindings: Vec::new(),
                }],
                names: FxHashSet::default(),
                labels: FxHashSet::default(),
            },
            stack: vec![ScopeId(0)],
        };
        program.visit_with(&mut collector);
        collector.tracker
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    /// Every identifier and label that occurs in the program.
    pub fn taken_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().chain(self.labels.iter()).map(String::as_str)
    }

    /// Bindings visible from `id`, innermost scope first.
    pub fn visible_bindings(&self, id: ScopeId) -> Vec<&Binding> {
        let mut out = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let scope = self.scope(current);
            out.extend(scope.bindings.iter());
            cursor = scope.parent;
        }
        out
    }

    /// Innermost scope whose node encloses `site`. Generated code has no
    /// position and resolves to the program scope.
    pub fn scope_at(&self, site: Span) -> ScopeId {
        if site.is_dummy() {
            return self.root();
        }
        // Scopes are recorded in pre-order, so the last enclosing one is the
        // innermost.
        self.scopes()
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, scope)| !scope.span.is_dummy() && scope.span.contains(site))
            .map_or(self.root(), |(index, _)| ScopeId(index))
    }

    /// Whether `name` at `site` refers to a binding of the program rather
    /// than to a global.
    pub fn is_bound_at(&self, name: &str, site: Span) -> bool {
        self.visible_bindings(self.scope_at(site))
            .iter()
            .any(|binding| binding.name == name)
    }
}

/// Collect the names a binding pattern introduces.
pub(crate) fn bound_names(pat: &ast::Pat, out: &mut Vec<ast::Ident>) {
    match pat {
        ast::Pat::Ident(b) => out.push(b.id.clone()),
        ast::Pat::Array(a) => {
            for elem in a.elems.iter().flatten() {
                bound_names(elem, out);
            }
        }
        ast::Pat::Rest(r) => bound_names(&r.arg, out),
        ast::Pat::Object(o) => {
            for prop in &o.props {
                match prop {
                    ast::ObjectPatProp::KeyValue(kv) => bound_names(&kv.value, out),
                    ast::ObjectPatProp::Assign(a) => out.push(a.key.id.clone()),
                    ast::ObjectPatProp::Rest(r) => bound_names(&r.arg, out),
                }
            }
        }
        ast::Pat::Assign(a) => bound_names(&a.left, out),
        ast::Pat::Expr(_) | ast::Pat::Invalid(_) => {}
    }
}

struct Collector {
    tracker: ScopeTracker,
    stack: Vec<ScopeId>,
}

impl Collector {
    fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId(0))
    }

    /// Nearest function or program scope; where `var` lands.
    fn hoist_target(&self) -> ScopeId {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|id| {
                matches!(
                    self.tracker.scopes[id.0].kind,
                    ScopeKind::Function | ScopeKind::Program
                )
            })
            .unwrap_or(ScopeId(0))
    }

    fn push(&mut self, kind: ScopeKind, span: Span) {
        let id = ScopeId(self.tracker.scopes.len());
        self.tracker.scopes.push(Scope {
            kind,
            span,
            parent: Some(self.current()),
            bindings: Vec::new(),
        });
        self.stack.push(id);
    }

    fn pop(&mut self) {
        self.stack.pop();
    }

    fn declare(&mut self, scope: ScopeId, ident: &ast::Ident, kind: BindingKind) {
        self.tracker.scopes[scope.0].bindings.push(Binding {
            name: ident.sym.to_string(),
            kind,
            span: ident.span,
        });
    }

    fn declare_pat(&mut self, scope: ScopeId, pat: &ast::Pat, kind: BindingKind) {
        let mut names = Vec::new();
        bound_names(pat, &mut names);
        for name in &names {
            self.declare(scope, name, kind);
        }
    }

    fn in_scope(&mut self, kind: ScopeKind, span: Span, f: impl FnOnce(&mut Self)) {
        self.push(kind, span);
        f(self);
        self.pop();
    }
}

impl Visit for Collector {
    fn visit_ident(&mut self, n: &ast::Ident) {
        self.tracker.names.insert(n.sym.to_string());
    }

    fn visit_labeled_stmt(&mut self, n: &ast::LabeledStmt) {
        self.tracker.labels.insert(n.label.sym.to_string());
        n.body.visit_with(self);
    }

    fn visit_break_stmt(&mut self, n: &ast::BreakStmt) {
        if let Some(label) = &n.label {
            self.tracker.labels.insert(label.sym.to_string());
        }
    }

    fn visit_continue_stmt(&mut self, n: &ast::ContinueStmt) {
        if let Some(label) = &n.label {
            self.tracker.labels.insert(label.sym.to_string());
        }
    }

    fn visit_var_decl(&mut self, n: &ast::VarDecl) {
        let (scope, kind) = match n.kind {
            ast::VarDeclKind::Var => (self.hoist_target(), BindingKind::Var),
            ast::VarDeclKind::Let => (self.current(), BindingKind::Let),
            ast::VarDeclKind::Const => (self.current(), BindingKind::Const),
        };
        for decl in &n.decls {
            self.declare_pat(scope, &decl.name, kind);
        }
        n.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, n: &ast::FnDecl) {
        let scope = self.current();
        self.declare(scope, &n.ident, BindingKind::Function);
        n.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, n: &ast::ClassDecl) {
        let scope = self.current();
        self.declare(scope, &n.ident, BindingKind::Class);
        n.visit_children_with(self);
    }

    fn visit_import_decl(&mut self, n: &ast::ImportDecl) {
        for specifier in &n.specifiers {
            let local = match specifier {
                ast::ImportSpecifier::Named(s) => &s.local,
                ast::ImportSpecifier::Default(s) => &s.local,
                ast::ImportSpecifier::Namespace(s) => &s.local,
            };
            self.declare(ScopeId(0), local, BindingKind::Import);
        }
        n.visit_children_with(self);
    }

    fn visit_function(&mut self, n: &ast::Function) {
        self.in_scope(ScopeKind::Function, n.span, |this| {
            let scope = this.current();
            for param in &n.params {
                this.declare_pat(scope, &param.pat, BindingKind::Param);
            }
            n.params.visit_with(this);
            if let Some(body) = &n.body {
                body.stmts.visit_with(this);
            }
        });
    }

    fn visit_arrow_expr(&mut self, n: &ast::ArrowExpr) {
        self.in_scope(ScopeKind::Function, n.span, |this| {
            let scope = this.current();
            for param in &n.params {
                this.declare_pat(scope, param, BindingKind::Param);
            }
            n.params.visit_with(this);
            match &*n.body {
                ast::BlockStmtOrExpr::BlockStmt(body) => body.stmts.visit_with(this),
                ast::BlockStmtOrExpr::Expr(expr) => expr.visit_with(this),
            }
        });
    }

    fn visit_constructor(&mut self, n: &ast::Constructor) {
        self.in_scope(ScopeKind::Function, n.span, |this| {
            let scope = this.current();
            for param in &n.params {
                if let ast::ParamOrTsParamProp::Param(p) = param {
                    this.declare_pat(scope, &p.pat, BindingKind::Param);
                }
            }
            n.params.visit_with(this);
            if let Some(body) = &n.body {
                body.stmts.visit_with(this);
            }
        });
    }

    fn visit_setter_prop(&mut self, n: &ast::SetterProp) {
        n.key.visit_with(self);
        self.in_scope(ScopeKind::Function, n.span, |this| {
            let scope = this.current();
            this.declare_pat(scope, &n.param, BindingKind::Param);
            n.param.visit_with(this);
            if let Some(body) = &n.body {
                body.stmts.visit_with(this);
            }
        });
    }

    fn visit_getter_prop(&mut self, n: &ast::GetterProp) {
        n.key.visit_with(self);
        self.in_scope(ScopeKind::Function, n.span, |this| {
            if let Some(body) = &n.body {
                body.stmts.visit_with(this);
            }
        });
    }

    fn visit_static_block(&mut self, n: &ast::StaticBlock) {
        self.in_scope(ScopeKind::Function, n.span, |this| n.body.stmts.visit_with(this));
    }

    fn visit_block_stmt(&mut self, n: &ast::BlockStmt) {
        self.in_scope(ScopeKind::Block, n.span, |this| n.stmts.visit_with(this));
    }

    fn visit_catch_clause(&mut self, n: &ast::CatchClause) {
        self.in_scope(ScopeKind::Catch, n.span, |this| {
            if let Some(param) = &n.param {
                let scope = this.current();
                this.declare_pat(scope, param, BindingKind::CatchParam);
                param.visit_with(this);
            }
            n.body.stmts.visit_with(this);
        });
    }

    fn visit_for_stmt(&mut self, n: &ast::ForStmt) {
        self.in_scope(ScopeKind::Block, n.span, |this| n.visit_children_with(this));
    }

    fn visit_for_in_stmt(&mut self, n: &ast::ForInStmt) {
        self.in_scope(ScopeKind::Block, n.span, |this| n.visit_children_with(this));
    }

    fn visit_for_of_stmt(&mut self, n: &ast::ForOfStmt) {
        self.in_scope(ScopeKind::Block, n.span, |this| n.visit_children_with(this));
    }
}
