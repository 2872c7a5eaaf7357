//! Label invariants of the pipeline output.
//!
//! Every labeled `break`/`continue` must sit inside a statement carrying that
//! label, and no label may be declared inside a statement that already
//! carries it. Label scopes end at function boundaries.

use swc_common::Span;
use swc_ecma_ast as ast;
use swc_ecma_visit::{Visit, VisitWith};
use zs_ast::Diagnostic;

use crate::error::InvariantViolation;

pub fn validate_labels(program: &ast::Program) -> Vec<Diagnostic> {
    let mut validator = LabelValidator::default();
    program.visit_with(&mut validator);
    validator
        .violations
        .into_iter()
        .map(|(violation, span)| violation.at(span))
        .collect()
}

#[derive(Default)]
struct LabelValidator {
    labels: Vec<String>,
    violations: Vec<(InvariantViolation, Span)>,
}

impl LabelValidator {
    fn check_target(&mut self, keyword: &'static str, label: Option<&ast::Ident>, span: Span) {
        let Some(label) = label else {
            return;
        };
        if !self.labels.iter().any(|l| *l == *label.sym) {
            self.violations.push((
                InvariantViolation::UnresolvedLabel {
                    keyword,
                    label: label.sym.to_string(),
                },
                span,
            ));
        }
    }

    fn with_fresh_labels(&mut self, f: impl FnOnce(&mut Self)) {
        let saved = std::mem::take(&mut self.labels);
        f(self);
        self.labels = saved;
    }
}

impl Visit for LabelValidator {
    fn visit_labeled_stmt(&mut self, n: &ast::LabeledStmt) {
        let name = n.label.sym.to_string();
        if self.labels.contains(&name) {
            self.violations
                .push((InvariantViolation::DuplicateLabel(name.clone()), n.span));
        }
        self.labels.push(name);
        n.body.visit_with(self);
        self.labels.pop();
    }

    fn visit_break_stmt(&mut self, n: &ast::BreakStmt) {
        self.check_target("break", n.label.as_ref(), n.span);
    }

    fn visit_continue_stmt(&mut self, n: &ast::ContinueStmt) {
        self.check_target("continue", n.label.as_ref(), n.span);
    }

    fn visit_function(&mut self, n: &ast::Function) {
        self.with_fresh_labels(|this| n.visit_children_with(this));
    }

    fn visit_arrow_expr(&mut self, n: &ast::ArrowExpr) {
        self.with_fresh_labels(|this| n.visit_children_with(this));
    }

    fn visit_constructor(&mut self, n: &ast::Constructor) {
        self.with_fresh_labels(|this| n.visit_children_with(this));
    }

    fn visit_getter_prop(&mut self, n: &ast::GetterProp) {
        self.with_fresh_labels(|this| n.visit_children_with(this));
    }

    fn visit_setter_prop(&mut self, n: &ast::SetterProp) {
        self.with_fresh_labels(|this| n.visit_children_with(this));
    }

    fn visit_static_block(&mut self, n: &ast::StaticBlock) {
        self.with_fresh_labels(|this| n.visit_children_with(this));
    }
}
