use swc_common::Span;
use swc_ecma_ast as ast;
use zs_ast::{DesugarConfig, Diagnostic};

use crate::error::InvariantViolation;
use crate::names::NameAllocator;
use crate::scope::ScopeTracker;

/// State shared by every pass over one compilation unit.
pub struct PassContext {
    pub names: NameAllocator,
    /// Bindings of the input as parsed. Nodes a pass creates carry no span
    /// and resolve to the program scope.
    pub scopes: ScopeTracker,
    pub diagnostics: Vec<Diagnostic>,
    pub config: DesugarConfig,
}

impl PassContext {
    pub fn new(program: &ast::Program, config: DesugarConfig) -> Self {
        let scopes = ScopeTracker::analyze(program);
        Self {
            names: NameAllocator::new(&scopes),
            scopes,
            diagnostics: Vec::new(),
            config,
        }
    }

    pub fn unsupported(&mut self, span: Span, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "unsupported syntax left in place");
        self.diagnostics.push(Diagnostic::unsupported(span, message));
    }

    pub fn limitation(&mut self, span: Span, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "known limitation");
        self.diagnostics.push(Diagnostic::limitation(span, message));
    }

    /// Record a pipeline defect. Only the first one is kept: once the unit is
    /// known to be broken, later passes are skipped.
    pub fn violation(&mut self, violation: InvariantViolation, span: Span) {
        if self.has_fatal() {
            return;
        }
        tracing::error!(%violation, "internal invariant violated");
        self.diagnostics.push(violation.at(span));
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    pub fn has_error(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}
