use swc_common::Span;
use thiserror::Error;
use zs_ast::Diagnostic;

/// A pipeline defect: the output would no longer be valid JavaScript.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("label `{0}` is declared inside a statement that already carries it")]
    DuplicateLabel(String),
    #[error("`{keyword} {label}` has no enclosing statement labeled `{label}`")]
    UnresolvedLabel { keyword: &'static str, label: String },
    #[error("`continue` outside of any loop")]
    OrphanContinue,
}

impl InvariantViolation {
    pub fn at(self, span: Span) -> Diagnostic {
        Diagnostic::invariant_violation(span, self.to_string())
    }
}
