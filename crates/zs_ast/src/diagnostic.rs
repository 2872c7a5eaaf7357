use std::fmt;

use swc_common::Span;

/// What went wrong (or what the reader should know) about a compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The construct is recognised but outside the supported subset. The
    /// node is left untransformed.
    UnsupportedSyntax,
    /// The parser rejected the input.
    ParseFailure,
    /// A pipeline defect, such as a label the allocator failed to keep unique.
    /// Fails the whole unit.
    InternalInvariantViolation,
    /// The rewrite is valid but cannot preserve every behaviour of the input.
    KnownLimitation,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnsupportedSyntax => write!(f, "unsupported-syntax"),
            DiagnosticKind::ParseFailure => write!(f, "parse-failure"),
            DiagnosticKind::InternalInvariantViolation => write!(f, "invariant-violation"),
            DiagnosticKind::KnownLimitation => write!(f, "known-limitation"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// Whether a diagnostic points at code the user wrote or code the pipeline
/// generated. Generated nodes carry a dummy span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    Source,
    Synthetic,
}

impl Provenance {
    pub fn of(span: Span) -> Self {
        if span.is_dummy() {
            Provenance::Synthetic
        } else {
            Provenance::Source
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub provenance: Provenance,
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, severity: Severity, span: Span, message: String) -> Self {
        Self {
            kind,
            severity,
            message,
            span,
            provenance: Provenance::of(span),
        }
    }

    pub fn unsupported(span: Span, message: impl Into<String>) -> Self {
        Self::new(
            DiagnosticKind::UnsupportedSyntax,
            Severity::Error,
            span,
            message.into(),
        )
    }

    pub fn parse_failure(span: Span, message: impl Into<String>) -> Self {
        Self::new(
            DiagnosticKind::ParseFailure,
            Severity::Error,
            span,
            message.into(),
        )
    }

    pub fn invariant_violation(span: Span, message: impl Into<String>) -> Self {
        Self::new(
            DiagnosticKind::InternalInvariantViolation,
            Severity::Error,
            span,
            message.into(),
        )
    }

    pub fn limitation(span: Span, message: impl Into<String>) -> Self {
        Self::new(
            DiagnosticKind::KnownLimitation,
            Severity::Warning,
            span,
            message.into(),
        )
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_fatal(&self) -> bool {
        self.kind == DiagnosticKind::InternalInvariantViolation
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.kind, self.message)?;
        if self.provenance == Provenance::Synthetic {
            write!(f, " (in generated code)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_common::{BytePos, DUMMY_SP};

    #[test]
    fn provenance_follows_span() {
        let real = Span::new(BytePos(1), BytePos(5));
        assert_eq!(Provenance::of(real), Provenance::Source);
        assert_eq!(Provenance::of(DUMMY_SP), Provenance::Synthetic);
    }

    #[test]
    fn only_invariant_violations_are_fatal() {
        let unsupported = Diagnostic::unsupported(DUMMY_SP, "for await");
        assert!(unsupported.is_error());
        assert!(!unsupported.is_fatal());

        let limitation = Diagnostic::limitation(DUMMY_SP, "return inside try");
        assert!(!limitation.is_error());

        let violation = Diagnostic::invariant_violation(DUMMY_SP, "duplicate label");
        assert!(violation.is_fatal());
    }

    #[test]
    fn display_marks_generated_code() {
        let d = Diagnostic::unsupported(DUMMY_SP, "using declaration");
        assert_eq!(
            d.to_string(),
            "error[unsupported-syntax]: using declaration (in generated code)"
        );
    }
}
