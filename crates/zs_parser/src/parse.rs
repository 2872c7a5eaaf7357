use std::fmt;

use anyhow::Result;
use swc_common::{comments::SingleThreadedComments, sync::Lrc, FileName, SourceMap, Span, Spanned};
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_parser::{error::Error as SwcError, EsSyntax, Syntax};
use thiserror::Error;
use zs_ast::Diagnostic;

/// Result of parsing a JavaScript source file.
pub struct ParseResult {
    pub program: Program,
    pub comments: SingleThreadedComments,
    pub source_map: Lrc<SourceMap>,
}

/// One syntax error with a rendered `file:line:col` location.
#[derive(Debug, Clone)]
pub struct SyntaxErrorAt {
    pub span: Span,
    pub location: String,
    pub message: String,
}

impl fmt::Display for SyntaxErrorAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Every syntax error the parser reported, fatal and recovered alike.
///
/// Returned inside an `anyhow::Error`; callers that want structured
/// diagnostics can `downcast_ref` to this type.
#[derive(Debug, Error)]
#[error("{}", render(.errors))]
pub struct SyntaxErrors {
    pub errors: Vec<SyntaxErrorAt>,
}

impl SyntaxErrors {
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        self.errors
            .iter()
            .map(|e| Diagnostic::parse_failure(e.span, e.to_string()))
            .collect()
    }
}

fn render(errors: &[SyntaxErrorAt]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a JavaScript module.
///
/// Recovered errors are treated like fatal ones: the pipeline only accepts
/// input the parser fully understood.
pub fn parse_js(source: &str, filename: &str) -> Result<ParseResult> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Custom(filename.to_string())),
        source.to_string(),
    );

    let comments = SingleThreadedComments::default();
    let mut recovered = vec![];

    let parsed = swc_ecma_parser::parse_file_as_module(
        &source_file,
        Syntax::Es(EsSyntax {
            explicit_resource_management: true,
            ..Default::default()
        }),
        EsVersion::latest(),
        Some(&comments),
        &mut recovered,
    );

    let module = match parsed {
        Ok(module) if recovered.is_empty() => module,
        Ok(_) => return Err(syntax_errors(&source_map, filename, recovered).into()),
        Err(fatal) => {
            recovered.insert(0, fatal);
            return Err(syntax_errors(&source_map, filename, recovered).into());
        }
    };

    Ok(ParseResult {
        program: Program::Module(module),
        comments,
        source_map,
    })
}

fn syntax_errors(source_map: &SourceMap, filename: &str, errors: Vec<SwcError>) -> SyntaxErrors {
    let errors = errors
        .into_iter()
        .map(|e| {
            let span = e.span();
            let loc = source_map.lookup_char_pos(span.lo);
            SyntaxErrorAt {
                span,
                location: format!("{filename}:{}:{}", loc.line, loc.col_display + 1),
                message: e.kind().msg().to_string(),
            }
        })
        .collect();
    SyntaxErrors { errors }
}
