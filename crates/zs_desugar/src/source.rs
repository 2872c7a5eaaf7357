//! Source-to-source wrapper around the pipeline.

use serde::Serialize;
use swc_ecma_ast as ast;
use swc_ecma_visit::{Visit, VisitWith};
use zs_ast::{ConfigError, DesugarConfig, Diagnostic};
use zs_parser::{dump_ast, parse_js, print_program};

use crate::desugar::desugar_program;

/// Result of desugaring one source text.
///
/// `transformed_code` holds the best-effort output whenever parsing succeeded,
/// even if `had_error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct TransformOutput {
    pub transformed_code: String,
    pub had_error: bool,
    pub error_message: Option<String>,
    pub transformed_ast: Option<String>,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl TransformOutput {
    fn failed(message: String, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            transformed_code: String::new(),
            had_error: true,
            error_message: Some(message),
            transformed_ast: None,
            diagnostics,
        }
    }
}

/// Desugar `source` with every pass enabled.
pub fn transform_code(source: &str) -> TransformOutput {
    match transform_code_with(source, "input.js", &DesugarConfig::default()) {
        Ok(output) => output,
        Err(e) => TransformOutput::failed(e.to_string(), Vec::new()),
    }
}

/// Desugar `source` under `config`. Parse failures and pipeline errors are
/// reported inside the output; only an invalid configuration is an `Err`.
pub fn transform_code_with(
    source: &str,
    filename: &str,
    config: &DesugarConfig,
) -> Result<TransformOutput, ConfigError> {
    config.validate()?;

    let parsed = match parse_js(source, filename) {
        Ok(parsed) => parsed,
        Err(e) => {
            let diagnostics = e
                .downcast_ref::<zs_parser::SyntaxErrors>()
                .map(|errors| errors.to_diagnostics())
                .unwrap_or_default();
            return Ok(TransformOutput::failed(e.to_string(), diagnostics));
        }
    };

    let result = desugar_program(parsed.program, config)?;

    let error_message = result
        .had_error
        .then(|| {
            result
                .diagnostics
                .iter()
                .filter(|d| d.is_error())
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        });

    let printed = match print_program(&result.program, &parsed.source_map, false) {
        Ok(printed) => printed,
        Err(e) => {
            return Ok(TransformOutput::failed(
                format!("failed to print output: {e}"),
                result.diagnostics,
            ))
        }
    };
    let transformed_ast = match dump_ast(&result.program) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialise the transformed AST");
            None
        }
    };

    let mut transformed_code = printed.code;
    if let Some(helper) = for_in_helper_epilogue(&result.program, config) {
        transformed_code.push_str(&helper);
        transformed_code.push('\n');
    }

    Ok(TransformOutput {
        transformed_code,
        had_error: result.had_error,
        error_message,
        transformed_ast,
        diagnostics: result.diagnostics,
    })
}

/// The key helper's definition, when `config` asks for it and `program`
/// calls the helper.
///
/// Function declarations hoist, so the text can be appended after the
/// program without shifting any mapped position. The definition itself uses
/// `for-in`: output carrying it is meant to run, not to be desugared again.
pub fn for_in_helper_epilogue(program: &ast::Program, config: &DesugarConfig) -> Option<String> {
    if !config.emit_for_in_helper {
        return None;
    }
    let mut finder = HelperCall {
        name: &config.for_in_helper,
        found: false,
    };
    program.visit_with(&mut finder);
    finder.found.then(|| config.for_in_helper_source())
}

struct HelperCall<'a> {
    name: &'a str,
    found: bool,
}

impl Visit for HelperCall<'_> {
    fn visit_call_expr(&mut self, n: &ast::CallExpr) {
        if let ast::Callee::Expr(callee) = &n.callee {
            if matches!(&**callee, ast::Expr::Ident(id) if &*id.sym == self.name) {
                self.found = true;
                return;
            }
        }
        n.visit_children_with(self);
    }
}
