//! Top-level desugaring entry points.
//!
//! Takes a parsed program and runs every enabled pass over it, producing a
//! program in the core subset together with the diagnostics of the run.

use swc_ecma_ast as ast;
use zs_ast::{ConfigError, DesugarConfig};

use crate::pipeline::{Pipeline, TransformResult};

/// Desugar a program under `config`.
pub fn desugar_program(
    program: ast::Program,
    config: &DesugarConfig,
) -> Result<TransformResult, ConfigError> {
    Ok(Pipeline::new(program, config.clone())?
        .normalize_declarations()
        .rewrite_continues()
        .normalize_loops()
        .desugar_switches()
        .eliminate_finally()
        .finish())
}

/// Desugar a program with every pass enabled.
pub fn transform(program: ast::Program) -> TransformResult {
    Pipeline::start(program, DesugarConfig::default())
        .normalize_declarations()
        .rewrite_continues()
        .normalize_loops()
        .desugar_switches()
        .eliminate_finally()
        .finish()
}

/// Desugar a module, dropping the diagnostics after logging them.
pub fn desugar_module(module: ast::Module) -> ast::Module {
    let result = transform(ast::Program::Module(module));
    for diagnostic in &result.diagnostics {
        tracing::warn!(%diagnostic, "desugaring diagnostic");
    }
    match result.program {
        ast::Program::Module(module) => module,
        ast::Program::Script(script) => ast::Module {
            span: script.span,
            body: script.body.into_iter().map(ast::ModuleItem::Stmt).collect(),
            shebang: script.shebang,
        },
    }
}
