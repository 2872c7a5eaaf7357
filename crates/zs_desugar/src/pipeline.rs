//! Pass ordering.
//!
//! [`Pipeline`] is a typestate: each method consumes the pipeline at one
//! stage and returns it at the next, so passes can only run in the order
//!
//! declarations → continues → loops → switches → finally → [`finish`]
//!
//! [`finish`]: Pipeline::finish

use std::marker::PhantomData;

use swc_ecma_ast as ast;
use zs_ast::{ConfigError, DesugarConfig, Diagnostic};

use crate::context::PassContext;
use crate::continue_break::rewrite_continues;
use crate::finally::eliminate_finally;
use crate::loops::normalize_loops;
use crate::switch::desugar_switches;
use crate::validate::validate_labels;
use crate::var_decl::normalize_declarations;

pub struct Parsed;
pub struct DeclsNormalized;
pub struct ContinuesRewritten;
pub struct LoopsNormalized;
pub struct SwitchesDesugared;
pub struct FinallyEliminated;

/// Output of a full pipeline run. The program is always returned, even when
/// `had_error` is set: unsupported constructs are left in place.
#[derive(Debug)]
pub struct TransformResult {
    pub program: ast::Program,
    pub diagnostics: Vec<Diagnostic>,
    pub had_error: bool,
}

pub struct Pipeline<S> {
    program: ast::Program,
    cx: PassContext,
    _stage: PhantomData<S>,
}

impl<S> Pipeline<S> {
    pub fn program(&self) -> &ast::Program {
        &self.program
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.cx.diagnostics
    }

    fn run<T>(
        mut self,
        name: &'static str,
        enabled: bool,
        pass: fn(&mut ast::Program, &mut PassContext),
    ) -> Pipeline<T> {
        let _span = tracing::debug_span!("pass", pass = name).entered();
        if !enabled {
            tracing::debug!("disabled by configuration");
        } else if self.cx.has_fatal() {
            tracing::debug!("skipped after a fatal diagnostic");
        } else {
            let before = self.cx.diagnostics.len();
            pass(&mut self.program, &mut self.cx);
            tracing::debug!(
                diagnostics = self.cx.diagnostics.len() - before,
                "pass finished"
            );
        }
        Pipeline {
            program: self.program,
            cx: self.cx,
            _stage: PhantomData,
        }
    }
}

impl Pipeline<Parsed> {
    pub fn new(program: ast::Program, config: DesugarConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::start(program, config))
    }

    /// Start from a configuration already known to be valid.
    pub(crate) fn start(program: ast::Program, config: DesugarConfig) -> Self {
        let cx = PassContext::new(&program, config);
        Pipeline {
            program,
            cx,
            _stage: PhantomData,
        }
    }

    pub fn normalize_declarations(self) -> Pipeline<DeclsNormalized> {
        let enabled = self.cx.config.var_decls;
        self.run("declarations", enabled, normalize_declarations)
    }
}

impl Pipeline<DeclsNormalized> {
    pub fn rewrite_continues(self) -> Pipeline<ContinuesRewritten> {
        let enabled = self.cx.config.continues;
        self.run("continues", enabled, rewrite_continues)
    }
}

impl Pipeline<ContinuesRewritten> {
    pub fn normalize_loops(self) -> Pipeline<LoopsNormalized> {
        let enabled = self.cx.config.loops;
        self.run("loops", enabled, normalize_loops)
    }
}

impl Pipeline<LoopsNormalized> {
    pub fn desugar_switches(self) -> Pipeline<SwitchesDesugared> {
        let enabled = self.cx.config.switches;
        self.run("switches", enabled, desugar_switches)
    }
}

impl Pipeline<SwitchesDesugared> {
    pub fn eliminate_finally(self) -> Pipeline<FinallyEliminated> {
        let enabled = self.cx.config.finally;
        self.run("finally", enabled, eliminate_finally)
    }
}

impl Pipeline<FinallyEliminated> {
    /// Check label invariants and hand back the program with its diagnostics.
    pub fn finish(self) -> TransformResult {
        let Pipeline {
            program, mut cx, ..
        } = self;

        if !cx.has_fatal() {
            if let Some(first) = validate_labels(&program).into_iter().next() {
                tracing::error!(%first, "label invariant violated");
                cx.diagnostics.push(first);
            }
        }

        let had_error = cx.has_error();
        tracing::debug!(
            diagnostics = cx.diagnostics.len(),
            had_error,
            "pipeline finished"
        );
        TransformResult {
            program,
            diagnostics: cx.diagnostics,
            had_error,
        }
    }
}
