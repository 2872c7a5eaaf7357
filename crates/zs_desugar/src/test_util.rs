use swc_common::{sync::Lrc, SourceMap, DUMMY_SP};
use swc_ecma_ast as ast;
use zs_ast::{DesugarConfig, Diagnostic};
use zs_parser::{parse_js, print_program};

use crate::context::PassContext;

pub(crate) fn parse_program(source: &str) -> ast::Program {
    parse_js(source, "test.js").unwrap().program
}

/// Parse and print, so expected snippets compare independently of formatting.
pub(crate) fn normalize(source: &str) -> String {
    let parsed = parse_js(source, "expected.js").unwrap();
    print_program(&parsed.program, &parsed.source_map, false)
        .unwrap()
        .code
        .trim()
        .to_string()
}

pub(crate) fn print_stmts(stmts: Vec<ast::Stmt>) -> String {
    let program = ast::Program::Module(ast::Module {
        span: DUMMY_SP,
        body: stmts.into_iter().map(ast::ModuleItem::Stmt).collect(),
        shebang: None,
    });
    let cm: Lrc<SourceMap> = Default::default();
    print_program(&program, &cm, false)
        .unwrap()
        .code
        .trim()
        .to_string()
}

/// Run one pass over `source` with a fresh context.
pub(crate) fn run_pass(
    source: &str,
    pass: impl FnOnce(&mut ast::Program, &mut PassContext),
) -> (String, Vec<Diagnostic>) {
    let mut parsed = parse_js(source, "input.js").unwrap();
    let mut cx = PassContext::new(&parsed.program, DesugarConfig::default());
    pass(&mut parsed.program, &mut cx);
    let code = print_program(&parsed.program, &parsed.source_map, false)
        .unwrap()
        .code
        .trim()
        .to_string();
    // Every rewrite must still be valid JavaScript.
    normalize(&code);
    (code, cx.diagnostics)
}

#[track_caller]
pub(crate) fn assert_pass(
    pass: impl FnOnce(&mut ast::Program, &mut PassContext),
    input: &str,
    expected: &str,
) {
    let (code, diagnostics) = run_pass(input, pass);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    assert_eq!(code, normalize(expected), "\n--- input ---\n{input}\n");
}

/// Run the whole pipeline with the default configuration.
pub(crate) fn desugar(source: &str) -> (String, Vec<Diagnostic>) {
    let parsed = parse_js(source, "input.js").unwrap();
    let result = crate::transform(parsed.program);
    let code = print_program(&result.program, &parsed.source_map, false)
        .unwrap()
        .code
        .trim()
        .to_string();
    (code, result.diagnostics)
}

#[track_caller]
pub(crate) fn assert_desugars(input: &str, expected: &str) {
    let (code, diagnostics) = desugar(input);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    assert_eq!(code, normalize(expected), "\n--- input ---\n{input}\n");
}
