use anyhow::{Context, Result};
use swc_common::{source_map::DefaultSourceMapGenConfig, sync::Lrc, SourceMap};
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_codegen::{text_writer::JsWriter, Emitter, Node};

/// Printed source plus, when requested, its JSON source map.
pub struct Printed {
    pub code: String,
    pub source_map: Option<String>,
}

/// Render a program back to JavaScript.
///
/// `source_map` must be the map the program was parsed with: spans of
/// untouched nodes point into it.
pub fn print_program(
    program: &Program,
    source_map: &Lrc<SourceMap>,
    with_source_map: bool,
) -> Result<Printed> {
    let mut buf = Vec::new();
    let mut srcmap_buf = if with_source_map { Some(vec![]) } else { None };
    {
        let writer = JsWriter::new(source_map.clone(), "\n", &mut buf, srcmap_buf.as_mut());
        let mut emitter = Emitter {
            cfg: swc_ecma_codegen::Config::default().with_target(EsVersion::latest()),
            cm: source_map.clone(),
            comments: None,
            wr: writer,
        };
        program.emit_with(&mut emitter)?;
    }

    let code = String::from_utf8(buf)?;

    let source_map = match srcmap_buf {
        Some(mappings) => {
            let srcmap = source_map.build_source_map(&mappings, None, DefaultSourceMapGenConfig);
            let mut srcmap_json = vec![];
            srcmap
                .to_writer(&mut srcmap_json)
                .context("failed to serialize source map")?;
            Some(String::from_utf8(srcmap_json)?)
        }
        None => None,
    };

    Ok(Printed { code, source_map })
}

/// Serialise a program as pretty-printed JSON.
pub fn dump_ast(program: &Program) -> Result<String> {
    serde_json::to_string_pretty(program).context("failed to serialize AST")
}
