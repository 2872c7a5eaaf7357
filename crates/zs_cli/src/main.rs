use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use swc_common::SourceMap;
use zs_ast::{DesugarConfig, Diagnostic};
use zs_desugar::{desugar_program, for_in_helper_epilogue, transform_code_with};
use zs_parser::{dump_ast, parse_js, print_program};

#[derive(Parser)]
#[command(name = "zs", about = "zero-sugar: lower JavaScript to a minimal core subset")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, desugar, and emit core JavaScript.
    Desugar {
        /// Input .js file.
        input: PathBuf,
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// JSON file with per-pass switches.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Generate a source map.
        #[arg(long)]
        source_map: bool,
        /// Print the whole result (code, errors, AST) as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Parse the file and report any syntax errors.
    Check { input: PathBuf },
    /// Parse and dump the AST.
    Parse {
        input: PathBuf,
        /// Dump as JSON instead of the debug representation.
        #[arg(long)]
        ast: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Desugar {
            input,
            output,
            config,
            source_map,
            json,
        } => {
            let source = read_source(&input)?;
            let filename = input.display().to_string();
            let config = match &config {
                Some(path) => load_config(path)?,
                None => DesugarConfig::default(),
            };

            if json {
                let result = transform_code_with(&source, &filename, &config)?;
                let rendered = serde_json::to_string_pretty(&result)?;
                write_output(output.as_deref(), &rendered)?;
                if result.had_error {
                    bail!("desugaring {filename} failed");
                }
                return Ok(());
            }

            let parsed = parse_js(&source, &filename)?;
            let result = desugar_program(parsed.program, &config)?;
            report(&parsed.source_map, &filename, &result.diagnostics);

            let printed = print_program(&result.program, &parsed.source_map, source_map)?;
            let mut code = printed.code;
            if let Some(helper) = for_in_helper_epilogue(&result.program, &config) {
                code.push_str(&helper);
                code.push('\n');
            }
            write_output(output.as_deref(), &code)?;

            if let Some(map) = printed.source_map {
                let map_path = match &output {
                    Some(path) => format!("{}.map", path.display()),
                    None => format!("{filename}.map"),
                };
                std::fs::write(&map_path, map)
                    .with_context(|| format!("failed to write {map_path}"))?;
                eprintln!("Source map written to {map_path}");
            }

            if result.had_error {
                let errors = result.diagnostics.iter().filter(|d| d.is_error()).count();
                bail!("{errors} error(s) while desugaring {filename}");
            }
        }
        Commands::Check { input } => {
            let source = read_source(&input)?;
            let filename = input.display().to_string();
            parse_js(&source, &filename)?;
            eprintln!("OK: {filename}");
        }
        Commands::Parse { input, ast } => {
            let source = read_source(&input)?;
            let filename = input.display().to_string();
            let parsed = parse_js(&source, &filename)?;

            if ast {
                println!("{}", dump_ast(&parsed.program)?);
            } else {
                println!("{:#?}", parsed.program);
            }
        }
    }

    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_config(path: &Path) -> Result<DesugarConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    DesugarConfig::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

/// Print diagnostics to stderr, with `file:line:col` for spans in the input.
fn report(source_map: &SourceMap, filename: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        if diagnostic.span.is_dummy() {
            eprintln!("{filename}: {diagnostic}");
        } else {
            let loc = source_map.lookup_char_pos(diagnostic.span.lo);
            eprintln!(
                "{filename}:{}:{}: {diagnostic}",
                loc.line,
                loc.col_display + 1
            );
        }
    }
}

/// Install a stderr subscriber filtered by `ZS_LOG`, falling back to
/// `RUST_LOG`. Nothing is installed when neither is set.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = match std::env::var("ZS_LOG") {
        Ok(directives) => EnvFilter::builder().parse_lossy(directives),
        Err(_) if std::env::var("RUST_LOG").is_ok() => EnvFilter::from_default_env(),
        Err(_) => return,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
