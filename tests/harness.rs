//! Golden-file test harness for zero-sugar.
//!
//! Discovers `.input.js` files under `tests/fixtures/`, runs the pipeline
//! (parse → desugar → codegen), and compares output against the
//! corresponding `.expected.js` file. Both sides are compared after a
//! parse/print cycle, so expected files may be formatted freely.
//!
//! Set `ZS_UPDATE_FIXTURES=1` to overwrite expected files with actual output.
//!
//! Programs under `tests/fixtures/eval/` are run with `node` before and after
//! desugaring; both runs must print the same thing.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use zs_ast::DesugarConfig;
use zs_desugar::{transform, transform_code_with};
use zs_parser::{parse_js, print_program};

fn fixtures_dir() -> PathBuf {
    // CARGO_MANIFEST_DIR is crates/zs_test/, so go up two levels to workspace root.
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
}

fn collect_input_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if !dir.exists() {
        return files;
    }
    for entry in walkdir(dir) {
        if entry
            .file_name()
            .unwrap()
            .to_str()
            .is_some_and(|n| n.ends_with(".input.js"))
        {
            files.push(entry);
        }
    }
    files.sort();
    files
}

fn walkdir(dir: &Path) -> Vec<PathBuf> {
    let mut result = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                result.extend(walkdir(&path));
            } else {
                result.push(path);
            }
        }
    }
    result
}

fn run_pipeline(source: &str, filename: &str) -> Result<String> {
    let parsed = parse_js(source, filename)?;
    let result = transform(parsed.program);
    let errors: Vec<String> = result
        .diagnostics
        .iter()
        .filter(|d| d.is_error())
        .map(ToString::to_string)
        .collect();
    if !errors.is_empty() {
        bail!("{}", errors.join("\n"));
    }
    Ok(print_program(&result.program, &parsed.source_map, false)?.code)
}

/// Parse and print, so formatting differences do not count.
fn normalize(source: &str, filename: &str) -> Result<String> {
    let parsed = parse_js(source, filename)?;
    Ok(print_program(&parsed.program, &parsed.source_map, false)?.code)
}

#[test]
fn golden_file_tests() {
    let fixtures = fixtures_dir();
    let input_files: Vec<_> = collect_input_files(&fixtures)
        .into_iter()
        .filter(|p| !p.starts_with(fixtures.join("roundtrip")))
        .collect();

    assert!(
        !input_files.is_empty(),
        "No test fixtures found in {}",
        fixtures.display()
    );

    let update_mode = std::env::var("ZS_UPDATE_FIXTURES").is_ok();
    let mut failures = Vec::new();

    for input_path in &input_files {
        let expected_path = input_path
            .to_str()
            .unwrap()
            .replace(".input.js", ".expected.js");
        let expected_path = PathBuf::from(&expected_path);

        let test_name = input_path
            .strip_prefix(&fixtures)
            .unwrap()
            .display()
            .to_string();

        let source = match std::fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read input: {e}"));
                continue;
            }
        };

        let filename = input_path.display().to_string();
        let actual = match run_pipeline(&source, &filename) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: pipeline failed: {e}"));
                continue;
            }
        };

        if update_mode {
            if let Err(e) = std::fs::write(&expected_path, &actual) {
                failures.push(format!("{test_name}: failed to write expected: {e}"));
            }
            continue;
        }

        if !expected_path.exists() {
            failures.push(format!(
                "{test_name}: missing expected file: {}",
                expected_path.display()
            ));
            continue;
        }

        let expected = match std::fs::read_to_string(&expected_path)
            .map_err(anyhow::Error::from)
            .and_then(|s| normalize(&s, &expected_path.display().to_string()))
        {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read expected: {e}"));
                continue;
            }
        };
        if actual.trim() != expected.trim() {
            failures.push(format!(
                "{test_name}: output mismatch\n--- expected ---\n{}\n--- actual ---\n{}",
                expected.trim(),
                actual.trim()
            ));
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} golden test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}

/// Every fixture's output must parse again, and desugaring it a second
/// time must not change it.
#[test]
fn roundtrip_tests() {
    let fixtures = fixtures_dir();
    let input_files = collect_input_files(&fixtures);

    let mut failures = Vec::new();

    for input_path in &input_files {
        let test_name = input_path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let source = match std::fs::read_to_string(input_path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read: {e}"));
                continue;
            }
        };

        let filename = input_path.display().to_string();
        let output = match run_pipeline(&source, &filename) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: pipeline failed: {e}"));
                continue;
            }
        };

        let output_name = format!("{test_name}.output");
        let reparsed = match normalize(&output, &output_name) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!(
                    "{test_name}: output is not valid JavaScript: {e}\n--- output ---\n{}",
                    output.trim()
                ));
                continue;
            }
        };

        match run_pipeline(&output, &output_name) {
            Ok(again) if again.trim() == reparsed.trim() => {}
            Ok(again) => failures.push(format!(
                "{test_name}: output is not a fixpoint\n--- once ---\n{}\n--- twice ---\n{}",
                reparsed.trim(),
                again.trim()
            )),
            Err(e) => failures.push(format!("{test_name}: second run failed: {e}")),
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} roundtrip test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}

fn node_available() -> bool {
    Command::new("node")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

/// Run `source` as an ES module and return its stdout.
fn run_node(source: &str) -> Result<String> {
    let mut child = Command::new("node")
        .arg("--input-type=module")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("failed to start node")?;
    child
        .stdin
        .take()
        .context("node stdin unavailable")?
        .write_all(source.as_bytes())?;
    let output = child.wait_with_output()?;
    if !output.status.success() {
        bail!("node failed: {}", String::from_utf8_lossy(&output.stderr));
    }
    Ok(String::from_utf8(output.stdout)?)
}

/// Desugared programs must behave exactly like their input.
#[test]
fn evaluation_tests() {
    if !node_available() {
        eprintln!("node not found; skipping evaluation tests");
        return;
    }

    let dir = fixtures_dir().join("eval");
    let mut programs: Vec<_> = walkdir(&dir)
        .into_iter()
        .filter(|p| p.extension().is_some_and(|ext| ext == "js"))
        .collect();
    programs.sort();
    assert!(!programs.is_empty(), "No programs found in {}", dir.display());

    let config = DesugarConfig {
        emit_for_in_helper: true,
        ..Default::default()
    };
    let mut failures = Vec::new();

    for path in &programs {
        let test_name = path.file_name().unwrap().to_string_lossy().to_string();
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                failures.push(format!("{test_name}: failed to read: {e}"));
                continue;
            }
        };

        let output = match transform_code_with(&source, &test_name, &config) {
            Ok(output) if !output.had_error => output.transformed_code,
            Ok(output) => {
                failures.push(format!(
                    "{test_name}: desugaring failed: {}",
                    output.error_message.unwrap_or_default()
                ));
                continue;
            }
            Err(e) => {
                failures.push(format!("{test_name}: {e}"));
                continue;
            }
        };

        let expected = match run_node(&source) {
            Ok(stdout) if !stdout.trim().is_empty() => stdout,
            Ok(_) => {
                failures.push(format!("{test_name}: program printed nothing"));
                continue;
            }
            Err(e) => {
                failures.push(format!("{test_name}: input does not run: {e}"));
                continue;
            }
        };

        match run_node(&output) {
            Ok(actual) if actual == expected => {}
            Ok(actual) => failures.push(format!(
                "{test_name}: behaviour changed\n--- input printed ---\n{}\n--- output printed ---\n{}\n--- output ---\n{}",
                expected.trim(),
                actual.trim(),
                output.trim()
            )),
            Err(e) => failures.push(format!(
                "{test_name}: output does not run: {e}\n--- output ---\n{}",
                output.trim()
            )),
        }
    }

    if !failures.is_empty() {
        panic!(
            "\n{} evaluation test(s) failed:\n\n{}",
            failures.len(),
            failures.join("\n\n")
        );
    }
}
