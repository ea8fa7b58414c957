//! `fc check` command: infer and check every annotated function

use anyhow::{Context, Result};
use fc_analysis::{check_program, AnalyzerOptions, FunctionReport, Severity};
use fc_core::{Config, CoreError, Program};
use futures::future::join_all;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::{CheckArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{load_config, usage_error, ExitCode};

/// Check results for one program file
#[derive(Debug, Serialize)]
pub(crate) struct FileResult {
    pub file: String,
    pub functions: Vec<FunctionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    fn failed(file: &Path, error: String) -> Self {
        Self {
            file: file.display().to_string(),
            functions: Vec::new(),
            error: Some(error),
        }
    }
}

/// Execute the check command
pub async fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global, !args.paths.is_empty()).map_err(usage_error)?;

    let roots: Vec<PathBuf> = if args.paths.is_empty() {
        config.paths_absolute(Path::new(&global.project_dir))
    } else {
        args.paths.iter().map(PathBuf::from).collect()
    };

    let files = discover_files(&roots, &config).map_err(usage_error)?;
    if global.verbose {
        eprintln!("[verbose] Checking {} file(s)", files.len());
    }
    if files.is_empty() {
        println!("No program files found.");
        return Ok(());
    }

    let strict = args.strict || config.strict;
    let options = AnalyzerOptions {
        report_inferred: config.report_inferred,
    };

    let results = check_files(files, options, global.verbose).await;

    match args.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&results)
                .context("Failed to serialize check results")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            let palette = Palette::new(!args.no_color);
            print!("{}", render_text(&results, strict, &palette));
        }
    }

    if has_failures(&results, strict) {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Expand roots into a sorted, de-duplicated list of program files.
///
/// A file root must carry a configured extension; a directory root is
/// searched recursively for such files.
pub(crate) fn discover_files(roots: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in roots {
        if root.is_file() {
            if !config.is_program_file(root) {
                anyhow::bail!(
                    "{} is not a program file (expected extension: {})",
                    root.display(),
                    config.extensions.join(", ")
                );
            }
            files.push(root.clone());
            continue;
        }
        if !root.is_dir() {
            return Err(CoreError::PathNotFound {
                path: root.display().to_string(),
            }
            .into());
        }
        let pattern = root.join("**").join("*");
        let pattern = pattern.to_string_lossy();
        let entries =
            glob::glob(&pattern).with_context(|| format!("Invalid search pattern '{}'", pattern))?;
        for entry in entries {
            let path = entry.context("Failed to read directory entry")?;
            if path.is_file() && config.is_program_file(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Check files concurrently, one blocking task per file, keeping input order
async fn check_files(files: Vec<PathBuf>, options: AnalyzerOptions, verbose: bool) -> Vec<FileResult> {
    let tasks = files.iter().cloned().map(|path| {
        tokio::task::spawn_blocking(move || {
            if verbose {
                eprintln!("[verbose] Checking {}", path.display());
            }
            check_file(&path, options)
        })
    });

    let joined = join_all(tasks).await;
    files
        .iter()
        .zip(joined)
        .map(|(path, joined)| task_result(path, joined))
        .collect()
}

/// A task that panicked or was cancelled still reports its own file
pub(crate) fn task_result(
    path: &Path,
    joined: std::result::Result<FileResult, tokio::task::JoinError>,
) -> FileResult {
    joined.unwrap_or_else(|err| FileResult::failed(path, format!("check task failed: {}", err)))
}

/// Load and check one program file
pub(crate) fn check_file(path: &Path, options: AnalyzerOptions) -> FileResult {
    match Program::load(path) {
        Ok(program) => {
            log::debug!(
                "checking {} function(s) in {}",
                program.functions.len(),
                path.display()
            );
            FileResult {
                file: path.display().to_string(),
                functions: check_program(&program, options),
                error: None,
            }
        }
        Err(err) => FileResult::failed(path, err.to_string()),
    }
}

fn has_failures(results: &[FileResult], strict: bool) -> bool {
    results
        .iter()
        .any(|r| r.error.is_some() || r.functions.iter().any(|f| !f.passed(strict)))
}

/// ANSI styling, disabled for `--no-color` / `NO_COLOR`
pub(crate) struct Palette {
    enabled: bool,
}

impl Palette {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.paint("32", text)
    }

    fn red(&self, text: &str) -> String {
        self.paint("31", text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint("33", text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }
}

/// Render the human-readable report, including the closing summary line
pub(crate) fn render_text(results: &[FileResult], strict: bool, palette: &Palette) -> String {
    let mut out = String::new();
    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut load_errors = 0usize;

    for result in results {
        out.push_str(&palette.bold(&result.file));
        out.push('\n');

        if let Some(error) = &result.error {
            load_errors += 1;
            out.push_str(&format!("  {} {}\n", palette.red("error:"), error));
            continue;
        }
        if result.functions.is_empty() {
            out.push_str(&format!("  {}\n", palette.dim("no annotated functions")));
        }

        for report in &result.functions {
            let ok = report.passed(strict);
            if ok {
                passed += 1;
            } else {
                failed += 1;
            }
            let status = if ok {
                palette.green("OK")
            } else {
                palette.red("FAIL")
            };
            out.push_str(&format!("  {}: {}\n", report.function, status));

            for diagnostic in &report.diagnostics {
                let line = match diagnostic.severity {
                    Severity::Error => diagnostic.message.clone(),
                    Severity::Warning => format!("{} {}", palette.yellow("warning:"), diagnostic.message),
                    Severity::Info => palette.dim(&diagnostic.message),
                };
                out.push_str(&format!("    - {}\n", line));
            }
        }
    }

    out.push('\n');
    if failed == 0 && load_errors == 0 {
        out.push_str(&palette.green(&format!("All {} function(s) passed.", passed)));
    } else {
        let mut summary = format!("{} function(s) failed, {} passed.", failed, passed);
        if load_errors > 0 {
            summary.push_str(&format!(" {} file(s) could not be loaded.", load_errors));
        }
        out.push_str(&palette.red(&summary));
    }
    out.push('\n');
    out
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
