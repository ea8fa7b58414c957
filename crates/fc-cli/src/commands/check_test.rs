use super::*;
use fc_analysis::TypeError;
use std::fs;
use tempfile::TempDir;

fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn report(function: &str, errors: Vec<TypeError>) -> FunctionReport {
    let diagnostics = errors
        .into_iter()
        .map(|e| fc_analysis::Diagnostic::new(function, None, e))
        .collect();
    FunctionReport {
        function: function.to_string(),
        declared: None,
        inferred: Vec::new(),
        diagnostics,
    }
}

fn file(name: &str, functions: Vec<FunctionReport>) -> FileResult {
    FileResult {
        file: name.to_string(),
        functions,
        error: None,
    }
}

const VALID_PROGRAM: &str = r#"
functions:
  - name: passthrough
    params:
      - name: data
        schema: "{id: Int64}"
    returns: "{id: Int64}"
    body:
      - return: { var: data }
"#;

#[test]
fn test_discover_files_recurses_and_filters_extensions() {
    let temp = TempDir::new().unwrap();
    let a = write(temp.path(), "a.yml", VALID_PROGRAM);
    let b = write(temp.path(), "nested/b.yaml", VALID_PROGRAM);
    write(temp.path(), "notes.txt", "not a program");

    let files = discover_files(&[temp.path().to_path_buf()], &Config::default()).unwrap();
    assert_eq!(files, vec![a, b]);
}

#[test]
fn test_discover_files_accepts_explicit_file_and_dedups() {
    let temp = TempDir::new().unwrap();
    let a = write(temp.path(), "a.yml", VALID_PROGRAM);

    let roots = vec![a.clone(), temp.path().to_path_buf()];
    let files = discover_files(&roots, &Config::default()).unwrap();
    assert_eq!(files, vec![a]);
}

#[test]
fn test_discover_files_missing_root_is_error() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope");
    let err = discover_files(&[missing], &Config::default()).unwrap_err();
    assert!(err.to_string().contains("Path not found"));
}

#[test]
fn test_discover_files_rejects_explicit_non_program_file() {
    let temp = TempDir::new().unwrap();
    let notes = write(temp.path(), "notes.txt", "not a program");
    let err = discover_files(&[notes], &Config::default()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("notes.txt is not a program file"), "{}", message);
    assert!(message.contains("yml, yaml"), "{}", message);
}

#[test]
fn test_discover_files_uses_configured_extensions() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.yml", VALID_PROGRAM);
    let custom = write(temp.path(), "nested/b.fc", VALID_PROGRAM);
    let config = Config {
        extensions: vec!["fc".to_string()],
        ..Config::default()
    };
    let files = discover_files(&[temp.path().to_path_buf()], &config).unwrap();
    assert_eq!(files, vec![custom]);
}

#[tokio::test]
async fn test_panicked_task_keeps_file_name() {
    let joined = tokio::task::spawn_blocking(|| -> FileResult { panic!("boom") }).await;
    assert!(joined.is_err());
    let result = task_result(Path::new("models/broken.yml"), joined);
    assert_eq!(result.file, "models/broken.yml");
    assert!(result.functions.is_empty());
    let error = result.error.unwrap();
    assert!(error.starts_with("check task failed:"), "{}", error);
}

#[test]
fn test_finished_task_passes_through() {
    let finished = FileResult::failed(Path::new("a.yml"), "load error".to_string());
    let result = task_result(Path::new("a.yml"), Ok(finished));
    assert_eq!(result.error.as_deref(), Some("load error"));
}

#[test]
fn test_check_file_reports_load_error() {
    let temp = TempDir::new().unwrap();
    let path = write(temp.path(), "broken.yml", "functions: [");
    let result = check_file(&path, AnalyzerOptions::default());
    assert!(result.functions.is_empty());
    assert!(result.error.is_some());
}

#[test]
fn test_check_file_runs_analysis() {
    let temp = TempDir::new().unwrap();
    let path = write(temp.path(), "ok.yml", VALID_PROGRAM);
    let result = check_file(&path, AnalyzerOptions::default());
    assert!(result.error.is_none());
    assert_eq!(result.functions.len(), 1);
    assert!(result.functions[0].is_ok());
}

#[test]
fn test_render_all_passed() {
    let results = vec![file("a.yml", vec![report("f", vec![]), report("g", vec![])])];
    let text = render_text(&results, false, &Palette::new(false));
    assert!(text.starts_with("a.yml\n"));
    assert!(text.contains("  f: OK\n"));
    assert!(text.contains("  g: OK\n"));
    assert!(text.ends_with("All 2 function(s) passed.\n"));
    assert!(!has_failures(&results, false));
}

#[test]
fn test_render_failure_lists_messages() {
    let results = vec![file(
        "a.yml",
        vec![
            report(
                "bad",
                vec![TypeError::UnknownVariable {
                    name: "x".to_string(),
                }],
            ),
            report("good", vec![]),
        ],
    )];
    let text = render_text(&results, false, &Palette::new(false));
    assert!(text.contains("  bad: FAIL\n"));
    assert!(text.contains("    - [FT011] Unknown variable 'x'\n"));
    assert!(text.ends_with("1 function(s) failed, 1 passed.\n"));
    assert!(has_failures(&results, false));
}

#[test]
fn test_strict_mode_fails_on_warnings() {
    let warning = TypeError::MissingAlias {
        function: "sum".to_string(),
        default_name: "v_sum".to_string(),
    };
    let results = vec![file("a.yml", vec![report("totals", vec![warning])])];

    let lenient = render_text(&results, false, &Palette::new(false));
    assert!(lenient.contains("  totals: OK\n"));
    assert!(lenient.contains("    - warning: [FT008]"));
    assert!(!has_failures(&results, false));

    let strict = render_text(&results, true, &Palette::new(false));
    assert!(strict.contains("  totals: FAIL\n"));
    assert!(has_failures(&results, true));
}

#[test]
fn test_render_load_error() {
    let results = vec![FileResult {
        file: "broken.yml".to_string(),
        functions: Vec::new(),
        error: Some("[E004] bad document".to_string()),
    }];
    let text = render_text(&results, false, &Palette::new(false));
    assert!(text.contains("  error: [E004] bad document\n"));
    assert!(text.contains("1 file(s) could not be loaded."));
    assert!(has_failures(&results, false));
}

#[test]
fn test_palette_colors_only_when_enabled() {
    assert_eq!(Palette::new(false).red("x"), "x");
    assert_eq!(Palette::new(true).red("x"), "\x1b[31mx\x1b[0m");
}

#[test]
fn test_json_output_omits_missing_error() {
    let results = vec![file("a.yml", vec![report("f", vec![])])];
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json[0]["file"], "a.yml");
    assert_eq!(json[0]["functions"][0]["function"], "f");
    assert!(json[0].get("error").is_none());
}
