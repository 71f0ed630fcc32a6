//! Integration tests for the command-line interface.
//!
//! Every test runs the built `streamfix` binary against a temp directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn streamfix(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_streamfix"))
        .args(args)
        .current_dir(cwd)
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// A directory with three C files holding 3, 1 and 0 line comments.
fn setup_sources() -> TempDir {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("A.c"), "a(); // 1\nb(); // 2\nc(); // 3\n").unwrap();
    fs::write(src.join("C.c"), "x(); // only\n").unwrap();
    fs::write(src.join("D.c"), "/* none */\n").unwrap();
    fs::write(src.join("notes.txt"), "// text\n").unwrap();
    dir
}

#[test]
fn test_help_lists_tools() {
    let dir = TempDir::new().unwrap();
    let output = streamfix(&["--help"], dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    for tool in ["case", "tabs", "comments", "number", "cut", "eol", "show"] {
        assert!(text.contains(tool), "missing {tool} in help");
    }
}

#[test]
fn test_each_rewrite_tool_runs() {
    let dir = TempDir::new().unwrap();
    let cases: [(&[&str], &str, &str); 5] = [
        (&["case", "upper"], "abc\n", "ABC\n"),
        (&["tabs", "expand", "-t", "4"], "\tx\n", "    x\n"),
        (&["number", "-m", "@", "--start", "7"], "x@y@\n", "x7y8\n"),
        (&["cut", "--start", "1", "--end", "3"], "abcd\n", "ad\n"),
        (&["eol", "crlf"], "a\nb\n", "a\r\nb\r\n"),
    ];
    for (idx, (tool, before, after)) in cases.iter().enumerate() {
        let name = format!("f{idx}.txt");
        fs::write(dir.path().join(&name), before).unwrap();
        let mut args = tool.to_vec();
        args.push(&name);
        let output = streamfix(&args, dir.path());

        assert!(output.status.success(), "{tool:?}: {}", stderr(&output));
        assert_eq!(fs::read_to_string(dir.path().join(&name)).unwrap(), *after, "{tool:?}");
    }
}

#[test]
fn test_comments_sorted_by_effect() {
    let dir = setup_sources();
    let output = streamfix(
        &["comments", "--sort", "descending", "-p", "*.c", "src", "src/B.c"],
        dir.path(),
    );

    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    let position = |name: &str| {
        text.find(name)
            .unwrap_or_else(|| panic!("{name} not reported:\n{text}"))
    };
    assert!(position("B.c") < position("A.c"));
    assert!(position("A.c") < position("C.c"));
    assert!(position("C.c") < position("D.c"));
    assert!(!text.contains("notes.txt"));
    assert!(text.contains("Summary:"));
    assert!(text.contains("4 comments converted"));

    assert_eq!(
        fs::read_to_string(dir.path().join("src/C.c")).unwrap(),
        "x(); /* only */\n"
    );
    // Filtered out by the pattern.
    assert_eq!(
        fs::read_to_string(dir.path().join("src/notes.txt")).unwrap(),
        "// text\n"
    );
}

#[test]
fn test_dry_run_with_diff() {
    let dir = setup_sources();
    let output = streamfix(&["comments", "--diff", "src/C.c"], dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("DRY RUN"));
    assert!(text.contains("-x(); // only"));
    assert!(text.contains("+x(); /* only */"));
    assert_eq!(
        fs::read_to_string(dir.path().join("src/C.c")).unwrap(),
        "x(); // only\n"
    );
}

#[test]
fn test_json_report() {
    let dir = setup_sources();
    let output = streamfix(&["case", "upper", "--json", "-n", "src/C.c"], dir.path());

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["tool"], "case");
    assert_eq!(report["files"][0]["status"], "would-change");
    assert_eq!(report["files"][0]["changes"], 5);
    assert_eq!(report["totals"]["files_found"], 1);
}

#[test]
fn test_no_files_found_is_success() {
    let dir = setup_sources();
    let output = streamfix(&["eol", "crlf", "-p", "*.rs", "src"], dir.path());

    assert!(output.status.success());
    assert!(stdout(&output).contains("No files found."));
}

#[test]
fn test_missing_file_does_not_fail_batch() {
    let dir = setup_sources();
    let output = streamfix(&["tabs", "expand", "gone.c", "src/D.c"], dir.path());

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("✗"));
    assert!(text.contains("gone.c"));
    assert!(text.contains("1 failed"));
}

#[test]
fn test_config_error_exits_one() {
    let dir = setup_sources();
    fs::write(dir.path().join("bad.toml"), "tab_size = 0\n").unwrap();
    let output = streamfix(&["-c", "bad.toml", "tabs", "expand", "src"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("tab_size"));
    assert_eq!(
        fs::read_to_string(dir.path().join("src/A.c")).unwrap(),
        "a(); // 1\nb(); // 2\nc(); // 3\n"
    );
}

#[test]
fn test_config_supplies_defaults() {
    let dir = setup_sources();
    fs::write(
        dir.path().join("streamfix.toml"),
        "[marker]\nmarker = \"@N\"\nstart = 7\n",
    )
    .unwrap();
    fs::write(dir.path().join("ids.txt"), "@N @N\n").unwrap();

    let output = streamfix(
        &["--config", "streamfix.toml", "number", "--step", "3", "ids.txt"],
        dir.path(),
    );

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        fs::read_to_string(dir.path().join("ids.txt")).unwrap(),
        "7 10\n"
    );
}

#[test]
fn test_empty_cut_range_is_rejected() {
    let dir = setup_sources();
    let output = streamfix(&["cut", "--start", "4", "--end", "4", "src"], dir.path());

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("empty"));
}

#[test]
fn test_usage_error_exits_one() {
    let dir = TempDir::new().unwrap();
    let output = streamfix(&["tabs", "sideways", "x.c"], dir.path());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_show_numbers_lines() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("t.txt"), "a\tb\nc\x01\n").unwrap();
    let output = streamfix(&["show", "--tab-size", "4", "t.txt"], dir.path());

    assert!(output.status.success());
    assert_eq!(stdout(&output), "     1  a   b\n     2  c^A\n");
    assert_eq!(fs::read(dir.path().join("t.txt")).unwrap(), b"a\tb\nc\x01\n");
}
