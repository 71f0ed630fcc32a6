//! Comment neutralization over whole files.

use std::fs;
use streamfix::batch::{transform_job, BatchOptions};
use streamfix::{rewrite_file, CommentNeutralizer, CommitOptions, Effect, FileJob, Mode};
use tempfile::TempDir;

const SOURCE: &str = r#"#include <stdio.h>

/* Block comments
 * // stay as they are
 */
int main(void) {
    // greet
    puts("http://example.com"); // print the url
    char c = '/'; // slash
    return 0; // done */ really
}
"#;

const CONVERTED: &str = r#"#include <stdio.h>

/* Block comments
 * // stay as they are
 */
int main(void) {
    /* greet */
    puts("http://example.com"); /* print the url */
    char c = '/'; /* slash */
    return 0; /* done * really */
}
"#;

#[test]
fn test_rewrites_c_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("main.c");
    fs::write(&file, SOURCE).unwrap();

    let mut transform = CommentNeutralizer::new(false);
    let outcome = rewrite_file(&file, &mut transform, CommitOptions::default()).unwrap();

    assert_eq!(outcome.changes(), 4);
    assert_eq!(fs::read_to_string(&file).unwrap(), CONVERTED);
}

#[test]
fn test_second_run_is_no_op() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("main.c");
    fs::write(&file, CONVERTED).unwrap();

    let mut job = FileJob::from_path(&file);
    transform_job(
        &mut job,
        &Mode::CommentNeutralize { careful: false },
        &BatchOptions::default(),
    );

    assert_eq!(job.effect(), Effect::Count(0));
    assert!(!job.committed());
    assert_eq!(fs::read_to_string(&file).unwrap(), CONVERTED);
}

#[test]
fn test_careful_mode_leaves_quoted_lines() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("main.c");
    fs::write(&file, SOURCE).unwrap();

    let mut transform = CommentNeutralizer::new(true);
    let outcome = rewrite_file(&file, &mut transform, CommitOptions::default()).unwrap();

    // Only the comment lines without a quote before the `//` change.
    assert_eq!(outcome.changes(), 2);
    let text = fs::read_to_string(&file).unwrap();
    assert!(text.contains("    /* greet */\n"));
    assert!(text.contains("puts(\"http://example.com\"); // print the url\n"));
    assert!(text.contains("char c = '/'; // slash\n"));
    assert!(text.contains("return 0; /* done * really */\n"));
}
