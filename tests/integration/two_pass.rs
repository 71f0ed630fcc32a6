//! Effect-ordered reporting over a discovered directory.

use std::fs;
use std::path::PathBuf;
use streamfix::batch::{run_two_pass, BatchOptions, ReportRecord, TwoPass};
use streamfix::{discover, DiscoverOptions, Effect, EffectOrderKey, FileJob, Mode, SortOrder};
use tempfile::TempDir;

fn fixture() -> (TempDir, Vec<FileJob>) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("A.c"), "a(); // 1\nb(); // 2\nc(); // 3\n").unwrap();
    fs::write(dir.path().join("C.c"), "x(); // only\n").unwrap();
    fs::write(dir.path().join("D.c"), "/* none */\n").unwrap();

    let paths: Vec<PathBuf> = vec![
        dir.path().to_path_buf(),
        dir.path().join("B.c"), // never created
    ];
    let found = discover(&paths, &DiscoverOptions::default()).unwrap();
    (dir, found.jobs)
}

fn order(result: &TwoPass) -> Vec<&str> {
    result.jobs.iter().map(|j| j.name.as_str()).collect()
}

fn comments() -> Mode {
    Mode::CommentNeutralize { careful: false }
}

#[test]
fn test_ascending_puts_failures_first() {
    let (_dir, jobs) = fixture();
    let key = EffectOrderKey::new(SortOrder::Ascending, false);
    let result = run_two_pass(jobs, &comments(), &BatchOptions::default(), key);

    assert_eq!(order(&result), ["B.c", "D.c", "C.c", "A.c"]);
    assert_eq!(result.jobs[0].effect(), Effect::OpenFailed);
    assert_eq!(result.totals.files_found, 4);
    assert_eq!(result.totals.files_changed, 2);
    assert_eq!(result.totals.files_failed, 1);
    assert_eq!(result.totals.units, 4);
}

#[test]
fn test_descending_and_reverse() {
    let (_dir, jobs) = fixture();
    let key = EffectOrderKey::new(SortOrder::Descending, false);
    let result = run_two_pass(jobs, &comments(), &BatchOptions::default(), key);
    assert_eq!(order(&result), ["B.c", "A.c", "C.c", "D.c"]);

    let (_dir, jobs) = fixture();
    let key = EffectOrderKey::new(SortOrder::Descending, true);
    let result = run_two_pass(jobs, &comments(), &BatchOptions::default(), key);
    assert_eq!(order(&result), ["B.c", "D.c", "C.c", "A.c"]);
}

#[test]
fn test_dry_run_reports_without_committing() {
    let (dir, jobs) = fixture();
    let options = BatchOptions {
        dry_run: true,
        keep_preview: true,
        ..BatchOptions::default()
    };
    let key = EffectOrderKey::new(SortOrder::Descending, false);
    let result = run_two_pass(jobs, &comments(), &options, key);

    assert!(result.jobs.iter().all(|j| !j.committed()));
    assert_eq!(
        fs::read_to_string(dir.path().join("C.c")).unwrap(),
        "x(); // only\n"
    );
    let preview = &result.previews[&dir.path().join("C.c")];
    assert_eq!(preview.after, b"x(); /* only */\n");
    // Unchanged files carry no preview.
    assert!(!result.previews.contains_key(&dir.path().join("D.c")));

    let records: Vec<_> = result
        .jobs
        .iter()
        .map(|j| ReportRecord::from_job(j, true))
        .collect();
    assert_eq!(records[1].changes, Some(3));
}
