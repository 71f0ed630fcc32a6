//! Commit protocol: staged output, rename, and untouched originals.

use filetime::FileTime;
use std::fs;
use std::path::Path;
use streamfix::{
    rewrite_file, CaseFold, CaseMode, CommitOptions, EngineOptions, LineEnding,
    LineEndingConvert, RewriteOutcome, TEMP_SUFFIX,
};
use tempfile::TempDir;

fn leftovers(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(TEMP_SUFFIX))
        .collect()
}

fn small_buffers() -> CommitOptions {
    CommitOptions {
        engine: EngineOptions {
            chunk_size: 5,
            buffer_capacity: 7,
        },
        preserve_mtime: false,
    }
}

#[test]
fn test_commit_replaces_contents() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(&file, "Mixed Case\nline two\n").unwrap();

    let mut transform = CaseFold::new(CaseMode::Upper);
    let outcome = rewrite_file(&file, &mut transform, small_buffers()).unwrap();

    assert_eq!(outcome, RewriteOutcome::Committed { changes: 14 });
    assert_eq!(fs::read_to_string(&file).unwrap(), "MIXED CASE\nLINE TWO\n");
    assert!(leftovers(dir.path()).is_empty());
}

#[test]
fn test_no_op_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("unix.txt");
    fs::write(&file, "already\nlf\n").unwrap();
    let old = FileTime::from_unix_time(1_000_000, 0);
    filetime::set_file_mtime(&file, old).unwrap();

    let mut transform = LineEndingConvert::new(LineEnding::Lf);
    let outcome = rewrite_file(&file, &mut transform, small_buffers()).unwrap();

    assert_eq!(outcome, RewriteOutcome::Unchanged);
    let meta = fs::metadata(&file).unwrap();
    assert_eq!(FileTime::from_last_modification_time(&meta), old);
    assert_eq!(fs::read_to_string(&file).unwrap(), "already\nlf\n");
    assert!(leftovers(dir.path()).is_empty());
}

#[cfg(unix)]
#[test]
fn test_rename_gives_new_inode_only_on_change() {
    use std::os::unix::fs::MetadataExt;

    let dir = TempDir::new().unwrap();
    let file = dir.path().join("dos.txt");
    fs::write(&file, "a\nb\n").unwrap();
    let before = fs::metadata(&file).unwrap().ino();

    let mut transform = LineEndingConvert::new(LineEnding::Lf);
    let outcome = rewrite_file(&file, &mut transform, CommitOptions::default()).unwrap();
    assert_eq!(outcome.changes(), 0);
    assert_eq!(fs::metadata(&file).unwrap().ino(), before);

    let mut transform = LineEndingConvert::new(LineEnding::Crlf);
    let outcome = rewrite_file(&file, &mut transform, CommitOptions::default()).unwrap();
    assert_eq!(outcome.changes(), 2);
    assert_ne!(fs::metadata(&file).unwrap().ino(), before);
    assert_eq!(fs::read(&file).unwrap(), b"a\r\nb\r\n");
}

#[test]
fn test_preserve_mtime_on_commit() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("keep.txt");
    fs::write(&file, "lower\n").unwrap();
    let old = FileTime::from_unix_time(1_234_567_890, 0);
    filetime::set_file_mtime(&file, old).unwrap();

    let mut transform = CaseFold::new(CaseMode::Upper);
    let options = CommitOptions {
        preserve_mtime: true,
        ..small_buffers()
    };
    let outcome = rewrite_file(&file, &mut transform, options).unwrap();

    assert_eq!(outcome.changes(), 5);
    let meta = fs::metadata(&file).unwrap();
    assert_eq!(FileTime::from_last_modification_time(&meta), old);
}

#[test]
fn test_missing_file_is_open_failure() {
    let dir = TempDir::new().unwrap();
    let mut transform = CaseFold::new(CaseMode::Lower);
    let err = rewrite_file(
        &dir.path().join("absent.txt"),
        &mut transform,
        CommitOptions::default(),
    )
    .unwrap_err();

    assert!(err.is_open_failure());
    assert!(leftovers(dir.path()).is_empty());
}
