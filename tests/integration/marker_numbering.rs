//! Marker numbering through the streaming engine with tiny chunks.

use std::fs;
use streamfix::batch::{transform_all, BatchOptions};
use streamfix::{
    rewrite_file, CommitOptions, EngineOptions, FileJob, MarkerOptions, MarkerSubstitute, Mode,
    NumberBase,
};
use tempfile::TempDir;

#[test]
fn test_markers_split_by_every_chunk_size() {
    let input = "t(/* # */);\nt(/* /* # */);\nt(/* #*/);\n";
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("cases.c");

    for chunk_size in 1..=9 {
        fs::write(&file, input).unwrap();
        let mut transform = MarkerSubstitute::new(MarkerOptions::default());
        let options = CommitOptions {
            engine: EngineOptions {
                chunk_size,
                buffer_capacity: 4,
            },
            preserve_mtime: false,
        };
        let outcome = rewrite_file(&file, &mut transform, options).unwrap();

        assert_eq!(outcome.changes(), 2, "chunk size {chunk_size}");
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "t(1);\nt(/* 2);\nt(/* #*/);\n",
            "chunk size {chunk_size}"
        );
    }
}

#[test]
fn test_numbering_restarts_per_file() {
    let dir = TempDir::new().unwrap();
    for name in ["a.txt", "b.txt"] {
        fs::write(dir.path().join(name), "id=@@ id=@@\n").unwrap();
    }
    let mut jobs = vec![FileJob::new(dir.path(), "a.txt"), FileJob::new(dir.path(), "b.txt")];
    let mode = Mode::MarkerSubstitute(MarkerOptions {
        marker: "@@".to_string(),
        start: 10,
        step: 5,
        width: 4,
        zero_pad: true,
        base: NumberBase::Hex,
    });

    let totals = transform_all(&mut jobs, &mode, &BatchOptions::default(), |_, _| {});

    assert_eq!(totals.units, 4);
    for name in ["a.txt", "b.txt"] {
        assert_eq!(
            fs::read_to_string(dir.path().join(name)).unwrap(),
            "id=000A id=000F\n"
        );
    }
}
