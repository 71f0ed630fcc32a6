//! Property tests over arbitrary input.

use proptest::prelude::*;
use streamfix::engine::run_to_vec;
use streamfix::{
    ColumnOptions, CommentNeutralizer, EngineOptions, TabConvert, TabDirection, Transform,
};

fn run(transform: &mut dyn Transform, input: &[u8], chunk_size: usize) -> Vec<u8> {
    let options = EngineOptions {
        chunk_size,
        buffer_capacity: 3,
    };
    run_to_vec(input, transform, options).unwrap().0
}

fn neutralize(input: &[u8], careful: bool, chunk_size: usize) -> (Vec<u8>, u64) {
    let mut t = CommentNeutralizer::new(careful);
    let out = run(&mut t, input, chunk_size);
    (out, t.changes())
}

fn tabs(direction: TabDirection, tab_size: usize, input: &[u8]) -> Vec<u8> {
    let mut t = TabConvert::new(ColumnOptions {
        direction,
        tab_size,
        ..ColumnOptions::default()
    });
    run(&mut t, input, 7)
}

/// Visible bytes of each line with the column they land on.
fn layout(input: &[u8], tab_size: usize) -> Vec<Vec<(usize, u8)>> {
    input
        .split(|&b| b == b'\n')
        .map(|line| {
            let mut column = 0;
            let mut visible = Vec::new();
            for &b in line {
                match b {
                    b' ' => column += 1,
                    b'\t' => column = (column / tab_size + 1) * tab_size,
                    _ => {
                        visible.push((column, b));
                        column += 1;
                    }
                }
            }
            visible
        })
        .collect()
}

fn source_text() -> impl Strategy<Value = Vec<u8>> {
    let alphabet = vec![b'/', b'*', b'"', b'\'', b'\\', b'\n', b'\r', b' ', b'a'];
    prop::collection::vec(prop::sample::select(alphabet), 0..80)
}

fn indented_text() -> impl Strategy<Value = Vec<u8>> {
    let alphabet = vec![b' ', b' ', b'\t', b'\n', b'x', b'y'];
    prop::collection::vec(prop::sample::select(alphabet), 0..80)
}

proptest! {
    #[test]
    fn comment_neutralize_is_idempotent(input in source_text(), careful in any::<bool>()) {
        let (once, _) = neutralize(&input, careful, 64);
        let (twice, changes) = neutralize(&once, careful, 64);
        prop_assert_eq!(changes, 0);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn comment_neutralize_ignores_chunking(
        input in source_text(),
        careful in any::<bool>(),
        chunk_size in 1usize..9,
    ) {
        let whole = neutralize(&input, careful, input.len().max(1));
        prop_assert_eq!(neutralize(&input, careful, chunk_size), whole);
    }

    #[test]
    fn tab_round_trip_keeps_columns(input in indented_text(), tab_size in 1usize..9) {
        let expanded = tabs(TabDirection::Expand, tab_size, &input);
        prop_assert!(!expanded.contains(&b'\t'));
        let compressed = tabs(TabDirection::Compress, tab_size, &expanded);
        prop_assert_eq!(layout(&compressed, tab_size), layout(&input, tab_size));
        prop_assert_eq!(layout(&expanded, tab_size), layout(&input, tab_size));
    }
}
