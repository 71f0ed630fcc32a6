//! Streamfix: streaming in-place file rewriters
//!
//! A family of byte-level rewrite tools (case folding, tab conversion,
//! line-ending conversion, `//` comment neutralization, numbered-marker
//! substitution, byte-range deletion) built on one streaming engine.
//!
//! # Architecture
//!
//! Every tool compiles down to a single capability: [`Transform`], a
//! carry-state machine fed one chunk at a time. Intelligence lives in the
//! transform's state, not in the I/O: the same [`engine::run`] loop drives
//! in-place rewrites, dry runs and display.
//!
//! # Safety
//!
//! - Output is staged in a sibling temporary file (tempfile + fsync + rename)
//! - Files with zero changes are never rewritten, not even identically
//! - A failed write discards the temporary file and leaves the original
//! - Results sorted by effect are only reported after every file is done
//!
//! # Example
//!
//! ```no_run
//! use streamfix::{rewrite_file, CommitOptions, CommentNeutralizer};
//! use std::path::Path;
//!
//! let mut transform = CommentNeutralizer::new(false);
//! match rewrite_file(Path::new("src/main.c"), &mut transform, CommitOptions::default()) {
//!     Ok(outcome) => println!("{} comments converted", outcome.changes()),
//!     Err(e) => eprintln!("rewrite failed: {}", e),
//! }
//! ```

pub mod batch;
pub mod commit;
pub mod config;
pub mod discover;
pub mod display;
pub mod engine;
pub mod job;
pub mod reader;
pub mod report;
pub mod transform;
pub mod version;

// Re-exports
pub use batch::{
    run_two_pass, transform_all, BatchOptions, BatchTotals, FileStatus, Preview, ReportRecord,
    TwoPass,
};
pub use commit::{rewrite_file, CommitOptions, RewriteError, RewriteOutcome, TEMP_SUFFIX};
pub use config::{load_from_path, load_from_str, ConfigError, Settings, ValidationError};
pub use discover::{discover, DiscoverError, DiscoverOptions, Discovered};
pub use engine::{EngineOptions, StreamError};
pub use job::{Effect, EffectOrderKey, FileJob, SortOrder};
pub use transform::{
    CaseFold, CaseMode, ColumnOptions, CommentNeutralizer, LineEnding, LineEndingConvert,
    MarkerOptions, MarkerSubstitute, Mode, NumberBase, RangeDelete, TabConvert, TabDirection,
    Transform,
};
pub use version::{VersionError, LIBRARY_VERSION};
