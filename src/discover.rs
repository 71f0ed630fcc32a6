//! Turning command-line path arguments into [`FileJob`]s.

use crate::job::FileJob;
use globset::{Glob, GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Clone, Default)]
pub struct DiscoverOptions {
    /// Descend into subdirectories of directory arguments.
    pub recursive: bool,
    /// Include symbolic links to files (and follow directory links when
    /// recursing).
    pub follow_links: bool,
    /// Only keep files whose name matches this glob.
    pub pattern: Option<String>,
    pub case_sensitive: bool,
}

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("invalid name pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: globset::Error,
    },
}

/// Result of expanding the path arguments.
#[derive(Debug, Default)]
pub struct Discovered {
    pub jobs: Vec<FileJob>,
    /// Paths that could not be visited, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

fn build_matcher(options: &DiscoverOptions) -> Result<Option<GlobMatcher>, DiscoverError> {
    let Some(pattern) = options.pattern.as_deref() else {
        return Ok(None);
    };
    let glob: Glob = GlobBuilder::new(pattern)
        .case_insensitive(!options.case_sensitive)
        .literal_separator(true)
        .build()
        .map_err(|source| DiscoverError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
    Ok(Some(glob.compile_matcher()))
}

/// Expand `paths` into file jobs, in argument order.
///
/// A file argument is always taken (when it matches the pattern); a
/// directory argument contributes its files, recursively if requested.
/// A path that does not exist becomes a job anyway, so the failure is
/// reported through the normal open-failure channel.
pub fn discover(paths: &[PathBuf], options: &DiscoverOptions) -> Result<Discovered, DiscoverError> {
    let matcher = build_matcher(options)?;
    let mut found = Discovered::default();

    for path in paths {
        if path.is_dir() {
            walk_dir(path, options, matcher.as_ref(), &mut found);
        } else if name_matches(path, matcher.as_ref()) {
            found.jobs.push(FileJob::from_path(path));
        }
    }

    log::debug!(
        "discovered {} files ({} skipped)",
        found.jobs.len(),
        found.skipped.len()
    );
    Ok(found)
}

fn walk_dir(
    root: &Path,
    options: &DiscoverOptions,
    matcher: Option<&GlobMatcher>,
    found: &mut Discovered,
) {
    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(options.follow_links)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                log::warn!("skipping {}: {}", path.display(), err);
                found.skipped.push((path, err.to_string()));
                continue;
            }
        };

        // With `follow_links`, a link reports its target's type.
        if entry.file_type().is_file() && name_matches(entry.path(), matcher) {
            found.jobs.push(FileJob::from_path(entry.path()));
        }
    }
}

fn name_matches(path: &Path, matcher: Option<&GlobMatcher>) -> bool {
    let Some(matcher) = matcher else {
        return true;
    };
    path.file_name().is_some_and(|name| matcher.is_match(name))
}
