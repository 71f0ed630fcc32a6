//! In-place rewriting with atomic commit.
//!
//! Output always goes to a sibling temporary file first. The original is
//! replaced only when the transform changed something and every write
//! succeeded; otherwise the temporary file is discarded and the original
//! is left byte-for-byte (and timestamp-for-timestamp) untouched.

use crate::engine::{self, EngineOptions, StreamError};
use crate::transform::Transform;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Suffix of every temporary file this crate creates.
pub const TEMP_SUFFIX: &str = ".sfx~";

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("cannot open {path}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

impl RewriteError {
    pub fn path(&self) -> &Path {
        match self {
            RewriteError::Open { path, .. }
            | RewriteError::Read { path, .. }
            | RewriteError::Write { path, .. } => path,
        }
    }

    /// True when the source could not be opened at all.
    pub fn is_open_failure(&self) -> bool {
        matches!(self, RewriteError::Open { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitOptions {
    pub engine: EngineOptions,
    /// Give the rewritten file the original's modification time.
    pub preserve_mtime: bool,
}

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "RewriteOutcome should be checked for committed/unchanged"]
pub enum RewriteOutcome {
    /// The original was replaced.
    Committed { changes: u64 },
    /// Nothing to change; the original was not touched.
    Unchanged,
}

impl RewriteOutcome {
    pub fn changes(&self) -> u64 {
        match self {
            RewriteOutcome::Committed { changes } => *changes,
            RewriteOutcome::Unchanged => 0,
        }
    }
}

/// Rewrite `path` in place through `transform`.
pub fn rewrite_file(
    path: &Path,
    transform: &mut dyn Transform,
    options: CommitOptions,
) -> Result<RewriteOutcome, RewriteError> {
    rewrite_file_with(path, transform, options, direct)
}

fn direct(temp: &mut NamedTempFile) -> Box<dyn Write + '_> {
    Box::new(temp)
}

/// Like [`rewrite_file`], with the temp-file writer wrapped by `wrap`.
///
/// The wrapper sees every byte destined for the temporary file, which lets
/// tests inject write failures at a chosen point.
pub(crate) fn rewrite_file_with<F>(
    path: &Path,
    transform: &mut dyn Transform,
    options: CommitOptions,
    wrap: F,
) -> Result<RewriteOutcome, RewriteError>
where
    F: FnOnce(&mut NamedTempFile) -> Box<dyn Write + '_>,
{
    let source = File::open(path).map_err(|source| RewriteError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = source.metadata().map_err(|source| RewriteError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let write_err = |source: io::Error| RewriteError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = create_temp(path).map_err(write_err)?;
    log::debug!("{}: staging into {}", path.display(), temp.path().display());

    let streamed = {
        let sink = wrap(&mut temp);
        engine::run(&source, sink, transform, options.engine)
    };
    let changes = match streamed {
        Ok(changes) => changes,
        // Dropping `temp` removes the temporary file.
        Err(StreamError::Read(source)) => {
            return Err(RewriteError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
        Err(StreamError::Write(source)) => return Err(write_err(source)),
    };

    if changes == 0 {
        log::debug!("{}: no changes, discarding temp file", path.display());
        return Ok(RewriteOutcome::Unchanged);
    }

    stage(&temp, &metadata, options.preserve_mtime).map_err(write_err)?;
    drop(source);
    // Nothing may fail after this point: the original is gone.
    temp.persist(path).map_err(|e| write_err(e.error))?;

    log::info!("{}: committed {} changes", path.display(), changes);
    Ok(RewriteOutcome::Committed { changes })
}

/// Give the temporary file the original's permissions (and, if asked, its
/// modification time) and flush it to disk, ready to be renamed.
fn stage(temp: &NamedTempFile, original: &fs::Metadata, preserve_mtime: bool) -> io::Result<()> {
    if preserve_mtime {
        let mtime = filetime::FileTime::from_last_modification_time(original);
        filetime::set_file_handle_times(temp.as_file(), None, Some(mtime))?;
    }
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), original.permissions())
}

/// Transform `path` into memory without touching the file system.
pub fn preview_file(
    path: &Path,
    transform: &mut dyn Transform,
    options: EngineOptions,
) -> Result<(Vec<u8>, u64), RewriteError> {
    let source = File::open(path).map_err(|source| RewriteError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    preview_from(path, &source, transform, options)
}

/// Like [`preview_file`], also returning the original bytes as they were
/// read: `(before, after, changes)`.
pub fn preview_file_with_source(
    path: &Path,
    transform: &mut dyn Transform,
    options: EngineOptions,
) -> Result<(Vec<u8>, Vec<u8>, u64), RewriteError> {
    let source = File::open(path).map_err(|source| RewriteError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut before = Vec::new();
    let recording = Recording {
        inner: &source,
        copy: &mut before,
    };
    let (after, changes) = preview_from(path, recording, transform, options)?;
    Ok((before, after, changes))
}

/// A reader that keeps a copy of every byte read through it.
struct Recording<'a, R> {
    inner: R,
    copy: &'a mut Vec<u8>,
}

impl<R: Read> Read for Recording<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.copy.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

fn preview_from<R: Read>(
    path: &Path,
    reader: R,
    transform: &mut dyn Transform,
    options: EngineOptions,
) -> Result<(Vec<u8>, u64), RewriteError> {
    let mut out = Vec::new();
    match engine::run(reader, &mut out, transform, options) {
        Ok(changes) => Ok((out, changes)),
        Err(StreamError::Read(source)) | Err(StreamError::Write(source)) => {
            Err(RewriteError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

/// Create `.<name>.<random>.sfx~` next to `path`.
fn create_temp(path: &Path) -> io::Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(TEMP_SUFFIX)
        .tempfile_in(parent)
}
