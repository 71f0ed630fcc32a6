//! Batch orchestration: run one mode over every discovered file.
//!
//! Files are processed strictly one after another. Counters live in an
//! explicit [`BatchTotals`] owned by the caller.
//!
//! Tools that report in discovery order use [`transform_all`] with an
//! observer that prints as it goes. Tools that report in effect order use
//! [`run_two_pass`], which finishes every transform (and commit) before the
//! sort key is known and before anything is reported.

use crate::commit::{self, CommitOptions, RewriteError, RewriteOutcome};
use crate::job::{Effect, EffectOrderKey, FileJob};
use crate::transform::Mode;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub commit: CommitOptions,
    /// Transform into memory only; never touch the files.
    pub dry_run: bool,
    /// Keep the before/after bytes of dry-run files for diffing.
    pub keep_preview: bool,
}

/// Aggregate counters for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchTotals {
    pub files_found: usize,
    pub files_changed: usize,
    pub files_failed: usize,
    /// Sum of every file's effect count.
    pub units: u64,
}

impl BatchTotals {
    fn add(&mut self, job: &FileJob) {
        self.files_found += 1;
        match job.effect() {
            Effect::Count(n) => {
                if n > 0 {
                    self.files_changed += 1;
                }
                self.units += n;
            }
            Effect::OpenFailed => self.files_failed += 1,
            Effect::Pending => {}
        }
        if job.failure().is_some() && job.effect() != Effect::OpenFailed {
            self.files_failed += 1;
        }
    }
}

/// Contents of a dry-run file before and after the transform.
#[derive(Debug, Clone)]
pub struct Preview {
    pub before: Vec<u8>,
    pub after: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    Changed,
    WouldChange,
    Unchanged,
    OpenFailed,
    WriteFailed,
}

/// One row of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    pub name: String,
    /// Effect count; `None` when the file could not be opened.
    pub changes: Option<u64>,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReportRecord {
    pub fn from_job(job: &FileJob, dry_run: bool) -> Self {
        let status = match job.effect() {
            Effect::OpenFailed => FileStatus::OpenFailed,
            _ if job.failure().is_some() => FileStatus::WriteFailed,
            Effect::Count(n) if n > 0 && dry_run => FileStatus::WouldChange,
            Effect::Count(n) if n > 0 => FileStatus::Changed,
            _ => FileStatus::Unchanged,
        };
        Self {
            name: job.path().display().to_string(),
            changes: job.effect().count(),
            status,
            error: job.failure().map(str::to_string),
        }
    }
}

/// Transform (and, unless dry-running, commit) a single job.
pub fn transform_job(job: &mut FileJob, mode: &Mode, options: &BatchOptions) -> Option<Preview> {
    let path = job.path();
    let mut transform = mode.build();

    if options.dry_run {
        let engine = options.commit.engine;
        let previewed = if options.keep_preview {
            commit::preview_file_with_source(&path, &mut transform, engine)
                .map(|(before, after, changes)| (changes, Some(Preview { before, after })))
        } else {
            commit::preview_file(&path, &mut transform, engine).map(|(_, changes)| (changes, None))
        };
        return match previewed {
            Ok((changes, preview)) => {
                job.record(Effect::Count(changes), false, None);
                preview.filter(|_| changes > 0)
            }
            Err(err) => {
                record_failure(job, err);
                None
            }
        };
    }

    match commit::rewrite_file(&path, &mut transform, options.commit) {
        Ok(RewriteOutcome::Committed { changes }) => {
            job.record(Effect::Count(changes), true, None);
        }
        Ok(RewriteOutcome::Unchanged) => {
            job.record(Effect::Count(0), false, None);
        }
        Err(err) => record_failure(job, err),
    }
    None
}

fn record_failure(job: &mut FileJob, err: RewriteError) {
    log::warn!("{err}");
    let effect = if err.is_open_failure() {
        Effect::OpenFailed
    } else {
        // A failed rewrite is never partially applied.
        Effect::Count(0)
    };
    job.record(effect, false, Some(err.to_string()));
}

/// Phase 1: transform every job in order, calling `observe` after each.
pub fn transform_all<F>(
    jobs: &mut [FileJob],
    mode: &Mode,
    options: &BatchOptions,
    mut observe: F,
) -> BatchTotals
where
    F: FnMut(&FileJob, Option<&Preview>),
{
    let mut totals = BatchTotals::default();
    for job in jobs.iter_mut() {
        let preview = transform_job(job, mode, options);
        totals.add(job);
        observe(job, preview.as_ref());
    }
    log::info!(
        "{}: {} of {} files changed, {} {}",
        mode.name(),
        totals.files_changed,
        totals.files_found,
        totals.units,
        mode.unit()
    );
    totals
}

/// Result of [`run_two_pass`], ready for reporting.
#[derive(Debug)]
pub struct TwoPass {
    /// Every job, transformed and sorted.
    pub jobs: Vec<FileJob>,
    pub totals: BatchTotals,
    /// Dry-run previews, keyed by path.
    pub previews: HashMap<PathBuf, Preview>,
}

/// Transform every job, then sort by effect. Nothing is reported until the
/// returned, fully ordered set is handed back.
pub fn run_two_pass(
    mut jobs: Vec<FileJob>,
    mode: &Mode,
    options: &BatchOptions,
    key: EffectOrderKey,
) -> TwoPass {
    let mut previews = HashMap::new();
    let totals = transform_all(&mut jobs, mode, options, |job, preview| {
        if let Some(preview) = preview {
            previews.insert(job.path(), preview.clone());
        }
    });
    key.sort(&mut jobs);
    TwoPass {
        jobs,
        totals,
        previews,
    }
}
