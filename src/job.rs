//! Per-file jobs and the ordering used to report them.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// How much a transform changed one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Not transformed yet.
    Pending,
    /// Number of changes made. Zero after a write failure.
    Count(u64),
    /// The file could not be opened.
    OpenFailed,
}

impl Effect {
    pub fn count(&self) -> Option<u64> {
        match self {
            Effect::Count(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    pub dir: PathBuf,
    pub name: String,
    pub is_dir: bool,
    effect: Effect,
    committed: bool,
    failure: Option<String>,
}

impl FileJob {
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
            is_dir: false,
            effect: Effect::Pending,
            committed: false,
            failure: None,
        }
    }

    /// Split a path into its directory and file name.
    pub fn from_path(path: &Path) -> Self {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self::new(dir, name)
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn committed(&self) -> bool {
        self.committed
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Record the outcome of transforming this job. Only the first call
    /// has any effect; a job is transformed exactly once.
    pub fn record(&mut self, effect: Effect, committed: bool, failure: Option<String>) -> bool {
        if self.effect != Effect::Pending {
            log::warn!("{}: outcome already recorded, ignoring", self.name);
            return false;
        }
        self.effect = effect;
        self.committed = committed;
        self.failure = failure;
        true
    }

    /// Directories before files, then case-insensitive name, then exact name.
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        other
            .is_dir
            .cmp(&self.is_dir)
            .then_with(|| cmp_ignore_ascii_case(&self.name, &other.name))
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.dir.cmp(&other.dir))
    }
}

fn cmp_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    let a = a.bytes().map(|c| c.to_ascii_lowercase());
    let b = b.bytes().map(|c| c.to_ascii_lowercase());
    a.cmp(b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Natural (name) order only.
    #[default]
    Name,
    /// Fewest changes first.
    Ascending,
    /// Most changes first.
    Descending,
}

/// Ordering key built from a job's recorded effect.
///
/// Jobs whose file could not be opened always sort first, in name order,
/// whatever the direction; only counted jobs follow the direction. Ties
/// fall back to natural order, so the result is total and deterministic.
#[derive(Debug, Clone, Copy)]
pub struct EffectOrderKey {
    pub order: SortOrder,
    pub reverse: bool,
}

impl EffectOrderKey {
    pub fn new(order: SortOrder, reverse: bool) -> Self {
        Self { order, reverse }
    }

    pub fn compare(&self, a: &FileJob, b: &FileJob) -> Ordering {
        let natural = a.natural_cmp(b);
        let by_effect = match (a.effect, b.effect) {
            (Effect::OpenFailed, Effect::OpenFailed) => return natural,
            (Effect::OpenFailed, _) => return Ordering::Less,
            (_, Effect::OpenFailed) => return Ordering::Greater,
            (ea, eb) => {
                let ca = ea.count().unwrap_or(0);
                let cb = eb.count().unwrap_or(0);
                match self.order {
                    SortOrder::Name => Ordering::Equal,
                    SortOrder::Ascending => ca.cmp(&cb),
                    SortOrder::Descending => cb.cmp(&ca),
                }
            }
        };
        let ordering = by_effect.then(natural);
        if self.reverse {
            ordering.reverse()
        } else {
            ordering
        }
    }

    /// Sort `jobs` in place. Every job must already have been transformed.
    pub fn sort(&self, jobs: &mut [FileJob]) {
        debug_assert!(jobs.iter().all(|j| j.effect != Effect::Pending));
        jobs.sort_by(|a, b| self.compare(a, b));
    }
}
