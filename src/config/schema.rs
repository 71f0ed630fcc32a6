use crate::engine::{EngineOptions, DEFAULT_BUFFER_CAPACITY};
use crate::job::SortOrder;
use crate::reader::DEFAULT_CHUNK_SIZE;
use crate::transform::column::MAX_TAB_SIZE;
use crate::transform::marker::{MarkerOptions, MAX_START, MAX_STEP, MAX_WIDTH};
use crate::transform::{default_tab_size, Mode};
use serde::Deserialize;
use std::fmt;

/// Settings shared by every tool. Command-line flags override these.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub chunk_size: usize,
    pub buffer_capacity: usize,
    pub preserve_mtime: bool,
    pub tab_size: usize,
    pub marker: MarkerOptions,
    pub comments: CommentSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            preserve_mtime: false,
            tab_size: default_tab_size(),
            marker: MarkerOptions::default(),
            comments: CommentSettings::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct CommentSettings {
    pub careful: bool,
    pub sort: SortOrder,
    pub reverse: bool,
}

impl Default for CommentSettings {
    fn default() -> Self {
        Self {
            careful: false,
            sort: SortOrder::Descending,
            reverse: false,
        }
    }
}

impl Settings {
    pub fn engine(&self) -> EngineOptions {
        EngineOptions {
            chunk_size: self.chunk_size,
            buffer_capacity: self.buffer_capacity,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.chunk_size == 0 {
            issues.push(ValidationIssue::OutOfRange {
                field: "chunk_size",
                value: 0,
                min: 1,
                max: u64::MAX,
            });
        }
        if self.buffer_capacity == 0 {
            issues.push(ValidationIssue::OutOfRange {
                field: "buffer_capacity",
                value: 0,
                min: 1,
                max: u64::MAX,
            });
        }
        check_tab_size(self.tab_size, &mut issues);
        check_marker(&self.marker, &mut issues);

        finish(issues)
    }
}

/// Validate a mode's parameters before any file is touched.
pub fn validate_mode(mode: &Mode) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    match mode {
        Mode::TabConvert { tab_size, .. } => check_tab_size(*tab_size, &mut issues),
        Mode::MarkerSubstitute(options) => check_marker(options, &mut issues),
        Mode::RangeDelete {
            start,
            end,
            end_inclusive,
        } => {
            if end < start || (end == start && !end_inclusive) {
                issues.push(ValidationIssue::InvalidCombo {
                    message: format!(
                        "byte range {start}..{end}{} is empty",
                        if *end_inclusive { " (inclusive)" } else { "" }
                    ),
                });
            }
        }
        Mode::CaseFold { .. }
        | Mode::CommentNeutralize { .. }
        | Mode::LineEndingConvert { .. } => {}
    }
    finish(issues)
}

fn check_tab_size(tab_size: usize, issues: &mut Vec<ValidationIssue>) {
    if tab_size == 0 || tab_size > MAX_TAB_SIZE {
        issues.push(ValidationIssue::OutOfRange {
            field: "tab_size",
            value: tab_size as u64,
            min: 1,
            max: MAX_TAB_SIZE as u64,
        });
    }
}

fn check_marker(options: &MarkerOptions, issues: &mut Vec<ValidationIssue>) {
    if options.marker.is_empty() {
        issues.push(ValidationIssue::MissingField { field: "marker" });
    }
    if options.start > MAX_START {
        issues.push(ValidationIssue::OutOfRange {
            field: "start",
            value: options.start,
            min: 0,
            max: MAX_START,
        });
    }
    if options.step == 0 || options.step > MAX_STEP {
        issues.push(ValidationIssue::OutOfRange {
            field: "step",
            value: options.step,
            min: 1,
            max: MAX_STEP,
        });
    }
    if options.width > MAX_WIDTH {
        issues.push(ValidationIssue::OutOfRange {
            field: "width",
            value: options.width as u64,
            min: 0,
            max: MAX_WIDTH as u64,
        });
    }
}

fn finish(issues: Vec<ValidationIssue>) -> Result<(), ValidationError> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField {
        field: &'static str,
    },
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
    InvalidCombo {
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "'{field}' must not be empty")
            }
            ValidationIssue::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                if *max == u64::MAX {
                    write!(f, "'{field}' is {value}, must be at least {min}")
                } else {
                    write!(f, "'{field}' is {value}, must be in {min}..={max}")
                }
            }
            ValidationIssue::InvalidCombo { message } => write!(f, "invalid parameters: {message}"),
        }
    }
}
