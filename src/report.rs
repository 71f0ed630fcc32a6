//! Rendering batch results for humans (colored table) or machines (JSON).

use crate::batch::{BatchTotals, FileStatus, ReportRecord};
use colored::Colorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::io::{self, Write};

/// Width of the count column.
const COUNT_WIDTH: usize = 8;

/// Format one report row (without trailing newline).
pub fn format_row(record: &ReportRecord) -> String {
    let width = COUNT_WIDTH;
    let count = match record.changes {
        Some(n) => format!("{n:>width$}"),
        None => format!("{:>width$}", "-"),
    };
    let (mark, count) = match record.status {
        FileStatus::Changed => ("✓".green(), count.green()),
        FileStatus::WouldChange => ("~".cyan(), count.cyan()),
        FileStatus::Unchanged => ("·".dimmed(), count.dimmed()),
        FileStatus::OpenFailed | FileStatus::WriteFailed => ("✗".red(), count.red()),
    };
    match &record.error {
        Some(error) => format!("{mark} {count}  {}  {}", record.name, error.red()),
        None => format!("{mark} {count}  {}", record.name),
    }
}

pub fn write_totals<W: Write>(out: &mut W, totals: &BatchTotals, unit: &str) -> io::Result<()> {
    if totals.files_found == 0 {
        writeln!(out, "{}", "No files found.".yellow())?;
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{}", "Summary:".bold())?;
    writeln!(
        out,
        "  {} of {} files changed",
        format!("{}", totals.files_changed).green(),
        totals.files_found
    )?;
    writeln!(out, "  {} {}", format!("{}", totals.units).green(), unit)?;
    if totals.files_failed > 0 {
        writeln!(
            out,
            "  {} failed",
            format!("{}", totals.files_failed).red()
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    tool: &'a str,
    files: &'a [ReportRecord],
    totals: &'a BatchTotals,
}

pub fn write_json<W: Write>(
    out: &mut W,
    tool: &str,
    records: &[ReportRecord],
    totals: &BatchTotals,
) -> io::Result<()> {
    let report = JsonReport {
        tool,
        files: records,
        totals,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}

/// Print a unified-style diff between two versions of a file.
pub fn write_diff<W: Write>(
    out: &mut W,
    name: &str,
    before: &[u8],
    after: &[u8],
) -> io::Result<()> {
    let before = String::from_utf8_lossy(before);
    let after = String::from_utf8_lossy(after);

    writeln!(out, "{}", format!("--- {name} (original)").dimmed())?;
    writeln!(out, "{}", format!("+++ {name} (rewritten)").dimmed())?;

    let diff = TextDiff::from_lines(before.as_ref(), after.as_ref());
    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{change}").red(),
            ChangeTag::Insert => format!("+{change}").green(),
            ChangeTag::Equal => continue,
        };
        write!(out, "{line}")?;
        if change.missing_newline() {
            writeln!(out)?;
        }
    }
    Ok(())
}
