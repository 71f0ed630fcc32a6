use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use streamfix::batch::{self, BatchOptions, BatchTotals, ReportRecord, TwoPass};
use streamfix::config::{self, Settings};
use streamfix::display::show_file;
use streamfix::report;
use streamfix::transform::{CaseMode, ColumnOptions, LineEnding, MarkerOptions, NumberBase};
use streamfix::{
    discover, CommitOptions, DiscoverOptions, EffectOrderKey, FileJob, Mode, SortOrder,
    TabDirection,
};

/// Library version this binary was built against.
const EXPECTED_LIBRARY: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "streamfix")]
#[command(about = "Streaming in-place file rewriters", long_about = None)]
#[command(version)]
struct Cli {
    /// Load settings from a TOML file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct FileArgs {
    /// Files or directories to process
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Only process files whose name matches this glob
    #[arg(short, long)]
    pattern: Option<String>,

    /// Match the pattern case-sensitively
    #[arg(long)]
    case_sensitive: bool,

    /// Follow symbolic links
    #[arg(long)]
    follow_links: bool,
}

#[derive(Args, Debug)]
struct RewriteArgs {
    #[command(flatten)]
    files: FileArgs,

    /// Dry run - show what would be changed without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show a diff of each changed file (implies --dry-run)
    #[arg(long)]
    diff: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Keep the original modification time on rewritten files
    #[arg(long)]
    preserve_mtime: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Rewrite(RewriteCommand),

    /// Print files with line numbers, tabs expanded and control bytes escaped
    Show {
        /// Columns per tab stop
        #[arg(short, long)]
        tab_size: Option<usize>,

        /// Escape bytes with the high bit set as M-x
        #[arg(long)]
        high: bool,

        /// Treat DEL (0x7f) as a high byte rather than a control byte
        #[arg(long, requires = "high")]
        del_is_high: bool,

        #[command(flatten)]
        files: FileArgs,
    },
}

/// Tools that rewrite files in place.
#[derive(Subcommand)]
enum RewriteCommand {
    /// Fold ASCII letters to upper, lower or toggled case
    Case {
        #[arg(value_enum)]
        mode: CaseMode,

        #[command(flatten)]
        args: RewriteArgs,
    },

    /// Expand tabs to spaces, or compress spaces to tabs
    Tabs {
        #[arg(value_enum)]
        direction: TabDirection,

        /// Columns per tab stop
        #[arg(short, long)]
        tab_size: Option<usize>,

        #[command(flatten)]
        args: RewriteArgs,
    },

    /// Turn `//` line comments into `/* */` block comments
    Comments {
        /// Leave the rest of a line alone once a quote has been seen on it
        #[arg(long)]
        careful: bool,

        /// Report order
        #[arg(long, value_enum)]
        sort: Option<SortOrder>,

        /// Reverse the report order (unopenable files stay first)
        #[arg(long)]
        reverse: bool,

        #[command(flatten)]
        args: RewriteArgs,
    },

    /// Replace every marker with an incrementing number
    Number {
        /// Literal marker text
        #[arg(short, long)]
        marker: Option<String>,

        /// First number
        #[arg(long)]
        start: Option<u64>,

        /// Increment between numbers
        #[arg(long)]
        step: Option<u64>,

        /// Minimum width of each number
        #[arg(short, long)]
        width: Option<usize>,

        /// Pad to the width with zeros instead of spaces
        #[arg(short, long)]
        zero_pad: bool,

        /// Write numbers in hexadecimal
        #[arg(long)]
        hex: bool,

        #[command(flatten)]
        args: RewriteArgs,
    },

    /// Delete a byte range from every file
    Cut {
        /// First byte offset to delete
        #[arg(long)]
        start: u64,

        /// Offset where deletion stops (exclusive unless --inclusive)
        #[arg(long)]
        end: u64,

        /// Delete the byte at --end too
        #[arg(long)]
        inclusive: bool,

        #[command(flatten)]
        args: RewriteArgs,
    },

    /// Convert line endings
    Eol {
        #[arg(value_enum)]
        target: LineEnding,

        #[command(flatten)]
        args: RewriteArgs,
    },
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    init_logging(cli.verbose);

    if let Err(err) = streamfix::version::ensure_library(EXPECTED_LIBRARY) {
        eprintln!("{} {}", "Error:".red().bold(), err);
        process::exit(1);
    }

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(settings) => settings,
        Err(err) => fail_config(err),
    };

    match cli.command {
        Commands::Show {
            tab_size,
            high,
            del_is_high,
            files,
        } => {
            let mut options = ColumnOptions::display(tab_size.unwrap_or(settings.tab_size), high);
            if del_is_high {
                options.high_boundary = 127;
            }
            let mode = Mode::TabConvert {
                direction: TabDirection::Expand,
                tab_size: options.tab_size,
            };
            if let Err(err) = config::validate_mode(&mode) {
                fail_config(err);
            }
            cmd_show(&files, options, &settings)
        }
        Commands::Rewrite(command) => {
            let (mode, args, key) = rewrite_mode(command, &settings);
            if let Err(err) = config::validate_mode(&mode) {
                fail_config(err);
            }
            cmd_rewrite(&mode, &args, key, &settings)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, config::ConfigError> {
    match path {
        Some(path) => {
            log::info!("loading settings from {}", path.display());
            config::load_from_path(path)
        }
        None => Ok(Settings::default()),
    }
}

fn fail_config(err: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "Configuration error:".red().bold(), err);
    process::exit(1);
}

/// Merge command-line parameters over the settings into a mode. Tools that
/// report in effect order also get their ordering key.
fn rewrite_mode(
    command: RewriteCommand,
    settings: &Settings,
) -> (Mode, RewriteArgs, Option<EffectOrderKey>) {
    match command {
        RewriteCommand::Case { mode, args } => (Mode::CaseFold { mode }, args, None),
        RewriteCommand::Tabs {
            direction,
            tab_size,
            args,
        } => (
            Mode::TabConvert {
                direction,
                tab_size: tab_size.unwrap_or(settings.tab_size),
            },
            args,
            None,
        ),
        RewriteCommand::Comments {
            careful,
            sort,
            reverse,
            args,
        } => {
            let comments = settings.comments;
            let order = sort.unwrap_or(comments.sort);
            let key = EffectOrderKey::new(order, reverse || comments.reverse);
            (
                Mode::CommentNeutralize {
                    careful: careful || comments.careful,
                },
                args,
                Some(key),
            )
        }
        RewriteCommand::Number {
            marker,
            start,
            step,
            width,
            zero_pad,
            hex,
            args,
        } => {
            let base = settings.marker.clone();
            let options = MarkerOptions {
                marker: marker.unwrap_or(base.marker),
                start: start.unwrap_or(base.start),
                step: step.unwrap_or(base.step),
                width: width.unwrap_or(base.width),
                zero_pad: zero_pad || base.zero_pad,
                base: if hex { NumberBase::Hex } else { base.base },
            };
            (Mode::MarkerSubstitute(options), args, None)
        }
        RewriteCommand::Cut {
            start,
            end,
            inclusive,
            args,
        } => (
            Mode::RangeDelete {
                start,
                end,
                end_inclusive: inclusive,
            },
            args,
            None,
        ),
        RewriteCommand::Eol { target, args } => (Mode::LineEndingConvert { target }, args, None),
    }
}

fn discover_jobs(files: &FileArgs) -> Vec<FileJob> {
    let options = DiscoverOptions {
        recursive: files.recursive,
        follow_links: files.follow_links,
        pattern: files.pattern.clone(),
        case_sensitive: files.case_sensitive,
    };
    let discovered = match discover(&files.paths, &options) {
        Ok(discovered) => discovered,
        Err(err) => fail_config(err),
    };
    for (path, reason) in &discovered.skipped {
        eprintln!("{} {}: {}", "⚠".yellow(), path.display(), reason);
    }
    log::debug!("{} files discovered", discovered.jobs.len());
    discovered.jobs
}

fn cmd_rewrite(
    mode: &Mode,
    args: &RewriteArgs,
    key: Option<EffectOrderKey>,
    settings: &Settings,
) -> Result<()> {
    let dry_run = args.dry_run || args.diff;
    let options = BatchOptions {
        commit: CommitOptions {
            engine: settings.engine(),
            preserve_mtime: args.preserve_mtime || settings.preserve_mtime,
        },
        dry_run,
        keep_preview: args.diff && !args.json,
    };

    let mut jobs = discover_jobs(&args.files);
    if dry_run && !args.json {
        println!("{}", "DRY RUN - no files will be modified".yellow().bold());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut records = Vec::with_capacity(jobs.len());

    let totals: BatchTotals = match key {
        // Effect order is only known once every file is done.
        Some(key) => {
            let TwoPass {
                jobs,
                totals,
                previews,
            } = batch::run_two_pass(jobs, mode, &options, key);
            for job in &jobs {
                let record = ReportRecord::from_job(job, dry_run);
                if !args.json {
                    writeln!(out, "{}", report::format_row(&record))?;
                    if let Some(preview) = previews.get(&job.path()) {
                        let (before, after) = (&preview.before, &preview.after);
                        report::write_diff(&mut out, &record.name, before, after)?;
                    }
                }
                records.push(record);
            }
            totals
        }
        None => {
            let mut failed = None;
            let totals = batch::transform_all(&mut jobs, mode, &options, |job, preview| {
                let record = ReportRecord::from_job(job, dry_run);
                if !args.json && failed.is_none() {
                    let written = writeln!(out, "{}", report::format_row(&record)).and_then(|()| {
                        match preview {
                            Some(preview) => report::write_diff(
                                &mut out,
                                &record.name,
                                &preview.before,
                                &preview.after,
                            ),
                            None => Ok(()),
                        }
                    });
                    failed = written.err();
                }
                records.push(record);
            });
            if let Some(err) = failed {
                return Err(err.into());
            }
            totals
        }
    };

    if args.json {
        report::write_json(&mut out, mode.name(), &records, &totals)?;
    } else {
        report::write_totals(&mut out, &totals, mode.unit())?;
    }
    Ok(())
}

fn cmd_show(files: &FileArgs, options: ColumnOptions, settings: &Settings) -> Result<()> {
    let jobs = discover_jobs(files);
    if jobs.is_empty() {
        println!("{}", "No files found.".yellow());
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let headers = jobs.len() > 1;
    for (idx, job) in jobs.iter().enumerate() {
        let path = job.path();
        if headers {
            if idx > 0 {
                writeln!(out)?;
            }
            writeln!(out, "{}", format!("==> {} <==", path.display()).bold())?;
        }
        match show_file(&path, &mut out, options, settings.engine()) {
            Ok(lines) => log::debug!("{}: {} lines", path.display(), lines),
            Err(err) => eprintln!("{} {}", "✗".red(), err),
        }
    }
    Ok(())
}
