//! pocketfiles: browse a device's storage by category from the terminal.
//!
//! Thin binary entry point. All logic lives in the `pocketfiles-core`
//! and `pocketfiles-browser` crates; this drives the browser state in a
//! loop the way a UI shell would once per frame, then prints the rows.

use anyhow::Context;
use clap::Parser;
use pocketfiles_browser::{BrowserState, FileRow, Tab};
use pocketfiles_core::model::size::format_count;
use pocketfiles_core::Settings;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How often the browser state is pumped while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How often a progress line is logged during long scans.
const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(2);

/// List files on this device by category, newest first.
///
/// Gallery listings also fill the thumbnail cache.
#[derive(Parser, Debug)]
#[command(name = "pocketfiles")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tab to list: files, gallery, audio or docs.
    #[arg(default_value = "files")]
    tab: Tab,

    /// Root directory to scan. Repeat for several; defaults to the
    /// platform's storage roots.
    #[arg(short = 'r', long = "root")]
    roots: Vec<PathBuf>,

    /// Settings file (JSON). Defaults to the per-user config file if present.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Thumbnail cache directory. Overrides the settings file.
    #[arg(long = "cache-dir")]
    cache_dir: Option<PathBuf>,

    /// Also write the rows to this CSV file.
    #[arg(long = "csv")]
    csv: Option<PathBuf>,

    /// Convert image SRC to lossless WebP at DEST instead of listing.
    #[arg(long = "to-webp", num_args = 2, value_names = ["SRC", "DEST"])]
    to_webp: Option<Vec<PathBuf>>,

    /// Log debug detail to stderr.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialise structured logging. Rows go to stdout, logs to stderr.
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    if let Some([src, dest]) = args.to_webp.as_deref() {
        pocketfiles_core::convert::convert_to_webp(src, dest)?;
        return Ok(());
    }

    let settings = load_settings(&args)?;
    let mut state = BrowserState::new(settings);
    state.switch_tab(args.tab);

    let mut last_log = Instant::now();
    while !state.is_settled() {
        state.process_messages();
        if last_log.elapsed() >= PROGRESS_LOG_INTERVAL {
            tracing::info!(
                "{} files so far, at {}",
                format_count(state.scan_files_found),
                state.scan_current_path
            );
            last_log = Instant::now();
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    if let Some(err) = &state.last_error {
        anyhow::bail!("{err}");
    }
    for root in &state.skipped_roots {
        tracing::warn!("Skipped missing root {}", root.display());
    }

    for row in &state.rows {
        println!("{}", format_row(row));
    }
    tracing::info!(
        "{}: {} of {} files shown, {} unreadable",
        args.tab.label(),
        format_count(state.rows.len() as u64),
        format_count(state.scan_total_files as u64),
        format_count(state.scan_error_count)
    );

    if let Some(path) = &args.csv {
        write_csv(path, &state.rows)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!("Wrote {}", path.display());
    }

    Ok(())
}

fn load_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => match Settings::default_path() {
            Some(path) => Settings::load_or_default(&path)?,
            None => Settings::default(),
        },
    };
    if !args.roots.is_empty() {
        settings.roots = args.roots.clone();
    }
    if let Some(dir) = &args.cache_dir {
        settings.cache_dir = Some(dir.clone());
    }
    settings.validate()?;
    Ok(settings)
}

fn format_row(row: &FileRow) -> String {
    let modified = row
        .modified
        .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".repeat(16));
    let mut line = format!("{modified}  {:>9}  {}", row.size_display, row.path.display());
    if let Some(thumb) = &row.thumbnail {
        line.push_str(&format!("  [{}]", thumb.display()));
    }
    line
}

fn write_csv(path: &Path, rows: &[FileRow]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["path", "name", "size", "modified", "thumbnail"])?;
    for row in rows {
        let modified = row.modified.map(|m| m.to_rfc3339()).unwrap_or_default();
        let thumbnail = row
            .thumbnail
            .as_ref()
            .map(|t| t.to_string_lossy().into_owned())
            .unwrap_or_default();
        let path = row.path.to_string_lossy();
        let size = row.size.to_string();
        wtr.write_record([
            &*path,
            row.name.as_str(),
            size.as_str(),
            modified.as_str(),
            thumbnail.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
