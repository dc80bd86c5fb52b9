use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::SummaryArgs;
use crate::formats::{ScrapeRun, SummaryRow};

pub const SUMMARY_HEADER: [&str; 4] = ["url", "title", "type", "item_count"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("write {}: {message}", .path.display())]
    WriteFailure { path: PathBuf, message: String },
    #[error("read {}: {message}", .path.display())]
    ReadFailure { path: PathBuf, message: String },
}

impl ExportError {
    fn write(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::WriteFailure {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    fn read(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::ReadFailure {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Regenerates the CSV summary from an existing JSON export.
pub fn summarize(args: SummaryArgs) -> anyhow::Result<()> {
    let run = read_json(Path::new(&args.input)).context("read json export")?;
    write_summary_csv(&run, Path::new(&args.out)).context("write summary export")?;
    Ok(())
}

pub fn write_json(run: &ScrapeRun, path: &Path) -> Result<(), ExportError> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(run).map_err(|err| ExportError::write(path, err))?;
    std::fs::write(path, format!("{json}\n")).map_err(|err| ExportError::write(path, err))?;

    tracing::info!(path = %path.display(), records = run.len(), "wrote json export");
    Ok(())
}

pub fn read_json(path: &Path) -> Result<ScrapeRun, ExportError> {
    let json = std::fs::read_to_string(path).map_err(|err| ExportError::read(path, err))?;
    serde_json::from_str(&json).map_err(|err| ExportError::read(path, err))
}

pub fn summary_rows(run: &ScrapeRun) -> Vec<SummaryRow> {
    run.records.iter().map(SummaryRow::from).collect()
}

/// Human-readable per-site block: title, URL, type and item count, plus the
/// error message for failed sites.
pub fn render_summary(run: &ScrapeRun) -> String {
    let mut out = format!(
        "Scraped {} sites ({} failed)\n",
        run.len(),
        run.failed_count()
    );
    for record in &run.records {
        let _ = write!(
            out,
            "\nTitle: {}\nURL: {}\nType: {}\nItems: {}\n",
            record.title,
            record.url,
            record.kind(),
            record.item_count()
        );
        if let Some(error) = record.error() {
            let _ = writeln!(out, "Error: {}", error.message);
        }
    }
    out
}

/// Header row is always written, even for an empty run.
pub fn write_summary_csv(run: &ScrapeRun, path: &Path) -> Result<(), ExportError> {
    if run.is_empty() {
        tracing::warn!(path = %path.display(), "no records to summarize; writing header only");
    }

    ensure_parent_dir(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|err| ExportError::write(path, err))?;

    writer
        .write_record(SUMMARY_HEADER)
        .map_err(|err| ExportError::write(path, err))?;
    for row in summary_rows(run) {
        writer
            .serialize(&row)
            .map_err(|err| ExportError::write(path, err))?;
    }
    writer.flush().map_err(|err| ExportError::write(path, err))?;

    tracing::info!(path = %path.display(), rows = run.len(), "wrote summary export");
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| ExportError::write(path, err))?;
    }
    Ok(())
}
