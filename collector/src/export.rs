//! Writing a run's records to a dated file.

use crate::record::VideoRecord;
use eyre::Context;
use jiff::civil::Date;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name prefix of every export.
pub const DEFAULT_PREFIX: &str = "youtube_data";

/// The result of handing records to a [`ResultSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Export {
    /// Records were written to this file.
    Written(PathBuf),
    /// There was nothing to write, so nothing was written.
    NoData,
}

/// Receives the complete set of records at the end of a run.
pub trait ResultSink: Send + Sync {
    /// Emits `records` as the export for `run_date`.
    ///
    /// Must not write anything when `records` is empty.
    fn emit(&self, records: &[VideoRecord], run_date: Date) -> eyre::Result<Export>;
}

/// Writes records as CSV into a directory, one file per calendar day.
///
/// A second run on the same day replaces the earlier file.
#[derive(Debug, Clone)]
pub struct CsvExport {
    output_dir: PathBuf,
    prefix: String,
}

impl CsvExport {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Where the export for `run_date` goes.
    pub fn path_for(&self, run_date: Date) -> PathBuf {
        self.output_dir.join(file_name(&self.prefix, run_date))
    }
}

/// `{prefix}_YYYYMMDD.csv`
pub fn file_name(prefix: &str, run_date: Date) -> String {
    format!("{prefix}_{}.csv", run_date.strftime("%Y%m%d"))
}

impl ResultSink for CsvExport {
    fn emit(&self, records: &[VideoRecord], run_date: Date) -> eyre::Result<Export> {
        if records.is_empty() {
            return Ok(Export::NoData);
        }

        let target = self.path_for(run_date);
        write_atomically(&self.output_dir, &target, records)
            .with_context(|| format!("write export to {}", target.display()))?;

        tracing::info!(path = %target.display(), records = records.len(), "wrote export");
        Ok(Export::Written(target))
    }
}

/// Writes to a temp file next to `target`, then renames it into place, so a failed
/// write never leaves a half-written export behind.
fn write_atomically(dir: &Path, target: &Path, records: &[VideoRecord]) -> eyre::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("create output directory {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir).context("create temporary export file")?;
    {
        let mut writer = csv::Writer::from_writer(&mut tmp);
        for record in records {
            writer.serialize(record).context("serialize record")?;
        }
        writer.flush().context("flush export")?;
    }
    tmp.as_file_mut().sync_all().context("sync export")?;

    if target.exists() {
        fs::remove_file(target).context("remove previous export")?;
    }
    tmp.persist(target).map_err(|e| e.error).context("move export into place")?;
    Ok(())
}
