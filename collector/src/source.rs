//! Where the list of channels to harvest comes from.

use crate::config::ConfigError;
use std::path::PathBuf;

/// Name of the column that holds channel ids.
pub const CHANNEL_ID_COLUMN: &str = "channel_id";

/// Supplies the ordered list of channel ids for a run.
pub trait ChannelSource {
    /// Reads every channel id, in order. Duplicates are kept.
    fn channel_ids(&self) -> Result<Vec<String>, ConfigError>;
}

/// Reads channel ids from one column of a CSV file with a header row.
///
/// Blank cells are skipped and values are trimmed. Other columns are ignored, and rows
/// may have differing lengths.
#[derive(Debug, Clone)]
pub struct CsvChannelSource {
    path: PathBuf,
    column: String,
}

impl CsvChannelSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            column: CHANNEL_ID_COLUMN.to_string(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    fn read_error(&self, source: csv::Error) -> ConfigError {
        ConfigError::ReadSource {
            path: self.path.clone(),
            source,
        }
    }
}

impl ChannelSource for CsvChannelSource {
    fn channel_ids(&self) -> Result<Vec<String>, ConfigError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.read_error(e))?;

        let headers = reader.headers().map_err(|e| self.read_error(e))?;
        let Some(index) = headers.iter().position(|h| h.trim() == self.column) else {
            return Err(ConfigError::MissingColumn {
                path: self.path.clone(),
                column: self.column.clone(),
            });
        };

        let mut ids = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| self.read_error(e))?;
            match row.get(index).map(str::trim) {
                Some(id) if !id.is_empty() => ids.push(id.to_string()),
                _ => {}
            }
        }

        tracing::info!(path = %self.path.display(), channels = ids.len(), "read channel list");
        Ok(ids)
    }
}

impl ChannelSource for Vec<String> {
    fn channel_ids(&self) -> Result<Vec<String>, ConfigError> {
        Ok(self.clone())
    }
}
