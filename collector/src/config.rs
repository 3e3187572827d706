//! Run configuration: command line, environment, and the persisted settings file.
//!
//! Everything here is validated before the first request goes out. A [`ConfigError`]
//! means nothing was contacted.

use crate::filter::DEFAULT_THRESHOLD;
use clap::Parser;
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Problems with the run's configuration. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("a YouTube API key is required (--api-key or YOUTUBE_API_KEY)")]
    MissingApiKey,
    #[error("a channel list file is required (--source)")]
    MissingSource,
    #[error("an output directory is required (--output-dir)")]
    MissingOutputDir,
    #[error("view threshold must be a non-negative whole number, got {0:?}")]
    InvalidThreshold(String),
    #[error("read settings file {}", path.display())]
    ReadSettings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse settings file {}", path.display())]
    ParseSettings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("read channel list {}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("channel list {} has no `{column}` column", path.display())]
    MissingColumn { path: PathBuf, column: String },
}

/// Collect public video statistics from a list of YouTube channels.
#[derive(Debug, Clone, Parser)]
#[command(version)]
pub struct Cli {
    /// YouTube Data API key.
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Proxy for all API traffic, e.g. http://127.0.0.1:7890.
    #[arg(long, env = "YOUTUBE_PROXY")]
    pub proxy: Option<String>,

    /// CSV file with a `channel_id` column listing the channels to collect.
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Directory the export is written to.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Minimum view count a video needs to be exported.
    #[arg(short, long)]
    pub threshold: Option<String>,

    /// Settings file holding defaults for the API key, proxy and output directory.
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Store the API key, proxy and output directory of this run in the settings file.
    #[arg(long)]
    pub save_config: bool,
}

/// Values remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_path: Option<PathBuf>,
}

impl Settings {
    /// Loads settings from `path`. A missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::ReadSettings {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&text).map_err(|source| ConfigError::ParseSettings {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> eyre::Result<()> {
        let json = serde_json::to_string_pretty(self).context("serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("write settings file {}", path.display()))?;
        tracing::info!(path = %path.display(), "saved settings");
        Ok(())
    }
}

impl From<&CollectorConfig> for Settings {
    fn from(config: &CollectorConfig) -> Self {
        Self {
            api_key: Some(config.api_key.clone()),
            proxy: config.proxy.clone(),
            save_path: Some(config.output_dir.clone()),
        }
    }
}

/// Everything a run needs, validated.
#[derive(Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    pub api_key: String,
    pub proxy: Option<String>,
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub threshold: u64,
}

impl std::fmt::Debug for CollectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorConfig")
            .field("api_key", &"<redacted>")
            .field("proxy", &self.proxy)
            .field("source", &self.source)
            .field("output_dir", &self.output_dir)
            .field("threshold", &self.threshold)
            .finish()
    }
}

impl CollectorConfig {
    /// Combines command-line values with stored settings. Command-line values win;
    /// empty strings count as unset.
    pub fn resolve(cli: &Cli, settings: &Settings) -> Result<Self, ConfigError> {
        let api_key = non_empty(cli.api_key.as_deref())
            .or_else(|| non_empty(settings.api_key.as_deref()))
            .ok_or(ConfigError::MissingApiKey)?;
        let proxy = non_empty(cli.proxy.as_deref()).or_else(|| non_empty(settings.proxy.as_deref()));
        let source = cli
            .source
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingSource)?;
        let output_dir = cli
            .output_dir
            .clone()
            .or_else(|| settings.save_path.clone())
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingOutputDir)?;
        let threshold = match cli.threshold.as_deref() {
            Some(raw) => parse_threshold(raw)?,
            None => DEFAULT_THRESHOLD,
        };

        Ok(Self {
            api_key,
            proxy,
            source,
            output_dir,
            threshold,
        })
    }
}

/// Parses a view threshold. Surrounding whitespace is ignored.
pub fn parse_threshold(raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidThreshold(raw.to_string()))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["youtube-collector"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn threshold_parsing() {
        assert_eq!(parse_threshold("1000").unwrap(), 1000);
        assert_eq!(parse_threshold(" 0 ").unwrap(), 0);
        assert!(matches!(
            parse_threshold("-5"),
            Err(ConfigError::InvalidThreshold(raw)) if raw == "-5"
        ));
        assert!(parse_threshold("1k").is_err());
        assert!(parse_threshold("").is_err());
    }

    #[test]
    fn command_line_wins_over_settings() {
        let settings = Settings {
            api_key: Some("stored-key".to_string()),
            proxy: Some("http://stored:1".to_string()),
            save_path: Some(PathBuf::from("/stored")),
        };
        let config = CollectorConfig::resolve(
            &cli(&[
                "--api-key",
                "cli-key",
                "--source",
                "channels.csv",
                "--output-dir",
                "/out",
                "--threshold",
                "5000",
            ]),
            &settings,
        )
        .unwrap();

        assert_eq!(config.api_key, "cli-key");
        assert_eq!(config.proxy.as_deref(), Some("http://stored:1"));
        assert_eq!(config.source, PathBuf::from("channels.csv"));
        assert_eq!(config.output_dir, PathBuf::from("/out"));
        assert_eq!(config.threshold, 5000);
    }

    #[test]
    fn settings_fill_gaps_and_threshold_defaults() {
        let settings = Settings {
            api_key: Some("stored-key".to_string()),
            proxy: None,
            save_path: Some(PathBuf::from("/stored")),
        };
        let config =
            CollectorConfig::resolve(&cli(&["--source", "c.csv", "--api-key", ""]), &settings)
                .unwrap();

        assert_eq!(config.api_key, "stored-key");
        assert_eq!(config.proxy, None);
        assert_eq!(config.output_dir, PathBuf::from("/stored"));
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);
    }

    #[test]
    fn missing_pieces_are_reported() {
        let settings = Settings::default();

        let err = CollectorConfig::resolve(
            &cli(&["--api-key", "   ", "--source", "c.csv", "-o", "/o"]),
            &settings,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey), "{err:?}");

        let err = CollectorConfig::resolve(&cli(&["--api-key", "k", "-o", "/o"]), &settings)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSource), "{err:?}");

        let err = CollectorConfig::resolve(&cli(&["--api-key", "k", "-s", "c.csv"]), &settings)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingOutputDir), "{err:?}");

        let err = CollectorConfig::resolve(
            &cli(&["--api-key", "k", "-s", "c.csv", "-o", "/o", "-t", "many"]),
            &settings,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"view threshold must be a non-negative whole number, got "many""#
        );
    }

    #[test]
    fn settings_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        assert_eq!(Settings::load(&path).unwrap(), Settings::default());

        let settings = Settings {
            api_key: Some("k".to_string()),
            proxy: None,
            save_path: Some(PathBuf::from("/data")),
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("proxy"), "{text}");
    }

    #[test]
    fn malformed_settings_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(ConfigError::ParseSettings { .. })
        ));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = CollectorConfig {
            api_key: "secret".to_string(),
            proxy: None,
            source: PathBuf::from("c.csv"),
            output_dir: PathBuf::from("/o"),
            threshold: 1,
        };
        assert!(!format!("{config:?}").contains("secret"));
    }
}
