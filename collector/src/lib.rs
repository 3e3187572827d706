//! Collects public video statistics from a list of YouTube channels.
//!
//! A run reads channel ids from a [`source::ChannelSource`], walks every channel's uploads
//! through a [`platform::PlatformClient`], keeps the videos that pass a
//! [`filter::RecordFilter`], and finally writes the survivors to a dated file through an
//! [`export::ResultSink`]. Progress is reported as it happens over a [`progress::Reporter`].
//!
//! Problems with a single channel, page, or video never end a run; only a bad
//! configuration does, and that is caught before any request is made.

pub mod config;
pub mod export;
pub mod filter;
pub mod harvest;
pub mod platform;
pub mod progress;
pub mod record;
pub mod run;
pub mod source;
pub mod youtube_api;

pub use config::{Cli, CollectorConfig, ConfigError, Settings};
pub use export::{CsvExport, Export, ResultSink};
pub use filter::RecordFilter;
pub use harvest::{ChannelOutcome, ChannelReport, Harvester, RunResult};
pub use platform::{ChannelInfo, FeedPage, PlatformClient, VideoStats};
pub use progress::{Progress, Reporter};
pub use record::VideoRecord;
pub use run::{Collector, RunHandle, RunOutcome, collect};
pub use source::{ChannelSource, CsvChannelSource};
pub use youtube_api::YouTubeClient;
