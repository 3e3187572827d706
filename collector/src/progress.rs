//! One-way progress reporting from a run to whoever is watching it.
//!
//! The harvester only holds a [`Reporter`]; it never sees the receiving side. Each event
//! renders as a human-readable line through its `Display` impl.

use std::fmt;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Something that happened during a run, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Work on a channel has begun. `index` is 1-based.
    ChannelStarted {
        channel_id: String,
        index: usize,
        total: usize,
    },
    /// The platform has no channel with this id.
    ChannelNotFound { channel_id: String },
    /// Channel metadata or its uploads feed could not be resolved.
    ChannelFailed { channel_id: String, error: String },
    /// The channel exists but exposes no uploads feed.
    FeedNotFound { channel_id: String },
    /// The channel's uploads feed has no videos.
    FeedEmpty { channel_id: String },
    /// A feed page or its statistics batch failed; the rest of the channel is abandoned.
    PageFailed {
        channel_id: String,
        page: usize,
        error: String,
    },
    /// All reachable pages of a channel were processed.
    ChannelFinished { channel_id: String, records: usize },
    /// The export was written.
    Saved { path: PathBuf, records: usize },
    /// Nothing passed the filter, so no export was written.
    NoData,
    /// Writing the export failed.
    ExportFailed { error: String },
}

impl Progress {
    /// Whether this event describes a failure (as opposed to a notice).
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Progress::ChannelNotFound { .. }
                | Progress::ChannelFailed { .. }
                | Progress::FeedNotFound { .. }
                | Progress::PageFailed { .. }
                | Progress::ExportFailed { .. }
        )
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::ChannelStarted {
                channel_id,
                index,
                total,
            } => write!(f, "[{index}/{total}] collecting videos from channel {channel_id}"),
            Progress::ChannelNotFound { channel_id } => {
                write!(f, "channel {channel_id} not found, skipping")
            }
            Progress::ChannelFailed { channel_id, error } => {
                write!(f, "could not resolve channel {channel_id}: {error}")
            }
            Progress::FeedNotFound { channel_id } => {
                write!(f, "could not find the uploads of channel {channel_id}, skipping")
            }
            Progress::FeedEmpty { channel_id } => {
                write!(f, "channel {channel_id} has no uploaded videos")
            }
            Progress::PageFailed {
                channel_id,
                page,
                error,
            } => write!(
                f,
                "error fetching page {page} of channel {channel_id}'s videos: {error}"
            ),
            Progress::ChannelFinished {
                channel_id,
                records,
            } => write!(f, "channel {channel_id}: {records} matching videos"),
            Progress::Saved { path, records } => {
                write!(f, "saved {records} videos to {}", path.display())
            }
            Progress::NoData => f.write_str("no matching videos found"),
            Progress::ExportFailed { error } => write!(f, "could not save results: {error}"),
        }
    }
}

/// The sending half of the progress channel.
///
/// Events are also logged through `tracing`. A reporter whose receiver has gone away
/// keeps working; events are then only logged.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    tx: Option<mpsc::UnboundedSender<Progress>>,
}

impl Reporter {
    /// Creates a reporter and the receiver its events arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Progress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A reporter that only logs.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn report(&self, event: Progress) {
        if event.is_error() {
            tracing::warn!(%event, "progress");
        } else {
            tracing::debug!(%event, "progress");
        }
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_human_readable_lines() {
        let started = Progress::ChannelStarted {
            channel_id: "UC1".to_string(),
            index: 2,
            total: 5,
        };
        assert_eq!(started.to_string(), "[2/5] collecting videos from channel UC1");

        let failed = Progress::PageFailed {
            channel_id: "UC1".to_string(),
            page: 3,
            error: "timed out".to_string(),
        };
        assert_eq!(
            failed.to_string(),
            "error fetching page 3 of channel UC1's videos: timed out"
        );

        assert_eq!(Progress::NoData.to_string(), "no matching videos found");
    }

    #[test]
    fn notices_are_not_errors() {
        assert!(
            !Progress::FeedEmpty {
                channel_id: "UC1".to_string()
            }
            .is_error()
        );
        assert!(!Progress::NoData.is_error());
        assert!(
            Progress::ChannelNotFound {
                channel_id: "UC1".to_string()
            }
            .is_error()
        );
    }

    #[tokio::test]
    async fn events_arrive_in_order_and_channel_closes_with_reporter() {
        let (reporter, mut rx) = Reporter::channel();
        reporter.report(Progress::FeedEmpty {
            channel_id: "a".to_string(),
        });
        reporter.report(Progress::NoData);
        drop(reporter);

        assert_eq!(
            rx.recv().await,
            Some(Progress::FeedEmpty {
                channel_id: "a".to_string()
            })
        );
        assert_eq!(rx.recv().await, Some(Progress::NoData));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn reporting_after_receiver_dropped_is_harmless() {
        let (reporter, rx) = Reporter::channel();
        drop(rx);
        reporter.report(Progress::NoData);
        Reporter::silent().report(Progress::NoData);
    }
}
