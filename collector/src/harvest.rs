//! Channel-to-video harvesting.
//!
//! For each channel, in input order:
//!
//! ```text
//! ResolveInfo -> ResolveFeed -> PageLoop(token = None) -> Done | Skipped | Failed
//! ```
//!
//! Failures are contained at the narrowest scope that makes sense. A channel that cannot
//! be resolved is skipped; a page that cannot be fetched ends that channel but keeps what
//! earlier pages produced; a video with malformed statistics is dropped without comment.
//! Nothing that goes wrong for one channel affects any other.

use crate::filter::RecordFilter;
use crate::platform::{ChannelInfo, PlatformClient};
use crate::progress::{Progress, Reporter};
use crate::record::VideoRecord;
use tracing::instrument;

/// How processing of a single channel ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// Every page was processed.
    Done { records: usize },
    /// The channel or its uploads feed could not be resolved; nothing was fetched.
    Skipped,
    /// A page failed part-way; `records` were kept from the pages before it.
    Failed { records: usize },
}

impl ChannelOutcome {
    pub fn records(&self) -> usize {
        match *self {
            ChannelOutcome::Done { records } | ChannelOutcome::Failed { records } => records,
            ChannelOutcome::Skipped => 0,
        }
    }
}

/// What happened to one input channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReport {
    pub channel_id: String,
    pub outcome: ChannelOutcome,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Retained records, in channel order, then feed order.
    pub records: Vec<VideoRecord>,
    /// One entry per input channel, in input order.
    pub channels: Vec<ChannelReport>,
}

/// Drives a [`PlatformClient`] across a list of channels.
///
/// Channels are processed one after another, and so are the pages within a channel.
/// This keeps the load on the platform bounded and progress strictly ordered.
pub struct Harvester<'a> {
    platform: &'a dyn PlatformClient,
    filter: RecordFilter,
    reporter: &'a Reporter,
}

impl<'a> Harvester<'a> {
    pub fn new(
        platform: &'a dyn PlatformClient,
        filter: RecordFilter,
        reporter: &'a Reporter,
    ) -> Self {
        Self {
            platform,
            filter,
            reporter,
        }
    }

    /// Harvests every channel in `channel_ids`.
    ///
    /// Duplicate ids are harvested again each time they appear.
    #[instrument(skip_all, fields(channels = channel_ids.len(), threshold = self.filter.threshold()))]
    pub async fn run(&self, channel_ids: &[String]) -> RunResult {
        let mut result = RunResult::default();
        let total = channel_ids.len();

        for (index, channel_id) in channel_ids.iter().enumerate() {
            self.reporter.report(Progress::ChannelStarted {
                channel_id: channel_id.clone(),
                index: index + 1,
                total,
            });

            let outcome = self.harvest_channel(channel_id, &mut result.records).await;
            tracing::info!(%channel_id, ?outcome, "channel processed");

            result.channels.push(ChannelReport {
                channel_id: channel_id.clone(),
                outcome,
            });
        }

        tracing::info!(
            records = result.records.len(),
            channels = result.channels.len(),
            "harvest complete"
        );
        result
    }

    async fn harvest_channel(
        &self,
        channel_id: &str,
        records: &mut Vec<VideoRecord>,
    ) -> ChannelOutcome {
        let info = match self.platform.resolve_channel_info(channel_id).await {
            Ok(Some(info)) => info,
            Ok(None) => {
                self.reporter.report(Progress::ChannelNotFound {
                    channel_id: channel_id.to_string(),
                });
                return ChannelOutcome::Skipped;
            }
            Err(e) => {
                self.reporter.report(Progress::ChannelFailed {
                    channel_id: channel_id.to_string(),
                    error: format!("{e:#}"),
                });
                return ChannelOutcome::Skipped;
            }
        };

        let feed_id = match self.platform.resolve_uploads_feed(channel_id).await {
            Ok(Some(feed_id)) => feed_id,
            Ok(None) => {
                self.reporter.report(Progress::FeedNotFound {
                    channel_id: channel_id.to_string(),
                });
                return ChannelOutcome::Skipped;
            }
            Err(e) => {
                self.reporter.report(Progress::ChannelFailed {
                    channel_id: channel_id.to_string(),
                    error: format!("{e:#}"),
                });
                return ChannelOutcome::Skipped;
            }
        };

        let outcome = self
            .page_loop(channel_id, &info, &feed_id, records)
            .await;
        if let ChannelOutcome::Done { records } = outcome {
            self.reporter.report(Progress::ChannelFinished {
                channel_id: channel_id.to_string(),
                records,
            });
        }
        outcome
    }

    /// Walks the uploads feed until no continuation token comes back, or a page fails.
    #[instrument(skip(self, info, records))]
    async fn page_loop(
        &self,
        channel_id: &str,
        info: &ChannelInfo,
        feed_id: &str,
        records: &mut Vec<VideoRecord>,
    ) -> ChannelOutcome {
        let before = records.len();
        let mut token: Option<String> = None;
        let mut page = 0;

        loop {
            page += 1;

            let feed_page = match self.platform.fetch_feed_page(feed_id, token.as_deref()).await {
                Ok(feed_page) => feed_page,
                Err(e) => {
                    self.reporter.report(Progress::PageFailed {
                        channel_id: channel_id.to_string(),
                        page,
                        error: format!("{e:#}"),
                    });
                    return ChannelOutcome::Failed {
                        records: records.len() - before,
                    };
                }
            };

            if feed_page.video_ids.is_empty() {
                match feed_page.next_page_token {
                    None => {
                        if page == 1 {
                            self.reporter.report(Progress::FeedEmpty {
                                channel_id: channel_id.to_string(),
                            });
                        }
                        break;
                    }
                    Some(next) => {
                        // Only the token decides where the feed ends, so keep going.
                        tracing::warn!(page, "feed page had no videos but a continuation token");
                        if !self.advance(&mut token, next, page) {
                            break;
                        }
                        continue;
                    }
                }
            }

            let stats = match self.platform.fetch_video_stats(&feed_page.video_ids).await {
                Ok(stats) => stats,
                Err(e) => {
                    self.reporter.report(Progress::PageFailed {
                        channel_id: channel_id.to_string(),
                        page,
                        error: format!("{e:#}"),
                    });
                    return ChannelOutcome::Failed {
                        records: records.len() - before,
                    };
                }
            };

            let mut kept = 0;
            for video_id in &feed_page.video_ids {
                let Some(video_stats) = stats.get(video_id) else {
                    tracing::trace!(%video_id, "video missing from statistics batch");
                    continue;
                };
                match VideoRecord::from_stats(channel_id, info, video_id, video_stats) {
                    Ok(record) => {
                        if self.filter.keep(record.view_count) {
                            records.push(record);
                            kept += 1;
                        }
                    }
                    Err(e) => tracing::debug!(error = %e, "skipping video"),
                }
            }
            tracing::debug!(
                page,
                videos = feed_page.video_ids.len(),
                resolved = stats.len(),
                kept,
                "processed feed page"
            );

            match feed_page.next_page_token {
                Some(next) => {
                    if !self.advance(&mut token, next, page) {
                        break;
                    }
                }
                None => break,
            }
        }

        ChannelOutcome::Done {
            records: records.len() - before,
        }
    }

    /// Moves to the next page. Returns false if the platform handed back the token
    /// we just used, which would otherwise loop forever.
    fn advance(&self, token: &mut Option<String>, next: String, page: usize) -> bool {
        if token.as_deref() == Some(next.as_str()) {
            tracing::warn!(page, token = %next, "feed repeated its page token, stopping");
            return false;
        }
        *token = Some(next);
        true
    }
}
