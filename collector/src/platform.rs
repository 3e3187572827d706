//! The seam between the harvester and the remote video platform.
//!
//! Every operation distinguishes three outcomes: a value, "not found" (`Ok(None)`),
//! and a failure (`Err`). Not found is an ordinary answer from the platform and is
//! never reported as an error. Retry, backoff and timeout policy belong to the
//! implementation; the harvester only ever sees these three outcomes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Channel metadata, resolved once per channel and immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: String,
    pub display_name: String,
    /// Zero when the channel hides its subscriber count.
    pub subscriber_count: u64,
}

/// One page of a channel's uploads feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedPage {
    /// At most [`crate::youtube_api::types::MAX_PAGE_SIZE`] ids, in feed order.
    pub video_ids: Vec<String>,
    /// Absent on the final page.
    pub next_page_token: Option<String>,
}

/// Statistics for a single video, as the platform reports them.
///
/// Counts are left unparsed; turning them into numbers is where a malformed
/// entry gets caught (see [`crate::record::VideoRecord::from_stats`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoStats {
    pub title: String,
    pub published_at: String,
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

/// Read-only view of the video platform that the harvester drives.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Display name and subscriber count for a channel, or `None` if no such channel exists.
    async fn resolve_channel_info(&self, channel_id: &str) -> eyre::Result<Option<ChannelInfo>>;

    /// Identifier of the channel's canonical uploads feed, or `None` if it has none.
    async fn resolve_uploads_feed(&self, channel_id: &str) -> eyre::Result<Option<String>>;

    /// One page of the feed. Pass `None` for the first page.
    async fn fetch_feed_page(
        &self,
        feed_id: &str,
        page_token: Option<&str>,
    ) -> eyre::Result<FeedPage>;

    /// Batch lookup of at most 50 videos in a single call.
    ///
    /// Ids the platform silently drops (deleted or private videos) are simply absent
    /// from the returned map.
    async fn fetch_video_stats(
        &self,
        video_ids: &[String],
    ) -> eyre::Result<HashMap<String, VideoStats>>;
}

#[async_trait]
impl<T: PlatformClient + ?Sized> PlatformClient for Arc<T> {
    async fn resolve_channel_info(&self, channel_id: &str) -> eyre::Result<Option<ChannelInfo>> {
        (**self).resolve_channel_info(channel_id).await
    }

    async fn resolve_uploads_feed(&self, channel_id: &str) -> eyre::Result<Option<String>> {
        (**self).resolve_uploads_feed(channel_id).await
    }

    async fn fetch_feed_page(
        &self,
        feed_id: &str,
        page_token: Option<&str>,
    ) -> eyre::Result<FeedPage> {
        (**self).fetch_feed_page(feed_id, page_token).await
    }

    async fn fetch_video_stats(
        &self,
        video_ids: &[String],
    ) -> eyre::Result<HashMap<String, VideoStats>> {
        (**self).fetch_video_stats(video_ids).await
    }
}
