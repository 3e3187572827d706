//! Core YouTube API client functionality.

use crate::platform::{ChannelInfo, FeedPage, PlatformClient, VideoStats};
use crate::youtube_api::{
    channels::{Channel, ChannelListResponse},
    playlist_items::PlaylistItemListResponse,
    types::MAX_PAGE_SIZE,
    videos::VideoListResponse,
};
use async_trait::async_trait;
use eyre::Context;
use http::Method;
use std::collections::HashMap;
use tracing::instrument;

/// Where the YouTube Data API v3 lives.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Client for reading public data from the YouTube Data API v3.
///
/// Requests are authorized with an API key rather than OAuth, which is all that
/// public channel and video data requires. The client is cheap to clone; clones
/// share the underlying connection pool.
#[derive(Clone)]
pub struct YouTubeClient {
    /// API key sent as the `key` query parameter on every request.
    api_key: String,
    /// Root of the API, without a trailing slash.
    base_url: String,
    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl YouTubeClient {
    /// Creates a new YouTube API client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - A YouTube Data API key
    /// * `proxy` - Optional proxy URL that all requests (HTTP and HTTPS) are routed through
    pub fn new(api_key: impl Into<String>, proxy: Option<&str>) -> eyre::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .with_context(|| format!("configure proxy {proxy}"))?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().context("build HTTP client")?;
        Ok(Self::with_http_client(api_key, client))
    }

    /// Creates a client around an existing HTTP client.
    pub fn with_http_client(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    /// Points the client at a different API root (used against local test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Makes a keyed HTTP request to the YouTube API with common error handling.
    ///
    /// # Arguments
    ///
    /// * `method` - The HTTP method to use
    /// * `resource` - The API resource, such as `channels` or `videos`
    /// * `query_params` - Query parameters; the API key is appended automatically
    ///
    /// # Returns
    ///
    /// The raw [`reqwest::Response`] for method-specific JSON parsing.
    #[instrument(skip(self), ret, level = tracing::Level::TRACE)]
    pub(crate) async fn make_request(
        &self,
        method: Method,
        resource: &str,
        query_params: &[(&str, &str)],
    ) -> eyre::Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, resource);

        let response = self
            .client
            .request(method.clone(), &url)
            .query(query_params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("send {} request to YouTube API: {}", method, url))?;

        let status_code = response.status();
        if !status_code.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(eyre::eyre!(
                "YouTube API {} request failed with status {}: {}",
                method,
                status_code,
                error_text
            ));
        }

        Ok(response)
    }

    /// Looks up a single channel by id with the given `part`s.
    ///
    /// Returns `None` if YouTube knows no channel with that id.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list>
    async fn get_channel(&self, channel_id: &str, part: &str) -> eyre::Result<Option<Channel>> {
        let query_params = [("part", part), ("id", channel_id)];

        let response = self
            .make_request(Method::GET, "channels", &query_params)
            .await?;

        let channels: ChannelListResponse = response
            .json()
            .await
            .context("parse YouTube channels API response as JSON")?;

        tracing::debug!(
            channel_id,
            part,
            total_results = channels.page_info.total_results,
            returned_items = channels.items.len(),
            "fetched channel"
        );

        Ok(channels.items.into_iter().next())
    }

    /// Fetches one page of a playlist.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/list>
    async fn list_playlist_items_internal(
        &self,
        playlist_id: &str,
        max_results: usize,
        page_token: Option<&str>,
    ) -> eyre::Result<PlaylistItemListResponse> {
        let max_results_string = max_results.to_string();
        let mut query_params = vec![
            ("part", "contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results_string.as_str()),
        ];

        // Add pageToken if provided
        if let Some(token) = page_token {
            query_params.push(("pageToken", token));
        }

        let response = self
            .make_request(Method::GET, "playlistItems", &query_params)
            .await?;

        let items: PlaylistItemListResponse = response
            .json()
            .await
            .context("parse YouTube playlistItems API response as JSON")?;

        tracing::debug!(
            playlist_id,
            total_results = items.page_info.total_results,
            returned_items = items.items.len(),
            has_next_page = items.next_page_token.is_some(),
            "fetched playlist items"
        );

        Ok(items)
    }

    /// Fetches snippet and statistics for a batch of videos.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/videos/list>
    async fn list_videos_internal(&self, video_ids: &[String]) -> eyre::Result<VideoListResponse> {
        let ids = video_ids.join(",");
        let query_params = [("part", "snippet,statistics"), ("id", ids.as_str())];

        let response = self
            .make_request(Method::GET, "videos", &query_params)
            .await?;

        let videos: VideoListResponse = response
            .json()
            .await
            .context("parse YouTube videos API response as JSON")?;

        tracing::debug!(
            requested = video_ids.len(),
            returned_items = videos.items.len(),
            "fetched video statistics"
        );

        Ok(videos)
    }
}

#[async_trait]
impl PlatformClient for YouTubeClient {
    #[instrument(skip(self))]
    async fn resolve_channel_info(&self, channel_id: &str) -> eyre::Result<Option<ChannelInfo>> {
        let Some(channel) = self.get_channel(channel_id, "snippet,statistics").await? else {
            return Ok(None);
        };

        let snippet = channel
            .snippet
            .ok_or_else(|| eyre::eyre!("channel {} has no snippet", channel.id))?;
        // A hidden subscriber count is simply left out of the response.
        let subscriber_count = match channel.statistics.and_then(|s| s.subscriber_count) {
            Some(count) => count
                .parse::<u64>()
                .with_context(|| format!("parse subscriber count {count:?}"))?,
            None => 0,
        };

        Ok(Some(ChannelInfo {
            id: channel.id,
            display_name: snippet.title,
            subscriber_count,
        }))
    }

    #[instrument(skip(self))]
    async fn resolve_uploads_feed(&self, channel_id: &str) -> eyre::Result<Option<String>> {
        let channel = self.get_channel(channel_id, "contentDetails").await?;
        Ok(channel
            .and_then(|c| c.content_details)
            .and_then(|d| d.related_playlists.uploads))
    }

    #[instrument(skip(self))]
    async fn fetch_feed_page(
        &self,
        feed_id: &str,
        page_token: Option<&str>,
    ) -> eyre::Result<FeedPage> {
        let response = self
            .list_playlist_items_internal(feed_id, MAX_PAGE_SIZE, page_token)
            .await?;

        Ok(FeedPage {
            video_ids: response
                .items
                .into_iter()
                .map(|item| item.content_details.video_id)
                .collect(),
            next_page_token: response.next_page_token,
        })
    }

    #[instrument(skip(self, video_ids), fields(count = video_ids.len()))]
    async fn fetch_video_stats(
        &self,
        video_ids: &[String],
    ) -> eyre::Result<HashMap<String, VideoStats>> {
        eyre::ensure!(
            video_ids.len() <= MAX_PAGE_SIZE,
            "at most {} videos can be looked up at once, got {}",
            MAX_PAGE_SIZE,
            video_ids.len()
        );
        if video_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let response = self.list_videos_internal(video_ids).await?;

        Ok(response
            .items
            .into_iter()
            .map(|video| {
                let stats = VideoStats {
                    title: video.snippet.title,
                    published_at: video.snippet.published_at,
                    view_count: video.statistics.view_count,
                    like_count: video.statistics.like_count,
                    comment_count: video.statistics.comment_count,
                };
                (video.id, stats)
            })
            .collect())
    }
}
