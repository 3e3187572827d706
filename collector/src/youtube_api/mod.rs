//! YouTube Data API v3 client library.
//!
//! This module covers the read-only slice of the API needed to enumerate a channel's
//! uploads and look up their statistics. All of it works with a plain API key.
//!
//! # How a channel's videos are reached
//!
//! YouTube does not list videos per channel directly. Instead:
//!
//! 1. `channels.list` with `part=contentDetails` names the channel's *uploads playlist*.
//! 2. `playlistItems.list` pages through that playlist, 50 video ids at a time.
//! 3. `videos.list` resolves up to 50 ids per call into titles and statistics.
//!
//! [`YouTubeClient`] exposes exactly these steps through [`crate::platform::PlatformClient`].
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use youtube_collector::platform::PlatformClient;
//! use youtube_collector::youtube_api::YouTubeClient;
//!
//! # async fn example() -> eyre::Result<()> {
//! let client = YouTubeClient::new("my-api-key", None)?;
//! if let Some(feed) = client.resolve_uploads_feed("UC_x5XG1OV2P6uZZ5FSM9Ttw").await? {
//!     let page = client.fetch_feed_page(&feed, None).await?;
//!     let stats = client.fetch_video_stats(&page.video_ids).await?;
//!     println!("{} videos on the first page", stats.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod client;
pub mod playlist_items;
pub mod types;
pub mod videos;

// Re-export main types for convenience
pub use client::{DEFAULT_BASE_URL, YouTubeClient};
pub use types::{MAX_PAGE_SIZE, PageInfo};

pub use channels::{Channel, ChannelSnippet, ChannelStatistics};
pub use playlist_items::PlaylistItem;
pub use videos::{Video, VideoStatistics};
