//! YouTube Videos API types.

use crate::youtube_api::types::PageInfo;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Response structure for the `videos.list` API call.
///
/// Contains a list of [`Video`] resources that match the request criteria,
/// along with pagination information in [`PageInfo`]. Ids that no longer resolve
/// (deleted or private videos) are silently left out of `items`.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos/list>
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoListResponse {
    /// Identifies the API resource's type.
    ///
    /// The value will be `youtube#videoListResponse`.
    pub kind: String,
    /// A list of videos that match the request criteria.
    #[serde(default)]
    pub items: VecDeque<Video>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
}

/// A `video` resource represents a YouTube video.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#resource>
#[derive(Debug, Serialize, Deserialize)]
pub struct Video {
    /// The ID that YouTube uses to uniquely identify the video.
    pub id: String,
    /// Contains basic details about the video.
    #[serde(default)]
    pub snippet: VideoSnippet,
    /// Contains statistics about the video.
    #[serde(default)]
    pub statistics: VideoStatistics,
}

/// Basic details about a video.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#snippet>
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VideoSnippet {
    /// The video's title.
    #[serde(default)]
    pub title: String,
    /// The date and time that the video was published, in ISO 8601 format.
    ///
    /// Kept verbatim so an odd timestamp never costs us the whole batch.
    #[serde(rename = "publishedAt", default)]
    pub published_at: String,
}

/// Statistics about the video.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#statistics>
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VideoStatistics {
    /// The number of times the video has been viewed.
    #[serde(rename = "viewCount")]
    pub view_count: Option<String>,
    /// The number of users who have indicated that they liked the video.
    ///
    /// Absent when the creator has hidden the like count.
    #[serde(rename = "likeCount")]
    pub like_count: Option<String>,
    /// The number of comments for the video.
    ///
    /// Absent when comments are disabled.
    #[serde(rename = "commentCount")]
    pub comment_count: Option<String>,
}
