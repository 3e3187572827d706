//! The unit of output: one row per retained video.

use crate::platform::{ChannelInfo, VideoStats};
use serde::Serialize;

/// A video that passed the view threshold, together with its channel's details.
///
/// Field order is the column order of the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRecord {
    pub channel_id: String,
    pub channel_name: String,
    pub subscriber_count: u64,
    pub video_id: String,
    pub title: String,
    pub published_at: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

/// Why a video's statistics could not be turned into a [`VideoRecord`].
///
/// These never surface to the user; the video is skipped.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordParseError {
    #[error("video {video_id} has no view count")]
    MissingViewCount { video_id: String },
    #[error("video {video_id} has malformed {field}: {value:?}")]
    MalformedCount {
        video_id: String,
        field: &'static str,
        value: String,
    },
}

impl VideoRecord {
    /// Builds a record for `video_id` from its statistics and its channel's metadata.
    ///
    /// `channel_id` is the id as it appeared in the input, which is what the export reports.
    /// Missing like and comment counts (creators can hide both) become zero.
    pub fn from_stats(
        channel_id: &str,
        channel: &ChannelInfo,
        video_id: &str,
        stats: &VideoStats,
    ) -> Result<Self, RecordParseError> {
        let view_count = match &stats.view_count {
            Some(raw) => parse_count(video_id, "view count", raw)?,
            None => {
                return Err(RecordParseError::MissingViewCount {
                    video_id: video_id.to_string(),
                });
            }
        };
        let like_count = parse_optional_count(video_id, "like count", stats.like_count.as_deref())?;
        let comment_count =
            parse_optional_count(video_id, "comment count", stats.comment_count.as_deref())?;

        Ok(Self {
            channel_id: channel_id.to_string(),
            channel_name: channel.display_name.clone(),
            subscriber_count: channel.subscriber_count,
            video_id: video_id.to_string(),
            title: stats.title.clone(),
            published_at: stats.published_at.clone(),
            view_count,
            like_count,
            comment_count,
        })
    }
}

fn parse_count(video_id: &str, field: &'static str, raw: &str) -> Result<u64, RecordParseError> {
    raw.trim()
        .parse()
        .map_err(|_| RecordParseError::MalformedCount {
            video_id: video_id.to_string(),
            field,
            value: raw.to_string(),
        })
}

fn parse_optional_count(
    video_id: &str,
    field: &'static str,
    raw: Option<&str>,
) -> Result<u64, RecordParseError> {
    raw.map_or(Ok(0), |raw| parse_count(video_id, field, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn channel() -> ChannelInfo {
        ChannelInfo {
            id: "UCabc".to_string(),
            display_name: "Some Channel".to_string(),
            subscriber_count: 1200,
        }
    }

    fn stats(view: Option<&str>, like: Option<&str>, comment: Option<&str>) -> VideoStats {
        VideoStats {
            title: "A video".to_string(),
            published_at: "2024-03-01T12:00:00Z".to_string(),
            view_count: view.map(String::from),
            like_count: like.map(String::from),
            comment_count: comment.map(String::from),
        }
    }

    #[test]
    fn builds_record_with_channel_details() {
        let record =
            VideoRecord::from_stats("UCabc", &channel(), "v1", &stats(Some("5000"), Some("12"), Some("3")))
                .unwrap();
        assert_eq!(
            record,
            VideoRecord {
                channel_id: "UCabc".to_string(),
                channel_name: "Some Channel".to_string(),
                subscriber_count: 1200,
                video_id: "v1".to_string(),
                title: "A video".to_string(),
                published_at: "2024-03-01T12:00:00Z".to_string(),
                view_count: 5000,
                like_count: 12,
                comment_count: 3,
            }
        );
    }

    #[test]
    fn hidden_likes_and_comments_default_to_zero() {
        let record =
            VideoRecord::from_stats("UCabc", &channel(), "v1", &stats(Some("7"), None, None)).unwrap();
        assert_eq!(record.like_count, 0);
        assert_eq!(record.comment_count, 0);
    }

    #[test]
    fn missing_view_count_is_a_parse_error() {
        let err = VideoRecord::from_stats("UCabc", &channel(), "v1", &stats(None, Some("1"), None))
            .unwrap_err();
        assert_eq!(
            err,
            RecordParseError::MissingViewCount {
                video_id: "v1".to_string()
            }
        );
    }

    #[test]
    fn malformed_counts_are_parse_errors() {
        let err =
            VideoRecord::from_stats("UCabc", &channel(), "v1", &stats(Some("lots"), None, None))
                .unwrap_err();
        assert_eq!(err.to_string(), r#"video v1 has malformed view count: "lots""#);

        let err = VideoRecord::from_stats("UCabc", &channel(), "v1", &stats(Some("9"), Some("-1"), None))
            .unwrap_err();
        assert!(matches!(
            err,
            RecordParseError::MalformedCount {
                field: "like count",
                ..
            }
        ));
    }
}
