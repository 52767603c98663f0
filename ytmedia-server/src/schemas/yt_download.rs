use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;
use ytmedia_core::{ContentFormat, VideoMetadata};

/// Query for `GET /YTDownload/GetYTMediaInfo`.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MediaInfoQuery {
    /// YouTube URL or 11-character video ID.
    #[validate(length(min = 1, message = "contentUrl must not be empty"))]
    pub content_url: String,
}

/// Query for `POST /YTDownload/DownloadYTMedia`.
///
/// `content_format` stays a raw string so that an unknown value reaches the
/// handler and gets a problem response instead of a generic binding error.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// YouTube URL or 11-character video ID.
    #[validate(length(min = 1, message = "contentUrl must not be empty"))]
    pub content_url: String,
    /// `Video` (mp4) or `Audio` (mp3).
    #[param(value_type = ContentFormat)]
    pub content_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaInfoResponse {
    pub message: String,
    pub title: String,
    pub author: String,
    /// `hh:mm:ss` (`d.hh:mm:ss` from one day up); `null` for live content.
    #[schema(example = "00:03:32")]
    pub duration: Option<String>,
}

impl From<VideoMetadata> for MediaInfoResponse {
    fn from(video: VideoMetadata) -> Self {
        Self {
            message: "Metadata retrieved successfully".to_owned(),
            title: video.title,
            author: video.author,
            duration: video.duration.map(format_time_span),
        }
    }
}

/// Whole-second time span in the `[d.]hh:mm:ss` shape.
pub fn format_time_span(duration: Duration) -> String {
    let total = duration.as_secs();
    let (days, rem) = (total / 86_400, total % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let (minutes, seconds) = (rem / 60, rem % 60);
    if days > 0 {
        format!("{days}.{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}
