//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`]. Only the anticipated failures (video not
//! found, bad input, unknown format) carry a domain message to the caller.
//! Everything else is logged in full and answered with a generic 500 so that
//! paths, extractor output and other internals never leak to clients.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use ytmedia_core::{CoreError, SourceError};

pub const VIDEO_NOT_FOUND_MESSAGE: &str = "Unable to get video from Youtube";
pub const UNKNOWN_FORMAT_MESSAGE: &str = "Unknown content format";
const PROBLEM_JSON: &str = "application/problem+json";

/// All errors that can occur in the ytmedia-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The content locator did not resolve to a video.
    #[error("video not found")]
    VideoNotFound,

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// `contentFormat` named neither `Video` nor `Audio`.
    #[error("unknown content format: {0}")]
    UnknownFormat(String),

    /// The FFmpeg path is not configured.
    #[error("conversion tool is not configured")]
    ConversionToolMissing,

    /// Propagated from the video source or the conversion step.
    #[error("upstream error: {0}")]
    Upstream(#[source] SourceError),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// RFC 9457 problem details body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
}

impl ProblemDetails {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            kind: "about:blank".to_owned(),
            title: status.canonical_reason().unwrap_or("Error").to_owned(),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::VideoNotFound => {
                (StatusCode::BAD_REQUEST, VIDEO_NOT_FOUND_MESSAGE).into_response()
            }
            ServerError::BadRequest(m) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
            }
            ServerError::UnknownFormat(_) => {
                let status = StatusCode::BAD_REQUEST;
                (
                    status,
                    [(header::CONTENT_TYPE, PROBLEM_JSON)],
                    Json(ProblemDetails::new(status, UNKNOWN_FORMAT_MESSAGE)),
                )
                    .into_response()
            }
            other => {
                match &other {
                    ServerError::ConversionToolMissing => {
                        error!("download rejected: FFmpeg path was not found")
                    }
                    ServerError::Upstream(e) => error!(error = %e, "video source error"),
                    _ => error!(error = %other, "internal server error"),
                }
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<CoreError> for ServerError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::ConversionToolMissing => ServerError::ConversionToolMissing,
            CoreError::Source(e) => e.into(),
            CoreError::Io(e) => ServerError::Internal(e.to_string()),
        }
    }
}

impl From<SourceError> for ServerError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Unresolved(_) => ServerError::VideoNotFound,
            other => ServerError::Upstream(other),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(resp: Response) -> (StatusCode, Option<String>, String) {
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn not_found_is_plain_text_400() {
        let (status, ct, body) = body_of(ServerError::VideoNotFound.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(ct.unwrap().starts_with("text/plain"));
        assert_eq!(body, VIDEO_NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn unknown_format_is_problem_details() {
        let (status, ct, body) =
            body_of(ServerError::UnknownFormat("Gif".into()).into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(ct.as_deref(), Some(PROBLEM_JSON));
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["detail"], UNKNOWN_FORMAT_MESSAGE);
        assert_eq!(json["status"], 400);
        assert_eq!(json["title"], "Bad Request");
    }

    #[tokio::test]
    async fn internal_errors_hide_detail() {
        let err = ServerError::Upstream(SourceError::Extractor {
            status: "exit status: 1".into(),
            stderr: "/home/secret/path exploded".into(),
        });
        let (status, _, body) = body_of(err.into_response()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("secret"));
    }

    #[test]
    fn core_errors_map_to_taxonomy() {
        assert!(matches!(
            ServerError::from(CoreError::ConversionToolMissing),
            ServerError::ConversionToolMissing
        ));
        assert!(matches!(
            ServerError::from(CoreError::Source(SourceError::Unresolved("x".into()))),
            ServerError::VideoNotFound
        ));
        assert!(matches!(
            ServerError::from(SourceError::Parse("bad".into())),
            ServerError::Upstream(_)
        ));
    }
}
