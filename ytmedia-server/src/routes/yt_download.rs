//! YouTube metadata lookup and media download endpoints.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{HeaderValue, header};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::Stream;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;
use ytmedia_core::{ContentFormat, DownloadResult, TempMedia, mime_type_for};

use crate::error::{ProblemDetails, ServerError};
use crate::schemas::yt_download::{DownloadQuery, MediaInfoQuery, MediaInfoResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(get_media_info, download_media),
    components(schemas(ContentFormat, MediaInfoResponse, ProblemDetails))
)]
pub struct YtDownloadApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/YTDownload/GetYTMediaInfo", get(get_media_info))
        .route("/YTDownload/DownloadYTMedia", post(download_media))
}

fn validate(query: &impl Validate) -> Result<(), ServerError> {
    query
        .validate()
        .map_err(|e| ServerError::BadRequest(e.to_string()))
}

/// Title, author and duration of a video.
#[utoipa::path(
    get,
    path = "/YTDownload/GetYTMediaInfo",
    tag = "YTDownload",
    params(MediaInfoQuery),
    responses(
        (status = 200, description = "Metadata retrieved", body = MediaInfoResponse),
        (status = 400, description = "Video could not be resolved", body = String, content_type = "text/plain"),
        (status = 500, description = "Video source error"),
    )
)]
pub async fn get_media_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MediaInfoQuery>,
) -> Result<Json<MediaInfoResponse>, ServerError> {
    validate(&query)?;
    info!("Getting information for {}", query.content_url);

    let video = state
        .source
        .get_video(&query.content_url)
        .await?
        .ok_or(ServerError::VideoNotFound)?;

    Ok(Json(video.into()))
}

/// Download a video as `mp4` or its soundtrack as `mp3`.
///
/// The converted file is streamed back as an attachment named
/// `download.<ext>` and deleted once the body has been sent.
#[utoipa::path(
    post,
    path = "/YTDownload/DownloadYTMedia",
    tag = "YTDownload",
    params(DownloadQuery),
    responses(
        (status = 200, description = "Converted media: `download.mp4` as video/mp4 or `download.mp3` as audio/mp3"),
        (status = 400, description = "Unknown content format", body = ProblemDetails, content_type = "application/problem+json"),
        (status = 500, description = "Conversion tool not configured or video source error"),
    )
)]
pub async fn download_media(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ServerError> {
    validate(&query)?;

    let mime_type = mime_type_for(&query.content_format);
    let format: ContentFormat = query
        .content_format
        .parse()
        .map_err(|_| ServerError::UnknownFormat(query.content_format.clone()))?;

    let DownloadResult { media, extension } = state
        .downloads
        .download(&query.content_url, format.container())
        .await?;
    info!(
        "Downloading {} from path {}",
        format.to_string().to_lowercase(),
        query.content_url
    );

    file_response(media, mime_type, extension).await
}

async fn file_response(
    media: TempMedia,
    mime_type: &'static str,
    extension: &str,
) -> Result<Response, ServerError> {
    let file = File::open(media.path())
        .await
        .map_err(|e| ServerError::Internal(format!("cannot open converted media: {e}")))?;
    let len = file.metadata().await.ok().map(|m| m.len());

    let body = Body::from_stream(MediaStream {
        inner: ReaderStream::new(file),
        _media: media,
    });
    let mut response = Response::new(body);

    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime_type));
    let disposition = format!("attachment; filename=\"download.{extension}\"");
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    if let Some(len) = len {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }

    Ok(response)
}

/// File body that owns its [`TempMedia`], so the file disappears when the
/// body is dropped, whether it was sent completely or abandoned.
struct MediaStream {
    inner: ReaderStream<File>,
    _media: TempMedia,
}

impl Stream for MediaStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
