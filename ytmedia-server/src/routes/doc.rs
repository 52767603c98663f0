use crate::routes::{health, yt_download};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ytmedia-server",
        description = "YouTube metadata lookup and mp4/mp3 download",
        version = "0.1.0",
    ),
    tags(
        (name = "YTDownload", description = "Metadata and media download"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(yt_download::YtDownloadApi::openapi());
    root
}
