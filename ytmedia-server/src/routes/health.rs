//! Liveness plus a snapshot of the external tools downloads depend on.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(HealthResponse)))]
pub struct HealthApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// yt-dlp executable the server invokes.
    pub ytdlp: String,
    /// Whether `YTMEDIA_FFMPEG_PATH` currently holds a non-blank value.
    pub ffmpeg_configured: bool,
}

/// Always 200 while the process serves requests.
///
/// `ffmpegConfigured` is evaluated on each call, so setting the variable on a
/// running server shows up here without a restart. Neither tool is executed.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        ytdlp: state.config.ytdlp_path.display().to_string(),
        ffmpeg_configured: state.downloads.conversion_tool().is_some(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use ytmedia_core::source::YtDlpClient;
    use ytmedia_core::{ConversionSettings, DownloadOrchestrator};

    use crate::config::Config;

    struct Fixed(Option<&'static str>);

    impl ConversionSettings for Fixed {
        fn ffmpeg_path(&self) -> Option<String> {
            self.0.map(str::to_owned)
        }
    }

    fn state(ffmpeg: Option<&'static str>) -> Arc<AppState> {
        let source = Arc::new(YtDlpClient::new("/opt/tools/yt-dlp"));
        let work_dir = std::env::temp_dir();
        Arc::new(AppState {
            config: Arc::new(Config {
                bind_address: "127.0.0.1:0".into(),
                log_level: "info".into(),
                log_json: false,
                enable_swagger: false,
                cors_allowed_origins: None,
                ytdlp_path: "/opt/tools/yt-dlp".into(),
                work_dir: work_dir.clone(),
            }),
            downloads: Arc::new(DownloadOrchestrator::new(
                source.clone(),
                Arc::new(Fixed(ffmpeg)),
                work_dir,
            )),
            source,
        })
    }

    #[tokio::test]
    async fn reports_version_and_ytdlp_program() {
        let Json(body) = get_health(State(state(None))).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(body.ytdlp, "/opt/tools/yt-dlp");
    }

    #[tokio::test]
    async fn reports_whether_ffmpeg_is_configured() {
        let Json(body) = get_health(State(state(Some("/usr/bin/ffmpeg")))).await;
        assert!(body.ffmpeg_configured);

        for ffmpeg in [None, Some(""), Some("   ")] {
            let Json(body) = get_health(State(state(ffmpeg))).await;
            assert!(!body.ffmpeg_configured, "{ffmpeg:?}");
        }
    }

    #[test]
    fn body_uses_camel_case_keys() {
        let body = serde_json::to_value(HealthResponse {
            status: "ok".into(),
            version: "0.1.0".into(),
            ytdlp: "yt-dlp".into(),
            ffmpeg_configured: true,
        })
        .unwrap();
        assert_eq!(body["ffmpegConfigured"], true);
        assert_eq!(body["ytdlp"], "yt-dlp");
    }
}
