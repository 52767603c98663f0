//! yt-dlp backed [`VideoSource`].
//!
//! Metadata comes from `--dump-json`. Downloads run in two steps: yt-dlp
//! fetches the best matching stream into a staging file next to the
//! destination, then FFmpeg converts the staging file into the requested
//! container. Staging files are removed whatever the outcome.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{VideoId, VideoSource};
use crate::error::SourceError;
use crate::services::ffmpeg;
use crate::types::{Container, ConversionOptions, VideoMetadata};

const STAGING_MARKER: &str = ".source.";

/// stderr fragments yt-dlp prints when a locator leads nowhere.
const UNAVAILABLE_MARKERS: &[&str] = &[
    "Video unavailable",
    "Private video",
    "This video is not available",
    "This video has been removed",
    "Incomplete YouTube ID",
    "is not a valid URL",
    "Unsupported URL",
    "does not exist",
];

/// Client for the `yt-dlp` executable. Holds no per-request state and is
/// shared by every request for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct YtDlpClient {
    program: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    title: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
    is_live: Option<bool>,
    live_status: Option<String>,
}

impl YtDlpClient {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Version reported by the executable; used as a startup probe.
    pub async fn version(&self) -> Result<String, SourceError> {
        let output = self.run(["--version"]).await?;
        if !output.status.success() {
            return Err(extractor_error(&output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }

    async fn run<I, S>(&self, args: I) -> Result<Output, SourceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| SourceError::Spawn {
                program: self.program.display().to_string(),
                source,
            })
    }

    async fn fetch_and_convert(
        &self,
        url: &str,
        destination: &Path,
        options: &ConversionOptions,
    ) -> Result<(), SourceError> {
        let template = staging_template(destination);
        let output = self.run(download_args(url, &template, options)).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_unavailable(&stderr) {
                return Err(SourceError::Unresolved(url.to_owned()));
            }
            return Err(extractor_error(&output));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let staged = stdout
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| SourceError::Parse("yt-dlp did not report a file path".into()))?;
        debug!(staged = %staged.display(), "stream fetched");

        ffmpeg::convert(&staged, destination, options).await?;
        Ok(())
    }
}

#[async_trait]
impl VideoSource for YtDlpClient {
    async fn get_video(&self, locator: &str) -> Result<Option<VideoMetadata>, SourceError> {
        let video = match locator.parse::<VideoId>() {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "locator rejected");
                return Ok(None);
            }
        };

        let output = self.run(metadata_args(&video.watch_url())).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_unavailable(&stderr) {
                debug!(video_id = %video, "video unavailable");
                return Ok(None);
            }
            return Err(extractor_error(&output));
        }

        parse_metadata(&String::from_utf8_lossy(&output.stdout)).map(Some)
    }

    async fn download(
        &self,
        locator: &str,
        destination: &Path,
        options: &ConversionOptions,
    ) -> Result<(), SourceError> {
        let video = locator
            .parse::<VideoId>()
            .map_err(|e| SourceError::Unresolved(e.0))?;

        info!(
            video_id = %video,
            container = %options.container,
            preset = %options.preset,
            "fetching media"
        );
        let result = self
            .fetch_and_convert(&video.watch_url(), destination, options)
            .await;
        remove_staging(destination).await;
        result
    }
}

fn metadata_args(url: &str) -> Vec<String> {
    [
        "--dump-json",
        "--skip-download",
        "--no-playlist",
        "--no-warnings",
        "--",
        url,
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

fn format_selector(container: Container) -> &'static str {
    if container.is_audio_only() {
        "ba/b"
    } else {
        "bv*+ba/b"
    }
}

fn download_args(url: &str, template: &Path, options: &ConversionOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--no-playlist".into(),
        "--no-progress".into(),
        "--no-warnings".into(),
        "-f".into(),
        format_selector(options.container).into(),
    ];
    if !options.container.is_audio_only() {
        args.extend(["--merge-output-format".into(), "mkv".into()]);
    }
    args.extend([
        "--ffmpeg-location".into(),
        options.ffmpeg_path.clone().into_os_string(),
        "-o".into(),
        template.as_os_str().to_owned(),
        "--print".into(),
        "after_move:filepath".into(),
        "--no-simulate".into(),
        "--".into(),
        url.into(),
    ]);
    args
}

/// `<dir>/<stem>.source.%(ext)s` for a destination `<dir>/<stem>.<ext>`.
fn staging_template(destination: &Path) -> PathBuf {
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_owned());
    destination.with_file_name(format!("{stem}{STAGING_MARKER}%(ext)s"))
}

async fn remove_staging(destination: &Path) {
    let (Some(dir), Some(stem)) = (destination.parent(), destination.file_stem()) else {
        return;
    };
    let prefix = format!("{}{STAGING_MARKER}", stem.to_string_lossy());

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot scan for staging files");
            return;
        }
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        if entry.file_name().to_string_lossy().starts_with(&prefix) {
            if let Err(e) = tokio::fs::remove_file(entry.path()).await {
                warn!(path = %entry.path().display(), error = %e, "failed to remove staging file");
            }
        }
    }
}

fn is_unavailable(stderr: &str) -> bool {
    UNAVAILABLE_MARKERS.iter().any(|m| stderr.contains(m))
}

fn extractor_error(output: &Output) -> SourceError {
    SourceError::Extractor {
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
    }
}

fn parse_metadata(stdout: &str) -> Result<VideoMetadata, SourceError> {
    let raw: RawInfo =
        serde_json::from_str(stdout.trim()).map_err(|e| SourceError::Parse(e.to_string()))?;

    let title = raw
        .title
        .ok_or_else(|| SourceError::Parse("missing title".into()))?;
    let author = raw.channel.or(raw.uploader).unwrap_or_default();

    let live = raw.is_live.unwrap_or(false) || raw.live_status.as_deref() == Some("is_live");
    let duration = raw
        .duration
        .filter(|_| !live)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());

    Ok(VideoMetadata {
        title,
        author,
        duration,
    })
}
