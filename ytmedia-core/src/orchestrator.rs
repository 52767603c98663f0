//! Download workflow.
//!
//! Start → validate config → download + convert → done. Every step is a hard
//! precondition for the next; nothing is retried. The output lives in a
//! [`TempMedia`] that removes itself when dropped, so callers decide how long
//! the file survives simply by holding on to it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::source::VideoSource;
use crate::types::{Container, ConversionOptions, ConversionPreset};

/// Where the conversion tool path comes from.
///
/// Implementations must re-read their backing configuration on every call;
/// the orchestrator asks once per download and never caches the answer.
pub trait ConversionSettings: Send + Sync {
    fn ffmpeg_path(&self) -> Option<String>;
}

/// A uniquely named file in the work directory, deleted on drop.
#[derive(Debug)]
pub struct TempMedia {
    path: PathBuf,
}

impl TempMedia {
    /// Reserve `<dir>/ytmedia-<uuid>.<extension>`. Nothing is created on disk.
    pub fn allocate(dir: &Path, extension: &str) -> Self {
        Self {
            path: dir.join(format!("ytmedia-{}.{extension}", Uuid::new_v4())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempMedia {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "temporary media removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove temporary media"),
        }
    }
}

/// A converted file ready to be served.
#[derive(Debug)]
pub struct DownloadResult {
    pub media: TempMedia,
    pub extension: &'static str,
}

pub struct DownloadOrchestrator {
    source: Arc<dyn VideoSource>,
    settings: Arc<dyn ConversionSettings>,
    work_dir: PathBuf,
}

impl DownloadOrchestrator {
    pub fn new(
        source: Arc<dyn VideoSource>,
        settings: Arc<dyn ConversionSettings>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            settings,
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Current FFmpeg path, or `None` when the setting is absent or blank.
    /// Re-read on every call.
    pub fn conversion_tool(&self) -> Option<PathBuf> {
        self.settings
            .ffmpeg_path()
            .map(|path| path.trim().to_owned())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
    }

    /// Fetch `locator` and convert it into `container`.
    pub async fn download(
        &self,
        locator: &str,
        container: Container,
    ) -> Result<DownloadResult, CoreError> {
        let media = TempMedia::allocate(&self.work_dir, container.extension());

        let Some(ffmpeg_path) = self.conversion_tool() else {
            error!("FFmpeg path was not found");
            return Err(CoreError::ConversionToolMissing);
        };

        tokio::fs::create_dir_all(&self.work_dir).await?;

        let options = ConversionOptions {
            container,
            preset: ConversionPreset::UltraFast,
            ffmpeg_path,
        };
        self.source.download(locator, media.path(), &options).await?;

        Ok(DownloadResult {
            media,
            extension: container.extension(),
        })
    }
}

impl std::fmt::Debug for DownloadOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadOrchestrator")
            .field("work_dir", &self.work_dir)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::SourceError;
    use crate::types::VideoMetadata;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    #[derive(Default)]
    struct RecordingSource {
        calls: Mutex<Vec<ConversionOptions>>,
        fail: bool,
    }

    #[async_trait]
    impl VideoSource for RecordingSource {
        async fn get_video(&self, _locator: &str) -> Result<Option<VideoMetadata>, SourceError> {
            Ok(None)
        }

        async fn download(
            &self,
            _locator: &str,
            destination: &Path,
            options: &ConversionOptions,
        ) -> Result<(), SourceError> {
            self.calls.lock().unwrap().push(options.clone());
            tokio::fs::write(destination, b"media").await?;
            if self.fail {
                return Err(SourceError::Extractor {
                    status: "exit status: 1".into(),
                    stderr: "boom".into(),
                });
            }
            Ok(())
        }
    }

    struct Fixed(Option<&'static str>);

    impl ConversionSettings for Fixed {
        fn ffmpeg_path(&self) -> Option<String> {
            self.0.map(str::to_owned)
        }
    }

    fn orchestrator(
        source: Arc<RecordingSource>,
        path: Option<&'static str>,
        dir: &Path,
    ) -> DownloadOrchestrator {
        DownloadOrchestrator::new(source, Arc::new(Fixed(path)), dir)
    }

    #[tokio::test]
    #[traced_test]
    async fn missing_tool_path_stops_before_download() {
        let dir = tempfile::tempdir().unwrap();
        for path in [None, Some(""), Some("   ")] {
            let source = Arc::new(RecordingSource::default());
            let err = orchestrator(source.clone(), path, dir.path())
                .download("dQw4w9WgXcQ", Container::Mp3)
                .await
                .unwrap_err();
            assert!(matches!(err, CoreError::ConversionToolMissing));
            assert!(source.calls.lock().unwrap().is_empty());
        }
        assert!(logs_contain("FFmpeg path was not found"));
    }

    #[tokio::test]
    async fn passes_container_preset_and_tool_path() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(RecordingSource::default());
        let result = orchestrator(source.clone(), Some("/opt/ffmpeg/bin/ffmpeg"), dir.path())
            .download("dQw4w9WgXcQ", Container::Mp4)
            .await
            .unwrap();

        assert_eq!(result.extension, "mp4");
        assert_eq!(result.media.path().extension().unwrap(), "mp4");
        assert!(result.media.path().starts_with(dir.path()));
        assert!(result.media.path().exists());

        let calls = source.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].container, Container::Mp4);
        assert_eq!(calls[0].preset, ConversionPreset::UltraFast);
        assert_eq!(calls[0].ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
    }

    #[tokio::test]
    async fn dropping_result_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(RecordingSource::default());
        let result = orchestrator(source, Some("ffmpeg"), dir.path())
            .download("dQw4w9WgXcQ", Container::Mp3)
            .await
            .unwrap();
        let path = result.media.path().to_path_buf();
        assert!(path.exists());
        drop(result);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn failed_download_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(RecordingSource {
            fail: true,
            ..Default::default()
        });
        let err = orchestrator(source, Some("ffmpeg"), dir.path())
            .download("dQw4w9WgXcQ", Container::Mp3)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Source(SourceError::Extractor { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn conversion_tool_is_trimmed_or_absent() {
        let dir = Path::new("/tmp");
        let source = Arc::new(RecordingSource::default());
        let orch = orchestrator(source.clone(), Some("  /opt/ffmpeg  "), dir);
        assert_eq!(orch.conversion_tool(), Some(PathBuf::from("/opt/ffmpeg")));
        assert_eq!(orchestrator(source.clone(), Some(" "), dir).conversion_tool(), None);
        assert_eq!(orchestrator(source, None, dir).conversion_tool(), None);
    }

    #[test]
    fn allocations_are_unique() {
        let dir = Path::new("/tmp");
        let a = TempMedia::allocate(dir, "mp3");
        let b = TempMedia::allocate(dir, "mp3");
        assert_ne!(a.path(), b.path());
        assert!(a.path().to_string_lossy().ends_with(".mp3"));
    }

    #[tokio::test]
    async fn concurrent_downloads_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(RecordingSource::default());
        let orch = orchestrator(source.clone(), Some("ffmpeg"), dir.path());
        let (a, b) = tokio::join!(
            orch.download("dQw4w9WgXcQ", Container::Mp3),
            orch.download("dQw4w9WgXcQ", Container::Mp3),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_ne!(a.media.path(), b.media.path());
        assert_eq!(source.calls.lock().unwrap().len(), 2);
    }
}
