use thiserror::Error;

/// Failures of the FFmpeg conversion step.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("failed to start ffmpeg: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("ffmpeg exited with {status}: {detail}")]
    Failed { status: String, detail: String },

    #[error("ffmpeg worker thread failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures raised by a [`crate::source::VideoSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The locator does not point at a video the source can reach.
    #[error("video could not be resolved: {0}")]
    Unresolved(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("extractor exited with {status}: {stderr}")]
    Extractor { status: String, stderr: String },

    #[error("unexpected extractor output: {0}")]
    Parse(String),

    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the download orchestrator.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("FFmpeg path was not found")]
    ConversionToolMissing,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("work directory unavailable: {0}")]
    Io(#[from] std::io::Error),
}
