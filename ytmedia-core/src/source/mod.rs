//! Video source seam.
//!
//! The service only ever talks to a [`VideoSource`]; production uses
//! [`YtDlpClient`], tests swap in doubles.

mod locator;
mod ytdlp;

use std::path::Path;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::{ConversionOptions, VideoMetadata};

pub use locator::{InvalidLocator, VideoId};
pub use ytdlp::YtDlpClient;

#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Resolve a content locator. `Ok(None)` means the locator does not
    /// lead to a video.
    async fn get_video(&self, locator: &str) -> Result<Option<VideoMetadata>, SourceError>;

    /// Fetch the media behind `locator` and write it to `destination`,
    /// converted into `options.container`. Fetch and conversion are one unit:
    /// on success `destination` holds the complete file.
    async fn download(
        &self,
        locator: &str,
        destination: &Path,
        options: &ConversionOptions,
    ) -> Result<(), SourceError>;
}
