use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// MIME type used when the requested format is not recognised.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// What the caller wants out of a video: the picture or only the sound.
///
/// Serialised as the exact member names (`"Video"` / `"Audio"`), both
/// through serde and through [`std::str::FromStr`]; matching is
/// case-sensitive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum ContentFormat {
    Video,
    Audio,
}

impl ContentFormat {
    pub fn container(self) -> Container {
        match self {
            ContentFormat::Video => Container::Mp4,
            ContentFormat::Audio => Container::Mp3,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ContentFormat::Video => "video/mp4",
            ContentFormat::Audio => "audio/mp3",
        }
    }
}

/// MIME type for a raw, not yet validated format string.
pub fn mime_type_for(raw: &str) -> &'static str {
    raw.parse::<ContentFormat>()
        .map(ContentFormat::mime_type)
        .unwrap_or(FALLBACK_MIME_TYPE)
}

/// Target container of the converted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Container {
    Mp4,
    Mp3,
}

impl Container {
    pub fn extension(self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Mp3 => "mp3",
        }
    }

    pub fn is_audio_only(self) -> bool {
        matches!(self, Container::Mp3)
    }
}

/// x264 speed/quality trade-off handed to the conversion tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ConversionPreset {
    VerySlow,
    Slower,
    Slow,
    Medium,
    Fast,
    Faster,
    VeryFast,
    SuperFast,
    #[default]
    UltraFast,
}

/// Everything the video source needs to turn a fetched stream into a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    pub container: Container,
    pub preset: ConversionPreset,
    /// Absolute path to the FFmpeg executable.
    pub ffmpeg_path: PathBuf,
}

/// Metadata of a resolved video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    pub title: String,
    pub author: String,
    /// `None` for live or otherwise open-ended content.
    pub duration: Option<Duration>,
}
