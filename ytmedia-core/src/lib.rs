//! Core of ytmedia: what to download, where it comes from and how it
//! becomes a file.

mod error;
mod orchestrator;
mod types;

pub mod services;
pub mod source;

pub use error::{ConversionError, CoreError, SourceError};
pub use orchestrator::{ConversionSettings, DownloadOrchestrator, DownloadResult, TempMedia};
pub use types::{
    Container, ContentFormat, ConversionOptions, ConversionPreset, FALLBACK_MIME_TYPE,
    VideoMetadata, mime_type_for,
};
