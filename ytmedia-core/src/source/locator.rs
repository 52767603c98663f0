//! Content locator normalisation.
//!
//! Callers may pass a full YouTube URL in any of its common shapes or a bare
//! video ID. Everything handed to the extractor goes through [`VideoId`], so
//! arbitrary URLs and option-looking strings never reach the subprocess.

use std::fmt;
use std::str::FromStr;

use url::Url;

const ID_LEN: usize = 11;

/// An 11-character YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a YouTube video locator: {0}")]
pub struct InvalidLocator(pub String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }

    fn is_valid(candidate: &str) -> bool {
        candidate.len() == ID_LEN
            && candidate
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }

    fn from_url(url: &Url) -> Option<String> {
        let host = url.host_str()?.to_ascii_lowercase();
        let host = ["www.", "m.", "music."]
            .iter()
            .find_map(|prefix| host.strip_prefix(prefix))
            .unwrap_or(&host)
            .to_owned();

        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        match host.as_str() {
            "youtu.be" => segments.next().map(str::to_owned),
            "youtube.com" | "youtube-nocookie.com" => match segments.next()? {
                "watch" => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                "embed" | "shorts" | "live" | "v" => segments.next().map(str::to_owned),
                _ => None,
            },
            _ => None,
        }
    }
}

impl FromStr for VideoId {
    type Err = InvalidLocator;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if Self::is_valid(trimmed) {
            return Ok(Self(trimmed.to_owned()));
        }

        let url = Url::parse(trimmed)
            .ok()
            .filter(|u| u.has_host())
            .or_else(|| Url::parse(&format!("https://{trimmed}")).ok());

        url.as_ref()
            .and_then(Self::from_url)
            .filter(|id| Self::is_valid(id))
            .map(Self)
            .ok_or_else(|| InvalidLocator(raw.to_owned()))
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
