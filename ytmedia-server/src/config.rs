//! Server configuration, loaded from environment variables at startup.
//!
//! The FFmpeg path is the exception: it is not part of [`Config`] but read
//! through [`EnvConversionSettings`] on every download, so a missing value
//! fails requests rather than startup.

use std::path::PathBuf;

use ytmedia_core::ConversionSettings;

/// Environment variable holding the absolute path to the FFmpeg executable.
pub const FFMPEG_PATH_VAR: &str = "YTMEDIA_FFMPEG_PATH";

/// Runtime configuration for ytmedia-server.
///
/// Every field has a default so the server starts without any environment
/// variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:5000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Serve Swagger UI and the OpenAPI document (default: `true`).
    pub enable_swagger: bool,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// yt-dlp executable, looked up on `PATH` unless absolute.
    pub ytdlp_path: PathBuf,

    /// Directory for temporary media files (default: the system temp dir).
    pub work_dir: PathBuf,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };

        Self {
            bind_address: env_or("YTMEDIA_BIND", "0.0.0.0:5000"),
            log_level: env_or("YTMEDIA_LOG", "info"),
            log_json: flag("YTMEDIA_LOG_JSON", false),
            enable_swagger: flag("YTMEDIA_ENABLE_SWAGGER", true),
            cors_allowed_origins: lookup("YTMEDIA_CORS_ORIGINS").filter(|v| !v.trim().is_empty()),
            ytdlp_path: PathBuf::from(env_or("YTMEDIA_YTDLP_PATH", "yt-dlp")),
            work_dir: lookup("YTMEDIA_WORK_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
        }
    }
}

/// Reads the FFmpeg path from the process environment on every call.
#[derive(Debug, Clone)]
pub struct EnvConversionSettings {
    key: String,
}

impl EnvConversionSettings {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Default for EnvConversionSettings {
    fn default() -> Self {
        Self::new(FFMPEG_PATH_VAR)
    }
}

impl ConversionSettings for EnvConversionSettings {
    fn ffmpeg_path(&self) -> Option<String> {
        std::env::var(&self.key).ok()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_address, "0.0.0.0:5000");
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.log_json);
        assert!(cfg.enable_swagger);
        assert!(cfg.cors_allowed_origins.is_none());
        assert_eq!(cfg.ytdlp_path, PathBuf::from("yt-dlp"));
        assert_eq!(cfg.work_dir, std::env::temp_dir());
    }

    #[test]
    fn reads_overrides() {
        let cfg = config(&[
            ("YTMEDIA_BIND", "127.0.0.1:8080"),
            ("YTMEDIA_LOG_JSON", "TRUE"),
            ("YTMEDIA_ENABLE_SWAGGER", "false"),
            ("YTMEDIA_CORS_ORIGINS", "https://a.example"),
            ("YTMEDIA_YTDLP_PATH", "/usr/local/bin/yt-dlp"),
            ("YTMEDIA_WORK_DIR", "/var/tmp/ytmedia"),
        ]);
        assert_eq!(cfg.bind_address, "127.0.0.1:8080");
        assert!(cfg.log_json);
        assert!(!cfg.enable_swagger);
        assert_eq!(cfg.cors_allowed_origins.as_deref(), Some("https://a.example"));
        assert_eq!(cfg.ytdlp_path, PathBuf::from("/usr/local/bin/yt-dlp"));
        assert_eq!(cfg.work_dir, PathBuf::from("/var/tmp/ytmedia"));
    }

    #[test]
    fn blank_values_fall_back() {
        let cfg = config(&[("YTMEDIA_CORS_ORIGINS", " "), ("YTMEDIA_WORK_DIR", "")]);
        assert!(cfg.cors_allowed_origins.is_none());
        assert_eq!(cfg.work_dir, std::env::temp_dir());
    }

    #[test]
    fn ffmpeg_path_is_read_live() {
        let unset = EnvConversionSettings::new("YTMEDIA_TEST_SURELY_UNSET_VARIABLE");
        assert_eq!(unset.ffmpeg_path(), None);

        let set = EnvConversionSettings::new("PATH");
        assert_eq!(set.ffmpeg_path(), std::env::var("PATH").ok());
    }
}
