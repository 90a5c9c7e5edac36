//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory where rendered mixes are written.
    pub output_dir: PathBuf,

    /// Media engine and encoder settings.
    pub render: RenderDefaults,

    /// Default mix parameters used when the CLI flags leave them unset.
    pub mix: MixDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Encoder and media-engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// ffmpeg binary (name on PATH or absolute path).
    pub ffmpeg: String,

    /// ffprobe binary (name on PATH or absolute path).
    pub ffprobe: String,

    /// Output frame rate.
    pub fps: u32,

    /// Video encoder passed to `-c:v`.
    pub video_codec: String,

    /// Encoder preset.
    pub preset: String,

    /// Encoder thread count.
    pub threads: u32,

    /// Audio encoder passed to `-c:a`.
    pub audio_codec: String,

    /// Audio bitrate in kbps.
    pub audio_bitrate_kbps: u32,

    /// File name used for the rendered mix inside `output_dir`.
    pub output_name: String,

    /// Where scratch copies of uploads live (system temp dir when unset).
    pub scratch_dir: Option<PathBuf>,
}

/// Default mix parameters.
///
/// Kept as plain values so this crate stays independent of the model types;
/// the CLI converts them into `MixSettings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MixDefaults {
    /// Aspect ratio ("9:16", "16:9" or "1:1").
    pub aspect: String,

    /// Requested total duration in seconds; `None` keeps original lengths.
    pub target_secs: Option<u32>,

    /// Pick a random segment instead of each clip's opening.
    pub random_cut: bool,

    /// Shuffle playback order.
    pub shuffle: bool,

    /// Crossfade between clips.
    pub crossfade: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "clipmix_render=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            render: RenderDefaults::default(),
            mix: MixDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            fps: 24,
            video_codec: "libx264".to_string(),
            preset: "ultrafast".to_string(),
            threads: 4,
            audio_codec: "aac".to_string(),
            audio_bitrate_kbps: 192,
            output_name: "smart_cut_video.mp4".to_string(),
            scratch_dir: None,
        }
    }
}

impl Default for MixDefaults {
    fn default() -> Self {
        Self {
            aspect: "9:16".to_string(),
            target_secs: Some(30),
            random_cut: false,
            shuffle: false,
            crossfade: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }

    /// Where the rendered mix lands when no explicit output path is given.
    pub fn default_output_path(&self) -> PathBuf {
        self.output_dir.join(&self.render.output_name)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("clipmix").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_encoder_settings() {
        let config = AppConfig::default();
        assert_eq!(config.render.fps, 24);
        assert_eq!(config.render.video_codec, "libx264");
        assert_eq!(config.render.audio_codec, "aac");
        assert_eq!(config.render.preset, "ultrafast");
        assert_eq!(config.render.threads, 4);
        assert_eq!(
            config.default_output_path(),
            PathBuf::from(".").join("smart_cut_video.mp4")
        );
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{ "render": { "preset": "veryfast" }, "mix": { "target_secs": null } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.render.preset, "veryfast");
        assert_eq!(config.render.fps, 24);
        assert_eq!(config.mix.target_secs, None);
        assert!(config.mix.crossfade);
        assert_eq!(config.logging.level, "info");
    }
}
