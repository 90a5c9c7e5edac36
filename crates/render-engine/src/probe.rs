//! Media probing through `ffprobe`.

use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};

use clipmix_common::error::{ClipmixError, ClipmixResult};
use clipmix_model::clip::ClipSpec;

/// What the media engine learned about one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds.
    pub duration_secs: f64,

    /// Display width in pixels (after applying rotation metadata).
    pub width: u32,

    /// Display height in pixels (after applying rotation metadata).
    pub height: u32,

    /// Whether the asset carries an audio stream.
    pub has_audio: bool,

    /// Container names reported by the demuxer.
    pub format_name: String,
}

impl MediaInfo {
    /// Convert into the planner's clip metadata.
    pub fn to_clip_spec(&self) -> ClipmixResult<ClipSpec> {
        ClipSpec::new(self.duration_secs, self.width, self.height)
            .map_err(|e| ClipmixError::decode(e.to_string()))
    }
}

/// Run ffprobe on `path`.
pub fn ffprobe(binary: &str, path: &Path) -> ClipmixResult<MediaInfo> {
    let output = Command::new(binary)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration,format_name:stream=codec_type,width,height,duration:stream_tags=rotate:stream_side_data=rotation",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| ClipmixError::decode(format!("Failed to start {binary}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ClipmixError::decode(format!(
            "{binary} could not read {} (status {}): {}",
            path.display(),
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_ffprobe_json(&stdout)
        .map_err(|e| ClipmixError::decode(format!("{}: {e}", path.display())))
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    #[serde(default)]
    tags: FfprobeTags,
    #[serde(default)]
    side_data_list: Vec<FfprobeSideData>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    rotate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeSideData {
    rotation: Option<f64>,
}

/// Parse the JSON printed by [`ffprobe`].
pub fn parse_ffprobe_json(json: &str) -> ClipmixResult<MediaInfo> {
    let parsed: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| ClipmixError::decode(format!("ffprobe JSON parse error: {e}")))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ClipmixError::decode("no video stream found"))?;

    let (mut width, mut height) = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(ClipmixError::decode("video stream has no frame size")),
    };
    if is_quarter_turn(rotation_degrees(video)) {
        std::mem::swap(&mut width, &mut height);
    }

    let format = parsed.format.as_ref();
    let duration_secs = format
        .and_then(|f| parse_secs(f.duration.as_deref()))
        .or_else(|| parse_secs(video.duration.as_deref()))
        .ok_or_else(|| ClipmixError::decode("duration is unknown"))?;

    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(MediaInfo {
        duration_secs,
        width,
        height,
        has_audio,
        format_name: format
            .and_then(|f| f.format_name.clone())
            .unwrap_or_default(),
    })
}

fn parse_secs(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs > 0.0)
}

fn rotation_degrees(stream: &FfprobeStream) -> f64 {
    stream
        .side_data_list
        .iter()
        .find_map(|sd| sd.rotation)
        .or_else(|| {
            stream
                .tags
                .rotate
                .as_deref()
                .and_then(|r| r.trim().parse::<f64>().ok())
        })
        .unwrap_or(0.0)
}

fn is_quarter_turn(degrees: f64) -> bool {
    let normalized = degrees.rem_euclid(180.0);
    (normalized - 90.0).abs() < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANDSCAPE_WITH_AUDIO: &str = r#"{
        "programs": [],
        "streams": [
            { "codec_type": "video", "width": 1920, "height": 1080, "duration": "9.984000" },
            { "codec_type": "audio", "duration": "10.005333" }
        ],
        "format": { "format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "10.005333" }
    }"#;

    #[test]
    fn test_parse_landscape_with_audio() {
        let info = parse_ffprobe_json(LANDSCAPE_WITH_AUDIO).unwrap();
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert!(info.has_audio);
        assert!((info.duration_secs - 10.005333).abs() < 1e-9);
        assert!(info.format_name.contains("mp4"));

        let spec = info.to_clip_spec().unwrap();
        assert_eq!(spec.width(), 1920);
    }

    #[test]
    fn test_rotated_phone_clip_swaps_dimensions() {
        let json = r#"{
            "streams": [{
                "codec_type": "video", "width": 1920, "height": 1080,
                "side_data_list": [{ "rotation": -90 }]
            }],
            "format": { "duration": "4.2" }
        }"#;
        let info = parse_ffprobe_json(json).unwrap();
        assert_eq!((info.width, info.height), (1080, 1920));
        assert!(!info.has_audio);
    }

    #[test]
    fn test_legacy_rotate_tag() {
        let json = r#"{
            "streams": [{
                "codec_type": "video", "width": 640, "height": 480,
                "tags": { "rotate": "270" }
            }],
            "format": { "duration": "1.0" }
        }"#;
        let info = parse_ffprobe_json(json).unwrap();
        assert_eq!((info.width, info.height), (480, 640));
    }

    #[test]
    fn test_falls_back_to_stream_duration() {
        let json = r#"{
            "streams": [{ "codec_type": "video", "width": 720, "height": 720, "duration": "3.5" }],
            "format": { "format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "N/A" }
        }"#;
        let info = parse_ffprobe_json(json).unwrap();
        assert!((info.duration_secs - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_video_stream_is_a_decode_error() {
        let json = r#"{ "streams": [{ "codec_type": "audio" }], "format": { "duration": "3.0" } }"#;
        let err = parse_ffprobe_json(json).unwrap_err();
        assert!(matches!(err, ClipmixError::Decode { .. }));
    }

    #[test]
    fn test_unknown_duration_is_rejected() {
        let json = r#"{ "streams": [{ "codec_type": "video", "width": 10, "height": 10 }] }"#;
        assert!(parse_ffprobe_json(json).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_ffprobe_json("not json").is_err());
    }
}
