//! Probed clip metadata.

use serde::{Deserialize, Serialize};

/// Metadata of one uploaded asset, as reported by the media engine.
///
/// Immutable once constructed. [`ClipSpec::new`] is the only way to build
/// one, so a `ClipSpec` always has a positive duration and non-zero frame
/// dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClipSpec {
    duration_secs: f64,
    width: u32,
    height: u32,
}

/// Reasons a clip's metadata is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClipError {
    #[error("clip duration must be a positive number of seconds (got {0})")]
    InvalidDuration(f64),

    #[error("clip frame size must be non-zero (got {width}x{height})")]
    InvalidDimensions { width: u32, height: u32 },
}

impl ClipSpec {
    pub fn new(duration_secs: f64, width: u32, height: u32) -> Result<Self, ClipError> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(ClipError::InvalidDuration(duration_secs));
        }
        if width == 0 || height == 0 {
            return Err(ClipError::InvalidDimensions { width, height });
        }
        Ok(Self {
            duration_secs,
            width,
            height,
        })
    }

    /// Source duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Source frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Source frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

#[derive(Deserialize)]
struct RawClipSpec {
    duration_secs: f64,
    width: u32,
    height: u32,
}

impl<'de> Deserialize<'de> for ClipSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawClipSpec::deserialize(deserializer)?;
        ClipSpec::new(raw.duration_secs, raw.width, raw.height).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_clip() {
        let clip = ClipSpec::new(12.5, 1920, 1080).unwrap();
        assert_eq!(clip.width(), 1920);
        assert_eq!(clip.height(), 1080);
        assert!((clip.duration_secs() - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_duration() {
        assert_eq!(
            ClipSpec::new(0.0, 10, 10),
            Err(ClipError::InvalidDuration(0.0))
        );
        assert!(ClipSpec::new(-1.0, 10, 10).is_err());
        assert!(ClipSpec::new(f64::NAN, 10, 10).is_err());
        assert!(ClipSpec::new(f64::INFINITY, 10, 10).is_err());
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        assert_eq!(
            ClipSpec::new(1.0, 0, 1080),
            Err(ClipError::InvalidDimensions {
                width: 0,
                height: 1080
            })
        );
        assert!(ClipSpec::new(1.0, 1920, 0).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: ClipSpec =
            serde_json::from_str(r#"{"duration_secs":3.0,"width":640,"height":480}"#).unwrap();
        assert_eq!(ok.width(), 640);

        let bad = serde_json::from_str::<ClipSpec>(r#"{"duration_secs":3.0,"width":0,"height":480}"#);
        assert!(bad.is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_valid_metadata_is_accepted(
            duration in 0.001f64..10_000.0,
            width in 1u32..8192,
            height in 1u32..8192,
        ) {
            let clip = ClipSpec::new(duration, width, height).unwrap();
            proptest::prop_assert_eq!(clip.width(), width);
            proptest::prop_assert_eq!(clip.height(), height);
        }
    }
}
