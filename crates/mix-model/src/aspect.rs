//! Output aspect classes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Target aspect class of the rendered mix.
///
/// Each class renders at a fixed resolution regardless of the source, so
/// every clip in a mix ends up with identical dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AspectTarget {
    /// 9:16 vertical (Shorts, Reels, TikTok).
    #[default]
    Portrait9x16,
    /// 16:9 widescreen.
    Landscape16x9,
    /// 1:1 square.
    Square1x1,
}

impl AspectTarget {
    /// Fixed output resolution for this class.
    pub fn resolution(self) -> Resolution {
        match self {
            Self::Portrait9x16 => Resolution::new(720, 1280),
            Self::Landscape16x9 => Resolution::new(1280, 720),
            Self::Square1x1 => Resolution::new(720, 720),
        }
    }

    /// Ratio as an exact `(numerator, denominator)` pair (width over height).
    pub fn ratio_parts(self) -> (u32, u32) {
        match self {
            Self::Portrait9x16 => (9, 16),
            Self::Landscape16x9 => (16, 9),
            Self::Square1x1 => (1, 1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Portrait9x16 => "9:16",
            Self::Landscape16x9 => "16:9",
            Self::Square1x1 => "1:1",
        }
    }
}

impl fmt::Display for AspectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an aspect string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown aspect ratio: {0}. Use: 9:16, 16:9, 1:1")]
pub struct ParseAspectError(pub String);

impl FromStr for AspectTarget {
    type Err = ParseAspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "9:16" | "9x16" | "portrait" | "vertical" => Ok(Self::Portrait9x16),
            "16:9" | "16x9" | "landscape" | "horizontal" => Ok(Self::Landscape16x9),
            "1:1" | "1x1" | "square" => Ok(Self::Square1x1),
            _ => Err(ParseAspectError(s.to_string())),
        }
    }
}

impl TryFrom<String> for AspectTarget {
    type Error = ParseAspectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AspectTarget> for String {
    fn from(value: AspectTarget) -> Self {
        value.as_str().to_string()
    }
}
