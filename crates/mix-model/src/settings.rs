//! Parameters of one render request.

use serde::{Deserialize, Serialize};

use crate::aspect::AspectTarget;

/// Smallest total duration a mix may request.
pub const MIN_TARGET_SECS: u32 = 5;

/// How clip durations are allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum DurationMode {
    /// Divide `target_secs` evenly across all clips.
    FixedTotal { target_secs: u32 },
    /// Use every clip whole.
    KeepOriginal,
}

impl DurationMode {
    /// The requested total, if any.
    pub fn target_secs(self) -> Option<f64> {
        match self {
            Self::FixedTotal { target_secs } => Some(target_secs as f64),
            Self::KeepOriginal => None,
        }
    }
}

impl Default for DurationMode {
    fn default() -> Self {
        Self::FixedTotal { target_secs: 30 }
    }
}

/// The full, immutable parameter set of one render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MixSettings {
    pub aspect: AspectTarget,
    pub duration: DurationMode,
    /// Pick a random segment of each over-long clip instead of its opening.
    /// Only meaningful with [`DurationMode::FixedTotal`].
    pub random_cut: bool,
    pub shuffle: bool,
    pub crossfade: bool,
}

impl Default for MixSettings {
    fn default() -> Self {
        Self {
            aspect: AspectTarget::default(),
            duration: DurationMode::default(),
            random_cut: false,
            shuffle: false,
            crossfade: true,
        }
    }
}

/// Settings that cannot be planned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("target duration must be at least {MIN_TARGET_SECS} seconds (got {0})")]
    TargetTooShort(u32),
}

impl MixSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let DurationMode::FixedTotal { target_secs } = self.duration {
            if target_secs < MIN_TARGET_SECS {
                return Err(SettingsError::TargetTooShort(target_secs));
            }
        }
        Ok(())
    }

    /// Whether random cutting actually takes effect.
    pub fn random_cut_active(&self) -> bool {
        self.random_cut && matches!(self.duration, DurationMode::FixedTotal { .. })
    }
}
