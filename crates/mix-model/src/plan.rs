//! Render plan types.
//!
//! A [`RenderPlan`] is what the planner hands to the media engine: the final
//! playback order, and for each entry the crop, the trim window, and whether
//! it fades in from the previous clip.

use serde::{Deserialize, Serialize};

use crate::aspect::{AspectTarget, Resolution};
use crate::clip::ClipSpec;
use crate::crop::CropRect;

/// Length of a crossfade transition in seconds.
pub const CROSSFADE_SECS: f64 = 0.5;

/// An incoming clip must be strictly longer than this to receive a crossfade.
pub const CROSSFADE_MIN_CLIP_SECS: f64 = 0.6;

/// How far the assembled mix may overshoot the target before it is cut back.
pub const OVERSHOOT_TOLERANCE_SECS: f64 = 3.0;

/// Output frame rate of every mix.
pub const OUTPUT_FPS: u32 = 24;

/// Time window taken from one source clip, in source seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimPlan {
    pub start: f64,
    pub end: f64,
}

impl TrimPlan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// The whole clip.
    pub fn full(duration_secs: f64) -> Self {
        Self::new(0.0, duration_secs)
    }

    /// Trimmed length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether this window is non-empty and inside `[0, source_duration]`.
    pub fn is_within(&self, source_duration: f64) -> bool {
        self.start >= 0.0 && self.end > self.start && self.end <= source_duration + 1e-9
    }
}

/// One entry of the render plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedClip {
    /// Index of the asset in the original upload order.
    pub source_index: usize,

    /// Probed source metadata.
    pub clip: ClipSpec,

    /// Region of the source frame to keep.
    pub crop: CropRect,

    /// Size the cropped region is scaled to.
    pub output: Resolution,

    /// Window of the source to keep.
    pub trim: TrimPlan,

    /// Whether `trim` was drawn at random rather than taken from the opening.
    pub random_segment: bool,

    /// Whether this clip crossfades in from the previous one.
    pub crossfade_in: bool,

    /// Where this clip starts in the assembled output, in seconds.
    ///
    /// Negative when the clip crossfades into a timeline shorter than
    /// [`CROSSFADE_SECS`]; the part before zero is never shown.
    pub timeline_start: f64,
}

impl PlannedClip {
    /// Trimmed length of this entry.
    pub fn duration(&self) -> f64 {
        self.trim.duration()
    }

    /// Where this clip ends in the assembled output.
    pub fn timeline_end(&self) -> f64 {
        self.timeline_start + self.duration()
    }

    /// Seconds of this clip's opening that fall before the timeline start.
    pub fn hidden_lead_secs(&self) -> f64 {
        (-self.timeline_start).max(0.0)
    }

    /// Length of the blend with the previous clip: the full transition,
    /// shortened by any hidden lead. Zero on hard cuts.
    pub fn blend_secs(&self) -> f64 {
        if self.crossfade_in {
            CROSSFADE_SECS - self.hidden_lead_secs()
        } else {
            0.0
        }
    }
}

/// The ordered render plan of one mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    /// Entries in final playback order.
    pub clips: Vec<PlannedClip>,

    /// Aspect class of the mix.
    pub aspect: AspectTarget,

    /// Output resolution shared by every entry.
    pub output: Resolution,

    /// Per-clip duration budget, when a total was requested.
    pub allocated_secs: Option<f64>,

    /// Duration of the assembled timeline before any correction trim.
    pub assembled_secs: f64,

    /// When set, the assembled output is cut to exactly this many seconds.
    pub final_trim_secs: Option<f64>,
}

impl RenderPlan {
    /// Number of clip boundaries that carry a crossfade.
    pub fn crossfade_boundaries(&self) -> usize {
        self.clips.iter().filter(|c| c.crossfade_in).count()
    }

    /// Sum of all trimmed clip durations.
    pub fn trimmed_sum_secs(&self) -> f64 {
        self.clips.iter().map(PlannedClip::duration).sum()
    }

    /// Duration of the delivered file.
    pub fn output_duration_secs(&self) -> f64 {
        self.final_trim_secs.unwrap_or(self.assembled_secs)
    }

    /// Total encoded frames at [`OUTPUT_FPS`].
    pub fn total_frames(&self) -> u64 {
        (self.output_duration_secs() * OUTPUT_FPS as f64).ceil() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }
}
