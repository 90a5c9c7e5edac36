//! Timeline assembly.
//!
//! Decides the playback order, the trim window of every clip, which
//! boundaries crossfade, and whether the assembled mix needs a trailing
//! correction trim.

use rand::seq::SliceRandom;
use rand::Rng;

use clipmix_common::error::ClipmixError;
use clipmix_model::clip::ClipSpec;
use clipmix_model::plan::{
    PlannedClip, RenderPlan, TrimPlan, CROSSFADE_MIN_CLIP_SECS, CROSSFADE_SECS,
    OVERSHOOT_TOLERANCE_SECS,
};
use clipmix_model::settings::{DurationMode, MixSettings, SettingsError};

use crate::geometry::plan_clip_crop;

/// Reasons a timeline cannot be planned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("No valid clips to process")]
    NoClips,

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl From<PlanError> for ClipmixError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::NoClips => ClipmixError::invalid_input(err.to_string()),
            PlanError::Settings(inner) => ClipmixError::config(inner.to_string()),
        }
    }
}

/// Plan a mix using the thread-local random source.
///
/// Shuffled orders and random cuts are not reproducible across runs; use
/// [`plan_timeline_with_rng`] with a seeded generator when they must be.
pub fn plan_timeline(clips: &[ClipSpec], settings: &MixSettings) -> Result<RenderPlan, PlanError> {
    plan_timeline_with_rng(clips, settings, &mut rand::thread_rng())
}

/// Plan a mix, drawing shuffle order and random cut offsets from `rng`.
///
/// `clips` is in upload order; every [`PlannedClip::source_index`] of the
/// result refers back into it.
pub fn plan_timeline_with_rng<R: Rng + ?Sized>(
    clips: &[ClipSpec],
    settings: &MixSettings,
    rng: &mut R,
) -> Result<RenderPlan, PlanError> {
    settings.validate()?;
    if clips.is_empty() {
        return Err(PlanError::NoClips);
    }

    let mut order: Vec<usize> = (0..clips.len()).collect();
    if settings.shuffle {
        order.shuffle(rng);
    }

    let allocated = allocate_secs(settings.duration, clips.len());
    let random_cut = settings.random_cut_active();
    let mut entries = Vec::with_capacity(clips.len());
    let mut cursor = 0.0f64;

    for (position, &source_index) in order.iter().enumerate() {
        let clip = clips[source_index];
        let (trim, random_segment) = match allocated {
            Some(allocated) => (
                plan_trim(&clip, allocated, random_cut, rng),
                random_cut && clip.duration_secs() > allocated,
            ),
            None => (TrimPlan::full(clip.duration_secs()), false),
        };

        if random_segment {
            tracing::info!(
                clip = position + 1,
                start_secs = trim.start,
                end_secs = trim.end,
                "Random segment selected"
            );
        }

        let crossfade_in = crossfade_applies(settings.crossfade, position, &trim);
        let timeline_start = if crossfade_in {
            cursor - CROSSFADE_SECS
        } else {
            cursor
        };

        let (crop, output) = plan_clip_crop(&clip, settings.aspect);
        let entry = PlannedClip {
            source_index,
            clip,
            crop,
            output,
            trim,
            random_segment,
            crossfade_in,
            timeline_start,
        };
        cursor = entry.timeline_end();
        entries.push(entry);
    }

    let assembled_secs = assembled_duration(&entries);
    let final_trim_secs = trailing_trim(assembled_secs, settings.duration);

    let plan = RenderPlan {
        clips: entries,
        aspect: settings.aspect,
        output: settings.aspect.resolution(),
        allocated_secs: allocated,
        assembled_secs,
        final_trim_secs,
    };

    tracing::info!(
        clips = plan.len(),
        shuffled = settings.shuffle,
        allocated_secs = ?allocated,
        crossfades = plan.crossfade_boundaries(),
        trimmed_secs = plan.trimmed_sum_secs(),
        assembled_secs,
        output_secs = plan.output_duration_secs(),
        "Timeline planned"
    );

    Ok(plan)
}

/// Per-clip duration budget: the target split evenly across `clip_count`
/// clips, or `None` when original lengths are kept.
pub fn allocate_secs(mode: DurationMode, clip_count: usize) -> Option<f64> {
    if clip_count == 0 {
        return None;
    }
    mode.target_secs().map(|target| target / clip_count as f64)
}

/// Trim window of one clip under an allocation.
///
/// Clips no longer than their allocation are used whole, which leaves the
/// mix shorter than requested. Longer clips keep either their opening
/// `allocated` seconds or, with `random_cut`, a uniformly placed window of
/// that length.
pub fn plan_trim<R: Rng + ?Sized>(
    clip: &ClipSpec,
    allocated: f64,
    random_cut: bool,
    rng: &mut R,
) -> TrimPlan {
    let duration = clip.duration_secs();
    if duration <= allocated {
        return TrimPlan::full(duration);
    }
    if !random_cut {
        return TrimPlan::new(0.0, allocated);
    }

    let max_start = duration - allocated;
    let start = rng.gen_range(0.0..=max_start);
    TrimPlan::new(start, (start + allocated).min(duration))
}

/// Whether the clip at `position` (in final order) crossfades in.
pub fn crossfade_applies(crossfade: bool, position: usize, trim: &TrimPlan) -> bool {
    crossfade && position > 0 && trim.duration() > CROSSFADE_MIN_CLIP_SECS
}

/// Length of the assembled timeline: trimmed durations minus one overlap per
/// crossfade boundary.
pub fn assembled_duration(entries: &[PlannedClip]) -> f64 {
    let trimmed: f64 = entries.iter().map(PlannedClip::duration).sum();
    let crossfades = entries.iter().filter(|e| e.crossfade_in).count();
    trimmed - CROSSFADE_SECS * crossfades as f64
}

/// Correction trim for an assembled mix: when a total was requested and the
/// mix overshoots it by more than the tolerance, cut it to exactly the total.
pub fn trailing_trim(assembled_secs: f64, mode: DurationMode) -> Option<f64> {
    let target = mode.target_secs()?;
    (assembled_secs > target + OVERSHOOT_TOLERANCE_SECS).then_some(target)
}
