pub mod check;
pub mod config;
pub mod plan;
pub mod probe;
pub mod render;

use std::path::Path;

use clipmix_common::config::MixDefaults;
use clipmix_model::aspect::AspectTarget;
use clipmix_model::clip::ClipSpec;
use clipmix_model::plan::RenderPlan;
use clipmix_model::settings::{DurationMode, MixSettings};
use clipmix_planner::timeline::allocate_secs;
use clipmix_render::engine::MediaEngine;
use clipmix_render::source::ClipSource;

use crate::MixArgs;

/// Resolve CLI flags over the configured defaults.
pub fn mix_settings(args: &MixArgs, defaults: &MixDefaults) -> anyhow::Result<MixSettings> {
    let aspect: AspectTarget = args
        .aspect
        .as_deref()
        .unwrap_or(&defaults.aspect)
        .parse()?;

    let duration = if args.keep_original {
        DurationMode::KeepOriginal
    } else {
        match args.target.or(defaults.target_secs) {
            Some(target_secs) => DurationMode::FixedTotal { target_secs },
            None => DurationMode::KeepOriginal,
        }
    };

    let settings = MixSettings {
        aspect,
        duration,
        random_cut: args.random_cut || defaults.random_cut,
        shuffle: args.shuffle || defaults.shuffle,
        crossfade: defaults.crossfade && !args.no_crossfade,
    };
    settings.validate()?;
    tracing::debug!(?settings, "Mix settings resolved");
    Ok(settings)
}

/// One-line preview of how the target is divided.
pub fn allocation_notice(duration: DurationMode, clip_count: usize) -> String {
    match (duration, allocate_secs(duration, clip_count)) {
        (DurationMode::FixedTotal { target_secs }, Some(each)) => format!(
            "Target {target_secs}s across {clip_count} clips: each clip takes ~{each:.1}s"
        ),
        _ => format!("Keeping original lengths of {clip_count} clips"),
    }
}

/// Notices for the segments picked by random cut, numbered by playback
/// position.
pub fn random_segment_notices(plan: &RenderPlan) -> Vec<String> {
    plan.clips
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.random_segment)
        .map(|(position, entry)| {
            format!(
                "Clip {}: random segment {:.1}s-{:.1}s",
                position + 1,
                entry.trim.start,
                entry.trim.end
            )
        })
        .collect()
}

/// Sniff and probe one clip on disk.
pub fn probe_clip(engine: &dyn MediaEngine, path: &Path) -> anyhow::Result<(ClipSpec, bool)> {
    ClipSource::Path(path.to_path_buf()).ensure_mp4()?;
    let info = engine.probe(path)?;
    Ok((info.to_clip_spec()?, info.has_audio))
}
