//! Print the render plan without rendering.

use clipmix_common::config::AppConfig;
use clipmix_planner::{plan_timeline, plan_timeline_with_rng};
use clipmix_render::engine::{command_exists, FfmpegEngine};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{allocation_notice, mix_settings, probe_clip, random_segment_notices};
use crate::MixArgs;

pub fn run(config: &AppConfig, mix: MixArgs, seed: Option<u64>) -> anyhow::Result<()> {
    let settings = mix_settings(&mix, &config.mix)?;
    if !command_exists(&config.render.ffprobe) {
        anyhow::bail!("{} not found; run `clipmix check`", config.render.ffprobe);
    }

    let engine = FfmpegEngine::from_config(&config.render);
    let mut clips = Vec::with_capacity(mix.clips.len());
    for path in &mix.clips {
        let (clip, _) = probe_clip(&engine, path)
            .map_err(|e| anyhow::anyhow!("Failed to probe {}: {e}", path.display()))?;
        clips.push(clip);
    }

    let plan = match seed {
        Some(seed) => plan_timeline_with_rng(&clips, &settings, &mut StdRng::seed_from_u64(seed))?,
        None => plan_timeline(&clips, &settings)?,
    };

    // Notices go to stderr so stdout stays valid JSON.
    eprintln!("{}", allocation_notice(settings.duration, clips.len()));
    if settings.random_cut_active() {
        for notice in random_segment_notices(&plan) {
            eprintln!("{notice}");
        }
    }

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
