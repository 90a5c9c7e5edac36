//! Render a mix to MP4.

use std::io::Write;
use std::path::PathBuf;

use clipmix_common::config::AppConfig;
use clipmix_common::error::ClipmixError;
use clipmix_render::engine::{EncoderSettings, FfmpegEngine};
use clipmix_render::pipeline::{render_mix, MixJob};
use clipmix_render::progress::{ProgressCallback, RenderProgress};
use clipmix_render::source::ClipSource;

use super::{allocation_notice, mix_settings, random_segment_notices};
use crate::MixArgs;

pub async fn run(config: &AppConfig, mix: MixArgs, output: Option<PathBuf>) -> anyhow::Result<()> {
    let settings = mix_settings(&mix, &config.mix)?;
    let output_path = output.unwrap_or_else(|| config.default_output_path());

    println!("Rendering {} clips", mix.clips.len());
    println!("  {}", allocation_notice(settings.duration, mix.clips.len()));
    println!(
        "  Aspect: {} ({})",
        settings.aspect,
        settings.aspect.resolution()
    );
    println!("  Output: {}", output_path.display());

    let job = MixJob {
        sources: mix.clips.into_iter().map(ClipSource::Path).collect(),
        settings,
        output_path,
        scratch_dir: config.render.scratch_dir.clone(),
        encoder: EncoderSettings::from(&config.render),
    };
    let engine = Box::new(FfmpegEngine::from_config(&config.render));

    let progress_cb: ProgressCallback = Box::new(|p: RenderProgress| {
        print!("\r  Progress: {:>3}% {:<40}", p.percent, p.message);
        std::io::stdout().flush().ok();
    });

    match render_mix(job, engine, Some(progress_cb)).await {
        Ok(outcome) => {
            println!();
            if settings.random_cut_active() {
                for notice in random_segment_notices(&outcome.plan) {
                    println!("  {notice}");
                }
            }
            println!(
                "Mix complete: {} ({:.1}s, rendered in {:.1}s)",
                outcome.output_path.display(),
                outcome.plan.output_duration_secs(),
                outcome.elapsed_secs
            );
            Ok(())
        }
        Err(e) => {
            println!();
            println!("{}", failure_report(&e));
            anyhow::bail!("render failed during the {} stage", e.stage().as_str())
        }
    }
}

/// The verbatim failure message followed by the generic hint.
fn failure_report(err: &ClipmixError) -> String {
    format!("Render failed: {err}\n  Hint: {}", err.user_hint())
}
