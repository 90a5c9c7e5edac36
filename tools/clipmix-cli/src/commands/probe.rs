//! Show clip metadata.

use std::path::PathBuf;

use clipmix_common::config::AppConfig;
use clipmix_render::engine::FfmpegEngine;

use super::probe_clip;

pub fn run(config: &AppConfig, clips: Vec<PathBuf>) -> anyhow::Result<()> {
    let engine = FfmpegEngine::from_config(&config.render);
    let mut failed = 0usize;

    for path in &clips {
        match probe_clip(&engine, path) {
            Ok((clip, has_audio)) => println!(
                "[OK]   {}: {:.2}s, {}x{}, audio: {}",
                path.display(),
                clip.duration_secs(),
                clip.width(),
                clip.height(),
                if has_audio { "yes" } else { "no" }
            ),
            Err(e) => {
                failed += 1;
                println!("[FAIL] {}: {e}", path.display());
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} clips could not be read", clips.len());
    }
    Ok(())
}
