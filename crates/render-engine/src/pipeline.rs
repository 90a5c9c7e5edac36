//! One mix render, end to end.

use std::path::{Path, PathBuf};

use clipmix_common::error::{ClipmixError, ClipmixResult};
use clipmix_model::clip::ClipSpec;
use clipmix_model::plan::RenderPlan;
use clipmix_model::settings::MixSettings;
use clipmix_planner::{plan_timeline, PlanError};

use crate::engine::{EncodeProgress, EncoderSettings, MediaEngine, RenderRequest};
use crate::progress::{ProgressCallback, ProgressReporter, RenderStage, PREPARE_SHARE};
use crate::scratch::ScratchSpace;
use crate::source::ClipSource;

/// A mix render ready to run.
#[derive(Debug, Clone)]
pub struct MixJob {
    /// Uploaded assets in upload order.
    pub sources: Vec<ClipSource>,

    pub settings: MixSettings,

    /// Output file path.
    pub output_path: PathBuf,

    /// Directory for scratch copies of uploads (system temp dir when `None`).
    pub scratch_dir: Option<PathBuf>,

    pub encoder: EncoderSettings,
}

/// A finished render.
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    pub output_path: PathBuf,
    pub plan: RenderPlan,
    pub elapsed_secs: f64,
}

/// Render the mix described by `job`.
///
/// This is the main entry point for rendering. The blocking pipeline runs on
/// tokio's blocking pool.
pub async fn render_mix(
    job: MixJob,
    mut engine: Box<dyn MediaEngine>,
    progress: Option<ProgressCallback>,
) -> ClipmixResult<RenderOutcome> {
    tokio::task::spawn_blocking(move || run_pipeline(&job, engine.as_mut(), progress))
        .await
        .map_err(|e| ClipmixError::Other(anyhow::anyhow!("Render task failed: {e}")))?
}

/// Blocking variant of [`render_mix`].
pub fn run_pipeline(
    job: &MixJob,
    engine: &mut dyn MediaEngine,
    progress: Option<ProgressCallback>,
) -> ClipmixResult<RenderOutcome> {
    let started = std::time::Instant::now();
    let reporter = ProgressReporter::new(progress);

    tracing::info!(
        clips = job.sources.len(),
        output = %job.output_path.display(),
        aspect = %job.settings.aspect,
        "Starting mix render"
    );

    if job.sources.is_empty() {
        return Err(PlanError::NoClips.into());
    }
    job.settings.validate().map_err(PlanError::from)?;

    if !engine.is_available() {
        return Err(ClipmixError::unsupported(format!(
            "Media engine {} is not available (expected ffmpeg and ffprobe in PATH)",
            engine.name()
        )));
    }
    tracing::info!(engine = engine.name(), "Using media engine");

    // Reject every non-MP4 before any bytes hit the disk.
    for source in &job.sources {
        source.ensure_mp4()?;
    }

    reporter.report(0, RenderStage::Preparing, "Preparing clips");

    let mut scratch = ScratchSpace::new(job.scratch_dir.clone());
    let result = render_staged(job, engine, &reporter, &mut scratch);
    let staged = scratch.len();
    let released = scratch.release();
    tracing::debug!(staged, released, "Released scratch files");

    match result {
        Ok(plan) => {
            reporter.report(100, RenderStage::Complete, "Mix ready");
            let elapsed_secs = started.elapsed().as_secs_f64();
            tracing::info!(
                elapsed_secs,
                output = %job.output_path.display(),
                "Mix render finished"
            );
            Ok(RenderOutcome {
                output_path: job.output_path.clone(),
                plan,
                elapsed_secs,
            })
        }
        Err(err) => {
            tracing::error!(
                error = %err,
                stage = err.stage().as_str(),
                "Mix render failed"
            );
            Err(err)
        }
    }
}

fn render_staged(
    job: &MixJob,
    engine: &mut dyn MediaEngine,
    reporter: &ProgressReporter,
    scratch: &mut ScratchSpace,
) -> ClipmixResult<RenderPlan> {
    let total = job.sources.len();
    let mut inputs = Vec::with_capacity(total);
    let mut has_audio = Vec::with_capacity(total);
    let mut clips = Vec::with_capacity(total);

    for (index, source) in job.sources.iter().enumerate() {
        let path = match source {
            ClipSource::Path(path) => path.clone(),
            ClipSource::Upload { bytes, .. } => scratch.stage_bytes(bytes)?,
        };
        let (clip, audio) = probe_clip(engine, source, &path)?;
        tracing::debug!(
            index,
            source = %source.label(),
            duration_secs = clip.duration_secs(),
            width = clip.width(),
            height = clip.height(),
            has_audio = audio,
            "Clip ready"
        );

        inputs.push(path);
        has_audio.push(audio);
        clips.push(clip);

        reporter.report_span(
            0,
            PREPARE_SHARE,
            (index + 1) as f64 / total as f64,
            RenderStage::Probing,
            format!("Preparing clip {}/{}", index + 1, total),
        );
    }

    let plan = plan_timeline(&clips, &job.settings)?;
    reporter.report(PREPARE_SHARE, RenderStage::Planning, "Timeline planned");

    let parent = job
        .output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    // The engine writes a sibling temp file; it only takes the delivery name
    // once the render succeeded, and is removed on drop otherwise.
    let staged_output = tempfile::Builder::new()
        .prefix(".clipmix-")
        .suffix(".mp4")
        .tempfile_in(parent)?;

    let request = RenderRequest {
        inputs,
        has_audio,
        plan,
        output_path: staged_output.path().to_path_buf(),
        encoder: job.encoder.clone(),
    };

    // The last percent is held back until the output is confirmed.
    engine.render(&request, &|encode| {
        reporter.report_span(
            PREPARE_SHARE,
            99,
            encode.fraction,
            RenderStage::Rendering,
            rendering_message(&encode),
        );
    })?;
    reporter.report(99, RenderStage::Finalizing, "Finalizing output");

    staged_output
        .persist(&job.output_path)
        .map_err(|e| ClipmixError::from(e.error))?;

    Ok(request.plan)
}

fn rendering_message(encode: &EncodeProgress) -> String {
    let frames = format!(
        "Rendering frame {}/{}",
        encode.frames_rendered, encode.total_frames
    );
    if encode.eta_secs >= 1.0 {
        format!("{frames} (~{:.0}s left)", encode.eta_secs)
    } else {
        frames
    }
}

fn probe_clip(
    engine: &dyn MediaEngine,
    source: &ClipSource,
    path: &Path,
) -> ClipmixResult<(ClipSpec, bool)> {
    let info = engine
        .probe(path)
        .map_err(|e| with_source_label(e, source))?;
    let clip = info
        .to_clip_spec()
        .map_err(|e| with_source_label(e, source))?;
    Ok((clip, info.has_audio))
}

fn with_source_label(err: ClipmixError, source: &ClipSource) -> ClipmixError {
    match err {
        ClipmixError::Decode { message } => {
            ClipmixError::decode(format!("{}: {message}", source.label()))
        }
        other => other,
    }
}
