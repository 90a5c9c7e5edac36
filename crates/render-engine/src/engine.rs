//! Media engine contract and the ffmpeg implementation.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use clipmix_common::config::RenderDefaults;
use clipmix_common::error::{ClipmixError, ClipmixResult};
use clipmix_model::plan::{RenderPlan, OUTPUT_FPS};

use crate::graph::build_ffmpeg_args;
use crate::probe::{ffprobe, MediaInfo};

/// Encode progress reported by a [`MediaEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeProgress {
    /// Fraction of the output written, `[0.0, 1.0]`.
    pub fraction: f64,

    /// Frames rendered so far.
    pub frames_rendered: u64,

    /// Total frames to render.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,
}

/// Encoder parameters for the delivered MP4.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderSettings {
    pub fps: u32,
    pub video_codec: String,
    pub preset: String,
    pub threads: u32,
    pub audio_codec: String,
    pub audio_bitrate_kbps: u32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self::from(&RenderDefaults::default())
    }
}

impl From<&RenderDefaults> for EncoderSettings {
    fn from(defaults: &RenderDefaults) -> Self {
        Self {
            fps: defaults.fps.max(1),
            video_codec: defaults.video_codec.clone(),
            preset: defaults.preset.clone(),
            threads: defaults.threads.max(1),
            audio_codec: defaults.audio_codec.clone(),
            audio_bitrate_kbps: defaults.audio_bitrate_kbps,
        }
    }
}

impl EncoderSettings {
    /// Codec arguments placed after the stream maps.
    pub fn codec_args(&self) -> Vec<String> {
        vec![
            "-c:v".to_string(),
            self.video_codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-threads".to_string(),
            self.threads.to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            format!("{}k", self.audio_bitrate_kbps.max(64)),
            "-movflags".to_string(),
            "+faststart".to_string(),
        ]
    }
}

/// Everything the engine needs to render one plan.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Readable media files, indexed by `PlannedClip::source_index`.
    pub inputs: Vec<PathBuf>,

    /// Whether each input carries audio, same indexing as `inputs`.
    pub has_audio: Vec<bool>,

    pub plan: RenderPlan,

    pub output_path: PathBuf,

    pub encoder: EncoderSettings,
}

impl RenderRequest {
    /// Frames expected in the output at the configured frame rate.
    pub fn total_frames(&self) -> u64 {
        if self.encoder.fps == OUTPUT_FPS {
            return self.plan.total_frames();
        }
        (self.plan.output_duration_secs() * self.encoder.fps as f64).ceil() as u64
    }
}

/// Trait for media engines (ffmpeg, test doubles, ...).
pub trait MediaEngine: Send {
    /// Engine name.
    fn name(&self) -> &str;

    /// Check if this engine is usable on the system.
    fn is_available(&self) -> bool;

    /// Decode metadata of one asset.
    fn probe(&self, path: &Path) -> ClipmixResult<MediaInfo>;

    /// Crop, resize, trim, join and encode the plan into `request.output_path`.
    fn render(
        &mut self,
        request: &RenderRequest,
        progress: &dyn Fn(EncodeProgress),
    ) -> ClipmixResult<()>;
}

/// Media engine backed by the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: String,
    ffprobe: String,
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl FfmpegEngine {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn from_config(defaults: &RenderDefaults) -> Self {
        Self::new(defaults.ffmpeg.clone(), defaults.ffprobe.clone())
    }

    fn run_ffmpeg(
        &self,
        args: &[String],
        total_frames: u64,
        expected_duration_secs: f64,
        progress: &dyn Fn(EncodeProgress),
    ) -> ClipmixResult<()> {
        tracing::debug!(args = ?args, "Running ffmpeg");
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());

        let start = std::time::Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| ClipmixError::encode(format!("Failed to start {}: {e}", self.ffmpeg)))?;

        tracing::info!(
            pid = child.id(),
            args_len = args.len(),
            total_frames,
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ClipmixError::encode("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ClipmixError::encode("Failed to capture ffmpeg stderr"))?;

        // ffmpeg blocks once the stderr pipe fills up.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        let mut state = ProgressState::default();
        let mut last_progress_secs = 0.0f64;
        let mut last_progress_wall = std::time::Instant::now();
        loop {
            line.clear();
            let bytes = reader
                .read_line(&mut line)
                .map_err(|e| ClipmixError::encode(format!("Failed reading ffmpeg progress: {e}")))?;
            if bytes == 0 {
                break;
            }

            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            state.update(key, value);
            if key != "progress" {
                continue;
            }

            if state.out_time_secs > last_progress_secs + 0.001 {
                last_progress_secs = state.out_time_secs;
                last_progress_wall = std::time::Instant::now();
            }
            progress(encode_progress(
                &state,
                total_frames,
                expected_duration_secs,
                start.elapsed().as_secs_f64(),
            ));
            if last_progress_wall.elapsed().as_secs() >= 10 {
                tracing::warn!(
                    out_time_secs = state.out_time_secs,
                    elapsed_secs = start.elapsed().as_secs_f64(),
                    "No ffmpeg progress advancement for 10s"
                );
                last_progress_wall = std::time::Instant::now();
            }
        }

        let status = child
            .wait()
            .map_err(|e| ClipmixError::encode(format!("Failed to wait on ffmpeg: {e}")))?;
        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(classify_ffmpeg_failure(&status.to_string(), stderr_output.trim()));
        }

        tracing::info!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            "ffmpeg finished"
        );
        Ok(())
    }
}

impl MediaEngine for FfmpegEngine {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn is_available(&self) -> bool {
        command_exists(&self.ffmpeg) && command_exists(&self.ffprobe)
    }

    fn probe(&self, path: &Path) -> ClipmixResult<MediaInfo> {
        ffprobe(&self.ffprobe, path)
    }

    fn render(
        &mut self,
        request: &RenderRequest,
        progress: &dyn Fn(EncodeProgress),
    ) -> ClipmixResult<()> {
        let args = build_ffmpeg_args(request)?;
        let total_frames = request.total_frames();
        progress(EncodeProgress {
            fraction: 0.0,
            frames_rendered: 0,
            total_frames,
            eta_secs: 0.0,
        });

        self.run_ffmpeg(
            &args,
            total_frames,
            request.plan.output_duration_secs(),
            progress,
        )?;

        let written = std::fs::metadata(&request.output_path)
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);
        if !written {
            return Err(ClipmixError::encode(format!(
                "ffmpeg reported success but {} was not written",
                request.output_path.display()
            )));
        }

        progress(EncodeProgress {
            fraction: 1.0,
            frames_rendered: total_frames,
            total_frames,
            eta_secs: 0.0,
        });
        Ok(())
    }
}

/// Map a failed ffmpeg run onto the stage that broke.
///
/// Filter-graph failures (trim, crop, xfade, concat wiring) surface as
/// concatenation errors; anything else is an encode failure.
fn classify_ffmpeg_failure(status: &str, stderr: &str) -> ClipmixError {
    let lowered = stderr.to_ascii_lowercase();
    let graph_failure = ["filter", "xfade", "acrossfade", "concat"]
        .iter()
        .any(|needle| lowered.contains(needle));

    let message = format!("ffmpeg render failed (status {status}): {stderr}");
    if graph_failure {
        ClipmixError::concatenate(message)
    } else {
        ClipmixError::encode(message)
    }
}

/// Whether `binary` resolves to an executable.
pub fn command_exists(binary: &str) -> bool {
    if binary.contains('/') {
        return Path::new(binary).is_file();
    }
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports microseconds under both keys.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn encode_progress(
    state: &ProgressState,
    total_frames: u64,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> EncodeProgress {
    let fraction = if state.complete {
        1.0
    } else if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };

    let eta_secs = if fraction > 0.0 {
        (elapsed_secs / fraction) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    EncodeProgress {
        fraction,
        frames_rendered: (fraction * total_frames as f64).round() as u64,
        total_frames,
        eta_secs,
    }
}
