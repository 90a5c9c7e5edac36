//! ClipMix Render Engine
//!
//! Turns uploaded clips and mix settings into one delivered MP4.
//!
//! # Pipeline Architecture
//!
//! ```text
//! uploads ──── MP4 sniff ──── scratch files
//!                                  │
//!                                  ├── ffprobe (duration, size, audio)
//!                                  │
//! settings ────────────────────────┴── planner (crop + timeline)
//!                                              │
//!                                              ├── trim / crop / scale per clip
//!                                              ├── xfade or concat per boundary
//!                                              ├── trailing -t correction
//!                                              ▼
//!                                       Encode (H.264 + AAC)
//!                                              │
//!                                              ▼
//!                                   smart_cut_video.mp4
//! ```
//!
//! Progress runs 0-40 while clips are staged and probed, then 40-100 while
//! ffmpeg encodes.

pub mod engine;
pub mod graph;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod scratch;
pub mod source;

pub use engine::{EncodeProgress, EncoderSettings, FfmpegEngine, MediaEngine, RenderRequest};
pub use pipeline::{render_mix, run_pipeline, MixJob, RenderOutcome};
pub use probe::MediaInfo;
pub use progress::{ProgressCallback, RenderProgress, RenderStage};
pub use source::ClipSource;
