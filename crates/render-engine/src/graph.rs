//! ffmpeg filter graph construction.
//!
//! Every planned clip becomes one video chain and one audio chain:
//!
//! ```text
//! [i:v] trim -> setpts -> crop -> scale -> setsar -> fps -> format  [v<k>]
//! [i:a] atrim -> asetpts -> aformat                                 [a<k>]
//!       (or anullsrc for sources without audio)
//! ```
//!
//! The chains are then folded left to right: a boundary flagged for
//! crossfade joins with `xfade` + `acrossfade`, any other boundary joins with
//! a two-input `concat`. A clip whose planned start lies before zero has that
//! lead trimmed off and blends over what remains of the transition, so the
//! encoded length always equals `RenderPlan::assembled_secs`.

use std::fmt::Write as _;

use clipmix_common::error::{ClipmixError, ClipmixResult};
use clipmix_model::plan::{PlannedClip, RenderPlan};

use crate::engine::RenderRequest;

const AUDIO_FORMAT: &str = "aformat=sample_fmts=fltp:sample_rates=44100:channel_layouts=stereo";

/// Build the `-filter_complex` graph for `plan`.
///
/// `has_audio` is indexed by `PlannedClip::source_index`. The graph ends in
/// the `[vout]` and `[aout]` pads.
pub fn build_filter_graph(plan: &RenderPlan, has_audio: &[bool], fps: u32) -> ClipmixResult<String> {
    if plan.is_empty() {
        return Err(ClipmixError::invalid_input("Render plan contains no clips"));
    }

    let mut graph = String::new();
    for (position, entry) in plan.clips.iter().enumerate() {
        let audio = *has_audio.get(entry.source_index).ok_or_else(|| {
            ClipmixError::transform(format!(
                "Clip {} refers to missing input {}",
                position, entry.source_index
            ))
        })?;
        push_clip_chains(&mut graph, position, entry, audio, fps)?;
    }

    let mut video = "v0".to_string();
    let mut audio = "a0".to_string();
    for (position, entry) in plan.clips.iter().enumerate().skip(1) {
        let (next_video, next_audio) = (format!("vj{position}"), format!("aj{position}"));
        let joined = if entry.crossfade_in {
            let blend = entry.blend_secs();
            let offset = entry.timeline_start + entry.hidden_lead_secs();
            write!(
                graph,
                "[{video}][v{position}]xfade=transition=fade:duration={blend:.3}:offset={offset:.6}[{next_video}];\
                 [{audio}][a{position}]acrossfade=d={blend:.3}[{next_audio}];"
            )
        } else {
            write!(
                graph,
                "[{video}][{audio}][v{position}][a{position}]concat=n=2:v=1:a=1[{next_video}][{next_audio}];"
            )
        };
        joined.map_err(graph_write_error)?;
        video = next_video;
        audio = next_audio;
    }

    write!(graph, "[{video}]null[vout];[{audio}]anull[aout]").map_err(graph_write_error)?;
    Ok(graph)
}

fn push_clip_chains(
    graph: &mut String,
    position: usize,
    entry: &PlannedClip,
    has_audio: bool,
    fps: u32,
) -> ClipmixResult<()> {
    let input = entry.source_index;
    let (width, height) = (entry.clip.width(), entry.clip.height());
    let crop = entry.crop;
    if !crop.contains_within(width, height) {
        return Err(ClipmixError::transform(format!(
            "Clip {position} crop {}x{}+{}+{} does not fit its {width}x{height} frame",
            crop.width(),
            crop.height(),
            crop.x1,
            crop.y1
        )));
    }
    if !entry.trim.is_within(entry.clip.duration_secs()) {
        return Err(ClipmixError::transform(format!(
            "Clip {position} trim {:.3}s-{:.3}s lies outside its {:.3}s source",
            entry.trim.start,
            entry.trim.end,
            entry.clip.duration_secs()
        )));
    }

    // The hidden lead never reaches the output.
    let start = entry.trim.start + entry.hidden_lead_secs();
    let end = entry.trim.end;

    write!(
        graph,
        "[{input}:v]trim=start={start:.6}:end={end:.6},setpts=PTS-STARTPTS,\
         crop={cw}:{ch}:{cx}:{cy},scale={ow}:{oh},setsar=1,fps={fps},format=yuv420p[v{position}];",
        cw = crop.width(),
        ch = crop.height(),
        cx = crop.x1,
        cy = crop.y1,
        ow = entry.output.width,
        oh = entry.output.height,
    )
    .map_err(graph_write_error)?;

    let written = if has_audio {
        write!(
            graph,
            "[{input}:a]atrim=start={start:.6}:end={end:.6},asetpts=PTS-STARTPTS,{AUDIO_FORMAT}[a{position}];"
        )
    } else {
        write!(
            graph,
            "anullsrc=channel_layout=stereo:sample_rate=44100,atrim=duration={dur:.6},{AUDIO_FORMAT}[a{position}];",
            dur = end - start,
        )
    };
    written.map_err(graph_write_error)
}

fn graph_write_error(err: std::fmt::Error) -> ClipmixError {
    ClipmixError::transform(format!("Failed to build filter graph: {err}"))
}

/// Full ffmpeg argument list for `request`.
pub fn build_ffmpeg_args(request: &RenderRequest) -> ClipmixResult<Vec<String>> {
    if request.inputs.len() != request.has_audio.len() {
        return Err(ClipmixError::transform(format!(
            "{} inputs but {} audio flags",
            request.inputs.len(),
            request.has_audio.len()
        )));
    }

    let filter = build_filter_graph(&request.plan, &request.has_audio, request.encoder.fps)?;

    let mut args = vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-nostats".to_string(),
        "-progress".to_string(),
        "pipe:1".to_string(),
    ];
    for input in &request.inputs {
        args.push("-i".to_string());
        args.push(input.display().to_string());
    }

    args.push("-filter_complex".to_string());
    args.push(filter);
    args.push("-map".to_string());
    args.push("[vout]".to_string());
    args.push("-map".to_string());
    args.push("[aout]".to_string());
    args.push("-r".to_string());
    args.push(request.encoder.fps.to_string());
    if let Some(limit) = request.plan.final_trim_secs {
        args.push("-t".to_string());
        args.push(format!("{limit:.6}"));
    }

    args.append(&mut request.encoder.codec_args());
    args.push(request.output_path.display().to_string());
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EncoderSettings;
    use clipmix_model::aspect::AspectTarget;
    use clipmix_model::clip::ClipSpec;
    use clipmix_model::settings::{DurationMode, MixSettings};
    use clipmix_planner::plan_timeline;
    use std::path::PathBuf;

    fn plan_for(durations: &[f64], target_secs: u32) -> RenderPlan {
        let clips: Vec<ClipSpec> = durations
            .iter()
            .map(|d| ClipSpec::new(*d, 1920, 1080).unwrap())
            .collect();
        let settings = MixSettings {
            aspect: AspectTarget::Portrait9x16,
            duration: DurationMode::FixedTotal { target_secs },
            random_cut: false,
            shuffle: false,
            crossfade: true,
        };
        plan_timeline(&clips, &settings).unwrap()
    }

    fn request(plan: RenderPlan, has_audio: Vec<bool>) -> RenderRequest {
        RenderRequest {
            inputs: (0..has_audio.len())
                .map(|i| PathBuf::from(format!("/tmp/in{i}.mp4")))
                .collect(),
            has_audio,
            plan,
            output_path: PathBuf::from("/tmp/out/smart_cut_video.mp4"),
            encoder: EncoderSettings::default(),
        }
    }

    #[test]
    fn test_single_clip_graph() {
        let plan = plan_for(&[10.0], 5);
        let graph = build_filter_graph(&plan, &[true], 24).unwrap();
        assert!(graph.starts_with("[0:v]trim=start=0.000000:end=5.000000"));
        assert!(graph.contains("crop=607:1080:656:0,scale=720:1280,setsar=1,fps=24"));
        assert!(graph.contains("[0:a]atrim="));
        assert!(graph.ends_with("[v0]null[vout];[a0]anull[aout]"));
        assert!(!graph.contains("xfade"));
        assert!(!graph.contains("concat"));
    }

    #[test]
    fn test_crossfades_and_hard_cuts_are_counted() {
        // 0.5s is too short for a crossfade, so the third clip hard-cuts.
        let plan = plan_for(&[10.0, 10.0, 0.5, 10.0], 20);
        let crossfades = plan.crossfade_boundaries();
        let graph = build_filter_graph(&plan, &[true; 4], 24).unwrap();

        assert_eq!(crossfades, 2);
        assert_eq!(graph.matches("xfade=").count(), crossfades);
        assert_eq!(graph.matches("acrossfade=").count(), crossfades);
        assert_eq!(graph.matches("concat=n=2").count(), plan.len() - 1 - crossfades);
    }

    #[test]
    fn test_xfade_offset_matches_timeline_start() {
        let plan = plan_for(&[10.0, 10.0, 10.0], 15);
        let graph = build_filter_graph(&plan, &[true; 3], 24).unwrap();
        assert!(graph.contains("xfade=transition=fade:duration=0.500:offset=4.500000"));
        assert!(graph.contains("xfade=transition=fade:duration=0.500:offset=9.000000"));
    }

    #[test]
    fn test_short_opener_blends_over_the_remaining_overlap() {
        // 0.3 s opener: the next clip starts at -0.2 s on the timeline.
        let plan = plan_for(&[0.3, 10.0], 10);
        assert!((plan.assembled_secs - 4.8).abs() < 1e-9);
        let graph = build_filter_graph(&plan, &[true, false], 24).unwrap();

        assert!(graph.contains("[1:v]trim=start=0.200000:end=5.000000"));
        assert!(graph.contains("atrim=duration=4.800000"));
        assert!(graph.contains("xfade=transition=fade:duration=0.300:offset=0.000000"));
        assert!(graph.contains("acrossfade=d=0.300"));
    }

    #[test]
    fn test_out_of_frame_crop_is_rejected() {
        let mut plan = plan_for(&[6.0], 5);
        plan.clips[0].crop.x2 = 4000;
        let err = build_filter_graph(&plan, &[true], 24).unwrap_err();
        assert!(matches!(err, ClipmixError::Transform { .. }));
    }

    #[test]
    fn test_trim_past_source_end_is_rejected() {
        let mut plan = plan_for(&[6.0], 5);
        plan.clips[0].trim.end = 7.0;
        let err = build_filter_graph(&plan, &[true], 24).unwrap_err();
        assert!(err.to_string().contains("outside its 6.000s source"));
    }

    #[test]
    fn test_silent_sources_get_synthesized_audio() {
        let plan = plan_for(&[6.0, 6.0], 10);
        let graph = build_filter_graph(&plan, &[false, true], 24).unwrap();
        assert_eq!(graph.matches("anullsrc").count(), 1);
        assert!(!graph.contains("[0:a]"));
        assert!(graph.contains("[1:a]atrim="));
    }

    #[test]
    fn test_missing_audio_flag_is_rejected() {
        let plan = plan_for(&[6.0, 6.0], 10);
        let err = build_filter_graph(&plan, &[true], 24).unwrap_err();
        assert!(matches!(err, ClipmixError::Transform { .. }));
    }

    #[test]
    fn test_args_include_trailing_trim_when_planned() {
        let mut plan = plan_for(&[10.0, 10.0], 15);
        plan.final_trim_secs = Some(15.0);
        let args = build_ffmpeg_args(&request(plan, vec![true, true])).unwrap();

        let t = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "15.000000");
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);
        assert_eq!(args.last().unwrap(), "/tmp/out/smart_cut_video.mp4");
        assert!(args.windows(2).any(|w| w[0] == "-r" && w[1] == "24"));
    }

    #[test]
    fn test_args_without_trailing_trim() {
        let plan = plan_for(&[10.0, 10.0, 10.0], 15);
        let args = build_ffmpeg_args(&request(plan, vec![true; 3])).unwrap();
        assert!(!args.iter().any(|a| a == "-t"));
    }
}
