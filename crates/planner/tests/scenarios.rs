use clipmix_model::aspect::AspectTarget;
use clipmix_model::clip::ClipSpec;
use clipmix_model::plan::TrimPlan;
use clipmix_model::settings::{DurationMode, MixSettings};
use clipmix_planner::timeline::trailing_trim;
use clipmix_planner::{plan_crop, plan_timeline, plan_timeline_with_rng};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn clips(count: usize, duration: f64) -> Vec<ClipSpec> {
    (0..count)
        .map(|_| ClipSpec::new(duration, 1920, 1080).expect("fixture clip should be valid"))
        .collect()
}

fn settings(target_secs: u32, crossfade: bool) -> MixSettings {
    MixSettings {
        aspect: AspectTarget::Portrait9x16,
        duration: DurationMode::FixedTotal { target_secs },
        random_cut: false,
        shuffle: false,
        crossfade,
    }
}

#[test]
fn three_ten_second_clips_into_fifteen_seconds() {
    let plan = plan_timeline(&clips(3, 10.0), &settings(15, true)).unwrap();

    assert_eq!(plan.allocated_secs, Some(5.0));
    for entry in &plan.clips {
        assert_eq!(entry.trim, TrimPlan::new(0.0, 5.0));
    }
    assert_eq!(plan.crossfade_boundaries(), 2);
    assert!((plan.assembled_secs - 14.0).abs() < 1e-9);
    // 14s is inside the 15 +/- 3 band, so no correction trim.
    assert_eq!(plan.final_trim_secs, None);
    assert!((plan.output_duration_secs() - 14.0).abs() < 1e-9);
}

#[test]
fn twenty_one_second_clips_into_ten_seconds() {
    let plan = plan_timeline(&clips(20, 1.0), &settings(10, true)).unwrap();

    assert_eq!(plan.allocated_secs, Some(0.5));
    for entry in &plan.clips {
        assert_eq!(entry.trim, TrimPlan::new(0.0, 0.5));
        assert!(!entry.crossfade_in);
    }
    assert_eq!(plan.crossfade_boundaries(), 0);
    assert!((plan.assembled_secs - 10.0).abs() < 1e-9);
}

#[test]
fn overshoot_is_cut_to_exact_target() {
    let mode = DurationMode::FixedTotal { target_secs: 15 };
    assert_eq!(trailing_trim(19.0, mode), Some(15.0));
}

#[test]
fn random_cut_windows_stay_inside_sources() {
    let mixed: Vec<ClipSpec> = [2.0, 7.5, 30.0, 120.0, 4.0]
        .iter()
        .map(|d| ClipSpec::new(*d, 1280, 720).unwrap())
        .collect();
    let settings = MixSettings {
        random_cut: true,
        shuffle: true,
        ..settings(20, true)
    };

    for seed in 0..64 {
        let plan =
            plan_timeline_with_rng(&mixed, &settings, &mut StdRng::seed_from_u64(seed)).unwrap();
        for entry in &plan.clips {
            let source = entry.clip.duration_secs();
            assert!(entry.trim.is_within(source));
            assert!(entry.duration() <= 4.0 + 1e-9);
            assert!(entry.trim.start <= (source - 4.0).max(0.0) + 1e-9);
        }
    }
}

#[test]
fn plan_crops_match_geometry_planner() {
    let sources = vec![
        ClipSpec::new(6.0, 1920, 1080).unwrap(),
        ClipSpec::new(6.0, 1080, 1920).unwrap(),
    ];
    let settings = MixSettings {
        aspect: AspectTarget::Landscape16x9,
        ..settings(12, false)
    };
    let plan = plan_timeline(&sources, &settings).unwrap();

    for entry in &plan.clips {
        let (rect, res) = plan_crop(entry.clip.width(), entry.clip.height(), settings.aspect);
        assert_eq!(entry.crop, rect);
        assert_eq!(entry.output, res);
    }
}

#[test]
fn plan_serializes_for_the_host() {
    let plan = plan_timeline(&clips(2, 8.0), &settings(10, true)).unwrap();
    let json = serde_json::to_value(&plan).unwrap();

    assert_eq!(json["aspect"], "9:16");
    assert_eq!(json["output"]["width"], 720);
    assert_eq!(json["clips"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["clips"][1]["crossfade_in"], true);
}
