//! Center-crop geometry.
//!
//! Every clip is cropped to the target aspect ratio (removing equal margins
//! from the over-long dimension) and then scaled to the fixed resolution of
//! the target class, so all clips in a mix share identical dimensions.

use clipmix_model::aspect::{AspectTarget, Resolution};
use clipmix_model::clip::ClipSpec;
use clipmix_model::crop::CropRect;

/// Compute the center crop of a `width x height` frame for `target`, plus
/// the output resolution the cropped region is scaled to.
///
/// Frames wider than the target keep their full height; all others keep
/// their full width. Ratios are compared and floored in integer arithmetic
/// on the target's numerator and denominator. Callers must pass non-zero
/// dimensions (see [`ClipSpec::new`]).
pub fn plan_crop(width: u32, height: u32, target: AspectTarget) -> (CropRect, Resolution) {
    let (num, den) = target.ratio_parts();
    let (w, h) = (width as u64, height as u64);
    let (num, den) = (num as u64, den as u64);

    // w / h > num / den
    let rect = if w * den > h * num {
        let new_w = (h * num / den).min(w).max(1);
        let x1 = (w - new_w) / 2;
        CropRect::new(x1 as u32, 0, (x1 + new_w) as u32, height)
    } else {
        let new_h = (w * den / num).min(h).max(1);
        let y1 = (h - new_h) / 2;
        CropRect::new(0, y1 as u32, width, (y1 + new_h) as u32)
    };

    (rect, target.resolution())
}

/// [`plan_crop`] for a probed clip.
pub fn plan_clip_crop(clip: &ClipSpec, target: AspectTarget) -> (CropRect, Resolution) {
    plan_crop(clip.width(), clip.height(), target)
}
