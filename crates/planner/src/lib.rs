//! ClipMix Planner
//!
//! Turns probed clips and mix settings into a render plan:
//! - **Geometry:** Center crop to the target aspect and fixed output size
//! - **Timeline:** Order, per-clip trim windows, crossfades, and the
//!   trailing correction trim
//!
//! This crate is pure computation: no I/O, no media engine.
//! All inputs are data; all outputs are data.

pub mod geometry;
pub mod timeline;

pub use geometry::{plan_clip_crop, plan_crop};
pub use timeline::{plan_timeline, plan_timeline_with_rng, PlanError};
