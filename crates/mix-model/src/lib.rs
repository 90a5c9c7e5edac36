//! ClipMix Model
//!
//! Defines the data contracts shared by the planner, the render engine,
//! and the host:
//! - **Clips:** Probed metadata of one uploaded asset
//! - **Aspect:** Target aspect classes and their fixed output resolutions
//! - **Crop / Trim:** Per-clip geometry and time windows
//! - **Settings:** The immutable parameter set of one render request
//! - **Plan:** The ordered render plan handed to the media engine
//!
//! Nothing here persists beyond one render request.

pub mod aspect;
pub mod clip;
pub mod crop;
pub mod plan;
pub mod settings;

pub use aspect::*;
pub use clip::*;
pub use crop::*;
pub use plan::*;
pub use settings::*;
