//! Raster pipeline engine for landing-area detection and measurability
//! analysis.
//!
//! The [`Pipeline`] owns a named layer store and exposes every raster
//! operator by layer name. The lane functions in [`lanes`] compose those
//! operators into the fixed processing graph, and the [`scheduler`]
//! replays the rotation-dependent lanes across a range of vehicle
//! headings in parallel before blending the per-heading results into
//! rotation-marginal probability maps.

mod exclusion;
pub mod lanes;
pub mod names;
mod ops;
mod params;
mod pipeline;
pub mod scheduler;

pub use exclusion::{default_exclusion_size, ExclusionSizeFn};
pub use ops::arith::CompareOp;
pub use ops::window::WindowFilter;
pub use params::{
	MapParams, PipelineParams, RotationParams, SchedulingParams, ThresholdParams, VehicleParams,
};
pub use pipeline::Pipeline;
pub use scheduler::{heading_suffix, SweepReport};
