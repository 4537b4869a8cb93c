use benthoscan_core::{CoreError, Result, DEFAULT_NODATA};

const WATER_DENSITY: f64 = 1025.0; // kg / m3
const GRAVITY: f64 = 9.81; // m / s2

/// Vehicle geometry and hydrostatics.
#[derive(Clone, Copy, Debug)]
pub struct VehicleParams {
	/// Robot height [m].
	pub height: f64,
	/// Robot width [m].
	pub width: f64,
	/// Robot length [m].
	pub length: f64,
	/// Centre-of-gravity height as a fraction of the robot height.
	pub ratio_cg: f64,
	/// Metacentre height as a fraction of the robot height.
	pub ratio_meta: f64,
	/// Net-to-gravity force ratio (positive down).
	pub force_ratio: f64,
}

impl Default for VehicleParams {
	fn default() -> Self {
		VehicleParams {
			height: 0.4,
			width: 0.5,
			length: 1.3,
			ratio_cg: 0.25,
			ratio_meta: 0.6,
			force_ratio: 0.9,
		}
	}
}

/// Terrain thresholds separating landable from excluded cells.
#[derive(Clone, Copy, Debug)]
pub struct ThresholdParams {
	/// Critical obstacle height [m] separating low from high protrusions.
	pub height: f64,
	/// Critical slope [deg].
	pub slope: f64,
	/// Minimum height [m] for a protrusion to count as an obstacle.
	pub ground: f64,
	/// Minimum planar size [m] for a protrusion cluster to count.
	pub protrusion_size: f64,
	/// Recompute `height` and `slope` from the vehicle geometry.
	pub update: bool,
}

impl Default for ThresholdParams {
	fn default() -> Self {
		ThresholdParams {
			height: 0.1,
			slope: 17.7,
			ground: 0.02,
			protrusion_size: 0.04,
			update: false,
		}
	}
}

/// Heading sweep configuration, degrees from north.
#[derive(Clone, Copy, Debug)]
pub struct RotationParams {
	/// Run a single heading and skip the blend.
	pub fixed: bool,
	/// The heading used when `fixed` is set, and the kernel heading for
	/// the once-computed coverage exclusion map.
	pub rotation: f64,
	pub min: f64,
	pub max: f64,
	pub step: f64,
}

impl Default for RotationParams {
	fn default() -> Self {
		RotationParams {
			fixed: false,
			rotation: 0.0,
			min: 0.0,
			max: 360.0,
			step: 10.0,
		}
	}
}

/// Map-wide raster settings.
#[derive(Clone, Copy, Debug)]
pub struct MapParams {
	pub default_nodata: f64,
	pub use_nodata_mask: bool,
	/// Search radius [m] for concave-hull contour refinement.
	pub alpha_shape_radius: f64,
	pub mask_border: bool,
}

impl Default for MapParams {
	fn default() -> Self {
		MapParams {
			default_nodata: DEFAULT_NODATA,
			use_nodata_mask: true,
			alpha_shape_radius: 1.0,
			mask_border: false,
		}
	}
}

/// Scheduler and export switches.
#[derive(Clone, Copy, Debug)]
pub struct SchedulingParams {
	/// Worker-thread cap for the rotation sweep; clamped to at least 3.
	pub max_threads: usize,
	pub export_intermediate: bool,
	pub export_rotated: bool,
	/// Console verbosity, 0-3.
	pub verbosity: u8,
	/// Fail the whole sweep on the first per-rotation error instead of
	/// blending over the survivors.
	pub strict: bool,
}

impl Default for SchedulingParams {
	fn default() -> Self {
		SchedulingParams {
			max_threads: 12,
			export_intermediate: false,
			export_rotated: false,
			verbosity: 0,
			strict: false,
		}
	}
}

/// Full parameter set of one pipeline run.
#[derive(Clone, Debug, Default)]
pub struct PipelineParams {
	pub vehicle: VehicleParams,
	pub threshold: ThresholdParams,
	pub rotation: RotationParams,
	pub map: MapParams,
	pub scheduling: SchedulingParams,
}

impl PipelineParams {
	/// Body diagonal of the vehicle footprint [m]; diameter of the
	/// terrain low-pass kernel.
	pub fn robot_diagonal(&self) -> f64 {
		self.vehicle.width.hypot(self.vehicle.length)
	}

	/// Recomputes the critical slope and height from the vehicle
	/// geometry when threshold updating is requested.
	///
	/// The vehicle volume is approximated by an ellipsoid with axes
	/// width x length x height; buoyancy follows from the force ratio,
	/// and the critical slope balances the righting moment about the
	/// downhill footprint edge.
	pub fn apply_threshold_update(&mut self) {
		if !self.threshold.update {
			return;
		}
		let v = &self.vehicle;
		let d_m = v.height * v.ratio_meta;
		let d_g = v.height * v.ratio_cg;

		let volume = (std::f64::consts::PI / 6.0) * v.width * v.length * v.height;
		let f_g = volume * WATER_DENSITY * GRAVITY;
		let f_b = f_g * (1.0 - v.force_ratio);
		let f_r = f_g - f_b;

		let slope_crit = ((0.5 * v.width * f_r) / (d_m * f_b - d_g * f_r)).atan();
		self.threshold.height = v.width * slope_crit.sin();
		self.threshold.slope = slope_crit.to_degrees();
	}

	/// Fatal argument validation, run before any compute.
	pub fn validate(&self) -> Result<()> {
		let v = &self.vehicle;
		if v.width <= 0.0 || v.length <= 0.0 || v.height <= 0.0 {
			return Err(CoreError::WrongArgument(format!(
				"vehicle dimensions must be positive, got {} x {} x {}",
				v.width, v.length, v.height
			)));
		}
		if !self.rotation.fixed {
			if self.rotation.step <= 0.0 {
				return Err(CoreError::WrongArgument(format!(
					"rotation step must be positive, got {}",
					self.rotation.step
				)));
			}
			if self.rotation.max < self.rotation.min {
				return Err(CoreError::WrongArgument(format!(
					"rotation range is empty: [{}, {}]",
					self.rotation.min, self.rotation.max
				)));
			}
		}
		if self.threshold.ground < 0.0 || self.threshold.height <= self.threshold.ground {
			return Err(CoreError::WrongArgument(format!(
				"protrusion thresholds must satisfy 0 <= ground < height, got ground {} height {}",
				self.threshold.ground, self.threshold.height
			)));
		}
		Ok(())
	}

	/// Headings of the sweep: `n + 1` samples over `[min, max]`.
	pub fn headings(&self) -> Vec<f64> {
		if self.rotation.fixed {
			return vec![self.rotation.rotation];
		}
		let r = &self.rotation;
		let n = ((r.max - r.min) / r.step).floor() as usize;
		(0..=n).map(|k| r.min + k as f64 * r.step).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	#[test]
	fn headings_cover_inclusive_range() {
		let mut params = PipelineParams::default();
		params.rotation.min = 0.0;
		params.rotation.max = 90.0;
		params.rotation.step = 30.0;
		assert_eq!(params.headings(), vec![0.0, 30.0, 60.0, 90.0]);

		params.rotation.max = 85.0;
		assert_eq!(params.headings(), vec![0.0, 30.0, 60.0]);

		params.rotation.fixed = true;
		params.rotation.rotation = 45.0;
		assert_eq!(params.headings(), vec![45.0]);
	}

	#[test]
	fn threshold_update_follows_vehicle_geometry() {
		let mut params = PipelineParams::default();
		params.threshold.update = true;
		params.apply_threshold_update();

		let v = &params.vehicle;
		let volume = (std::f64::consts::PI / 6.0) * v.width * v.length * v.height;
		let f_g = volume * 1025.0 * 9.81;
		let f_b = f_g * (1.0 - v.force_ratio);
		let f_r = f_g - f_b;
		let slope = ((0.5 * v.width * f_r) / (v.height * v.ratio_meta * f_b - v.height * v.ratio_cg * f_r)).atan();

		assert_abs_diff_eq!(params.threshold.slope, slope.to_degrees(), epsilon = 1e-12);
		assert_abs_diff_eq!(params.threshold.height, v.width * slope.sin(), epsilon = 1e-12);

		// without the flag the thresholds stay put
		let mut fixed = PipelineParams::default();
		fixed.apply_threshold_update();
		assert_eq!(fixed.threshold.slope, 17.7);
	}

	#[test]
	fn validation_rejects_bad_ranges() {
		let mut params = PipelineParams::default();
		assert!(params.validate().is_ok());

		params.rotation.step = 0.0;
		assert!(params.validate().is_err());
		params.rotation.step = 10.0;

		params.vehicle.width = -1.0;
		assert!(params.validate().is_err());
		params.vehicle.width = 0.5;

		params.threshold.ground = 0.5;
		assert!(params.validate().is_err());
	}
}
