//! Rotation sweep: replays the heading-dependent lanes across the
//! configured range of vehicle headings in parallel and blends the
//! per-heading landability/measurability maps into rotation-marginal
//! probability rasters.

use crate::{lanes, names, ExclusionSizeFn, Pipeline, PipelineParams};
use benthoscan_core::{CoreError, KernelShape, Result};
use itertools::Itertools;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// What a rotation worker did. Workers observe the sweep-wide abort flag
/// between layers only; there is no mid-operator cancellation.
enum RotationOutcome {
	Completed,
	Skipped,
}

/// Layer-name suffix for a heading, `_rNNN` with the integer degrees
/// zero-padded to three characters.
///
/// Negative headings wrap into `[0, 360)` so the suffix stays within the
/// alphanumeric layer-name alphabet; -15 deg and 345 deg address the same
/// layers. Non-negative headings keep their literal value, so an
/// inclusive sweep endpoint of 360 does not collide with 0.
pub fn heading_suffix(theta: f64) -> String {
	let theta = if theta < 0.0 { theta.rem_euclid(360.0) } else { theta };
	format!("_r{:03}", theta as i64)
}

/// Outcome of a sweep.
#[derive(Debug)]
pub struct SweepReport {
	/// All requested headings, in sweep order.
	pub headings: Vec<f64>,
	/// Headings whose lanes completed.
	pub completed: Vec<f64>,
	/// Per-heading errors, keyed by the heading suffix.
	pub failed: BTreeMap<String, CoreError>,
	/// Names of the final output layers (blended, or per-heading when the
	/// rotation is fixed).
	pub landability_layer: String,
	pub measurability_layer: String,
}

/// Runs the whole processing graph on a seeded pipeline: setup kernels
/// and coverage map, terrain lanes A and B, the protrusion map, then the
/// heading sweep and the final blend.
///
/// Per-heading failures are collected and reported; the blend runs over
/// whichever headings succeeded unless `scheduling.strict` is set. With
/// `rotation.fixed` a single heading is processed, without suffix and
/// without blend.
pub fn run(
	pipeline: &Pipeline,
	params: &PipelineParams,
	exclusion_size: &ExclusionSizeFn,
) -> Result<SweepReport> {
	params.validate()?;
	prepare(pipeline, params)?;

	info!("running terrain lanes A and B");
	let (a, b) = rayon::join(
		|| lanes::run_lane_a(pipeline, params),
		|| lanes::run_lane_b(pipeline, params),
	);
	a?;
	b?;
	lanes::build_protrusions(pipeline)?;

	if params.rotation.fixed {
		let theta = params.rotation.rotation;
		info!("processing fixed heading [{theta}] deg");
		process_rotation(pipeline, params, exclusion_size, theta, "", &AtomicBool::new(false))?;
		return Ok(SweepReport {
			headings: vec![theta],
			completed: vec![theta],
			failed: BTreeMap::new(),
			landability_layer: names::LANDABILITY_MAP.to_string(),
			measurability_layer: names::FINAL_MEASURABILITY.to_string(),
		});
	}

	let headings = params.headings();
	info!(
		"sweeping {} headings over [{}, {}] deg, step {}",
		headings.len(),
		params.rotation.min,
		params.rotation.max,
		params.rotation.step
	);

	let pool = rayon::ThreadPoolBuilder::new()
		.num_threads(params.scheduling.max_threads.max(3))
		.build()
		.map_err(|e| CoreError::WrongArgument(format!("cannot build worker pool: {e}")))?;

	// set on the first failure in strict mode; workers observe it between
	// layers and skip the rest of their rotation
	let abort = AtomicBool::new(false);
	let results: Vec<(f64, Result<RotationOutcome>)> = pool.install(|| {
		headings
			.par_iter()
			.map(|&theta| {
				let suffix = heading_suffix(theta);
				let result = process_rotation(pipeline, params, exclusion_size, theta, &suffix, &abort);
				if result.is_err() && params.scheduling.strict {
					abort.store(true, Ordering::Relaxed);
				}
				(theta, result)
			})
			.collect()
	});

	let mut completed = Vec::new();
	let mut failed = BTreeMap::new();
	for (theta, result) in results {
		match result {
			Ok(RotationOutcome::Completed) => completed.push(theta),
			Ok(RotationOutcome::Skipped) => debug!("heading [{theta}] deg skipped after abort"),
			Err(error) => {
				failed.insert(heading_suffix(theta), error);
			}
		}
	}

	if let Some((suffix, error)) = failed.iter().next() {
		if params.scheduling.strict || completed.is_empty() {
			return Err(error.clone());
		}
		warn!(
			"{} of {} headings failed ({}); blending over the remaining ones",
			failed.len(),
			headings.len(),
			failed.keys().join(", ")
		);
		debug!("first failure [{suffix}]: {error}");
	}

	info!("blending {} landability maps", completed.len());
	let m3_layers: Vec<String> = completed
		.iter()
		.map(|&theta| format!("{}{}", names::LANDABILITY_MAP, heading_suffix(theta)))
		.collect();
	pipeline.blend_mean(&m3_layers, names::LANDABILITY_BLEND, 1.0 / 255.0)?;
	pipeline.copy_mask(names::RAW_BATHYMETRY, names::LANDABILITY_BLEND)?;

	let m4_layers: Vec<String> = completed
		.iter()
		.map(|&theta| format!("{}{}", names::FINAL_MEASURABILITY, heading_suffix(theta)))
		.collect();
	pipeline.blend_mean(&m4_layers, names::FINAL_MEASURABILITY, 1.0)?;
	pipeline.copy_mask(names::RAW_BATHYMETRY, names::FINAL_MEASURABILITY)?;

	Ok(SweepReport {
		headings,
		completed,
		failed,
		landability_layer: names::LANDABILITY_BLEND.to_string(),
		measurability_layer: names::FINAL_MEASURABILITY.to_string(),
	})
}

/// Builds the shared kernels, the coverage exclusion map and the coverage
/// contour. Runs once, before any lane.
fn prepare(pipeline: &Pipeline, params: &PipelineParams) -> Result<()> {
	pipeline.create_kernel_template(names::KERNEL_SLOPE, 0.1, 0.1, KernelShape::Ellipse)?;
	let diagonal = params.robot_diagonal();
	pipeline.create_kernel_template(names::KERNEL_DIAG, diagonal, diagonal, KernelShape::Ellipse)?;
	pipeline.create_kernel_template(
		names::KERNEL_AUV,
		params.vehicle.width,
		params.vehicle.length,
		KernelShape::Rect,
	)?;
	pipeline.set_kernel_rotation(names::KERNEL_AUV, params.rotation.rotation)?;

	pipeline.compute_exclusion_map(names::VALID_DATA_MASK, names::KERNEL_AUV, names::EXCLUSION_MAP)?;
	pipeline.extract_contours(names::VALID_DATA_MASK, names::CONTOUR_MASK)?;
	Ok(())
}

/// Processes one heading: footprint kernel, lanes C, D and X in parallel,
/// then the M3/M4 composition.
fn process_rotation(
	pipeline: &Pipeline,
	params: &PipelineParams,
	exclusion_size: &ExclusionSizeFn,
	theta: f64,
	suffix: &str,
	abort: &AtomicBool,
) -> Result<RotationOutcome> {
	if abort.load(Ordering::Relaxed) {
		return Ok(RotationOutcome::Skipped);
	}
	let kernel = format!("{}{suffix}", names::KERNEL_AUV);
	if !pipeline.store().contains(&kernel) {
		pipeline.create_kernel_template(
			&kernel,
			params.vehicle.width,
			params.vehicle.length,
			KernelShape::Rect,
		)?;
	}
	pipeline.set_kernel_rotation(&kernel, theta)?;
	debug!("heading [{theta}] deg: lanes C, D, X");

	let ((c, d), x) = rayon::join(
		|| {
			rayon::join(
				|| lanes::run_lane_c(pipeline, params, suffix),
				|| lanes::run_lane_d(pipeline, params, suffix, exclusion_size),
			)
		},
		|| lanes::run_lane_x(pipeline, params, suffix),
	);
	c?;
	d?;
	x?;

	if abort.load(Ordering::Relaxed) {
		return Ok(RotationOutcome::Skipped);
	}
	lanes::compose_landability(pipeline, suffix)?;
	lanes::compose_measurability(pipeline, suffix)?;
	debug!("heading [{theta}] deg done");
	Ok(RotationOutcome::Completed)
}
