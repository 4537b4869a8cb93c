//! Lane processors: fixed compositions of operators that materialise the
//! intermediate layers of the processing graph.
//!
//! Lanes A and B are terrain-intrinsic and run once per input; lanes C, D
//! and X depend on the vehicle heading and are replayed per rotation with
//! the `_rNNN` layer-name suffix.

use crate::ops::{arith, morphology};
use crate::{names, CompareOp, ExclusionSizeFn, Pipeline, PipelineParams};
use benthoscan_core::{build_structuring_element, KernelShape, RasterBuffer, Result};
use log::debug;

/// Number of elevation bands partitioning the low-protrusion range.
const LO_PROT_BANDS: usize = 5;

/// Lane A: fine-grained slope of the raw bathymetry and its exclusion
/// mask above the critical slope.
pub fn run_lane_a(pipeline: &Pipeline, params: &PipelineParams) -> Result<()> {
	pipeline.compute_mean_slope_map(
		names::RAW_BATHYMETRY,
		names::KERNEL_SLOPE,
		names::VALID_DATA_MASK,
		names::DETAILED_SLOPE,
	)?;
	pipeline.compare_layer(
		names::DETAILED_SLOPE,
		names::HI_SLOPE_EXCL,
		params.threshold.slope,
		CompareOp::Gt,
	)?;
	debug!("lane A done");
	Ok(())
}

/// Lane B: low-passed bathymetry over the body-diagonal kernel and the
/// residual height above it.
pub fn run_lane_b(pipeline: &Pipeline, _params: &PipelineParams) -> Result<()> {
	pipeline.lowpass_filter(
		names::RAW_BATHYMETRY,
		names::KERNEL_DIAG,
		names::VALID_DATA_MASK,
		names::FILT_BATHYMETRY,
	)?;
	pipeline.compute_height(
		names::RAW_BATHYMETRY,
		names::FILT_BATHYMETRY,
		names::HEIGHT_BATHYMETRY,
	)?;
	pipeline.copy_mask(names::RAW_BATHYMETRY, names::HEIGHT_BATHYMETRY)?;
	debug!("lane B done");
	Ok(())
}

/// M2: height values only where the local slope is steep enough to call
/// them obstacles.
pub fn build_protrusions(pipeline: &Pipeline) -> Result<()> {
	pipeline.mask_layer(
		names::HEIGHT_BATHYMETRY,
		names::HI_SLOPE_EXCL,
		names::PROTRUSIONS,
		false,
	)
}

/// Lane C: mean slope under the heading-rotated footprint and its
/// exclusion mask.
pub fn run_lane_c(pipeline: &Pipeline, params: &PipelineParams, suffix: &str) -> Result<()> {
	pipeline.compute_mean_slope_map(
		names::RAW_BATHYMETRY,
		&format!("{}{suffix}", names::KERNEL_AUV),
		names::VALID_DATA_MASK,
		&format!("{}{suffix}", names::MEAN_SLOPE_MAP),
	)?;
	pipeline.compare_layer(
		&format!("{}{suffix}", names::MEAN_SLOPE_MAP),
		&format!("{}{suffix}", names::MEAN_SLOPE_EXCL),
		params.threshold.slope,
		CompareOp::Gt,
	)?;
	debug!("lane C done for [{suffix}]");
	Ok(())
}

/// Lane X: geotechnical-sensor measurability under the rotated footprint.
pub fn run_lane_x(pipeline: &Pipeline, _params: &PipelineParams, suffix: &str) -> Result<()> {
	pipeline.compute_measurability_map(
		names::RAW_BATHYMETRY,
		&format!("{}{suffix}", names::KERNEL_AUV),
		names::VALID_DATA_MASK,
		&format!("{}{suffix}", names::MEASURABILITY_MAP),
	)?;
	debug!("lane X done for [{suffix}]");
	Ok(())
}

/// Lane D: protrusion exclusion maps.
///
/// High protrusions are dilated by the vehicle footprint. Low protrusions
/// are partitioned into elevation bands; each band-exclusive shell is
/// opened with the minimum-protrusion disk to drop small clusters, then
/// dilated by a disk sized by the exclusion curve at twice the band
/// height, and the shells are unioned into the low-protrusion exclusion
/// map.
pub fn run_lane_d(
	pipeline: &Pipeline,
	params: &PipelineParams,
	suffix: &str,
	exclusion_size: &ExclusionSizeFn,
) -> Result<()> {
	let hi_prot_mask = format!("{}{suffix}", names::HI_PROT_MASK);
	let lo_prot_mask = format!("{}{suffix}", names::LO_PROT_MASK);
	let lo_prot_elev = format!("{}{suffix}", names::LO_PROT_ELEV);
	let tmp_lo = format!("D1_tempLO{suffix}");
	let tmp_gr = format!("D1_tempGR{suffix}");
	let th = &params.threshold;

	pipeline.compare_layer(names::PROTRUSIONS, &hi_prot_mask, th.height, CompareOp::Ge)?;

	// low protrusions: below the critical height but above ground clutter
	pipeline.compare_layer(names::PROTRUSIONS, &tmp_lo, th.height, CompareOp::Lt)?;
	pipeline.compare_layer(names::PROTRUSIONS, &tmp_gr, th.ground, CompareOp::Ge)?;
	pipeline.mask_layer(&tmp_lo, &tmp_gr, &lo_prot_mask, false)?;
	pipeline.mask_layer(names::PROTRUSIONS, &lo_prot_mask, &lo_prot_elev, false)?;
	pipeline.remove_layer(&tmp_gr)?;
	pipeline.remove_layer(&tmp_lo)?;

	let elevations = pipeline.raster(&lo_prot_elev)?;
	let sx = pipeline.geo_transform().pixel_width();
	let sy = pipeline.geo_transform().pixel_height();

	let band_height = |i: usize| th.ground + (i + 1) as f64 * (th.height - th.ground) / LO_PROT_BANDS as f64;
	let bands: Vec<RasterBuffer> = (0..LO_PROT_BANDS)
		.map(|i| arith::compare(&elevations, band_height(i), CompareOp::Ge))
		.collect();

	// filter size cannot be zero
	let open_disk = build_structuring_element(
		KernelShape::Ellipse,
		((th.protrusion_size / sy).ceil() as usize).max(1),
		((th.protrusion_size / sx).ceil() as usize).max(1),
	)?;

	let mut lo_prot_excl = RasterBuffer::like(&elevations);
	lo_prot_excl.data.fill(0.0);
	lo_prot_excl.mask.fill(255);

	for i in 0..LO_PROT_BANDS - 1 {
		let shell = arith::binary_difference(&bands[i], &bands[i + 1])?;
		let shell = morphology::open(&shell, &open_disk);
		let radius = exclusion_size.as_ref()(2.0 * band_height(i));
		let diameter = ((radius / sx).round() as usize).max(1);
		let dilate_disk = build_structuring_element(KernelShape::Ellipse, diameter, diameter)?;
		let shell = morphology::dilate(&shell, &dilate_disk);
		arith::binary_union(&mut lo_prot_excl, &shell)?;
	}
	pipeline.write_raster(&format!("{}{suffix}", names::LO_PROT_EXCL), lo_prot_excl)?;

	// high protrusions: dilate by the heading-rotated vehicle footprint
	let hi_prot = pipeline.raster(&hi_prot_mask)?;
	let footprint = pipeline.kernel_buffer(&format!("{}{suffix}", names::KERNEL_AUV), true)?;
	let hi_prot_excl = format!("{}{suffix}", names::HI_PROT_EXCL);
	pipeline.write_raster(&hi_prot_excl, morphology::dilate(&hi_prot, &footprint))?;
	pipeline.mask_by_coverage(names::EXCLUSION_MAP, &hi_prot_excl)?;
	debug!("lane D done for [{suffix}]");
	Ok(())
}

/// M3 for one heading: landable where no exclusion fires, masked by the
/// coverage exclusion map.
pub fn compose_landability(pipeline: &Pipeline, suffix: &str) -> Result<()> {
	let dst = format!("{}{suffix}", names::LANDABILITY_MAP);
	pipeline.compute_landability_map(
		&format!("{}{suffix}", names::MEAN_SLOPE_EXCL),
		&format!("{}{suffix}", names::LO_PROT_EXCL),
		&format!("{}{suffix}", names::HI_PROT_EXCL),
		&dst,
	)?;
	pipeline.mask_by_coverage(names::EXCLUSION_MAP, &dst)
}

/// M4 for one heading: measurability zeroed outside the landable area.
pub fn compose_measurability(pipeline: &Pipeline, suffix: &str) -> Result<()> {
	pipeline.compute_blend_measurability(
		&format!("{}{suffix}", names::LANDABILITY_MAP),
		&format!("{}{suffix}", names::MEASURABILITY_MAP),
		&format!("{}{suffix}", names::FINAL_MEASURABILITY),
	)
}
