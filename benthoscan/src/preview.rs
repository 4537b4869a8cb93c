//! Coloured PNG previews of raster layers.
//!
//! Valid values are min-max normalised and mapped through a blue-to-red
//! colour ramp; NoData cells come out fully transparent.

use benthoscan_core::{CoreError, RasterBuffer, Result};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// Blue -> cyan -> yellow -> red ramp over `t` in [0, 1].
fn ramp(t: f64) -> Rgba<u8> {
	let t = t.clamp(0.0, 1.0);
	let (r, g, b) = if t < 1.0 / 3.0 {
		let u = 3.0 * t;
		(0.0, u, 1.0)
	} else if t < 2.0 / 3.0 {
		let u = 3.0 * t - 1.0;
		(u, 1.0, 1.0 - u)
	} else {
		let u = 3.0 * t - 2.0;
		(1.0, 1.0 - u, 0.0)
	};
	Rgba([(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8, 255])
}

/// Renders a raster to an RGBA image. With `use_mask` set, invalid cells
/// come out transparent and the normalisation spans only valid values;
/// otherwise every sample is rendered as-is.
pub fn render(raster: &RasterBuffer, use_mask: bool) -> RgbaImage {
	let (lo, hi) = if use_mask {
		raster.valid_range().unwrap_or((0.0, 0.0))
	} else {
		let lo = raster.data.iter().copied().fold(f64::INFINITY, f64::min);
		let hi = raster.data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
		(lo, hi)
	};
	let span = if hi > lo { hi - lo } else { 1.0 };

	RgbaImage::from_fn(raster.cols as u32, raster.rows as u32, |x, y| {
		let i = y as usize * raster.cols + x as usize;
		if use_mask && raster.mask[i] == 0 {
			Rgba([0, 0, 0, 0])
		} else {
			ramp((raster.data[i] - lo) / span)
		}
	})
}

/// Renders a raster and writes it as PNG.
pub fn save_png(path: &Path, raster: &RasterBuffer, use_mask: bool) -> Result<()> {
	render(raster, use_mask).save(path).map_err(|e| CoreError::RasterIo {
		path: path.display().to_string(),
		reason: e.to_string(),
	})
}
