//! External contour extraction from binary rasters.

use benthoscan_core::{CoreError, RasterBuffer, Result};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::image::GrayImage;

/// Finds the external contours of a binary raster and returns the single
/// longest one (by point count) as pixel-space vertices.
///
/// Disconnected bathymetries are not expected, so the longest outer ring
/// is taken to be the coverage boundary.
pub fn longest_external_contour(src: &RasterBuffer) -> Result<Vec<(f64, f64)>> {
	let image = GrayImage::from_fn(src.cols as u32, src.rows as u32, |x, y| {
		let i = y as usize * src.cols + x as usize;
		let set = src.mask[i] != 0 && src.data[i] != 0.0;
		imageproc::image::Luma([if set { 255u8 } else { 0u8 }])
	});

	let contours: Vec<Contour<i32>> = find_contours(&image);
	let longest = contours
		.iter()
		.filter(|c| c.border_type == BorderType::Outer)
		.max_by_key(|c| c.points.len())
		.ok_or_else(|| CoreError::ContoursNotFound("binary raster".to_string()))?;

	Ok(longest
		.points
		.iter()
		.map(|p| (f64::from(p.x), f64::from(p.y)))
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_raster_has_no_contours() {
		let src = RasterBuffer::from_fn(8, 8, -9999.0, |_, _| 0.0).unwrap();
		assert!(matches!(
			longest_external_contour(&src),
			Err(CoreError::ContoursNotFound(_))
		));
	}

	#[test]
	fn picks_the_longest_outer_ring() {
		// a 4x4 block and a lone pixel
		let src = RasterBuffer::from_fn(10, 10, -9999.0, |r, c| {
			if (2..6).contains(&r) && (2..6).contains(&c) || (r, c) == (8, 8) {
				255.0
			} else {
				0.0
			}
		})
		.unwrap();

		let contour = longest_external_contour(&src).unwrap();
		assert!(contour.len() > 4);
		for (x, y) in &contour {
			assert!((2.0..6.0).contains(x));
			assert!((2.0..6.0).contains(y));
		}
	}
}
