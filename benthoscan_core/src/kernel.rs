use crate::raster::MASK_VALID;
use crate::{CoreError, RasterBuffer, Result, DEFAULT_NODATA};

/// Shape of a binary structuring element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelShape {
	Rect,
	Ellipse,
}

/// Builds a `nrows x ncols` binary structuring element of the given shape.
///
/// The ellipse is fully inscribed in the bounding rectangle; a rectangle is
/// solid ones. Values are 0.0/1.0 with a fully valid mask, since 0 is
/// meaningful kernel data.
pub fn build_structuring_element(shape: KernelShape, nrows: usize, ncols: usize) -> Result<RasterBuffer> {
	if nrows == 0 || ncols == 0 {
		return Err(CoreError::WrongArgument(format!(
			"structuring element dimensions must be positive, got {nrows} x {ncols}"
		)));
	}
	let mut kernel = RasterBuffer::filled(nrows, ncols, 0.0, DEFAULT_NODATA)?;
	match shape {
		KernelShape::Rect => kernel.data.fill(1.0),
		KernelShape::Ellipse => {
			let r0 = (nrows as f64 - 1.0) / 2.0;
			let c0 = (ncols as f64 - 1.0) / 2.0;
			let a = ((ncols as f64 - 1.0) / 2.0).max(0.5);
			let b = ((nrows as f64 - 1.0) / 2.0).max(0.5);
			for r in 0..nrows {
				for c in 0..ncols {
					let dx = (c as f64 - c0) / a;
					let dy = (r as f64 - r0) / b;
					if dx * dx + dy * dy <= 1.0 {
						kernel.data[r * ncols + c] = 1.0;
					}
				}
			}
		}
	}
	kernel.mask.fill(MASK_VALID);
	Ok(kernel)
}

/// Rotates a binary structuring element about its centre.
///
/// The output canvas is the bounding box of the rotated footprint, so no
/// corner of the element is ever clipped. Resampling is nearest-neighbour
/// by inverse mapping; samples above 0.5 become 1. A multiple of 360
/// degrees returns the base unchanged, making rotation by zero an exact
/// identity.
pub fn rotate_structuring_element(base: &RasterBuffer, rotation_deg: f64) -> RasterBuffer {
	if rotation_deg.rem_euclid(360.0) == 0.0 {
		return base.clone();
	}

	// snap right-angle rotations to exact axes; sin_cos noise would
	// otherwise inflate the ceil'ed canvas by a row or column
	let snap = |v: f64| {
		if v.abs() < 1e-12 {
			0.0
		} else if (v.abs() - 1.0).abs() < 1e-12 {
			v.signum()
		} else {
			v
		}
	};
	let theta = rotation_deg.to_radians();
	let (sin, cos) = theta.sin_cos();
	let (sin, cos) = (snap(sin), snap(cos));
	let (w, h) = (base.cols as f64, base.rows as f64);
	let out_cols = (w * cos.abs() + h * sin.abs()).ceil().max(1.0) as usize;
	let out_rows = (w * sin.abs() + h * cos.abs()).ceil().max(1.0) as usize;

	let mut out = RasterBuffer::filled(out_rows, out_cols, 0.0, base.nodata)
		.expect("rotated canvas has positive dimensions");
	out.copy_geo_properties(base);

	let bc = (base.cols as f64 - 1.0) / 2.0;
	let br = (base.rows as f64 - 1.0) / 2.0;
	let oc = (out_cols as f64 - 1.0) / 2.0;
	let or = (out_rows as f64 - 1.0) / 2.0;

	for r in 0..out_rows {
		for c in 0..out_cols {
			let dx = c as f64 - oc;
			let dy = r as f64 - or;
			// inverse rotation back into the base frame
			let sc = (dx * cos + dy * sin + bc).round();
			let sr = (-dx * sin + dy * cos + br).round();
			if sc >= 0.0 && sr >= 0.0 && (sc as usize) < base.cols && (sr as usize) < base.rows {
				let v = base.data[sr as usize * base.cols + sc as usize];
				if v > 0.5 {
					out.data[r * out_cols + c] = 1.0;
				}
			}
		}
	}
	out.mask.fill(MASK_VALID);
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn ones(kernel: &RasterBuffer) -> usize {
		kernel.data.iter().filter(|v| **v > 0.5).count()
	}

	#[test]
	fn rect_is_solid() {
		let k = build_structuring_element(KernelShape::Rect, 3, 5).unwrap();
		assert_eq!(ones(&k), 15);
	}

	#[test]
	fn ellipse_is_inscribed() {
		let k = build_structuring_element(KernelShape::Ellipse, 3, 3).unwrap();
		// 3x3 ellipse degenerates to a cross
		assert_eq!(
			k.data,
			vec![0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0, 0.0]
		);

		let k = build_structuring_element(KernelShape::Ellipse, 7, 7).unwrap();
		assert!(k.data[3 * 7 + 3] > 0.5); // centre
		assert!(k.data[0] < 0.5); // corner stays clear
	}

	#[test]
	fn rejects_empty_element() {
		assert!(build_structuring_element(KernelShape::Rect, 0, 3).is_err());
	}

	#[test]
	fn rotation_by_zero_is_identity() {
		let base = build_structuring_element(KernelShape::Rect, 2, 6).unwrap();
		let rotated = rotate_structuring_element(&base, 0.0);
		assert_eq!(rotated.data, base.data);
		assert_eq!(rotate_structuring_element(&base, 360.0).data, base.data);
	}

	#[test]
	fn rotation_is_deterministic() {
		let base = build_structuring_element(KernelShape::Rect, 3, 9).unwrap();
		let a = rotate_structuring_element(&base, 30.0);
		let b = rotate_structuring_element(&base, 30.0);
		assert_eq!(a.data, b.data);
		assert_eq!(a.rows, b.rows);
	}

	#[test]
	fn rotation_by_90_swaps_dimensions() {
		let base = build_structuring_element(KernelShape::Rect, 2, 6).unwrap();
		let rotated = rotate_structuring_element(&base, 90.0);
		assert_eq!((rotated.rows, rotated.cols), (6, 2));
		assert_eq!(ones(&rotated), 12);
	}

	#[test]
	fn rotation_preserves_footprint_area_roughly() {
		let base = build_structuring_element(KernelShape::Rect, 4, 12).unwrap();
		let rotated = rotate_structuring_element(&base, 45.0);
		// bounding canvas grows, footprint cell count stays in the same ballpark
		assert!(rotated.rows > 4 && rotated.cols > 4);
		let n = ones(&rotated) as f64;
		assert!((n - 48.0).abs() / 48.0 < 0.35);
	}
}
