//! Rasterisation of an analytic plane over a template grid.

use benthoscan_core::{CoreError, Plane, RasterBuffer, Result};

/// Emits `z = -(a*x + b*y + d) / c` at every pixel of the template grid,
/// with `x = col * sx` and `y = row * sy`. A plane with `c == 0` has no
/// z-solution and is refused.
pub fn generate_plane_map(plane: &Plane, template: &RasterBuffer, sx: f64, sy: f64) -> Result<RasterBuffer> {
	if plane.c == 0.0 {
		return Err(CoreError::NumericDegenerate(format!(
			"plane ({}, {}, {}, {}) has a null z coefficient",
			plane.a, plane.b, plane.c, plane.d
		)));
	}
	let mut out = RasterBuffer::like(template);
	for row in 0..out.rows {
		let y = row as f64 * sy;
		for col in 0..out.cols {
			out.set(row, col, plane.z_at(col as f64 * sx, y));
		}
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	#[test]
	fn rasterises_the_plane_equation() {
		let template = RasterBuffer::new(4, 4, -9999.0).unwrap();
		// z = 2x - y + 3
		let plane = Plane {
			a: 2.0,
			b: -1.0,
			c: -1.0,
			d: 3.0,
		};
		let out = generate_plane_map(&plane, &template, 0.5, 0.5).unwrap();
		assert_abs_diff_eq!(out.get(0, 0), 3.0);
		assert_abs_diff_eq!(out.get(2, 3), 2.0 * 1.5 - 1.0 + 3.0);
		assert_eq!(out.valid_count(), 16);
	}

	#[test]
	fn vertical_plane_is_degenerate() {
		let template = RasterBuffer::new(2, 2, -9999.0).unwrap();
		let plane = Plane {
			a: 1.0,
			b: 0.0,
			c: 0.0,
			d: 0.0,
		};
		assert!(matches!(
			generate_plane_map(&plane, &template, 1.0, 1.0),
			Err(CoreError::NumericDegenerate(_))
		));
	}
}
