//! Generic windowed filter: mean, plane-fit slope and sensor
//! measurability under a sliding binary kernel.

use benthoscan_core::{fit_plane, plane_slope_deg, RasterBuffer};

/// What to compute from the 3D points retained under the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowFilter {
	/// Arithmetic mean of z.
	Mean,
	/// Acute angle in degrees between the fitted plane normal and the
	/// vertical, in `[0, 90]`.
	Slope,
	/// Cosine agreement between the sensor axis and the terrain normal,
	/// in `[0, 1]`; 1 on flat ground, 0 on a vertical face.
	Measurability,
}

/// Applies the windowed filter to `src`.
///
/// For every output cell: an invalid centre (in `src` or in the global
/// `mask`) yields NoData; otherwise the window of the kernel's size is
/// centred on the cell, clipped at the raster boundary, intersected with
/// the binary kernel and with the validity of `src`, and the surviving
/// cells become points `(col * sx, row * sy, z)`. Fewer than three points
/// yield NoData.
///
/// `sx`/`sy` are the pipeline-level absolute pixel sizes.
pub fn apply_window_filter(
	src: &RasterBuffer,
	kernel: &RasterBuffer,
	mask: &RasterBuffer,
	sx: f64,
	sy: f64,
	filter: WindowFilter,
) -> RasterBuffer {
	let mut out = RasterBuffer::like(src);
	let (rows, cols) = (src.rows as i64, src.cols as i64);
	let (kh, kw) = (kernel.rows as i64, kernel.cols as i64);
	let (ar, ac) = (kh / 2, kw / 2);

	let mut points: Vec<[f64; 3]> = Vec::with_capacity((kh * kw) as usize);

	for row in 0..rows {
		for col in 0..cols {
			let i = (row * cols + col) as usize;
			if src.mask[i] == 0 || mask.mask[i] == 0 || mask.data[i] == 0.0 {
				continue; // stays NoData
			}

			points.clear();
			for kr in 0..kh {
				let wr = row + kr - ar;
				if wr < 0 || wr >= rows {
					continue;
				}
				for kc in 0..kw {
					let wc = col + kc - ac;
					if wc < 0 || wc >= cols {
						continue;
					}
					if kernel.data[(kr * kw + kc) as usize] <= 0.5 {
						continue;
					}
					let wi = (wr * cols + wc) as usize;
					if src.mask[wi] != 0 {
						points.push([wc as f64 * sx, wr as f64 * sy, src.data[wi]]);
					}
				}
			}

			if points.len() < 3 {
				continue;
			}

			let value = match filter {
				WindowFilter::Mean => {
					points.iter().map(|p| p[2]).sum::<f64>() / points.len() as f64
				}
				WindowFilter::Slope => fit_plane(&points).map_or(90.0, |p| plane_slope_deg(&p)),
				WindowFilter::Measurability => fit_plane(&points)
					.map_or(0.0, |p| plane_slope_deg(&p).to_radians().cos().clamp(0.0, 1.0)),
			};
			out.set(row as usize, col as usize, value);
		}
	}
	out
}

/// Direct box-mean low-pass filter over a `w x h` window with mask-aware
/// renormalisation: `sum(valid) / count(valid)`. NoData where the centre
/// cell is invalid.
pub fn box_mean(src: &RasterBuffer, w: usize, h: usize) -> RasterBuffer {
	let mut out = RasterBuffer::like(src);
	let (rows, cols) = (src.rows as i64, src.cols as i64);
	let (ar, ac) = (h as i64 / 2, w as i64 / 2);

	for row in 0..rows {
		for col in 0..cols {
			if src.mask[(row * cols + col) as usize] == 0 {
				continue;
			}
			let mut sum = 0.0;
			let mut count = 0usize;
			for wr in (row - ar).max(0)..=(row + ar).min(rows - 1) {
				for wc in (col - ac).max(0)..=(col + ac).min(cols - 1) {
					let wi = (wr * cols + wc) as usize;
					if src.mask[wi] != 0 {
						sum += src.data[wi];
						count += 1;
					}
				}
			}
			out.set(row as usize, col as usize, sum / count as f64);
		}
	}
	out
}
