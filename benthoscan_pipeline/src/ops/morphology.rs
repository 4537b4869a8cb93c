//! Binary morphology with arbitrary structuring elements.
//!
//! Inputs are interpreted as binary images: a cell participates when it is
//! valid and non-zero. Outputs are 0/255 rasters with a fully valid mask,
//! since both states are meaningful data. Cells outside the raster count
//! as foreground for erosion and background for dilation, so a fully set
//! map survives erosion intact while dilation never bleeds in from the
//! border.

use benthoscan_core::RasterBuffer;

const SET: f64 = 255.0;

#[inline]
fn is_set(raster: &RasterBuffer, row: i64, col: i64) -> bool {
	if row < 0 || col < 0 || row >= raster.rows as i64 || col >= raster.cols as i64 {
		return false;
	}
	let i = row as usize * raster.cols + col as usize;
	raster.mask[i] != 0 && raster.data[i] != 0.0
}

fn binary_like(src: &RasterBuffer) -> RasterBuffer {
	let mut out = RasterBuffer::like(src);
	out.data.fill(0.0);
	out.mask.fill(255);
	out
}

/// Erosion: a cell stays set only when every kernel cell inside the
/// raster lands on a set source cell.
pub fn erode(src: &RasterBuffer, kernel: &RasterBuffer) -> RasterBuffer {
	let mut out = binary_like(src);
	let (rows, cols) = (src.rows as i64, src.cols as i64);
	let (kh, kw) = (kernel.rows as i64, kernel.cols as i64);
	let (ar, ac) = (kh / 2, kw / 2);

	for row in 0..rows {
		'cell: for col in 0..cols {
			for kr in 0..kh {
				for kc in 0..kw {
					let (sr, sc) = (row + kr - ar, col + kc - ac);
					if sr < 0 || sc < 0 || sr >= rows || sc >= cols {
						continue;
					}
					if kernel.data[(kr * kw + kc) as usize] > 0.5 && !is_set(src, sr, sc) {
						continue 'cell;
					}
				}
			}
			out.data[row as usize * src.cols + col as usize] = SET;
		}
	}
	out
}

/// Dilation: a cell becomes set when any reflected kernel cell lands on a
/// set source cell.
pub fn dilate(src: &RasterBuffer, kernel: &RasterBuffer) -> RasterBuffer {
	let mut out = binary_like(src);
	let (kh, kw) = (kernel.rows as i64, kernel.cols as i64);
	let (ar, ac) = (kh / 2, kw / 2);

	for row in 0..src.rows as i64 {
		'cell: for col in 0..src.cols as i64 {
			for kr in 0..kh {
				for kc in 0..kw {
					if kernel.data[(kr * kw + kc) as usize] > 0.5
						&& is_set(src, row + kr - ar, col + kc - ac)
					{
						out.data[row as usize * src.cols + col as usize] = SET;
						continue 'cell;
					}
				}
			}
		}
	}
	out
}

/// Opening: erosion followed by dilation; removes clusters smaller than
/// the structuring element.
pub fn open(src: &RasterBuffer, kernel: &RasterBuffer) -> RasterBuffer {
	dilate(&erode(src, kernel), kernel)
}

#[cfg(test)]
mod tests {
	use super::*;
	use benthoscan_core::{build_structuring_element, KernelShape};

	fn binary(rows: usize, cols: usize, set: &[(usize, usize)]) -> RasterBuffer {
		let mut raster = RasterBuffer::filled(rows, cols, 0.0, -9999.0).unwrap();
		for (r, c) in set {
			raster.data[r * cols + c] = 255.0;
		}
		raster
	}

	fn set_cells(raster: &RasterBuffer) -> Vec<(usize, usize)> {
		let mut cells = Vec::new();
		for r in 0..raster.rows {
			for c in 0..raster.cols {
				if raster.data[r * raster.cols + c] != 0.0 {
					cells.push((r, c));
				}
			}
		}
		cells
	}

	#[test]
	fn erode_keeps_fully_covered_cells() {
		let src = binary(5, 5, &[(1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 3), (3, 1), (3, 2), (3, 3)]);
		let kernel = build_structuring_element(KernelShape::Rect, 3, 3).unwrap();
		assert_eq!(set_cells(&erode(&src, &kernel)), vec![(2, 2)]);
	}

	#[test]
	fn erode_keeps_full_coverage_at_border() {
		let mut src = RasterBuffer::filled(4, 4, 255.0, -9999.0).unwrap();
		src.update_mask();
		let kernel = build_structuring_element(KernelShape::Rect, 3, 3).unwrap();
		let out = erode(&src, &kernel);
		assert_eq!(set_cells(&out).len(), 16);
	}

	#[test]
	fn dilate_grows_by_kernel() {
		let src = binary(5, 5, &[(2, 2)]);
		let kernel = build_structuring_element(KernelShape::Rect, 3, 3).unwrap();
		let out = dilate(&src, &kernel);
		assert_eq!(set_cells(&out).len(), 9);
		assert!(set_cells(&out).contains(&(1, 1)));
	}

	#[test]
	fn open_removes_small_clusters() {
		// one isolated cell and one 3x3 block
		let mut cells = vec![(0, 4)];
		for r in 2..5 {
			for c in 0..3 {
				cells.push((r, c));
			}
		}
		let src = binary(6, 6, &cells);
		let kernel = build_structuring_element(KernelShape::Rect, 3, 3).unwrap();
		let out = open(&src, &kernel);
		let kept = set_cells(&out);
		assert!(!kept.contains(&(0, 4)));
		assert!(kept.contains(&(3, 1)));
	}

	#[test]
	fn invalid_cells_count_as_background() {
		let mut src = binary(3, 3, &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0), (2, 1), (2, 2)]);
		src.set_nodata(1, 1);
		let kernel = build_structuring_element(KernelShape::Rect, 3, 3).unwrap();
		assert!(set_cells(&erode(&src, &kernel)).is_empty());
	}
}
