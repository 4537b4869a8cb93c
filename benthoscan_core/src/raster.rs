use crate::{CoreError, GeoTransform, Result};

/// Two-dimensional grid of `f64` samples with a per-cell valid-data mask.
///
/// The mask and the NoData sentinel are two views of the same information:
/// a cell is invalid exactly when its value equals `nodata`. Every mutating
/// operator is required to keep the two in sync, either by writing value
/// and mask together or by calling [`RasterBuffer::update_mask`] once it is
/// done.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterBuffer {
	pub rows: usize,
	pub cols: usize,
	pub data: Vec<f64>,
	pub mask: Vec<u8>,
	pub nodata: f64,
	pub geo_transform: GeoTransform,
	pub projection_wkt: String,
}

pub const MASK_VALID: u8 = 255;

impl RasterBuffer {
	/// Creates a buffer with every cell set to the NoData sentinel.
	pub fn new(rows: usize, cols: usize, nodata: f64) -> Result<RasterBuffer> {
		Self::filled(rows, cols, nodata, nodata)
	}

	/// Creates a buffer with every cell set to `value`.
	pub fn filled(rows: usize, cols: usize, value: f64, nodata: f64) -> Result<RasterBuffer> {
		if rows == 0 || cols == 0 {
			return Err(CoreError::WrongArgument(format!(
				"raster dimensions must be positive, got {rows} x {cols}"
			)));
		}
		let valid = if value == nodata { 0 } else { MASK_VALID };
		Ok(RasterBuffer {
			rows,
			cols,
			data: vec![value; rows * cols],
			mask: vec![valid; rows * cols],
			nodata,
			geo_transform: GeoTransform::default(),
			projection_wkt: String::new(),
		})
	}

	/// Creates an all-NoData buffer with the shape and geo properties of `other`.
	pub fn like(other: &RasterBuffer) -> RasterBuffer {
		let mut out = RasterBuffer::new(other.rows, other.cols, other.nodata)
			.expect("source raster has positive dimensions");
		out.copy_geo_properties(other);
		out
	}

	/// Builds a buffer from a closure, deriving the mask from the sentinel.
	pub fn from_fn(
		rows: usize,
		cols: usize,
		nodata: f64,
		f: impl Fn(usize, usize) -> f64,
	) -> Result<RasterBuffer> {
		let mut out = RasterBuffer::new(rows, cols, nodata)?;
		for r in 0..rows {
			for c in 0..cols {
				out.data[r * cols + c] = f(r, c);
			}
		}
		out.update_mask();
		Ok(out)
	}

	#[inline]
	pub fn index(&self, row: usize, col: usize) -> usize {
		debug_assert!(row < self.rows && col < self.cols);
		row * self.cols + col
	}

	#[inline]
	pub fn get(&self, row: usize, col: usize) -> f64 {
		self.data[self.index(row, col)]
	}

	#[inline]
	pub fn is_valid(&self, row: usize, col: usize) -> bool {
		self.mask[self.index(row, col)] != 0
	}

	/// Returns the value at `(row, col)`, or `None` for invalid cells.
	#[inline]
	pub fn get_masked(&self, row: usize, col: usize) -> Option<f64> {
		let i = self.index(row, col);
		(self.mask[i] != 0).then(|| self.data[i])
	}

	/// Writes a valid value, updating the mask.
	#[inline]
	pub fn set(&mut self, row: usize, col: usize, value: f64) {
		let i = self.index(row, col);
		self.data[i] = value;
		self.mask[i] = if value == self.nodata { 0 } else { MASK_VALID };
	}

	/// Marks a cell invalid by stamping the sentinel.
	#[inline]
	pub fn set_nodata(&mut self, row: usize, col: usize) {
		let i = self.index(row, col);
		self.data[i] = self.nodata;
		self.mask[i] = 0;
	}

	/// Recomputes the whole mask from the sentinel.
	pub fn update_mask(&mut self) {
		let nodata = self.nodata;
		for (m, v) in self.mask.iter_mut().zip(&self.data) {
			*m = if *v == nodata { 0 } else { MASK_VALID };
		}
	}

	/// Copies geo-transform and projection from another buffer. No data is copied.
	pub fn copy_geo_properties(&mut self, other: &RasterBuffer) {
		self.geo_transform = other.geo_transform;
		self.projection_wkt = other.projection_wkt.clone();
	}

	/// Number of valid cells.
	pub fn valid_count(&self) -> usize {
		self.mask.iter().filter(|m| **m != 0).count()
	}

	/// Minimum and maximum over valid cells, or `None` when fully masked.
	pub fn valid_range(&self) -> Option<(f64, f64)> {
		let mut range: Option<(f64, f64)> = None;
		for (v, m) in self.data.iter().zip(&self.mask) {
			if *m != 0 {
				let (lo, hi) = range.get_or_insert((*v, *v));
				*lo = lo.min(*v);
				*hi = hi.max(*v);
			}
		}
		range
	}

	/// Projects cells selected by `patch_mask` into 3D points
	/// `(col * sx, row * sy, z)`, where `sx`/`sy` are the absolute pixel
	/// sizes of this buffer's geo-transform. Cells that are invalid in the
	/// buffer itself are skipped regardless of the patch mask.
	pub fn to_point_list(&self, patch_mask: &[u8]) -> Result<Vec<[f64; 3]>> {
		if patch_mask.len() != self.data.len() {
			return Err(CoreError::WrongArgument(format!(
				"patch mask has {} cells, raster has {}",
				patch_mask.len(),
				self.data.len()
			)));
		}
		let sx = self.geo_transform.pixel_width();
		let sy = self.geo_transform.pixel_height();
		let mut points = Vec::new();
		for row in 0..self.rows {
			for col in 0..self.cols {
				let i = row * self.cols + col;
				if patch_mask[i] != 0 && self.mask[i] != 0 {
					points.push([col as f64 * sx, row as f64 * sy, self.data[i]]);
				}
			}
		}
		Ok(points)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_empty_dimensions() {
		assert!(RasterBuffer::new(0, 4, -9999.0).is_err());
		assert!(RasterBuffer::new(4, 0, -9999.0).is_err());
	}

	#[test]
	fn mask_tracks_sentinel() {
		let mut raster = RasterBuffer::filled(4, 4, -10.0, -9999.0).unwrap();
		assert_eq!(raster.valid_count(), 16);

		raster.set(1, 2, -9999.0);
		assert!(!raster.is_valid(1, 2));
		assert_eq!(raster.get_masked(1, 2), None);

		raster.set(1, 2, -8.5);
		assert!(raster.is_valid(1, 2));
		assert_eq!(raster.get_masked(1, 2), Some(-8.5));

		// mask is derivable from data + sentinel
		raster.data[5] = -9999.0;
		raster.update_mask();
		assert_eq!(raster.valid_count(), 15);
		for i in 0..raster.data.len() {
			assert_eq!(raster.mask[i] != 0, raster.data[i] != raster.nodata);
		}
	}

	#[test]
	fn like_inherits_geo_properties() {
		let mut src = RasterBuffer::filled(3, 5, 1.0, -9999.0).unwrap();
		src.geo_transform = GeoTransform::new(10.0, 0.25, 20.0, -0.25).unwrap();
		src.projection_wkt = "LOCAL_CS[\"test\"]".to_string();

		let dst = RasterBuffer::like(&src);
		assert_eq!(dst.rows, 3);
		assert_eq!(dst.cols, 5);
		assert_eq!(dst.valid_count(), 0);
		assert_eq!(dst.geo_transform, src.geo_transform);
		assert_eq!(dst.projection_wkt, src.projection_wkt);
	}

	#[test]
	fn point_list_skips_masked_cells() {
		let mut raster = RasterBuffer::from_fn(2, 2, -9999.0, |r, c| (r * 2 + c) as f64).unwrap();
		raster.geo_transform = GeoTransform::new(0.0, 2.0, 0.0, -1.0).unwrap();
		raster.set_nodata(0, 1);

		let patch = vec![255u8; 4];
		let points = raster.to_point_list(&patch).unwrap();
		assert_eq!(
			points,
			vec![[0.0, 0.0, 0.0], [0.0, 1.0, 2.0], [2.0, 1.0, 3.0]]
		);

		// patch mask filters on top of the validity mask
		let patch = vec![0u8, 0, 0, 255];
		let points = raster.to_point_list(&patch).unwrap();
		assert_eq!(points, vec![[2.0, 1.0, 3.0]]);

		assert!(raster.to_point_list(&[255u8; 3]).is_err());
	}
}
