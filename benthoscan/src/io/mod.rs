//! Raster and vector I/O adapters.
//!
//! The built-in raster format is the single-band ESRI ASCII grid, which
//! needs no native libraries; GeoTIFF support comes with the optional
//! `gdal` cargo feature. Vector layers are written as CSV polylines in
//! world coordinates.

mod ascii_grid;
#[cfg(feature = "gdal")]
mod geotiff;
#[cfg(feature = "gdal")]
mod shapefile;

use benthoscan_core::{CoreError, RasterBuffer, Result};
use std::io::Write;
use std::path::Path;

fn io_error(path: &Path, reason: impl ToString) -> CoreError {
	CoreError::RasterIo {
		path: path.display().to_string(),
		reason: reason.to_string(),
	}
}

/// Reads a single-band georeferenced raster, deriving the valid-data mask
/// from the file's NoData sentinel.
pub fn read_raster(path: &Path) -> Result<RasterBuffer> {
	match extension(path) {
		"asc" => ascii_grid::read(path),
		#[cfg(feature = "gdal")]
		"tif" | "tiff" => geotiff::read(path),
		other => Err(io_error(
			path,
			format!("unsupported raster format '.{other}' (supported: .asc{})", gdal_hint()),
		)),
	}
}

/// Writes a single-band raster. When `nodata` is given, invalid cells are
/// re-stamped with that sentinel on the way out.
pub fn write_raster(path: &Path, raster: &RasterBuffer, nodata: Option<f64>) -> Result<()> {
	let rewritten;
	let raster = match nodata {
		Some(sentinel) if sentinel != raster.nodata => {
			let mut out = raster.clone();
			out.nodata = sentinel;
			for (v, m) in out.data.iter_mut().zip(&out.mask) {
				if *m == 0 {
					*v = sentinel;
				}
			}
			rewritten = out;
			&rewritten
		}
		_ => raster,
	};

	match extension(path) {
		"asc" => ascii_grid::write(path, raster),
		#[cfg(feature = "gdal")]
		"tif" | "tiff" => geotiff::write(path, raster),
		other => Err(io_error(
			path,
			format!("unsupported raster format '.{other}' (supported: .asc{})", gdal_hint()),
		)),
	}
}

/// Writes a polyline of world-coordinate vertices, dispatching on the
/// extension: `.csv` with an `X, Y` header, or a single-polyline `.shp`
/// shapefile with the `gdal` feature.
pub fn write_polyline(
	path: &Path,
	points: &[(f64, f64)],
	#[allow(unused_variables)] projection: &str,
) -> Result<()> {
	match extension(path) {
		"csv" => write_polyline_csv(path, points),
		#[cfg(feature = "gdal")]
		"shp" => shapefile::write(path, points, projection),
		other => Err(io_error(
			path,
			format!("unsupported vector format '.{other}' (supported: .csv{})", shp_hint()),
		)),
	}
}

/// Writes world-coordinate vertices as CSV with an `X, Y` header.
pub fn write_polyline_csv(path: &Path, points: &[(f64, f64)]) -> Result<()> {
	let mut file = std::fs::File::create(path).map_err(|e| io_error(path, e))?;
	writeln!(file, "X, Y").map_err(|e| io_error(path, e))?;
	for (x, y) in points {
		writeln!(file, "{x}, {y}").map_err(|e| io_error(path, e))?;
	}
	Ok(())
}

fn extension(path: &Path) -> &str {
	path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

fn gdal_hint() -> &'static str {
	if cfg!(feature = "gdal") {
		", .tif, .tiff"
	} else {
		"; rebuild with --features gdal for .tif"
	}
}

fn shp_hint() -> &'static str {
	if cfg!(feature = "gdal") {
		", .shp"
	} else {
		"; rebuild with --features gdal for .shp"
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use benthoscan_core::GeoTransform;

	#[test]
	fn round_trip_preserves_data_and_mask() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("grid.asc");

		let mut raster = RasterBuffer::from_fn(3, 4, -9999.0, |r, c| {
			if (r, c) == (1, 2) {
				-9999.0
			} else {
				-10.0 - r as f64 - 0.25 * c as f64
			}
		})
		.unwrap();
		raster.geo_transform = GeoTransform::new(500.0, 2.0, 8000.0, -2.0).unwrap();

		write_raster(&path, &raster, None).unwrap();
		let read_back = read_raster(&path).unwrap();

		assert_eq!(read_back.rows, 3);
		assert_eq!(read_back.cols, 4);
		assert_eq!(read_back.data, raster.data);
		assert_eq!(read_back.mask, raster.mask);
		assert_eq!(read_back.geo_transform, raster.geo_transform);
	}

	#[test]
	fn nodata_can_be_reset_on_write() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("grid.asc");

		let mut raster = RasterBuffer::filled(2, 2, -10.0, -9999.0).unwrap();
		raster.set_nodata(0, 0);
		write_raster(&path, &raster, Some(-32767.0)).unwrap();

		let read_back = read_raster(&path).unwrap();
		assert_eq!(read_back.nodata, -32767.0);
		assert!(!read_back.is_valid(0, 0));
		assert_eq!(read_back.get(1, 1), -10.0);
	}

	#[test]
	fn unsupported_extension_is_an_io_error() {
		let err = read_raster(Path::new("depth.xyz")).unwrap_err();
		assert!(matches!(err, CoreError::RasterIo { .. }));
	}

	#[test]
	fn polyline_is_written_with_header() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("contour.csv");

		write_polyline(&path, &[(101.0, 49.0), (107.0, 47.0)], "").unwrap();
		let text = std::fs::read_to_string(&path).unwrap();
		let lines: Vec<&str> = text.lines().collect();
		assert_eq!(lines[0], "X, Y");
		assert_eq!(lines[1], "101, 49");
		assert_eq!(lines[2], "107, 47");

		assert!(write_polyline(Path::new("contour.geojson"), &[], "").is_err());
	}
}
