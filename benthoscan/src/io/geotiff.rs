//! GeoTIFF adapter backed by GDAL. Compiled with the `gdal` feature.

use benthoscan_core::{CoreError, GeoTransform, RasterBuffer, Result};
use gdal::raster::Buffer;
use gdal::{Dataset, DriverManager};
use std::path::Path;

fn gdal_error(path: &Path, error: impl ToString) -> CoreError {
	CoreError::RasterIo {
		path: path.display().to_string(),
		reason: error.to_string(),
	}
}

pub fn read(path: &Path) -> Result<RasterBuffer> {
	let dataset = Dataset::open(path).map_err(|e| gdal_error(path, e))?;
	let transform = dataset.geo_transform().map_err(|e| gdal_error(path, e))?;
	let projection = dataset.projection();

	let band = dataset.rasterband(1).map_err(|e| gdal_error(path, e))?;
	let (cols, rows) = band.size();
	let nodata = band.no_data_value().unwrap_or(-9999.0);
	let buffer = band
		.read_as::<f64>((0, 0), (cols, rows), (cols, rows), None)
		.map_err(|e| gdal_error(path, e))?;

	let mut raster = RasterBuffer::new(rows, cols, nodata).map_err(|e| gdal_error(path, e))?;
	raster.data = buffer.data().to_vec();
	raster.update_mask();
	raster.geo_transform = GeoTransform(transform);
	raster.projection_wkt = projection;
	Ok(raster)
}

pub fn write(path: &Path, raster: &RasterBuffer) -> Result<()> {
	let driver = DriverManager::get_driver_by_name("GTiff").map_err(|e| gdal_error(path, e))?;
	let mut dataset = driver
		.create_with_band_type::<f64, _>(path, raster.cols, raster.rows, 1)
		.map_err(|e| gdal_error(path, e))?;

	dataset
		.set_geo_transform(&raster.geo_transform.0)
		.map_err(|e| gdal_error(path, e))?;
	if !raster.projection_wkt.is_empty() {
		dataset
			.set_projection(&raster.projection_wkt)
			.map_err(|e| gdal_error(path, e))?;
	}

	let mut band = dataset.rasterband(1).map_err(|e| gdal_error(path, e))?;
	band.set_no_data_value(Some(raster.nodata))
		.map_err(|e| gdal_error(path, e))?;
	let mut buffer = Buffer::new((raster.cols, raster.rows), raster.data.clone());
	band.write((0, 0), (raster.cols, raster.rows), &mut buffer)
		.map_err(|e| gdal_error(path, e))?;
	Ok(())
}
