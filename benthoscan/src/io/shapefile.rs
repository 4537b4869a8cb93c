//! Single-polyline shapefile export via OGR. Compiled with the `gdal`
//! feature.

use benthoscan_core::{CoreError, Result};
use gdal::spatial_ref::SpatialRef;
use gdal::vector::{Geometry, LayerAccess, LayerOptions, OGRwkbGeometryType};
use gdal::DriverManager;
use std::path::Path;

fn ogr_error(path: &Path, error: impl ToString) -> CoreError {
	CoreError::RasterIo {
		path: path.display().to_string(),
		reason: error.to_string(),
	}
}

pub fn write(path: &Path, points: &[(f64, f64)], projection: &str) -> Result<()> {
	let driver =
		DriverManager::get_driver_by_name("ESRI Shapefile").map_err(|e| ogr_error(path, e))?;
	let mut dataset = driver.create_vector_only(path).map_err(|e| ogr_error(path, e))?;

	let srs = if projection.is_empty() {
		None
	} else {
		Some(SpatialRef::from_wkt(projection).map_err(|e| ogr_error(path, e))?)
	};
	let mut layer = dataset
		.create_layer(LayerOptions {
			name: "contour",
			srs: srs.as_ref(),
			ty: OGRwkbGeometryType::wkbLineString,
			..Default::default()
		})
		.map_err(|e| ogr_error(path, e))?;

	let mut geometry =
		Geometry::empty(OGRwkbGeometryType::wkbLineString).map_err(|e| ogr_error(path, e))?;
	for (x, y) in points {
		geometry.add_point_2d((*x, *y));
	}
	layer
		.create_feature(geometry)
		.map_err(|e| ogr_error(path, e))?;
	Ok(())
}
