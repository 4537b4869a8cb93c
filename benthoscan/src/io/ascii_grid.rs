//! ESRI ASCII grid reader/writer.
//!
//! Plain-text single-band format: a six-line header (`ncols`, `nrows`,
//! `xllcorner`, `yllcorner`, `cellsize`, `nodata_value`) followed by the
//! samples, top row first. The y axis points down in pixel space, so the
//! geo-transform carries a negative pixel height.

use benthoscan_core::{CoreError, GeoTransform, RasterBuffer, Result};
use std::io::Write;
use std::path::Path;

fn bad_file(path: &Path, reason: impl ToString) -> CoreError {
	CoreError::RasterIo {
		path: path.display().to_string(),
		reason: reason.to_string(),
	}
}

pub fn read(path: &Path) -> Result<RasterBuffer> {
	let text = std::fs::read_to_string(path).map_err(|e| bad_file(path, e))?;
	let mut tokens = text.split_whitespace();

	let mut ncols = None;
	let mut nrows = None;
	let mut xllcorner = 0.0;
	let mut yllcorner = 0.0;
	let mut cellsize = 1.0;
	let mut nodata = -9999.0;

	// header: keyword/value pairs until the first bare number
	let first_value = loop {
		let token = tokens
			.next()
			.ok_or_else(|| bad_file(path, "missing raster samples"))?;
		if let Ok(number) = token.parse::<f64>() {
			break number;
		}
		let value: f64 = tokens
			.next()
			.ok_or_else(|| bad_file(path, format!("header key '{token}' has no value")))?
			.parse()
			.map_err(|e| bad_file(path, format!("header key '{token}': {e}")))?;
		match token.to_ascii_lowercase().as_str() {
			"ncols" => ncols = Some(value as usize),
			"nrows" => nrows = Some(value as usize),
			"xllcorner" => xllcorner = value,
			"yllcorner" => yllcorner = value,
			"cellsize" => cellsize = value,
			"nodata_value" => nodata = value,
			other => return Err(bad_file(path, format!("unknown header key '{other}'"))),
		}
	};

	let cols = ncols.ok_or_else(|| bad_file(path, "header is missing 'ncols'"))?;
	let rows = nrows.ok_or_else(|| bad_file(path, "header is missing 'nrows'"))?;
	if cellsize <= 0.0 {
		return Err(bad_file(path, format!("cellsize must be positive, got {cellsize}")));
	}

	let mut data = Vec::with_capacity(rows * cols);
	data.push(first_value);
	for token in tokens {
		data.push(
			token
				.parse::<f64>()
				.map_err(|e| bad_file(path, format!("bad sample '{token}': {e}")))?,
		);
	}
	if data.len() != rows * cols {
		return Err(bad_file(
			path,
			format!("expected {} samples, found {}", rows * cols, data.len()),
		));
	}

	let mut raster = RasterBuffer::new(rows, cols, nodata)
		.map_err(|e| bad_file(path, e))?;
	raster.data = data;
	raster.update_mask();
	// top-left origin, y axis pointing down
	raster.geo_transform =
		GeoTransform::new(xllcorner, cellsize, yllcorner + rows as f64 * cellsize, -cellsize)
			.map_err(|e| bad_file(path, e))?;
	Ok(raster)
}

pub fn write(path: &Path, raster: &RasterBuffer) -> Result<()> {
	let gt = &raster.geo_transform;
	if gt.pixel_width() != gt.pixel_height() {
		return Err(bad_file(
			path,
			format!(
				"ascii grids need square pixels, got {} x {}",
				gt.pixel_width(),
				gt.pixel_height()
			),
		));
	}
	let cellsize = gt.pixel_width();
	let yllcorner = if gt.0[5] < 0.0 {
		gt.origin_y() - raster.rows as f64 * cellsize
	} else {
		gt.origin_y()
	};

	let mut out = String::new();
	out.push_str(&format!("ncols {}\n", raster.cols));
	out.push_str(&format!("nrows {}\n", raster.rows));
	out.push_str(&format!("xllcorner {}\n", gt.origin_x()));
	out.push_str(&format!("yllcorner {yllcorner}\n"));
	out.push_str(&format!("cellsize {cellsize}\n"));
	out.push_str(&format!("nodata_value {}\n", raster.nodata));
	for row in 0..raster.rows {
		let line = raster.data[row * raster.cols..(row + 1) * raster.cols]
			.iter()
			.map(ToString::to_string)
			.collect::<Vec<_>>()
			.join(" ");
		out.push_str(&line);
		out.push('\n');
	}

	let mut file = std::fs::File::create(path).map_err(|e| bad_file(path, e))?;
	file.write_all(out.as_bytes()).map_err(|e| bad_file(path, e))
}
