use crate::io;
use anyhow::Result;
use std::path::PathBuf;

#[derive(clap::Args, Debug)]
pub struct Subcommand {
	/// Input bathymetry raster (.asc; .tif with the gdal feature)
	input: PathBuf,
}

pub fn run(args: &Subcommand) -> Result<()> {
	let raster = io::read_raster(&args.input)?;
	let gt = raster.geo_transform;
	let valid = raster.valid_count();
	let total = raster.rows * raster.cols;

	println!("file:       {}", args.input.display());
	println!("size:       {} x {} cells", raster.cols, raster.rows);
	println!("pixel:      {} x {} m", gt.pixel_width(), gt.pixel_height());
	println!("origin:     ({}, {})", gt.origin_x(), gt.origin_y());
	println!("nodata:     {}", raster.nodata);
	println!(
		"valid:      {valid} / {total} cells ({:.1} %)",
		100.0 * valid as f64 / total as f64
	);
	if let Some((lo, hi)) = raster.valid_range() {
		println!("range:      [{lo}, {hi}] m");
	}
	if !raster.projection_wkt.is_empty() {
		println!("projection: {}", raster.projection_wkt);
	}
	Ok(())
}
