use crate::{config::ConfigFile, io, preview};
use anyhow::{Context, Result};
use benthoscan_core::CoordinateSpace;
use benthoscan_pipeline::{
	default_exclusion_size, heading_suffix, names, scheduler, Pipeline, PipelineParams, SweepReport,
};
use log::info;
use std::path::{Path, PathBuf};

#[derive(clap::Args, Debug)]
pub struct Subcommand {
	/// Input bathymetry raster (.asc; .tif with the gdal feature)
	input: PathBuf,

	/// Output basename used as prefix of all exported layers
	#[arg(short, long, default_value = "")]
	output: String,

	/// YAML configuration file
	#[arg(long)]
	config: Option<PathBuf>,

	/// Robot width in metres
	#[arg(long)]
	robot_width: Option<f64>,

	/// Robot length in metres
	#[arg(long)]
	robot_length: Option<f64>,

	/// Robot height in metres
	#[arg(long)]
	robot_height: Option<f64>,

	/// Metacentre height ratio
	#[arg(long)]
	meta: Option<f64>,

	/// Slope threshold in degrees
	#[arg(long)]
	slope_th: Option<f64>,

	/// Critical obstacle height in metres
	#[arg(long)]
	height_th: Option<f64>,

	/// Minimum obstacle height in metres
	#[arg(long)]
	ground_th: Option<f64>,

	/// Minimum protrusion size in metres
	#[arg(long)]
	prot_size: Option<f64>,

	/// Fix the vehicle heading to a single value in degrees
	#[arg(long)]
	rotation: Option<f64>,

	/// Recompute slope and height thresholds from the vehicle geometry
	#[arg(long)]
	update_threshold: bool,

	/// Worker-thread cap for the rotation sweep; 0 picks the CPU count
	#[arg(long)]
	threads: Option<usize>,

	/// Export the rotation-independent intermediate layers
	#[arg(long)]
	export_intermediate: bool,

	/// Export every per-heading landability/measurability layer
	#[arg(long)]
	export_rotated: bool,

	/// Fail on the first per-heading error instead of blending survivors
	#[arg(long)]
	strict: bool,

	/// Also render PNG previews of the exported layers
	#[arg(long)]
	png: bool,

	/// Contour output format (shp needs the gdal feature)
	#[arg(long, value_enum, default_value = "csv")]
	contour_format: ContourFormat,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum ContourFormat {
	Csv,
	Shp,
}

impl ContourFormat {
	fn extension(self) -> &'static str {
		match self {
			ContourFormat::Csv => "csv",
			ContourFormat::Shp => "shp",
		}
	}
}

fn build_params(args: &Subcommand, verbosity: u8) -> Result<PipelineParams> {
	let mut params = PipelineParams::default();
	if let Some(path) = &args.config {
		ConfigFile::load(path)?.apply(&mut params);
	}

	macro_rules! put {
		($src:expr, $dst:expr) => {
			if let Some(value) = $src {
				$dst = value;
			}
		};
	}
	put!(args.robot_width, params.vehicle.width);
	put!(args.robot_length, params.vehicle.length);
	put!(args.robot_height, params.vehicle.height);
	put!(args.meta, params.vehicle.ratio_meta);
	put!(args.slope_th, params.threshold.slope);
	put!(args.height_th, params.threshold.height);
	put!(args.ground_th, params.threshold.ground);
	put!(args.prot_size, params.threshold.protrusion_size);
	if let Some(rotation) = args.rotation {
		params.rotation.fixed = true;
		params.rotation.rotation = rotation;
	}
	if args.update_threshold {
		params.threshold.update = true;
	}
	if let Some(threads) = args.threads {
		params.scheduling.max_threads = if threads == 0 { num_cpus::get() } else { threads };
	}
	params.scheduling.export_intermediate |= args.export_intermediate;
	params.scheduling.export_rotated |= args.export_rotated;
	params.scheduling.strict |= args.strict;
	params.scheduling.verbosity = verbosity.max(params.scheduling.verbosity);

	params.apply_threshold_update();
	params.validate()?;
	Ok(params)
}

pub fn run(args: &Subcommand, verbosity: u8) -> Result<()> {
	let params = build_params(args, verbosity)?;
	info!(
		"vehicle {} x {} x {} m, slope threshold {:.2} deg, height threshold {:.3} m",
		params.vehicle.width,
		params.vehicle.length,
		params.vehicle.height,
		params.threshold.slope,
		params.threshold.height
	);

	let raster = io::read_raster(&args.input)?;
	info!(
		"loaded '{}': {} x {} cells, {} valid",
		args.input.display(),
		raster.cols,
		raster.rows,
		raster.valid_count()
	);

	let mut pipeline = Pipeline::from_params(&params);
	pipeline.seed_bathymetry(raster)?;
	let report = scheduler::run(&pipeline, &params, &default_exclusion_size())?;

	export(args, &params, &pipeline, &report).context("exporting result layers")
}

fn export(
	args: &Subcommand,
	params: &PipelineParams,
	pipeline: &Pipeline,
	report: &SweepReport,
) -> Result<()> {
	let nodata = Some(params.map.default_nodata);

	let mut layers = vec![
		report.landability_layer.clone(),
		report.measurability_layer.clone(),
	];
	if params.scheduling.export_intermediate {
		layers.extend(
			[
				names::DETAILED_SLOPE,
				names::HI_SLOPE_EXCL,
				names::FILT_BATHYMETRY,
				names::HEIGHT_BATHYMETRY,
				names::PROTRUSIONS,
				names::EXCLUSION_MAP,
			]
			.map(String::from),
		);
	}
	if params.scheduling.export_rotated && !params.rotation.fixed {
		for &theta in &report.completed {
			let suffix = heading_suffix(theta);
			layers.push(format!("{}{suffix}", names::LANDABILITY_MAP));
			layers.push(format!("{}{suffix}", names::FINAL_MEASURABILITY));
		}
	}

	for layer in &layers {
		let raster = pipeline.raster(layer)?;
		let path = output_path(&args.output, layer, "asc");
		io::write_raster(&path, &raster, nodata)?;
		info!("wrote {}", path.display());
		if args.png {
			preview::save_png(
				&output_path(&args.output, layer, "png"),
				&raster,
				pipeline.use_nodata_mask,
			)?;
		}
	}

	let contour = pipeline.vector(names::CONTOUR_MASK)?;
	let geo = pipeline.geo_transform();
	let world_points: Vec<(f64, f64)> = contour
		.points
		.iter()
		.map(|&(x, y)| match contour.space {
			CoordinateSpace::Pixel => geo.pixel_to_world(x, y),
			CoordinateSpace::World => (x, y),
		})
		.collect();
	let path = output_path(&args.output, names::CONTOUR_MASK, args.contour_format.extension());
	io::write_polyline(&path, &world_points, pipeline.projection())?;
	info!("wrote {}", path.display());

	if pipeline.verbosity >= 2 {
		info!("layer store: {}", pipeline.store().names().join(", "));
	}
	Ok(())
}

fn output_path(prefix: &str, layer: &str, extension: &str) -> PathBuf {
	Path::new(&format!("{prefix}{layer}.{extension}")).to_path_buf()
}
