//! YAML configuration file support.
//!
//! Every key is optional; absent keys keep their defaults, and command-line
//! arguments override file values (ARGS > CONFIG > DEFAULT).

use anyhow::{Context, Result};
use benthoscan_pipeline::PipelineParams;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
	#[serde(default)]
	general: GeneralSection,
	#[serde(default)]
	vehicle: VehicleSection,
	#[serde(default)]
	threshold: ThresholdSection,
	#[serde(default)]
	rotation: RotationSection,
	#[serde(default)]
	map: MapSection,
	#[serde(default)]
	scheduling: SchedulingSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GeneralSection {
	verbosity: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct VehicleSection {
	length: Option<f64>,
	width: Option<f64>,
	height: Option<f64>,
	ratio_cg: Option<f64>,
	ratio_meta: Option<f64>,
	force_ratio: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThresholdSection {
	slope: Option<f64>,
	height: Option<f64>,
	ground: Option<f64>,
	protrusion: Option<f64>,
	update: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RotationSection {
	fixed_rotation: Option<f64>,
	range_min: Option<f64>,
	range_max: Option<f64>,
	step: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapSection {
	nodata: Option<f64>,
	usenodatamask: Option<bool>,
	alpharadius: Option<f64>,
	maskborder: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchedulingSection {
	max_threads: Option<usize>,
	export_intermediate: Option<bool>,
	export_rotated: Option<bool>,
}

impl ConfigFile {
	pub fn load(path: &Path) -> Result<ConfigFile> {
		let text = std::fs::read_to_string(path)
			.with_context(|| format!("cannot read configuration '{}'", path.display()))?;
		serde_yaml_ng::from_str(&text)
			.with_context(|| format!("cannot parse configuration '{}'", path.display()))
	}

	/// Overwrites present keys onto the parameter set.
	pub fn apply(&self, params: &mut PipelineParams) {
		macro_rules! put {
			($src:expr, $dst:expr) => {
				if let Some(value) = $src {
					$dst = value;
				}
			};
		}

		put!(self.general.verbosity, params.scheduling.verbosity);

		put!(self.vehicle.length, params.vehicle.length);
		put!(self.vehicle.width, params.vehicle.width);
		put!(self.vehicle.height, params.vehicle.height);
		put!(self.vehicle.ratio_cg, params.vehicle.ratio_cg);
		put!(self.vehicle.ratio_meta, params.vehicle.ratio_meta);
		put!(self.vehicle.force_ratio, params.vehicle.force_ratio);

		put!(self.threshold.slope, params.threshold.slope);
		put!(self.threshold.height, params.threshold.height);
		put!(self.threshold.ground, params.threshold.ground);
		put!(self.threshold.protrusion, params.threshold.protrusion_size);
		put!(self.threshold.update, params.threshold.update);

		if let Some(rotation) = self.rotation.fixed_rotation {
			params.rotation.fixed = true;
			params.rotation.rotation = rotation;
		}
		put!(self.rotation.range_min, params.rotation.min);
		put!(self.rotation.range_max, params.rotation.max);
		put!(self.rotation.step, params.rotation.step);

		put!(self.map.nodata, params.map.default_nodata);
		put!(self.map.usenodatamask, params.map.use_nodata_mask);
		put!(self.map.alpharadius, params.map.alpha_shape_radius);
		put!(self.map.maskborder, params.map.mask_border);

		put!(self.scheduling.max_threads, params.scheduling.max_threads);
		put!(self.scheduling.export_intermediate, params.scheduling.export_intermediate);
		put!(self.scheduling.export_rotated, params.scheduling.export_rotated);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn partial_config_keeps_defaults() {
		let config: ConfigFile = serde_yaml_ng::from_str(
			r"
vehicle:
  width: 0.8
  length: 1.6
threshold:
  slope: 25.0
rotation:
  fixed_rotation: 45.0
",
		)
		.unwrap();

		let mut params = PipelineParams::default();
		config.apply(&mut params);

		assert_eq!(params.vehicle.width, 0.8);
		assert_eq!(params.vehicle.length, 1.6);
		assert_eq!(params.vehicle.height, PipelineParams::default().vehicle.height);
		assert_eq!(params.threshold.slope, 25.0);
		assert!(params.rotation.fixed);
		assert_eq!(params.rotation.rotation, 45.0);
		assert_eq!(params.map.default_nodata, -9999.0);
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(serde_yaml_ng::from_str::<ConfigFile>("vehicle:\n  wdith: 1.0\n").is_err());
	}

	#[test]
	fn range_mode_without_fixed_rotation() {
		let config: ConfigFile = serde_yaml_ng::from_str(
			r"
rotation:
  range_min: 10.0
  range_max: 170.0
  step: 20.0
scheduling:
  max_threads: 6
  export_rotated: true
",
		)
		.unwrap();

		let mut params = PipelineParams::default();
		config.apply(&mut params);
		assert!(!params.rotation.fixed);
		assert_eq!(params.rotation.min, 10.0);
		assert_eq!(params.rotation.max, 170.0);
		assert_eq!(params.rotation.step, 20.0);
		assert_eq!(params.scheduling.max_threads, 6);
		assert!(params.scheduling.export_rotated);
	}
}
