//! End-to-end tests driving the compiled binary on a synthetic ASCII grid.

use assert_cmd::Command;
use std::path::Path;

fn write_flat_grid(path: &Path, size: usize, depth: f64) {
	let mut text = format!(
		"ncols {size}\nnrows {size}\nxllcorner 0\nyllcorner 0\ncellsize 1\nnodata_value -9999\n"
	);
	for _ in 0..size {
		let row = vec![depth.to_string(); size].join(" ");
		text.push_str(&row);
		text.push('\n');
	}
	std::fs::write(path, text).unwrap();
}

#[test]
fn analyze_fixed_rotation_writes_final_maps() {
	let dir = tempfile::tempdir().unwrap();
	let input = dir.path().join("flat.asc");
	write_flat_grid(&input, 24, -10.0);
	let prefix = dir.path().join("out_").to_string_lossy().to_string();

	Command::cargo_bin("benthoscan")
		.unwrap()
		.args([
			"analyze",
			input.to_str().unwrap(),
			"--output",
			prefix.as_str(),
			"--rotation",
			"0",
			"--robot-width",
			"2",
			"--robot-length",
			"2",
			"--png",
		])
		.assert()
		.success();

	let landability = dir.path().join("out_M3_LandabilityMap.asc");
	let measurability = dir.path().join("out_M4_FinalMeasurability.asc");
	let contour = dir.path().join("out_M1_CONTOUR_Mask.csv");
	assert!(landability.exists());
	assert!(measurability.exists());
	assert!(contour.exists());
	assert!(dir.path().join("out_M3_LandabilityMap.png").exists());

	// flat terrain is fully landable
	let text = std::fs::read_to_string(&landability).unwrap();
	let samples: Vec<&str> = text.lines().skip(6).flat_map(str::split_whitespace).collect();
	assert_eq!(samples.len(), 24 * 24);
	assert!(samples.iter().all(|v| *v == "255"));

	let csv = std::fs::read_to_string(&contour).unwrap();
	assert!(csv.starts_with("X, Y\n"));
}

#[test]
fn analyze_sweep_writes_blended_maps() {
	let dir = tempfile::tempdir().unwrap();
	let input = dir.path().join("flat.asc");
	write_flat_grid(&input, 16, -10.0);
	let prefix = dir.path().join("s_").to_string_lossy().to_string();

	let config = dir.path().join("config.yaml");
	std::fs::write(
		&config,
		"vehicle:\n  width: 2.0\n  length: 2.0\nrotation:\n  range_min: 0.0\n  range_max: 60.0\n  step: 30.0\n",
	)
	.unwrap();

	Command::cargo_bin("benthoscan")
		.unwrap()
		.args([
			"analyze",
			input.to_str().unwrap(),
			"--output",
			prefix.as_str(),
			"--config",
			config.to_str().unwrap(),
			"--export-rotated",
		])
		.assert()
		.success();

	assert!(dir.path().join("s_M3_LandabilityMap_BLEND.asc").exists());
	assert!(dir.path().join("s_M4_FinalMeasurability.asc").exists());
	assert!(dir.path().join("s_M3_LandabilityMap_r030.asc").exists());
	assert!(dir.path().join("s_M4_FinalMeasurability_r060.asc").exists());

	// fully landable at every heading blends to probability one
	let text = std::fs::read_to_string(dir.path().join("s_M3_LandabilityMap_BLEND.asc")).unwrap();
	let samples: Vec<&str> = text.lines().skip(6).flat_map(str::split_whitespace).collect();
	assert!(samples.iter().all(|v| *v == "1"));
}

#[test]
fn probe_prints_raster_information() {
	let dir = tempfile::tempdir().unwrap();
	let input = dir.path().join("flat.asc");
	write_flat_grid(&input, 8, -42.5);

	let output = Command::cargo_bin("benthoscan")
		.unwrap()
		.args(["probe", input.to_str().unwrap()])
		.assert()
		.success();
	let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
	assert!(stdout.contains("8 x 8 cells"));
	assert!(stdout.contains("[-42.5, -42.5]"));
}

#[test]
fn missing_input_exits_with_raster_io_code() {
	let dir = tempfile::tempdir().unwrap();
	Command::cargo_bin("benthoscan")
		.unwrap()
		.args(["analyze", dir.path().join("absent.asc").to_str().unwrap()])
		.assert()
		.failure()
		.code(3);
}
