mod config;
mod io;
mod preview;
mod tools;

use anyhow::Result;
use benthoscan_core::CoreError;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
	author,
	version,
	about,
	long_about = None,
	propagate_version = true,
	disable_help_subcommand = true,
)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Console verbosity, 0-3
	#[arg(long, global = true, default_value_t = 0)]
	verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Run the landing-area detection pipeline on a bathymetry raster
	Analyze(tools::analyze::Subcommand),

	/// Show information about a bathymetry raster
	Probe(tools::probe::Subcommand),
}

fn main() {
	let cli = Cli::parse();

	env_logger::Builder::new()
		.filter_level(match cli.verbose {
			0 => log::LevelFilter::Warn,
			1 => log::LevelFilter::Info,
			2 => log::LevelFilter::Debug,
			_ => log::LevelFilter::Trace,
		})
		.format_timestamp(None)
		.init();

	if let Err(error) = run(cli) {
		eprintln!("error: {error:#}");
		let code = error
			.downcast_ref::<CoreError>()
			.map_or(2, CoreError::exit_code);
		std::process::exit(code);
	}
}

fn run(cli: Cli) -> Result<()> {
	match &cli.command {
		Commands::Analyze(arguments) => tools::analyze::run(arguments, cli.verbose),
		Commands::Probe(arguments) => tools::probe::run(arguments),
	}
}
