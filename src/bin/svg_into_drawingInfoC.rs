#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	clap::Parser,
	cot_converters::{
		drawing::{commandsFromSVG, isCIdentifier, writeDrawingInfo, DEFAULT_ARRAY_NAME},
		initLogger, io_readToString, stdoutRaw, LogArgs,
	},
	log::{error, info},
	std::{
		error::Error,
		fs,
		io::{self, BufWriter, Write},
		path::{Path, PathBuf},
		process::ExitCode,
	},
};

/// Emits the paths of an SVG file as a C `struct DrawingInfo` array on stdout.
#[derive(Parser)]
struct Args {
	/// '-' reads stdin
	#[clap(default_value = "test.svg")]
	path: PathBuf,
	/// Name of the emitted array
	#[clap(long, default_value = DEFAULT_ARRAY_NAME)]
	name: String,
	#[clap(flatten)]
	log: LogArgs,
}

fn main() -> ExitCode {
	let Args { path, name, log } = Args::parse();
	initLogger(&log);
	match run(&path, &name) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("{err}");
			ExitCode::FAILURE
		}
	}
}

fn run(path: &Path, name: &str) -> Result<(), Box<dyn Error>> {
	if !isCIdentifier(name) {
		return Err(format!("{name:?} is not a C identifier").into());
	}
	let svg = if path.as_os_str() == "-" {
		io_readToString(io::stdin())?
	} else {
		fs::read_to_string(path).map_err(|err| format!("{path:?}: {err}"))?
	};
	let commands = commandsFromSVG(&svg)?;
	info!("{} drawing commands", commands.len());
	let stdout = &mut BufWriter::new(stdoutRaw());
	writeDrawingInfo(name, &commands, stdout)?;
	stdout.flush()?;
	Ok(())
}
