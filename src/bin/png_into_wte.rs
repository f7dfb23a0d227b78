#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	clap::Parser,
	cot_converters::{bitmap::IndexedImage, initLogger, stdoutRaw, toml_toStringPretty, wte::Wte, LogArgs},
	log::{error, info},
	std::{
		error::Error,
		io::{self, BufWriter, Write},
		process::ExitCode,
	},
};

/// Converts one indexed PNG read from stdin into a WTE texture written to stdout.
#[derive(Parser)]
struct Args {
	/// Also print the texture's metadata as TOML to stderr
	#[clap(long)]
	metadata: bool,
	#[clap(flatten)]
	log: LogArgs,
}

fn main() -> ExitCode {
	let Args { metadata, log } = Args::parse();
	initLogger(&log);
	match run(metadata) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("{err}");
			ExitCode::FAILURE
		}
	}
}

fn run(printMetadata: bool) -> Result<(), Box<dyn Error>> {
	let image = IndexedImage::fromPNG(io::stdin().lock())?;
	info!("{}x{}, {} palette entries", image.width, image.height, image.palette.len());
	let wte = Wte::new(&image)?;
	let size = {
		let stdout = &mut BufWriter::new(stdoutRaw());
		let size = wte.writeTo(stdout)?;
		stdout.flush()?;
		size
	};
	if printMetadata {
		eprint!("{}", toml_toStringPretty(&wte.metadata())?);
	}
	info!("wte conversion done ({:?}, {size} bytes)", wte.imageType);
	Ok(())
}
