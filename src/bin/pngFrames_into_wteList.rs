#![warn(clippy::pedantic, elided_lifetimes_in_paths, explicit_outlives_requirements)]
#![allow(non_snake_case)]

use {
	clap::{value_parser, Parser},
	cot_converters::{
		frames::{convertFrames, FrameNaming, FrameRange},
		initLogger, stdoutRaw, LogArgs,
	},
	log::error,
	std::{error::Error, io::Write, path::PathBuf, process::ExitCode},
};

/// Converts every `step`-th frame of `srcDir` into a WTE texture in `destDir`,
/// printing a TOML manifest of the converted frames.
#[derive(Parser)]
struct Args {
	srcDir: PathBuf,
	destDir: PathBuf,
	/// Frame file name; the run of '#' becomes the zero-padded index
	#[clap(long, default_value = "#.png")]
	template: FrameNaming,
	#[clap(long, default_value_t = 0)]
	start: usize,
	/// Exclusive
	#[clap(long, default_value_t = 2000)]
	end: usize,
	#[clap(long, default_value_t = 10, value_parser = value_parser!(u64).range(1..))]
	step: u64,
	/// Warn about absent frames instead of failing
	#[clap(long)]
	skipMissing: bool,
	#[clap(flatten)]
	log: LogArgs,
}

fn main() -> ExitCode {
	let args = Args::parse();
	initLogger(&args.log);
	match run(&args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("{err}");
			ExitCode::FAILURE
		}
	}
}

fn run(
	&Args { ref srcDir, ref destDir, ref template, start, end, step, skipMissing, .. }: &Args,
) -> Result<(), Box<dyn Error>> {
	let range = FrameRange { start, end, step: step as _ };
	let manifest = convertFrames(srcDir, destDir, template, &range, skipMissing)?;
	stdoutRaw().write_all(manifest.toToml()?.as_bytes())?;
	Ok(())
}
