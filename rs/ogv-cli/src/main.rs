mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use output::Output;

#[derive(Parser, Clone)]
#[command(name = "ogv", version, about = "Decode an Ogg Theora/Vorbis file")]
pub struct Cli {
	/// The log configuration.
	#[command(flatten)]
	pub log: ogv::Log,

	/// Load decoder settings from a TOML file.
	///
	/// Flags and environment variables take precedence over the file.
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// The decoder configuration.
	#[command(flatten)]
	pub decoder: ogv::Config,

	/// The Ogg file to decode.
	pub input: PathBuf,

	/// Write the decoded video as raw YV12 frames.
	#[arg(long)]
	pub video_out: Option<PathBuf>,

	/// Write the decoded audio as interleaved little-endian f32 samples.
	#[arg(long)]
	pub audio_out: Option<PathBuf>,
}

impl Cli {
	fn load() -> anyhow::Result<Self> {
		let matches = Self::command().get_matches();
		let mut cli = Self::from_arg_matches(&matches)?;

		if let Some(path) = &cli.config {
			let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
			let file: ogv::Config = toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
			cli.decoder = merge(file, &cli.decoder, &matches);
		}

		Ok(cli)
	}
}

// Apply the settings given explicitly on the command line or environment over the file.
fn merge(mut file: ogv::Config, cli: &ogv::Config, matches: &ArgMatches) -> ogv::Config {
	let explicit = |id: &str| {
		matches!(
			matches.value_source(id),
			Some(ValueSource::CommandLine | ValueSource::EnvVariable)
		)
	};

	if explicit("max-video-frames") {
		file.max_video_frames = cli.max_video_frames;
	}

	if explicit("poll-interval") {
		file.poll_interval = cli.poll_interval;
	}

	if explicit("read-size") {
		file.read_size = cli.read_size;
	}

	if explicit("max-frame-size") {
		file.max_frame_size = cli.max_frame_size;
	}

	file
}

fn main() -> anyhow::Result<()> {
	let cli = Cli::load()?;
	cli.log.init();

	let mut output = Output::create(cli.video_out.as_deref(), cli.audio_out.as_deref())?;
	let poll = cli.decoder.poll_interval;

	let decoder = ogv::Decoder::open(&cli.input, cli.decoder.clone())
		.with_context(|| format!("failed to open {}", cli.input.display()))?;

	tracing::info!(input = %cli.input.display(), "decoding");

	while decoder.is_active() {
		let mut idle = true;

		while let Some(frame) = decoder.next_video() {
			output.video(&frame)?;
			idle = false;
		}

		while let Some(packet) = decoder.next_audio() {
			output.audio(&packet)?;
			idle = false;
		}

		if idle {
			std::thread::sleep(poll.min(Duration::from_millis(10)));
		}
	}

	output.finish()?;

	if let Some(err) = decoder.error() {
		return Err(err).context("decoding failed");
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse(args: &[&str]) -> (Cli, ArgMatches) {
		let matches = Cli::command().get_matches_from(args);
		let cli = Cli::from_arg_matches(&matches).unwrap();
		(cli, matches)
	}

	#[test]
	fn test_flags_override_file() {
		let (cli, matches) = parse(&["ogv", "clip.ogv", "--max-video-frames", "4"]);

		let file: ogv::Config = toml::from_str("max_video_frames = 12\nread_size = 1024").unwrap();
		let config = merge(file, &cli.decoder, &matches);

		assert_eq!(config.max_video_frames, 4);
		assert_eq!(config.read_size, 1024);
		assert_eq!(config.poll_interval, Duration::from_millis(10));
	}

	#[test]
	fn test_outputs() {
		let (cli, _) = parse(&["ogv", "clip.ogv", "--video-out", "video.yuv"]);
		assert_eq!(cli.input, PathBuf::from("clip.ogv"));
		assert_eq!(cli.video_out, Some(PathBuf::from("video.yuv")));
		assert!(cli.audio_out.is_none());
	}
}
