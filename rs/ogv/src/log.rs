use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Logging configuration for binaries and bindings.
///
/// The `OGV_LOG` environment variable accepts any `tracing` filter directive and takes precedence over the level.
#[derive(Clone, Debug, clap::Args)]
pub struct Log {
	/// The default log level.
	#[arg(id = "log-level", long = "log-level", default_value = "info", env = "OGV_LOG_LEVEL")]
	pub level: tracing::Level,
}

impl Default for Log {
	fn default() -> Self {
		Self {
			level: tracing::Level::INFO,
		}
	}
}

impl Log {
	pub fn new(level: tracing::Level) -> Self {
		Self { level }
	}

	pub fn level(&self) -> LevelFilter {
		LevelFilter::from_level(self.level)
	}

	/// Install a global subscriber writing to stderr.
	///
	/// Returns false if a subscriber was already installed.
	pub fn init(&self) -> bool {
		let filter = EnvFilter::builder()
			.with_default_directive(self.level().into())
			.with_env_var("OGV_LOG")
			.from_env_lossy();

		let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

		tracing_subscriber::registry().with(filter).with(fmt).try_init().is_ok()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::Parser;

	#[derive(Parser)]
	struct Cli {
		#[command(flatten)]
		log: Log,
	}

	#[test]
	fn test_level() {
		let cli = Cli::parse_from(["test", "--log-level", "debug"]);
		assert_eq!(cli.log.level(), LevelFilter::DEBUG);

		let cli = Cli::parse_from(["test"]);
		assert_eq!(cli.log.level(), LevelFilter::INFO);
	}
}
