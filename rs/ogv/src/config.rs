use std::time::Duration;

use crate::{Error, Result};

/// Tuning for a decoder.
#[derive(Clone, Debug, clap::Parser, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
#[non_exhaustive]
pub struct Config {
	/// Pause decoding while this many video frames are waiting to be consumed.
	///
	/// Audio is never throttled, so keep this large enough to cover the audio the consumer wants buffered.
	#[arg(
		id = "max-video-frames",
		long = "max-video-frames",
		default_value = "30",
		env = "OGV_MAX_VIDEO_FRAMES"
	)]
	pub max_video_frames: usize,

	/// How often a paused decoder rechecks the video queue, even without a wakeup.
	#[arg(
		id = "poll-interval",
		long = "poll-interval",
		default_value = "10ms",
		value_parser = humantime::parse_duration,
		env = "OGV_POLL_INTERVAL"
	)]
	#[serde(with = "humantime_serde")]
	pub poll_interval: Duration,

	/// The number of bytes requested from the source per read.
	#[arg(id = "read-size", long = "read-size", default_value = "4096", env = "OGV_READ_SIZE")]
	pub read_size: usize,

	/// Reject video whose coded width or height exceeds this many pixels.
	#[arg(
		id = "max-frame-size",
		long = "max-frame-size",
		default_value = "99999",
		env = "OGV_MAX_FRAME_SIZE"
	)]
	pub max_frame_size: u32,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			max_video_frames: 30,
			poll_interval: Duration::from_millis(10),
			read_size: 4096,
			max_frame_size: 99999,
		}
	}
}

impl Config {
	pub fn validate(&self) -> Result<()> {
		if self.max_video_frames == 0 {
			return Err(Error::InvalidConfig("max_video_frames must be at least 1".into()));
		}

		if self.poll_interval.is_zero() {
			return Err(Error::InvalidConfig("poll_interval must be non-zero".into()));
		}

		if self.read_size == 0 {
			return Err(Error::InvalidConfig("read_size must be non-zero".into()));
		}

		if self.max_frame_size == 0 {
			return Err(Error::InvalidConfig("max_frame_size must be non-zero".into()));
		}

		Ok(())
	}
}
