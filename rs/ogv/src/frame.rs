use std::time::Duration;

use crate::codec::{Pcm, Picture, YuvBuffer};
use crate::{Error, Result};

/// A decoded video frame, owned by whoever dequeued it.
///
/// The pixels are stored in a single buffer as YV12: the full resolution luma plane, then the two half resolution
/// chroma planes in the order V, U (the engine's planes 2 and 1).
#[derive(Clone, PartialEq)]
pub struct VideoFrame {
	/// Presentation time, measured from the start of the stream.
	pub timestamp: Duration,

	/// The stream's frame rate, or zero if unknown.
	pub fps: f64,

	pub width: u32,
	pub height: u32,

	pub data: Vec<u8>,
}

impl std::fmt::Debug for VideoFrame {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("VideoFrame")
			.field("timestamp", &self.timestamp)
			.field("fps", &self.fps)
			.field("width", &self.width)
			.field("height", &self.height)
			.field("data", &self.data.len())
			.finish()
	}
}

impl VideoFrame {
	/// Copy the visible picture out of a decoded buffer.
	///
	/// The crop origin is rounded down to an even pixel so the chroma planes stay aligned with the luma plane.
	pub(crate) fn crop(buffer: &YuvBuffer<'_>, picture: &Picture, timestamp: Duration, fps: f64) -> Result<Self> {
		let width = picture.width as usize;
		let height = picture.height as usize;
		let x = picture.x as usize;
		let y = picture.y as usize;

		let mut data = Vec::new();
		data.try_reserve_exact(Self::size(width, height))?;

		let [luma, cb, cr] = &buffer.planes;

		let planes = [
			(luma, x & !1, y & !1, width, height),
			(cr, x / 2, y / 2, width / 2, height / 2),
			(cb, x / 2, y / 2, width / 2, height / 2),
		];

		for (plane, x, y, width, height) in planes {
			let rows = plane
				.rows(x, y, width, height)
				.ok_or_else(|| Error::Decode("picture outside of the decoded plane".into()))?;

			for row in rows {
				data.extend_from_slice(row);
			}
		}

		Ok(Self {
			timestamp,
			fps,
			width: picture.width,
			height: picture.height,
			data,
		})
	}

	/// The buffer size of a frame with the given dimensions.
	pub fn size(width: usize, height: usize) -> usize {
		width * height + 2 * (width / 2) * (height / 2)
	}

	pub fn y(&self) -> &[u8] {
		&self.data[..self.luma_size()]
	}

	pub fn v(&self) -> &[u8] {
		let start = self.luma_size();
		&self.data[start..start + self.chroma_size()]
	}

	pub fn u(&self) -> &[u8] {
		&self.data[self.luma_size() + self.chroma_size()..]
	}

	fn luma_size(&self) -> usize {
		self.width as usize * self.height as usize
	}

	fn chroma_size(&self) -> usize {
		(self.width as usize / 2) * (self.height as usize / 2)
	}
}

/// Compute the presentation time of a video frame from its index.
pub(crate) fn video_timestamp(index: u64, fps: f64) -> Duration {
	if fps <= 0.0 {
		return Duration::ZERO;
	}

	Duration::from_millis((index as f64 / fps * 1000.0) as u64)
}

/// A block of decoded audio with interleaved samples, owned by whoever dequeued it.
#[derive(Clone, PartialEq)]
pub struct AudioPacket {
	/// Presentation time of the first sample.
	pub timestamp: Duration,

	pub channels: u32,
	pub sample_rate: u32,

	/// Samples per channel.
	pub frames: usize,

	/// Frame-major: one sample per channel for each frame.
	pub samples: Vec<f32>,
}

impl std::fmt::Debug for AudioPacket {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AudioPacket")
			.field("timestamp", &self.timestamp)
			.field("channels", &self.channels)
			.field("sample_rate", &self.sample_rate)
			.field("frames", &self.frames)
			.finish()
	}
}

impl AudioPacket {
	/// Interleave channel-major samples.
	///
	/// `offset` is the number of frames emitted before this block and determines the timestamp.
	pub(crate) fn interleave(pcm: &Pcm<'_>, channels: u32, sample_rate: u32, offset: u64) -> Result<Self> {
		if pcm.channels.len() != channels as usize {
			return Err(Error::Decode(format!(
				"expected {channels} channels, got {}",
				pcm.channels.len()
			)));
		}

		if pcm.channels.iter().any(|channel| channel.len() < pcm.frames) {
			return Err(Error::Decode("channel shorter than the frame count".into()));
		}

		let mut samples = Vec::new();
		samples.try_reserve_exact(pcm.frames * pcm.channels.len())?;

		for frame in 0..pcm.frames {
			samples.extend(pcm.channels.iter().map(|channel| channel[frame]));
		}

		Ok(Self {
			timestamp: audio_timestamp(offset, sample_rate),
			channels,
			sample_rate,
			frames: pcm.frames,
			samples,
		})
	}
}

fn audio_timestamp(offset: u64, sample_rate: u32) -> Duration {
	match sample_rate {
		0 => Duration::ZERO,
		rate => Duration::from_millis(offset * 1000 / rate as u64),
	}
}
