use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;

/// Writes decoded media to raw files and keeps count of what was decoded.
pub struct Output {
	video: Option<BufWriter<File>>,
	audio: Option<BufWriter<File>>,

	frames: usize,
	last_frame: Option<Duration>,
	dimensions: Option<(u32, u32)>,

	samples: usize,
	audio_end: Duration,
}

impl Output {
	pub fn create(video: Option<&Path>, audio: Option<&Path>) -> anyhow::Result<Self> {
		let create = |path: &Path| {
			File::create(path)
				.map(BufWriter::new)
				.with_context(|| format!("failed to create {}", path.display()))
		};

		Ok(Self {
			video: video.map(create).transpose()?,
			audio: audio.map(create).transpose()?,
			frames: 0,
			last_frame: None,
			dimensions: None,
			samples: 0,
			audio_end: Duration::ZERO,
		})
	}

	pub fn video(&mut self, frame: &ogv::VideoFrame) -> anyhow::Result<()> {
		if self.dimensions.is_none() {
			tracing::info!(width = frame.width, height = frame.height, fps = frame.fps, "first video frame");
		}

		self.frames += 1;
		self.last_frame = Some(frame.timestamp);
		self.dimensions = Some((frame.width, frame.height));

		if let Some(out) = self.video.as_mut() {
			out.write_all(&frame.data).context("failed to write video")?;
		}

		Ok(())
	}

	pub fn audio(&mut self, packet: &ogv::AudioPacket) -> anyhow::Result<()> {
		self.samples += packet.frames;
		self.audio_end = packet.timestamp + Duration::from_secs_f64(packet.frames as f64 / packet.sample_rate as f64);

		if let Some(out) = self.audio.as_mut() {
			for sample in &packet.samples {
				out.write_all(&sample.to_le_bytes()).context("failed to write audio")?;
			}
		}

		Ok(())
	}

	pub fn finish(mut self) -> anyhow::Result<()> {
		for out in [self.video.as_mut(), self.audio.as_mut()].into_iter().flatten() {
			out.flush().context("failed to flush output")?;
		}

		tracing::info!(
			frames = self.frames,
			last_frame = ?self.last_frame,
			audio_samples = self.samples,
			audio_duration = ?self.audio_end,
			"decoded"
		);

		Ok(())
	}
}
