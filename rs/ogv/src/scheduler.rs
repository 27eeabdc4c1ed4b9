use std::io::Read;

use crate::codec::VideoOutput;
use crate::feed::{Feed, Feeder};
use crate::frame::{self, AudioPacket, VideoFrame};
use crate::negotiate::{AudioTrack, Tracks, VideoTrack};
use crate::session::Session;
use crate::{Config, Result};

/// The producer loop, run on the decode thread once the streams are negotiated.
///
/// Each iteration drains every audio block the engine has ready, decodes at most one video packet,
/// reads more of the container when a stream runs dry, and then waits for the consumer if the video queue is full.
pub(crate) struct Scheduler<'a, R> {
	feeder: Feeder<R>,
	tracks: Tracks,
	session: &'a Session,
	config: &'a Config,

	// Video frames decoded so far, including duplicates.
	video_frames: u64,

	// Audio samples per channel emitted so far.
	audio_frames: u64,
}

impl<'a, R: Read> Scheduler<'a, R> {
	pub fn new(feeder: Feeder<R>, tracks: Tracks, session: &'a Session, config: &'a Config) -> Self {
		Self {
			feeder,
			tracks,
			session,
			config,
			video_frames: 0,
			audio_frames: 0,
		}
	}

	/// Decode until the end of the container, returning early on a halt or fatal error.
	pub fn run(mut self) -> Result<()> {
		loop {
			self.session.check()?;

			let mut need_data = self.drain_audio()?;

			self.session.check()?;

			let mut produced = false;
			if let Some(video) = self.tracks.video.as_mut() {
				match Self::step_video(video, &mut self.video_frames)? {
					Step::Frame(frame) => {
						self.session.push_video(frame);
						produced = true;
					}
					Step::Skipped => {}
					Step::NeedData => need_data = true,
				}
			}

			if need_data && !self.refill()? {
				break;
			}

			if produced {
				self.session
					.wait_for_space(self.config.max_video_frames, self.config.poll_interval)?;
			}
		}

		tracing::info!(
			video_frames = self.video_frames,
			audio_frames = self.audio_frames,
			"end of stream"
		);

		Ok(())
	}

	// Hand every ready audio block to the consumer, feeding packets until the stream runs dry.
	//
	// Returns true if the audio stream needs more container data and there's no video stream to ask for it.
	fn drain_audio(&mut self) -> Result<bool> {
		let Some(audio) = self.tracks.audio.as_mut() else {
			return Ok(false);
		};

		loop {
			self.session.check()?;

			if let Some(packet) = Self::pull_audio(audio, self.audio_frames)? {
				self.audio_frames += packet.frames as u64;
				self.session.push_audio(packet);
				continue;
			}

			let Some(packet) = audio.stream.pull_packet() else {
				return Ok(self.tracks.video.is_none());
			};

			if let Err(err) = audio.engine.feed(&packet) {
				tracing::debug!(%err, number = packet.number, "skipping audio packet");
			}
		}
	}

	fn pull_audio(audio: &mut AudioTrack, offset: u64) -> Result<Option<AudioPacket>> {
		let info = audio.info;

		loop {
			let Some(pcm) = audio.engine.pull()? else {
				return Ok(None);
			};

			// Nothing decoded, but the engine may still have more.
			if pcm.frames == 0 {
				continue;
			}

			return AudioPacket::interleave(&pcm, info.channels, info.sample_rate, offset).map(Some);
		}
	}

	// Decode exactly one video packet, if one is available.
	fn step_video(video: &mut VideoTrack, index: &mut u64) -> Result<Step> {
		let Some(packet) = video.stream.pull_packet() else {
			return Ok(Step::NeedData);
		};

		let buffer = match video.engine.decode(&packet) {
			Ok(VideoOutput::Frame(buffer)) => buffer,
			Ok(VideoOutput::Duplicate) => {
				*index += 1;
				return Ok(Step::Skipped);
			}
			Err(err) => {
				tracing::debug!(%err, number = packet.number, "skipping video packet");
				return Ok(Step::Skipped);
			}
		};

		let fps = video.info.fps();
		let timestamp = frame::video_timestamp(*index, fps);
		let frame = VideoFrame::crop(&buffer, &video.info.picture, timestamp, fps)?;
		*index += 1;

		tracing::trace!(?timestamp, "decoded video frame");

		Ok(Step::Frame(frame))
	}

	// Hand out any pages left over from negotiation, otherwise read more of the container.
	//
	// Returns false at the end of the source.
	fn refill(&mut self) -> Result<bool> {
		if self.push_pages() > 0 {
			return Ok(true);
		}

		if self.feeder.fill()? == Feed::Eof {
			return Ok(false);
		}

		self.push_pages();
		Ok(true)
	}

	fn push_pages(&mut self) -> usize {
		let mut count = 0;
		while !self.session.is_halted() {
			let Some(page) = self.feeder.pull_page() else {
				break;
			};

			self.tracks.push_page(&page);
			count += 1;
		}
		count
	}
}

enum Step {
	Frame(VideoFrame),
	Skipped,
	NeedData,
}
