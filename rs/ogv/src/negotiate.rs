use std::io::Read;

use crate::codec::{AudioEngine, AudioInfo, AudioSetup, Codecs, Headers, PixelFormat, VideoEngine, VideoInfo, VideoSetup};
use crate::feed::{Feed, Feeder};
use crate::ogg::{Page, Stream};
use crate::session::Session;
use crate::{Config, Error, Result};

/// Every Theora and Vorbis stream starts with exactly this many header packets.
const HEADER_PACKETS: usize = 3;

/// A bound video stream with an open decoder.
pub(crate) struct VideoTrack {
	pub stream: Stream,
	pub engine: Box<dyn VideoEngine>,
	pub info: VideoInfo,
}

/// A bound audio stream with synthesis initialized.
pub(crate) struct AudioTrack {
	pub stream: Stream,
	pub engine: Box<dyn AudioEngine>,
	pub info: AudioInfo,
}

/// The streams chosen for decoding; at least one is present.
pub(crate) struct Tracks {
	pub video: Option<VideoTrack>,
	pub audio: Option<AudioTrack>,
}

impl Tracks {
	/// Hand a page to whichever stream it belongs to.
	pub fn push_page(&mut self, page: &Page) {
		if let Some(video) = self.video.as_mut() {
			video.stream.push_page(page);
		}

		if let Some(audio) = self.audio.as_mut() {
			audio.stream.push_page(page);
		}
	}
}

// A stream that has been identified but hasn't received all of its headers yet.
struct Pending<S: ?Sized> {
	stream: Stream,
	setup: Box<S>,
	headers: usize,
}

impl<S: ?Sized + Headers> Pending<S> {
	fn new(stream: Stream, setup: Box<S>) -> Self {
		Self {
			stream,
			setup,
			headers: 1,
		}
	}

	fn is_complete(&self) -> bool {
		self.headers >= HEADER_PACKETS
	}

	// Feed any buffered header packets to the parser.
	fn advance(&mut self, session: &Session) -> Result<()> {
		while !self.is_complete() {
			session.check()?;

			let Some(packet) = self.stream.pull_packet() else {
				return Ok(());
			};

			self.setup.header(&packet)?;
			self.headers += 1;
		}

		Ok(())
	}
}

fn is_complete<S: ?Sized + Headers>(pending: &Option<Pending<S>>) -> bool {
	pending.as_ref().is_none_or(Pending::is_complete)
}

fn push_page<S: ?Sized>(pending: &mut Option<Pending<S>>, page: &Page) {
	if let Some(pending) = pending.as_mut() {
		pending.stream.push_page(page);
	}
}

/// Find the streams, read their headers and open the decoders.
pub(crate) fn negotiate<R: Read>(
	feeder: &mut Feeder<R>,
	session: &Session,
	codecs: &dyn Codecs,
	config: &Config,
) -> Result<Tracks> {
	let (mut video, mut audio) = discover(feeder, session, codecs)?;

	while !is_complete(&video) || !is_complete(&audio) {
		session.check()?;

		if let Some(video) = video.as_mut() {
			video.advance(session)?;
		}

		if let Some(audio) = audio.as_mut() {
			audio.advance(session)?;
		}

		if is_complete(&video) && is_complete(&audio) {
			break;
		}

		match feeder.pull_page() {
			Some(page) => {
				push_page(&mut video, &page);
				push_page(&mut audio, &page);
			}
			None => {
				if feeder.fill()? == Feed::Eof {
					return Err(Error::UnexpectedEof);
				}
			}
		}
	}

	let video = video.map(|pending| open_video(pending, config)).transpose()?;
	let audio = audio.map(open_audio).transpose()?;

	Ok(Tracks { video, audio })
}

type Discovered = (Option<Pending<dyn VideoSetup>>, Option<Pending<dyn AudioSetup>>);

// Probe every beginning-of-stream page, binding the first video and first audio stream recognized.
fn discover<R: Read>(feeder: &mut Feeder<R>, session: &Session, codecs: &dyn Codecs) -> Result<Discovered> {
	let mut video: Option<Pending<dyn VideoSetup>> = None;
	let mut audio: Option<Pending<dyn AudioSetup>> = None;

	let first = loop {
		session.check()?;

		let Some(page) = feeder.pull_page() else {
			match feeder.fill()? {
				Feed::Eof => break None,
				Feed::Wrote(_) => continue,
			}
		};

		// The beginning-of-stream pages all come first.
		if !page.is_bos() {
			break Some(page);
		}

		let mut stream = Stream::new(page.serial());
		stream.push_page(&page);

		let Some(packet) = stream.pull_packet() else {
			tracing::debug!(serial = page.serial(), "beginning of stream page without a packet");
			continue;
		};

		if video.is_none() {
			let mut setup = codecs.video();
			if setup.header(&packet).is_ok() {
				tracing::info!(serial = stream.serial(), "found video stream");
				video = Some(Pending::new(stream, setup));
				continue;
			}
		}

		if audio.is_none() {
			let mut setup = codecs.audio();
			if setup.header(&packet).is_ok() {
				tracing::info!(serial = stream.serial(), "found audio stream");
				audio = Some(Pending::new(stream, setup));
				continue;
			}
		}

		tracing::debug!(serial = stream.serial(), "ignoring unknown or redundant stream");
	};

	if video.is_none() && audio.is_none() {
		return Err(Error::NoStreams);
	}

	match first {
		Some(page) => {
			push_page(&mut video, &page);
			push_page(&mut audio, &page);
		}
		None => return Err(Error::UnexpectedEof),
	}

	Ok((video, audio))
}

fn open_video(pending: Pending<dyn VideoSetup>, config: &Config) -> Result<VideoTrack> {
	let info = pending
		.setup
		.info()
		.cloned()
		.ok_or_else(|| Error::CodecInit("video headers accepted without format".into()))?;

	if info.frame_width > config.max_frame_size || info.frame_height > config.max_frame_size {
		return Err(Error::FrameTooLarge {
			width: info.frame_width,
			height: info.frame_height,
		});
	}

	if info.pixel_format != PixelFormat::Yuv420 {
		return Err(Error::UnsupportedPixelFormat(info.pixel_format));
	}

	let mut engine = pending.setup.open()?;

	let quality = engine.max_quality();
	engine.set_quality(quality)?;

	tracing::info!(
		width = info.picture.width,
		height = info.picture.height,
		fps = info.fps(),
		quality,
		"video stream ready"
	);

	Ok(VideoTrack {
		stream: pending.stream,
		engine,
		info,
	})
}

fn open_audio(pending: Pending<dyn AudioSetup>) -> Result<AudioTrack> {
	let info = pending
		.setup
		.info()
		.copied()
		.ok_or_else(|| Error::CodecInit("audio headers accepted without format".into()))?;

	let engine = pending.setup.open()?;

	tracing::info!(channels = info.channels, sample_rate = info.sample_rate, "audio stream ready");

	Ok(AudioTrack {
		stream: pending.stream,
		engine,
		info,
	})
}
