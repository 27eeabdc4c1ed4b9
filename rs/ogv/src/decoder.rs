use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::codec::Codecs;
use crate::feed::Feeder;
use crate::negotiate::negotiate;
use crate::scheduler::Scheduler;
use crate::session::Session;
use crate::{AudioPacket, Config, Error, Result, VideoFrame};

/// Decodes an Ogg file on a background thread.
///
/// Decoded frames are queued in decode order and handed out with [Decoder::next_video] and [Decoder::next_audio].
/// Decoding pauses once [Config::max_video_frames] video frames are queued, and resumes as they're consumed.
///
/// Dropping the decoder stops the thread and frees anything still queued.
pub struct Decoder {
	session: Arc<Session>,
	thread: Option<JoinHandle<()>>,
}

impl Decoder {
	/// Decode a file with the FFmpeg codecs.
	#[cfg(feature = "ffmpeg")]
	pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
		Self::open_with(path, config, crate::codec::Ffmpeg)
	}

	/// Decode a file with the provided codecs.
	pub fn open_with<C: Codecs + 'static>(path: impl AsRef<Path>, config: Config, codecs: C) -> Result<Self> {
		let path = path.as_ref();
		let file = File::open(path)?;

		tracing::debug!(path = %path.display(), "opened file");
		Self::start(file, config, codecs)
	}

	/// Start decoding the byte source on a new thread.
	///
	/// Nothing is left running if an error is returned.
	pub fn start<R, C>(source: R, config: Config, codecs: C) -> Result<Self>
	where
		R: Read + Send + 'static,
		C: Codecs + 'static,
	{
		config.validate()?;

		let session = Arc::new(Session::new());

		let thread = std::thread::Builder::new()
			.name("ogv-decode".into())
			.spawn({
				let session = session.clone();
				move || run(source, &session, &codecs, &config)
			})
			.map_err(|err| Error::Spawn(Arc::new(err)))?;

		Ok(Self {
			session,
			thread: Some(thread),
		})
	}

	/// Stop decoding, waiting for the thread to exit.
	///
	/// Equivalent to dropping the decoder.
	pub fn stop(self) {}

	/// True while frames are queued or the decoder is still running.
	pub fn is_active(&self) -> bool {
		self.session.is_active()
	}

	/// True if decoding stopped because of an error.
	///
	/// Only meaningful once [Decoder::is_active] returns false.
	pub fn had_error(&self) -> bool {
		self.session.error().is_some()
	}

	/// The error that stopped decoding, if any.
	pub fn error(&self) -> Option<Error> {
		self.session.error()
	}

	/// Take the next video frame, if one is ready.
	pub fn next_video(&self) -> Option<VideoFrame> {
		self.session.pop_video()
	}

	/// Take the next block of audio, if one is ready.
	pub fn next_audio(&self) -> Option<AudioPacket> {
		self.session.pop_audio()
	}

	/// The number of video frames waiting to be consumed.
	pub fn video_count(&self) -> usize {
		self.session.video_count()
	}
}

impl Drop for Decoder {
	fn drop(&mut self) {
		self.session.halt();

		if let Some(thread) = self.thread.take() {
			if thread.join().is_err() {
				tracing::warn!("decode thread panicked");
			}
		}

		let (video, audio) = self.session.drain();
		tracing::debug!(video, audio, "decoder stopped");
	}
}

// Records a panic on the decode thread, so consumers don't wait forever.
struct Finish<'a>(&'a Session);

impl Drop for Finish<'_> {
	fn drop(&mut self) {
		if std::thread::panicking() {
			self.0.finish(Err(Error::Panic));
		}
	}
}

fn run<R: Read>(source: R, session: &Session, codecs: &dyn Codecs, config: &Config) {
	let _finish = Finish(session);

	let result = decode(source, session, codecs, config);
	match &result {
		Ok(()) => tracing::debug!("decode finished"),
		Err(Error::Cancel) => tracing::debug!("decode cancelled"),
		Err(err) if session.is_halted() => tracing::debug!(%err, "decode stopped"),
		Err(err) => tracing::warn!(%err, "decode failed"),
	}

	session.finish(result);
}

// The source and every codec resource are owned here, so they're released before the session is marked done.
fn decode<R: Read>(source: R, session: &Session, codecs: &dyn Codecs, config: &Config) -> Result<()> {
	let mut feeder = Feeder::new(source, config.read_size);
	let tracks = negotiate(&mut feeder, session, codecs, config)?;

	Scheduler::new(feeder, tracks, session, config).run()
}
