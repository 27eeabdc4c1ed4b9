use std::collections::HashSet;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use crate::api::{AudioPacket, VideoFrame};
use crate::{Error, Id, NonZeroSlab};

// The C struct comes first so a pointer to it is also a pointer to the whole allocation.
#[repr(C)]
struct ExportedVideo {
	frame: VideoFrame,
	owner: ogv::VideoFrame,
}

#[repr(C)]
struct ExportedAudio {
	packet: AudioPacket,
	owner: ogv::AudioPacket,
}

#[derive(Default)]
pub struct State {
	// All running decoders, indexed by handle.
	decoders: NonZeroSlab<ogv::Decoder>,

	// Frames and packets handed to C that haven't been freed yet.
	videos: HashSet<usize>,
	audios: HashSet<usize>,
}

static STATE: LazyLock<Mutex<State>> = LazyLock::new(Default::default);

impl State {
	pub fn lock() -> MutexGuard<'static, State> {
		// Every operation leaves the state consistent, so a panic elsewhere doesn't poison it for us.
		STATE.lock().unwrap_or_else(PoisonError::into_inner)
	}

	pub fn insert(&mut self, decoder: ogv::Decoder) -> Result<Id, Error> {
		self.decoders.insert(decoder)
	}

	/// Remove the decoder; the caller should drop it without holding the lock, as that waits for the thread.
	pub fn remove(&mut self, id: Id) -> Result<ogv::Decoder, Error> {
		self.decoders.remove(id).ok_or(Error::NotFound)
	}

	fn decoder(&self, id: Id) -> Result<&ogv::Decoder, Error> {
		self.decoders.get(id).ok_or(Error::NotFound)
	}

	pub fn is_active(&self, id: Id) -> Result<bool, Error> {
		Ok(self.decoder(id)?.is_active())
	}

	pub fn had_error(&self, id: Id) -> Result<bool, Error> {
		Ok(self.decoder(id)?.had_error())
	}

	/// Returns null if no frame is ready.
	pub fn video_next(&mut self, id: Id) -> Result<*mut VideoFrame, Error> {
		match self.decoder(id)?.next_video() {
			Some(frame) => Ok(self.video_export(frame)),
			None => Ok(std::ptr::null_mut()),
		}
	}

	fn video_export(&mut self, owner: ogv::VideoFrame) -> *mut VideoFrame {
		let frame = VideoFrame {
			timestamp_ms: owner.timestamp.as_millis() as u64,
			fps: owner.fps,
			width: owner.width,
			height: owner.height,
			data: owner.data.as_ptr(),
			data_len: owner.data.len(),
		};

		let ptr = Box::into_raw(Box::new(ExportedVideo { frame, owner })) as *mut VideoFrame;
		self.videos.insert(ptr as usize);
		ptr
	}

	pub fn video_free(&mut self, ptr: *mut VideoFrame) -> Result<(), Error> {
		if ptr.is_null() {
			return Err(Error::InvalidPointer);
		}

		if !self.videos.remove(&(ptr as usize)) {
			return Err(Error::NotFound);
		}

		// SAFETY: the pointer came from video_export and hasn't been freed yet.
		drop(unsafe { Box::from_raw(ptr as *mut ExportedVideo) });
		Ok(())
	}

	/// Returns null if no audio is ready.
	pub fn audio_next(&mut self, id: Id) -> Result<*mut AudioPacket, Error> {
		match self.decoder(id)?.next_audio() {
			Some(packet) => Ok(self.audio_export(packet)),
			None => Ok(std::ptr::null_mut()),
		}
	}

	fn audio_export(&mut self, owner: ogv::AudioPacket) -> *mut AudioPacket {
		let packet = AudioPacket {
			timestamp_ms: owner.timestamp.as_millis() as u64,
			channels: owner.channels,
			sample_rate: owner.sample_rate,
			frames: owner.frames,
			samples: owner.samples.as_ptr(),
			samples_len: owner.samples.len(),
		};

		let ptr = Box::into_raw(Box::new(ExportedAudio { packet, owner })) as *mut AudioPacket;
		self.audios.insert(ptr as usize);
		ptr
	}

	pub fn audio_free(&mut self, ptr: *mut AudioPacket) -> Result<(), Error> {
		if ptr.is_null() {
			return Err(Error::InvalidPointer);
		}

		if !self.audios.remove(&(ptr as usize)) {
			return Err(Error::NotFound);
		}

		// SAFETY: the pointer came from audio_export and hasn't been freed yet.
		drop(unsafe { Box::from_raw(ptr as *mut ExportedAudio) });
		Ok(())
	}
}
