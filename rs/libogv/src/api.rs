use std::ffi::c_char;
use std::str::FromStr;

use tracing::Level;

use crate::state::State;
use crate::{Error, ffi};

/// A decoded video frame.
///
/// The pixels are YV12: `width * height` bytes of luma followed by the V and U planes,
/// each `(width / 2) * (height / 2)` bytes.
#[repr(C)]
pub struct VideoFrame {
	/// Presentation time in milliseconds.
	pub timestamp_ms: u64,

	/// Frames per second, or zero if unknown.
	pub fps: f64,

	pub width: u32,
	pub height: u32,

	pub data: *const u8,
	pub data_len: usize,
}

/// A block of decoded audio.
#[repr(C)]
pub struct AudioPacket {
	/// Presentation time of the first sample in milliseconds.
	pub timestamp_ms: u64,

	pub channels: u32,
	pub sample_rate: u32,

	/// Samples per channel.
	pub frames: usize,

	/// Interleaved samples, `frames * channels` in total.
	pub samples: *const f32,
	pub samples_len: usize,
}

/// Initialize logging.
///
/// The level is a string: "error", "warn", "info", "debug", "trace", or null for the default.
/// The `OGV_LOG` environment variable overrides it.
///
/// Returns zero on success, or a negative code on failure.
///
/// # Safety
/// - The caller must ensure that level is null or a valid null-terminated C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ogv_log_level(level: *const c_char) -> i32 {
	ffi::return_code(move || {
		let log = match unsafe { ffi::parse_str(level)? } {
			"" => ogv::Log::default(),
			level => ogv::Log::new(Level::from_str(level).map_err(|_| Error::LogLevel(level.to_string()))?),
		};

		if !log.init() {
			tracing::debug!("logging already initialized");
		}

		Ok(())
	})
}

/// Start decoding an Ogg file on a background thread.
///
/// Decoding pauses while `max_frames` video frames are waiting to be consumed; zero uses the default.
///
/// Returns a positive handle on success, or a negative code on failure.
/// Nothing needs to be cleaned up on failure; otherwise call [ogv_stop].
///
/// # Safety
/// - The caller must ensure that path is a valid null-terminated C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ogv_start(path: *const c_char, max_frames: u32) -> i32 {
	ffi::return_code(move || {
		let path = unsafe { ffi::parse_path(path)? };

		let mut config = ogv::Config::default();
		if max_frames > 0 {
			config.max_video_frames = max_frames as usize;
		}

		let decoder = ogv::Decoder::open(path, config)?;
		State::lock().insert(decoder)
	})
}

/// Stop decoding, freeing the handle and anything still queued.
///
/// Frames and packets already returned stay valid until freed.
///
/// Returns zero on success, or a negative code on failure.
#[unsafe(no_mangle)]
pub extern "C" fn ogv_stop(decoder: i32) -> i32 {
	ffi::return_code(move || {
		let decoder = ffi::parse_id(decoder)?;
		let decoder = State::lock().remove(decoder)?;

		// Waits for the decode thread, so don't hold the lock.
		drop(decoder);
		Ok(())
	})
}

/// Returns 1 while frames are queued or still being decoded, 0 once finished, or a negative code on failure.
#[unsafe(no_mangle)]
pub extern "C" fn ogv_is_decoding(decoder: i32) -> i32 {
	ffi::return_code(move || {
		let decoder = ffi::parse_id(decoder)?;
		State::lock().is_active(decoder)
	})
}

/// Returns 1 if decoding stopped because of an error, 0 otherwise, or a negative code on failure.
#[unsafe(no_mangle)]
pub extern "C" fn ogv_decoding_error(decoder: i32) -> i32 {
	ffi::return_code(move || {
		let decoder = ffi::parse_id(decoder)?;
		State::lock().had_error(decoder)
	})
}

/// Take the next video frame, or null if none is ready.
///
/// The frame must be released with [ogv_video_free] exactly once.
#[unsafe(no_mangle)]
pub extern "C" fn ogv_video_next(decoder: i32) -> *mut VideoFrame {
	ffi::return_ptr(move || {
		let decoder = ffi::parse_id(decoder)?;
		State::lock().video_next(decoder)
	})
}

/// Release a frame returned by [ogv_video_next].
///
/// Returns zero on success, or a negative code if the frame is unknown or already freed.
#[unsafe(no_mangle)]
pub extern "C" fn ogv_video_free(frame: *mut VideoFrame) -> i32 {
	ffi::return_code(move || State::lock().video_free(frame))
}

/// Take the next block of audio, or null if none is ready.
///
/// The packet must be released with [ogv_audio_free] exactly once.
#[unsafe(no_mangle)]
pub extern "C" fn ogv_audio_next(decoder: i32) -> *mut AudioPacket {
	ffi::return_ptr(move || {
		let decoder = ffi::parse_id(decoder)?;
		State::lock().audio_next(decoder)
	})
}

/// Release a packet returned by [ogv_audio_next].
///
/// Returns zero on success, or a negative code if the packet is unknown or already freed.
#[unsafe(no_mangle)]
pub extern "C" fn ogv_audio_free(packet: *mut AudioPacket) -> i32 {
	ffi::return_code(move || State::lock().audio_free(packet))
}
