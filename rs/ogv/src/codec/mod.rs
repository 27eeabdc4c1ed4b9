//! The boundary between the orchestration loop and the codec engines.
//!
//! # Architecture
//!
//! Each elementary stream goes through two stages:
//! 1. A setup object receives the three header packets, exposing the negotiated format as soon as
//!    the identification header is parsed.
//! 2. Once all headers are accepted, the setup is consumed to open an engine that decodes data packets.
//!
//! A [Codecs] factory hands out a fresh setup for every stream that is probed, so a rejected probe never
//! leaves state behind. The pure Rust [theora] and [vorbis] modules parse the headers; the actual
//! bitstream decoding is provided by FFmpeg when the `ffmpeg` feature is enabled.

use crate::Result;
use crate::ogg::Packet;

pub mod theora;
pub mod vorbis;
mod xiph;

#[cfg(feature = "ffmpeg")]
mod ffmpeg;

#[cfg(feature = "ffmpeg")]
pub use ffmpeg::*;

/// Creates a fresh header parser for each probed stream.
pub trait Codecs: Send + Sync {
	fn video(&self) -> Box<dyn VideoSetup>;
	fn audio(&self) -> Box<dyn AudioSetup>;
}

/// Accepts header packets one at a time.
pub trait Headers: Send {
	/// Parse the next header packet, returning an error if it is rejected.
	fn header(&mut self, packet: &Packet) -> Result<()>;
}

pub trait VideoSetup: Headers {
	/// The format negotiated so far, available after the identification header.
	fn info(&self) -> Option<&VideoInfo>;

	/// Allocate a decoder from the accepted headers.
	fn open(self: Box<Self>) -> Result<Box<dyn VideoEngine>>;
}

pub trait VideoEngine: Send {
	/// The highest post-processing level supported.
	fn max_quality(&self) -> u32;

	fn set_quality(&mut self, level: u32) -> Result<()>;

	/// Decode exactly one packet.
	fn decode(&mut self, packet: &Packet) -> Result<VideoOutput<'_>>;
}

pub trait AudioSetup: Headers {
	fn info(&self) -> Option<&AudioInfo>;

	/// Initialize synthesis from the accepted headers.
	fn open(self: Box<Self>) -> Result<Box<dyn AudioEngine>>;
}

pub trait AudioEngine: Send {
	/// Queue a packet for synthesis.
	fn feed(&mut self, packet: &Packet) -> Result<()>;

	/// Take the next block of decoded samples, or None if another packet is needed.
	fn pull(&mut self) -> Result<Option<Pcm<'_>>>;
}

/// Chroma subsampling of a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
	Yuv420,
	Yuv422,
	Yuv444,
}

/// The visible region within the coded frame, measured from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Picture {
	pub x: u32,
	pub y: u32,
	pub width: u32,
	pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
	/// The coded frame size, a multiple of the macroblock size.
	pub frame_width: u32,
	pub frame_height: u32,

	pub picture: Picture,

	pub fps_numerator: u32,
	pub fps_denominator: u32,

	pub pixel_format: PixelFormat,
}

impl VideoInfo {
	/// Frames per second, or zero if the frame rate is unknown.
	pub fn fps(&self) -> f64 {
		match self.fps_denominator {
			0 => 0.0,
			den => self.fps_numerator as f64 / den as f64,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
	pub channels: u32,
	pub sample_rate: u32,
}

/// A single plane of decoded pixel data, borrowed from the engine.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
	pub data: &'a [u8],

	/// Number of bytes between rows (may include padding).
	pub stride: usize,

	pub width: usize,
	pub height: usize,
}

impl<'a> Plane<'a> {
	/// Return `height` rows of `width` bytes starting at (`x`, `y`), or None if out of bounds.
	pub fn rows(&self, x: usize, y: usize, width: usize, height: usize) -> Option<impl Iterator<Item = &'a [u8]>> {
		if x + width > self.width || y + height > self.height || width > self.stride {
			return None;
		}

		if height > 0 && (y + height - 1) * self.stride + x + width > self.data.len() {
			return None;
		}

		let data = self.data;
		let stride = self.stride;
		Some((y..y + height).map(move |row| &data[row * stride + x..row * stride + x + width]))
	}
}

/// A decoded frame in coded-frame coordinates: luma followed by the two chroma planes.
#[derive(Debug, Clone, Copy)]
pub struct YuvBuffer<'a> {
	pub planes: [Plane<'a>; 3],
}

#[derive(Debug)]
pub enum VideoOutput<'a> {
	/// A new frame was decoded.
	Frame(YuvBuffer<'a>),

	/// The packet repeats the previous frame.
	Duplicate,
}

/// Decoded audio, one slice of samples per channel.
#[derive(Debug, Clone)]
pub struct Pcm<'a> {
	pub channels: Vec<&'a [f32]>,
	pub frames: usize,
}
