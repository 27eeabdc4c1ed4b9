use std::sync::Arc;

use crate::codec::PixelFormat;

/// A list of possible errors that can occur while starting or running a decoder.
///
/// Errors are cloneable so the fatal cause can be handed to any number of consumers.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
	/// Reading the byte source failed.
	#[error("io error: {0}")]
	Io(Arc<std::io::Error>),

	/// The decode thread could not be created.
	#[error("failed to spawn decode thread: {0}")]
	Spawn(Arc<std::io::Error>),

	/// The decoder was asked to stop.
	#[error("cancelled")]
	Cancel,

	/// The decode thread panicked.
	#[error("panic")]
	Panic,

	#[error("no audio or video stream found")]
	NoStreams,

	/// The byte source ended before the headers were complete.
	#[error("unexpected end of stream")]
	UnexpectedEof,

	#[error("invalid {codec} header: {reason}")]
	Header { codec: &'static str, reason: String },

	#[error("frame too large: {width}x{height}")]
	FrameTooLarge { width: u32, height: u32 },

	#[error("unsupported pixel format: {0:?}")]
	UnsupportedPixelFormat(PixelFormat),

	#[error("failed to initialize codec: {0}")]
	CodecInit(String),

	#[error("decode error: {0}")]
	Decode(String),

	#[error("out of memory")]
	OutOfMemory,

	#[error("invalid config: {0}")]
	InvalidConfig(String),
}

impl Error {
	pub(crate) fn header(codec: &'static str, reason: impl Into<String>) -> Self {
		Self::Header {
			codec,
			reason: reason.into(),
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(Arc::new(err))
	}
}

impl From<std::collections::TryReserveError> for Error {
	fn from(_: std::collections::TryReserveError) -> Self {
		Self::OutOfMemory
	}
}

pub type Result<T> = std::result::Result<T, Error>;
