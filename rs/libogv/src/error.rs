use crate::ffi;

/// Everything that can go wrong in the C bindings, each mapped to a negative return code.
#[derive(Debug, thiserror::Error, Clone)]
#[non_exhaustive]
pub enum Error {
	#[error("panic")]
	Panic,

	#[error("invalid pointer")]
	InvalidPointer,

	#[error("invalid id")]
	InvalidId,

	#[error("not found")]
	NotFound,

	#[error("invalid code")]
	InvalidCode,

	#[error("invalid utf8: {0}")]
	Utf8(#[from] std::str::Utf8Error),

	#[error("invalid log level: {0}")]
	LogLevel(String),

	#[error("invalid argument: {0}")]
	InvalidArgument(&'static str),

	#[error("decoder error: {0}")]
	Decoder(#[from] ogv::Error),
}

impl ffi::ReturnCode for Error {
	fn code(&self) -> i32 {
		tracing::error!(%self, "error");

		match self {
			Self::Panic => -1,
			Self::InvalidPointer => -2,
			Self::InvalidId => -3,
			Self::NotFound => -4,
			Self::InvalidCode => -5,
			Self::Utf8(_) => -6,
			Self::LogLevel(_) => -7,
			Self::InvalidArgument(_) => -8,
			Self::Decoder(ogv::Error::Io(_)) => -9,
			Self::Decoder(ogv::Error::Spawn(_)) => -10,
			Self::Decoder(ogv::Error::InvalidConfig(_)) => -11,
			Self::Decoder(_) => -12,
		}
	}
}
