//! # ogv: threaded Ogg Theora/Vorbis decoding
//!
//! `ogv` demultiplexes an Ogg file and decodes its Theora video and Vorbis audio on a background thread,
//! handing out ready-to-play frames through two queues.
//! It's meant to be embedded in a playback application that pulls frames at its own pace.
//!
//! ## API
//!
//! - [Decoder::start] spawns the decode thread for any [std::io::Read] source.
//! - [Decoder::next_video] returns the next [VideoFrame], a YV12 picture with a presentation timestamp.
//! - [Decoder::next_audio] returns the next [AudioPacket], interleaved `f32` samples with a presentation timestamp.
//! - [Decoder::is_active] becomes false once everything has been decoded and consumed,
//!   at which point [Decoder::had_error] tells a clean end of file apart from a failure.
//!
//! Video decoding pauses while [Config::max_video_frames] frames are waiting to be consumed.
//! Audio is never throttled; it is decoded as fast as the video allows.
//!
//! ## Codecs
//!
//! The Ogg framing and the Theora/Vorbis headers are parsed in Rust ([ogg], [codec]).
//! The bitstream itself is decoded by an engine implementing [codec::Codecs];
//! enable the `ffmpeg` feature for [codec::Ffmpeg] and [Decoder::open].
//!
//! Seeking and transcoding are not supported.

mod config;
mod decoder;
mod error;
mod feed;
mod frame;
mod log;
mod negotiate;
mod scheduler;
mod session;

pub mod codec;
pub mod ogg;

#[cfg(test)]
mod test_util;

pub use config::*;
pub use decoder::*;
pub use error::*;
pub use feed::{Feed, fill};
pub use frame::{AudioPacket, VideoFrame};
pub use log::*;
