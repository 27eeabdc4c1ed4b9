//! Vorbis header parsing.

use bytes::{Buf, Bytes};

use super::AudioInfo;
use super::xiph::{self, Comments};
use crate::ogg::Packet;
use crate::{Error, Result};

const CODEC: &str = "vorbis";
const SIGNATURE: &[u8] = b"vorbis";

const IDENT: u8 = 0x01;
const COMMENT: u8 = 0x03;
const SETUP: u8 = 0x05;

const IDENT_SIZE: usize = 30;

/// Accumulates the identification, comment and setup headers of a Vorbis stream, in that order.
#[derive(Debug, Default)]
pub struct VorbisHeaders {
	info: Option<AudioInfo>,
	comments: Option<Comments>,
	packets: Vec<Bytes>,
}

impl VorbisHeaders {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse the next header packet.
	pub fn header(&mut self, packet: &Packet) -> Result<()> {
		match self.packets.len() {
			0 => self.info = Some(identification(packet.data.clone())?),
			1 => {
				let mut body = xiph::magic(CODEC, packet.data.clone(), COMMENT, SIGNATURE)?;
				let comments = xiph::comments(CODEC, &mut body)?;

				if body.first().is_none_or(|framing| framing & 1 == 0) {
					return Err(Error::header(CODEC, "comment header missing framing bit"));
				}

				self.comments = Some(comments);
			}
			2 => {
				let body = xiph::magic(CODEC, packet.data.clone(), SETUP, SIGNATURE)?;
				if body.is_empty() {
					return Err(Error::header(CODEC, "empty setup header"));
				}
			}
			_ => return Err(Error::header(CODEC, "too many headers")),
		}

		self.packets.push(packet.data.clone());
		Ok(())
	}

	pub fn info(&self) -> Option<&AudioInfo> {
		self.info.as_ref()
	}

	pub fn is_complete(&self) -> bool {
		self.packets.len() == 3
	}

	pub fn packets(&self) -> &[Bytes] {
		&self.packets
	}

	pub fn vendor(&self) -> Option<&str> {
		self.comments.as_ref().map(|comments| comments.vendor.as_str())
	}

	pub fn comments(&self) -> &[String] {
		self.comments.as_ref().map(|comments| comments.entries.as_slice()).unwrap_or_default()
	}

	#[cfg_attr(not(feature = "ffmpeg"), allow(dead_code))]
	pub(crate) fn extradata(&self) -> Result<Vec<u8>> {
		xiph::extradata(CODEC, &self.packets)
	}
}

fn identification(packet: Bytes) -> Result<AudioInfo> {
	if packet.len() < IDENT_SIZE {
		return Err(Error::header(CODEC, "identification header too short"));
	}

	let mut buf = xiph::magic(CODEC, packet, IDENT, SIGNATURE)?;

	let version = buf.get_u32_le();
	if version != 0 {
		return Err(Error::header(CODEC, format!("unsupported version {version}")));
	}

	let channels = buf.get_u8() as u32;
	let sample_rate = buf.get_u32_le();
	if channels == 0 || sample_rate == 0 {
		return Err(Error::header(CODEC, "no channels or zero sample rate"));
	}

	// Maximum, nominal and minimum bitrate hints.
	buf.advance(12);

	let blocksizes = buf.get_u8();
	let short = blocksizes & 0x0f;
	let long = blocksizes >> 4;
	if !(6..=13).contains(&short) || !(6..=13).contains(&long) || short > long {
		return Err(Error::header(CODEC, format!("invalid blocksizes {short}/{long}")));
	}

	if buf.get_u8() & 1 == 0 {
		return Err(Error::header(CODEC, "missing framing bit"));
	}

	Ok(AudioInfo { channels, sample_rate })
}
