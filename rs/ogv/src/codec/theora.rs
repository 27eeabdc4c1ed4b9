//! Theora header parsing.
//!
//! Only the three header packets are understood here; the decoder itself is provided by an engine.

use bytes::{Buf, Bytes};

use super::xiph::{self, Comments};
use super::{Picture, PixelFormat, VideoInfo};
use crate::ogg::Packet;
use crate::{Error, Result};

const CODEC: &str = "theora";
const SIGNATURE: &[u8] = b"theora";

const IDENT: u8 = 0x80;
const COMMENT: u8 = 0x81;
const SETUP: u8 = 0x82;

// The identification header is a fixed size, including the packet type and signature.
const IDENT_SIZE: usize = 42;

/// Accumulates the identification, comment and setup headers of a Theora stream, in that order.
#[derive(Debug, Default)]
pub struct TheoraHeaders {
	info: Option<VideoInfo>,
	comments: Option<Comments>,
	packets: Vec<Bytes>,
}

impl TheoraHeaders {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse the next header packet.
	pub fn header(&mut self, packet: &Packet) -> Result<()> {
		match self.packets.len() {
			0 => self.info = Some(identification(packet.data.clone())?),
			1 => {
				let mut body = xiph::magic(CODEC, packet.data.clone(), COMMENT, SIGNATURE)?;
				self.comments = Some(xiph::comments(CODEC, &mut body)?);
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

	pub fn info(&self) -> Option<&VideoInfo> {
		self.info.as_ref()
	}

	pub fn is_complete(&self) -> bool {
		self.packets.len() == 3
	}

	/// The raw header packets accepted so far.
	pub fn packets(&self) -> &[Bytes] {
		&self.packets
	}

	pub fn vendor(&self) -> Option<&str> {
		self.comments.as_ref().map(|comments| comments.vendor.as_str())
	}

	pub fn comments(&self) -> &[String] {
		self.comments.as_ref().map(|comments| comments.entries.as_slice()).unwrap_or_default()
	}

	/// The headers packed as codec extradata.
	#[cfg_attr(not(feature = "ffmpeg"), allow(dead_code))]
	pub(crate) fn extradata(&self) -> Result<Vec<u8>> {
		xiph::extradata(CODEC, &self.packets)
	}
}

fn identification(packet: Bytes) -> Result<VideoInfo> {
	if packet.len() < IDENT_SIZE {
		return Err(Error::header(CODEC, "identification header too short"));
	}

	let mut buf = xiph::magic(CODEC, packet, IDENT, SIGNATURE)?;

	let major = buf.get_u8();
	let minor = buf.get_u8();
	let _revision = buf.get_u8();
	if major != 3 || minor > 2 {
		return Err(Error::header(CODEC, format!("unsupported version {major}.{minor}")));
	}

	// Measured in 16x16 macroblocks.
	let frame_width = buf.get_u16() as u32 * 16;
	let frame_height = buf.get_u16() as u32 * 16;
	if frame_width == 0 || frame_height == 0 {
		return Err(Error::header(CODEC, "empty frame"));
	}

	let width = buf.get_uint(3) as u32;
	let height = buf.get_uint(3) as u32;
	let x = buf.get_u8() as u32;
	let y = buf.get_u8() as u32;

	if width > frame_width || height > frame_height || x > frame_width - width || y > frame_height - height {
		return Err(Error::header(CODEC, "picture does not fit in the frame"));
	}

	let fps_numerator = buf.get_u32();
	let fps_denominator = buf.get_u32();

	// Aspect ratio, colour space and nominal bitrate are not needed for decoding.
	buf.advance(3 + 3 + 1 + 3);

	// QUAL(6) KFGSHIFT(5) PF(2) reserved(3)
	let flags = buf.get_u16();
	let pixel_format = match (flags >> 3) & 0b11 {
		0 => PixelFormat::Yuv420,
		2 => PixelFormat::Yuv422,
		3 => PixelFormat::Yuv444,
		_ => return Err(Error::header(CODEC, "reserved pixel format")),
	};

	Ok(VideoInfo {
		frame_width,
		frame_height,
		picture: Picture {
			x,
			// Theora measures the offset from the bottom of the frame.
			y: frame_height - height - y,
			width,
			height,
		},
		fps_numerator,
		fps_denominator,
		pixel_format,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_util::{TheoraIdent, theora_comment, theora_setup};

	fn packet(data: Vec<u8>) -> Packet {
		Packet::new(data)
	}

	#[test]
	fn test_all_headers() {
		let mut headers = TheoraHeaders::new();
		let ident = TheoraIdent {
			frame: (40, 30),
			picture: (634, 476, 2, 3),
			fps: (30000, 1001),
			..Default::default()
		};

		headers.header(&packet(ident.build())).unwrap();
		assert!(!headers.is_complete());

		let info = headers.info().unwrap();
		assert_eq!(info.frame_width, 640);
		assert_eq!(info.frame_height, 480);
		assert_eq!(
			info.picture,
			Picture {
				x: 2,
				y: 480 - 476 - 3,
				width: 634,
				height: 476,
			}
		);
		assert_eq!(info.pixel_format, PixelFormat::Yuv420);
		assert!((info.fps() - 29.97).abs() < 0.01);

		headers.header(&packet(theora_comment("vendor", &["TITLE=clip"]))).unwrap();
		assert_eq!(headers.vendor(), Some("vendor"));
		assert_eq!(headers.comments(), ["TITLE=clip"]);

		headers.header(&packet(theora_setup())).unwrap();
		assert!(headers.is_complete());
		assert_eq!(headers.packets().len(), 3);

		assert!(headers.header(&packet(theora_setup())).is_err());
	}

	#[test]
	fn test_pixel_formats() {
		for (code, expected) in [(0, Some(PixelFormat::Yuv420)), (1, None), (2, Some(PixelFormat::Yuv422)), (3, Some(PixelFormat::Yuv444))] {
			let ident = TheoraIdent {
				pixel_format: code,
				..Default::default()
			};

			let mut headers = TheoraHeaders::new();
			let result = headers.header(&packet(ident.build()));
			match expected {
				Some(format) => assert_eq!(headers.info().unwrap().pixel_format, format),
				None => assert!(result.is_err()),
			}
		}
	}

	#[test]
	fn test_rejects_bad_ident() {
		// Vorbis identification header.
		let mut headers = TheoraHeaders::new();
		assert!(headers.header(&packet(b"\x01vorbis\x00\x00\x00\x00".to_vec())).is_err());

		let too_big = TheoraIdent {
			frame: (1, 1),
			picture: (32, 16, 0, 0),
			..Default::default()
		};
		assert!(headers.header(&packet(too_big.build())).is_err());

		let mut truncated = TheoraIdent::default().build();
		truncated.truncate(30);
		assert!(headers.header(&packet(truncated)).is_err());

		let version = TheoraIdent {
			version: (4, 0),
			..Default::default()
		};
		assert!(headers.header(&packet(version.build())).is_err());

		assert!(headers.info().is_none());
	}

	#[test]
	fn test_headers_out_of_order() {
		let mut headers = TheoraHeaders::new();
		assert!(headers.header(&packet(theora_comment("vendor", &[]))).is_err());

		headers.header(&packet(TheoraIdent::default().build())).unwrap();
		assert!(headers.header(&packet(theora_setup())).is_err());
	}

	#[test]
	fn test_extradata() {
		let mut headers = TheoraHeaders::new();
		let ident = TheoraIdent::default().build();
		headers.header(&packet(ident.clone())).unwrap();

		let extradata = headers.extradata().unwrap();
		assert_eq!(&extradata[..2], (ident.len() as u16).to_be_bytes());
		assert_eq!(&extradata[2..], ident.as_slice());
	}
}
