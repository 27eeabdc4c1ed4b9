//! Fixtures shared by the unit tests: an Ogg page writer, synthetic headers and mock engines.

use std::collections::{HashMap, VecDeque};
use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::codec::theora::TheoraHeaders;
use crate::codec::vorbis::VorbisHeaders;
use crate::codec::*;
use crate::ogg::{self, Packet, Page};
use crate::{Error, Result};

/// Writes a single Ogg page.
#[derive(Clone)]
pub struct PageBuilder {
	serial: u32,
	sequence: u32,
	flags: u8,
	granule: i64,
	segments: Vec<u8>,
	body: Vec<u8>,
}

impl PageBuilder {
	pub fn new(serial: u32, sequence: u32) -> Self {
		Self {
			serial,
			sequence,
			flags: 0,
			granule: 0,
			segments: Vec::new(),
			body: Vec::new(),
		}
	}

	pub fn continued(mut self) -> Self {
		self.flags |= 0x01;
		self
	}

	pub fn bos(mut self) -> Self {
		self.flags |= 0x02;
		self
	}

	pub fn eos(mut self) -> Self {
		self.flags |= 0x04;
		self
	}

	pub fn granule(mut self, granule: i64) -> Self {
		self.granule = granule;
		self
	}

	/// Add a complete packet.
	pub fn packet(mut self, data: &[u8]) -> Self {
		self.segments.extend(std::iter::repeat_n(255, data.len() / 255));
		self.segments.push((data.len() % 255) as u8);
		self.body.extend_from_slice(data);
		self
	}

	/// Add the start of a packet that continues on the next page.
	pub fn partial(mut self, data: &[u8]) -> Self {
		assert_eq!(data.len() % 255, 0, "partial packets must fill whole segments");
		self.segments.extend(std::iter::repeat_n(255, data.len() / 255));
		self.body.extend_from_slice(data);
		self
	}

	pub fn build(&self) -> Vec<u8> {
		assert!(self.segments.len() <= 255, "too many segments for one page");

		let mut out = Vec::with_capacity(ogg::HEADER_SIZE + self.segments.len() + self.body.len());
		out.extend_from_slice(ogg::CAPTURE);
		out.push(0);
		out.push(self.flags);
		out.extend_from_slice(&self.granule.to_le_bytes());
		out.extend_from_slice(&self.serial.to_le_bytes());
		out.extend_from_slice(&self.sequence.to_le_bytes());
		out.extend_from_slice(&[0; 4]);
		out.push(self.segments.len() as u8);
		out.extend_from_slice(&self.segments);
		out.extend_from_slice(&self.body);

		let crc = ogg::checksum(&out);
		out[22..26].copy_from_slice(&crc.to_le_bytes());
		out
	}
}

pub fn page(builder: PageBuilder) -> Page {
	let mut sync = ogg::Sync::new();
	sync.push(&builder.build());
	sync.pull_page().expect("valid page")
}

/// A reader that can be interrupted or fail.
pub struct Flaky {
	data: io::Cursor<Vec<u8>>,
	interrupts: usize,
	fail: bool,
}

impl Flaky {
	pub fn new(data: Vec<u8>) -> Self {
		Self {
			data: io::Cursor::new(data),
			interrupts: 0,
			fail: false,
		}
	}

	/// Return `ErrorKind::Interrupted` for the first `count` reads.
	pub fn interrupt(mut self, count: usize) -> Self {
		self.interrupts = count;
		self
	}

	/// Return an error instead of end-of-stream.
	pub fn fail(mut self) -> Self {
		self.fail = true;
		self
	}
}

impl Read for Flaky {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		if self.interrupts > 0 {
			self.interrupts -= 1;
			return Err(io::ErrorKind::Interrupted.into());
		}

		match self.data.read(buf)? {
			0 if self.fail && !buf.is_empty() => Err(io::Error::other("broken source")),
			size => Ok(size),
		}
	}
}

/// The fields of a Theora identification header.
#[derive(Clone, Copy)]
pub struct TheoraIdent {
	pub version: (u8, u8),

	/// Frame size in macroblocks.
	pub frame: (u16, u16),

	/// Picture width, height, x and y, with y measured from the bottom.
	pub picture: (u32, u32, u8, u8),

	pub fps: (u32, u32),
	pub pixel_format: u8,
}

impl Default for TheoraIdent {
	fn default() -> Self {
		Self {
			version: (3, 2),
			frame: (2, 2),
			picture: (32, 32, 0, 0),
			fps: (25, 1),
			pixel_format: 0,
		}
	}
}

impl TheoraIdent {
	pub fn build(&self) -> Vec<u8> {
		let mut out = b"\x80theora".to_vec();
		out.extend_from_slice(&[self.version.0, self.version.1, 1]);
		out.extend_from_slice(&self.frame.0.to_be_bytes());
		out.extend_from_slice(&self.frame.1.to_be_bytes());
		out.extend_from_slice(&self.picture.0.to_be_bytes()[1..]);
		out.extend_from_slice(&self.picture.1.to_be_bytes()[1..]);
		out.push(self.picture.2);
		out.push(self.picture.3);
		out.extend_from_slice(&self.fps.0.to_be_bytes());
		out.extend_from_slice(&self.fps.1.to_be_bytes());
		out.extend_from_slice(&[0, 0, 1, 0, 0, 1]); // aspect 1:1
		out.push(0); // colour space
		out.extend_from_slice(&[0, 0, 0]); // bitrate
		let flags = (48u16 << 10) | (6 << 5) | ((self.pixel_format as u16 & 0b11) << 3);
		out.extend_from_slice(&flags.to_be_bytes());
		out
	}
}

fn comment_body(mut out: Vec<u8>, vendor: &str, entries: &[&str]) -> Vec<u8> {
	out.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
	out.extend_from_slice(vendor.as_bytes());
	out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
	for entry in entries {
		out.extend_from_slice(&(entry.len() as u32).to_le_bytes());
		out.extend_from_slice(entry.as_bytes());
	}
	out
}

pub fn theora_comment(vendor: &str, entries: &[&str]) -> Vec<u8> {
	comment_body(b"\x81theora".to_vec(), vendor, entries)
}

pub fn theora_setup() -> Vec<u8> {
	b"\x82theora\x00\x01\x02\x03".to_vec()
}

pub fn vorbis_ident(channels: u8, sample_rate: u32) -> Vec<u8> {
	let mut out = b"\x01vorbis".to_vec();
	out.extend_from_slice(&0u32.to_le_bytes());
	out.push(channels);
	out.extend_from_slice(&sample_rate.to_le_bytes());
	out.extend_from_slice(&[0; 12]);
	out.push(0xb8); // 256 and 2048 sample blocks
	out.push(1);
	out
}

pub fn vorbis_comment(vendor: &str, entries: &[&str]) -> Vec<u8> {
	let mut out = comment_body(b"\x03vorbis".to_vec(), vendor, entries);
	out.push(1);
	out
}

pub fn vorbis_setup() -> Vec<u8> {
	b"\x05vorbis\x00\x01\x02\x03".to_vec()
}

/// Fake engines that parse real headers but synthesize their output.
///
/// A video packet `[y, u, v]` decodes to a frame with every luma byte set to `y` and the chroma planes to `u` and `v`.
/// An empty video packet is a duplicate frame. An audio packet `[frames, value]` produces `frames` samples of
/// `value + channel`. A packet starting with 0xff fails to decode.
#[derive(Clone, Default)]
pub struct MockCodecs {
	quality: Arc<AtomicU32>,
}

pub const MOCK_MAX_QUALITY: u32 = 3;

impl MockCodecs {
	/// The quality level last set on a video engine.
	pub fn quality(&self) -> u32 {
		self.quality.load(Ordering::SeqCst)
	}
}

impl Codecs for MockCodecs {
	fn video(&self) -> Box<dyn VideoSetup> {
		Box::new(MockVideoSetup {
			headers: TheoraHeaders::new(),
			quality: self.quality.clone(),
		})
	}

	fn audio(&self) -> Box<dyn AudioSetup> {
		Box::new(MockAudioSetup {
			headers: VorbisHeaders::new(),
		})
	}
}

struct MockVideoSetup {
	headers: TheoraHeaders,
	quality: Arc<AtomicU32>,
}

impl Headers for MockVideoSetup {
	fn header(&mut self, packet: &Packet) -> Result<()> {
		self.headers.header(packet)
	}
}

impl VideoSetup for MockVideoSetup {
	fn info(&self) -> Option<&VideoInfo> {
		self.headers.info()
	}

	fn open(self: Box<Self>) -> Result<Box<dyn VideoEngine>> {
		let info = self.headers.info().ok_or_else(|| Error::CodecInit("no headers".into()))?;
		let width = info.frame_width as usize;
		let height = info.frame_height as usize;

		// Padded strides, like a real decoder.
		let planes = [(width + 16, width, height), (width / 2 + 8, width / 2, height / 2), (width / 2 + 8, width / 2, height / 2)]
			.map(|(stride, width, height)| MockPlane {
				data: vec![0; stride * height],
				stride,
				width,
				height,
			});

		Ok(Box::new(MockVideoEngine {
			planes,
			quality: self.quality,
		}))
	}
}

struct MockPlane {
	data: Vec<u8>,
	stride: usize,
	width: usize,
	height: usize,
}

struct MockVideoEngine {
	planes: [MockPlane; 3],
	quality: Arc<AtomicU32>,
}

impl VideoEngine for MockVideoEngine {
	fn max_quality(&self) -> u32 {
		MOCK_MAX_QUALITY
	}

	fn set_quality(&mut self, level: u32) -> Result<()> {
		self.quality.store(level, Ordering::SeqCst);
		Ok(())
	}

	fn decode(&mut self, packet: &Packet) -> Result<VideoOutput<'_>> {
		if packet.data.is_empty() {
			return Ok(VideoOutput::Duplicate);
		}

		if packet.data[0] == 0xff {
			return Err(Error::Decode("corrupt packet".into()));
		}

		for (index, plane) in self.planes.iter_mut().enumerate() {
			plane.data.fill(packet.data.get(index).copied().unwrap_or(0));
		}

		fn plane(plane: &MockPlane) -> Plane<'_> {
			Plane {
				data: &plane.data,
				stride: plane.stride,
				width: plane.width,
				height: plane.height,
			}
		}

		Ok(VideoOutput::Frame(YuvBuffer {
			planes: [plane(&self.planes[0]), plane(&self.planes[1]), plane(&self.planes[2])],
		}))
	}
}

struct MockAudioSetup {
	headers: VorbisHeaders,
}

impl Headers for MockAudioSetup {
	fn header(&mut self, packet: &Packet) -> Result<()> {
		self.headers.header(packet)
	}
}

impl AudioSetup for MockAudioSetup {
	fn info(&self) -> Option<&AudioInfo> {
		self.headers.info()
	}

	fn open(self: Box<Self>) -> Result<Box<dyn AudioEngine>> {
		let info = self.headers.info().ok_or_else(|| Error::CodecInit("no headers".into()))?;
		Ok(Box::new(MockAudioEngine {
			channels: info.channels as usize,
			pending: VecDeque::new(),
			current: Vec::new(),
		}))
	}
}

struct MockAudioEngine {
	channels: usize,
	pending: VecDeque<Vec<Vec<f32>>>,
	current: Vec<Vec<f32>>,
}

impl AudioEngine for MockAudioEngine {
	fn feed(&mut self, packet: &Packet) -> Result<()> {
		let (frames, value) = match packet.data.as_ref() {
			[0xff, ..] => return Err(Error::Decode("corrupt packet".into())),
			[frames, value, ..] => (*frames as usize, *value as f32),
			_ => return Err(Error::Decode("short packet".into())),
		};

		let block = (0..self.channels).map(|channel| vec![value + channel as f32; frames]).collect();
		self.pending.push_back(block);
		Ok(())
	}

	fn pull(&mut self) -> Result<Option<Pcm<'_>>> {
		let Some(block) = self.pending.pop_front() else {
			return Ok(None);
		};

		self.current = block;
		Ok(Some(Pcm {
			channels: self.current.iter().map(Vec::as_slice).collect(),
			frames: self.current.first().map(Vec::len).unwrap_or(0),
		}))
	}
}

pub const VIDEO_SERIAL: u32 = 0x1000;
pub const AUDIO_SERIAL: u32 = 0x2000;

/// Builds a complete Ogg file with an optional Theora and Vorbis stream.
#[derive(Default)]
pub struct Clip {
	pub video: Option<TheoraIdent>,
	pub audio: Option<(u8, u32)>,

	pub video_packets: Vec<Vec<u8>>,
	pub audio_packets: Vec<Vec<u8>>,

	/// Additional BOS pages from unknown codecs, written before the others.
	pub unknown: Vec<Vec<u8>>,
}

impl Clip {
	pub fn build(&self) -> Vec<u8> {
		let mut sequences = HashMap::new();
		let mut next = |serial: u32| {
			let sequence = sequences.entry(serial).or_insert(0u32);
			*sequence += 1;
			*sequence - 1
		};

		let mut out = Vec::new();

		for (index, header) in self.unknown.iter().enumerate() {
			let serial = 0x3000 + index as u32;
			out.extend(PageBuilder::new(serial, next(serial)).bos().packet(header).build());
		}

		if let Some(ident) = &self.video {
			out.extend(PageBuilder::new(VIDEO_SERIAL, next(VIDEO_SERIAL)).bos().packet(&ident.build()).build());
		}

		if let Some((channels, rate)) = self.audio {
			let ident = vorbis_ident(channels, rate);
			out.extend(PageBuilder::new(AUDIO_SERIAL, next(AUDIO_SERIAL)).bos().packet(&ident).build());
		}

		if self.video.is_some() {
			let page = PageBuilder::new(VIDEO_SERIAL, next(VIDEO_SERIAL))
				.packet(&theora_comment("mock", &[]))
				.packet(&theora_setup());
			out.extend(page.build());
		}

		if self.audio.is_some() {
			let page = PageBuilder::new(AUDIO_SERIAL, next(AUDIO_SERIAL))
				.packet(&vorbis_comment("mock", &[]))
				.packet(&vorbis_setup());
			out.extend(page.build());
		}

		// Interleave one page of each.
		let count = self.video_packets.len().max(self.audio_packets.len());
		for index in 0..count {
			if let Some(packet) = self.video_packets.get(index) {
				let mut page = PageBuilder::new(VIDEO_SERIAL, next(VIDEO_SERIAL)).packet(packet);
				if index + 1 == self.video_packets.len() {
					page = page.eos();
				}
				out.extend(page.build());
			}

			if let Some(packet) = self.audio_packets.get(index) {
				let mut page = PageBuilder::new(AUDIO_SERIAL, next(AUDIO_SERIAL)).packet(packet);
				if index + 1 == self.audio_packets.len() {
					page = page.eos();
				}
				out.extend(page.build());
			}
		}

		out
	}
}
