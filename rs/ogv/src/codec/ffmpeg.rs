//! Theora and Vorbis engines backed by FFmpeg.

use ffmpeg_next as ffmpeg;

use super::theora::TheoraHeaders;
use super::vorbis::VorbisHeaders;
use super::*;
use crate::Error;

/// Creates FFmpeg backed decoders.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ffmpeg;

impl Codecs for Ffmpeg {
	fn video(&self) -> Box<dyn VideoSetup> {
		Box::new(TheoraSetup::default())
	}

	fn audio(&self) -> Box<dyn AudioSetup> {
		Box::new(VorbisSetup::default())
	}
}

// Create a decoder context with the Xiph packed headers as extradata.
//
// The extradata has to be in place before the decoder is opened; the Xiph decoders parse it in `init`.
fn context(id: ffmpeg::codec::Id, extradata: &[u8]) -> Result<ffmpeg::codec::context::Context> {
	ffmpeg::init().map_err(|e| Error::CodecInit(e.to_string()))?;

	let codec = ffmpeg::codec::decoder::find(id).ok_or_else(|| Error::CodecInit(format!("no decoder for {id:?}")))?;
	let mut context = ffmpeg::codec::context::Context::new_with_codec(codec);

	unsafe {
		let ptr = context.as_mut_ptr();

		// Zeroed padding is required after the extradata.
		let size = extradata.len() + ffmpeg::sys::AV_INPUT_BUFFER_PADDING_SIZE as usize;
		let data = ffmpeg::sys::av_mallocz(size) as *mut u8;
		if data.is_null() {
			return Err(Error::OutOfMemory);
		}

		std::ptr::copy_nonoverlapping(extradata.as_ptr(), data, extradata.len());
		(*ptr).extradata = data;
		(*ptr).extradata_size = extradata.len() as i32;

		// Keep the frames in coded-frame coordinates; the picture region is cropped by the caller.
		(*ptr).apply_cropping = 0;
	}

	Ok(context)
}

fn is_again(err: &ffmpeg::Error) -> bool {
	matches!(err, ffmpeg::Error::Other { errno } if *errno == ffmpeg::util::error::EAGAIN)
}

#[derive(Default)]
struct TheoraSetup {
	headers: TheoraHeaders,
}

impl Headers for TheoraSetup {
	fn header(&mut self, packet: &Packet) -> Result<()> {
		self.headers.header(packet)
	}
}

impl VideoSetup for TheoraSetup {
	fn info(&self) -> Option<&VideoInfo> {
		self.headers.info()
	}

	fn open(self: Box<Self>) -> Result<Box<dyn VideoEngine>> {
		if !self.headers.is_complete() {
			return Err(Error::CodecInit("theora headers incomplete".into()));
		}

		let context = context(ffmpeg::codec::Id::THEORA, &self.headers.extradata()?)?;
		let decoder = context
			.decoder()
			.video()
			.map_err(|e| Error::CodecInit(format!("failed to open theora decoder: {e}")))?;

		Ok(Box::new(TheoraEngine {
			decoder,
			frame: ffmpeg::frame::Video::empty(),
		}))
	}
}

struct TheoraEngine {
	decoder: ffmpeg::decoder::Video,

	// The most recently decoded frame, borrowed by the returned planes.
	frame: ffmpeg::frame::Video,
}

impl VideoEngine for TheoraEngine {
	fn max_quality(&self) -> u32 {
		// FFmpeg's Theora decoder has no post-processing levels.
		0
	}

	fn set_quality(&mut self, level: u32) -> Result<()> {
		match level {
			0 => Ok(()),
			_ => Err(Error::CodecInit(format!("unsupported quality level {level}"))),
		}
	}

	fn decode(&mut self, packet: &Packet) -> Result<VideoOutput<'_>> {
		// A zero-length packet repeats the previous frame. FFmpeg would treat it as a flush.
		if packet.data.is_empty() {
			return Ok(VideoOutput::Duplicate);
		}

		let input = ffmpeg::Packet::copy(&packet.data);
		self.decoder
			.send_packet(&input)
			.map_err(|e| Error::Decode(format!("send_packet failed: {e}")))?;

		match self.decoder.receive_frame(&mut self.frame) {
			Ok(()) => {}
			Err(err) if is_again(&err) => return Ok(VideoOutput::Duplicate),
			Err(err) => return Err(Error::Decode(format!("receive_frame failed: {err}"))),
		}

		if self.frame.format() != ffmpeg::format::Pixel::YUV420P {
			return Err(Error::Decode(format!("unexpected pixel format {:?}", self.frame.format())));
		}

		let frame = &self.frame;
		let plane = |index: usize| Plane {
			data: frame.data(index),
			stride: frame.stride(index),
			width: frame.plane_width(index) as usize,
			height: frame.plane_height(index) as usize,
		};

		Ok(VideoOutput::Frame(YuvBuffer {
			planes: [plane(0), plane(1), plane(2)],
		}))
	}
}

#[derive(Default)]
struct VorbisSetup {
	headers: VorbisHeaders,
}

impl Headers for VorbisSetup {
	fn header(&mut self, packet: &Packet) -> Result<()> {
		self.headers.header(packet)
	}
}

impl AudioSetup for VorbisSetup {
	fn info(&self) -> Option<&AudioInfo> {
		self.headers.info()
	}

	fn open(self: Box<Self>) -> Result<Box<dyn AudioEngine>> {
		if !self.headers.is_complete() {
			return Err(Error::CodecInit("vorbis headers incomplete".into()));
		}

		let context = context(ffmpeg::codec::Id::VORBIS, &self.headers.extradata()?)?;
		let decoder = context
			.decoder()
			.audio()
			.map_err(|e| Error::CodecInit(format!("failed to open vorbis decoder: {e}")))?;

		Ok(Box::new(VorbisEngine {
			decoder,
			frame: ffmpeg::frame::Audio::empty(),
		}))
	}
}

struct VorbisEngine {
	decoder: ffmpeg::decoder::Audio,
	frame: ffmpeg::frame::Audio,
}

impl AudioEngine for VorbisEngine {
	fn feed(&mut self, packet: &Packet) -> Result<()> {
		let input = ffmpeg::Packet::copy(&packet.data);
		self.decoder
			.send_packet(&input)
			.map_err(|e| Error::Decode(format!("send_packet failed: {e}")))
	}

	fn pull(&mut self) -> Result<Option<Pcm<'_>>> {
		match self.decoder.receive_frame(&mut self.frame) {
			Ok(()) => {}
			Err(err) if is_again(&err) => return Ok(None),
			Err(ffmpeg::Error::Eof) => return Ok(None),
			Err(err) => return Err(Error::Decode(format!("receive_frame failed: {err}"))),
		}

		let planar = ffmpeg::format::Sample::F32(ffmpeg::format::sample::Type::Planar);
		if self.frame.format() != planar {
			return Err(Error::Decode(format!("unexpected sample format {:?}", self.frame.format())));
		}

		// One plane per channel.
		let frame = &self.frame;
		let channels = (0..frame.planes()).map(|index| frame.plane::<f32>(index)).collect();

		Ok(Some(Pcm {
			channels,
			frames: frame.samples(),
		}))
	}
}
