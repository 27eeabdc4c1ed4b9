use bytes::{Buf, Bytes};

use crate::{Error, Result};

/// Check the packet type byte and the codec's magic string, returning the rest of the packet.
pub(crate) fn magic(codec: &'static str, mut packet: Bytes, kind: u8, signature: &[u8]) -> Result<Bytes> {
	if packet.len() < 1 + signature.len() {
		return Err(Error::header(codec, "packet too short"));
	}

	let actual = packet.get_u8();
	if actual != kind {
		return Err(Error::header(codec, format!("expected header type {kind:#x}, got {actual:#x}")));
	}

	if !packet.starts_with(signature) {
		return Err(Error::header(codec, "bad signature"));
	}

	packet.advance(signature.len());
	Ok(packet)
}

/// Parsed user comments, shared by the Theora and Vorbis comment headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Comments {
	pub vendor: String,
	pub entries: Vec<String>,
}

pub(crate) fn comments(codec: &'static str, buf: &mut Bytes) -> Result<Comments> {
	let vendor = string(codec, buf)?;

	if buf.remaining() < 4 {
		return Err(Error::header(codec, "truncated comment count"));
	}

	let count = buf.get_u32_le() as usize;

	// Each entry needs at least a length prefix, so don't trust the count for the allocation.
	let mut entries = Vec::with_capacity(count.min(buf.remaining() / 4));
	for _ in 0..count {
		entries.push(string(codec, buf)?);
	}

	Ok(Comments { vendor, entries })
}

fn string(codec: &'static str, buf: &mut Bytes) -> Result<String> {
	if buf.remaining() < 4 {
		return Err(Error::header(codec, "truncated comment length"));
	}

	let size = buf.get_u32_le() as usize;
	if buf.remaining() < size {
		return Err(Error::header(codec, "truncated comment"));
	}

	let raw = buf.split_to(size);
	Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Pack header packets the way FFmpeg expects codec extradata: each prefixed by a 16-bit big-endian size.
#[cfg_attr(not(feature = "ffmpeg"), allow(dead_code))]
pub(crate) fn extradata(codec: &'static str, headers: &[Bytes]) -> Result<Vec<u8>> {
	let mut out = Vec::with_capacity(headers.iter().map(|header| header.len() + 2).sum());

	for header in headers {
		let size = u16::try_from(header.len()).map_err(|_| Error::header(codec, "header too large"))?;
		out.extend_from_slice(&size.to_be_bytes());
		out.extend_from_slice(header);
	}

	Ok(out)
}
