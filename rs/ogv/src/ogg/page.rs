use bytes::{Buf, Bytes};

use super::crc;

/// Every page starts with this capture pattern.
pub const CAPTURE: &[u8; 4] = b"OggS";

/// The fixed part of the page header, before the segment table.
pub const HEADER_SIZE: usize = 27;

const FLAG_CONTINUED: u8 = 0x01;
const FLAG_BOS: u8 = 0x02;
const FLAG_EOS: u8 = 0x04;

/// A single page of an Ogg physical bitstream, including the header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
	data: Bytes,
	header_size: usize,
}

/// The result of looking for a page at the start of a buffer.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Scan {
	/// More bytes are needed before a decision can be made.
	Incomplete,
	/// The buffer does not start with a valid page.
	Invalid,
	/// A valid page of the given size starts the buffer.
	Complete(usize),
}

impl Page {
	/// Check whether `data` starts with a complete page, verifying the checksum.
	pub(crate) fn scan(data: &[u8]) -> Scan {
		if data.len() < HEADER_SIZE {
			return Scan::Incomplete;
		}

		if &data[..4] != CAPTURE || data[4] != 0 {
			return Scan::Invalid;
		}

		let header_size = HEADER_SIZE + data[26] as usize;
		if data.len() < header_size {
			return Scan::Incomplete;
		}

		let body_size: usize = data[HEADER_SIZE..header_size].iter().map(|&lacing| lacing as usize).sum();
		let size = header_size + body_size;
		if data.len() < size {
			return Scan::Incomplete;
		}

		let expected = (&data[22..26]).get_u32_le();

		// The checksum is computed with the checksum field zeroed.
		let actual = crc::update(0, &data[..22]);
		let actual = crc::update(actual, &[0; 4]);
		let actual = crc::update(actual, &data[26..size]);

		if actual != expected {
			return Scan::Invalid;
		}

		Scan::Complete(size)
	}

	/// Wrap a buffer previously accepted by [Page::scan].
	pub(crate) fn new(data: Bytes) -> Self {
		let header_size = HEADER_SIZE + data[26] as usize;
		Self { data, header_size }
	}

	pub fn header_type(&self) -> u8 {
		self.data[5]
	}

	/// The first packet on this page continues a packet from the previous page.
	pub fn is_continued(&self) -> bool {
		self.header_type() & FLAG_CONTINUED != 0
	}

	/// This is the first page of a logical bitstream.
	pub fn is_bos(&self) -> bool {
		self.header_type() & FLAG_BOS != 0
	}

	/// This is the last page of a logical bitstream.
	pub fn is_eos(&self) -> bool {
		self.header_type() & FLAG_EOS != 0
	}

	/// The codec-specific position of the last packet completed on this page, or -1 if none.
	pub fn granule_position(&self) -> i64 {
		(&self.data[6..14]).get_i64_le()
	}

	pub fn serial(&self) -> u32 {
		(&self.data[14..18]).get_u32_le()
	}

	pub fn sequence(&self) -> u32 {
		(&self.data[18..22]).get_u32_le()
	}

	/// The lacing values, one per segment.
	pub fn segments(&self) -> &[u8] {
		&self.data[HEADER_SIZE..self.header_size]
	}

	pub fn body(&self) -> Bytes {
		self.data.slice(self.header_size..)
	}

	/// The raw page, header included.
	pub fn as_bytes(&self) -> &Bytes {
		&self.data
	}
}
