use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};

use super::Page;

/// A codec packet reassembled from one or more pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
	pub data: Bytes,

	/// The first packet of the logical bitstream.
	pub bos: bool,

	/// The last packet of the logical bitstream.
	pub eos: bool,

	/// Only set on the last packet completed on a page.
	pub granule_position: Option<i64>,

	/// The index of this packet within the logical bitstream.
	pub number: u64,
}

impl Packet {
	/// A packet that is not attached to any page, mostly useful for feeding codecs directly.
	pub fn new(data: impl Into<Bytes>) -> Self {
		Self {
			data: data.into(),
			bos: false,
			eos: false,
			granule_position: None,
			number: 0,
		}
	}
}

/// Reassembles the packets of a single logical bitstream.
pub struct Stream {
	serial: u32,

	// The sequence number we expect on the next page.
	sequence: Option<u32>,

	// A packet that continues on the next page.
	partial: Option<BytesMut>,

	packets: VecDeque<Packet>,
	count: u64,
}

impl Stream {
	pub fn new(serial: u32) -> Self {
		Self {
			serial,
			sequence: None,
			partial: None,
			packets: VecDeque::new(),
			count: 0,
		}
	}

	pub fn serial(&self) -> u32 {
		self.serial
	}

	/// Add a page to this stream, returning false if it belongs to another stream.
	pub fn push_page(&mut self, page: &Page) -> bool {
		if page.serial() != self.serial {
			return false;
		}

		if let Some(expected) = self.sequence {
			if page.sequence() != expected && self.partial.take().is_some() {
				tracing::debug!(serial = self.serial, expected, actual = page.sequence(), "hole in stream, dropping packet");
			}
		}
		self.sequence = Some(page.sequence().wrapping_add(1));

		// None while skipping the tail of a packet whose start was lost.
		let mut current = match page.is_continued() {
			true => self.partial.take(),
			false => {
				if self.partial.take().is_some() {
					tracing::debug!(serial = self.serial, "unterminated packet, dropping");
				}
				Some(BytesMut::new())
			}
		};

		let body = page.body();
		let segments = page.segments();
		let last = segments.iter().rposition(|&lacing| lacing < 255);
		let granule = page.granule_position();

		let mut first = true;
		let mut offset = 0;

		for (index, &lacing) in segments.iter().enumerate() {
			let end = offset + lacing as usize;
			if let Some(current) = current.as_mut() {
				current.extend_from_slice(&body[offset..end]);
			}
			offset = end;

			if lacing == 255 {
				continue;
			}

			// A lacing value below 255 terminates the packet.
			if let Some(data) = current.replace(BytesMut::new()) {
				let is_last = Some(index) == last;

				self.packets.push_back(Packet {
					data: data.freeze(),
					bos: page.is_bos() && first,
					eos: page.is_eos() && is_last,
					granule_position: (is_last && granule != -1).then_some(granule),
					number: self.count,
				});

				self.count += 1;
				first = false;
			}
		}

		// The final segment had a lacing value of 255, so the packet continues.
		if segments.last() == Some(&255) {
			self.partial = current;
		}

		true
	}

	/// Return the next complete packet, or None if another page is needed.
	pub fn pull_packet(&mut self) -> Option<Packet> {
		self.packets.pop_front()
	}
}
