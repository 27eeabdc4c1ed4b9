use bytes::BytesMut;

use super::{CAPTURE, Page, Scan};

/// Splits a raw byte stream into checksummed pages.
///
/// Bytes are written into a staging area returned by [Sync::buffer] and committed with [Sync::wrote].
/// Garbage between pages is skipped until the next valid capture pattern.
#[derive(Default)]
pub struct Sync {
	data: BytesMut,

	// Bytes at the end of `data` handed out by `buffer` but not yet committed.
	staged: usize,
}

impl Sync {
	pub fn new() -> Self {
		Self::default()
	}

	/// Return a writable staging area of exactly `size` bytes.
	///
	/// Any previously staged but uncommitted bytes are discarded.
	pub fn buffer(&mut self, size: usize) -> &mut [u8] {
		let len = self.valid();
		self.data.truncate(len);
		self.data.resize(len + size, 0);
		self.staged = size;
		&mut self.data[len..]
	}

	/// Commit the first `size` bytes of the staging area.
	pub fn wrote(&mut self, size: usize) {
		let size = size.min(self.staged);
		let len = self.valid() + size;
		self.data.truncate(len);
		self.staged = 0;
	}

	/// Append bytes directly, bypassing the staging area.
	pub fn push(&mut self, data: &[u8]) {
		self.buffer(data.len()).copy_from_slice(data);
		self.wrote(data.len());
	}

	/// The number of committed bytes not yet returned as pages.
	pub fn buffered(&self) -> usize {
		self.valid()
	}

	/// Return the next complete page, or None if more data is needed.
	pub fn pull_page(&mut self) -> Option<Page> {
		loop {
			let valid = self.valid();
			let data = &self.data[..valid];

			let Some(start) = data.windows(CAPTURE.len()).position(|window| window == CAPTURE) else {
				// Keep a tail that could be the start of a capture pattern.
				let keep = valid.min(CAPTURE.len() - 1);
				self.skip(valid - keep);
				return None;
			};

			if start > 0 {
				tracing::debug!(skipped = start, "lost sync, skipping to next capture pattern");
				self.skip(start);
			}

			match Page::scan(&self.data[..self.valid()]) {
				Scan::Incomplete => return None,
				Scan::Invalid => {
					tracing::debug!("invalid page, resyncing");
					self.skip(1);
				}
				Scan::Complete(size) => {
					let page = self.data.split_to(size).freeze();
					return Some(Page::new(page));
				}
			}
		}
	}

	fn valid(&self) -> usize {
		self.data.len() - self.staged
	}

	fn skip(&mut self, size: usize) {
		let _ = self.data.split_to(size);
	}
}
