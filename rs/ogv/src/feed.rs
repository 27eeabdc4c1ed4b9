use std::io::{self, Read};

use crate::Result;
use crate::ogg::{Page, Sync};

/// The outcome of a single read from the byte source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
	/// This many bytes were handed to the synchronizer.
	Wrote(usize),

	/// The source is exhausted.
	Eof,
}

/// Perform one read from `source` into the synchronizer's staging area.
///
/// Interrupted reads are retried; any other failure is returned as-is.
pub fn fill<R: Read + ?Sized>(source: &mut R, sync: &mut Sync, size: usize) -> io::Result<Feed> {
	let buffer = sync.buffer(size);

	let result = loop {
		match source.read(buffer) {
			Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
			res => break res,
		}
	};

	sync.wrote(result.as_ref().copied().unwrap_or(0));

	Ok(match result? {
		0 => Feed::Eof,
		size => Feed::Wrote(size),
	})
}

/// Owns the byte source and the synchronizer it feeds.
///
/// Dropping the feeder closes the source.
pub(crate) struct Feeder<R> {
	source: R,
	sync: Sync,
	read_size: usize,
}

impl<R: Read> Feeder<R> {
	pub fn new(source: R, read_size: usize) -> Self {
		Self {
			source,
			sync: Sync::new(),
			read_size,
		}
	}

	pub fn fill(&mut self) -> Result<Feed> {
		let feed = fill(&mut self.source, &mut self.sync, self.read_size)?;
		tracing::trace!(?feed, "read container data");
		Ok(feed)
	}

	pub fn pull_page(&mut self) -> Option<Page> {
		self.sync.pull_page()
	}
}
