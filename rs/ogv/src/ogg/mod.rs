//! Ogg framing: page synchronization and packet reassembly.
//!
//! [Sync] finds checksummed pages in an arbitrary byte stream, and a [Stream]
//! per logical bitstream turns those pages back into codec packets.

mod crc;
mod page;
mod stream;
mod sync;

pub use page::*;
pub use stream::*;
pub use sync::*;

#[cfg(test)]
pub(crate) use crc::checksum;
