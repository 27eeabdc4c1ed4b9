use std::num::NonZeroU32;

use crate::Error;

/// A positive handle handed out to C callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(NonZeroU32);

impl Id {
	fn from_key(key: usize) -> Option<Self> {
		let value = u32::try_from(key.checked_add(1)?).ok()?;
		NonZeroU32::new(value).map(Self)
	}

	fn key(self) -> usize {
		self.0.get() as usize - 1
	}
}

impl TryFrom<i32> for Id {
	type Error = Error;

	fn try_from(value: i32) -> Result<Self, Error> {
		u32::try_from(value)
			.ok()
			.and_then(NonZeroU32::new)
			.map(Self)
			.ok_or(Error::InvalidId)
	}
}

impl TryFrom<Id> for i32 {
	type Error = std::num::TryFromIntError;

	fn try_from(id: Id) -> Result<Self, Self::Error> {
		i32::try_from(id.0.get())
	}
}

/// A [slab::Slab] whose handles start at 1, so 0 and negative values can signal errors.
pub struct NonZeroSlab<T>(slab::Slab<T>);

impl<T> Default for NonZeroSlab<T> {
	fn default() -> Self {
		Self(slab::Slab::new())
	}
}

impl<T> NonZeroSlab<T> {
	pub fn insert(&mut self, value: T) -> Result<Id, Error> {
		let entry = self.0.vacant_entry();
		let id = Id::from_key(entry.key()).ok_or(Error::InvalidId)?;
		entry.insert(value);
		Ok(id)
	}

	pub fn get(&self, id: Id) -> Option<&T> {
		self.0.get(id.key())
	}

	pub fn remove(&mut self, id: Id) -> Option<T> {
		self.0.try_remove(id.key())
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ids_start_at_one() {
		let mut slab = NonZeroSlab::default();
		let first = slab.insert("first").unwrap();
		let second = slab.insert("second").unwrap();

		assert_eq!(i32::try_from(first).unwrap(), 1);
		assert_eq!(i32::try_from(second).unwrap(), 2);
		assert_eq!(slab.get(second), Some(&"second"));

		assert_eq!(slab.remove(first), Some("first"));
		assert_eq!(slab.remove(first), None);
		assert_eq!(slab.len(), 1);
	}

	#[test]
	fn test_parse() {
		assert!(Id::try_from(0).is_err());
		assert!(Id::try_from(-4).is_err());
		assert_eq!(i32::try_from(Id::try_from(7).unwrap()).unwrap(), 7);
	}
}
