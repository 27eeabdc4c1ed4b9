use std::ffi::{CStr, c_char};

use crate::{Error, Id};

/// Run `f`, converting its result (or a panic) into a C return code.
pub fn return_code<C: ReturnCode, F: FnOnce() -> C>(f: F) -> i32 {
	match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
		Ok(ret) => ret.code(),
		Err(_) => Error::Panic.code(),
	}
}

/// Run `f`, returning null on an error, a panic, or nothing to return.
pub fn return_ptr<T, F: FnOnce() -> Result<*mut T, Error>>(f: F) -> *mut T {
	match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
		Ok(Ok(ptr)) => ptr,
		Ok(Err(err)) => {
			err.code();
			std::ptr::null_mut()
		}
		Err(_) => {
			Error::Panic.code();
			std::ptr::null_mut()
		}
	}
}

pub trait ReturnCode {
	fn code(&self) -> i32;
}

impl ReturnCode for () {
	fn code(&self) -> i32 {
		0
	}
}

impl ReturnCode for bool {
	fn code(&self) -> i32 {
		*self as i32
	}
}

impl ReturnCode for Id {
	fn code(&self) -> i32 {
		i32::try_from(*self).unwrap_or_else(|_| Error::InvalidCode.code())
	}
}

impl<T: ReturnCode> ReturnCode for Result<T, Error> {
	fn code(&self) -> i32 {
		match self {
			Ok(ret) => ret.code(),
			Err(err) => err.code(),
		}
	}
}

pub fn parse_id(id: i32) -> Result<Id, Error> {
	Id::try_from(id)
}

/// # Safety
///
/// The caller must ensure that cstr is null or a valid C string for 'a.
pub unsafe fn parse_str<'a>(cstr: *const c_char) -> Result<&'a str, Error> {
	if cstr.is_null() {
		return Ok("");
	}

	let string = unsafe { CStr::from_ptr(cstr) };
	Ok(string.to_str()?)
}

/// # Safety
///
/// The caller must ensure that cstr is null or a valid C string for 'a.
pub unsafe fn parse_path<'a>(cstr: *const c_char) -> Result<&'a std::path::Path, Error> {
	if cstr.is_null() {
		return Err(Error::InvalidPointer);
	}

	let path = unsafe { parse_str(cstr)? };
	Ok(std::path::Path::new(path))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_return_code() {
		assert_eq!(return_code(|| ()), 0);
		assert_eq!(return_code(|| true), 1);
		assert_eq!(return_code(|| Ok::<_, Error>(false)), 0);
		assert_eq!(return_code(|| Err::<(), _>(Error::NotFound)), -4);
		assert_eq!(return_code(|| Id::try_from(3)), 3);
	}

	#[test]
	fn test_return_ptr() {
		let ptr = Box::into_raw(Box::new(5));
		assert_eq!(return_ptr(|| Ok(ptr)), ptr);
		drop(unsafe { Box::from_raw(ptr) });

		assert!(return_ptr::<i32, _>(|| Err(Error::NotFound)).is_null());
	}

	#[test]
	fn test_parse_str() {
		assert_eq!(unsafe { parse_str(std::ptr::null()) }.unwrap(), "");
		assert_eq!(unsafe { parse_str(c"debug".as_ptr()) }.unwrap(), "debug");
		assert!(unsafe { parse_path(std::ptr::null()) }.is_err());
	}
}
