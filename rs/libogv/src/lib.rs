//! C bindings for `ogv`.
//!
//! Decoders are referenced by positive integer handles, and every decoded frame or packet is a heap allocation
//! that the caller must free exactly once. Functions return negative codes on failure.

mod api;
mod error;
mod ffi;
mod id;
mod state;

pub use api::*;
pub use error::*;
pub use id::*;
