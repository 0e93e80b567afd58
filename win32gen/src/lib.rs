#![allow(unused)]

pub mod accumulate;
pub mod collision;
pub mod config;
pub mod emit;
pub mod error;
pub mod generator;
pub mod handle;
pub mod project;
pub mod raw;
pub mod read;
pub mod schema;
pub(crate) mod utilities;

pub use accumulate::GeneratedUnit;
pub use config::{CompilationView, GenerationConfig};
pub use error::Error;
pub use generator::{CancellationToken, Generator};

/// Implements [`raw::FromByteStream`] for a `#[repr(C)]` struct by reading it as a
/// single unaligned value and cloning it out of the stream, instead of parsing it
/// field by field. Used for headers with no variable-width or coded-index fields.
#[macro_export]
macro_rules! __impl_clone_from_byte_stream {
	($ty:ty) => {
		impl $crate::raw::FromByteStream<'_> for $ty {
			fn from_byte_stream(stream: &mut $crate::raw::ByteStream) -> Result<Self, $crate::raw::Error> {
				Ok(stream.read_ref::<Self>()?.clone())
			}
		}
	};
}
