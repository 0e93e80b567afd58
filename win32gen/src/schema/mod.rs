//! The metadata entity model: the typed view of a Win32 metadata file that
//! everything above [`crate::read`] operates on. Nothing in this module touches bytes;
//! [`crate::read::MetadataIndex`] is what materializes these types from the raw tables.

mod attribute;
mod constant;
mod field;
mod method;
mod signature;
mod type_def;

pub use attribute::*;
pub use constant::*;
pub use field::*;
pub use method::*;
pub use signature::*;
pub use type_def::*;

use crate::raw::MetadataToken;
use std::fmt::{Debug, Formatter};

/// A stable handle to a metadata entity, returned by [`crate::read::MetadataIndex`]
/// lookups. Cheap to copy; resolving it back into a [`TypeDef`]/[`MethodDef`]/etc. is a
/// separate step so callers can hold on to handles without borrowing the index.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct EntityHandle(pub(crate) MetadataToken);

impl EntityHandle {
	pub fn token(&self) -> MetadataToken {
		self.0
	}
}

impl Debug for EntityHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "EntityHandle({:?})", self.0)
	}
}
