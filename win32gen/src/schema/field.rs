use crate::raw::MetadataToken;
use crate::schema::{ConstantValue, TypeSig};

/// A marshalling hint carried by a struct field: a fixed-length inline array
/// (`SizeConst`) reproduced verbatim from the native layout.
#[derive(Debug, Copy, Clone)]
pub struct FixedArrayHint {
	pub length: u32,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
	pub token: MetadataToken,
	pub name: String,
	pub owner: MetadataToken,
	pub ty: TypeSig,
	pub constant: Option<ConstantValue>,
	/// Present only under `[ClassLayout]` with explicit layout.
	pub explicit_offset: Option<u32>,
	pub fixed_array: Option<FixedArrayHint>,
	pub is_static: bool,
	/// Backing scalar + bit range, present when the field is a bitfield accessor
	/// reconstructed from a `NativeBitfield` custom attribute.
	pub bitfield: Option<BitfieldRange>,
}

#[derive(Debug, Copy, Clone)]
pub struct BitfieldRange {
	pub offset: u8,
	pub width: u8,
}

impl FieldDef {
	pub fn is_literal(&self) -> bool {
		self.constant.is_some()
	}
}
