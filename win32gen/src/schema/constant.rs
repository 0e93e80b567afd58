use crate::raw::MetadataToken;
use crate::schema::TypeSig;
use uuid::Uuid;

/// A constant's literal payload. IEEE specials are kept as real `f32`/`f64`
/// values — `f32::NAN`/`INFINITY` round-trip correctly — and only get a special-cased
/// literal expression at emission time.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
	Bool(bool),
	I8(i8),
	U8(u8),
	I16(i16),
	U16(u16),
	I32(i32),
	U32(u32),
	I64(i64),
	U64(u64),
	F32(f32),
	F64(f64),
	Str(String),
	Guid(Uuid),
	/// A handle-typed sentinel constant (e.g. `HBMMENU_POPUP_RESTORE`), carrying
	/// the raw integer value alongside the handle typedef it is declared against.
	HandleSentinel { raw: i64, handle_type: MetadataToken },
	Null,
}

impl ConstantValue {
	pub fn is_ieee_special(&self) -> bool {
		match self {
			ConstantValue::F32(v) => v.is_nan() || v.is_infinite(),
			ConstantValue::F64(v) => v.is_nan() || v.is_infinite(),
			_ => false,
		}
	}
}

#[derive(Debug, Clone)]
pub struct ConstantRef {
	pub token: MetadataToken,
	pub name: String,
	pub owner: MetadataToken,
	pub ty: TypeSig,
	pub value: ConstantValue,
}
