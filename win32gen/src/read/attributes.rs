//! Custom-attribute blob decoding (ECMA-335 §II.23.3). A `CustomAttribute` row
//! only gives us the constructor's coded token and a blob; to get at the fixed
//! and named arguments we need the constructor's own signature, fetched from
//! whichever of `MethodDef`/`MemberRef` the coded token resolves to.

use crate::read::blob::BlobReader;
use crate::read::signature::decode_type;
use crate::read::Error;
use crate::schema::{AttributeArg, TypeSig};

/// One fixed or named argument's expected type, derived from the ctor signature
/// for fixed args, or read as an `ELEMENT_TYPE` prefix for named args ("fields").
enum ArgShape {
	Bool,
	I1,
	U1,
	I2,
	U2,
	I4,
	U4,
	I8,
	U8,
	R4,
	R8,
	String,
	Enum,
	Object,
}

fn shape_of(ty: &TypeSig) -> ArgShape {
	match ty {
		TypeSig::Bool => ArgShape::Bool,
		TypeSig::I1 => ArgShape::I1,
		TypeSig::U1 => ArgShape::U1,
		TypeSig::I2 => ArgShape::I2,
		TypeSig::U2 => ArgShape::U2,
		TypeSig::I4 => ArgShape::I4,
		TypeSig::U4 => ArgShape::U4,
		TypeSig::I8 => ArgShape::I8,
		TypeSig::U8 => ArgShape::U8,
		TypeSig::R4 => ArgShape::R4,
		TypeSig::R8 => ArgShape::R8,
		TypeSig::String => ArgShape::String,
		TypeSig::ValueType(_) => ArgShape::Enum,
		_ => ArgShape::Object,
	}
}

fn read_fixed_arg(reader: &mut BlobReader, ty: &TypeSig) -> Result<AttributeArg, Error> {
	Ok(match shape_of(ty) {
		ArgShape::Bool => AttributeArg::Bool(reader.read_u8()? != 0),
		ArgShape::I1 => AttributeArg::I32(reader.read_u8()? as i8 as i32),
		ArgShape::U1 => AttributeArg::U32(reader.read_u8()? as u32),
		ArgShape::I2 => AttributeArg::I32(reader.read_u16()? as i16 as i32),
		ArgShape::U2 => AttributeArg::U32(reader.read_u16()? as u32),
		ArgShape::I4 => AttributeArg::I32(reader.read_i32()?),
		ArgShape::U4 => AttributeArg::U32(reader.read_u32()?),
		ArgShape::I8 => AttributeArg::I64(reader.read_i64()?),
		ArgShape::U8 => AttributeArg::U64(reader.read_u64()?),
		ArgShape::R4 => AttributeArg::I32(reader.read_f32()?.to_bits() as i32),
		ArgShape::R8 => AttributeArg::I64(reader.read_f64()?.to_bits() as i64),
		ArgShape::String => AttributeArg::Str(reader.read_packed_string()?.unwrap_or_default()),
		ArgShape::Enum => AttributeArg::Enum(String::new(), reader.read_i32()? as i64),
		ArgShape::Object => AttributeArg::I64(reader.read_i64().unwrap_or(0)),
	})
}

/// Named args are preceded by a `FIELD`/`PROPERTY` tag byte and an inline
/// `ELEMENT_TYPE` (or `ENUM` + type name for enum-typed named args), since the
/// ctor signature alone doesn't name them.
fn read_named_arg(reader: &mut BlobReader) -> Result<(String, AttributeArg), Error> {
	let _kind_tag = reader.read_u8()?; // 0x53 FIELD or 0x54 PROPERTY
	let field_type_tag = reader.read_u8()?;

	let arg = match field_type_tag {
		0x02 => AttributeArg::Bool(reader.read_u8()? != 0),
		0x04 => AttributeArg::I32(reader.read_u8()? as i8 as i32),
		0x05 => AttributeArg::U32(reader.read_u8()? as u32),
		0x06 => AttributeArg::I32(reader.read_u16()? as i16 as i32),
		0x07 => AttributeArg::U32(reader.read_u16()? as u32),
		0x08 => AttributeArg::I32(reader.read_i32()?),
		0x09 => AttributeArg::U32(reader.read_u32()?),
		0x0A => AttributeArg::I64(reader.read_i64()?),
		0x0B => AttributeArg::U64(reader.read_u64()?),
		0x0E => AttributeArg::Str(reader.read_packed_string()?.unwrap_or_default()),
		0x55 => {
			// ENUM: a packed string names the enum type, then a plain i32 value.
			let enum_name = reader.read_packed_string()?.unwrap_or_default();
			AttributeArg::Enum(enum_name, reader.read_i32()? as i64)
		}
		_ => AttributeArg::I64(reader.read_i32().unwrap_or(0) as i64),
	};

	let name = reader.read_packed_string()?.unwrap_or_default();
	Ok((name, arg))
}

/// Decodes a `CustomAttribute` blob given the resolved parameter types of the
/// attribute's constructor. Returns the fixed args in ctor-parameter order and
/// any named args that follow.
pub(crate) fn decode_custom_attribute_blob(
	blob: &[u8],
	ctor_param_types: &[TypeSig],
) -> Result<(Vec<AttributeArg>, Vec<(String, AttributeArg)>), Error> {
	if blob.is_empty() {
		return Ok((Vec::new(), Vec::new()));
	}

	let mut reader = BlobReader::new(blob);
	let prolog = reader.read_u16()?;
	if prolog != 0x0001 {
		return Err(Error::InvalidBlob("bad custom attribute prolog"));
	}

	let mut fixed_args = Vec::with_capacity(ctor_param_types.len());
	for ty in ctor_param_types {
		fixed_args.push(read_fixed_arg(&mut reader, ty)?);
	}

	let mut named_args = Vec::new();
	if reader.remaining() >= 2 {
		let num_named = reader.read_u16()?;
		for _ in 0..num_named {
			named_args.push(read_named_arg(&mut reader)?);
		}
	}

	Ok((fixed_args, named_args))
}

#[allow(dead_code)]
pub(crate) fn decode_type_standalone(blob: &[u8]) -> Result<TypeSig, Error> {
	let mut reader = BlobReader::new(blob);
	decode_type(&mut reader)
}
