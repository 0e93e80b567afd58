use crate::raw::ElementType;
use crate::read::blob::BlobReader;
use crate::read::Error;
use crate::schema::{CallingConvention, MethodSignature, TypeSig};

const ELEMENT_TYPE_CMOD_REQD: u8 = ElementType::CModReqd as u8;
const ELEMENT_TYPE_CMOD_OPT: u8 = ElementType::CModOpt as u8;
const ELEMENT_TYPE_PINNED: u8 = ElementType::Pinned as u8;

/// `FIELD` signature (ECMA-335 §II.23.2.4): a fixed `0x06` tag then a single type.
pub(crate) fn decode_field_signature(blob: &[u8]) -> Result<TypeSig, Error> {
	let mut reader = BlobReader::new(blob);
	let tag = reader.read_u8()?;
	if tag != 0x06 {
		return Err(Error::InvalidBlob("expected FIELD signature tag"));
	}
	decode_type(&mut reader)
}

/// `MethodDefSig`/`MethodRefSig` (ECMA-335 §II.23.2.1/.2).
pub(crate) fn decode_method_signature(blob: &[u8]) -> Result<(MethodSignature, bool), Error> {
	let mut reader = BlobReader::new(blob);
	let flags = reader.read_u8()?;
	let has_this = flags & 0x20 != 0;
	let calling_convention = calling_convention_of(flags & 0x0F);

	let param_count = reader.read_compressed_u32()?;
	let return_type = decode_type(&mut reader)?;

	let mut params = Vec::with_capacity(param_count as usize);
	for _ in 0..param_count {
		skip_custom_mods(&mut reader)?;
		if reader.remaining() > 0 {
			params.push(decode_type(&mut reader)?);
		}
	}

	Ok((
		MethodSignature {
			calling_convention,
			return_type,
			params,
		},
		has_this,
	))
}

fn skip_custom_mods(reader: &mut BlobReader) -> Result<(), Error> {
	loop {
		if reader.remaining() == 0 {
			return Ok(());
		}
		let peek = reader.read_u8()?;
		reader.rewind_one();
		if peek == ELEMENT_TYPE_CMOD_REQD || peek == ELEMENT_TYPE_CMOD_OPT {
			reader.read_u8()?;
			reader.read_type_def_or_ref_token()?;
		} else {
			return Ok(());
		}
	}
}

fn calling_convention_of(convention_tag: u8) -> CallingConvention {
	match convention_tag {
		0x1 => CallingConvention::Cdecl,
		0x2 => CallingConvention::StdCall,
		0x3 => CallingConvention::ThisCall,
		0x4 => CallingConvention::FastCall,
		0x5 => CallingConvention::VarArg,
		_ => CallingConvention::Default,
	}
}

pub(crate) fn decode_type(reader: &mut BlobReader) -> Result<TypeSig, Error> {
	skip_custom_mods(reader)?;
	let tag = reader.read_u8()?;

	if tag == ELEMENT_TYPE_PINNED {
		return decode_type(reader);
	}

	Ok(match tag {
		t if t == ElementType::Void as u8 => TypeSig::Void,
		t if t == ElementType::Bool as u8 => TypeSig::Bool,
		t if t == ElementType::Char as u8 => TypeSig::Char,
		t if t == ElementType::I1 as u8 => TypeSig::I1,
		t if t == ElementType::U1 as u8 => TypeSig::U1,
		t if t == ElementType::I2 as u8 => TypeSig::I2,
		t if t == ElementType::U2 as u8 => TypeSig::U2,
		t if t == ElementType::I4 as u8 => TypeSig::I4,
		t if t == ElementType::U4 as u8 => TypeSig::U4,
		t if t == ElementType::I8 as u8 => TypeSig::I8,
		t if t == ElementType::U8 as u8 => TypeSig::U8,
		t if t == ElementType::R4 as u8 => TypeSig::R4,
		t if t == ElementType::R8 as u8 => TypeSig::R8,
		t if t == ElementType::String as u8 => TypeSig::String,
		t if t == ElementType::IPtr as u8 => TypeSig::I8,
		t if t == ElementType::UPtr as u8 => TypeSig::U8,
		t if t == ElementType::Object as u8 => TypeSig::Class(crate::raw::MetadataToken::null()),

		t if t == ElementType::ValueType as u8 => TypeSig::ValueType(reader.read_type_def_or_ref_token()?),
		t if t == ElementType::Class as u8 => TypeSig::Class(reader.read_type_def_or_ref_token()?),

		t if t == ElementType::Ptr as u8 => {
			skip_custom_mods(reader)?;
			if reader.remaining() > 0 {
				TypeSig::Ptr(Box::new(decode_type(reader)?))
			} else {
				TypeSig::Ptr(Box::new(TypeSig::Void))
			}
		}

		t if t == ElementType::SzArray as u8 => {
			skip_custom_mods(reader)?;
			TypeSig::SzArray(Box::new(decode_type(reader)?))
		}

		t if t == ElementType::Array as u8 => {
			let of = decode_type(reader)?;
			let rank = reader.read_compressed_u32()?;
			let num_sizes = reader.read_compressed_u32()?;
			let mut sizes = Vec::with_capacity(num_sizes as usize);
			for _ in 0..num_sizes {
				sizes.push(reader.read_compressed_u32()?);
			}
			let num_lo_bounds = reader.read_compressed_u32()?;
			for _ in 0..num_lo_bounds {
				reader.read_compressed_u32()?;
			}
			TypeSig::Array {
				of: Box::new(of),
				rank,
				sizes,
			}
		}

		t if t == ElementType::FnPtr as u8 => {
			let (sig, _has_this) = decode_method_signature_inline(reader)?;
			TypeSig::FnPtr(Box::new(sig))
		}

		other => return Err(Error::InvalidBlob(Box::leak(format!("unsupported ELEMENT_TYPE 0x{other:X}").into_boxed_str()))),
	})
}

fn decode_method_signature_inline(reader: &mut BlobReader) -> Result<(MethodSignature, bool), Error> {
	let flags = reader.read_u8()?;
	let has_this = flags & 0x20 != 0;
	let calling_convention = calling_convention_of(flags & 0x0F);
	let param_count = reader.read_compressed_u32()?;
	let return_type = decode_type(reader)?;
	let mut params = Vec::with_capacity(param_count as usize);
	for _ in 0..param_count {
		params.push(decode_type(reader)?);
	}
	Ok((
		MethodSignature {
			calling_convention,
			return_type,
			params,
		},
		has_this,
	))
}
