//! Low level decoding of the compressed integers, compressed tokens and packed
//! strings used inside signature and custom-attribute blobs (ECMA-335 §II.23.2).
//! Distinct from [`crate::raw::ByteStream`], which reads fixed-width table rows —
//! this reader deals in the variable-width encodings blobs use internally.

use crate::raw::{MetadataToken, MetadataTokenKind};
use crate::read::Error;

pub struct BlobReader<'l> {
	bytes: &'l [u8],
	position: usize,
}

impl<'l> BlobReader<'l> {
	pub fn new(bytes: &'l [u8]) -> Self {
		Self { bytes, position: 0 }
	}

	pub fn is_empty(&self) -> bool {
		self.position >= self.bytes.len()
	}

	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.position)
	}

	/// Steps back one byte. Used to implement lookahead for the optional
	/// custom-modifier prefixes in method/field signatures.
	pub fn rewind_one(&mut self) {
		self.position = self.position.saturating_sub(1);
	}

	fn take(&mut self, count: usize) -> Result<&'l [u8], Error> {
		if self.position + count > self.bytes.len() {
			return Err(Error::InvalidBlob("unexpected end of blob"));
		}
		let slice = &self.bytes[self.position..self.position + count];
		self.position += count;
		Ok(slice)
	}

	pub fn read_u8(&mut self) -> Result<u8, Error> {
		Ok(self.take(1)?[0])
	}

	pub fn read_u16(&mut self) -> Result<u16, Error> {
		let b = self.take(2)?;
		Ok(u16::from_le_bytes([b[0], b[1]]))
	}

	pub fn read_u32(&mut self) -> Result<u32, Error> {
		let b = self.take(4)?;
		Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
	}

	pub fn read_i32(&mut self) -> Result<i32, Error> {
		Ok(self.read_u32()? as i32)
	}

	pub fn read_u64(&mut self) -> Result<u64, Error> {
		let b = self.take(8)?;
		Ok(u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
	}

	pub fn read_i64(&mut self) -> Result<i64, Error> {
		Ok(self.read_u64()? as i64)
	}

	pub fn read_f32(&mut self) -> Result<f32, Error> {
		Ok(f32::from_bits(self.read_u32()?))
	}

	pub fn read_f64(&mut self) -> Result<f64, Error> {
		Ok(f64::from_bits(self.read_u64()?))
	}

	/// ECMA-335 §II.23.2: a 1-, 2- or 4-byte little-endian-ish compressed unsigned int.
	pub fn read_compressed_u32(&mut self) -> Result<u32, Error> {
		let first = self.read_u8()?;
		if first & 0x80 == 0 {
			Ok(first as u32)
		} else if first & 0xC0 == 0x80 {
			let second = self.read_u8()?;
			Ok((((first & 0x3F) as u32) << 8) | second as u32)
		} else if first & 0xE0 == 0xC0 {
			let rest = self.take(3)?;
			Ok((((first & 0x1F) as u32) << 24) | ((rest[0] as u32) << 16) | ((rest[1] as u32) << 8) | rest[2] as u32)
		} else {
			Err(Error::InvalidBlob("invalid compressed integer"))
		}
	}

	/// A compressed `TypeDefOrRef` coded token embedded in a signature (distinct
	/// encoding from the table-row coded indices in [`crate::raw::CodedIndex`]).
	pub fn read_type_def_or_ref_token(&mut self) -> Result<MetadataToken, Error> {
		let coded = self.read_compressed_u32()?;
		let tag = coded & 0x3;
		let index = (coded >> 2) as usize;
		let kind = match tag {
			0 => MetadataTokenKind::TypeDef,
			1 => MetadataTokenKind::TypeRef,
			2 => MetadataTokenKind::TypeSpec,
			_ => return Err(Error::InvalidBlob("invalid TypeDefOrRef tag")),
		};
		Ok(MetadataToken::new(index as u32, kind))
	}

	/// `SerString` (ECMA-335 §II.23.3): a compressed length prefix followed by
	/// UTF-8 bytes, or `0xFF` standing in for a null string.
	pub fn read_packed_string(&mut self) -> Result<Option<String>, Error> {
		if self.position < self.bytes.len() && self.bytes[self.position] == 0xFF {
			self.position += 1;
			return Ok(None);
		}

		let len = self.read_compressed_u32()? as usize;
		let bytes = self.take(len)?;
		Ok(Some(String::from_utf8_lossy(bytes).into_owned()))
	}
}
