use crate::raw::MetadataToken;

/// A decoded metadata type signature (ECMA-335 §II.23.2). Field signatures and
/// method parameter/return signatures both bottom out in this type; the projector
/// is what turns it into a target-language type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSig {
	Void,
	Bool,
	Char,
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
	Guid,
	/// A value type referenced by `TypeDefOrRef` token: struct, union, enum or handle typedef.
	ValueType(MetadataToken),
	/// A reference type referenced by `TypeDefOrRef` token: COM interface or delegate.
	Class(MetadataToken),
	Ptr(Box<TypeSig>),
	SzArray(Box<TypeSig>),
	Array {
		of: Box<TypeSig>,
		rank: u32,
		sizes: Vec<u32>,
	},
	FnPtr(Box<MethodSignature>),
}

impl TypeSig {
	/// The metadata entity this signature needs emitted before it is well-formed,
	/// if any. Used by the projector to enqueue dependency emission keys.
	pub fn referenced_type(&self) -> Option<MetadataToken> {
		match self {
			TypeSig::ValueType(t) | TypeSig::Class(t) => Some(*t),
			TypeSig::Ptr(inner) | TypeSig::SzArray(inner) | TypeSig::Array { of: inner, .. } => inner.referenced_type(),
			_ => None,
		}
	}

	pub fn is_pointer(&self) -> bool {
		matches!(self, TypeSig::Ptr(_))
	}
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CallingConvention {
	Default,
	Cdecl,
	StdCall,
	ThisCall,
	FastCall,
	VarArg,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
	pub calling_convention: CallingConvention,
	pub return_type: TypeSig,
	pub params: Vec<TypeSig>,
}
