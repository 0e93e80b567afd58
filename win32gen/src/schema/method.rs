use crate::raw::MetadataToken;
use crate::schema::{CallingConvention, TypeSig};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ParamSemantics {
	pub is_in: bool,
	pub is_out: bool,
	pub is_optional: bool,
}

/// Marshalling hints on a parameter or return value that change friendly-overload
/// shape: size-linked arrays, fixed-length arrays, delegate promotion.
#[derive(Debug, Clone, Default)]
pub struct ParamMarshal {
	pub size_param_index: Option<u16>,
	pub size_const: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Param {
	pub name: String,
	pub sequence: u16,
	pub ty: TypeSig,
	pub semantics: ParamSemantics,
	pub marshal: ParamMarshal,
}

#[derive(Debug, Clone)]
pub struct PInvokeInfo {
	pub module: String,
	pub entry_point: String,
	pub calling_convention: CallingConvention,
	pub supports_last_error: bool,
}

/// A method signature plus its parameters, after the raw blob has been decoded
/// and laid over the `Param` table rows so names and marshalling hints are attached.
#[derive(Debug, Clone)]
pub struct MethodDef {
	pub token: MetadataToken,
	pub name: String,
	pub owner: MetadataToken,
	pub return_type: TypeSig,
	pub params: Vec<Param>,
	pub pinvoke: Option<PInvokeInfo>,
	/// True for the sole invoke slot of a delegate or interface method — these are
	/// never candidates for raw P/Invoke emission, only for vtable/delegate shape.
	pub is_static: bool,
}

impl MethodDef {
	pub fn is_pinvoke(&self) -> bool {
		self.pinvoke.is_some()
	}
}
