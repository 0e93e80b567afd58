/// Which well-known Win32 metadata custom attribute a [`CustomAttribute`] carries.
/// Anything the generator doesn't special-case still round-trips as `Unknown`, so a
/// caller that only wants to check for presence (e.g. a marker attribute) still can.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AttributeKind {
	/// Names the release function for a handle typedef.
	RAIIFree,
	/// Marks a struct field's declared type as a distinct native typedef alias.
	NativeTypedef,
	/// Tags a constant as an IEEE special (`"NaN"`, `"PositiveInfinity"`, `"NegativeInfinity"`).
	ConstantSpecialValue,
	/// Carries bit offset/width for a struct field reconstructed as a bitfield accessor.
	NativeBitfield,
	/// Minimum OS version gate; carried through as a doc note, never gates emission.
	SupportedOSPlatform,
	/// Links an out-of-line constant back to the enum it logically belongs to.
	AssociatedEnum,
	/// Marks a handle typedef as a kernel-namespace handle.
	NamespaceHandle,
	/// Carries an interface's COM identity GUID.
	Guid,
	Unknown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeArg {
	Str(String),
	I32(i32),
	U32(u32),
	I64(i64),
	U64(u64),
	Bool(bool),
	Enum(String, i64),
}

/// A decoded custom attribute attached to some entity. The constructor's
/// declaring type name is kept as `attribute_type_name` for the `Unknown` fallback.
#[derive(Debug, Clone)]
pub struct CustomAttribute {
	pub kind: AttributeKind,
	pub attribute_type_name: String,
	pub fixed_args: Vec<AttributeArg>,
	pub named_args: Vec<(String, AttributeArg)>,
}

impl CustomAttribute {
	pub fn arg_str(&self, index: usize) -> Option<&str> {
		match self.fixed_args.get(index) {
			Some(AttributeArg::Str(s)) => Some(s.as_str()),
			_ => None,
		}
	}

	pub fn arg_i64(&self, index: usize) -> Option<i64> {
		match self.fixed_args.get(index) {
			Some(AttributeArg::I32(v)) => Some(*v as i64),
			Some(AttributeArg::U32(v)) => Some(*v as i64),
			Some(AttributeArg::I64(v)) => Some(*v),
			Some(AttributeArg::U64(v)) => Some(*v as i64),
			_ => None,
		}
	}

	pub fn named_str(&self, name: &str) -> Option<&str> {
		self.named_args.iter().find(|(n, _)| n == name).and_then(|(_, v)| match v {
			AttributeArg::Str(s) => Some(s.as_str()),
			_ => None,
		})
	}
}

pub fn classify_attribute_type_name(name: &str) -> AttributeKind {
	match name {
		"RAIIFreeAttribute" => AttributeKind::RAIIFree,
		"NativeTypedefAttribute" => AttributeKind::NativeTypedef,
		"ConstantAttribute" | "ConstantSpecialValueAttribute" => AttributeKind::ConstantSpecialValue,
		"NativeBitfieldAttribute" => AttributeKind::NativeBitfield,
		"SupportedOSPlatformAttribute" | "SupportedArchitectureAttribute" => AttributeKind::SupportedOSPlatform,
		"AssociatedEnumAttribute" => AttributeKind::AssociatedEnum,
		"NamespaceHandleAttribute" => AttributeKind::NamespaceHandle,
		"GuidAttribute" => AttributeKind::Guid,
		other => AttributeKind::Unknown(other.to_string()),
	}
}
