//! Enum emission: the underlying integer type is preserved as a plain
//! integer type alias, and members are emitted as associated `const`s rather
//! than `enum` variants. Win32 enums routinely gain platform-specific members
//! after a binding is generated; associated constants keep the type open to
//! that without ever needing `#[non_exhaustive]` or a breaking regeneration.

use crate::emit::EmitOutput;
use crate::read::MetadataIndex;
use crate::schema::{AttributeKind, ConstantRef, ConstantValue, TypeDef};

pub fn emit_enum(index: &MetadataIndex, type_def: &TypeDef) -> EmitOutput {
	// The underlying scalar width is carried by the single non-static field
	// every metadata enum declares (`value__`); default to `i32` (the Win32
	// convention) if, unusually, none is present.
	let underlying = type_def
		.fields
		.iter()
		.filter_map(|t| index.find_field_by_token(*t))
		.find(|f| !f.is_static)
		.map(|f| integer_type_name(&f.ty))
		.unwrap_or("i32");

	let mut source = String::new();
	source.push_str(&format!("#[repr(transparent)]\n#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]\npub struct {}(pub {});\n\n", type_def.name, underlying));
	source.push_str(&format!("impl {} {{\n", type_def.name));

	let members: Vec<&crate::schema::FieldDef> = type_def
		.fields
		.iter()
		.filter_map(|t| index.find_field_by_token(*t))
		.filter(|f| f.is_static && f.is_literal())
		.collect();

	for member in &members {
		let value = member.constant.as_ref().map(render_integer_literal).unwrap_or_else(|| "0".to_string());
		source.push_str(&format!("\tpub const {}: {} = {}({});\n", member.name, type_def.name, type_def.name, value));
	}

	for constant in associated_constants(index, type_def) {
		let value = render_integer_literal(&constant.value);
		source.push_str(&format!("\tpub const {}: {} = {}({});\n", constant.name, type_def.name, type_def.name, value));
	}

	source.push_str("}\n");

	EmitOutput::new(source)
}

/// Out-of-line constants tagged `AssociatedEnumAttribute` naming this enum —
/// Win32 metadata's way of extending an enum's member set from a constant
/// declared elsewhere (e.g. platform-specific values added after the enum
/// itself was defined) without touching the enum's own field list.
fn associated_constants<'a>(index: &'a MetadataIndex, type_def: &TypeDef) -> Vec<&'a ConstantRef> {
	index
		.constants()
		.iter()
		.filter(|c| c.owner != type_def.token)
		.filter(|c| {
			index
				.get_custom_attribute(c.token, &AttributeKind::AssociatedEnum)
				.and_then(|a| a.arg_str(0))
				== Some(type_def.name.as_str())
		})
		.collect()
}

fn integer_type_name(ty: &crate::schema::TypeSig) -> &'static str {
	use crate::schema::TypeSig::*;
	match ty {
		I1 => "i8",
		U1 => "u8",
		I2 => "i16",
		U2 => "u16",
		I4 => "i32",
		U4 => "u32",
		I8 => "i64",
		U8 => "u64",
		_ => "i32",
	}
}

fn render_integer_literal(value: &ConstantValue) -> String {
	match value {
		ConstantValue::I8(v) => v.to_string(),
		ConstantValue::U8(v) => v.to_string(),
		ConstantValue::I16(v) => v.to_string(),
		ConstantValue::U16(v) => v.to_string(),
		ConstantValue::I32(v) => v.to_string(),
		ConstantValue::U32(v) => v.to_string(),
		ConstantValue::I64(v) => v.to_string(),
		ConstantValue::U64(v) => v.to_string(),
		_ => "0".to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::raw::{MetadataToken, MetadataTokenKind};
	use crate::schema::{FieldDef, Layout, TypeKind, TypeSig};
	use std::collections::HashMap;

	#[test]
	fn members_emit_as_associated_consts_not_enum_variants() {
		let owner = MetadataToken::new(1, MetadataTokenKind::TypeDef);
		let member = FieldDef {
			token: MetadataToken::new(1, MetadataTokenKind::Field),
			name: "FILE_CREATE_NEW".to_string(),
			owner,
			ty: TypeSig::I4,
			constant: Some(ConstantValue::I32(1)),
			explicit_offset: None,
			fixed_array: None,
			is_static: true,
			bitfield: None,
		};

		let td = TypeDef {
			token: owner,
			namespace: "Windows.Win32.Storage.FileSystem".to_string(),
			name: "FILE_CREATE_FLAGS".to_string(),
			kind: TypeKind::Enum,
			layout: Layout::Auto,
			base: None,
			fields: vec![member.token],
			methods: Vec::new(),
			interfaces: Vec::new(),
			nested_types: Vec::new(),
			enclosing_type: None,
			guid: None,
			delegate_signature: None,
		};

		let index = MetadataIndex::from_parts(vec![td.clone()], Vec::new(), vec![member], Vec::new(), HashMap::new());
		let out = emit_enum(&index, &td);

		assert!(out.source.contains("pub struct FILE_CREATE_FLAGS(pub i32)"));
		assert!(out.source.contains("pub const FILE_CREATE_NEW: FILE_CREATE_FLAGS = FILE_CREATE_FLAGS(1);"));
		assert!(!out.source.contains("enum FILE_CREATE_FLAGS"));
	}

	#[test]
	fn out_of_line_associated_enum_constant_is_appended() {
		use crate::schema::{AttributeArg, ConstantRef, CustomAttribute};
		use std::collections::HashMap;

		let owner = MetadataToken::new(1, MetadataTokenKind::TypeDef);
		let member = FieldDef {
			token: MetadataToken::new(1, MetadataTokenKind::Field),
			name: "FILE_CREATE_NEW".to_string(),
			owner,
			ty: TypeSig::I4,
			constant: Some(ConstantValue::I32(1)),
			explicit_offset: None,
			fixed_array: None,
			is_static: true,
			bitfield: None,
		};

		let td = TypeDef {
			token: owner,
			namespace: "Windows.Win32.Storage.FileSystem".to_string(),
			name: "FILE_CREATE_FLAGS".to_string(),
			kind: TypeKind::Enum,
			layout: Layout::Auto,
			base: None,
			fields: vec![member.token],
			methods: Vec::new(),
			interfaces: Vec::new(),
			nested_types: Vec::new(),
			enclosing_type: None,
			guid: None,
			delegate_signature: None,
		};

		let extra_owner = MetadataToken::new(2, MetadataTokenKind::TypeDef);
		let extra_token = MetadataToken::new(99, MetadataTokenKind::Field);
		let extra_constant = ConstantRef {
			token: extra_token,
			name: "FILE_CREATE_ALWAYS_NEW".to_string(),
			owner: extra_owner,
			ty: TypeSig::I4,
			value: ConstantValue::I32(5),
		};

		let mut attributes_by_owner = HashMap::new();
		attributes_by_owner.insert(
			extra_token,
			vec![CustomAttribute {
				kind: AttributeKind::AssociatedEnum,
				attribute_type_name: "AssociatedEnumAttribute".to_string(),
				fixed_args: vec![AttributeArg::Str("FILE_CREATE_FLAGS".to_string())],
				named_args: Vec::new(),
			}],
		);

		let index = MetadataIndex::from_parts(vec![td.clone()], Vec::new(), vec![member], vec![extra_constant], attributes_by_owner);
		let out = emit_enum(&index, &td);

		assert!(out.source.contains("pub const FILE_CREATE_ALWAYS_NEW: FILE_CREATE_FLAGS = FILE_CREATE_FLAGS(5);"));
	}
}
