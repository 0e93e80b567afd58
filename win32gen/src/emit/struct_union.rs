//! Struct/union emission: fields in metadata order, `#[repr(C)]` plus layout
//! annotations reproducing the metadata's explicit/sequential layout exactly.
//! Bitfields become a private backing scalar plus accessor methods; fixed
//! arrays become `[T; N]`; reserved-word field names are `r#`-escaped.

use crate::emit::EmitOutput;
use crate::project::{project, ProjectionContext, ProjectionSite};
use crate::read::MetadataIndex;
use crate::schema::{Layout, TypeDef, TypeKind};
use crate::utilities::escape_reserved;

pub fn emit_struct_union(index: &MetadataIndex, type_def: &TypeDef) -> EmitOutput {
	let mut deps = Vec::new();
	let mut field_lines = Vec::new();
	let mut accessor_lines = Vec::new();

	for field_token in &type_def.fields {
		let Some(field) = index.find_field_by_token(*field_token) else { continue };
		if field.is_static {
			continue;
		}

		let field_name = escape_reserved(&field.name);

		if let Some(bitfield) = &field.bitfield {
			let backing = format!("__bitfield_{}", field.name);
			if !field_lines.iter().any(|l: &String| l.contains(&backing)) {
				field_lines.push(format!("\tpub {backing}: u32,"));
			}

			let mask: u32 = ((1u64 << bitfield.width) - 1) as u32;
			accessor_lines.push(format!(
				"\tpub fn {name}(&self) -> u32 {{\n\t\t(self.{backing} >> {offset}) & {mask:#x}\n\t}}\n\n\tpub fn set_{name}(&mut self, value: u32) {{\n\t\tself.{backing} = (self.{backing} & !({mask:#x} << {offset})) | ((value & {mask:#x}) << {offset});\n\t}}",
				name = field_name,
				backing = backing,
				offset = bitfield.offset,
				mask = mask,
			));
			continue;
		}

		let ctx = ProjectionContext::new(index, ProjectionSite::Field, &type_def.namespace, false);
		let (projected, field_deps) = project(&field.ty, &ctx);
		deps.extend(field_deps);

		let ty_text = match &field.fixed_array {
			Some(hint) => format!("[{}; {}]", projected.render(&type_def.namespace), hint.length),
			None => projected.render(&type_def.namespace),
		};

		field_lines.push(format!("\tpub {field_name}: {ty_text},"));
	}

	let repr = match type_def.layout {
		Layout::Explicit { pack, .. } if pack > 0 => format!("#[repr(C, packed({pack}))]"),
		_ if type_def.kind == TypeKind::Union => "#[repr(C)]".to_string(),
		_ => "#[repr(C)]".to_string(),
	};

	let keyword = if type_def.kind == TypeKind::Union { "union" } else { "struct" };

	let mut source = String::new();
	source.push_str(&repr);
	source.push('\n');
	source.push_str("#[derive(Clone, Copy)]\n");
	source.push_str(&format!("pub {keyword} {} {{\n", type_def.name));
	source.push_str(&field_lines.join("\n"));
	source.push_str("\n}\n");

	if !accessor_lines.is_empty() {
		source.push_str(&format!("\nimpl {} {{\n", type_def.name));
		source.push_str(&accessor_lines.join("\n\n"));
		source.push_str("\n}\n");
	}

	EmitOutput::new(source).with_dependencies(deps)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::raw::{MetadataToken, MetadataTokenKind};
	use crate::schema::{BitfieldRange, FieldDef, FixedArrayHint, TypeSig};
	use std::collections::HashMap;

	fn field(token: MetadataToken, name: &str, ty: TypeSig) -> FieldDef {
		FieldDef {
			token,
			name: name.to_string(),
			owner: MetadataToken::null(),
			ty,
			constant: None,
			explicit_offset: None,
			fixed_array: None,
			is_static: false,
			bitfield: None,
		}
	}

	fn type_def(fields: Vec<MetadataToken>, kind: TypeKind) -> TypeDef {
		TypeDef {
			token: MetadataToken::new(1, MetadataTokenKind::TypeDef),
			namespace: "Windows.Win32.Foundation".to_string(),
			name: "RECT".to_string(),
			kind,
			layout: Layout::Sequential { pack: 0, size: 0 },
			base: None,
			fields,
			methods: Vec::new(),
			interfaces: Vec::new(),
			nested_types: Vec::new(),
			enclosing_type: None,
			guid: None,
			delegate_signature: None,
		}
	}

	#[test]
	fn bool_field_keeps_declared_typedef_not_native_bool() {
		let f = field(MetadataToken::new(1, MetadataTokenKind::Field), "fIcon", TypeSig::Bool);
		let td = type_def(vec![f.token], TypeKind::Struct);
		let index = MetadataIndex::from_parts(vec![td.clone()], Vec::new(), vec![f], Vec::new(), HashMap::new());

		let out = emit_struct_union(&index, &td);
		assert!(out.source.contains("pub fIcon: BOOL,"));
		assert!(!out.source.contains("pub fIcon: bool,"));
	}

	#[test]
	fn reserved_word_field_names_are_escaped() {
		let f = field(MetadataToken::new(2, MetadataTokenKind::Field), "type", TypeSig::I4);
		let td = type_def(vec![f.token], TypeKind::Struct);
		let index = MetadataIndex::from_parts(vec![td.clone()], Vec::new(), vec![f], Vec::new(), HashMap::new());

		let out = emit_struct_union(&index, &td);
		assert!(out.source.contains("pub r#type: i32,"));
	}

	#[test]
	fn fixed_array_field_renders_as_inline_array() {
		let mut f = field(MetadataToken::new(3, MetadataTokenKind::Field), "szName", TypeSig::U2);
		f.fixed_array = Some(FixedArrayHint { length: 260 });
		let td = type_def(vec![f.token], TypeKind::Struct);
		let index = MetadataIndex::from_parts(vec![td.clone()], Vec::new(), vec![f], Vec::new(), HashMap::new());

		let out = emit_struct_union(&index, &td);
		assert!(out.source.contains("pub szName: [u16; 260],"));
	}

	#[test]
	fn bitfield_produces_accessor_methods() {
		let mut f = field(MetadataToken::new(4, MetadataTokenKind::Field), "flags", TypeSig::U4);
		f.bitfield = Some(BitfieldRange { offset: 2, width: 3 });
		let td = type_def(vec![f.token], TypeKind::Struct);
		let index = MetadataIndex::from_parts(vec![td.clone()], Vec::new(), vec![f], Vec::new(), HashMap::new());

		let out = emit_struct_union(&index, &td);
		assert!(out.source.contains("pub fn flags(&self)"));
		assert!(out.source.contains("pub fn set_flags(&mut self"));
	}

	#[test]
	fn union_kind_emits_union_keyword() {
		let f = field(MetadataToken::new(5, MetadataTokenKind::Field), "value", TypeSig::I4);
		let td = type_def(vec![f.token], TypeKind::Union);
		let index = MetadataIndex::from_parts(vec![td.clone()], Vec::new(), vec![f], Vec::new(), HashMap::new());

		let out = emit_struct_union(&index, &td);
		assert!(out.source.contains("pub union RECT"));
	}
}
