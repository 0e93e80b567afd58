//! COM interface emission: a `#[repr(C)] struct <Name>Vtbl` function-pointer
//! table plus a `#[repr(transparent)]` pointer newtype over it. Base-interface
//! slots are vtable-concatenated in declaration order — COM vtable layout is
//! positional, so this is plain field order, not Rust trait inheritance.
//! `type_def.interfaces` already lists every base recursively (see
//! `schema::TypeDef::interfaces`), so no further base-walking is needed here.

use crate::accumulate::{EmissionKey, WellKnownType};
use crate::emit::EmitOutput;
use crate::project::{project, ProjectedType, ProjectionContext, ProjectionSite};
use crate::read::MetadataIndex;
use crate::schema::{MethodDef, TypeDef};

pub fn emit_interface(index: &MetadataIndex, type_def: &TypeDef) -> EmitOutput {
	let mut deps = vec![EmissionKey::WellKnown(WellKnownType::Guid)];
	deps.extend(type_def.interfaces.iter().map(|t| EmissionKey::Type(*t)));
	let mut vtbl_fields = Vec::new();
	let mut inherent_methods = Vec::new();

	let mut slots: Vec<&MethodDef> = Vec::new();
	for base_token in &type_def.interfaces {
		if let Some(base) = index.find_type_by_token(*base_token) {
			slots.extend(base.methods.iter().filter_map(|t| index.find_method_by_token(*t)));
		}
	}
	slots.extend(type_def.methods.iter().filter_map(|t| index.find_method_by_token(*t)));

	for method in &slots {
		let ctx = ProjectionContext::new(index, ProjectionSite::Param, &type_def.namespace, false);
		let mut param_sigs = vec!["this: *mut std::ffi::c_void".to_string()];
		for param in &method.params {
			let (projected, param_deps) = project(&param.ty, &ctx);
			deps.extend(param_deps);
			param_sigs.push(format!("{}: {}", param.name, projected.render(&type_def.namespace)));
		}

		let ret_ctx = ProjectionContext::new(index, ProjectionSite::Return, &type_def.namespace, false);
		let (ret_projected, ret_deps) = project(&method.return_type, &ret_ctx);
		deps.extend(ret_deps);
		let ret = ret_projected.render(&type_def.namespace);

		vtbl_fields.push(format!(
			"\tpub {}: unsafe extern \"system\" fn({}) -> {},",
			method.name,
			param_sigs.join(", "),
			ret
		));

		// The friendly inherent method substitutes `bool` for `BOOL` and a
		// safe-handle wrapper for a raw handle typedef in its own signature,
		// but the vtable slot it calls through keeps the raw ABI types —
		// convert back at the call boundary, same as `emit::method`'s
		// friendly overload.
		let friendly_ctx = ProjectionContext::new(index, ProjectionSite::Param, &type_def.namespace, true);
		let mut friendly_params = Vec::new();
		let mut call_args = Vec::new();
		for p in &method.params {
			let (projected, _) = project(&p.ty, &friendly_ctx);
			friendly_params.push(format!("{}: {}", p.name, projected.render(&type_def.namespace)));
			call_args.push(match &projected {
				ProjectedType::Bool => format!("BOOL::from({})", p.name),
				ProjectedType::SafeHandle { .. } => format!("{}.0", p.name),
				_ => p.name.clone(),
			});
		}

		let friendly_ret_ctx = ProjectionContext::new(index, ProjectionSite::Return, &type_def.namespace, true);
		let (friendly_ret_projected, _) = project(&method.return_type, &friendly_ret_ctx);
		let friendly_ret = friendly_ret_projected.render(&type_def.namespace);
		let raw_call = format!(
			"((*self.0).{name})(self.0 as *mut std::ffi::c_void{sep}{args})",
			name = method.name,
			sep = if call_args.is_empty() { "" } else { ", " },
			args = call_args.join(", "),
		);
		let body = if matches!(friendly_ret_projected, ProjectedType::Bool) {
			format!("{raw_call}.as_bool()")
		} else {
			raw_call
		};

		inherent_methods.push(format!(
			"\tpub unsafe fn {name}(&self, {params}) -> {ret} {{\n\t\t{body}\n\t}}",
			name = method.name,
			params = friendly_params.join(", "),
			ret = friendly_ret,
			body = body,
		));
	}

	let guid_literal = type_def
		.guid
		.map(|g| format!("GUID::from_u128(0x{:032x})", g.as_u128()))
		.unwrap_or_else(|| "GUID::from_u128(0)".to_string());

	let mut source = String::new();
	source.push_str(&format!("#[repr(C)]\npub struct {}Vtbl {{\n", type_def.name));
	source.push_str(&vtbl_fields.join("\n"));
	source.push_str("\n}\n\n");
	source.push_str(&format!(
		"#[repr(transparent)]\n#[derive(Debug, Copy, Clone, Eq, PartialEq)]\npub struct {name}(pub *mut {name}Vtbl);\n\n",
		name = type_def.name
	));
	source.push_str(&format!("impl {} {{\n\tpub const IID: GUID = {};\n", type_def.name, guid_literal));
	if !inherent_methods.is_empty() {
		source.push('\n');
		source.push_str(&inherent_methods.join("\n\n"));
		source.push('\n');
	}
	source.push_str("}\n");

	EmitOutput::new(source).with_dependencies(deps)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::raw::{MetadataToken, MetadataTokenKind};
	use crate::schema::{Layout, Param, ParamMarshal, ParamSemantics, TypeKind, TypeSig};
	use std::collections::HashMap;

	fn param(name: &str, ty: TypeSig) -> Param {
		Param {
			name: name.to_string(),
			sequence: 1,
			ty,
			semantics: ParamSemantics {
				is_in: true,
				is_out: false,
				is_optional: false,
			},
			marshal: ParamMarshal::default(),
		}
	}

	#[test]
	fn interface_emits_vtbl_struct_and_pointer_newtype_with_iid() {
		let iface_token = MetadataToken::new(1, MetadataTokenKind::TypeDef);
		let method_token = MetadataToken::new(1, MetadataTokenKind::Method);

		let method = MethodDef {
			token: method_token,
			name: "IsSupported".to_string(),
			owner: iface_token,
			return_type: TypeSig::Bool,
			params: vec![param("pbIsSupported", TypeSig::Bool)],
			pinvoke: None,
			is_static: false,
		};

		let td = TypeDef {
			token: iface_token,
			namespace: "Windows.Win32.UI.TextServices".to_string(),
			name: "ISpellCheckerFactory".to_string(),
			kind: TypeKind::Interface,
			layout: Layout::Auto,
			base: None,
			fields: Vec::new(),
			methods: vec![method_token],
			interfaces: Vec::new(),
			nested_types: Vec::new(),
			enclosing_type: None,
			guid: Some(uuid::Uuid::from_u128(0x1234)),
			delegate_signature: None,
		};

		let index = MetadataIndex::from_parts(vec![td.clone()], vec![method], Vec::new(), Vec::new(), HashMap::new());
		let out = emit_interface(&index, &td);

		assert!(out.source.contains("struct ISpellCheckerFactoryVtbl"));
		assert!(out.source.contains("struct ISpellCheckerFactory(pub *mut ISpellCheckerFactoryVtbl)"));
		assert!(out.source.contains("pub const IID: GUID"));
		assert!(out.source.contains("pub unsafe fn IsSupported"));
		assert!(out.source.contains("pbIsSupported: bool"));
		assert!(out.source.contains("BOOL::from(pbIsSupported)"));
		assert!(out.source.contains(").as_bool()"));
	}

	#[test]
	fn grandparent_base_slots_and_deps_are_both_present() {
		let unknown_token = MetadataToken::new(1, MetadataTokenKind::TypeDef);
		let base_token = MetadataToken::new(2, MetadataTokenKind::TypeDef);
		let derived_token = MetadataToken::new(3, MetadataTokenKind::TypeDef);

		let release_token = MetadataToken::new(1, MetadataTokenKind::Method);
		let base_method_token = MetadataToken::new(2, MetadataTokenKind::Method);
		let derived_method_token = MetadataToken::new(3, MetadataTokenKind::Method);

		let release = MethodDef {
			token: release_token,
			name: "Release".to_string(),
			owner: unknown_token,
			return_type: TypeSig::U4,
			params: Vec::new(),
			pinvoke: None,
			is_static: false,
		};
		let base_method = MethodDef {
			token: base_method_token,
			name: "BaseMethod".to_string(),
			owner: base_token,
			return_type: TypeSig::U4,
			params: Vec::new(),
			pinvoke: None,
			is_static: false,
		};
		let derived_method = MethodDef {
			token: derived_method_token,
			name: "DerivedMethod".to_string(),
			owner: derived_token,
			return_type: TypeSig::U4,
			params: Vec::new(),
			pinvoke: None,
			is_static: false,
		};

		let unknown_td = TypeDef {
			token: unknown_token,
			namespace: "Windows.Win32.System.Com".to_string(),
			name: "IUnknown".to_string(),
			kind: TypeKind::Interface,
			layout: Layout::Auto,
			base: None,
			fields: Vec::new(),
			methods: vec![release_token],
			interfaces: Vec::new(),
			nested_types: Vec::new(),
			enclosing_type: None,
			guid: None,
			delegate_signature: None,
		};
		let base_td = TypeDef {
			token: base_token,
			namespace: "Windows.Win32.UI.TextServices".to_string(),
			name: "IBase".to_string(),
			kind: TypeKind::Interface,
			layout: Layout::Auto,
			base: None,
			fields: Vec::new(),
			methods: vec![base_method_token],
			interfaces: vec![unknown_token],
			nested_types: Vec::new(),
			enclosing_type: None,
			guid: None,
			delegate_signature: None,
		};
		let derived_td = TypeDef {
			token: derived_token,
			namespace: "Windows.Win32.UI.TextServices".to_string(),
			name: "IDerived".to_string(),
			kind: TypeKind::Interface,
			layout: Layout::Auto,
			base: None,
			fields: Vec::new(),
			methods: vec![derived_method_token],
			// Already transitively closed, ancestor-first, by `read::index`.
			interfaces: vec![unknown_token, base_token],
			nested_types: Vec::new(),
			enclosing_type: None,
			guid: None,
			delegate_signature: None,
		};

		let index = MetadataIndex::from_parts(
			vec![unknown_td, base_td, derived_td.clone()],
			vec![release, base_method, derived_method],
			Vec::new(),
			Vec::new(),
			HashMap::new(),
		);

		let out = emit_interface(&index, &derived_td);

		let release_pos = out.source.find("Release").unwrap();
		let base_pos = out.source.find("BaseMethod").unwrap();
		let derived_pos = out.source.find("DerivedMethod").unwrap();
		assert!(release_pos < base_pos);
		assert!(base_pos < derived_pos);

		assert!(out.dependencies.contains(&EmissionKey::Type(unknown_token)));
		assert!(out.dependencies.contains(&EmissionKey::Type(base_token)));
	}
}
