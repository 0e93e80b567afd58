//! Handle typedef and safe-handle wrapper emission. The raw typedef struct
//! (`emit_handle_typedef`) is always emitted for `TypeKind::HandleTypedef`;
//! the safe-handle wrapper (`emit_safe_handle`) only exists when
//! `handle::classify` finds a usable `RAIIFree` release function.

use crate::emit::method::module_stem;
use crate::emit::EmitOutput;
use crate::handle::{self, ReleaseFailureMode};
use crate::project::{project, ProjectionContext, ProjectionSite};
use crate::read::MetadataIndex;
use crate::schema::TypeDef;

pub fn emit_handle_typedef(index: &MetadataIndex, type_def: &TypeDef) -> EmitOutput {
	let underlying = type_def
		.fields
		.first()
		.and_then(|t| index.find_field_by_token(*t))
		.map(|f| {
			let ctx = ProjectionContext::new(index, ProjectionSite::Field, &type_def.namespace, false);
			project(&f.ty, &ctx).0.render(&type_def.namespace)
		})
		.unwrap_or_else(|| "isize".to_string());

	let source = format!(
		"#[repr(transparent)]\n#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]\npub struct {name}(pub {underlying});\n\nimpl {name} {{\n\tpub const NULL: {name} = {name}(0 as _);\n}}\n",
		name = type_def.name,
		underlying = underlying,
	);

	EmitOutput::new(source)
}

/// Emits the safe-handle wrapper for `type_def`, if `handle::classify` finds
/// one. Returns `None` for excluded handles (namespace handles, handles with
/// no `RAIIFree`) — the caller treats that as "nothing to emit", not an error.
///
/// The `Drop` body calls a *private* `extern "system"` redeclaration of the
/// release function local to this fragment, rather than reaching into the
/// public P/Invoke binding `emit::method` emits for the same function. The
/// two bindings link to the same native symbol either way, but a cross-
/// fragment Rust path (`crate::{class_name}::Foo`) would only resolve if the
/// host happens to nest every method's own file under one shared module —
/// which `GenerationConfig::emit_single_file` controlling only *grouping*
/// (not content) means this fragment's text can't assume. Re-declaring the
/// extern here keeps the fragment correct standing alone, in either mode.
pub fn emit_safe_handle(index: &MetadataIndex, type_def: &TypeDef) -> Option<EmitOutput> {
	let descriptor = handle::classify(index, type_def)?;
	let name = format!("{}SafeHandle", type_def.name);

	let release_method = index.find_method_by_token(descriptor.release_function)?;
	let ret_ctx = ProjectionContext::new(index, ProjectionSite::Return, &type_def.namespace, false);
	let ret_render = project(&release_method.return_type, &ret_ctx).0.render(&type_def.namespace);
	let handle_param_ctx = ProjectionContext::new(index, ProjectionSite::Param, &type_def.namespace, false);
	let handle_param_render = project(&crate::schema::TypeSig::ValueType(type_def.token), &handle_param_ctx).0.render(&type_def.namespace);

	let release_fn_name = format!("__{}_release", type_def.name);
	let release_call = format!("{release_fn_name}(self.0)");

	let release_check = match descriptor.failure_mode {
		ReleaseFailureMode::BoolLike => format!("if !{release_call}.as_bool() {{\n\t\t\t\ttracing::warn!(\"{{}} failed to release a {handle}\", \"{entry}\");\n\t\t\t}}", release_call = release_call, handle = type_def.name, entry = descriptor.release_entry_point),
		ReleaseFailureMode::ZeroIsSuccess => format!("if {release_call} != 0 {{\n\t\t\t\ttracing::warn!(\"{{}} failed to release a {handle}\", \"{entry}\");\n\t\t\t}}", release_call = release_call, handle = type_def.name, entry = descriptor.release_entry_point),
		ReleaseFailureMode::NonNegativeIsSuccess => format!("if {release_call} < 0 {{\n\t\t\t\ttracing::warn!(\"{{}} failed to release a {handle}\", \"{entry}\");\n\t\t\t}}", release_call = release_call, handle = type_def.name, entry = descriptor.release_entry_point),
		ReleaseFailureMode::Infallible | ReleaseFailureMode::Unknown => format!("let _ = {release_call};"),
	};

	let source = format!(
		"#[link(name = \"{module_stem}\")]\nextern \"system\" {{\n\t#[link_name = \"{entry_point}\"]\n\tfn {release_fn_name}(handle: {handle_param}) -> {ret};\n}}\n\n#[repr(transparent)]\n#[derive(Debug)]\npub struct {name}(pub {handle});\n\nimpl Drop for {name} {{\n\tfn drop(&mut self) {{\n\t\tunsafe {{\n\t\t\t{release_check}\n\t\t}}\n\t}}\n}}\n",
		module_stem = module_stem(&descriptor.release_module),
		entry_point = descriptor.release_entry_point,
		release_fn_name = release_fn_name,
		handle_param = handle_param_render,
		ret = ret_render,
		name = name,
		handle = type_def.name,
		release_check = release_check,
	);

	// A handle type that gets a safe-handle wrapper also gets its release
	// method emitted as its own public P/Invoke binding, even though the
	// `Drop` body above calls a private redeclaration rather than that
	// binding directly.
	let dep = crate::accumulate::EmissionKey::Method {
		token: descriptor.release_function,
		friendly: false,
	};

	Some(EmitOutput::new(source).with_dependencies(vec![dep]))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::raw::{MetadataToken, MetadataTokenKind};
	use crate::schema::{AttributeArg, AttributeKind, CallingConvention, CustomAttribute, Layout, MethodDef, PInvokeInfo, TypeKind, TypeSig};
	use std::collections::HashMap;

	fn handle_type_def(token: MetadataToken, name: &str) -> TypeDef {
		TypeDef {
			token,
			namespace: "Windows.Win32.Foundation".to_string(),
			name: name.to_string(),
			kind: TypeKind::HandleTypedef,
			layout: Layout::Auto,
			base: None,
			fields: Vec::new(),
			methods: Vec::new(),
			interfaces: Vec::new(),
			nested_types: Vec::new(),
			enclosing_type: None,
			guid: None,
			delegate_signature: None,
		}
	}

	#[test]
	fn typedef_always_emits_regardless_of_raii_free() {
		let td = handle_type_def(MetadataToken::new(1, MetadataTokenKind::TypeDef), "HANDLE");
		let index = MetadataIndex::from_parts(vec![td.clone()], Vec::new(), Vec::new(), Vec::new(), HashMap::new());
		let out = emit_handle_typedef(&index, &td);
		assert!(out.source.contains("pub struct HANDLE(pub isize);"));
	}

	#[test]
	fn safe_handle_wrapper_drop_calls_release_function() {
		let handle = MetadataToken::new(2, MetadataTokenKind::TypeDef);
		let release = MetadataToken::new(1, MetadataTokenKind::Method);

		let mut attrs = HashMap::new();
		attrs.insert(
			handle,
			vec![CustomAttribute {
				kind: AttributeKind::RAIIFree,
				attribute_type_name: "RAIIFreeAttribute".to_string(),
				fixed_args: vec![AttributeArg::Str("CloseHandle".to_string())],
				named_args: Vec::new(),
			}],
		);

		let release_method = MethodDef {
			token: release,
			name: "CloseHandle".to_string(),
			owner: MetadataToken::null(),
			return_type: TypeSig::Bool,
			params: Vec::new(),
			pinvoke: Some(PInvokeInfo {
				module: "kernel32.dll".to_string(),
				entry_point: "CloseHandle".to_string(),
				calling_convention: CallingConvention::StdCall,
				supports_last_error: true,
			}),
			is_static: true,
		};

		let td = handle_type_def(handle, "HANDLE");
		let index = MetadataIndex::from_parts(vec![td.clone()], vec![release_method], Vec::new(), Vec::new(), attrs);

		let out = emit_safe_handle(&index, &td).unwrap();
		assert!(out.source.contains("pub struct HANDLESafeHandle(pub HANDLE);"));
		assert!(out.source.contains("impl Drop for HANDLESafeHandle"));
		assert!(out.source.contains("__HANDLE_release(self.0)"));
		assert!(out.source.contains("fn __HANDLE_release(handle: HANDLE) -> BOOL;"));
		assert!(out.source.contains("tracing::warn!"));
	}

	#[test]
	fn handle_without_raii_free_has_no_safe_handle_wrapper() {
		let td = handle_type_def(MetadataToken::new(3, MetadataTokenKind::TypeDef), "HBITMAP");
		let index = MetadataIndex::from_parts(vec![td.clone()], Vec::new(), Vec::new(), Vec::new(), HashMap::new());
		assert!(emit_safe_handle(&index, &td).is_none());
	}
}
