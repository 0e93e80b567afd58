//! Extern P/Invoke method emission, split into two independently-dispatched
//! fragments. The raw binding (`emit_method_raw`) is an `unsafe extern
//! "system" fn` declared inside a single `extern "system" { ... }` block;
//! every method's raw block is gathered under the shared
//! [`crate::accumulate::EmissionKey::ExternModule`] key and wrapped in
//! `pub mod {class_name} { ... }` exactly once at drain time, so requesting
//! many methods never produces more than one module definition. The friendly
//! inherent-style wrapper (`emit_method_friendly`) is its own standalone
//! fragment that calls through `{class_name}::{method}`, emitted whenever a
//! parameter or return value qualifies for marshalling: a handle typedef with
//! a safe-handle wrapper, a `BOOL` boundary, or a size-linked array that can
//! be promoted to a slice.

use crate::accumulate::EmissionKey;
use crate::emit::EmitOutput;
use crate::project::{project, ProjectedType, ProjectionContext, ProjectionSite};
use crate::read::{MetadataIndex, FORBIDDEN_METHOD_NAME};
use crate::schema::{CallingConvention, MethodDef};

/// The raw extern binding. Always schedules the method's friendly-overload
/// key as a dependency — dispatching that key is a no-op when nothing in the
/// signature needs marshalling.
pub fn emit_method_raw(index: &MetadataIndex, current_namespace: &str, method: &MethodDef) -> EmitOutput {
	if method.name == FORBIDDEN_METHOD_NAME {
		// Never a generation target: status is read through `std::io::Error::last_os_error`.
		return EmitOutput::new(String::new());
	}

	let Some(pinvoke) = &method.pinvoke else {
		return EmitOutput::new(String::new());
	};

	let mut deps = vec![EmissionKey::Method { token: method.token, friendly: true }];
	let raw_ctx = ProjectionContext::new(index, ProjectionSite::Param, current_namespace, false);
	let mut raw_params = Vec::new();
	for param in &method.params {
		let (projected, param_deps) = project(&param.ty, &raw_ctx);
		deps.extend(param_deps);
		raw_params.push(format!("{}: {}", param.name, projected.render(current_namespace)));
	}

	let ret_ctx = ProjectionContext::new(index, ProjectionSite::Return, current_namespace, false);
	let (ret_projected, ret_deps) = project(&method.return_type, &ret_ctx);
	deps.extend(ret_deps);
	let ret_render = ret_projected.render(current_namespace);

	let abi = calling_convention_str(pinvoke.calling_convention);

	let mut source = String::new();
	source.push_str(&format!("#[link(name = \"{}\")]\n", module_stem(&pinvoke.module)));
	source.push_str(&format!("extern \"{abi}\" {{\n\t#[link_name = \"{}\"]\n", pinvoke.entry_point));
	if pinvoke.supports_last_error {
		source.push_str("\t/// On failure, call `std::io::Error::last_os_error()` for the reason.\n");
	}
	source.push_str(&format!(
		"\tpub fn {name}({params}) -> {ret};\n}}\n",
		name = method.name,
		params = raw_params.join(", "),
		ret = ret_render,
	));

	EmitOutput::new(source).with_dependencies(deps)
}

/// The friendly wrapper, if any parameter or the return type benefits from
/// marshalling. Returns `None` when the raw signature is already the
/// friendliest shape available (nothing to promote) — also true whenever
/// `method` has no P/Invoke binding at all.
pub fn emit_method_friendly(index: &MetadataIndex, current_namespace: &str, class_name: &str, method: &MethodDef) -> Option<EmitOutput> {
	if method.name == FORBIDDEN_METHOD_NAME || method.pinvoke.is_none() {
		return None;
	}

	let mut deps = Vec::new();
	let friendly = friendly_overload(index, current_namespace, class_name, method, &mut deps)?;
	Some(EmitOutput::new(friendly).with_dependencies(deps))
}

fn calling_convention_str(cc: CallingConvention) -> &'static str {
	match cc {
		CallingConvention::Cdecl | CallingConvention::VarArg => "C",
		CallingConvention::StdCall | CallingConvention::Default => "system",
		CallingConvention::ThisCall => "thiscall",
		CallingConvention::FastCall => "fastcall",
	}
}

pub(crate) fn module_stem(module: &str) -> String {
	let lower = module.to_ascii_lowercase();
	lower.strip_suffix(".dll").unwrap_or(&lower).to_string()
}

/// Builds the friendly wrapper, if any parameter or the return type benefits
/// from marshalling. Returns `None` when the raw signature is already the
/// friendliest shape available (nothing to promote).
fn friendly_overload(index: &MetadataIndex, current_namespace: &str, class_name: &str, method: &MethodDef, deps: &mut Vec<EmissionKey>) -> Option<String> {
	let friendly_ctx = ProjectionContext::new(index, ProjectionSite::Param, current_namespace, true);

	let mut any_promotion = false;
	let mut params = Vec::new();
	let mut call_args = Vec::new();

	for param in &method.params {
		let (projected, param_deps) = project(&param.ty, &friendly_ctx);

		let is_slice = param.marshal.size_param_index.is_some() || param.marshal.size_const.is_some();
		if matches!(projected, ProjectedType::SafeHandle { .. }) || matches!(projected, ProjectedType::Bool) || is_slice {
			any_promotion = true;
		}

		if is_slice {
			if let ProjectedType::Ptr { pointee, .. } = &projected {
				params.push(format!("{}: &[{}]", param.name, pointee.render(current_namespace)));
				call_args.push(format!("{}.as_ptr() as _", param.name));
				continue;
			}
		}

		// The friendly signature substitutes `bool` for `BOOL` and a
		// safe-handle wrapper for a raw handle typedef; forwarding the
		// friendly value straight through to the raw call wouldn't
		// type-check, so convert back at the call boundary.
		let call_arg = match &projected {
			ProjectedType::Bool => format!("BOOL::from({})", param.name),
			ProjectedType::SafeHandle { .. } => format!("{}.0", param.name),
			_ => param.name.clone(),
		};

		deps.extend(param_deps);
		call_args.push(call_arg);
		params.push(format!("{}: {}", param.name, projected.render(current_namespace)));
	}

	let friendly_ret_ctx = ProjectionContext::new(index, ProjectionSite::Return, current_namespace, true);
	let (ret_projected, ret_deps) = project(&method.return_type, &friendly_ret_ctx);
	let ret_is_bool = matches!(ret_projected, ProjectedType::Bool);
	if ret_is_bool {
		any_promotion = true;
	}

	if !any_promotion {
		return None;
	}

	deps.extend(ret_deps);
	let ret_render = ret_projected.render(current_namespace);

	let raw_call = format!("{class}::{name}({args})", class = class_name, name = method.name, args = call_args.join(", "));
	let body = if ret_is_bool { format!("{raw_call}.as_bool()") } else { raw_call };

	Some(format!(
		"pub unsafe fn {name}({params}) -> {ret} {{\n\t{body}\n}}\n",
		name = method.name,
		params = params.join(", "),
		ret = ret_render,
		body = body,
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::raw::{MetadataToken, MetadataTokenKind};
	use crate::schema::{Param, ParamMarshal, ParamSemantics, PInvokeInfo, TypeSig};
	use std::collections::HashMap;

	fn param(name: &str, ty: TypeSig) -> Param {
		Param {
			name: name.to_string(),
			sequence: 1,
			ty,
			semantics: ParamSemantics { is_in: true, is_out: false, is_optional: false },
			marshal: ParamMarshal::default(),
		}
	}

	fn index() -> MetadataIndex {
		MetadataIndex::from_parts(Vec::new(), Vec::new(), Vec::new(), Vec::new(), HashMap::new())
	}

	#[test]
	fn get_last_error_is_never_emitted() {
		let method = MethodDef {
			token: MetadataToken::new(1, MetadataTokenKind::Method),
			name: "GetLastError".to_string(),
			owner: MetadataToken::null(),
			return_type: TypeSig::U4,
			params: Vec::new(),
			pinvoke: Some(PInvokeInfo {
				module: "kernel32.dll".to_string(),
				entry_point: "GetLastError".to_string(),
				calling_convention: CallingConvention::StdCall,
				supports_last_error: false,
			}),
			is_static: true,
		};

		let out = emit_method_raw(&index(), "Windows.Win32.Foundation", &method);
		assert!(out.source.is_empty());
		assert!(emit_method_friendly(&index(), "Windows.Win32.Foundation", "PInvoke", &method).is_none());
	}

	#[test]
	fn simple_method_has_no_friendly_overload() {
		let method = MethodDef {
			token: MetadataToken::new(2, MetadataTokenKind::Method),
			name: "GetTickCount".to_string(),
			owner: MetadataToken::null(),
			return_type: TypeSig::U4,
			params: Vec::new(),
			pinvoke: Some(PInvokeInfo {
				module: "kernel32.dll".to_string(),
				entry_point: "GetTickCount".to_string(),
				calling_convention: CallingConvention::StdCall,
				supports_last_error: false,
			}),
			is_static: true,
		};

		let out = emit_method_raw(&index(), "Windows.Win32.System.SystemInformation", &method);
		assert!(out.source.contains("extern \"system\""));
		assert!(out.source.contains("pub fn GetTickCount() -> u32;"));
		assert!(emit_method_friendly(&index(), "Windows.Win32.System.SystemInformation", "PInvoke", &method).is_none());
	}

	#[test]
	fn bool_returning_method_gets_a_bool_friendly_overload() {
		let method = MethodDef {
			token: MetadataToken::new(3, MetadataTokenKind::Method),
			name: "IsSupported".to_string(),
			owner: MetadataToken::null(),
			return_type: TypeSig::Bool,
			params: vec![param("locale", TypeSig::Ptr(Box::new(TypeSig::U2)))],
			pinvoke: Some(PInvokeInfo {
				module: "spell.dll".to_string(),
				entry_point: "IsSupported".to_string(),
				calling_convention: CallingConvention::StdCall,
				supports_last_error: false,
			}),
			is_static: true,
		};

		let raw = emit_method_raw(&index(), "Windows.Win32.UI.TextServices", &method);
		assert!(raw.source.contains("-> BOOL;"));
		assert!(raw.dependencies.contains(&EmissionKey::Method { token: method.token, friendly: true }));

		let friendly = emit_method_friendly(&index(), "Windows.Win32.UI.TextServices", "PInvoke", &method).unwrap();
		assert!(friendly.source.contains("pub unsafe fn IsSupported"));
		assert!(friendly.source.contains("-> bool"));
		assert!(friendly.source.contains("PInvoke::IsSupported(locale).as_bool()"));
	}
}
