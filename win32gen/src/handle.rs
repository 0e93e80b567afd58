//! Handle policy: decides which handle-typedef `TypeDef`s get a safe-handle
//! wrapper, and how that wrapper's `Drop` impl should detect a failed release.
//!
//! A handle typedef with a `RAIIFree` attribute names its release function;
//! the release function's return type determines the failure convention. A
//! handle typedef tagged `NamespaceHandle`, or with no `RAIIFree` at all, is
//! left as a bare typedef struct — there's nothing to safely wrap.

use crate::raw::MetadataToken;
use crate::read::MetadataIndex;
use crate::schema::{AttributeKind, TypeDef, TypeSig};

/// How a release function reports failure, determined from its return type.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReleaseFailureMode {
	/// Non-zero means success (`BOOL`-shaped return: `CloseHandle`, `DeleteObject`, ...).
	BoolLike,
	/// Zero means success (`LSTATUS`-shaped return).
	ZeroIsSuccess,
	/// Non-negative means success (`NTSTATUS`/`HRESULT`-shaped return).
	NonNegativeIsSuccess,
	/// The release function returns `void`; failure can never be observed.
	Infallible,
	/// Some other scalar return the policy doesn't special-case. Treated like
	/// `Infallible` for `Drop` purposes — there's no established convention to
	/// assert a failure against.
	Unknown,
}

#[derive(Debug, Clone)]
pub struct SafeHandleDescriptor {
	pub handle_type: MetadataToken,
	pub release_function: MetadataToken,
	pub release_module: String,
	pub release_entry_point: String,
	pub failure_mode: ReleaseFailureMode,
}

/// Classifies `type_def` as a safe-handle candidate, or returns `None` if it's
/// excluded (not a handle typedef at all, a namespace handle, or missing
/// `RAIIFree`).
pub fn classify(index: &MetadataIndex, type_def: &TypeDef) -> Option<SafeHandleDescriptor> {
	if !type_def.is_handle_typedef() {
		return None;
	}

	if index.get_custom_attribute(type_def.token, &AttributeKind::NamespaceHandle).is_some() {
		return None;
	}

	let raii = index.get_custom_attribute(type_def.token, &AttributeKind::RAIIFree)?;
	let release_name = raii.arg_str(0)?;
	let release_method = index.find_method_anywhere(release_name)?;
	let pinvoke = release_method.pinvoke.as_ref()?;

	Some(SafeHandleDescriptor {
		handle_type: type_def.token,
		release_function: release_method.token,
		release_module: pinvoke.module.clone(),
		release_entry_point: pinvoke.entry_point.clone(),
		failure_mode: classify_return_type(&release_method.return_type, index),
	})
}

fn classify_return_type(ty: &TypeSig, index: &MetadataIndex) -> ReleaseFailureMode {
	match ty {
		TypeSig::Void => ReleaseFailureMode::Infallible,
		TypeSig::Bool => ReleaseFailureMode::BoolLike,
		TypeSig::ValueType(token) | TypeSig::Class(token) => match index.find_type_by_token(*token) {
			Some(t) => match t.name.as_str() {
				"BOOL" => ReleaseFailureMode::BoolLike,
				"LSTATUS" => ReleaseFailureMode::ZeroIsSuccess,
				"NTSTATUS" | "HRESULT" => ReleaseFailureMode::NonNegativeIsSuccess,
				_ => ReleaseFailureMode::Unknown,
			},
			None => ReleaseFailureMode::Unknown,
		},
		_ => ReleaseFailureMode::Unknown,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::raw::MetadataTokenKind;
	use crate::schema::{AttributeArg, CallingConvention, CustomAttribute, Layout, MethodDef, PInvokeInfo, TypeKind};
	use std::collections::HashMap;

	fn token(kind: MetadataTokenKind, index: u32) -> MetadataToken {
		MetadataToken::new(index, kind)
	}

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

	fn release_method(token: MetadataToken, name: &str, module: &str) -> MethodDef {
		MethodDef {
			token,
			name: name.to_string(),
			owner: MetadataToken::null(),
			return_type: TypeSig::Bool,
			params: Vec::new(),
			pinvoke: Some(PInvokeInfo {
				module: module.to_string(),
				entry_point: name.to_string(),
				calling_convention: CallingConvention::StdCall,
				supports_last_error: true,
			}),
			is_static: true,
		}
	}

	fn index_with(type_defs: Vec<TypeDef>, methods: Vec<MethodDef>, attrs: HashMap<MetadataToken, Vec<CustomAttribute>>) -> MetadataIndex {
		MetadataIndex::from_parts(type_defs, methods, Vec::new(), Vec::new(), attrs)
	}

	#[test]
	fn handle_with_raii_free_and_bool_release_classifies_as_bool_like() {
		let handle = token(MetadataTokenKind::TypeDef, 1);
		let release = token(MetadataTokenKind::Method, 1);

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

		let index = index_with(
			vec![handle_type_def(handle, "HANDLE")],
			vec![release_method(release, "CloseHandle", "kernel32.dll")],
			attrs,
		);

		let descriptor = classify(&index, index.find_type_by_token(handle).unwrap()).unwrap();
		assert_eq!(descriptor.failure_mode, ReleaseFailureMode::BoolLike);
		assert_eq!(descriptor.release_entry_point, "CloseHandle");
	}

	#[test]
	fn namespace_handle_is_excluded_even_with_raii_free() {
		let handle = token(MetadataTokenKind::TypeDef, 2);
		let release = token(MetadataTokenKind::Method, 2);

		let mut attrs = HashMap::new();
		attrs.insert(
			handle,
			vec![
				CustomAttribute {
					kind: AttributeKind::RAIIFree,
					attribute_type_name: "RAIIFreeAttribute".to_string(),
					fixed_args: vec![AttributeArg::Str("ClosePrivateNamespace".to_string())],
					named_args: Vec::new(),
				},
				CustomAttribute {
					kind: AttributeKind::NamespaceHandle,
					attribute_type_name: "NamespaceHandleAttribute".to_string(),
					fixed_args: Vec::new(),
					named_args: Vec::new(),
				},
			],
		);

		let index = index_with(
			vec![handle_type_def(handle, "HANDLE")],
			vec![release_method(release, "ClosePrivateNamespace", "kernel32.dll")],
			attrs,
		);

		assert!(classify(&index, index.find_type_by_token(handle).unwrap()).is_none());
	}

	#[test]
	fn handle_without_raii_free_yields_no_safe_handle() {
		let handle = token(MetadataTokenKind::TypeDef, 3);
		let index = index_with(vec![handle_type_def(handle, "HANDLE")], Vec::new(), HashMap::new());
		assert!(classify(&index, index.find_type_by_token(handle).unwrap()).is_none());
	}

	#[test]
	fn non_handle_typedef_is_never_a_candidate() {
		let mut plain = handle_type_def(token(MetadataTokenKind::TypeDef, 4), "RECT");
		plain.kind = TypeKind::Struct;
		let index = index_with(vec![plain], Vec::new(), HashMap::new());
		assert!(classify(&index, index.find_type_by_token(token(MetadataTokenKind::TypeDef, 4)).unwrap()).is_none());
	}

	#[test]
	fn status_typedef_release_classifies_as_non_negative_is_success() {
		let handle = token(MetadataTokenKind::TypeDef, 5);
		let release = token(MetadataTokenKind::Method, 5);
		let ntstatus_type = token(MetadataTokenKind::TypeDef, 6);

		let mut attrs = HashMap::new();
		attrs.insert(
			handle,
			vec![CustomAttribute {
				kind: AttributeKind::RAIIFree,
				attribute_type_name: "RAIIFreeAttribute".to_string(),
				fixed_args: vec![AttributeArg::Str("NtClose".to_string())],
				named_args: Vec::new(),
			}],
		);

		let mut release_fn = release_method(release, "NtClose", "ntdll.dll");
		release_fn.return_type = TypeSig::ValueType(ntstatus_type);

		let index = index_with(
			vec![handle_type_def(handle, "HANDLE"), handle_type_def(ntstatus_type, "NTSTATUS")],
			vec![release_fn],
			attrs,
		);

		let descriptor = classify(&index, index.find_type_by_token(handle).unwrap()).unwrap();
		assert_eq!(descriptor.failure_mode, ReleaseFailureMode::NonNegativeIsSuccess);
	}
}
