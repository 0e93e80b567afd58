//! Type projector: turns a decoded [`TypeSig`] into a [`ProjectedType`] —
//! a target-language type expression — according to where the signature sits
//! (struct field, parameter, return value). Nothing here renders source text
//! directly; `crate::emit` calls [`ProjectedType::render`] to get the type
//! expression string it splices into a fragment.

use crate::accumulate::{EmissionKey, WellKnownType};
use crate::handle;
use crate::raw::MetadataToken;
use crate::read::MetadataIndex;
use crate::schema::{MethodSignature, TypeKind, TypeSig};
use crate::utilities::namespace_to_module_path;

/// Where a signature is being projected from. `BOOL` and handle typedefs
/// project differently depending on this: a field must keep ABI-exact layout,
/// while a call boundary may marshal to a friendlier type.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProjectionSite {
	Field,
	Param,
	Return,
}

/// A target-language type expression, already resolved against the loaded
/// metadata. Kept structured (rather than immediately rendered to a string)
/// so emitters can pattern-match on it — e.g. to decide whether a parameter
/// qualifies for a friendly-overload slice promotion.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectedType {
	Unit,
	/// Projected only at `Param`/`Return` sites; `BOOL` in a field stays `Named`.
	Bool,
	Primitive(&'static str),
	/// A struct, union, enum, delegate alias, or raw handle typedef, named but
	/// not further classified.
	Named { namespace: String, name: String },
	/// A handle typedef substituted for its safe-handle wrapper — only chosen
	/// at `Param`/`Return` sites when a [`handle::SafeHandleDescriptor`] exists
	/// and the caller is projecting the friendly overload.
	SafeHandle { namespace: String, name: String },
	/// A COM interface, always used through a vtable pointer in Win32 metadata.
	InterfacePointer { namespace: String, name: String },
	Ptr { mutable: bool, pointee: Box<ProjectedType> },
	FixedArray { of: Box<ProjectedType>, length: u32 },
	/// An inline function-pointer signature (as opposed to a named delegate
	/// type alias, which projects as `Named`).
	FnPointer(Box<MethodSignature>),
}

impl ProjectedType {
	/// Renders the Rust type expression for this projection. `current_namespace`
	/// is the namespace of the entity being emitted around this type; a
	/// `Named`/`SafeHandle`/`InterfacePointer` type declared in a different
	/// metadata namespace is qualified with a `crate::` path so it never
	/// collides with a same-named type the host declares in its own modules.
	pub fn render(&self, current_namespace: &str) -> String {
		match self {
			ProjectedType::Unit => "()".to_string(),
			ProjectedType::Bool => "bool".to_string(),
			ProjectedType::Primitive(p) => p.to_string(),
			ProjectedType::Named { namespace, name } => qualify(namespace, name, current_namespace),
			ProjectedType::SafeHandle { namespace, name } => {
				format!("{}SafeHandle", qualify(namespace, name, current_namespace))
			}
			ProjectedType::InterfacePointer { namespace, name } => {
				format!("*mut {}", qualify(namespace, name, current_namespace))
			}
			ProjectedType::Ptr { mutable, pointee } => {
				format!("*{} {}", if *mutable { "mut" } else { "const" }, pointee.render(current_namespace))
			}
			ProjectedType::FixedArray { of, length } => format!("[{}; {}]", of.render(current_namespace), length),
			ProjectedType::FnPointer(sig) => render_fn_pointer(sig, current_namespace),
		}
	}

}

fn qualify(namespace: &str, name: &str, current_namespace: &str) -> String {
	if namespace.is_empty() || namespace == current_namespace {
		name.to_string()
	} else {
		format!("crate::{}::{}", namespace_to_module_path(namespace), name)
	}
}

fn render_fn_pointer(sig: &MethodSignature, current_namespace: &str) -> String {
	let ctx_for_params = ProjectionContext {
		index: None,
		site: ProjectionSite::Param,
		current_namespace,
		friendly: false,
	};
	let params: Vec<String> = sig
		.params
		.iter()
		.map(|p| project_without_index(p, &ctx_for_params).render(current_namespace))
		.collect();
	let ret = project_without_index(&sig.return_type, &ProjectionContext {
		site: ProjectionSite::Return,
		..ctx_for_params
	})
	.render(current_namespace);

	if matches!(sig.return_type, TypeSig::Void) {
		format!("unsafe extern \"system\" fn({})", params.join(", "))
	} else {
		format!("unsafe extern \"system\" fn({}) -> {}", params.join(", "), ret)
	}
}

/// Inputs the projector needs beyond the signature itself: where the
/// signature sits, which namespace is currently being emitted (for
/// qualification), and whether the friendly overload is being produced (the
/// only context in which handle-typedef → safe-handle substitution applies).
#[derive(Copy, Clone)]
pub struct ProjectionContext<'a> {
	pub index: Option<&'a MetadataIndex>,
	pub site: ProjectionSite,
	pub current_namespace: &'a str,
	pub friendly: bool,
}

impl<'a> ProjectionContext<'a> {
	pub fn new(index: &'a MetadataIndex, site: ProjectionSite, current_namespace: &'a str, friendly: bool) -> Self {
		ProjectionContext {
			index: Some(index),
			site,
			current_namespace,
			friendly,
		}
	}

	fn with_site(&self, site: ProjectionSite) -> Self {
		ProjectionContext { site, ..*self }
	}
}

/// Projects `sig` under `ctx`, returning the projected type plus the
/// [`EmissionKey`]s it requires. Never fails: an unresolvable reference (a
/// dangling token from malformed metadata) degrades to an opaque `c_void`
/// pointer rather than aborting the whole request, since one bad reference
/// shouldn't prevent emitting everything else reachable from a request.
pub fn project(sig: &TypeSig, ctx: &ProjectionContext) -> (ProjectedType, Vec<EmissionKey>) {
	match sig {
		TypeSig::Void => (ProjectedType::Unit, Vec::new()),
		// A field always keeps the ABI-exact `BOOL` typedef (struct layout must
		// stay exact). A raw (non-friendly) param/return also keeps `BOOL` —
		// it's the literal ABI signature of the native entry point; marshalling
		// to a native `bool` is what the friendly overload exists to do. Only
		// `ctx.friendly` at a param/return site substitutes native `bool`.
		TypeSig::Bool => match ctx.site {
			ProjectionSite::Field => (
				well_known(WellKnownType::Bool),
				vec![EmissionKey::WellKnown(WellKnownType::Bool)],
			),
			ProjectionSite::Param | ProjectionSite::Return if ctx.friendly => (ProjectedType::Bool, Vec::new()),
			ProjectionSite::Param | ProjectionSite::Return => (
				well_known(WellKnownType::Bool),
				vec![EmissionKey::WellKnown(WellKnownType::Bool)],
			),
		},
		TypeSig::Char => (ProjectedType::Primitive("u16"), Vec::new()),
		TypeSig::I1 => (ProjectedType::Primitive("i8"), Vec::new()),
		TypeSig::U1 => (ProjectedType::Primitive("u8"), Vec::new()),
		TypeSig::I2 => (ProjectedType::Primitive("i16"), Vec::new()),
		TypeSig::U2 => (ProjectedType::Primitive("u16"), Vec::new()),
		TypeSig::I4 => (ProjectedType::Primitive("i32"), Vec::new()),
		TypeSig::U4 => (ProjectedType::Primitive("u32"), Vec::new()),
		TypeSig::I8 => (ProjectedType::Primitive("i64"), Vec::new()),
		TypeSig::U8 => (ProjectedType::Primitive("u64"), Vec::new()),
		TypeSig::R4 => (ProjectedType::Primitive("f32"), Vec::new()),
		TypeSig::R8 => (ProjectedType::Primitive("f64"), Vec::new()),
		TypeSig::String => (
			ProjectedType::Ptr {
				mutable: false,
				pointee: Box::new(ProjectedType::Primitive("u16")),
			},
			Vec::new(),
		),
		TypeSig::Guid => (well_known(WellKnownType::Guid), vec![EmissionKey::WellKnown(WellKnownType::Guid)]),
		TypeSig::ValueType(token) | TypeSig::Class(token) => project_entity(*token, ctx),
		TypeSig::Ptr(inner) => {
			let (inner_proj, deps) = project(inner, &ctx.with_site(ProjectionSite::Param));
			(
				ProjectedType::Ptr {
					mutable: true,
					pointee: Box::new(inner_proj),
				},
				deps,
			)
		}
		TypeSig::SzArray(inner) => {
			// The raw overload always keeps a pointer; slice promotion for the
			// friendly overload is decided by `emit::method` from the parameter's
			// `ParamMarshal` hint, not by the projector.
			let (inner_proj, deps) = project(inner, ctx);
			(
				ProjectedType::Ptr {
					mutable: true,
					pointee: Box::new(inner_proj),
				},
				deps,
			)
		}
		TypeSig::Array { of, sizes, .. } => {
			let (inner_proj, deps) = project(of, ctx);
			let length = sizes.first().copied().unwrap_or(0);
			(
				ProjectedType::FixedArray {
					of: Box::new(inner_proj),
					length,
				},
				deps,
			)
		}
		TypeSig::FnPtr(sig) => {
			let mut deps = Vec::new();
			for p in &sig.params {
				let (_, d) = project(p, &ctx.with_site(ProjectionSite::Param));
				deps.extend(d);
			}
			let (_, d) = project(&sig.return_type, &ctx.with_site(ProjectionSite::Return));
			deps.extend(d);
			(ProjectedType::FnPointer(sig.clone()), deps)
		}
	}
}

fn well_known(w: WellKnownType) -> ProjectedType {
	match w {
		WellKnownType::Bool => ProjectedType::Named {
			namespace: String::new(),
			name: "BOOL".to_string(),
		},
		WellKnownType::Guid => ProjectedType::Named {
			namespace: String::new(),
			name: "GUID".to_string(),
		},
	}
}

fn project_entity(token: MetadataToken, ctx: &ProjectionContext) -> (ProjectedType, Vec<EmissionKey>) {
	let Some(index) = ctx.index else {
		return (opaque(), Vec::new());
	};
	let Some(type_def) = index.find_type_by_token(token) else {
		return (opaque(), Vec::new());
	};

	if let Some(scalar) = scalar_integer_alias(&type_def.name) {
		return (ProjectedType::Primitive(scalar), Vec::new());
	}

	match type_def.kind {
		TypeKind::Interface => (
			ProjectedType::InterfacePointer {
				namespace: type_def.namespace.clone(),
				name: type_def.name.clone(),
			},
			vec![EmissionKey::Type(token)],
		),
		TypeKind::HandleTypedef if ctx.site != ProjectionSite::Field && ctx.friendly => {
			match handle::classify(index, type_def) {
				Some(_) => (
					ProjectedType::SafeHandle {
						namespace: type_def.namespace.clone(),
						name: type_def.name.clone(),
					},
					vec![EmissionKey::Type(token), EmissionKey::SafeHandle(token)],
				),
				None => named(type_def.namespace.clone(), type_def.name.clone(), token),
			}
		}
		_ => named(type_def.namespace.clone(), type_def.name.clone(), token),
	}
}

/// `LARGE_INTEGER`/`ULARGE_INTEGER` are unions over a 64-bit value plus a
/// split high/low-part struct, used almost exclusively as a scalar in Win32
/// APIs — project straight to the native integer instead of the union shape.
fn scalar_integer_alias(name: &str) -> Option<&'static str> {
	match name {
		"LARGE_INTEGER" => Some("i64"),
		"ULARGE_INTEGER" => Some("u64"),
		_ => None,
	}
}

fn named(namespace: String, name: String, token: MetadataToken) -> (ProjectedType, Vec<EmissionKey>) {
	(ProjectedType::Named { namespace, name }, vec![EmissionKey::Type(token)])
}

fn opaque() -> ProjectedType {
	ProjectedType::Ptr {
		mutable: true,
		pointee: Box::new(ProjectedType::Primitive("std::ffi::c_void")),
	}
}

fn project_without_index<'a>(sig: &TypeSig, ctx: &ProjectionContext<'a>) -> ProjectedType {
	project(sig, ctx).0
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ctx(site: ProjectionSite, friendly: bool) -> ProjectionContext<'static> {
		ProjectionContext {
			index: None,
			site,
			current_namespace: "Windows.Win32.Foundation",
			friendly,
		}
	}

	#[test]
	fn bool_projects_to_native_bool_only_at_call_boundaries() {
		let (field_proj, _) = project(&TypeSig::Bool, &ctx(ProjectionSite::Field, true));
		assert_eq!(
			field_proj,
			ProjectedType::Named {
				namespace: String::new(),
				name: "BOOL".to_string()
			}
		);

		let (param_proj, _) = project(&TypeSig::Bool, &ctx(ProjectionSite::Param, true));
		assert_eq!(param_proj, ProjectedType::Bool);

		let (ret_proj, _) = project(&TypeSig::Bool, &ctx(ProjectionSite::Return, true));
		assert_eq!(ret_proj, ProjectedType::Bool);
	}

	#[test]
	fn raw_param_and_return_sites_keep_the_abi_exact_bool_typedef() {
		let expected = ProjectedType::Named {
			namespace: String::new(),
			name: "BOOL".to_string(),
		};
		let (param_proj, _) = project(&TypeSig::Bool, &ctx(ProjectionSite::Param, false));
		assert_eq!(param_proj, expected);

		let (ret_proj, _) = project(&TypeSig::Bool, &ctx(ProjectionSite::Return, false));
		assert_eq!(ret_proj, expected);
	}

	#[test]
	fn primitive_widths_are_bit_exact() {
		assert_eq!(project(&TypeSig::I4, &ctx(ProjectionSite::Field, false)).0, ProjectedType::Primitive("i32"));
		assert_eq!(project(&TypeSig::U4, &ctx(ProjectionSite::Field, false)).0, ProjectedType::Primitive("u32"));
		assert_eq!(project(&TypeSig::I8, &ctx(ProjectionSite::Field, false)).0, ProjectedType::Primitive("i64"));
	}

	#[test]
	fn qualify_uses_bare_name_within_same_namespace() {
		assert_eq!(qualify("Windows.Win32.Foundation", "HANDLE", "Windows.Win32.Foundation"), "HANDLE");
	}

	#[test]
	fn qualify_uses_crate_path_for_foreign_namespace() {
		assert_eq!(
			qualify("Windows.Win32.Storage.FileSystem", "FILE_CREATE_FLAGS", "Windows.Win32.Foundation"),
			"crate::windows::win32::storage::file_system::FILE_CREATE_FLAGS"
		);
	}

	#[test]
	fn large_integer_projects_to_a_plain_i64() {
		use crate::raw::{MetadataToken, MetadataTokenKind};
		use crate::schema::{Layout, TypeDef, TypeKind};
		use std::collections::HashMap;

		let token = MetadataToken::new(1, MetadataTokenKind::TypeDef);
		let td = TypeDef {
			token,
			namespace: "Windows.Win32.Foundation".to_string(),
			name: "LARGE_INTEGER".to_string(),
			kind: TypeKind::Union,
			layout: Layout::Explicit { pack: 0, size: 8 },
			base: None,
			fields: Vec::new(),
			methods: Vec::new(),
			interfaces: Vec::new(),
			nested_types: Vec::new(),
			enclosing_type: None,
			guid: None,
			delegate_signature: None,
		};
		let index = MetadataIndex::from_parts(vec![td], Vec::new(), Vec::new(), Vec::new(), HashMap::new());
		let index_ctx = ProjectionContext::new(&index, ProjectionSite::Field, "Windows.Win32.Foundation", false);

		let (projected, deps) = project(&TypeSig::ValueType(token), &index_ctx);
		assert_eq!(projected, ProjectedType::Primitive("i64"));
		assert!(deps.is_empty());
	}

	#[test]
	fn render_named_and_pointer_types() {
		let named = ProjectedType::Named {
			namespace: "Windows.Win32.Foundation".to_string(),
			name: "HANDLE".to_string(),
		};
		assert_eq!(named.render("Windows.Win32.Foundation"), "HANDLE");

		let ptr = ProjectedType::Ptr {
			mutable: true,
			pointee: Box::new(ProjectedType::Primitive("u16")),
		};
		assert_eq!(ptr.render(""), "*mut u16");
	}
}
