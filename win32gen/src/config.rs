//! External interfaces a host collaborator uses to drive generation:
//! [`GenerationConfig`] (request-shaping knobs) and [`CompilationView`] (the
//! consuming compilation's already-declared symbol set, for collision
//! resolution).

use std::collections::HashSet;

/// Request-shaping configuration. Builder-style, with `with_*` chained
/// setters rather than a field-literal struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
	/// The module hosting extern P/Invoke methods. Kept as a module name
	/// rather than a C#-style static class, since Rust has no analogous
	/// container for free functions.
	pub class_name: String,
	/// Concatenate every fragment into one compilation unit instead of one
	/// unit per top-level entity.
	pub emit_single_file: bool,
	/// The Rust module path under which emitted types are declared.
	pub namespace: String,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		GenerationConfig {
			class_name: "PInvoke".to_string(),
			emit_single_file: false,
			namespace: "windows_sdk".to_string(),
		}
	}
}

impl GenerationConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
		self.class_name = class_name.into();
		self
	}

	pub fn with_emit_single_file(mut self, emit_single_file: bool) -> Self {
		self.emit_single_file = emit_single_file;
		self
	}

	pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.namespace = namespace.into();
		self
	}
}

/// The consuming compilation's already-declared symbols, as observed by the
/// host. Read-only from the generator's side — a snapshot, not a live view —
/// matching the "no global mutable state" design note: collision resolution
/// reads an immutable snapshot rather than querying the host on demand.
#[derive(Debug, Clone, Default)]
pub struct CompilationView {
	declared: HashSet<String>,
	visible_upstream: HashSet<String>,
}

impl CompilationView {
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks `name` as already declared by the consuming compilation (e.g. a
	/// user-authored `enum FILE_CREATE_FLAGS`).
	pub fn declare(&mut self, name: impl Into<String>) -> &mut Self {
		self.declared.insert(name.into());
		self
	}

	/// Marks `name` as emitted by another generator sharing this compilation
	/// *and* visible to this one (the upstream item is `pub`). A generator
	/// that finds a symbol here binds references to it instead of re-emitting.
	pub fn grant_visibility(&mut self, name: impl Into<String>) -> &mut Self {
		self.visible_upstream.insert(name.into());
		self
	}

	pub fn declares(&self, name: &str) -> bool {
		self.declared.contains(name)
	}

	pub fn is_visible_upstream(&self, name: &str) -> bool {
		self.visible_upstream.contains(name)
	}
}
