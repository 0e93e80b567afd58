//! Entity emitters: one module per entity kind, each turning a `schema`
//! entity into a syntactic fragment of Rust source plus the follow-on
//! [`EmissionKey`]s it requires. Fragments are built with plain `format!`/
//! `indoc!`-style string assembly rather than a dedicated AST/pretty-printer
//! crate — the generator's output is text the host re-parses, not an AST the
//! host consumes directly.

mod constant;
mod delegate;
mod enum_;
mod interface;
mod method;
mod prelude;
mod safe_handle;
mod struct_union;

pub use constant::emit_constant;
pub use delegate::emit_delegate;
pub use enum_::emit_enum;
pub use interface::emit_interface;
pub use method::{emit_method_friendly, emit_method_raw};
pub use prelude::emit_well_known;
pub use safe_handle::{emit_handle_typedef, emit_safe_handle};
pub use struct_union::emit_struct_union;

use crate::accumulate::EmissionKey;

/// One emitted fragment plus the entities it still needs emitted to be
/// well-formed. `None` dependencies beyond what's already listed means the
/// fragment is self-contained.
#[derive(Debug, Clone)]
pub struct EmitOutput {
	pub source: String,
	pub dependencies: Vec<EmissionKey>,
}

impl EmitOutput {
	pub fn new(source: impl Into<String>) -> Self {
		EmitOutput {
			source: source.into(),
			dependencies: Vec::new(),
		}
	}

	pub fn with_dependencies(mut self, dependencies: Vec<EmissionKey>) -> Self {
		self.dependencies.extend(dependencies);
		self
	}
}
