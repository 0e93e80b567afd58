//! Collision resolution against a consuming compilation. Two indexes back
//! this: the externally-supplied [`crate::config::CompilationView`] (symbols
//! the host already declares) and a per-resolver map of symbols this session
//! has already emitted, used to detect re-emission of the *same* entity
//! (a no-op) versus a name clash between two *different* entities.

use crate::accumulate::EmissionKey;
use crate::config::CompilationView;
use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

lazy_static! {
	/// Short names that always collide with something every consuming crate
	/// pulls in via its prelude, regardless of what a particular
	/// [`CompilationView`] reports — qualifying these unconditionally avoids
	/// depending on every host accurately enumerating its own prelude.
	static ref ALWAYS_QUALIFIED: HashSet<&'static str> = {
		let mut set = HashSet::new();
		set.insert("Result");
		set.insert("Option");
		set.insert("Error");
		set.insert("String");
		set.insert("Vec");
		set.insert("Box");
		set
	};
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CollisionDecision {
	/// No clash; emit under the bare short name.
	Emit,
	/// A host symbol of the same short name exists; emit, but every
	/// generated reference to it must use a fully qualified path.
	QualifyPath,
	/// A *different* entity already claimed this short name this session;
	/// suppress this emission and let existing references bind to it.
	Suppress,
}

#[derive(Debug, Default)]
pub struct CollisionResolver {
	view: CompilationView,
	emitted_by_name: HashMap<String, EmissionKey>,
}

impl CollisionResolver {
	pub fn new(view: CompilationView) -> Self {
		CollisionResolver {
			view,
			emitted_by_name: HashMap::new(),
		}
	}

	/// Decides how `key`, whose short name is `name`, should be emitted.
	/// Idempotent for a key already recorded under the same name.
	pub fn resolve(&mut self, name: &str, key: &EmissionKey) -> CollisionDecision {
		if self.view.is_visible_upstream(name) {
			return CollisionDecision::Suppress;
		}

		if let Some(existing) = self.emitted_by_name.get(name) {
			return if existing == key { CollisionDecision::Emit } else { CollisionDecision::Suppress };
		}

		self.emitted_by_name.insert(name.to_string(), key.clone());

		if ALWAYS_QUALIFIED.contains(name) || self.view.declares(name) {
			CollisionDecision::QualifyPath
		} else {
			CollisionDecision::Emit
		}
	}

	pub fn view(&self) -> &CompilationView {
		&self.view
	}

	pub fn view_mut(&mut self) -> &mut CompilationView {
		&mut self.view
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::raw::{MetadataToken, MetadataTokenKind};

	fn key(index: u32) -> EmissionKey {
		EmissionKey::Type(MetadataToken::new(index, MetadataTokenKind::TypeDef))
	}

	#[test]
	fn no_clash_emits_bare_name() {
		let mut resolver = CollisionResolver::new(CompilationView::new());
		assert_eq!(resolver.resolve("RECT", &key(1)), CollisionDecision::Emit);
	}

	#[test]
	fn host_declared_symbol_forces_qualification() {
		let mut view = CompilationView::new();
		view.declare("FILE_CREATE_FLAGS");
		let mut resolver = CollisionResolver::new(view);
		assert_eq!(resolver.resolve("FILE_CREATE_FLAGS", &key(1)), CollisionDecision::QualifyPath);
	}

	#[test]
	fn second_distinct_entity_with_same_name_is_suppressed() {
		let mut resolver = CollisionResolver::new(CompilationView::new());
		assert_eq!(resolver.resolve("RECT", &key(1)), CollisionDecision::Emit);
		assert_eq!(resolver.resolve("RECT", &key(2)), CollisionDecision::Suppress);
	}

	#[test]
	fn re_resolving_the_same_entity_is_idempotent() {
		let mut resolver = CollisionResolver::new(CompilationView::new());
		assert_eq!(resolver.resolve("RECT", &key(1)), CollisionDecision::Emit);
		assert_eq!(resolver.resolve("RECT", &key(1)), CollisionDecision::Emit);
	}

	#[test]
	fn prelude_shadowing_names_are_always_qualified() {
		let mut resolver = CollisionResolver::new(CompilationView::new());
		assert_eq!(resolver.resolve("Result", &key(1)), CollisionDecision::QualifyPath);
	}

	#[test]
	fn upstream_visible_symbol_is_always_suppressed() {
		let mut view = CompilationView::new();
		view.grant_visibility("RECT");
		let mut resolver = CollisionResolver::new(view);
		assert_eq!(resolver.resolve("RECT", &key(1)), CollisionDecision::Suppress);
		// Idempotent: repeated resolution of the same upstream-visible name
		// never flips to `Emit` just because it was asked about before.
		assert_eq!(resolver.resolve("RECT", &key(1)), CollisionDecision::Suppress);
	}
}
