//! The unit accumulator: a keyed map of emitted fragments plus a pending work
//! queue. Emission is driven breadth-first — dispatching one entity may
//! discover more entities to emit, which get pushed onto `pending` rather than
//! recursed into directly. Termination follows from the metadata's own entity
//! count being finite: every `EmissionKey` that can ever be enqueued names a
//! row in one of a handful of fixed-size tables.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use crate::config::GenerationConfig;
use crate::raw::MetadataToken;

/// One of the small number of foundational types emitted code assumes exist
/// regardless of what metadata is loaded (`BOOL`, `GUID`). These have no
/// `MetadataToken` of their own to key off, so they get a dedicated key
/// variant instead of being synthesized as metadata lookups.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum WellKnownType {
	Bool,
	Guid,
}

/// Identifies one unit of emitted output. Two requests that resolve to the
/// same key are the same emission — the round-trip/idempotence laws are a
/// direct consequence of keying fragments this way instead of by request text.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum EmissionKey {
	/// A struct, union, enum, interface, delegate, or handle typedef declaration.
	Type(MetadataToken),
	/// The safe-handle wrapper for a handle typedef, distinct from the typedef
	/// struct itself — a handle typedef can be emitted without ever getting a
	/// safe-handle wrapper (no `RAIIFree`, or excluded as a namespace handle).
	SafeHandle(MetadataToken),
	/// A P/Invoke method. `friendly` distinguishes the raw extern binding from
	/// its sibling friendly overload — both may be emitted for the same method.
	Method { token: MetadataToken, friendly: bool },
	Constant(MetadataToken),
	WellKnown(WellKnownType),
	/// The shared `class_name` module every raw P/Invoke binding is gathered
	/// into. One fragment for the whole generation session rather than one per
	/// method, so the surrounding `pub mod { ... }` is only ever opened once —
	/// `Accumulator::append` grows this fragment in place instead of replacing it.
	ExternModule,
}

/// One compilation unit the host will re-parse as Rust source.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
	pub path: PathBuf,
	pub source: String,
}

#[derive(Debug, Clone)]
struct Fragment {
	source: String,
}

/// Keeps emitted fragments keyed by [`EmissionKey`], plus the queue of keys
/// discovered but not yet dispatched. Insertion order is preserved so repeated
/// generation of the same request set produces byte-identical unit ordering.
#[derive(Debug, Default)]
pub struct Accumulator {
	fragments: HashMap<EmissionKey, Fragment>,
	order: Vec<EmissionKey>,
	pending: VecDeque<EmissionKey>,
	queued: std::collections::HashSet<EmissionKey>,
}

impl Accumulator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, key: &EmissionKey) -> bool {
		self.fragments.contains_key(key)
	}

	/// Schedules `key` for dispatch unless it's already emitted or already
	/// queued. Idempotent: enqueuing the same key twice before it's dispatched
	/// only results in one pending entry.
	pub fn enqueue(&mut self, key: EmissionKey) {
		if self.fragments.contains_key(&key) || self.queued.contains(&key) {
			return;
		}
		self.queued.insert(key.clone());
		self.pending.push_back(key);
	}

	pub fn enqueue_many(&mut self, keys: impl IntoIterator<Item = EmissionKey>) {
		for key in keys {
			self.enqueue(key);
		}
	}

	pub fn pop_pending(&mut self) -> Option<EmissionKey> {
		let key = self.pending.pop_front()?;
		self.queued.remove(&key);
		Some(key)
	}

	/// Records a fragment for `key`. A suppressed entity (collision resolution
	/// rebinding it to an existing declaration) still calls this with an empty
	/// `source`, so the key is marked present without contributing any text.
	pub fn insert(&mut self, key: EmissionKey, source: String) {
		if !self.fragments.contains_key(&key) {
			self.order.push(key.clone());
		}
		self.fragments.insert(key, Fragment { source });
	}

	/// Grows the fragment at `key` instead of replacing it — every raw P/Invoke
	/// binding lands here under the same [`EmissionKey::ExternModule`] key, so
	/// the module wrapper applied at [`Self::drain_units`] only wraps the
	/// bindings once no matter how many methods were requested.
	pub fn append(&mut self, key: EmissionKey, source: &str) {
		if source.is_empty() {
			return;
		}
		match self.fragments.get_mut(&key) {
			Some(fragment) => {
				fragment.source.push('\n');
				fragment.source.push_str(source);
			}
			None => {
				self.order.push(key.clone());
				self.fragments.insert(key, Fragment { source: source.to_string() });
			}
		}
	}

	pub fn is_empty(&self) -> bool {
		self.fragments.values().all(|f| f.source.is_empty())
	}

	pub fn len(&self) -> usize {
		self.fragments.values().filter(|f| !f.source.is_empty()).count()
	}

	/// Drains accumulated fragments into [`GeneratedUnit`]s per
	/// `config.emit_single_file`. Leaves the accumulator empty so a second call
	/// on the same `Generator` only sees whatever is emitted after this point —
	/// matching the idempotence law, since re-requesting the same entities
	/// finds them already present and produces no new fragments.
	pub fn drain_units(&mut self, config: &GenerationConfig) -> Vec<GeneratedUnit> {
		let fragments: Vec<(EmissionKey, String)> = self
			.order
			.drain(..)
			.filter_map(|key| self.fragments.remove(&key).map(|f| (key, f.source)))
			.filter(|(_, source)| !source.is_empty())
			.map(|(key, source)| {
				let source = if matches!(key, EmissionKey::ExternModule) {
					wrap_extern_module(&source, &config.class_name)
				} else {
					source
				};
				(key, source)
			})
			.collect();

		if config.emit_single_file {
			if fragments.is_empty() {
				return Vec::new();
			}
			let source = fragments.iter().map(|(_, s)| s.as_str()).collect::<Vec<_>>().join("\n\n");
			vec![GeneratedUnit {
				path: PathBuf::from(format!("{}.rs", module_file_stem(config))),
				source,
			}]
		} else {
			fragments
				.into_iter()
				.map(|(key, source)| GeneratedUnit {
					path: PathBuf::from(unit_file_name(&key)),
					source,
				})
				.collect()
		}
	}
}

fn module_file_stem(config: &GenerationConfig) -> String {
	config.namespace.replace(['.', ':'], "_")
}

/// Wraps the gathered raw extern bindings in the class module exactly once,
/// at drain time, rather than once per method fragment.
fn wrap_extern_module(body: &str, class_name: &str) -> String {
	format!("pub mod {class_name} {{\n{body}\n}}\n")
}

fn unit_file_name(key: &EmissionKey) -> String {
	match key {
		EmissionKey::Type(token) => format!("type_{:08x}.rs", token_bits(*token)),
		EmissionKey::SafeHandle(token) => format!("safe_handle_{:08x}.rs", token_bits(*token)),
		EmissionKey::Method { token, friendly } => {
			format!("method_{:08x}{}.rs", token_bits(*token), if *friendly { "_friendly" } else { "" })
		}
		EmissionKey::Constant(token) => format!("const_{:08x}.rs", token_bits(*token)),
		EmissionKey::WellKnown(w) => format!("{}.rs", match w {
			WellKnownType::Bool => "bool",
			WellKnownType::Guid => "guid",
		}),
		EmissionKey::ExternModule => "extern_methods.rs".to_string(),
	}
}

fn token_bits(token: MetadataToken) -> u32 {
	// `MetadataToken` has no public accessor for the raw bits; `index()` plus
	// `token_kind()` is enough to build a stable, collision-free file stem.
	(token.token_kind() as u32) | token.index() as u32
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn enqueue_is_idempotent_before_dispatch() {
		let mut acc = Accumulator::new();
		let key = EmissionKey::WellKnown(WellKnownType::Bool);
		acc.enqueue(key.clone());
		acc.enqueue(key.clone());
		assert!(acc.pop_pending().is_some());
		assert!(acc.pop_pending().is_none());
	}

	#[test]
	fn enqueue_after_insert_is_a_no_op() {
		let mut acc = Accumulator::new();
		let key = EmissionKey::WellKnown(WellKnownType::Guid);
		acc.insert(key.clone(), "pub struct GUID;".to_string());
		acc.enqueue(key);
		assert!(acc.pop_pending().is_none());
	}

	#[test]
	fn single_file_mode_concatenates_in_insertion_order() {
		let mut acc = Accumulator::new();
		acc.insert(EmissionKey::WellKnown(WellKnownType::Bool), "struct BOOL;".to_string());
		acc.insert(EmissionKey::WellKnown(WellKnownType::Guid), "struct GUID;".to_string());

		let mut config = GenerationConfig::default();
		config.emit_single_file = true;
		let units = acc.drain_units(&config);

		assert_eq!(units.len(), 1);
		let first = units[0].source.find("BOOL").unwrap();
		let second = units[0].source.find("GUID").unwrap();
		assert!(first < second);
	}

	#[test]
	fn suppressed_entities_contribute_no_text_but_still_count_as_present() {
		let mut acc = Accumulator::new();
		let key = EmissionKey::Type(MetadataToken::null());
		acc.insert(key.clone(), String::new());
		assert!(acc.contains(&key));
		assert_eq!(acc.len(), 0);

		let config = GenerationConfig::default();
		let units = acc.drain_units(&config);
		assert!(units.is_empty());
	}

	#[test]
	fn drain_empties_the_accumulator() {
		let mut acc = Accumulator::new();
		acc.insert(EmissionKey::WellKnown(WellKnownType::Bool), "struct BOOL;".to_string());
		let config = GenerationConfig::default();
		assert_eq!(acc.drain_units(&config).len(), 1);
		assert!(acc.drain_units(&config).is_empty());
	}

	#[test]
	fn append_grows_the_same_fragment_instead_of_overwriting() {
		let mut acc = Accumulator::new();
		acc.append(EmissionKey::ExternModule, "extern \"system\" {\n\tpub fn A();\n}");
		acc.append(EmissionKey::ExternModule, "extern \"system\" {\n\tpub fn B();\n}");
		assert_eq!(acc.len(), 1);

		let mut config = GenerationConfig::default();
		config.emit_single_file = true;
		let units = acc.drain_units(&config);
		assert_eq!(units.len(), 1);
		assert!(units[0].source.contains("pub fn A();"));
		assert!(units[0].source.contains("pub fn B();"));
	}

	#[test]
	fn extern_module_is_wrapped_exactly_once_at_drain_time() {
		let mut acc = Accumulator::new();
		acc.append(EmissionKey::ExternModule, "extern \"system\" {\n\tpub fn A();\n}");
		acc.append(EmissionKey::ExternModule, "extern \"system\" {\n\tpub fn B();\n}");

		let mut config = GenerationConfig::default();
		config.class_name = "PInvoke".to_string();
		let units = acc.drain_units(&config);

		assert_eq!(units[0].source.matches("pub mod PInvoke").count(), 1);
	}
}
