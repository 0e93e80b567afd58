//! Generation facade: the `Generator` ties the metadata index, emitters,
//! collision resolver, and unit accumulator together behind three entry
//! points (by name, by module pattern, generate everything). This is the
//! only place that actually dispatches an `EmissionKey` through `emit::*`,
//! drains the dependencies it returns back into the accumulator's pending
//! queue, and drives the whole thing to a fixed point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use derivative::Derivative;
use tracing::{debug, trace};

use crate::accumulate::{Accumulator, EmissionKey};
use crate::collision::{CollisionDecision, CollisionResolver};
use crate::config::{CompilationView, GenerationConfig};
use crate::emit;
use crate::error::Error;
use crate::read::{MetadataIndex, FORBIDDEN_METHOD_NAME};
use crate::schema::TypeKind;

/// A cooperative cancellation flag shared across clones. Checked between
/// enumeration items and between pending-queue pops; never preempts a unit
/// of work already in progress.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
	pub fn new() -> Self {
		CancellationToken(Arc::new(AtomicBool::new(false)))
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}

/// Drives generation requests against one loaded metadata file. Deliberately
/// `!Sync`: the accumulator and collision resolver are plain, non-atomic
/// bookkeeping, so concurrent requests on one `Generator` are unsupported —
/// construct one per thread.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Generator {
	#[derivative(Debug = "ignore")]
	index: MetadataIndex,
	config: GenerationConfig,
	accumulator: Accumulator,
	resolver: CollisionResolver,
	cancel: CancellationToken,
}

impl Generator {
	pub fn new(index: MetadataIndex, config: GenerationConfig) -> Self {
		Generator::with_view(index, config, CompilationView::new())
	}

	pub fn with_view(index: MetadataIndex, config: GenerationConfig, view: CompilationView) -> Self {
		Generator {
			index,
			config,
			accumulator: Accumulator::new(),
			resolver: CollisionResolver::new(view),
			cancel: CancellationToken::new(),
		}
	}

	pub fn cancellation_token(&self) -> CancellationToken {
		self.cancel.clone()
	}

	pub fn config(&self) -> &GenerationConfig {
		&self.config
	}

	/// Resolves `name` to a type or method anywhere in the metadata and
	/// dispatches it. `Ok(true)` iff at least one fragment was produced;
	/// `Ok(false)` if `name` is absent from the metadata (a soft miss, not an
	/// error — only the forbidden-name request is a hard failure).
	pub fn generate(&mut self, name: &str) -> Result<bool, Error> {
		if name == FORBIDDEN_METHOD_NAME {
			return Err(Error::NotSupported(name.to_string()));
		}

		let key = if let Some(type_def) = self.index.iter_all_top_level_types().find(|t| t.name == name) {
			EmissionKey::Type(type_def.token)
		} else if let Some(method) = self.index.find_method_anywhere(name) {
			EmissionKey::Method { token: method.token, friendly: false }
		} else {
			return Ok(false);
		};

		self.accumulator.enqueue(key);
		self.run_pending()
	}

	/// Enumerates P/Invoke methods whose module matches `pattern` (e.g.
	/// `kernel32.*`) and dispatches each. `GetLastError` is skipped silently
	/// rather than erroring — a module wildcard is expected to sweep past it.
	pub fn generate_module(&mut self, pattern: &str) -> Result<bool, Error> {
		let tokens: Vec<_> = self
			.index
			.iter_methods_by_module_pattern(pattern)
			.map(|m| m.token)
			.collect();

		for token in tokens {
			if self.cancel.is_cancelled() {
				return Err(Error::Cancelled);
			}
			self.accumulator.enqueue(EmissionKey::Method { token, friendly: false });
		}

		self.run_pending()
	}

	/// Enumerates every eligible top-level type and every P/Invoke method and
	/// dispatches each.
	pub fn generate_all(&mut self) -> Result<bool, Error> {
		let type_tokens: Vec<_> = self.index.iter_all_top_level_types().map(|t| t.token).collect();
		for token in type_tokens {
			if self.cancel.is_cancelled() {
				return Err(Error::Cancelled);
			}
			self.accumulator.enqueue(EmissionKey::Type(token));
		}

		let method_tokens: Vec<_> = self.index.iter_all_pinvoke_methods().map(|m| m.token).collect();
		for token in method_tokens {
			if self.cancel.is_cancelled() {
				return Err(Error::Cancelled);
			}
			self.accumulator.enqueue(EmissionKey::Method { token, friendly: false });
		}

		for constant in self.index.constants() {
			self.accumulator.enqueue(EmissionKey::Constant(constant.token));
		}

		self.run_pending()
	}

	/// Drains every fragment accumulated so far into compilation units per
	/// `self.config.emit_single_file`. Subsequent `generate*` calls continue
	/// to accumulate into a freshly empty accumulator.
	pub fn take_units(&mut self) -> Vec<crate::accumulate::GeneratedUnit> {
		self.accumulator.drain_units(&self.config)
	}

	fn run_pending(&mut self) -> Result<bool, Error> {
		let mut produced = false;

		while let Some(key) = self.accumulator.pop_pending() {
			if self.cancel.is_cancelled() {
				return Err(Error::Cancelled);
			}
			if self.accumulator.contains(&key) {
				continue;
			}

			trace!(?key, "dispatching emission key");
			let is_raw_method = matches!(&key, EmissionKey::Method { friendly: false, .. });
			let output = self.dispatch(&key);

			if let Some(output) = output {
				if !output.source.is_empty() {
					produced = true;
				}
				let deps = output.dependencies;
				if is_raw_method {
					// Every raw P/Invoke binding lands in the same shared
					// fragment so it gets wrapped in `pub mod {class_name}`
					// exactly once, regardless of how many methods were
					// requested.
					self.accumulator.append(EmissionKey::ExternModule, &output.source);
					self.accumulator.insert(key, String::new());
				} else {
					self.accumulator.insert(key, output.source);
				}
				self.accumulator.enqueue_many(deps);
			} else {
				// An entity resolved to "nothing to emit" (e.g. a handle typedef
				// with no safe-handle wrapper) — record an empty fragment so the
				// key is never re-dispatched.
				self.accumulator.insert(key, String::new());
			}
		}

		debug!(produced, "generation request settled");
		Ok(produced)
	}

	fn dispatch(&mut self, key: &EmissionKey) -> Option<emit::EmitOutput> {
		match key {
			EmissionKey::WellKnown(which) => Some(emit::emit_well_known(*which)),
			EmissionKey::Constant(token) => {
				let constant = self.index.constants().iter().find(|c| c.token == *token)?;
				Some(emit::emit_constant(&self.index, &self.config.namespace, constant))
			}
			EmissionKey::SafeHandle(token) => {
				let type_def = self.index.find_type_by_token(*token)?;
				emit::emit_safe_handle(&self.index, type_def)
			}
			EmissionKey::Method { token, friendly } => {
				let method = self.index.find_method_by_token(*token)?;
				if method.name == FORBIDDEN_METHOD_NAME {
					return None;
				}
				let namespace = self.config.namespace.clone();
				if *friendly {
					let class_name = self.config.class_name.clone();
					emit::emit_method_friendly(&self.index, &namespace, &class_name, method)
				} else {
					Some(emit::emit_method_raw(&self.index, &namespace, method))
				}
			}
			EmissionKey::Type(token) => {
				let (name, output) = {
					let type_def = self.index.find_type_by_token(*token)?;
					let output = match type_def.kind {
						TypeKind::Struct | TypeKind::Union => emit::emit_struct_union(&self.index, type_def),
						TypeKind::Enum => emit::emit_enum(&self.index, type_def),
						TypeKind::Delegate => emit::emit_delegate(&self.index, type_def),
						TypeKind::Interface => emit::emit_interface(&self.index, type_def),
						TypeKind::HandleTypedef => emit::emit_handle_typedef(&self.index, type_def),
					};
					(type_def.name.clone(), output)
				};

				Some(match self.resolver.resolve(&name, key) {
					CollisionDecision::Emit => output,
					CollisionDecision::QualifyPath => {
						let qualified = format!("{}_{}", self.config.namespace.replace(['.', ':'], "_"), name);
						emit::EmitOutput::new(requalify(&output.source, &name, &qualified)).with_dependencies(output.dependencies)
					}
					CollisionDecision::Suppress => emit::EmitOutput::new(String::new()),
				})
			}
		}
	}
}

/// Replaces every whole-word occurrence of `from` with `to` in `source`. No
/// `regex` dependency is carried for this one call site, so word-boundary
/// checking is done by hand against the characters either side of each match.
fn requalify(source: &str, from: &str, to: &str) -> String {
	let mut out = String::with_capacity(source.len());
	let mut rest = source;
	loop {
		match rest.find(from) {
			Some(pos) => {
				let before_ok = rest[..pos].chars().next_back().map_or(true, |c| !is_ident_char(c));
				let after_ok = rest[pos + from.len()..].chars().next().map_or(true, |c| !is_ident_char(c));
				out.push_str(&rest[..pos]);
				if before_ok && after_ok {
					out.push_str(to);
				} else {
					out.push_str(from);
				}
				rest = &rest[pos + from.len()..];
			}
			None => {
				out.push_str(rest);
				break;
			}
		}
	}
	out
}

fn is_ident_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::raw::{MetadataToken, MetadataTokenKind};
	use crate::schema::{CallingConvention, Layout, MethodDef, PInvokeInfo, TypeDef, TypeSig};
	use std::collections::HashMap;

	fn tick_count_index() -> MetadataIndex {
		let method = MethodDef {
			token: MetadataToken::new(1, MetadataTokenKind::Method),
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
		MetadataIndex::from_parts(Vec::new(), vec![method], Vec::new(), Vec::new(), HashMap::new())
	}

	#[test]
	fn generate_by_name_produces_a_fragment() {
		let mut gen = Generator::new(tick_count_index(), GenerationConfig::default());
		let produced = gen.generate("GetTickCount").unwrap();
		assert!(produced);
		let units = gen.take_units();
		assert_eq!(units.len(), 1);
		assert!(units[0].source.contains("GetTickCount"));
	}

	#[test]
	fn generate_rejects_forbidden_name() {
		let mut gen = Generator::new(tick_count_index(), GenerationConfig::default());
		let err = gen.generate("GetLastError").unwrap_err();
		assert!(matches!(err, Error::NotSupported(_)));
	}

	#[test]
	fn generate_by_unknown_name_is_a_soft_miss() {
		let mut gen = Generator::new(tick_count_index(), GenerationConfig::default());
		let produced = gen.generate("SomeTypeThatDoesNotExist").unwrap();
		assert!(!produced);
		assert!(gen.take_units().is_empty());
	}

	#[test]
	fn generate_module_skips_get_last_error() {
		let get_last_error = MethodDef {
			token: MetadataToken::new(2, MetadataTokenKind::Method),
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

		let mut index = tick_count_index();
		index = MetadataIndex::from_parts(Vec::new(), vec![
			index.find_method_by_token(MetadataToken::new(1, MetadataTokenKind::Method)).unwrap().clone(),
			get_last_error,
		], Vec::new(), Vec::new(), HashMap::new());

		let mut gen = Generator::new(index, GenerationConfig::default());
		gen.generate_module("kernel32.*").unwrap();
		let units = gen.take_units();
		assert!(units.iter().all(|u| !u.source.contains("fn GetLastError")));
	}

	#[test]
	fn repeated_generate_all_is_idempotent() {
		let mut gen = Generator::new(tick_count_index(), GenerationConfig::default());
		gen.generate_all().unwrap();
		let first = gen.take_units();
		let mut gen2 = Generator::new(tick_count_index(), GenerationConfig::default());
		gen2.generate_all().unwrap();
		gen2.generate_all().unwrap();
		let second = gen2.take_units();
		assert_eq!(first.len(), second.len());
	}

	#[test]
	fn cancellation_token_stops_generate_all() {
		let mut gen = Generator::new(tick_count_index(), GenerationConfig::default());
		let token = gen.cancellation_token();
		token.cancel();
		let err = gen.generate_all().unwrap_err();
		assert!(matches!(err, Error::Cancelled));
	}

	#[test]
	fn qualify_path_rewrites_the_declared_name() {
		use crate::schema::{Layout, TypeDef};

		let td = TypeDef {
			token: MetadataToken::new(10, MetadataTokenKind::TypeDef),
			namespace: "Windows.Win32.Foundation".to_string(),
			name: "Result".to_string(),
			kind: TypeKind::Struct,
			layout: Layout::Sequential { pack: 0, size: 0 },
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

		let mut gen = Generator::new(index, GenerationConfig::default());
		gen.generate("Result").unwrap();
		let units = gen.take_units();
		let source = &units[0].source;

		assert!(source.contains("pub struct windows_sdk_Result"));
		assert!(!source.contains("pub struct Result "));
	}
}
