//! Builds the typed entity graph by walking every raw table once at load
//! time. Lookups against [`MetadataIndex`] are then plain hash-map/slice
//! operations; nothing here re-touches the byte stream after construction.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::raw::{
	self, field_flags, method_flags, param_flags, pinvoke_attributes, type_attributes, AlignedBuffer,
	Assembly as RawAssembly, BlobHeap, ClassLayoutTable, Constant as RawConstant, ConstantTable,
	CustomAttribute as RawCustomAttribute, CustomAttributeTable, ElementType, Field as RawField, FieldLayoutTable,
	FieldTable, GuidHeap, ImplMapTable, InterfaceImplTable, MetadataToken, MetadataTokenKind,
	MethodDef as RawMethodDef, MethodDefTable, ModuleRefTable, NestedClassTable, Param as RawParam, ParamTable,
	StringHeap, TableHeap, TypeAttributes, TypeDef as RawTypeDef, TypeDefTable, TypeRef as RawTypeRef, TypeRefTable,
};
use crate::read::attributes::decode_custom_attribute_blob;
use crate::read::signature::{decode_field_signature, decode_method_signature};
use crate::read::Error;
use crate::schema::{
	classify_attribute_type_name, AttributeKind, BitfieldRange, CallingConvention, ConstantRef, ConstantValue,
	CustomAttribute, FieldDef, FixedArrayHint, Layout, MethodDef, MethodSignature, PInvokeInfo, Param, ParamMarshal,
	ParamSemantics, TypeDef, TypeKind, TypeSig,
};

/// `GetLastError` is never a valid generation target.
pub const FORBIDDEN_METHOD_NAME: &str = "GetLastError";

/// The fully materialized Win32 metadata graph for one loaded file.
/// Every lookup table is built once from the raw tables at [`MetadataIndex::load`]
/// time; entities are owned values, so nothing here keeps the source file mapped.
pub struct MetadataIndex {
	pub(crate) type_defs: Vec<TypeDef>,
	pub(crate) methods: Vec<MethodDef>,
	pub(crate) fields: Vec<FieldDef>,
	pub(crate) constants: Vec<ConstantRef>,
	pub(crate) attributes_by_owner: HashMap<MetadataToken, Vec<CustomAttribute>>,

	type_index_by_token: HashMap<MetadataToken, usize>,
	type_index_by_name: HashMap<(String, String), usize>,
	method_index_by_token: HashMap<MetadataToken, usize>,
	method_index_by_module_and_name: HashMap<(String, String), usize>,
	method_indices_by_name: HashMap<String, Vec<usize>>,
	field_index_by_token: HashMap<MetadataToken, usize>,
}

impl MetadataIndex {
	pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
		let path = path.as_ref();
		let buffer = AlignedBuffer::try_from(path).map_err(|source| Error::Io {
			path: path.to_path_buf(),
			source,
		})?;

		Self::from_bytes(&buffer)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
		let assembly = RawAssembly::try_from(bytes)?;
		let strings = get_heap::<StringHeap>(&assembly)?;
		let blobs = get_heap::<BlobHeap>(&assembly)?;
		let tables = get_heap::<TableHeap>(&assembly)?;
		// GuidHeap is present in every well-formed winmd but not every field blob
		// needs it directly; custom-attribute GUID args are packed ints, not heap
		// refs, so the heap itself is only validated for presence here.
		let _guids = get_heap::<GuidHeap>(&assembly)?;

		let type_def_rows: Vec<RawTypeDef> = rows::<TypeDefTable>(&tables)?;
		let method_rows: Vec<RawMethodDef> = rows::<MethodDefTable>(&tables)?;
		let field_rows: Vec<RawField> = rows::<FieldTable>(&tables)?;
		let param_rows: Vec<RawParam> = rows::<ParamTable>(&tables)?;
		let constant_rows: Vec<RawConstant> = rows::<ConstantTable>(&tables)?;
		let attribute_rows: Vec<RawCustomAttribute> = rows::<CustomAttributeTable>(&tables)?;
		let interface_impl_rows: Vec<raw::InterfaceImpl> = rows::<InterfaceImplTable>(&tables)?;
		let class_layout_rows: Vec<raw::ClassLayout> = rows::<ClassLayoutTable>(&tables)?;
		let field_layout_rows: Vec<raw::FieldLayout> = rows::<FieldLayoutTable>(&tables)?;
		let impl_map_rows: Vec<raw::ImplMap> = rows::<ImplMapTable>(&tables)?;
		let module_ref_rows: Vec<raw::ModuleRef> = rows::<ModuleRefTable>(&tables)?;
		let nested_class_rows: Vec<raw::NestedClass> = rows::<NestedClassTable>(&tables)?;
		let type_ref_rows: Vec<RawTypeRef> = rows::<TypeRefTable>(&tables)?;

		let method_token = |i: usize| MetadataToken::new((i + 1) as u32, MetadataTokenKind::Method);
		let field_token = |i: usize| MetadataToken::new((i + 1) as u32, MetadataTokenKind::Field);
		let type_def_token = |i: usize| MetadataToken::new((i + 1) as u32, MetadataTokenKind::TypeDef);

		// Row index (0-based) of the owning TypeDef for every MethodDef row, derived
		// from each TypeDef's method range. Used to name custom-attribute ctors
		// before the full TypeDef graph exists.
		let method_owner_name = build_owner_name_table(&type_def_rows, &method_rows, |t| t.methods().0 as usize, &strings);

		let mut attributes_by_owner: HashMap<MetadataToken, Vec<CustomAttribute>> = HashMap::new();
		for row in &attribute_rows {
			let Some(owner) = row.parent().decode(raw::CodedIndexKind::HasCustomAttribute) else {
				continue;
			};

			let ctor_name = resolve_attribute_ctor_name(row.type_(), &method_owner_name);
			let ctor_param_types = resolve_attribute_ctor_param_types(row.type_(), &method_rows, &blobs)?;
			let blob = blobs.get_blob(row.value())?;
			let (fixed_args, named_args) = decode_custom_attribute_blob(blob, &ctor_param_types)?;

			attributes_by_owner.entry(owner).or_default().push(CustomAttribute {
				kind: classify_attribute_type_name(&ctor_name),
				attribute_type_name: ctor_name,
				fixed_args,
				named_args,
			});
		}

		let constants_by_field: HashMap<MetadataToken, &RawConstant> = constant_rows
			.iter()
			.filter_map(|c| {
				let owner = c.parent().decode(raw::CodedIndexKind::HasConstant)?;
				(owner.token_kind() == MetadataTokenKind::Field).then_some((owner, c))
			})
			.collect();

		let field_offsets: HashMap<MetadataToken, u32> = field_layout_rows
			.iter()
			.map(|row| (field_token(row.field().0 as usize - 1), row.offset()))
			.collect();

		let mut fields = Vec::with_capacity(field_rows.len());
		for (i, row) in field_rows.iter().enumerate() {
			let token = field_token(i);
			let name = strings.get_string(row.name()).to_string();
			let ty = decode_field_signature(blobs.get_blob(row.signature())?)?;
			let constant = constants_by_field.get(&token).map(|c| decode_constant_value(c, &blobs));
			let attrs = attributes_by_owner.get(&token);

			let fixed_array = attrs.and_then(|attrs| {
				attrs.iter().find_map(|a| match &a.kind {
					AttributeKind::Unknown(name) if name == "NativeArrayInfoAttribute" || name == "MemorySizeAttribute" => {
						a.named_str("CountConst").and_then(|s| s.parse().ok()).map(|length| FixedArrayHint { length })
					}
					_ => None,
				})
			});

			let bitfield = attrs.and_then(|attrs| {
				attrs.iter().find(|a| a.kind == AttributeKind::NativeBitfield).and_then(|a| {
					match (a.arg_i64(0), a.arg_i64(1)) {
						(Some(offset), Some(width)) => Some(BitfieldRange {
							offset: offset as u8,
							width: width as u8,
						}),
						_ => None,
					}
				})
			});

			fields.push(FieldDef {
				token,
				name,
				owner: MetadataToken::null(),
				ty,
				constant,
				explicit_offset: field_offsets.get(&token).copied(),
				fixed_array,
				is_static: row.flags() & field_flags::STATIC != 0,
				bitfield,
			});
		}

		let mut methods = Vec::with_capacity(method_rows.len());
		for (i, row) in method_rows.iter().enumerate() {
			let token = method_token(i);
			let name = strings.get_string(row.name()).to_string();
			let (sig, _has_this) = decode_method_signature(blobs.get_blob(row.signature())?)?;

			let param_start = row.params().0 as usize;
			let param_row_at = |seq: usize| -> Option<(&RawParam, usize)> {
				let row_index = param_start.checked_sub(1)? + seq;
				param_rows.get(row_index).map(|p| (p, row_index))
			};

			let mut params = Vec::with_capacity(sig.params.len());
			for (seq, ty) in sig.params.iter().enumerate() {
				let (name, sequence, flags, marshal) = match param_row_at(seq) {
					Some((p, row_index)) => {
						let attrs = attributes_by_owner.get(&crate::raw::MetadataToken::new((row_index + 1) as u32, MetadataTokenKind::Param));
						let marshal = attrs.map(|a| marshal_hint_from_attrs(a)).unwrap_or_default();
						(strings.get_string(p.name()).to_string(), p.sequence(), p.flags(), marshal)
					}
					None => (format!("param{}", seq + 1), (seq + 1) as u16, 0, ParamMarshal::default()),
				};

				params.push(Param {
					name,
					sequence,
					ty: ty.clone(),
					semantics: ParamSemantics {
						is_in: flags & param_flags::IN != 0,
						is_out: flags & param_flags::OUT != 0,
						is_optional: flags & param_flags::OPTIONAL != 0,
					},
					marshal,
				});
			}

			let pinvoke = impl_map_rows
				.iter()
				.find(|m| m.member_forwarded().decode(raw::CodedIndexKind::MemberForwarded) == Some(token))
				.map(|m| {
					let module_name = module_ref_rows
						.get(m.import_scope().0 as usize - 1)
						.map(|mr| strings.get_string(mr.name()).to_string())
						.unwrap_or_default();

					PInvokeInfo {
						module: module_name,
						entry_point: strings.get_string(m.import_name()).to_string(),
						calling_convention: calling_convention_from_pinvoke_attrs(m.mapping_flags()),
						supports_last_error: m.mapping_flags() & pinvoke_attributes::SUPPORTS_LAST_ERROR != 0,
					}
				});

			methods.push(MethodDef {
				token,
				name,
				owner: MetadataToken::null(),
				return_type: sig.return_type,
				params,
				pinvoke,
				is_static: row.flags() & method_flags::STATIC != 0,
			});
		}

		let nested_enclosing_by_child: HashMap<MetadataToken, MetadataToken> = nested_class_rows
			.iter()
			.map(|row| {
				(
					type_def_token(row.nested_class().0 as usize - 1),
					type_def_token(row.enclosing_class().0 as usize - 1),
				)
			})
			.collect();

		// Direct `InterfaceImpl` bases per row, and a reverse lookup from a
		// base's token back to its own row — both needed to walk the chain up
		// to `IUnknown`/`IDispatch` before the `TypeDef` graph itself exists.
		let direct_interfaces: Vec<Vec<MetadataToken>> = (0..type_def_rows.len())
			.map(|i| {
				interface_impl_rows
					.iter()
					.filter(|ii| ii.type_().0 as usize == i + 1)
					.filter_map(|ii| ii.interface().decode(raw::CodedIndexKind::TypeDefOrRef))
					.collect()
			})
			.collect();
		let token_to_row: HashMap<MetadataToken, usize> = (0..type_def_rows.len()).map(|i| (type_def_token(i), i)).collect();

		let mut type_defs = Vec::with_capacity(type_def_rows.len());
		for (i, row) in type_def_rows.iter().enumerate() {
			let token = type_def_token(i);
			let namespace = strings.get_string(row.namespace()).to_string();
			let name = strings.get_string(row.name()).to_string();

			let field_tokens = row_range(&type_def_rows, i, |t| t.fields().0 as usize, field_rows.len())
				.map(field_token)
				.collect::<Vec<_>>();
			let method_tokens = row_range(&type_def_rows, i, |t| t.methods().0 as usize, method_rows.len())
				.map(method_token)
				.collect::<Vec<_>>();

			let interfaces = {
				let mut seen = HashSet::new();
				seen.insert(i);
				closed_interfaces(i, &direct_interfaces, &token_to_row, &mut seen)
			};

			let base = row.extends().decode(raw::CodedIndexKind::TypeDefOrRef);

			let explicit_layout = row.flags() & type_attributes::LAYOUT_MASK == type_attributes::EXPLICIT_LAYOUT;
			let layout = class_layout_rows
				.iter()
				.find(|cl| cl.parent().0 as usize == i + 1)
				.map(|cl| {
					if explicit_layout {
						Layout::Explicit {
							pack: cl.packing_size(),
							size: cl.class_size(),
						}
					} else {
						Layout::Sequential {
							pack: cl.packing_size(),
							size: cl.class_size(),
						}
					}
				})
				.unwrap_or(Layout::Auto);

			let attrs = attributes_by_owner.get(&token);
			let guid = attrs
				.and_then(|attrs| attrs.iter().find(|a| a.kind == AttributeKind::Guid))
				.and_then(guid_from_attribute);

			let zero_offset_fields = field_tokens.iter().filter(|t| field_offsets.get(t) == Some(&0)).count();
			let base_name = base.and_then(|t| resolve_type_name(t, &type_def_rows, &type_ref_rows, &strings));
			let kind = classify_type_kind(
				row.flags(),
				explicit_layout,
				zero_offset_fields,
				base_name.as_ref(),
				attrs,
				&field_tokens,
				&fields,
			);

			let nested_types: Vec<_> = nested_class_rows
				.iter()
				.filter(|nc| nc.enclosing_class().0 as usize == i + 1)
				.map(|nc| type_def_token(nc.nested_class().0 as usize - 1))
				.collect();

			type_defs.push(TypeDef {
				token,
				namespace,
				name,
				kind,
				layout,
				base,
				fields: field_tokens,
				methods: method_tokens,
				interfaces,
				nested_types,
				enclosing_type: nested_enclosing_by_child.get(&token).copied(),
				guid,
				delegate_signature: None,
			});
		}

		for type_def in &mut type_defs {
			for field_token in type_def.fields.clone() {
				if let Some(field) = fields.iter_mut().find(|f| f.token == field_token) {
					field.owner = type_def.token;
				}
			}
			for method_token in type_def.methods.clone() {
				if let Some(method) = methods.iter_mut().find(|m| m.token == method_token) {
					method.owner = type_def.token;
				}
			}

			if type_def.kind == TypeKind::Delegate {
				type_def.delegate_signature = type_def
					.methods
					.iter()
					.find_map(|t| methods.iter().find(|m| m.token == *t && m.name == "Invoke"))
					.map(|m| MethodSignature {
						calling_convention: CallingConvention::Default,
						return_type: m.return_type.clone(),
						params: m.params.iter().map(|p| p.ty.clone()).collect(),
					});
			}
		}

		let constants: Vec<ConstantRef> = fields
			.iter()
			.filter(|f| f.is_literal())
			.map(|f| ConstantRef {
				token: f.token,
				name: f.name.clone(),
				owner: f.owner,
				ty: f.ty.clone(),
				value: f.constant.clone().unwrap_or(ConstantValue::Null),
			})
			.collect();

		let type_index_by_token = index_by(&type_defs, |t| t.token);
		let type_index_by_name = index_by(&type_defs, |t| (t.namespace.clone(), t.name.clone()));
		let method_index_by_token = index_by(&methods, |m| m.token);
		let method_index_by_module_and_name: HashMap<_, _> = methods
			.iter()
			.enumerate()
			.filter_map(|(i, m)| m.pinvoke.as_ref().map(|p| ((module_stem(&p.module), m.name.clone()), i)))
			.collect();

		let mut method_indices_by_name: HashMap<String, Vec<usize>> = HashMap::new();
		for (i, m) in methods.iter().enumerate() {
			method_indices_by_name.entry(m.name.clone()).or_default().push(i);
		}

		let field_index_by_token = index_by(&fields, |f| f.token);

		Ok(MetadataIndex {
			type_defs,
			methods,
			fields,
			constants,
			attributes_by_owner,
			type_index_by_token,
			type_index_by_name,
			method_index_by_token,
			method_index_by_module_and_name,
			method_indices_by_name,
			field_index_by_token,
		})
	}

	/// `find_type(namespace, name)`.
	pub fn find_type(&self, namespace: &str, name: &str) -> Option<&TypeDef> {
		self.type_index_by_name
			.get(&(namespace.to_string(), name.to_string()))
			.map(|&i| &self.type_defs[i])
	}

	pub fn find_type_by_token(&self, token: MetadataToken) -> Option<&TypeDef> {
		self.type_index_by_token.get(&token).map(|&i| &self.type_defs[i])
	}

	/// `find_method(module, name)`.
	pub fn find_method(&self, module: &str, name: &str) -> Option<&MethodDef> {
		self.method_index_by_module_and_name
			.get(&(module_stem(module), name.to_string()))
			.map(|&i| &self.methods[i])
	}

	/// `find_method_anywhere(name)`: any method by short name, ignoring module.
	pub fn find_method_anywhere(&self, name: &str) -> Option<&MethodDef> {
		self.method_indices_by_name.get(name).and_then(|is| is.first()).map(|&i| &self.methods[i])
	}

	pub fn find_method_by_token(&self, token: MetadataToken) -> Option<&MethodDef> {
		self.method_index_by_token.get(&token).map(|&i| &self.methods[i])
	}

	pub fn find_field_by_token(&self, token: MetadataToken) -> Option<&FieldDef> {
		self.field_index_by_token.get(&token).map(|&i| &self.fields[i])
	}

	/// `iter_methods_by_module_pattern(pattern)`, pattern of form `module.glob`.
	/// Never yields `GetLastError`.
	pub fn iter_methods_by_module_pattern<'s>(&'s self, pattern: &str) -> impl Iterator<Item = &'s MethodDef> + 's {
		let (module, glob) = pattern.split_once('.').unwrap_or((pattern, "*"));
		let module = module_stem(module);
		let glob = glob.to_string();

		self.methods.iter().filter(move |m| {
			m.name != FORBIDDEN_METHOD_NAME
				&& m.pinvoke
					.as_ref()
					.map(|p| module_stem(&p.module) == module && glob_matches(&glob, &m.name))
					.unwrap_or(false)
		})
	}

	/// `iter_all_top_level_types()`: every `TypeDef` with no enclosing type.
	pub fn iter_all_top_level_types(&self) -> impl Iterator<Item = &TypeDef> {
		self.type_defs.iter().filter(|t| t.enclosing_type.is_none())
	}

	pub fn iter_all_pinvoke_methods(&self) -> impl Iterator<Item = &MethodDef> {
		self.methods.iter().filter(|m| m.is_pinvoke() && m.name != FORBIDDEN_METHOD_NAME)
	}

	pub fn constants(&self) -> &[ConstantRef] {
		&self.constants
	}

	/// `get_custom_attribute(entity, kind)`.
	pub fn get_custom_attribute(&self, entity: MetadataToken, kind: &AttributeKind) -> Option<&CustomAttribute> {
		self.attributes_by_owner.get(&entity)?.iter().find(|a| &a.kind == kind)
	}

	pub fn custom_attributes(&self, entity: MetadataToken) -> &[CustomAttribute] {
		self.attributes_by_owner.get(&entity).map(Vec::as_slice).unwrap_or(&[])
	}
}

#[cfg(test)]
impl MetadataIndex {
	/// Builds an index directly from already-materialized entities, bypassing
	/// `from_bytes` entirely. Used by tests above C1 that need a `MetadataIndex`
	/// shaped around a handful of hand-built entities rather than a real
	/// `.winmd` file. Mirrors the index-building tail of `from_bytes` exactly.
	pub(crate) fn from_parts(
		type_defs: Vec<TypeDef>,
		methods: Vec<MethodDef>,
		fields: Vec<FieldDef>,
		constants: Vec<ConstantRef>,
		attributes_by_owner: HashMap<MetadataToken, Vec<CustomAttribute>>,
	) -> Self {
		let type_index_by_token = index_by(&type_defs, |t| t.token);
		let type_index_by_name = index_by(&type_defs, |t| (t.namespace.clone(), t.name.clone()));
		let method_index_by_token = index_by(&methods, |m| m.token);
		let method_index_by_module_and_name: HashMap<_, _> = methods
			.iter()
			.enumerate()
			.filter_map(|(i, m)| m.pinvoke.as_ref().map(|p| ((module_stem(&p.module), m.name.clone()), i)))
			.collect();

		let mut method_indices_by_name: HashMap<String, Vec<usize>> = HashMap::new();
		for (i, m) in methods.iter().enumerate() {
			method_indices_by_name.entry(m.name.clone()).or_default().push(i);
		}

		let field_index_by_token = index_by(&fields, |f| f.token);

		MetadataIndex {
			type_defs,
			methods,
			fields,
			constants,
			attributes_by_owner,
			type_index_by_token,
			type_index_by_name,
			method_index_by_token,
			method_index_by_module_and_name,
			method_indices_by_name,
			field_index_by_token,
		}
	}
}

fn rows<'s, 'l, T>(tables: &'s TableHeap<'l>) -> Result<Vec<T::Row>, Error>
where
	T: crate::raw::MetadataTable<'l>,
{
	match tables.get_table::<T>()? {
		Some(table) => table.iter().collect::<Result<Vec<_>, _>>().map_err(Error::from),
		None => Ok(Vec::new()),
	}
}

/// Computes the half-open `[start, end)` 0-based row range for the i-th type's
/// field or method list, using the ECMA "delta to the next row, or end of
/// table" convention shared by every such list column.
fn row_range<'a>(
	type_def_rows: &'a [RawTypeDef],
	i: usize,
	accessor: impl Fn(&RawTypeDef) -> usize,
	table_len: usize,
) -> impl Iterator<Item = usize> + 'a {
	let start = accessor(&type_def_rows[i]);
	let end = type_def_rows.get(i + 1).map(&accessor).unwrap_or(table_len + 1);
	(start.max(1)..end.max(1)).map(|r| r - 1)
}

fn build_owner_name_table(
	type_def_rows: &[RawTypeDef],
	method_rows: &[RawMethodDef],
	accessor: impl Fn(&RawTypeDef) -> usize,
	strings: &StringHeap,
) -> Vec<String> {
	let mut owners = vec![String::new(); method_rows.len()];
	for i in 0..type_def_rows.len() {
		let name = strings.get_string(type_def_rows[i].name()).to_string();
		for row_index in row_range(type_def_rows, i, &accessor, method_rows.len()) {
			if let Some(slot) = owners.get_mut(row_index) {
				*slot = name.clone();
			}
		}
	}
	owners
}

fn resolve_attribute_ctor_name(ctor_token: crate::raw::CodedIndex, method_owner_name: &[String]) -> String {
	let Some(token) = ctor_token.decode(raw::CodedIndexKind::CustomAttributeType) else {
		return String::new();
	};

	// `MemberRef`-declared attribute ctors (imported from another assembly) are
	// not resolved here; Win32 metadata declares its own attribute types locally
	// as `MethodDef`s, which covers every attribute this generator understands.
	if token.token_kind() != MetadataTokenKind::Method {
		return String::new();
	}

	method_owner_name.get(token.index() - 1).cloned().unwrap_or_default()
}

/// The attribute ctor's own parameter types, needed to decode its blob's fixed
/// args (`decode_custom_attribute_blob` has no other way to know their shapes).
/// Same `MemberRef`-vs-`MethodDef` restriction as [`resolve_attribute_ctor_name`].
fn resolve_attribute_ctor_param_types(
	ctor_token: crate::raw::CodedIndex,
	method_rows: &[RawMethodDef],
	blobs: &BlobHeap,
) -> Result<Vec<TypeSig>, Error> {
	let Some(token) = ctor_token.decode(raw::CodedIndexKind::CustomAttributeType) else {
		return Ok(Vec::new());
	};
	if token.token_kind() != MetadataTokenKind::Method {
		return Ok(Vec::new());
	}
	let Some(row) = method_rows.get(token.index() - 1) else {
		return Ok(Vec::new());
	};

	let (sig, _has_this) = decode_method_signature(blobs.get_blob(row.signature())?)?;
	Ok(sig.params)
}

fn get_heap<'l, T: crate::raw::MetadataHeap<'l>>(assembly: &RawAssembly<'l>) -> Result<T, Error> {
	assembly
		.get_heap::<T>()?
		.ok_or(Error::DanglingReference("required metadata heap is absent"))
}

fn index_by<T, K: std::hash::Hash + Eq>(items: &[T], key: impl Fn(&T) -> K) -> HashMap<K, usize> {
	items.iter().enumerate().map(|(i, t)| (key(t), i)).collect()
}

/// Transitively closes row `i`'s direct `InterfaceImpl` bases over their own
/// bases, farthest ancestor first. COM vtable layout is positional and a
/// derived interface's vtable is its base's vtable with new slots appended,
/// so emitting a correct `Vtbl` struct depends on this list being ordered
/// ancestor-to-nearest, not just complete.
fn closed_interfaces(
	i: usize,
	direct: &[Vec<MetadataToken>],
	token_to_row: &HashMap<MetadataToken, usize>,
	seen: &mut HashSet<usize>,
) -> Vec<MetadataToken> {
	let mut out = Vec::new();
	for &base_token in &direct[i] {
		if let Some(&base_row) = token_to_row.get(&base_token) {
			if seen.insert(base_row) {
				out.extend(closed_interfaces(base_row, direct, token_to_row, seen));
			}
		}
		if !out.contains(&base_token) {
			out.push(base_token);
		}
	}
	out
}

fn module_stem(module: &str) -> String {
	let lower = module.to_ascii_lowercase();
	lower.strip_suffix(".dll").unwrap_or(&lower).to_string()
}

fn glob_matches(glob: &str, name: &str) -> bool {
	if glob == "*" {
		return true;
	}
	match glob.strip_suffix('*') {
		Some(prefix) => name.starts_with(prefix),
		None => glob == name,
	}
}

fn calling_convention_from_pinvoke_attrs(flags: pinvoke_attributes::PInvokeAttributes) -> CallingConvention {
	match flags & pinvoke_attributes::CALL_CONV_MASK {
		pinvoke_attributes::CALL_CONV_CDECL => CallingConvention::Cdecl,
		pinvoke_attributes::CALL_CONV_STDCALL => CallingConvention::StdCall,
		pinvoke_attributes::CALL_CONV_THISCALL => CallingConvention::ThisCall,
		pinvoke_attributes::CALL_CONV_FASTCALL => CallingConvention::FastCall,
		_ => CallingConvention::StdCall,
	}
}

fn marshal_hint_from_attrs(attrs: &[CustomAttribute]) -> ParamMarshal {
	let mut hint = ParamMarshal::default();
	for attr in attrs {
		if let AttributeKind::Unknown(name) = &attr.kind {
			if name == "NativeArrayInfoAttribute" {
				if let Some(idx) = attr.named_str("SizeParamIndex").and_then(|s| s.parse().ok()) {
					hint.size_param_index = Some(idx);
				}
				if let Some(c) = attr.named_str("CountConst").and_then(|s| s.parse().ok()) {
					hint.size_const = Some(c);
				}
			}
		}
	}
	hint
}

fn guid_from_attribute(attr: &CustomAttribute) -> Option<uuid::Uuid> {
	let parts: Vec<i64> = (0..11).filter_map(|i| attr.arg_i64(i)).collect();
	if parts.len() < 11 {
		return None;
	}

	let d1 = parts[0] as u32;
	let d2 = parts[1] as u16;
	let d3 = parts[2] as u16;
	let rest: Vec<u8> = parts[3..11].iter().map(|v| *v as u8).collect();
	let rest: [u8; 8] = rest.try_into().ok()?;

	Some(uuid::Uuid::from_fields(d1, d2, d3, &rest))
}

fn decode_constant_value(row: &RawConstant, blobs: &BlobHeap) -> ConstantValue {
	let blob = match blobs.get_blob(row.value()) {
		Ok(b) => b,
		Err(_) => return ConstantValue::Null,
	};

	match row.type_() {
		ElementType::Bool => ConstantValue::Bool(blob.first().copied().unwrap_or(0) != 0),
		ElementType::I1 => ConstantValue::I8(blob.first().copied().unwrap_or(0) as i8),
		ElementType::U1 => ConstantValue::U8(blob.first().copied().unwrap_or(0)),
		ElementType::I2 => ConstantValue::I16(read_le::<2>(blob) as i16),
		ElementType::U2 => ConstantValue::U16(read_le::<2>(blob) as u16),
		ElementType::I4 => ConstantValue::I32(read_le::<4>(blob) as i32),
		ElementType::U4 => ConstantValue::U32(read_le::<4>(blob) as u32),
		ElementType::I8 => ConstantValue::I64(read_le::<8>(blob) as i64),
		ElementType::U8 => ConstantValue::U64(read_le::<8>(blob)),
		ElementType::R4 => ConstantValue::F32(f32::from_bits(read_le::<4>(blob) as u32)),
		ElementType::R8 => ConstantValue::F64(f64::from_bits(read_le::<8>(blob))),
		ElementType::String => {
			if blob.is_empty() {
				ConstantValue::Null
			} else {
				let utf16: Vec<u16> = blob.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();
				ConstantValue::Str(String::from_utf16_lossy(&utf16))
			}
		}
		_ => ConstantValue::Null,
	}
}

fn read_le<const N: usize>(bytes: &[u8]) -> u64 {
	let mut buf = [0u8; 8];
	let n = N.min(bytes.len());
	buf[..n].copy_from_slice(&bytes[..n]);
	u64::from_le_bytes(buf)
}

/// Resolves a `TypeDefOrRef` token to its `(namespace, name)`, following into
/// the `TypeRef` table for the (overwhelmingly common) case of a base type
/// declared outside this assembly, e.g. `System.Enum` / `System.MulticastDelegate`.
fn resolve_type_name(
	token: MetadataToken,
	type_def_rows: &[RawTypeDef],
	type_ref_rows: &[RawTypeRef],
	strings: &StringHeap,
) -> Option<(String, String)> {
	match token.token_kind() {
		MetadataTokenKind::TypeDef => {
			let row = type_def_rows.get(token.index() - 1)?;
			Some((strings.get_string(row.namespace()).to_string(), strings.get_string(row.name()).to_string()))
		}
		MetadataTokenKind::TypeRef => {
			let row = type_ref_rows.get(token.index() - 1)?;
			Some((strings.get_string(row.type_namespace()).to_string(), strings.get_string(row.type_name()).to_string()))
		}
		_ => None,
	}
}

fn classify_type_kind(
	flags: TypeAttributes,
	explicit_layout: bool,
	zero_offset_field_count: usize,
	base_name: Option<&(String, String)>,
	attrs: Option<&Vec<CustomAttribute>>,
	field_tokens: &[MetadataToken],
	fields: &[FieldDef],
) -> TypeKind {
	if flags & type_attributes::INTERFACE != 0 {
		return TypeKind::Interface;
	}

	if let Some((_, name)) = base_name {
		match name.as_str() {
			"Enum" => return TypeKind::Enum,
			"MulticastDelegate" => return TypeKind::Delegate,
			"Object" => return TypeKind::Class,
			_ => {}
		}
	}

	let is_native_typedef = attrs.map(|a| a.iter().any(|a| a.kind == AttributeKind::NativeTypedef)).unwrap_or(false);

	if is_native_typedef && field_tokens.len() == 1 {
		if let Some(field) = field_tokens.first().and_then(|t| fields.iter().find(|f| f.token == *t)) {
			if matches!(field.ty, TypeSig::I4 | TypeSig::U4 | TypeSig::I8 | TypeSig::U8 | TypeSig::Ptr(_)) {
				return TypeKind::HandleTypedef;
			}
		}
	}

	if explicit_layout && zero_offset_field_count >= 2 {
		return TypeKind::Union;
	}

	TypeKind::Struct
}

#[cfg(test)]
mod closed_interfaces_tests {
	use super::*;

	fn token(i: u32) -> MetadataToken {
		MetadataToken::new(i, MetadataTokenKind::TypeDef)
	}

	#[test]
	fn single_level_base_is_returned_as_is() {
		// row 0 = IDerived, row 1 = IUnknown; IDerived directly implements IUnknown.
		let direct = vec![vec![token(2)], vec![]];
		let token_to_row: HashMap<_, _> = [(token(1), 0), (token(2), 1)].into_iter().collect();

		let mut seen = HashSet::new();
		seen.insert(0);
		assert_eq!(closed_interfaces(0, &direct, &token_to_row, &mut seen), vec![token(2)]);
	}

	#[test]
	fn grandparent_bases_are_included_ancestor_first() {
		// row 0 = IDerived -> row 1 = IBase -> row 2 = IUnknown.
		let direct = vec![vec![token(2)], vec![token(3)], vec![]];
		let token_to_row: HashMap<_, _> = [(token(1), 0), (token(2), 1), (token(3), 2)].into_iter().collect();

		let mut seen = HashSet::new();
		seen.insert(0);
		let result = closed_interfaces(0, &direct, &token_to_row, &mut seen);
		assert_eq!(result, vec![token(3), token(2)]);
	}

	#[test]
	fn external_base_with_no_row_stops_recursion_cleanly() {
		// The base interface lives outside this assembly (a `TypeRef`), so it
		// has no row of its own to recurse into — it still belongs in the list.
		let direct = vec![vec![token(99)]];
		let token_to_row: HashMap<_, _> = HashMap::new();

		let mut seen = HashSet::new();
		seen.insert(0);
		assert_eq!(closed_interfaces(0, &direct, &token_to_row, &mut seen), vec![token(99)]);
	}
}
