use crate::raw::MetadataToken;

/// What kind of declared type a `TypeDef` row represents. Determined from the
/// type's base type and flags during reading, not stored verbatim in metadata.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TypeKind {
	Struct,
	Union,
	Enum,
	Delegate,
	Interface,
	Class,
	/// A single-field struct wrapping an integer, representing an OS resource token.
	HandleTypedef,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Layout {
	Auto,
	Sequential { pack: u16, size: u32 },
	Explicit { pack: u16, size: u32 },
}

/// A named declared type. Resolved lazily from the `TypeDef` table by
/// [`crate::read::MetadataIndex`]; never mutated once returned.
#[derive(Debug, Clone)]
pub struct TypeDef {
	pub token: MetadataToken,
	pub namespace: String,
	pub name: String,
	pub kind: TypeKind,
	pub layout: Layout,
	pub base: Option<MetadataToken>,
	pub fields: Vec<MetadataToken>,
	pub methods: Vec<MetadataToken>,
	/// Base interfaces in declaration order (`InterfaceImpl` rows), recursively
	/// including grandparents' slots for COM vtable emission.
	pub interfaces: Vec<MetadataToken>,
	pub nested_types: Vec<MetadataToken>,
	pub enclosing_type: Option<MetadataToken>,
	pub guid: Option<uuid::Uuid>,
	/// Set for delegate types: the single `Invoke` method's signature, already
	/// unwrapped from the method table so callers don't need to re-resolve it.
	pub delegate_signature: Option<crate::schema::MethodSignature>,
}

impl TypeDef {
	pub fn full_name(&self) -> String {
		if self.namespace.is_empty() {
			self.name.clone()
		} else {
			format!("{}.{}", self.namespace, self.name)
		}
	}

	pub fn is_handle_typedef(&self) -> bool {
		self.kind == TypeKind::HandleTypedef
	}
}
