//! Delegate emission: a type alias to `Option<unsafe extern "system" fn(...) -> ...>`.

use crate::emit::EmitOutput;
use crate::project::{project, ProjectionContext, ProjectionSite};
use crate::read::MetadataIndex;
use crate::schema::TypeDef;

pub fn emit_delegate(index: &MetadataIndex, type_def: &TypeDef) -> EmitOutput {
	let Some(signature) = &type_def.delegate_signature else {
		return EmitOutput::new(format!("// delegate '{}' has no resolved Invoke signature\n", type_def.name));
	};

	let mut deps = Vec::new();
	let mut param_types = Vec::new();

	for param in &signature.params {
		let ctx = ProjectionContext::new(index, ProjectionSite::Param, &type_def.namespace, false);
		let (projected, param_deps) = project(param, &ctx);
		deps.extend(param_deps);
		param_types.push(projected.render(&type_def.namespace));
	}

	let ctx = ProjectionContext::new(index, ProjectionSite::Return, &type_def.namespace, false);
	let (ret_projected, ret_deps) = project(&signature.return_type, &ctx);
	deps.extend(ret_deps);
	let ret = ret_projected.render(&type_def.namespace);

	let source = if matches!(signature.return_type, crate::schema::TypeSig::Void) {
		format!("pub type {} = Option<unsafe extern \"system\" fn({})>;\n", type_def.name, param_types.join(", "))
	} else {
		format!(
			"pub type {} = Option<unsafe extern \"system\" fn({}) -> {}>;\n",
			type_def.name,
			param_types.join(", "),
			ret
		)
	};

	EmitOutput::new(source).with_dependencies(deps)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::raw::{MetadataToken, MetadataTokenKind};
	use crate::schema::{CallingConvention, Layout, MethodSignature, TypeKind, TypeSig};
	use std::collections::HashMap;

	#[test]
	fn delegate_emits_option_fn_pointer_alias() {
		let td = TypeDef {
			token: MetadataToken::new(1, MetadataTokenKind::TypeDef),
			namespace: "Windows.Win32.System.Threading".to_string(),
			name: "WAITORTIMERCALLBACK".to_string(),
			kind: TypeKind::Delegate,
			layout: Layout::Auto,
			base: None,
			fields: Vec::new(),
			methods: Vec::new(),
			interfaces: Vec::new(),
			nested_types: Vec::new(),
			enclosing_type: None,
			guid: None,
			delegate_signature: Some(MethodSignature {
				calling_convention: CallingConvention::StdCall,
				return_type: TypeSig::Void,
				params: vec![TypeSig::Ptr(Box::new(TypeSig::Void)), TypeSig::Bool],
			}),
		};

		let index = MetadataIndex::from_parts(vec![td.clone()], Vec::new(), Vec::new(), Vec::new(), HashMap::new());
		let out = emit_delegate(&index, &td);
		assert!(out.source.contains("pub type WAITORTIMERCALLBACK = Option<unsafe extern \"system\" fn(*mut"));
	}
}
