//! Constant emission: literal values in Rust syntax, with special handling for
//! IEEE specials, GUIDs, handle-typed sentinels, and UTF-16 string constants.

use crate::accumulate::EmissionKey;
use crate::emit::EmitOutput;
use crate::project::{project, ProjectionContext, ProjectionSite};
use crate::read::MetadataIndex;
use crate::schema::{ConstantRef, ConstantValue};

pub fn emit_constant(index: &MetadataIndex, current_namespace: &str, constant: &ConstantRef) -> EmitOutput {
	let ctx = ProjectionContext::new(index, ProjectionSite::Field, current_namespace, false);
	let (projected_ty, mut deps) = project(&constant.ty, &ctx);
	let ty = projected_ty.render(current_namespace);

	if let ConstantValue::Str(s) = &constant.value {
		return EmitOutput::new(render_utf16_string_constant(&constant.name, s)).with_dependencies(deps);
	}

	let (literal, extra_deps) = render_value(&constant.value, &ty);
	deps.extend(extra_deps);

	let source = format!("pub const {}: {} = {};\n", constant.name, ty, literal);
	EmitOutput::new(source).with_dependencies(deps)
}

fn render_value(value: &ConstantValue, ty: &str) -> (String, Vec<EmissionKey>) {
	if value.is_ieee_special() {
		return (render_ieee_special(value, ty), Vec::new());
	}

	match value {
		ConstantValue::Bool(b) => (format!("{}({})", ty, *b as i32), Vec::new()),
		ConstantValue::I8(v) => (v.to_string(), Vec::new()),
		ConstantValue::U8(v) => (v.to_string(), Vec::new()),
		ConstantValue::I16(v) => (v.to_string(), Vec::new()),
		ConstantValue::U16(v) => (v.to_string(), Vec::new()),
		ConstantValue::I32(v) => (v.to_string(), Vec::new()),
		ConstantValue::U32(v) => (v.to_string(), Vec::new()),
		ConstantValue::I64(v) => (v.to_string(), Vec::new()),
		ConstantValue::U64(v) => (v.to_string(), Vec::new()),
		ConstantValue::F32(v) => (format!("{:?}f32", v), Vec::new()),
		ConstantValue::F64(v) => (format!("{:?}f64", v), Vec::new()),
		ConstantValue::Str(_) => unreachable!("string constants are emitted by `render_utf16_string_constant`, not `render_value`"),
		ConstantValue::Guid(guid) => (format!("GUID::from_u128(0x{:032x})", guid.as_u128()), vec![EmissionKey::WellKnown(crate::accumulate::WellKnownType::Guid)]),
		// Projected type for a handle sentinel is already the handle typedef's
		// name (`ty`); the typedef is a `#[repr(transparent)]` tuple struct, so
		// a tuple-constructor call reproduces the sentinel without a raw cast.
		ConstantValue::HandleSentinel { raw, .. } => (format!("{}({})", ty, raw), Vec::new()),
		ConstantValue::Null => ("std::ptr::null()".to_string(), Vec::new()),
	}
}

fn render_ieee_special(value: &ConstantValue, ty: &str) -> String {
	match value {
		ConstantValue::F32(v) if v.is_nan() => format!("{}::NAN", "f32"),
		ConstantValue::F32(v) if v.is_sign_negative() => format!("{}::NEG_INFINITY", "f32"),
		ConstantValue::F32(_) => "f32::INFINITY".to_string(),
		ConstantValue::F64(v) if v.is_nan() => "f64::NAN".to_string(),
		ConstantValue::F64(v) if v.is_sign_negative() => "f64::NEG_INFINITY".to_string(),
		ConstantValue::F64(_) => "f64::INFINITY".to_string(),
		_ => format!("{ty}::default()"),
	}
}

/// A `[u16; N]` array literal's `.as_ptr()` isn't const-promotable, so string
/// constants get a backing `static` plus a separate pointer `const` pointing
/// at it — the same two-step shape `windows-rs`'s `w!` macro expands to.
fn render_utf16_string_constant(name: &str, s: &str) -> String {
	let units: Vec<String> = s.encode_utf16().chain(std::iter::once(0)).map(|u| u.to_string()).collect();
	format!(
		"static {name}_DATA: [u16; {len}] = [{units}];\npub const {name}: *const u16 = {name}_DATA.as_ptr();\n",
		name = name,
		len = units.len(),
		units = units.join(", "),
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::raw::{MetadataToken, MetadataTokenKind};
	use crate::schema::TypeSig;
	use std::collections::HashMap;

	fn empty_index() -> MetadataIndex {
		MetadataIndex::from_parts(Vec::new(), Vec::new(), Vec::new(), Vec::new(), HashMap::new())
	}

	fn constant(name: &str, ty: TypeSig, value: ConstantValue) -> ConstantRef {
		ConstantRef {
			token: MetadataToken::new(1, MetadataTokenKind::Field),
			name: name.to_string(),
			owner: MetadataToken::null(),
			ty,
			value,
		}
	}

	#[test]
	fn ieee_specials_render_as_named_constants() {
		let index = empty_index();
		let nan = constant("NaN", TypeSig::R4, ConstantValue::F32(f32::NAN));
		assert!(emit_constant(&index, "", &nan).source.contains("f32::NAN"));

		let pos_inf = constant("POSITIVE_INFINITY", TypeSig::R4, ConstantValue::F32(f32::INFINITY));
		assert!(emit_constant(&index, "", &pos_inf).source.contains("f32::INFINITY"));

		let neg_inf = constant("NEGATIVE_INFINITY", TypeSig::R4, ConstantValue::F32(f32::NEG_INFINITY));
		assert!(emit_constant(&index, "", &neg_inf).source.contains("f32::NEG_INFINITY"));
	}

	#[test]
	fn ordinary_float_constants_render_as_literals_not_named_constants() {
		let index = empty_index();
		let value = constant("PI_ISH", TypeSig::R4, ConstantValue::F32(3.25));
		let out = emit_constant(&index, "", &value);
		assert!(out.source.contains("3.25f32"));
	}

	#[test]
	fn guid_constants_use_from_u128() {
		let index = empty_index();
		let guid = uuid::Uuid::from_u128(0x1234_5678_9abc_def0_1122_334455667788);
		let value = constant("IID_FOO", TypeSig::Guid, ConstantValue::Guid(guid));
		let out = emit_constant(&index, "", &value);
		assert!(out.source.contains("GUID::from_u128(0x"));
	}

	#[test]
	fn string_constants_emit_a_backing_static_and_pointer_const() {
		let index = empty_index();
		let value = constant("MF_DEVICESTREAM_ATTRIBUTE_FRAMESERVER_SHARED", TypeSig::String, ConstantValue::Str("shared".to_string()));
		let out = emit_constant(&index, "", &value);

		assert!(out.source.contains("static MF_DEVICESTREAM_ATTRIBUTE_FRAMESERVER_SHARED_DATA: [u16; 7] ="));
		assert!(out
			.source
			.contains("pub const MF_DEVICESTREAM_ATTRIBUTE_FRAMESERVER_SHARED: *const u16 = MF_DEVICESTREAM_ATTRIBUTE_FRAMESERVER_SHARED_DATA.as_ptr();"));
	}
}
