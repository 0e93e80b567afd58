/// `PascalCase` → `snake_case`, for turning a metadata namespace segment into
/// a Rust module identifier (`FileSystem` → `file_system`).
pub(crate) fn to_snake_case(segment: &str) -> String {
	let mut out = String::with_capacity(segment.len() + 4);
	let mut prev_lower = false;
	for c in segment.chars() {
		if c.is_uppercase() {
			if prev_lower {
				out.push('_');
			}
			out.extend(c.to_lowercase());
			prev_lower = false;
		} else {
			out.push(c);
			prev_lower = c.is_alphanumeric();
		}
	}
	out
}

/// Turns a dotted metadata namespace (`Windows.Win32.Storage.FileSystem`) into
/// a `::`-joined Rust module path (`windows::win32::storage::file_system`).
pub(crate) fn namespace_to_module_path(namespace: &str) -> String {
	namespace.split('.').map(to_snake_case).collect::<Vec<_>>().join("::")
}

/// Rust 2021 reserved/keyword identifiers that need a `r#` escape when used
/// as a field or parameter name. Not exhaustive of every contextual keyword —
/// just the ones that show up as real Win32 field names (`type`, `box`, `ref`, ...).
pub(crate) const RUST_RESERVED_WORDS: &[&str] = &[
	"as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
	"let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super",
	"trait", "true", "type", "unsafe", "use", "where", "while", "async", "await", "dyn", "box", "final", "override",
	"try", "typeof", "unsized", "virtual", "yield",
];

pub(crate) fn escape_reserved(name: &str) -> String {
	if RUST_RESERVED_WORDS.contains(&name) {
		format!("r#{name}")
	} else {
		name.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn snake_case_conversion() {
		assert_eq!(to_snake_case("FileSystem"), "file_system");
		assert_eq!(to_snake_case("IO"), "io");
		assert_eq!(to_snake_case("Win32"), "win32");
	}

	#[test]
	fn namespace_path_conversion() {
		assert_eq!(namespace_to_module_path("Windows.Win32.Storage.FileSystem"), "windows::win32::storage::file_system");
	}

	#[test]
	fn reserved_words_get_escaped() {
		assert_eq!(escape_reserved("type"), "r#type");
		assert_eq!(escape_reserved("fIcon"), "fIcon");
	}
}
