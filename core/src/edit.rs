//! Canned edits applied to the source buffer.

/// Buffer contents for a fresh session.
pub const DEFAULT_CODE: &str = "fn main() {\n    println!(\"Hello, world!\");\n}";

/// Appends the default `main` after the existing code.
#[must_use]
pub fn add_main_function(code: &str) -> String {
    format!("{code}\n\n{DEFAULT_CODE}")
}

#[must_use]
pub fn add_import(code: &str, import: &str) -> String {
    format!("{import}{code}")
}

/// Prepends `#![feature(<name>)]`.
#[must_use]
pub fn enable_feature_gate(code: &str, feature: &str) -> String {
    format!("#![feature({feature})]\n{code}")
}
