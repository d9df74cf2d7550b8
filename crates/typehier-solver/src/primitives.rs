//! Fixed primitive widening lattice.
//!
//! Primitives never come from the provider. Their nodes and edges are
//! installed once when a graph is created and are already complete.

/// Every primitive type name, `void` included.
pub const PRIMITIVE_TYPES: [&str; 8] = [
    "void", "boolean", "char", "short", "int", "long", "float", "double",
];

/// Direct widening edges as `(subtype, supertype)`.
///
/// `boolean` and `void` have no edges. `double` widens to nothing, so
/// `double` is not usable where `float` is expected.
pub const WIDENING_EDGES: [(&str, &str); 8] = [
    ("char", "short"),
    ("char", "int"),
    ("char", "long"),
    ("short", "int"),
    ("short", "long"),
    ("int", "long"),
    ("float", "double"),
    ("long", "float"),
];

/// Returns `true` for the eight built-in primitive names.
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&name)
}
