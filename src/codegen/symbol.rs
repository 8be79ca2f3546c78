use std::collections::HashMap;

use crate::ir::Value;

/// Reserved symbol-table key of the per-function return-value slot.
pub const RETVAL: &str = "__retval__";

/// Reserved symbol-table key of the per-function return block.
pub const RETVAL_BLOCK: &str = "__retval__BB";

/// Symbol table mapping mangled names to IR handles.
///
/// Functions are registered under their bare name; everything local to a
/// function lives under its mangled name.
pub type SymbolTable = HashMap<String, Value>;

/// Key of a local identifier: `<function>_<identifier>` gives per-function
/// scoping without a stack of tables.
pub fn mangle(function: &str, ident: &str) -> String {
    format!("{function}_{ident}")
}
