//! Argument list rendering.

use crate::c::types::argument_type_signature;
use crate::error::Result;
use capic_idl::Argument;

/// How arguments are passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgMode {
    /// `<type> <name>`
    ByVal,
    /// `<type> *<name>`
    ByRef,
}

/// Renders `args` as a parameter-list fragment.
///
/// Returns an empty string for no arguments, otherwise `", "` followed by the
/// comma-separated fragments, so the result can be appended directly after a
/// leading parameter. Declaration order is preserved.
///
/// # Errors
/// Returns `UnsupportedTypeKind` if any argument's type has no C mapping.
pub fn arg_list(args: &[Argument], mode: ArgMode) -> Result<String> {
    let mut output = String::new();
    for arg in args {
        output.push_str(", ");
        output.push_str(argument_type_signature(arg)?);
        if mode == ArgMode::ByRef {
            output.push('*');
        }
        output.push_str(&arg.name);
    }
    Ok(output)
}

/// Renders the argument names only, each prefixed with `", "` and `prefix`
/// (e.g. `"&"`) and suffixed with `suffix`.
#[must_use]
pub fn name_list(args: &[Argument], prefix: &str, suffix: &str) -> String {
    args.iter()
        .map(|a| format!(", {prefix}{}{suffix}", a.name))
        .collect()
}
