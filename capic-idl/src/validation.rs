//! Model validation utilities.
//!
//! This module checks a parsed model for semantic problems that the grammar
//! cannot rule out. Findings are reported as diagnostics, not errors, so a
//! loader can collect all of them at once.

use crate::error::Diagnostic;
use crate::model::{Argument, Model};
use crate::parser::{ArgDirection, SourceMap};
use std::collections::HashSet;

/// Prefix of every local and temporary in generated C code.
pub const GENERATED_PREFIX: &str = "cc_";

/// Parameter names every generated signature already declares.
const SIGNATURE_PARAMS: &[&str] = &["instance", "callback"];

/// C11 keywords plus the `stdbool.h` macros.
const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Alignas", "_Alignof", "_Atomic", "_Bool",
    "_Complex", "_Generic", "_Imaginary", "_Noreturn", "_Static_assert", "_Thread_local", "bool",
    "true", "false",
];

/// Returns true if `name` cannot be used as a C identifier.
#[must_use]
pub fn is_c_keyword(name: &str) -> bool {
    C_KEYWORDS.contains(&name)
}

/// Returns true if an argument called `name` would clash with a generated
/// parameter, local or keyword.
#[must_use]
pub fn is_reserved_argument_name(name: &str) -> bool {
    is_c_keyword(name) || SIGNATURE_PARAMS.contains(&name) || name.starts_with(GENERATED_PREFIX)
}

/// Validates a model for semantic consistency.
///
/// # Arguments
/// * `model` - The model to validate
/// * `lines` - Source lines of the model elements
///
/// # Returns
/// All findings in source order; empty if the model is valid.
#[must_use]
pub fn validate_model(model: &Model, lines: &SourceMap) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut seen_interfaces = HashSet::new();

    for (i, api) in model.interfaces.iter().enumerate() {
        if !seen_interfaces.insert(api.name.as_str()) {
            diagnostics.push(Diagnostic::new(
                lines.interface_line(i),
                format!("Duplicate interface name '{}'", api.name),
            ));
        }

        let mut seen_methods = HashSet::new();
        for (m, method) in api.methods.iter().enumerate() {
            let line = lines.method_line(i, m);

            if !seen_methods.insert(method.name.as_str()) {
                diagnostics.push(Diagnostic::new(
                    line,
                    format!(
                        "Duplicate method name '{}' in interface '{}'",
                        method.name, api.name
                    ),
                ));
            }

            if is_c_keyword(&method.name) {
                diagnostics.push(Diagnostic::new(
                    line,
                    format!("Method name '{}' is a C keyword", method.name),
                ));
            }

            if method.fire_and_forget && !method.out_args.is_empty() {
                diagnostics.push(Diagnostic::new(
                    line,
                    format!(
                        "Fire-and-forget method '{}' must not declare out arguments",
                        method.name
                    ),
                ));
            }

            validate_arguments(
                &method.in_args,
                &method.out_args,
                |dir, k| lines.arg_line(i, m, dir, k),
                &mut diagnostics,
            );
        }
    }

    diagnostics
}

/// Validates argument names within one method; in and out share a scope
/// because both end up in the same C parameter list.
fn validate_arguments(
    in_args: &[Argument],
    out_args: &[Argument],
    line_of: impl Fn(ArgDirection, usize) -> usize,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut seen = HashSet::new();
    let tagged = in_args
        .iter()
        .enumerate()
        .map(|(k, a)| (ArgDirection::In, k, a))
        .chain(
            out_args
                .iter()
                .enumerate()
                .map(|(k, a)| (ArgDirection::Out, k, a)),
        );

    for (dir, k, arg) in tagged {
        if !seen.insert(arg.name.as_str()) {
            diagnostics.push(Diagnostic::new(
                line_of(dir, k),
                format!("Duplicate argument name '{}'", arg.name),
            ));
        }
        if is_reserved_argument_name(&arg.name) {
            diagnostics.push(Diagnostic::new(
                line_of(dir, k),
                format!("Argument name '{}' is reserved in generated C code", arg.name),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_fidl;

    fn diagnostics_for(source: &str) -> Vec<Diagnostic> {
        let (model, lines) = parse_fidl(source).expect("Failed to parse");
        validate_model(&model, &lines)
    }

    #[test]
    fn test_validate_valid_model() {
        let source = r#"
interface Calculator {
    method split {
        in { Double value }
        out { Int32 whole Int32 fraction }
    }
    method reset fireAndForget {
        in { Boolean hard }
    }
}
"#;
        assert!(diagnostics_for(source).is_empty());
    }

    #[test]
    fn test_validate_duplicate_interface() {
        let source = "interface A {}\ninterface A {}\n";
        let diagnostics = diagnostics_for(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 2);
        assert!(diagnostics[0].message.contains("Duplicate interface"));
    }

    #[test]
    fn test_validate_duplicate_method_and_argument() {
        let source = r#"interface A {
    method m { in { Int32 x } }
    method m {
        in { Int32 x }
        out { Int32 x }
    }
}"#;
        let diagnostics = diagnostics_for(source);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].line, 3);
        assert!(diagnostics[0].message.contains("Duplicate method"));
        assert_eq!(diagnostics[1].line, 5);
        assert!(diagnostics[1].message.contains("Duplicate argument name 'x'"));
    }

    #[test]
    fn test_validate_fire_and_forget_with_outputs() {
        let source = r#"interface A {
    method m fireAndForget {
        out { Int32 x }
    }
}"#;
        let diagnostics = diagnostics_for(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 2);
        assert!(diagnostics[0].message.contains("Fire-and-forget"));
    }

    #[test]
    fn test_validate_reserved_names() {
        let source = r#"interface A {
    method m {
        in { Int32 instance }
        out { Int32 cc_result }
    }
    method n {
        in { Int32 callback Boolean int }
    }
    method while {
    }
}"#;
        let diagnostics = diagnostics_for(source);
        let found: Vec<(usize, &str)> = diagnostics
            .iter()
            .map(|d| (d.line, d.message.as_str()))
            .collect();
        assert_eq!(
            found,
            [
                (3, "Argument name 'instance' is reserved in generated C code"),
                (4, "Argument name 'cc_result' is reserved in generated C code"),
                (7, "Argument name 'callback' is reserved in generated C code"),
                (7, "Argument name 'int' is reserved in generated C code"),
                (9, "Method name 'while' is a C keyword"),
            ]
        );
    }

    #[test]
    fn test_generated_local_names_are_allowed() {
        let source = r#"interface Calc {
    method compute {
        in { Int32 message }
        out { Int32 result Int32 reply Int32 error Int32 i Int32 ii Int32 bus }
    }
}"#;
        assert!(diagnostics_for(source).is_empty());
        assert!(!is_reserved_argument_name("cc"));
        assert!(is_reserved_argument_name("cc_x"));
        assert!(is_c_keyword("_Bool"));
        assert!(!is_c_keyword("Int32"));
    }

    #[test]
    fn test_validate_programmatic_model_without_lines() {
        use crate::model::{Interface, Method};
        let model = Model::new(vec![Interface::new("A"), Interface::new("A")]);
        let diagnostics = validate_model(&model, &SourceMap::default());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 0);

        let model = Model::new(vec![
            Interface::new("B")
                .with_method(Method::new("m"))
                .with_method(Method::new("n")),
        ]);
        assert!(validate_model(&model, &SourceMap::default()).is_empty());
    }
}
