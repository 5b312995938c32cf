//! C stub generation for the sd-bus backed capic runtime.

pub mod args;
pub mod client;
pub mod naming;
pub mod server;
pub mod types;

pub use client::ClientGenerator;
pub use server::ServerGenerator;

use crate::error::{GeneratorError, Result};
use capic_idl::{Interface, is_c_keyword, is_reserved_argument_name};

/// Rejects interfaces whose stubs would not be valid C.
///
/// # Errors
/// Returns `MissingName` for an unnamed interface or method,
/// `ReservedName` for a method or argument name the generated code cannot
/// carry and `FireAndForgetOutputs` for a fire-and-forget method with out
/// arguments.
pub fn check_interface(api: &Interface) -> Result<()> {
    if api.name.is_empty() {
        return Err(GeneratorError::MissingName {
            kind: "interface",
            context: "model".to_string(),
        });
    }
    for method in &api.methods {
        if method.name.is_empty() {
            return Err(GeneratorError::MissingName {
                kind: "method",
                context: api.name.clone(),
            });
        }
        if is_c_keyword(&method.name) {
            return Err(GeneratorError::ReservedName {
                kind: "method",
                name: method.name.clone(),
                context: api.name.clone(),
            });
        }
        if let Some(arg) = method
            .in_args
            .iter()
            .chain(&method.out_args)
            .find(|a| is_reserved_argument_name(&a.name))
        {
            return Err(GeneratorError::ReservedName {
                kind: "argument",
                name: arg.name.clone(),
                context: format!("{}.{}", api.name, method.name),
            });
        }
        if method.fire_and_forget && !method.out_args.is_empty() {
            return Err(GeneratorError::FireAndForgetOutputs {
                interface: api.name.clone(),
                method: method.name.clone(),
            });
        }
    }
    Ok(())
}

pub(crate) fn push_include_runtime(output: &mut String) {
    output.push_str("#include <assert.h>\n");
    output.push_str("#include <errno.h>\n");
    output.push_str("#include <stdlib.h>\n");
    output.push_str("#include <string.h>\n");
    output.push_str("#include <capic/backend.h>\n");
    output.push_str("#include <capic/dbus-private.h>\n");
    output.push_str("#include <capic/log.h>\n\n\n");
}

/// Asserts the instance and binds its runtime handle to `cc_i`.
pub(crate) fn push_instance_asserts(output: &mut String, var: &str) {
    output.push_str(&format!("\tassert({var});\n"));
    output.push_str(&format!("\tcc_i = {var}->instance;\n"));
    output.push_str("\tassert(cc_i);\n");
    output.push_str("\tassert(cc_i->backend);\n");
    output.push_str("\tassert(cc_i->backend->bus);\n");
}

/// Logs and jumps to `label` when the last sd-bus call failed.
pub(crate) fn push_result_check(output: &mut String, message: &str, label: &str) {
    output.push_str("\tif (cc_result < 0) {\n");
    output.push_str(&format!(
        "\t\tCC_LOG_ERROR(\"{message}: %s\\n\", strerror(-cc_result));\n"
    ));
    output.push_str(&format!("\t\tgoto {label};\n"));
    output.push_str("\t}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use capic_idl::{Argument, Method, PredefinedType};

    #[test]
    fn test_check_interface_accepts_valid() {
        let api = Interface::new("Ok")
            .with_method(Method::new("ping"))
            .with_method(Method::new("drop").fire_and_forget());
        assert!(check_interface(&api).is_ok());
    }

    #[test]
    fn test_check_interface_missing_names() {
        let err = check_interface(&Interface::new("")).expect_err("unnamed interface");
        assert!(matches!(err, GeneratorError::MissingName { kind: "interface", .. }));

        let api = Interface::new("Api").with_method(Method::new(""));
        let err = check_interface(&api).expect_err("unnamed method");
        assert!(matches!(err, GeneratorError::MissingName { kind: "method", .. }));
    }

    #[test]
    fn test_check_interface_fire_and_forget_outputs() {
        let api = Interface::new("Api").with_method(
            Method::new("drop")
                .fire_and_forget()
                .with_out(Argument::new(PredefinedType::Int32, "x")),
        );
        let err = check_interface(&api).expect_err("rejected");
        assert!(matches!(err, GeneratorError::FireAndForgetOutputs { .. }));
    }

    #[test]
    fn test_check_interface_reserved_names() {
        let api = Interface::new("Api").with_method(
            Method::new("m").with_in(Argument::new(PredefinedType::Int32, "callback")),
        );
        let err = check_interface(&api).expect_err("reserved argument");
        assert!(matches!(
            err,
            GeneratorError::ReservedName { kind: "argument", ref name, ref context }
                if name == "callback" && context == "Api.m"
        ));

        let api = Interface::new("Api").with_method(Method::new("switch"));
        let err = check_interface(&api).expect_err("keyword method");
        assert!(matches!(err, GeneratorError::ReservedName { kind: "method", .. }));

        let api = Interface::new("Api").with_method(
            Method::new("m")
                .with_in(Argument::new(PredefinedType::Int32, "message"))
                .with_out(Argument::new(PredefinedType::Int32, "result")),
        );
        assert!(check_interface(&api).is_ok());
    }

    #[test]
    fn test_result_check() {
        let mut output = String::new();
        push_result_check(&mut output, "unable to send", "fail");
        assert_eq!(
            output,
            "\tif (cc_result < 0) {\n\t\tCC_LOG_ERROR(\"unable to send: %s\\n\", strerror(-cc_result));\n\t\tgoto fail;\n\t}\n"
        );
    }
}
