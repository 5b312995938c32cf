//! C type mapping.

use crate::error::{GeneratorError, Result};
use capic_idl::{Argument, PredefinedType, TypeRef};

/// Returns the C spelling of a type followed by one space, ready to be
/// concatenated with an identifier.
///
/// # Errors
/// Returns `UnsupportedTypeKind` for user-defined or unset types.
pub fn type_signature(type_ref: &TypeRef) -> Result<&'static str> {
    match type_ref {
        TypeRef::Predefined(p) => Ok(c_type_signature(*p)),
        other => Err(GeneratorError::UnsupportedTypeKind {
            type_name: other.to_string(),
            argument: String::new(),
        }),
    }
}

/// Like [`type_signature`], naming the argument in the error.
///
/// # Errors
/// Returns `UnsupportedTypeKind` for user-defined or unset types.
pub fn argument_type_signature(arg: &Argument) -> Result<&'static str> {
    type_signature(&arg.type_ref).map_err(|e| match e {
        GeneratorError::UnsupportedTypeKind { type_name, .. } => {
            GeneratorError::UnsupportedTypeKind {
                type_name,
                argument: arg.name.clone(),
            }
        }
        other => other,
    })
}

const fn c_type_signature(p: PredefinedType) -> &'static str {
    match p {
        PredefinedType::Boolean => "bool ",
        PredefinedType::Int8 => "int8_t ",
        PredefinedType::Int16 => "int16_t ",
        PredefinedType::Int32 => "int32_t ",
        PredefinedType::Int64 => "int64_t ",
        PredefinedType::Uint8 => "uint8_t ",
        PredefinedType::Uint16 => "uint16_t ",
        PredefinedType::Uint32 => "uint32_t ",
        PredefinedType::Uint64 => "uint64_t ",
        PredefinedType::Float => "float ",
        PredefinedType::Double => "double ",
    }
}

/// D-Bus marshalling of a predefined type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireType {
    /// D-Bus signature code.
    pub signature: char,
    /// C type that `sd_bus_message_read` stores into, with trailing space.
    pub c_type: &'static str,
}

/// Returns the D-Bus marshalling of an argument's type.
///
/// D-Bus has no 8-bit signed integer or single-precision float, so `int8`
/// travels as `int16` and `float` as `double`. Booleans are read as `int`.
///
/// # Errors
/// Returns `UnsupportedTypeKind` for user-defined or unset types.
pub fn wire_type(arg: &Argument) -> Result<WireType> {
    argument_type_signature(arg)?;
    let (signature, c_type) = match arg.type_ref.predefined() {
        Some(PredefinedType::Boolean) => ('b', "int "),
        Some(PredefinedType::Int8 | PredefinedType::Int16) => ('n', "int16_t "),
        Some(PredefinedType::Int32) => ('i', "int32_t "),
        Some(PredefinedType::Int64) => ('x', "int64_t "),
        Some(PredefinedType::Uint8) => ('y', "uint8_t "),
        Some(PredefinedType::Uint16) => ('q', "uint16_t "),
        Some(PredefinedType::Uint32) => ('u', "uint32_t "),
        Some(PredefinedType::Uint64) => ('t', "uint64_t "),
        Some(PredefinedType::Float | PredefinedType::Double) | None => ('d', "double "),
    };
    Ok(WireType { signature, c_type })
}

/// Concatenates the D-Bus signature codes of `args` in declaration order.
///
/// # Errors
/// Returns `UnsupportedTypeKind` for the first unsupported argument.
pub fn dbus_signature(args: &[Argument]) -> Result<String> {
    args.iter()
        .map(|a| wire_type(a).map(|w| w.signature))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_type_signature() {
        let expected = [
            (PredefinedType::Boolean, "bool "),
            (PredefinedType::Int8, "int8_t "),
            (PredefinedType::Int16, "int16_t "),
            (PredefinedType::Int32, "int32_t "),
            (PredefinedType::Int64, "int64_t "),
            (PredefinedType::Uint8, "uint8_t "),
            (PredefinedType::Uint16, "uint16_t "),
            (PredefinedType::Uint32, "uint32_t "),
            (PredefinedType::Uint64, "uint64_t "),
            (PredefinedType::Float, "float "),
            (PredefinedType::Double, "double "),
        ];
        for (p, c) in expected {
            assert_eq!(type_signature(&TypeRef::Predefined(p)).expect("mapped"), c);
        }
    }

    #[test]
    fn test_unsupported_type_kind() {
        let err = type_signature(&TypeRef::Unset).expect_err("unset must fail");
        assert!(matches!(err, GeneratorError::UnsupportedTypeKind { .. }));

        let arg = Argument::new(TypeRef::Derived("Color".into()), "color");
        let err = argument_type_signature(&arg).expect_err("derived must fail");
        assert_eq!(
            err.to_string(),
            "unsupported type kind 'Color' for argument 'color'"
        );
    }

    #[test]
    fn test_wire_types() {
        let b = Argument::new(PredefinedType::Boolean, "b");
        assert_eq!(
            wire_type(&b).expect("mapped"),
            WireType {
                signature: 'b',
                c_type: "int "
            }
        );
        let f = Argument::new(PredefinedType::Float, "f");
        assert_eq!(wire_type(&f).expect("mapped").c_type, "double ");
        assert!(wire_type(&Argument::new(TypeRef::Unset, "x")).is_err());
    }

    #[test]
    fn test_dbus_signature_preserves_order() {
        let args = [
            Argument::new(PredefinedType::Double, "value"),
            Argument::new(PredefinedType::Int32, "whole"),
            Argument::new(PredefinedType::Uint64, "big"),
            Argument::new(PredefinedType::Int8, "small"),
        ];
        assert_eq!(dbus_signature(&args).expect("mapped"), "ditn");
        assert_eq!(dbus_signature(&[]).expect("mapped"), "");
    }
}
