//! Interface model definitions.
//!
//! This module contains the immutable value records produced by a model
//! loader: interfaces, their methods, and the typed arguments of each method.
//! The code generator only ever borrows these.

use serde::{Deserialize, Serialize};

/// Complete interface model loaded from one IDL source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Package name (namespace), if declared.
    pub package: Option<String>,
    /// Interfaces in declaration order.
    pub interfaces: Vec<Interface>,
}

impl Model {
    /// Creates a new model from a list of interfaces.
    #[must_use]
    pub fn new(interfaces: Vec<Interface>) -> Self {
        Self {
            package: None,
            interfaces,
        }
    }

    /// Sets the package name.
    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Looks up an interface by name.
    #[must_use]
    pub fn get_interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|api| api.name == name)
    }
}

/// Named interface exposing an ordered set of methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    /// Interface name, used verbatim in generated identifiers.
    pub name: String,
    /// Methods in declaration order.
    pub methods: Vec<Method>,
}

impl Interface {
    /// Creates an interface without methods.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Adds a method to the interface.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// Looks up a method by name.
    #[must_use]
    pub fn get_method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Method of an interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    /// Method name. Empty means the name was never set.
    pub name: String,
    /// Input arguments in declaration order.
    pub in_args: Vec<Argument>,
    /// Output arguments in declaration order.
    pub out_args: Vec<Argument>,
    /// Method has no reply.
    pub fire_and_forget: bool,
}

impl Method {
    /// Creates a method without arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends an input argument.
    #[must_use]
    pub fn with_in(mut self, arg: Argument) -> Self {
        self.in_args.push(arg);
        self
    }

    /// Appends an output argument.
    #[must_use]
    pub fn with_out(mut self, arg: Argument) -> Self {
        self.out_args.push(arg);
        self
    }

    /// Marks the method as fire-and-forget.
    #[must_use]
    pub fn fire_and_forget(mut self) -> Self {
        self.fire_and_forget = true;
        self
    }

    /// Returns true if a reply (and reply callback) exists for this method.
    #[must_use]
    pub const fn has_reply(&self) -> bool {
        !self.fire_and_forget
    }
}

/// Typed, named method argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// Argument name, used verbatim as a C parameter name.
    pub name: String,
    /// Argument type.
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
}

impl Argument {
    /// Creates an argument of the given type.
    #[must_use]
    pub fn new(type_ref: impl Into<TypeRef>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
        }
    }
}

/// Reference to the type of an argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeRef {
    /// Built-in scalar type.
    Predefined(PredefinedType),
    /// User-defined type, referenced by name.
    Derived(String),
    /// Type reference that was never resolved.
    #[default]
    Unset,
}

impl TypeRef {
    /// Returns the predefined type, if this is one.
    #[must_use]
    pub const fn predefined(&self) -> Option<PredefinedType> {
        match self {
            Self::Predefined(p) => Some(*p),
            _ => None,
        }
    }
}

impl From<PredefinedType> for TypeRef {
    fn from(p: PredefinedType) -> Self {
        Self::Predefined(p)
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Predefined(p) => f.write_str(p.idl_name()),
            Self::Derived(name) => f.write_str(name),
            Self::Unset => f.write_str("<unset>"),
        }
    }
}

/// Predefined scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredefinedType {
    /// Boolean.
    Boolean,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 8-bit integer.
    Uint8,
    /// Unsigned 16-bit integer.
    Uint16,
    /// Unsigned 32-bit integer.
    Uint32,
    /// Unsigned 64-bit integer.
    Uint64,
    /// Single-precision floating point.
    Float,
    /// Double-precision floating point.
    Double,
}

impl PredefinedType {
    /// Every predefined type, in table order.
    pub const ALL: [Self; 11] = [
        Self::Boolean,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Float,
        Self::Double,
    ];

    /// Parses a Franca IDL type name (e.g. `UInt32`).
    #[must_use]
    pub fn from_idl_name(s: &str) -> Option<Self> {
        match s {
            "Boolean" => Some(Self::Boolean),
            "Int8" => Some(Self::Int8),
            "Int16" => Some(Self::Int16),
            "Int32" => Some(Self::Int32),
            "Int64" => Some(Self::Int64),
            "UInt8" => Some(Self::Uint8),
            "UInt16" => Some(Self::Uint16),
            "UInt32" => Some(Self::Uint32),
            "UInt64" => Some(Self::Uint64),
            "Float" => Some(Self::Float),
            "Double" => Some(Self::Double),
            _ => None,
        }
    }

    /// Returns the Franca IDL spelling.
    #[must_use]
    pub const fn idl_name(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Uint8 => "UInt8",
            Self::Uint16 => "UInt16",
            Self::Uint32 => "UInt32",
            Self::Uint64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
        }
    }
}
