//! Structural representation of kernel types.

use strum::FromRepr;

use crate::ir::{Reference, TypeParameterRc, TypeParameterWeak};

/// Nullability suffix carried by most type encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum Nullability {
    /// `T?`
    Nullable = 0,
    /// `T`
    NonNullable = 1,
    /// `T*` (legacy, pre null-safety)
    Legacy = 2,
}

/// A named entry of a function type's parameter list.
#[derive(Debug, Clone)]
pub struct NamedType {
    /// Parameter name
    pub name: String,
    /// Declared type of the parameter
    pub declared_type: DartType,
}

/// The closed set of type shapes the binary format encodes.
///
/// Unknown tags are a fatal decode error, never a default variant; the tag
/// space is closed by construction.
#[derive(Debug, Clone)]
pub enum DartType {
    /// A type that failed to resolve at compile time
    Invalid,
    /// `dynamic`
    Dynamic,
    /// `void`
    Void,
    /// `Never`
    Never {
        /// Nullability of the type
        nullability: Nullability,
    },
    /// `Null`
    Null,
    /// A class instantiation, e.g. `List<int>`
    Interface {
        /// Nullability of the type
        nullability: Nullability,
        /// Reference to the instantiated class
        class_reference: Reference,
        /// Type arguments, empty for non-generic classes
        type_arguments: Vec<DartType>,
    },
    /// A function type, e.g. `int Function(String)`
    Function {
        /// Nullability of the type
        nullability: Nullability,
        /// Type parameters declared by the function type itself
        type_parameters: Vec<TypeParameterRc>,
        /// Number of required positional parameters
        required_parameter_count: u32,
        /// Positional parameter types
        positional: Vec<DartType>,
        /// Named parameters, sorted by name in the encoding
        named: Vec<NamedType>,
        /// Return type
        return_type: Box<DartType>,
    },
    /// A use of a type parameter currently in scope
    TypeParameter {
        /// Nullability of the type
        nullability: Nullability,
        /// The declaration this use resolves to (weak: declarations own
        /// their uses transitively through bounds)
        parameter: TypeParameterWeak,
    },
}
