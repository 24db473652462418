//! Function nodes and the scope-stack participants they declare.

use bitflags::bitflags;
use strum::FromRepr;

use crate::{
    binary::lazy::LazyBody,
    ir::{DartType, Expression, Statement, TypeParameterRc, VariableDeclarationRc},
};

/// Async/generator marker of a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum AsyncMarker {
    /// A plain synchronous function
    Sync = 0,
    /// `sync*` generator
    SyncStar = 1,
    /// `async` function
    Async = 2,
    /// `async*` generator
    AsyncStar = 3,
}

bitflags! {
    /// Flags of a [`VariableDeclaration`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VariableFlags: u8 {
        /// Declared `final`
        const FINAL = 0x01;
        /// Declared `const`
        const CONST = 0x02;
        /// Declared `late`
        const LATE = 0x04;
        /// Marked covariant by declaration
        const COVARIANT = 0x08;
        /// Declared `required` (named parameters)
        const REQUIRED = 0x10;
        /// Compiler-synthesized, no source name
        const SYNTHESIZED = 0x20;
    }
}

bitflags! {
    /// Flags of a [`TypeParameter`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TypeParameterFlags: u8 {
        /// Produced by generic covariant lowering
        const GENERIC_COVARIANT_IMPL = 0x01;
    }
}

/// A local variable or parameter declaration.
///
/// Shared (`Arc`) between its declaration site and every read/write of it, so
/// references decoded later resolve to the identical node pushed on the scope
/// stack earlier.
#[derive(Debug)]
pub struct VariableDeclaration {
    /// Source offset of the declaration
    pub file_offset: u32,
    /// Declaration flags
    pub flags: VariableFlags,
    /// Variable name, `None` for synthesized temporaries
    pub name: Option<String>,
    /// Annotations on the declaration
    pub annotations: Vec<Expression>,
    /// Declared type
    pub declared_type: DartType,
    /// Optional initializer expression
    pub initializer: Option<Expression>,
}

/// A type parameter declaration of a class, function, or typedef.
///
/// Created with a placeholder bound before the bound is decoded: F-bounded
/// parameters (`T extends Comparable<T>`) reference the parameter from inside
/// its own bound.
#[derive(Debug)]
pub struct TypeParameter {
    /// Declaration flags
    pub flags: TypeParameterFlags,
    /// Annotations on the declaration
    pub annotations: Vec<Expression>,
    /// Parameter name
    pub name: Option<String>,
    /// Declared bound
    pub bound: DartType,
    /// Default type used for raw instantiations
    pub default_type: Option<DartType>,
}

/// Signature and body of a function-like member or function literal.
///
/// When the body was deferred by lazy reading, `body` is `None` and
/// `body_completion` holds the resumable unit that materializes it; forcing
/// the completion fills `body` and clears the completion.
#[derive(Debug)]
pub struct FunctionNode {
    /// Source offset of the signature
    pub file_offset: u32,
    /// Source offset one past the end of the function
    pub end_offset: u32,
    /// Async/generator marker
    pub async_marker: AsyncMarker,
    /// Type parameters declared by the function
    pub type_parameters: Vec<TypeParameterRc>,
    /// Number of required positional parameters
    pub required_parameter_count: u32,
    /// Positional parameter declarations
    pub positional_parameters: Vec<VariableDeclarationRc>,
    /// Named parameter declarations
    pub named_parameters: Vec<VariableDeclarationRc>,
    /// Declared return type
    pub return_type: DartType,
    /// The body, `None` for abstract/external members or while deferred
    pub body: Option<Statement>,
    /// Resumable unit that materializes a deferred body
    pub body_completion: Option<LazyBody>,
}
