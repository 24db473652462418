//! Class- and library-level members: fields, constructors, procedures.

use bitflags::bitflags;
use strum::FromRepr;

use crate::ir::{
    Arguments, DartType, Expression, FunctionNode, Name, Reference, Statement,
    VariableDeclarationRc,
};

bitflags! {
    /// Flags of a [`Field`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldFlags: u8 {
        /// Declared `final`
        const FINAL = 0x01;
        /// Declared `const`
        const CONST = 0x02;
        /// Declared `static`
        const STATIC = 0x04;
        /// Declared covariant
        const COVARIANT = 0x08;
        /// Declared `late`
        const LATE = 0x10;
    }
}

bitflags! {
    /// Flags of a [`Constructor`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ConstructorFlags: u8 {
        /// Declared `const`
        const CONST = 0x01;
        /// Declared `external`
        const EXTERNAL = 0x02;
        /// Compiler-synthesized default constructor
        const SYNTHETIC = 0x04;
    }
}

bitflags! {
    /// Flags of a [`Procedure`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProcedureFlags: u8 {
        /// Declared `static`
        const STATIC = 0x01;
        /// Declared `abstract`
        const ABSTRACT = 0x02;
        /// Declared `external`
        const EXTERNAL = 0x04;
        /// Declared `const` (factories only)
        const CONST = 0x08;
    }
}

/// The kind of callable a [`Procedure`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum ProcedureKind {
    /// An ordinary method or top-level function
    Method = 0,
    /// A getter
    Getter = 1,
    /// A setter
    Setter = 2,
    /// An operator
    Operator = 3,
    /// A factory constructor
    Factory = 4,
}

/// A field declaration.
#[derive(Debug)]
pub struct Field {
    /// Stable identity handle of this field
    pub reference: Reference,
    /// Field name
    pub name: Name,
    /// URI of the defining source file
    pub file_uri: Option<String>,
    /// Source offset of the declaration
    pub file_offset: u32,
    /// Declaration flags
    pub flags: FieldFlags,
    /// Annotations on the declaration
    pub annotations: Vec<Expression>,
    /// Declared type
    pub declared_type: DartType,
    /// Optional initializer expression
    pub initializer: Option<Expression>,
}

/// A generative constructor declaration.
#[derive(Debug)]
pub struct Constructor {
    /// Stable identity handle of this constructor
    pub reference: Reference,
    /// Constructor name (empty for the unnamed constructor)
    pub name: Name,
    /// URI of the defining source file
    pub file_uri: Option<String>,
    /// Source offset of the declaration
    pub file_offset: u32,
    /// Declaration flags
    pub flags: ConstructorFlags,
    /// Annotations on the declaration
    pub annotations: Vec<Expression>,
    /// Signature and body
    pub function: FunctionNode,
    /// Initializer list, decoded with the constructor parameters in scope
    pub initializers: Vec<Initializer>,
}

/// A procedure (method/getter/setter/operator/factory) declaration.
#[derive(Debug)]
pub struct Procedure {
    /// Stable identity handle of this procedure
    pub reference: Reference,
    /// Procedure name
    pub name: Name,
    /// URI of the defining source file
    pub file_uri: Option<String>,
    /// Source offset of the declaration
    pub file_offset: u32,
    /// What kind of callable this is
    pub kind: ProcedureKind,
    /// Declaration flags
    pub flags: ProcedureFlags,
    /// Annotations on the declaration
    pub annotations: Vec<Expression>,
    /// Signature and body
    pub function: FunctionNode,
}

/// The closed set of constructor initializer shapes.
#[derive(Debug)]
pub enum Initializer {
    /// An initializer that failed to compile
    Invalid {
        /// `true` when compiler-synthesized
        is_synthetic: bool,
    },
    /// `field = value`
    Field {
        /// `true` when compiler-synthesized
        is_synthetic: bool,
        /// The initialized field
        field: Reference,
        /// The initializing value
        value: Box<Expression>,
    },
    /// `super(...)`
    Super {
        /// `true` when compiler-synthesized
        is_synthetic: bool,
        /// Source offset
        file_offset: u32,
        /// The invoked super constructor
        target: Reference,
        /// Argument list
        arguments: Arguments,
    },
    /// `this(...)`
    Redirecting {
        /// `true` when compiler-synthesized
        is_synthetic: bool,
        /// Source offset
        file_offset: u32,
        /// The redirected-to constructor
        target: Reference,
        /// Argument list
        arguments: Arguments,
    },
    /// A helper variable scoped to the initializer list
    Local {
        /// `true` when compiler-synthesized
        is_synthetic: bool,
        /// The declared variable
        variable: VariableDeclarationRc,
    },
    /// `assert(...)` in an initializer list
    Assert {
        /// `true` when compiler-synthesized
        is_synthetic: bool,
        /// The assert statement
        statement: Box<Statement>,
    },
}
