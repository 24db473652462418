//! Class declarations.

use bitflags::bitflags;

use crate::{
    binary::lazy::LazyMembers,
    ir::{ConstructorRc, DartType, Expression, FieldRc, ProcedureRc, Reference, TypeParameterRc},
};

bitflags! {
    /// Flags of a [`Class`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClassFlags: u8 {
        /// Declared `abstract`
        const ABSTRACT = 0x01;
        /// An enum class
        const ENUM = 0x02;
        /// A compiler-generated anonymous mixin application
        const ANONYMOUS_MIXIN = 0x04;
        /// An eliminated mixin application
        const ELIMINATED_MIXIN = 0x08;
        /// Declared as a mixin
        const MIXIN_DECLARATION = 0x10;
    }
}

/// An instantiation of a class used in an extends/with/implements clause.
#[derive(Debug)]
pub struct Supertype {
    /// The instantiated class
    pub class_reference: Reference,
    /// Type arguments of the instantiation
    pub type_arguments: Vec<DartType>,
}

/// A class declaration.
///
/// When the class was read lazily, only the identity fields (reference, name,
/// source location, flags) are populated and `members_completion` holds the
/// resumable unit that materializes everything else.
#[derive(Debug)]
pub struct Class {
    /// Stable identity handle of this class
    pub reference: Reference,
    /// Class name
    pub name: String,
    /// URI of the defining source file
    pub file_uri: Option<String>,
    /// Source offset of the declaration
    pub file_offset: u32,
    /// Source offset one past the end of the declaration
    pub end_offset: u32,
    /// Declaration flags
    pub flags: ClassFlags,
    /// Annotations on the declaration
    pub annotations: Vec<Expression>,
    /// Type parameters declared by the class
    pub type_parameters: Vec<TypeParameterRc>,
    /// The extended class, absent only for the root object class
    pub supertype: Option<Supertype>,
    /// The mixed-in type for `class C = S with M` applications
    pub mixed_in_type: Option<Supertype>,
    /// The implemented interfaces
    pub implemented_types: Vec<Supertype>,
    /// Field members
    pub fields: Vec<FieldRc>,
    /// Constructor members
    pub constructors: Vec<ConstructorRc>,
    /// Procedure members
    pub procedures: Vec<ProcedureRc>,
    /// Resumable unit that materializes deferred members
    pub members_completion: Option<LazyMembers>,
}
