//! Library declarations and the library-level members that live inline.

use bitflags::bitflags;
use strum::FromRepr;

use crate::ir::{
    ClassRc, DartType, Expression, ExtensionRc, FieldRc, ProcedureRc, Reference, TypedefRc,
    TypeParameterRc,
};

bitflags! {
    /// Flags of a [`Library`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LibraryFlags: u8 {
        /// Compiler-synthesized library
        const SYNTHETIC = 0x01;
        /// Marked unsupported by the embedder
        const UNSUPPORTED = 0x02;
    }
}

bitflags! {
    /// Flags of a [`LibraryDependency`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DependencyFlags: u8 {
        /// An `export` rather than an `import`
        const EXPORT = 0x01;
        /// A deferred import
        const DEFERRED = 0x02;
    }
}

/// An import or export clause of a library.
#[derive(Debug)]
pub struct LibraryDependency {
    /// Dependency flags
    pub flags: DependencyFlags,
    /// Annotations on the clause
    pub annotations: Vec<Expression>,
    /// The imported/exported library
    pub target: Reference,
    /// Import alias (`as name`), if any
    pub name: Option<String>,
}

/// A typedef declaration.
#[derive(Debug)]
pub struct Typedef {
    /// Stable identity handle of this typedef
    pub reference: Reference,
    /// Typedef name
    pub name: String,
    /// URI of the defining source file
    pub file_uri: Option<String>,
    /// Source offset of the declaration
    pub file_offset: u32,
    /// Annotations on the declaration
    pub annotations: Vec<Expression>,
    /// Type parameters declared by the typedef
    pub type_parameters: Vec<TypeParameterRc>,
    /// The aliased type
    pub aliased_type: DartType,
}

/// The kind of member an [`ExtensionMember`] descriptor exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum ExtensionMemberKind {
    /// An extension method
    Method = 0,
    /// An extension getter
    Getter = 1,
    /// An extension setter
    Setter = 2,
    /// An extension operator
    Operator = 3,
    /// An extension field (lowered to static storage)
    Field = 4,
}

/// Descriptor tying an extension member name to the lowered procedure that
/// implements it.
#[derive(Debug)]
pub struct ExtensionMember {
    /// Member name as written in source
    pub name: String,
    /// What kind of member this is
    pub kind: ExtensionMemberKind,
    /// `true` for static members
    pub is_static: bool,
    /// The lowered library-level member implementing this one
    pub member: Reference,
}

/// An extension declaration.
#[derive(Debug)]
pub struct Extension {
    /// Stable identity handle of this extension
    pub reference: Reference,
    /// Extension name
    pub name: String,
    /// URI of the defining source file
    pub file_uri: Option<String>,
    /// Source offset of the declaration
    pub file_offset: u32,
    /// Type parameters declared by the extension
    pub type_parameters: Vec<TypeParameterRc>,
    /// The type the extension applies to
    pub on_type: DartType,
    /// Member descriptors
    pub members: Vec<ExtensionMember>,
}

/// A library declaration.
#[derive(Debug)]
pub struct Library {
    /// Stable identity handle of this library
    pub reference: Reference,
    /// Library flags
    pub flags: LibraryFlags,
    /// Language version the library was compiled under
    pub language_version: (u32, u32),
    /// Library name from the `library` directive, if any
    pub name: Option<String>,
    /// URI of the defining source file
    pub file_uri: Option<String>,
    /// Annotations on the library directive
    pub annotations: Vec<Expression>,
    /// Import/export clauses
    pub dependencies: Vec<LibraryDependency>,
    /// Members re-exported beyond those of the dependencies
    pub additional_exports: Vec<Reference>,
    /// Typedef declarations
    pub typedefs: Vec<TypedefRc>,
    /// Class declarations
    pub classes: Vec<ClassRc>,
    /// Extension declarations
    pub extensions: Vec<ExtensionRc>,
    /// Library-level fields
    pub fields: Vec<FieldRc>,
    /// Library-level procedures
    pub procedures: Vec<ProcedureRc>,
}
