//! The in-memory node hierarchy a decoded component materializes into.
//!
//! The deserializer constructs instances of these types; it performs no
//! type-checking, constant evaluation, or semantic validation: the hierarchy
//! is purely structural, faithful to what was encoded.
//!
//! # Architecture
//!
//! Named declarations (libraries, classes, members, typedefs, extensions) are
//! shared mutable nodes behind `Arc<RwLock<_>>` handles (the `XxxRc` aliases
//! below), because the decoder may *overwrite* an existing node in place when
//! re-linking a component incrementally. Holders of old handles observe the
//! updated fields without re-resolving anything.
//!
//! Cross-declaration links never use direct pointers; they use
//! [`Reference`] handles resolved through the [`CanonicalNameRoot`] binding
//! table, so forward references to not-yet-decoded nodes are well-formed.
//! Intra-body back-edges (break → label, continue → switch case, type use →
//! type parameter) use `Weak` handles, since the target owns the referencing
//! node transitively.
//!
//! # Key Components
//!
//! - [`Component`] - the decoded program
//! - [`CanonicalNameRoot`], [`NameId`], [`Reference`], [`NodeBinding`] - identity
//! - [`Library`], [`Class`], [`Field`], [`Constructor`], [`Procedure`] - declarations
//! - [`Statement`], [`Expression`], [`DartType`], [`Constant`] - body structure

pub mod class;
pub mod component;
pub mod constant;
pub mod expression;
pub mod function;
pub mod library;
pub mod member;
pub mod names;
pub mod source;
pub mod statement;
pub mod types;

use std::sync::{Arc, RwLock, Weak};

pub use class::{Class, ClassFlags, Supertype};
pub use component::{CompilationMode, Component};
pub use constant::Constant;
pub use expression::{Arguments, Expression, LogicalOperator, Name};
pub use function::{
    AsyncMarker, FunctionNode, TypeParameter, TypeParameterFlags, VariableDeclaration,
    VariableFlags,
};
pub use library::{
    DependencyFlags, Extension, ExtensionMember, ExtensionMemberKind, Library,
    LibraryDependency, LibraryFlags, Typedef,
};
pub use member::{
    Constructor, ConstructorFlags, Field, FieldFlags, Initializer, Procedure, ProcedureFlags,
    ProcedureKind,
};
pub use names::{CanonicalNameRoot, NameId, NodeBinding, Reference};
pub use source::Source;
pub use statement::{Catch, LabeledStatement, Statement, SwitchCase};
pub use types::{DartType, NamedType, Nullability};

/// Shared handle to a [`Library`]
pub type LibraryRc = Arc<RwLock<Library>>;
/// Shared handle to a [`Class`]
pub type ClassRc = Arc<RwLock<Class>>;
/// Shared handle to a [`Typedef`]
pub type TypedefRc = Arc<RwLock<Typedef>>;
/// Shared handle to an [`Extension`]
pub type ExtensionRc = Arc<RwLock<Extension>>;
/// Shared handle to a [`Field`]
pub type FieldRc = Arc<RwLock<Field>>;
/// Shared handle to a [`Constructor`]
pub type ConstructorRc = Arc<RwLock<Constructor>>;
/// Shared handle to a [`Procedure`]
pub type ProcedureRc = Arc<RwLock<Procedure>>;
/// Shared handle to a [`VariableDeclaration`]
pub type VariableDeclarationRc = Arc<RwLock<VariableDeclaration>>;
/// Shared handle to a [`TypeParameter`]
pub type TypeParameterRc = Arc<RwLock<TypeParameter>>;
/// Shared handle to a [`LabeledStatement`]
pub type LabeledStatementRc = Arc<RwLock<LabeledStatement>>;
/// Shared handle to a [`SwitchCase`]
pub type SwitchCaseRc = Arc<RwLock<SwitchCase>>;
/// Back-edge handle to a [`LabeledStatement`]
pub type LabeledStatementWeak = Weak<RwLock<LabeledStatement>>;
/// Back-edge handle to a [`SwitchCase`]
pub type SwitchCaseWeak = Weak<RwLock<SwitchCase>>;
/// Back-edge handle to a [`TypeParameter`]
pub type TypeParameterWeak = Weak<RwLock<TypeParameter>>;
/// Shared handle to a pool [`Constant`]
pub type ConstantRc = Arc<Constant>;
