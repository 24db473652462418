//! # dillscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! and traits from the dillscope library. Import this module to get quick
//! access to the essential types for kernel component analysis.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dillscope operations
pub use crate::Error;

/// The result type used throughout dillscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// A decoded kernel program
pub use crate::ir::Component;

/// Configurable decode entry point
pub use crate::binary::loader::ComponentLoader;

/// Decode-time options
pub use crate::binary::options::LoadOptions;

/// Low-level input handling
pub use crate::{Buffer, Parser};

/// Format constants
pub use crate::binary::{BINARY_FORMAT_VERSION, COMPONENT_MAGIC, SDK_HASH_LENGTH};

// ================================================================================================
// Identity and Linking
// ================================================================================================

/// Canonical-name arena, handles, and the reference → node binding table
pub use crate::ir::{CanonicalNameRoot, NameId, NodeBinding, Reference};

// ================================================================================================
// Node Hierarchy
// ================================================================================================

/// Named declarations and their shared handles
pub use crate::ir::{
    Class, ClassRc, Constructor, ConstructorRc, Extension, ExtensionRc, Field, FieldRc, Library,
    LibraryRc, Procedure, ProcedureRc, Typedef, TypedefRc,
};

/// Body structure
pub use crate::ir::{
    Arguments, Constant, DartType, Expression, FunctionNode, Initializer, Statement,
    VariableDeclaration, VariableDeclarationRc,
};

/// Component-level data
pub use crate::ir::{CompilationMode, Source};

// ================================================================================================
// Lazy Materialization and Metadata
// ================================================================================================

/// Force helpers for deferred class members and function bodies
pub use crate::binary::lazy::{force_class_members, force_function_body};

/// Side-channel metadata consumers
pub use crate::binary::metadata::MetadataRepository;
