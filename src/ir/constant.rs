//! Structural representation of pool-decoded constants.

use crate::ir::{ConstantRc, DartType, Reference};

/// The closed set of constant shapes the constant pool encodes.
///
/// Aggregate constants hold [`ConstantRc`] handles to other pool entries; the
/// pool decode guarantees those entries were materialized first (dependencies
/// are encoded before their dependents), so the handles here are always live.
#[derive(Debug)]
pub enum Constant {
    /// The `null` constant
    Null,
    /// A boolean constant
    Bool {
        /// The constant value
        value: bool,
    },
    /// An integer constant
    Int {
        /// The constant value
        value: i64,
    },
    /// A double constant
    Double {
        /// The constant value
        value: f64,
    },
    /// A string constant
    String {
        /// The constant value
        value: String,
    },
    /// A symbol constant
    Symbol {
        /// The symbol text
        value: String,
    },
    /// A constant list
    List {
        /// Element type
        type_argument: DartType,
        /// Entries, each an earlier pool constant
        entries: Vec<ConstantRc>,
    },
    /// A constant map
    Map {
        /// Key type
        key_type: DartType,
        /// Value type
        value_type: DartType,
        /// Key/value pairs, each an earlier pool constant
        entries: Vec<(ConstantRc, ConstantRc)>,
    },
    /// A constant object instantiation
    Instance {
        /// The instantiated class
        class_reference: Reference,
        /// Type arguments of the instantiation
        type_arguments: Vec<DartType>,
        /// Field references paired with their constant values
        field_values: Vec<(Reference, ConstantRc)>,
    },
    /// A tear-off of a static procedure
    TearOff {
        /// The torn-off procedure
        procedure: Reference,
    },
    /// A type literal constant
    TypeLiteral {
        /// The reified type
        literal_type: DartType,
    },
}
