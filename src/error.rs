use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    ($offset:expr) => {
        crate::Error::OutOfBounds { offset: $offset }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all failure modes that can occur while decoding a kernel binary component:
/// corrupted structure, format/version mismatches, compilation-mode conflicts during merging,
/// and caller-usage errors such as handing concatenated bytes to a single-component entry point.
///
/// # Error Categories
///
/// ## Structural decode errors (fatal, abort the decode)
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the buffer
/// - [`Error::Malformed`] - Corrupted or self-inconsistent binary structure
/// - [`Error::Structural`] - Malformed node encoding, carrying the enclosing declaration path
/// - [`Error::UnexpectedTag`] - A tag byte outside the closed tag enumeration
/// - [`Error::MissingCanonicalName`] - A reference to a link-table entry that does not exist
/// - [`Error::ConstantOffsetUnresolved`] - A constant-pool back-reference to an absent entry
/// - [`Error::VariableIndexOutOfRange`] - A variable reference past the live scope stack
/// - [`Error::LabelIndexOutOfRange`] - A break target past the live label stack
/// - [`Error::SwitchCaseIndexOutOfRange`] - A continue target past the live switch-case stack
///
/// ## Format/version mismatches
/// - [`Error::BadMagic`] - The component magic number did not match ("not this kind of file")
/// - [`Error::UnsupportedVersion`] - The format version is not the supported one
/// - [`Error::UnknownSdkHash`] - The SDK signature is not in the accepted set ("wrong build")
///
/// ## Merge conflicts
/// - [`Error::MixedCompilationMode`] - Two sub-files carry incompatible compilation modes
///
/// ## Input-shape errors (caller usage)
/// - [`Error::Empty`] - An empty buffer was provided
/// - [`Error::SingleComponentExpected`] - Concatenated input where one sub-file was required
/// - [`Error::TrailingBytes`] - Bytes left over beyond the expected single sub-file
///
/// ## I/O
/// - [`Error::FileError`] - Filesystem errors while mapping a component file
///
/// # Examples
///
/// ```rust,no_run
/// use dillscope::{Component, Error};
/// use std::path::Path;
///
/// match Component::from_file(Path::new("app.dill")) {
///     Ok(component) => {
///         println!("Loaded {} libraries", component.libraries().len());
///     }
///     Err(Error::BadMagic { found }) => {
///         eprintln!("Not a kernel component (magic 0x{found:08x})");
///     }
///     Err(Error::UnsupportedVersion { found, expected }) => {
///         eprintln!("Kernel format v{found}, this build reads v{expected}");
///     }
///     Err(e) => {
///         eprintln!("Failed to load: {e}");
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An out of bound access was attempted while decoding the component.
    ///
    /// This error occurs when a read would cross the end of the buffer or of the
    /// current sub-file range. It is a safety check to prevent over-reads on
    /// truncated input.
    #[error("Out of bound read at offset {offset}!")]
    OutOfBounds {
        /// Byte offset at which the read was attempted
        offset: usize,
    },

    /// The component is damaged and could not be decoded.
    ///
    /// This error indicates that the binary structure is corrupted or doesn't
    /// conform to the expected kernel format. The error includes the source
    /// location where the malformation was detected for debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A node encoding was malformed, with decode context attached.
    ///
    /// Unlike [`Error::Malformed`], this variant is raised from inside the
    /// recursive-descent entity readers and carries the byte offset plus the
    /// dotted path of enclosing library/class/member names being decoded.
    #[error("Decode error at offset {offset} in `{context}`: {message}")]
    Structural {
        /// Description of the malformation
        message: String,
        /// Byte offset (within the sub-file) where decoding failed
        offset: usize,
        /// Path of enclosing declarations, e.g. `lib.Klass.method`
        context: String,
    },

    /// A tag byte outside the closed tag enumeration was encountered.
    #[error("Unexpected tag {tag} at offset {offset} in `{context}`")]
    UnexpectedTag {
        /// The offending tag byte
        tag: u8,
        /// Byte offset of the tag
        offset: usize,
        /// Path of enclosing declarations
        context: String,
    },

    /// The component magic number did not match.
    #[error("Invalid component magic: 0x{found:08x}")]
    BadMagic {
        /// The magic value actually present in the buffer
        found: u32,
    },

    /// The component was produced by a different format version than the one
    /// this decoder supports.
    #[error("Unsupported binary format version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version recorded in the component header
        found: u32,
        /// The single version this decoder reads
        expected: u32,
    },

    /// The SDK signature in the component header is not in the accepted set.
    ///
    /// Distinct from [`Error::UnsupportedVersion`] so callers can tell
    /// "right kind of file, wrong SDK build" apart from a format mismatch.
    #[error("Unrecognized SDK signature `{found}`")]
    UnknownSdkHash {
        /// The signature found in the header
        found: String,
    },

    /// Two merged sub-files carry incompatible compilation modes.
    #[error("Mixed compilation modes: {a:?} and {b:?}")]
    MixedCompilationMode {
        /// Accumulated mode of the sub-files merged so far
        a: crate::ir::CompilationMode,
        /// Mode of the incoming sub-file
        b: crate::ir::CompilationMode,
    },

    /// A biased canonical-name index referenced a link-table entry that was
    /// never decoded.
    #[error("Canonical name index {index} is not present in the link table")]
    MissingCanonicalName {
        /// The (unbiased) link-table index
        index: u32,
    },

    /// A constant referenced another pool entry by offset before that entry
    /// was decoded. The format guarantees producer-before-consumer ordering,
    /// so this indicates producer-side corruption.
    #[error("Constant pool back-reference to unresolved offset {offset}")]
    ConstantOffsetUnresolved {
        /// Pool-relative byte offset of the missing entry
        offset: u32,
    },

    /// A variable reference pointed past the live variable scope stack.
    #[error("Variable reference {index} exceeds scope depth {depth}")]
    VariableIndexOutOfRange {
        /// The encoded stack index
        index: usize,
        /// Number of variables currently in scope
        depth: usize,
    },

    /// A break target pointed past the live label stack.
    #[error("Label reference {index} exceeds label depth {depth}")]
    LabelIndexOutOfRange {
        /// The encoded stack index (from the current base)
        index: usize,
        /// Number of labels currently in scope above the base
        depth: usize,
    },

    /// A continue-switch target pointed past the live switch-case stack.
    #[error("Switch case reference {index} exceeds case depth {depth}")]
    SwitchCaseIndexOutOfRange {
        /// The encoded stack index (from the current base)
        index: usize,
        /// Number of switch cases currently in scope above the base
        depth: usize,
    },

    /// An empty buffer was provided where a component was expected.
    #[error("Empty input provided!")]
    Empty,

    /// Concatenated component bytes were supplied to an entry point that
    /// requires exactly one sub-file.
    #[error("Expected a single component, found {found} concatenated sub-files")]
    SingleComponentExpected {
        /// How many sub-files the buffer actually contains
        found: usize,
    },

    /// Bytes were left over beyond the expected single sub-file.
    #[error("{count} bytes do not belong to the expected single component")]
    TrailingBytes {
        /// Number of unrecognized bytes
        count: usize,
    },

    /// An error occured while accessing the file system.
    #[error("File operation failed!")]
    FileError(#[from] std::io::Error),
}
