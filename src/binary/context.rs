//! Per-sub-file decode context.
//!
//! Everything a sub-file's entity readers need that outlives a single call:
//! the backing buffer, the fully built tables, the shared canonical-name root,
//! and the parked ambient scope state. Lazy completions hold an
//! `Arc<SubFileContext>`, which is what lets them materialize bodies long
//! after the initial decode returned.

use std::sync::{Arc, Mutex};

use crate::{
    binary::{
        constants::ConstantPool, metadata::MetadataMapping, options::LoadOptions,
        scope::ScopeState, strings::StringTable,
    },
    file::Buffer,
    ir::{CanonicalNameRoot, NameId},
};

/// Immutable decode context of one sub-file, plus the parked scope state.
///
/// The scope stacks are exclusively owned by whichever decode call is live: a
/// call checks the state out of `parked`, owns it for its duration, and parks
/// it back on return. A lazy resume installs its captured snapshot instead and
/// restores the previously parked state afterward, which keeps resumption
/// re-entrant: a resume triggered while another decode is in progress higher
/// up the call stack cannot corrupt that decode's stacks.
pub(crate) struct SubFileContext {
    /// The buffer the whole input lives in.
    pub(crate) buffer: Arc<Buffer>,
    /// Absolute start of this sub-file within the buffer.
    pub(crate) start: usize,
    /// Absolute end of this sub-file within the buffer.
    pub(crate) end: usize,
    /// The sub-file's string table.
    pub(crate) strings: StringTable,
    /// URI of each source-table entry, index-parallel to the table.
    pub(crate) source_uris: Vec<Option<String>>,
    /// Local link-table index → shared arena handle.
    pub(crate) names: Vec<NameId>,
    /// The canonical-name root this sub-file links against.
    pub(crate) root: Arc<CanonicalNameRoot>,
    /// The sub-file's constant pool.
    pub(crate) constants: ConstantPool,
    /// Decode options of the load that produced this context.
    pub(crate) options: LoadOptions,
    /// Whether lazy member/body reading is permitted for this sub-file.
    pub(crate) lazy_enabled: bool,
    /// Decoded metadata mapping sections (empty without registered repositories).
    pub(crate) metadata_mappings: Vec<MetadataMapping>,
    /// Bounds of the metadata payload region, sub-file relative.
    pub(crate) metadata_payloads: (usize, usize),
    /// Ambient scope state between decode calls.
    pub(crate) parked: Mutex<ScopeState>,
}

impl SubFileContext {
    /// The byte range of this sub-file.
    pub(crate) fn data(&self) -> &[u8] {
        &self.buffer.data()[self.start..self.end]
    }
}
