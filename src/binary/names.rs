//! Canonical-name link table decoding.
//!
//! The link table is a flat encoded list; entry *i* stores a biased parent
//! index (`0` meaning the root, otherwise index+1 of an **earlier** entry) and
//! a string-table index for the local name. Entries are processed in stored
//! order (later entries may reference earlier ones as parent, never the
//! reverse) and each resolves through the shared [`CanonicalNameRoot`] with a
//! lookup-or-create, so the same dotted path anywhere yields the same node.
//!
//! The table must be fully built before any node bodies are decoded: node
//! references resolve by table lookup, not by forward patching.

use crate::{
    binary::strings::StringTable,
    file::parser::Parser,
    ir::{CanonicalNameRoot, NameId, Reference},
    Error, Result,
};

/// Decode the link table at `offset`, returning the local-index → arena-handle map.
///
/// # Errors
/// Returns [`crate::Error::MissingCanonicalName`] if an entry references a
/// parent at or after its own position, or a decode error on truncation.
pub(crate) fn read_link_table(
    data: &[u8],
    offset: usize,
    strings: &StringTable,
    root: &CanonicalNameRoot,
) -> Result<Vec<NameId>> {
    let mut parser = Parser::new(data);
    parser.seek(offset)?;

    let count = parser.read_uint30()? as usize;
    let mut table: Vec<NameId> = Vec::with_capacity(count);
    for _ in 0..count {
        let biased_parent = parser.read_uint30()?;
        let parent = if biased_parent == 0 {
            NameId::ROOT
        } else {
            let index = biased_parent - 1;
            match table.get(index as usize) {
                Some(id) => *id,
                None => return Err(Error::MissingCanonicalName { index }),
            }
        };

        let name_index = parser.read_uint30()? as usize;
        let name = strings.get(name_index)?;
        table.push(root.child(parent, name));
    }

    Ok(table)
}

/// Resolve a biased reference field against the local link table.
///
/// `0` is the null reference; any other value is the link-table index plus one.
///
/// # Errors
/// Returns [`crate::Error::MissingCanonicalName`] if the index is out of range.
pub(crate) fn lookup_reference(table: &[NameId], biased: u32) -> Result<Option<Reference>> {
    if biased == 0 {
        return Ok(None);
    }

    let index = biased - 1;
    match table.get(index as usize) {
        Some(id) => Ok(Some(Reference::new(*id))),
        None => Err(Error::MissingCanonicalName { index }),
    }
}
