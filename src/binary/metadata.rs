//! Metadata association overlay.
//!
//! Components can carry side-channel metadata: an opaque payload region plus,
//! per metadata kind, a mapping from node offsets to payload offsets. When one
//! or more [`MetadataRepository`] implementations are registered with the
//! loader, the entity readers look up every freshly constructed declaration by
//! its byte offset and hand matching payloads to the repository.
//!
//! Registering a repository disables lazy reading for the whole load: payloads
//! may cross-reference nodes that a partially materialized graph would not
//! contain yet.

use std::collections::HashMap;

use crate::{binary::strings::StringTable, file::parser::Parser, Result};

/// A consumer of side-channel metadata payloads.
///
/// Implementations are keyed by tag name; the tag selects which mapping
/// section of the component feeds the repository. `attach` is invoked once per
/// node that has a payload recorded, with the payload region starting at that
/// node's entry; the repository owns the payload's internal format.
pub trait MetadataRepository: Send + Sync {
    /// The mapping tag this repository consumes.
    fn tag(&self) -> &str;

    /// Attach the payload found for the node encoded at `node_offset`.
    ///
    /// # Errors
    /// Any error aborts the decode, like a structural failure would.
    fn attach(&self, node_offset: u32, payload: &[u8]) -> Result<()>;
}

/// One decoded mapping section: a tag plus node-offset → payload-offset pairs.
#[derive(Debug)]
pub(crate) struct MetadataMapping {
    pub(crate) tag: String,
    pub(crate) pairs: HashMap<u32, u32>,
}

/// Decode the metadata mapping section at `offset`.
pub(crate) fn read_metadata_mappings(
    data: &[u8],
    offset: usize,
    strings: &StringTable,
) -> Result<Vec<MetadataMapping>> {
    let mut parser = Parser::new(data);
    parser.seek(offset)?;

    let count = parser.read_uint30()? as usize;
    let mut mappings = Vec::with_capacity(count);
    for _ in 0..count {
        let tag = strings.get(parser.read_uint30()? as usize)?.to_string();
        let pair_count = parser.read_uint30()? as usize;
        let mut pairs = HashMap::with_capacity(pair_count);
        for _ in 0..pair_count {
            let node_offset = parser.read_u32()?;
            let payload_offset = parser.read_u32()?;
            pairs.insert(node_offset, payload_offset);
        }
        mappings.push(MetadataMapping { tag, pairs });
    }

    Ok(mappings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_section_decode() {
        // Strings: ["", "notes"]
        let strings = StringTable::read(&[0x02, 0x00, 0x05, b'n', b'o', b't', b'e', b's'], 0)
            .unwrap();

        // One mapping, tag #1, two pairs.
        #[rustfmt::skip]
        let data: [u8; 19] = [
            0x01,
            0x01, 0x02,
            0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00, 0x08,
        ];

        let mappings = read_metadata_mappings(&data, 0, &strings).unwrap();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].tag, "notes");
        assert_eq!(mappings[0].pairs.get(&0x10), Some(&0x00));
        assert_eq!(mappings[0].pairs.get(&0x20), Some(&0x08));
    }
}
