//! Source table decoding.
//!
//! Per entry: a length-prefixed URI (empty = none), the raw source bytes, a
//! varint-delta line-start list, a length-prefixed import URI, and the
//! coverable-constructor references. The references are always present in the
//! bytes; when coverage collection was not requested each one is read and
//! discarded.

use crate::{
    binary::names::lookup_reference,
    file::parser::Parser,
    ir::{NameId, Source},
    Result,
};

/// Decode the source table at `offset` within the sub-file bytes.
pub(crate) fn read_source_table(
    data: &[u8],
    offset: usize,
    collect_coverage: bool,
    name_table: &[NameId],
) -> Result<Vec<Source>> {
    let mut parser = Parser::new(data);
    parser.seek(offset)?;

    let count = parser.read_uint30()? as usize;
    let mut sources = Vec::with_capacity(count);
    for _ in 0..count {
        let uri = non_empty(parser.read_string()?);

        let text_len = parser.read_uint30()? as usize;
        let text = parser.read_bytes(text_len)?.to_vec();

        let line_count = parser.read_uint30()? as usize;
        let mut line_starts = Vec::with_capacity(line_count);
        let mut line_start = 0u32;
        for _ in 0..line_count {
            line_start = line_start.wrapping_add(parser.read_uint30()?);
            line_starts.push(line_start);
        }

        let import_uri = non_empty(parser.read_string()?);

        let constructor_count = parser.read_uint30()? as usize;
        let mut coverage_constructors = Vec::new();
        for _ in 0..constructor_count {
            let reference = lookup_reference(name_table, parser.read_uint30()?)?;
            if collect_coverage {
                if let Some(reference) = reference {
                    coverage_constructors.push(reference);
                }
            }
        }

        sources.push(Source {
            uri,
            text,
            line_starts,
            import_uri,
            coverage_constructors,
        });
    }

    Ok(sources)
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::CanonicalNameRoot;

    #[test]
    fn entry_decode_with_line_deltas() {
        #[rustfmt::skip]
        let data: Vec<u8> = vec![
            0x01,                                  // one entry
            0x09, b'f', b'i', b'l', b'e', b':', b'/', b'/', b'/', b'a', // uri
            0x04, b'm', b'a', b'i', b'n',          // text
            0x03, 0x00, 0x05, 0x07,                // line deltas -> [0, 5, 12]
            0x00,                                  // no import uri
            0x00,                                  // no coverage constructors
        ];

        let sources = read_source_table(&data, 0, false, &[]).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].uri.as_deref(), Some("file:///a"));
        assert_eq!(sources[0].text, b"main");
        assert_eq!(sources[0].line_starts, vec![0, 5, 12]);
        assert!(sources[0].import_uri.is_none());
    }

    #[test]
    fn coverage_references_read_and_discarded() {
        let root = CanonicalNameRoot::new();
        let id = root.child(NameId::ROOT, "lib");
        let table = vec![id];

        #[rustfmt::skip]
        let data: Vec<u8> = vec![
            0x01,
            0x00,             // no uri
            0x00,             // no text
            0x00,             // no lines
            0x00,             // no import uri
            0x02, 0x01, 0x01, // two coverage references to entry #1
        ];

        let discarded = read_source_table(&data, 0, false, &table).unwrap();
        assert!(discarded[0].coverage_constructors.is_empty());

        let collected = read_source_table(&data, 0, true, &table).unwrap();
        assert_eq!(collected[0].coverage_constructors.len(), 2);
    }
}
