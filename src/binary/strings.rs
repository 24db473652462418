//! String table decoding.
//!
//! Every name and string literal in a sub-file is referenced by index into the
//! sub-file's string table: a `uint30` count, that many cumulative `uint30` end
//! offsets, then the concatenated segment bytes decoded per-segment as
//! extended-UTF8. Built once per sub-file, immutable afterward.

use crate::{
    file::parser::{decode_extended_utf8, Parser},
    Result,
};

/// Ordered sequence of decoded strings, indexed by integer.
#[derive(Debug, Default)]
pub struct StringTable {
    entries: Vec<String>,
}

impl StringTable {
    /// Decode the string table located at `offset` within the sub-file bytes.
    ///
    /// # Arguments
    /// * `data` - The complete sub-file byte range
    /// * `offset` - Start of the string table within `data`
    ///
    /// # Errors
    /// Returns an error on truncation, non-monotonic end offsets, or invalid
    /// extended-UTF8 segment content.
    pub fn read(data: &[u8], offset: usize) -> Result<StringTable> {
        let mut parser = Parser::new(data);
        parser.seek(offset)?;

        let count = parser.read_uint30()? as usize;
        let mut end_offsets = Vec::with_capacity(count);
        for _ in 0..count {
            end_offsets.push(parser.read_uint30()? as usize);
        }

        let mut entries = Vec::with_capacity(count);
        let mut segment_start = 0usize;
        for end in end_offsets {
            if end < segment_start {
                return Err(malformed_error!(
                    "String table end offsets are not monotonic ({} after {})",
                    end,
                    segment_start
                ));
            }
            let base = parser.pos();
            let bytes = parser.read_bytes(end - segment_start)?;
            entries.push(decode_extended_utf8(bytes, base)?);
            segment_start = end;
        }

        Ok(StringTable { entries })
    }

    /// Get the string stored at the provided index.
    ///
    /// ## Arguments
    /// * `index` - The table index to be accessed (comes from node encodings)
    ///
    /// # Errors
    /// Returns an error if the index is out of range.
    pub fn get(&self, index: usize) -> Result<&str> {
        self.entries
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| malformed_error!("String index {} out of range", index))
    }

    /// Number of strings in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no strings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        // count=3, ends=[0,5,7], bytes="hello" + 2-byte U+00E9
        #[rustfmt::skip]
        let data: [u8; 11] = [
            0x03,
            0x00, 0x05, 0x07,
            b'h', b'e', b'l', b'l', b'o',
            0xC3, 0xA9,
        ];

        let table = StringTable::read(&data, 0).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0).unwrap(), "");
        assert_eq!(table.get(1).unwrap(), "hello");
        assert_eq!(table.get(2).unwrap(), "\u{E9}");
        assert!(table.get(3).is_err());
    }

    #[test]
    fn truncated_segment_bytes() {
        let data = [0x01, 0x04, b'a', b'b'];
        assert!(StringTable::read(&data, 0).is_err());
    }

    #[test]
    fn non_monotonic_offsets() {
        let data = [0x02, 0x02, 0x01, b'a', b'b'];
        assert!(StringTable::read(&data, 0).is_err());
    }
}
