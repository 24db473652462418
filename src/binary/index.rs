//! Trailer/index readers.
//!
//! Every aggregate of the format (the whole buffer, each concatenated
//! sub-file, each library, each class) stores a small fixed-layout index at
//! the *end* of its byte range giving the start offsets of its children. The
//! readers here seek backward from an end offset and recover those offsets
//! without a forward scan, enabling O(1) access to the Nth child and the
//! partial reads lazy materialization relies on.
//!
//! # Layouts (all fields `u32`, big-endian, offsets sub-file relative)
//!
//! - **Buffer**: the last field of every sub-file is its own total byte size;
//!   scanning backward from the buffer end partitions concatenated sub-files.
//! - **Sub-file** ([`ComponentIndex`]): eight fixed table offsets, then
//!   `libraryOffsets[N+1]`, `libraryCount`, `componentFileSize`.
//! - **Library** ([`LibraryIndex`]): `classOffsets[C+1]`,
//!   `procedureOffsets[P+1]`, `classCount`, `procedureCount`.
//! - **Class** ([`ClassIndex`]): `procedureOffsets[P+1]`, `procedureCount`.

use crate::{file::parser::Parser, Result};

/// Absolute byte range of one sub-file within the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ComponentRange {
    /// Start of the sub-file, inclusive
    pub(crate) start: usize,
    /// End of the sub-file, exclusive
    pub(crate) end: usize,
}

/// Partition a buffer of concatenated sub-files by scanning their trailing
/// size fields backward from the very end.
///
/// # Errors
/// Fails if a recovered size is zero, larger than the bytes remaining before
/// it, or not large enough to hold a size field at all.
pub(crate) fn scan_component_ranges(data: &[u8]) -> Result<Vec<ComponentRange>> {
    let mut ranges = Vec::new();
    let mut end = data.len();

    while end > 0 {
        if end < 4 {
            return Err(malformed_error!(
                "Component truncated: {} stray bytes before the first sub-file",
                end
            ));
        }

        let size =
            u32::from_be_bytes([data[end - 4], data[end - 3], data[end - 2], data[end - 1]])
                as usize;
        if size == 0 {
            return Err(malformed_error!(
                "Sub-file ending at offset {} reports a non-positive size",
                end
            ));
        }
        if size > end {
            return Err(malformed_error!(
                "Sub-file ending at offset {} reports size {} exceeding the {} bytes before it",
                end,
                size,
                end
            ));
        }

        ranges.push(ComponentRange {
            start: end - size,
            end,
        });
        end -= size;
    }

    ranges.reverse();
    Ok(ranges)
}

/// The fixed-layout trailer of one sub-file.
#[derive(Debug)]
pub(crate) struct ComponentIndex {
    /// Offset of the source table
    pub(crate) source_table_offset: u32,
    /// Offset of the canonical-name link table
    pub(crate) canonical_names_offset: u32,
    /// Offset of the metadata payload region
    pub(crate) metadata_payloads_offset: u32,
    /// Offset of the metadata mapping section
    pub(crate) metadata_mappings_offset: u32,
    /// Offset of the string table
    pub(crate) string_table_offset: u32,
    /// Offset of the constant pool
    pub(crate) constant_table_offset: u32,
    /// Biased canonical-name reference of the program entry point (0 = none)
    pub(crate) main_method_reference: u32,
    /// Raw compilation-mode enum value
    pub(crate) compilation_mode: u32,
    /// Start offsets of the libraries, plus the end boundary of the last one
    pub(crate) library_offsets: Vec<u32>,
}

impl ComponentIndex {
    /// Number of fixed (non-array) leading fields in the trailer.
    const FIXED_FIELDS: usize = 8;

    /// Read the trailer of the sub-file occupying exactly `data`.
    ///
    /// The self-reported `componentFileSize` is checked against the range
    /// recovered by the outer backward scan.
    ///
    /// # Errors
    /// Fails on truncation, an implausible library count, a size self-check
    /// mismatch, or non-monotonic library offsets.
    pub(crate) fn read(data: &[u8]) -> Result<ComponentIndex> {
        let len = data.len();
        let minimum = (Self::FIXED_FIELDS + 3) * 4;
        if len < minimum {
            return Err(malformed_error!(
                "Sub-file of {} bytes is too small for a component index",
                len
            ));
        }

        let mut parser = Parser::new(data);
        parser.seek(len - 8)?;
        let library_count = parser.read_u32()? as usize;
        let file_size = parser.read_u32()? as usize;

        if file_size != len {
            return Err(malformed_error!(
                "Component index reports {} bytes but the sub-file spans {}",
                file_size,
                len
            ));
        }

        let field_count = Self::FIXED_FIELDS + (library_count + 1) + 2;
        let Some(index_size) = field_count.checked_mul(4) else {
            return Err(malformed_error!(
                "Implausible library count {} in component index",
                library_count
            ));
        };
        if index_size > len {
            return Err(malformed_error!(
                "Component index of {} fields does not fit a {} byte sub-file",
                field_count,
                len
            ));
        }

        parser.seek(len - index_size)?;
        let source_table_offset = parser.read_u32()?;
        let canonical_names_offset = parser.read_u32()?;
        let metadata_payloads_offset = parser.read_u32()?;
        let metadata_mappings_offset = parser.read_u32()?;
        let string_table_offset = parser.read_u32()?;
        let constant_table_offset = parser.read_u32()?;
        let main_method_reference = parser.read_u32()?;
        let compilation_mode = parser.read_u32()?;

        let mut library_offsets = Vec::with_capacity(library_count + 1);
        for _ in 0..=library_count {
            library_offsets.push(parser.read_u32()?);
        }

        for pair in library_offsets.windows(2) {
            if pair[1] < pair[0] {
                return Err(malformed_error!(
                    "Library offsets are not monotonic ({} after {})",
                    pair[1],
                    pair[0]
                ));
            }
        }
        if let Some(last) = library_offsets.last() {
            if *last as usize > len {
                return Err(malformed_error!(
                    "Library boundary {} exceeds the sub-file size {}",
                    last,
                    len
                ));
            }
        }

        Ok(ComponentIndex {
            source_table_offset,
            canonical_names_offset,
            metadata_payloads_offset,
            metadata_mappings_offset,
            string_table_offset,
            constant_table_offset,
            main_method_reference,
            compilation_mode,
            library_offsets,
        })
    }

    /// Number of libraries in the sub-file.
    pub(crate) fn library_count(&self) -> usize {
        self.library_offsets.len().saturating_sub(1)
    }
}

/// Child offsets recovered from the trailing index of one library.
#[derive(Debug)]
pub(crate) struct LibraryIndex {
    /// Start offsets of the classes, plus the end boundary of the region
    pub(crate) class_offsets: Vec<u32>,
    /// Start offsets of the procedures, plus the end boundary of the region
    pub(crate) procedure_offsets: Vec<u32>,
}

impl LibraryIndex {
    /// Read the trailing index of the library spanning `[start, end)`.
    ///
    /// # Errors
    /// Fails on truncation, counts that do not fit the range, or offsets
    /// outside `[start, end)`.
    pub(crate) fn read(data: &[u8], start: usize, end: usize) -> Result<LibraryIndex> {
        if end > data.len() || start > end || end - start < 8 {
            return Err(malformed_error!(
                "Library range {}..{} cannot hold a library index",
                start,
                end
            ));
        }

        let mut parser = Parser::new(data);
        parser.seek(end - 8)?;
        let class_count = parser.read_u32()? as usize;
        let procedure_count = parser.read_u32()? as usize;

        let arrays = (class_count + 1) + (procedure_count + 1);
        let Some(index_size) = arrays.checked_add(2).and_then(|n| n.checked_mul(4)) else {
            return Err(malformed_error!(
                "Implausible counts in library index ({} classes, {} procedures)",
                class_count,
                procedure_count
            ));
        };
        if index_size > end - start {
            return Err(malformed_error!(
                "Library index of {} bytes does not fit range {}..{}",
                index_size,
                start,
                end
            ));
        }

        parser.seek(end - index_size)?;
        let class_offsets = read_offset_array(&mut parser, class_count + 1, start, end)?;
        let procedure_offsets = read_offset_array(&mut parser, procedure_count + 1, start, end)?;

        Ok(LibraryIndex {
            class_offsets,
            procedure_offsets,
        })
    }
}

/// Child offsets recovered from the trailing index of one class.
#[derive(Debug)]
pub(crate) struct ClassIndex {
    /// Start offsets of the procedures, plus the end boundary of the region
    pub(crate) procedure_offsets: Vec<u32>,
}

impl ClassIndex {
    /// Read the trailing index of the class whose range ends at `end`.
    ///
    /// # Errors
    /// Fails on truncation or offsets outside the sub-file.
    pub(crate) fn read(data: &[u8], end: usize) -> Result<ClassIndex> {
        if end > data.len() || end < 4 {
            return Err(malformed_error!(
                "Class range ending at {} cannot hold a class index",
                end
            ));
        }

        let mut parser = Parser::new(data);
        parser.seek(end - 4)?;
        let procedure_count = parser.read_u32()? as usize;

        let Some(index_size) = procedure_count
            .checked_add(2)
            .and_then(|n| n.checked_mul(4))
        else {
            return Err(malformed_error!(
                "Implausible procedure count {} in class index",
                procedure_count
            ));
        };
        if index_size > end {
            return Err(malformed_error!(
                "Class index of {} bytes does not fit before offset {}",
                index_size,
                end
            ));
        }

        parser.seek(end - index_size)?;
        let procedure_offsets = read_offset_array(&mut parser, procedure_count + 1, 0, end)?;

        Ok(ClassIndex { procedure_offsets })
    }
}

fn read_offset_array(
    parser: &mut Parser<'_>,
    count: usize,
    start: usize,
    end: usize,
) -> Result<Vec<u32>> {
    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        let offset = parser.read_u32()?;
        if (offset as usize) < start || offset as usize > end {
            return Err(malformed_error!(
                "Child offset {} lies outside its parent range {}..{}",
                offset,
                start,
                end
            ));
        }
        if let Some(previous) = offsets.last() {
            if offset < *previous {
                return Err(malformed_error!(
                    "Child offsets are not monotonic ({} after {})",
                    offset,
                    previous
                ));
            }
        }
        offsets.push(offset);
    }
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_size(mut body: Vec<u8>) -> Vec<u8> {
        let size = u32::try_from(body.len() + 4).unwrap();
        body.extend_from_slice(&size.to_be_bytes());
        body
    }

    #[test]
    fn backward_scan_partitions_concatenated_files() {
        let first = with_size(vec![0xAA; 12]);
        let second = with_size(vec![0xBB; 20]);
        let mut data = first.clone();
        data.extend_from_slice(&second);

        let ranges = scan_component_ranges(&data).unwrap();
        assert_eq!(
            ranges,
            vec![
                ComponentRange { start: 0, end: 16 },
                ComponentRange { start: 16, end: 40 },
            ]
        );
    }

    #[test]
    fn zero_size_is_fatal() {
        let data = [0u8; 8];
        assert!(scan_component_ranges(&data).is_err());
    }

    #[test]
    fn oversized_trailer_is_fatal() {
        let mut data = vec![0u8; 8];
        let size = 64u32;
        data.extend_from_slice(&size.to_be_bytes());
        assert!(scan_component_ranges(&data).is_err());
    }

    #[test]
    fn stray_leading_bytes_are_fatal() {
        // A valid 8-byte sub-file preceded by 2 bytes nothing can claim.
        let mut data = vec![0xEE, 0xEE];
        data.extend_from_slice(&with_size(vec![0u8; 4]));
        assert!(scan_component_ranges(&data).is_err());
    }
}
