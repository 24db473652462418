//! Physical file backend for memory-mapped I/O.
//!
//! Maps a component file directly into the process's address space, so that large
//! components can be decoded lazily without loading the entire content upfront.

use std::{fs::File, path::Path};

use memmap2::Mmap;

use super::Backend;
use crate::Result;

/// Input file backed by a memory map
pub struct Physical {
    map: Mmap,
}

impl Physical {
    /// Create a new memory-mapped backend from a file on disk.
    ///
    /// ## Arguments
    /// * 'path' - Path of the file to map
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or mapped.
    pub fn new(path: &Path) -> Result<Physical> {
        let file = File::open(path)?;
        // Safety: the map is read-only and the file is not mutated through this process.
        let map = unsafe { Mmap::map(&file)? };

        Ok(Physical { map })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(out_of_bounds_error!(offset));
        };

        if offset_end > self.map.len() {
            return Err(out_of_bounds_error!(offset));
        }

        Ok(&self.map[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        &self.map
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}
