//! Top-level component loading.
//!
//! [`ComponentLoader`] owns the decode configuration (options, metadata
//! repositories, and optionally a pre-existing canonical-name root to re-link
//! against) and drives the full decode: locate every concatenated sub-file's
//! byte range, verify each header, read the per-sub-file tables (strings,
//! canonical names, sources, constants), then walk libraries → classes →
//! members through the entity readers, installing lazy completions where
//! permitted and merging everything into one destination [`Component`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use dillscope::{Buffer, ComponentLoader, LoadOptions};
//! use std::sync::Arc;
//!
//! let buffer = Arc::new(Buffer::from_file("app.dill".as_ref())?);
//! let component = ComponentLoader::new()
//!     .with_options(LoadOptions { eager: true, ..LoadOptions::default() })
//!     .load(&buffer)?;
//! println!("{} libraries", component.libraries().len());
//! # Ok::<(), dillscope::Error>(())
//! ```

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::{
    binary::{
        constants::ConstantPool,
        context::SubFileContext,
        index::{scan_component_ranges, ComponentIndex, ComponentRange},
        merge::{merge_compilation_modes, merge_sources},
        metadata::{read_metadata_mappings, MetadataRepository},
        names::{lookup_reference, read_link_table},
        options::LoadOptions,
        reader::with_reader,
        scope::ScopeState,
        sources::read_source_table,
        strings::StringTable,
        BINARY_FORMAT_VERSION, COMPONENT_MAGIC, SDK_HASH_LENGTH, UNVERIFIED_SDK_HASH,
    },
    file::{parser::Parser, Buffer},
    ir::{CanonicalNameRoot, CompilationMode, Component},
    Error, Result,
};

/// Configurable entry point for decoding kernel components.
///
/// A loader can be reused across buffers; every `load` call decodes
/// independently, except that loads sharing a canonical-name root (via
/// [`ComponentLoader::link_root`] or [`ComponentLoader::load_into`]) re-link
/// against the same node graph.
pub struct ComponentLoader {
    options: LoadOptions,
    repositories: Vec<Box<dyn MetadataRepository>>,
    root: Option<Arc<CanonicalNameRoot>>,
}

impl ComponentLoader {
    /// Create a loader with default options and no metadata repositories.
    #[must_use]
    pub fn new() -> Self {
        ComponentLoader {
            options: LoadOptions::default(),
            repositories: Vec::new(),
            root: None,
        }
    }

    /// Replace the decode options.
    #[must_use]
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a metadata repository.
    ///
    /// Registering any repository disables lazy reading for subsequent loads.
    #[must_use]
    pub fn register_repository(mut self, repository: Box<dyn MetadataRepository>) -> Self {
        self.repositories.push(repository);
        self
    }

    /// Link subsequent loads against an existing canonical-name root instead
    /// of a fresh one, enabling incremental re-linking: named nodes already
    /// bound in the root are reused and overwritten in place (unless
    /// [`LoadOptions::always_create_new_named_nodes`] is set).
    #[must_use]
    pub fn link_root(mut self, root: Arc<CanonicalNameRoot>) -> Self {
        self.root = Some(root);
        self
    }

    /// Decode a buffer of one or more concatenated sub-files into a new
    /// [`Component`].
    ///
    /// # Errors
    /// Fails on any structural, format, merge, or input-shape error; the
    /// partially populated component is discarded.
    pub fn load(&self, buffer: &Arc<Buffer>) -> Result<Component> {
        let root = self
            .root
            .clone()
            .unwrap_or_else(|| Arc::new(CanonicalNameRoot::new()));
        let mut component = Component::new(root);
        self.load_into(&mut component, buffer)?;
        Ok(component)
    }

    /// Decode a buffer into an existing [`Component`], appending libraries and
    /// merging sources, diagnostics, and the compilation mode.
    ///
    /// # Errors
    /// Fails on any structural, format, merge, or input-shape error. The
    /// destination is left partially populated and should be discarded.
    pub fn load_into(&self, component: &mut Component, buffer: &Arc<Buffer>) -> Result<()> {
        let data = buffer.data();
        if data.is_empty() {
            return Err(Error::Empty);
        }

        let ranges = scan_component_ranges(data)?;
        let lazy_enabled =
            ranges.len() == 1 && !self.options.eager && self.repositories.is_empty();
        debug!(
            sub_files = ranges.len(),
            lazy = lazy_enabled,
            "loading component"
        );

        for range in &ranges {
            self.read_sub_file(component, buffer, *range, lazy_enabled)?;
        }
        Ok(())
    }

    /// Decode a buffer that must contain exactly one sub-file.
    ///
    /// # Errors
    /// Returns [`Error::SingleComponentExpected`] for concatenated input,
    /// [`Error::TrailingBytes`] when bytes beyond the single sub-file remain,
    /// and the usual decode errors otherwise.
    pub fn load_single(&self, buffer: &Arc<Buffer>) -> Result<Component> {
        let data = buffer.data();
        if data.is_empty() {
            return Err(Error::Empty);
        }
        if data.len() < 4 {
            return Err(malformed_error!(
                "Component of {} bytes cannot hold a size trailer",
                data.len()
            ));
        }

        let len = data.len();
        let size =
            u32::from_be_bytes([data[len - 4], data[len - 3], data[len - 2], data[len - 1]])
                as usize;
        if size == 0 || size > len {
            return Err(malformed_error!(
                "Trailing size field reports {} bytes for a {} byte buffer",
                size,
                len
            ));
        }
        if size != len {
            return match scan_component_ranges(data) {
                Ok(ranges) if ranges.len() > 1 => Err(Error::SingleComponentExpected {
                    found: ranges.len(),
                }),
                _ => Err(Error::TrailingBytes { count: len - size }),
            };
        }

        let root = self
            .root
            .clone()
            .unwrap_or_else(|| Arc::new(CanonicalNameRoot::new()));
        let mut component = Component::new(root);
        let lazy_enabled = !self.options.eager && self.repositories.is_empty();
        self.read_sub_file(
            &mut component,
            buffer,
            ComponentRange { start: 0, end: len },
            lazy_enabled,
        )?;
        Ok(component)
    }

    fn read_sub_file(
        &self,
        component: &mut Component,
        buffer: &Arc<Buffer>,
        range: ComponentRange,
        lazy_enabled: bool,
    ) -> Result<()> {
        let data = &buffer.data()[range.start..range.end];
        let mut parser = Parser::new(data);

        let magic = parser.read_u32()?;
        if magic != COMPONENT_MAGIC {
            return Err(Error::BadMagic { found: magic });
        }
        let version = parser.read_u32()?;
        if version != BINARY_FORMAT_VERSION {
            return Err(Error::UnsupportedVersion {
                found: version,
                expected: BINARY_FORMAT_VERSION,
            });
        }
        let sdk_hash = String::from_utf8_lossy(parser.read_bytes(SDK_HASH_LENGTH)?).into_owned();
        if sdk_hash != UNVERIFIED_SDK_HASH {
            if let Some(accepted) = &self.options.accepted_sdk_hashes {
                if !accepted.iter().any(|hash| *hash == sdk_hash) {
                    return Err(Error::UnknownSdkHash { found: sdk_hash });
                }
            } else {
                debug!(sdk_hash = sdk_hash.as_str(), "accepting unchecked SDK signature");
            }
        }

        let problem_count = parser.read_uint30()? as usize;
        let mut problems = Vec::with_capacity(problem_count);
        for _ in 0..problem_count {
            problems.push(parser.read_string()?);
        }

        let index = ComponentIndex::read(data)?;
        let mode = CompilationMode::from_repr(index.compilation_mode).ok_or_else(|| {
            malformed_error!("Unknown compilation mode {}", index.compilation_mode)
        })?;
        component.mode = merge_compilation_modes(component.mode, mode)?;

        let root = Arc::clone(&component.root);
        let strings = StringTable::read(data, index.string_table_offset as usize)?;
        let names = read_link_table(
            data,
            index.canonical_names_offset as usize,
            &strings,
            &root,
        )?;
        let sources = read_source_table(
            data,
            index.source_table_offset as usize,
            self.options.collect_source_coverage,
            &names,
        )?;
        let source_uris: Vec<Option<String>> =
            sources.iter().map(|source| source.uri.clone()).collect();

        let metadata_mappings = if self.repositories.is_empty() {
            Vec::new()
        } else {
            read_metadata_mappings(data, index.metadata_mappings_offset as usize, &strings)?
        };

        if component.main_method.is_none() {
            component.main_method = lookup_reference(&names, index.main_method_reference)?;
        }

        let mut ctx = Arc::new(SubFileContext {
            buffer: Arc::clone(buffer),
            start: range.start,
            end: range.end,
            strings,
            source_uris,
            names,
            root,
            constants: ConstantPool::default(),
            options: self.options.clone(),
            lazy_enabled,
            metadata_mappings,
            metadata_payloads: (
                index.metadata_payloads_offset as usize,
                index.metadata_mappings_offset as usize,
            ),
            parked: Mutex::new(ScopeState::default()),
        });

        // The constant pool is decoded through the entity readers (constants
        // embed types and references), against a context whose pool is still
        // empty. Nothing else can hold the context yet.
        let pool = with_reader(&ctx, &[], None, Vec::new(), |reader| {
            reader.read_constant_pool(index.constant_table_offset as usize)
        })?;
        match Arc::get_mut(&mut ctx) {
            Some(inner) => inner.constants = pool,
            None => {
                return Err(malformed_error!(
                    "Component context unexpectedly shared during table decode"
                ))
            }
        }

        let library_ranges: Vec<(usize, usize)> = index
            .library_offsets
            .windows(2)
            .map(|pair| (pair[0] as usize, pair[1] as usize))
            .collect();

        let libraries = with_reader(&ctx, &self.repositories, None, Vec::new(), |reader| {
            let mut libraries = Vec::with_capacity(library_ranges.len());
            for (start, end) in &library_ranges {
                libraries.push(reader.read_library(*start, *end)?);
            }
            Ok(libraries)
        })?;

        debug!(
            libraries = libraries.len(),
            constants = ctx.constants.len(),
            "sub-file decoded"
        );

        component.libraries.extend(libraries);
        merge_sources(&mut component.sources, sources);
        component.problems.extend(problems);
        Ok(())
    }
}

impl Default for ComponentLoader {
    fn default() -> Self {
        ComponentLoader::new()
    }
}
