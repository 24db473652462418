//! The decoded program: libraries, sources, and component-level metadata.

use std::{collections::HashMap, path::Path, sync::Arc};

use strum::FromRepr;

use crate::{
    binary::loader::ComponentLoader,
    file::Buffer,
    ir::{CanonicalNameRoot, LibraryRc, Reference, Source},
    Result,
};

/// The null-safety compilation mode a sub-file was compiled under.
///
/// Merging sub-files with incompatible concrete modes is a fatal error; see
/// [`crate::binary::merge::merge_compilation_modes`] for the exact rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u32)]
pub enum CompilationMode {
    /// Weak null-safety checking
    Weak = 0,
    /// Sound null-safety checking
    Strong = 1,
    /// Compatible with either concrete mode
    Agnostic = 2,
    /// Produced from a build that mixed modes
    Invalid = 3,
}

/// A decoded program: the union of every sub-file merged into it.
///
/// A `Component` owns its library list and source map, and shares a
/// [`CanonicalNameRoot`] with the loader that produced it; handing the same
/// root to a later load re-links new bytes against this component's nodes.
///
/// # Examples
///
/// ```rust,no_run
/// use dillscope::Component;
/// use std::path::Path;
///
/// let component = Component::from_file(Path::new("app.dill"))?;
/// for library in component.libraries() {
///     let library = library.read().expect("Failed to acquire read lock");
///     println!("{:?}", library.file_uri);
/// }
/// # Ok::<(), dillscope::Error>(())
/// ```
#[derive(Debug)]
pub struct Component {
    pub(crate) root: Arc<CanonicalNameRoot>,
    pub(crate) libraries: Vec<LibraryRc>,
    pub(crate) sources: HashMap<String, Source>,
    pub(crate) problems: Vec<String>,
    pub(crate) main_method: Option<Reference>,
    pub(crate) mode: Option<CompilationMode>,
}

impl Component {
    /// Create an empty component linked against the given canonical name root.
    #[must_use]
    pub fn new(root: Arc<CanonicalNameRoot>) -> Self {
        Component {
            root,
            libraries: Vec::new(),
            sources: HashMap::new(),
            problems: Vec::new(),
            main_method: None,
            mode: None,
        }
    }

    /// Load a component from a file on disk, with default options.
    ///
    /// # Arguments
    /// * `path` - Path of the component file to map and decode
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or its content fails to decode.
    pub fn from_file(path: &Path) -> Result<Component> {
        let buffer = Arc::new(Buffer::from_file(path)?);
        ComponentLoader::new().load(&buffer)
    }

    /// Load a component from an in-memory byte vector, with default options.
    ///
    /// # Arguments
    /// * `data` - The encoded component bytes
    ///
    /// # Errors
    /// Returns an error if the content fails to decode.
    pub fn from_vec(data: Vec<u8>) -> Result<Component> {
        let buffer = Arc::new(Buffer::from_vec(data));
        ComponentLoader::new().load(&buffer)
    }

    /// The canonical name root this component is linked against.
    #[must_use]
    pub fn name_root(&self) -> &Arc<CanonicalNameRoot> {
        &self.root
    }

    /// The libraries of the program, in merge order.
    #[must_use]
    pub fn libraries(&self) -> &[LibraryRc] {
        &self.libraries
    }

    /// The merged source map, keyed by file URI.
    #[must_use]
    pub fn sources(&self) -> &HashMap<String, Source> {
        &self.sources
    }

    /// Diagnostic strings accumulated from every merged sub-file.
    #[must_use]
    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    /// Reference to the program entry point, if one was recorded.
    #[must_use]
    pub fn main_method(&self) -> Option<Reference> {
        self.main_method
    }

    /// The merged compilation mode, `None` before any sub-file was merged.
    #[must_use]
    pub fn compilation_mode(&self) -> Option<CompilationMode> {
        self.mode
    }
}
