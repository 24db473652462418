//! Canonical names, references, and the reference → node binding table.
//!
//! A *canonical name* is a dotted-path identity for a declaration, stable across
//! separately compiled sub-files, shared between them, and usable before the
//! declaration it names has been decoded. Downstream nodes never store direct
//! pointers to other named nodes; they store a [`Reference`], which resolves
//! through the binding side table of the [`CanonicalNameRoot`] that produced it.
//!
//! # Architecture
//!
//! - [`CanonicalNameRoot`] - append-only arena of name nodes plus two side maps:
//!   child lookup (`(parent, local name)` → node) and bindings (name → decoded node).
//! - [`NameId`] - index handle into the arena; `NameId::ROOT` is the tree root.
//! - [`Reference`] - the indirection handle stored inside decoded nodes.
//! - [`NodeBinding`] - the eventually-bound concrete node a reference resolves to.
//!
//! # Invariants
//!
//! Two encodings of the same dotted path anywhere in the same root yield the
//! *same* [`NameId`] (lookup-or-create by `(parent, name)`, never re-creation).
//! Bindings are an append-only association: a reference with no binding yet is
//! valid and simply resolves to `None` until the node is constructed.
//!
//! # Examples
//!
//! ```rust
//! use dillscope::ir::CanonicalNameRoot;
//!
//! let root = CanonicalNameRoot::new();
//! let lib = root.child(dillscope::ir::NameId::ROOT, "package:demo/demo.dart");
//! let class = root.child(lib, "Point");
//!
//! assert_eq!(root.path(class), "package:demo/demo.dart::Point");
//! assert_eq!(root.child(lib, "Point"), class);
//! ```

use dashmap::DashMap;

use crate::ir::{
    ClassRc, ConstructorRc, ExtensionRc, FieldRc, LibraryRc, ProcedureRc, TypedefRc,
};

/// Handle identifying one canonical name node within its [`CanonicalNameRoot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameId(pub(crate) u32);

impl NameId {
    /// The root of the canonical name tree.
    pub const ROOT: NameId = NameId(0);

    /// Returns the raw arena index of this name.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.0
    }

    /// Returns `true` if this is the tree root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == 0
    }
}

/// An indirection handle standing in for a direct pointer to a named node.
///
/// References enable forward references: a node can be referenced before it has
/// been decoded, and resolves once the binding table is populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference {
    name: NameId,
}

impl Reference {
    /// Create a reference to the given canonical name.
    #[must_use]
    pub fn new(name: NameId) -> Self {
        Reference { name }
    }

    /// The canonical name this reference points at.
    #[must_use]
    pub fn name_id(&self) -> NameId {
        self.name
    }
}

/// The concrete node a [`Reference`] resolves to once it has been decoded.
#[derive(Debug, Clone)]
pub enum NodeBinding {
    /// A bound library
    Library(LibraryRc),
    /// A bound class
    Class(ClassRc),
    /// A bound typedef
    Typedef(TypedefRc),
    /// A bound extension
    Extension(ExtensionRc),
    /// A bound field
    Field(FieldRc),
    /// A bound constructor
    Constructor(ConstructorRc),
    /// A bound procedure
    Procedure(ProcedureRc),
}

/// One node of the canonical name tree: a parent handle plus a local name.
#[derive(Debug)]
struct CanonicalName {
    parent: NameId,
    name: String,
}

/// Arena of canonical name nodes shared by every sub-file linked against it.
///
/// The arena is append-only: name nodes are never removed or mutated, so
/// handles stay valid for the lifetime of the root. The root can outlive any
/// single decode call and be handed to subsequent loads for incremental
/// re-linking against an already materialized program.
#[derive(Debug)]
pub struct CanonicalNameRoot {
    nodes: boxcar::Vec<CanonicalName>,
    children: DashMap<(NameId, String), NameId>,
    bindings: DashMap<NameId, NodeBinding>,
}

impl CanonicalNameRoot {
    /// Create an empty canonical name tree.
    #[must_use]
    pub fn new() -> Self {
        let nodes = boxcar::Vec::new();
        nodes.push(CanonicalName {
            parent: NameId::ROOT,
            name: String::new(),
        });

        CanonicalNameRoot {
            nodes,
            children: DashMap::new(),
            bindings: DashMap::new(),
        }
    }

    /// Look up or create the child of `parent` with the given local name.
    ///
    /// The same `(parent, name)` pair always yields the same [`NameId`], no
    /// matter how many encodings mention it.
    pub fn child(&self, parent: NameId, name: &str) -> NameId {
        if let Some(existing) = self.children.get(&(parent, name.to_string())) {
            return *existing;
        }

        *self
            .children
            .entry((parent, name.to_string()))
            .or_insert_with(|| {
                let index = self.nodes.push(CanonicalName {
                    parent,
                    name: name.to_string(),
                });
                NameId(u32::try_from(index).unwrap_or(u32::MAX))
            })
    }

    /// Returns the local name of the given node (empty for the root).
    #[must_use]
    pub fn name_of(&self, id: NameId) -> &str {
        self.nodes
            .get(id.0 as usize)
            .map_or("", |node| node.name.as_str())
    }

    /// Returns the parent handle of the given node (the root is its own parent).
    #[must_use]
    pub fn parent_of(&self, id: NameId) -> NameId {
        self.nodes
            .get(id.0 as usize)
            .map_or(NameId::ROOT, |node| node.parent)
    }

    /// Returns the full dotted path of the given node, segments joined by `::`.
    #[must_use]
    pub fn path(&self, id: NameId) -> String {
        if id.is_root() {
            return String::new();
        }

        let mut segments = Vec::new();
        let mut cursor = id;
        while !cursor.is_root() {
            segments.push(self.name_of(cursor).to_string());
            cursor = self.parent_of(cursor);
        }
        segments.reverse();
        segments.join("::")
    }

    /// Number of name nodes in the arena, the root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.count()
    }

    /// Returns `true` if the arena holds only the root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Associate a decoded node with a canonical name.
    ///
    /// Bindings may be overwritten: re-linking with fresh node creation rebinds
    /// the name to the newest node.
    pub fn bind(&self, id: NameId, binding: NodeBinding) {
        self.bindings.insert(id, binding);
    }

    /// Resolve a reference to its bound node, if the node has been decoded yet.
    ///
    /// An unbound reference is not an error; it is the explicit
    /// "not yet materialized" state forward references rely on.
    #[must_use]
    pub fn binding(&self, reference: Reference) -> Option<NodeBinding> {
        self.bindings
            .get(&reference.name_id())
            .map(|entry| entry.value().clone())
    }
}

impl Default for CanonicalNameRoot {
    fn default() -> Self {
        CanonicalNameRoot::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_path_yields_same_node() {
        let root = CanonicalNameRoot::new();

        let a1 = root.child(NameId::ROOT, "lib");
        let b1 = root.child(a1, "Klass");
        let a2 = root.child(NameId::ROOT, "lib");
        let b2 = root.child(a2, "Klass");

        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
        assert_eq!(root.len(), 3);
    }

    #[test]
    fn sibling_names_are_distinct() {
        let root = CanonicalNameRoot::new();

        let lib = root.child(NameId::ROOT, "lib");
        let a = root.child(lib, "a");
        let b = root.child(lib, "b");

        assert_ne!(a, b);
        assert_eq!(root.path(a), "lib::a");
        assert_eq!(root.path(b), "lib::b");
    }

    #[test]
    fn unbound_reference_resolves_to_none() {
        let root = CanonicalNameRoot::new();
        let id = root.child(NameId::ROOT, "nowhere");

        assert!(root.binding(Reference::new(id)).is_none());
    }

    #[test]
    fn parent_of_root_is_root() {
        let root = CanonicalNameRoot::new();
        assert_eq!(root.parent_of(NameId::ROOT), NameId::ROOT);
        assert_eq!(root.path(NameId::ROOT), "");
    }
}
