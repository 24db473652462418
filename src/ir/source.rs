//! Per-file source information shipped inside a component.

use crate::ir::Reference;

/// Source bookkeeping for one file that contributed to a component.
///
/// Carried for diagnostics and tooling; the decoder never interprets the text.
#[derive(Debug, Default)]
pub struct Source {
    /// URI the file was compiled from, `None` for synthetic entries
    pub uri: Option<String>,
    /// Raw source text, possibly empty for stripped components
    pub text: Vec<u8>,
    /// Cumulative byte offsets of line starts within `text`
    pub line_starts: Vec<u32>,
    /// URI the file is imported as
    pub import_uri: Option<String>,
    /// Constructors eligible for coverage instrumentation, retained only when
    /// coverage collection was requested at load time
    pub coverage_constructors: Vec<Reference>,
}

impl Source {
    /// Returns `true` if this entry carries no source text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
