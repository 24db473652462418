//! Multi-component merge rules.
//!
//! Each concatenated sub-file is fully self-describing; merging N of them into
//! one program appends their library lists, merges their source tables
//! key-by-key, and folds their compilation modes through a small state
//! machine. Only the mode fold can fail: two concrete, disagreeing modes in
//! one program are a fatal [`crate::Error::MixedCompilationMode`].

use std::collections::{hash_map::Entry, HashMap};

use crate::{
    ir::{CompilationMode, Source},
    Error, Result,
};

/// Fold one sub-file's compilation mode into the accumulated mode.
///
/// The accumulator starts as `None` ("unset"). The transition rule:
///
/// - unset + `b` → `b`
/// - `Invalid` on either side → `Invalid`
/// - `Agnostic` on either side → the other side
/// - equal concrete modes → that mode
/// - differing concrete modes → fatal
///
/// # Errors
/// Returns [`crate::Error::MixedCompilationMode`] for two differing concrete modes.
pub fn merge_compilation_modes(
    accumulated: Option<CompilationMode>,
    incoming: CompilationMode,
) -> Result<Option<CompilationMode>> {
    use CompilationMode::{Agnostic, Invalid};

    let Some(accumulated) = accumulated else {
        return Ok(Some(incoming));
    };

    if accumulated == Invalid || incoming == Invalid {
        return Ok(Some(Invalid));
    }
    if accumulated == Agnostic {
        return Ok(Some(incoming));
    }
    if incoming == Agnostic || incoming == accumulated {
        return Ok(Some(accumulated));
    }

    Err(Error::MixedCompilationMode {
        a: accumulated,
        b: incoming,
    })
}

/// Merge one sub-file's source entries into the destination source map.
///
/// Entries are keyed by URI. On a key collision the non-empty source text wins
/// (synthetic zero-content entries from elsewhere in the toolchain must not
/// shadow real text), and the coverage-constructor sets are unioned. Entries
/// without a URI have no identity to merge under and are dropped.
pub(crate) fn merge_sources(destination: &mut HashMap<String, Source>, incoming: Vec<Source>) {
    for source in incoming {
        let Some(uri) = source.uri.clone() else {
            continue;
        };

        match destination.entry(uri) {
            Entry::Vacant(slot) => {
                slot.insert(source);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if existing.text.is_empty() && !source.text.is_empty() {
                    existing.text = source.text;
                    existing.line_starts = source.line_starts;
                }
                if existing.import_uri.is_none() {
                    existing.import_uri = source.import_uri;
                }
                for reference in source.coverage_constructors {
                    if !existing.coverage_constructors.contains(&reference) {
                        existing.coverage_constructors.push(reference);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CanonicalNameRoot, NameId, Reference};

    #[test]
    fn mode_machine_transition_table() {
        use CompilationMode::{Agnostic, Invalid, Strong, Weak};

        assert_eq!(merge_compilation_modes(None, Weak).unwrap(), Some(Weak));
        assert_eq!(merge_compilation_modes(None, Agnostic).unwrap(), Some(Agnostic));

        assert_eq!(
            merge_compilation_modes(Some(Agnostic), Strong).unwrap(),
            Some(Strong)
        );
        assert_eq!(
            merge_compilation_modes(Some(Weak), Agnostic).unwrap(),
            Some(Weak)
        );
        assert_eq!(
            merge_compilation_modes(Some(Strong), Strong).unwrap(),
            Some(Strong)
        );

        assert_eq!(
            merge_compilation_modes(Some(Invalid), Strong).unwrap(),
            Some(Invalid)
        );
        assert_eq!(
            merge_compilation_modes(Some(Weak), Invalid).unwrap(),
            Some(Invalid)
        );

        match merge_compilation_modes(Some(Weak), Strong) {
            Err(Error::MixedCompilationMode { a, b }) => {
                assert_eq!(a, Weak);
                assert_eq!(b, Strong);
            }
            other => panic!("expected MixedCompilationMode, got {other:?}"),
        }
    }

    #[test]
    fn non_empty_source_text_wins() {
        let mut destination = HashMap::new();
        destination.insert(
            "file:///a.dart".to_string(),
            Source {
                uri: Some("file:///a.dart".to_string()),
                ..Source::default()
            },
        );

        merge_sources(
            &mut destination,
            vec![Source {
                uri: Some("file:///a.dart".to_string()),
                text: b"void main() {}".to_vec(),
                line_starts: vec![0],
                ..Source::default()
            }],
        );

        let merged = &destination["file:///a.dart"];
        assert_eq!(merged.text, b"void main() {}");
        assert_eq!(merged.line_starts, vec![0]);

        // An empty incoming entry must not clobber the text back out.
        merge_sources(
            &mut destination,
            vec![Source {
                uri: Some("file:///a.dart".to_string()),
                ..Source::default()
            }],
        );
        assert_eq!(destination["file:///a.dart"].text, b"void main() {}");
    }

    #[test]
    fn coverage_sets_are_unioned() {
        let root = CanonicalNameRoot::new();
        let a = Reference::new(root.child(NameId::ROOT, "a"));
        let b = Reference::new(root.child(NameId::ROOT, "b"));

        let mut destination = HashMap::new();
        destination.insert(
            "file:///a.dart".to_string(),
            Source {
                uri: Some("file:///a.dart".to_string()),
                coverage_constructors: vec![a],
                ..Source::default()
            },
        );

        merge_sources(
            &mut destination,
            vec![Source {
                uri: Some("file:///a.dart".to_string()),
                coverage_constructors: vec![a, b],
                ..Source::default()
            }],
        );

        assert_eq!(
            destination["file:///a.dart"].coverage_constructors,
            vec![a, b]
        );
    }

    #[test]
    fn uriless_entries_are_dropped() {
        let mut destination = HashMap::new();
        merge_sources(&mut destination, vec![Source::default()]);
        assert!(destination.is_empty());
    }
}
