//! Decode-time configuration.

/// Options controlling how a component is decoded.
///
/// The defaults decode lazily where possible, reuse already-bound named nodes,
/// discard coverage bookkeeping, and accept any SDK signature.
///
/// # Examples
///
/// ```rust
/// use dillscope::LoadOptions;
///
/// let options = LoadOptions {
///     eager: true,
///     ..LoadOptions::default()
/// };
/// assert!(options.eager);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Disable lazy reading of class members and function bodies, decoding
    /// everything up front. Lazy reading is also disabled automatically when
    /// more than one sub-file is merged in one call, or when a metadata
    /// repository is registered.
    pub eager: bool,

    /// Always allocate fresh named nodes instead of reusing nodes already
    /// bound to the same canonical name. Turning this on changes the
    /// identity-preservation guarantees observable to holders of old handles.
    pub always_create_new_named_nodes: bool,

    /// Retain the coverable-constructor references of each source entry.
    /// When off, the references are still read from the bytes but discarded.
    pub collect_source_coverage: bool,

    /// The set of SDK signatures this decode accepts. `None` accepts anything;
    /// the all-zero "unverified" signature is accepted regardless.
    pub accepted_sdk_hashes: Option<Vec<String>>,
}
