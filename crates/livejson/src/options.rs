//! Parser configuration.

/// Configuration options for the streaming parser.
///
/// # Examples
///
/// ```rust
/// use livejson::ParserOptions;
///
/// let strict = ParserOptions {
///     allow_bare_keys: false,
/// };
/// assert!(ParserOptions::default().allow_bare_keys);
/// assert!(!strict.allow_bare_keys);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Whether object keys may be bare identifiers (a run of ASCII letters,
    /// digits, and underscores) in addition to quoted strings.
    ///
    /// This is the single lenient extension beyond strict JSON that the
    /// parser supports; it exists because LLM-style generators frequently
    /// emit unquoted keys. Disable it to reject `{key: 1}` with an
    /// `UnexpectedToken` error.
    ///
    /// # Default
    ///
    /// `true`
    pub allow_bare_keys: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            allow_bare_keys: true,
        }
    }
}
