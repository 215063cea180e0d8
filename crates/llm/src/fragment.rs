//! One incremental unit of streamed generated text.

/// A non-empty text chunk belonging to one response stream.
///
/// Fragments are concatenated in emission order to reconstruct the full
/// response; the transport layer never reorders or deduplicates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    text: String,
}

impl Fragment {
    /// Create a fragment. Returns `None` for empty text — empty deltas are
    /// filtered at decode time, not forwarded.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() { None } else { Some(Self { text }) }
    }

    /// The fragment text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the fragment, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// Length of the fragment text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }
}
