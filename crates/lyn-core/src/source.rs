//! Named source text handle.

use crate::LineIndex;

/// A single compilation unit: display name plus full text.
///
/// The pipeline compiles one source at a time; the name feeds diagnostic
/// headers and the emitted-C provenance comment.
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    text: String,
}

impl Source {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Anonymous source for inline snippets (tests, `-q`-style input).
    pub fn anonymous(text: impl Into<String>) -> Self {
        Self::new("<input>", text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(&self.text)
    }
}
