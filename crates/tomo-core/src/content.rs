//! Rich-content codec seam
//!
//! Note content is an opaque blob owned by the editing layer. The core only
//! ever needs a plain-text extract of it, for search and list snippets. A
//! codec that cannot decode a blob reports `None`; that is never an error.

/// Extracts plain text from a note's content blob
pub trait ContentCodec: Send + Sync {
    /// Decode the blob into plain text, or `None` if it cannot be read
    fn plain_text(&self, bytes: &[u8]) -> Option<String>;
}

/// Codec for notes whose content blob is plain UTF-8 text
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Codec;

impl ContentCodec for Utf8Codec {
    fn plain_text(&self, bytes: &[u8]) -> Option<String> {
        if bytes.is_empty() {
            return None;
        }
        std::str::from_utf8(bytes).ok().map(str::to_string)
    }
}
