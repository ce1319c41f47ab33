use thiserror::Error;

/// Errors produced while decoding bencode.
///
/// All variants are recoverable per input: callers processing many torrents
/// should report the failing one and continue with the rest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BencodeError {
    /// The buffer ended before a value was complete.
    #[error("unexpected end of data at offset {offset}")]
    Truncated { offset: usize },

    /// The bytes violate the bencode grammar.
    #[error("invalid bencode at offset {offset}: {message}")]
    Format { offset: usize, message: String },

    /// Lists or dictionaries are nested deeper than allowed.
    #[error("nesting exceeds maximum depth of {limit} at offset {offset}")]
    DepthLimit { limit: usize, offset: usize },
}

impl BencodeError {
    pub(crate) fn format(offset: usize, message: impl Into<String>) -> Self {
        Self::Format {
            offset,
            message: message.into(),
        }
    }

    /// Check if this is a truncation error.
    #[must_use]
    pub const fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }

    /// Check if this is a grammar error.
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}
