/// Errors raised by the primitive readers.
///
/// Both variants carry the buffer position at which the problem was
/// detected, so callers higher up the stack can report where decoding
/// stopped without re-deriving it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// A read of `len` bytes starting at `offset` does not fit inside the
    /// buffer.
    #[error("read of {len} bytes at offset {offset:#X} exceeds buffer length {buffer_len}")]
    OutOfBounds {
        offset: u64,
        len: u64,
        buffer_len: u64,
    },

    /// A signed offset stored at `offset` resolves to a location before
    /// the start of the buffer (or past `u64::MAX`).
    #[error("offset value {value} stored at {offset:#X} points outside the buffer")]
    OffsetOverflow { offset: u64, value: i64 },
}

impl WireError {
    /// The buffer position at which the error was detected.
    #[must_use]
    pub fn offset(&self) -> u64 {
        match self {
            Self::OutOfBounds { offset, .. } | Self::OffsetOverflow { offset, .. } => *offset,
        }
    }
}
