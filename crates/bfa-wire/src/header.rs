use crate::error::WireError;
use crate::read::{ByteReader, UOFFSET_SIZE};

/// Length of the optional file identifier that follows the root offset.
pub const FILE_IDENTIFIER_LENGTH: u64 = 4;

/// The fixed prefix of every buffer.
///
/// ```text
/// ┌─────────────────────┬──────────────────────────────────┐
/// │ Offset 0..4         │ uoffset to the root table         │
/// │ Offset 4..8         │ file identifier (optional, ASCII) │
/// └─────────────────────┴──────────────────────────────────┘
/// ```
///
/// The identifier is not self-describing. It is recognised only when the
/// root table starts at or after byte 8 and all four bytes are printable
/// ASCII; otherwise those bytes belong to whatever the layout puts there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RootHeader {
    /// Absolute offset of the root table.
    pub root_offset: u64,
    /// The 4-byte file identifier, if one was detected.
    pub file_identifier: Option<[u8; 4]>,
}

impl RootHeader {
    /// Read the header from the front of the buffer.
    ///
    /// With `detect_identifier` off, bytes 4..8 are never claimed.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::OutOfBounds`] when the buffer is too short to
    /// hold the root offset.
    pub fn read_from(reader: &ByteReader<'_>, detect_identifier: bool) -> Result<Self, WireError> {
        let root_offset = reader.read_uoffset(0)?;
        let file_identifier = if detect_identifier {
            Self::detect_identifier(reader, root_offset)
        } else {
            None
        };
        Ok(Self {
            root_offset,
            file_identifier,
        })
    }

    /// Number of header bytes claimed (4, or 8 with an identifier).
    #[must_use]
    pub fn size(&self) -> u64 {
        if self.file_identifier.is_some() {
            UOFFSET_SIZE + FILE_IDENTIFIER_LENGTH
        } else {
            UOFFSET_SIZE
        }
    }

    /// The identifier as text.
    #[must_use]
    pub fn identifier_str(&self) -> Option<&str> {
        self.file_identifier
            .as_ref()
            .and_then(|id| std::str::from_utf8(id).ok())
    }

    fn detect_identifier(reader: &ByteReader<'_>, root_offset: u64) -> Option<[u8; 4]> {
        if root_offset < UOFFSET_SIZE + FILE_IDENTIFIER_LENGTH {
            return None;
        }
        let bytes = reader.slice(UOFFSET_SIZE, FILE_IDENTIFIER_LENGTH).ok()?;
        if !bytes.iter().all(|b| (0x20..=0x7E).contains(b)) {
            return None;
        }
        bytes.try_into().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(root: u32, tail: &[u8]) -> Vec<u8> {
        let mut buf = root.to_le_bytes().to_vec();
        buf.extend_from_slice(tail);
        buf
    }

    #[test]
    fn reads_root_offset() {
        let buf = buffer(12, &[0u8; 12]);
        let header = RootHeader::read_from(&ByteReader::new(&buf), true).unwrap();
        assert_eq!(header.root_offset, 12);
        assert_eq!(header.file_identifier, None);
        assert_eq!(header.size(), 4);
    }

    #[test]
    fn detects_printable_identifier() {
        let buf = buffer(12, b"MONS\0\0\0\0\0\0\0\0");
        let header = RootHeader::read_from(&ByteReader::new(&buf), true).unwrap();
        assert_eq!(header.file_identifier, Some(*b"MONS"));
        assert_eq!(header.identifier_str(), Some("MONS"));
        assert_eq!(header.size(), 8);
    }

    #[test]
    fn identifier_not_detected_when_root_is_close() {
        // root at 4: bytes 4..8 belong to the root table
        let buf = buffer(4, b"ABCD");
        let header = RootHeader::read_from(&ByteReader::new(&buf), true).unwrap();
        assert_eq!(header.file_identifier, None);
    }

    #[test]
    fn identifier_not_detected_for_binary_bytes() {
        let buf = buffer(12, &[0x08, 0x00, 0x0C, 0x00, 0, 0, 0, 0, 0, 0, 0, 0]);
        let header = RootHeader::read_from(&ByteReader::new(&buf), true).unwrap();
        assert_eq!(header.file_identifier, None);
    }

    #[test]
    fn detection_can_be_disabled() {
        let buf = buffer(12, b"MONS\0\0\0\0\0\0\0\0");
        let header = RootHeader::read_from(&ByteReader::new(&buf), false).unwrap();
        assert_eq!(header.file_identifier, None);
    }

    #[test]
    fn short_buffer_is_out_of_bounds() {
        let buf = [1u8, 2, 3];
        let err = RootHeader::read_from(&ByteReader::new(&buf), true).unwrap_err();
        assert_eq!(
            err,
            WireError::OutOfBounds {
                offset: 0,
                len: 4,
                buffer_len: 3
            }
        );
    }
}
