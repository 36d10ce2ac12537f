use bfa_wire::read::UOFFSET_SIZE;

use crate::annotator::AnnotationPass;
use crate::error::AnnotateError;
use crate::region::{BinaryRegion, BinaryRegionType, BinarySection, BinarySectionType};

/// Strings longer than this are named after their field instead.
const MAX_NAME_CHARS: usize = 32;

impl AnnotationPass<'_, '_> {
    /// Register the String section at `offset` unless it already exists.
    ///
    /// ```text
    /// ┌──────────────┬───────────────────┬──────────────┐
    /// │ u32 length N │ N bytes of text   │ 0x00         │
    /// └──────────────┴───────────────────┴──────────────┘
    /// ```
    ///
    /// `owner` and `field` name the section when the text itself is not a
    /// usable name (empty, long, non-UTF-8 or containing control chars).
    pub(crate) fn decode_string(
        &mut self,
        offset: u64,
        owner: &str,
        field: &str,
    ) -> Result<(), AnnotateError> {
        if self.strings.contains(&offset) {
            return Ok(());
        }
        if let Some(existing) = self.sections.get(&offset) {
            return Err(AnnotateError::CycleDetected {
                offset,
                expected: BinarySectionType::String,
                found: Some(existing.section_type),
            });
        }
        self.check_not_in_progress(offset, BinarySectionType::String)?;

        let length = u64::from(self.reader.read::<u32>(offset)?);
        let content = offset + UOFFSET_SIZE;
        self.reader.check_range(content, length + 1)?;
        let text = self.reader.slice(content, length)?;
        let terminator = self.reader.read::<u8>(content + length)?;

        let mut regions = vec![BinaryRegion::scalar(
            offset,
            BinaryRegionType::Uint32,
            "length of string",
        )];
        if length > 0 {
            regions.push(BinaryRegion::array(
                content,
                BinaryRegionType::Char,
                length,
                "string literal",
            ));
        }
        let terminator_comment = if terminator == 0 {
            "string terminator".to_string()
        } else {
            format!("string terminator <expected 0x00, found {terminator:#04X}>")
        };
        regions.push(BinaryRegion::scalar(
            content + length,
            BinaryRegionType::Char,
            terminator_comment,
        ));

        let name = display_name(text).unwrap_or_else(|| format!("{owner}.{field}"));
        self.claim(offset, content + length + 1, BinarySectionType::String)?;
        self.register(
            offset,
            BinarySection::new(BinarySectionType::String, Some(name), regions),
        );
        self.strings.insert(offset);
        Ok(())
    }
}

fn display_name(text: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(text).ok()?;
    if text.is_empty() || text.chars().count() > MAX_NAME_CHARS || text.chars().any(char::is_control) {
        return None;
    }
    Some(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::display_name;

    #[test]
    fn short_printable_text_names_the_section() {
        assert_eq!(display_name(b"Sword").as_deref(), Some("Sword"));
        assert_eq!(display_name(b"").as_deref(), None);
        assert_eq!(display_name(b"line\nbreak").as_deref(), None);
        assert_eq!(display_name(&[0xFF, 0xFE]).as_deref(), None);
        assert_eq!(display_name(&[b'a'; 33]).as_deref(), None);
    }
}
