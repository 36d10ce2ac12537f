use std::collections::BTreeMap;

use crate::error::AnnotateError;
use crate::region::{BinarySection, BinarySectionType};

/// The result of one annotation pass: every section keyed by its absolute
/// start offset, plus the errors that were downgraded along the way.
///
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │ AnnotationMap                                                │
/// │   sections:    BTreeMap<u64, BinarySection> ← offset-ordered │
/// │   diagnostics: Vec<AnnotateError>          ← detection order │
/// │   buffer_len:  u64                                           │
/// └──────────────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationMap {
    sections: BTreeMap<u64, BinarySection>,
    diagnostics: Vec<AnnotateError>,
    buffer_len: u64,
}

impl AnnotationMap {
    pub(crate) fn new(
        sections: BTreeMap<u64, BinarySection>,
        diagnostics: Vec<AnnotateError>,
        buffer_len: u64,
    ) -> Self {
        Self {
            sections,
            diagnostics,
            buffer_len,
        }
    }

    /// The section starting exactly at `offset`.
    #[must_use]
    pub fn get(&self, offset: u64) -> Option<&BinarySection> {
        self.sections.get(&offset)
    }

    /// Sections in offset order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &BinarySection)> {
        self.sections.iter().map(|(offset, section)| (*offset, section))
    }

    /// Sections of one kind, in offset order.
    pub fn sections_of(
        &self,
        kind: BinarySectionType,
    ) -> impl Iterator<Item = &BinarySection> {
        self.sections
            .values()
            .filter(move |section| section.section_type == kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Errors that were replaced by `Unknown` marker regions, in the
    /// order they were detected. Empty for a clean buffer.
    #[must_use]
    pub fn diagnostics(&self) -> &[AnnotateError] {
        &self.diagnostics
    }

    #[must_use]
    pub fn buffer_len(&self) -> u64 {
        self.buffer_len
    }

    /// Whether the regions of all sections, taken in order, tile
    /// `[0, buffer_len)` exactly: no gap, no overlap, nothing past the end.
    #[must_use]
    pub fn is_fully_covered(&self) -> bool {
        let mut cursor = 0;
        for (offset, section) in self.iter() {
            if offset != cursor || section.is_empty() {
                return false;
            }
            for region in &section.regions {
                if region.offset != cursor {
                    return false;
                }
                cursor = region.end();
            }
        }
        cursor == self.buffer_len
    }
}

impl<'a> IntoIterator for &'a AnnotationMap {
    type Item = (&'a u64, &'a BinarySection);
    type IntoIter = std::collections::btree_map::Iter<'a, u64, BinarySection>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{BinaryRegion, BinaryRegionType};

    fn padding(offset: u64, len: u64) -> BinarySection {
        BinarySection::new(
            BinarySectionType::Padding,
            None,
            vec![BinaryRegion::array(offset, BinaryRegionType::Uint8, len, "padding")],
        )
    }

    #[test]
    fn contiguous_sections_are_covered() {
        let sections = BTreeMap::from([(0, padding(0, 4)), (4, padding(4, 4))]);
        let map = AnnotationMap::new(sections, Vec::new(), 8);
        assert!(map.is_fully_covered());
        assert_eq!(map.sections_of(BinarySectionType::Padding).count(), 2);
    }

    #[test]
    fn gap_overlap_and_short_tail_are_not_covered() {
        let gap = BTreeMap::from([(0, padding(0, 4)), (5, padding(5, 3))]);
        assert!(!AnnotationMap::new(gap, Vec::new(), 8).is_fully_covered());

        let overlap = BTreeMap::from([(0, padding(0, 5)), (4, padding(4, 4))]);
        assert!(!AnnotationMap::new(overlap, Vec::new(), 8).is_fully_covered());

        let short = BTreeMap::from([(0, padding(0, 4))]);
        assert!(!AnnotationMap::new(short, Vec::new(), 8).is_fully_covered());
    }
}
