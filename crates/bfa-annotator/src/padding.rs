use crate::annotator::AnnotationPass;
use crate::error::AnnotateError;
use crate::region::{BinaryRegion, BinaryRegionType, BinarySection, BinarySectionType};

impl AnnotationPass<'_, '_> {
    /// Cover every byte no section claimed with a Padding section.
    ///
    /// Runs once, after the walk. Sections never overlap (see `claim`),
    /// so each gap runs from one section's end to the next one's start.
    pub(crate) fn fill_gaps(&mut self) {
        let mut gaps = Vec::new();
        let mut cursor = 0;
        for (&offset, section) in &self.sections {
            if offset > cursor {
                gaps.push((cursor, offset));
            }
            cursor = cursor.max(section.end());
        }
        let buffer_len = self.reader.len();
        if cursor < buffer_len {
            gaps.push((cursor, buffer_len));
        }

        for (start, end) in gaps {
            let region = self.gap_region(start, end);
            self.register(
                start,
                BinarySection::new(BinarySectionType::Padding, None, vec![region]),
            );
        }
    }

    /// A single region for the bytes `[start, end)`: `Uint8` padding when
    /// they are all zero, `Unknown` otherwise.
    pub(crate) fn gap_region(&self, start: u64, end: u64) -> BinaryRegion {
        let length = end - start;
        let zeroed = self
            .reader
            .slice(start, length)
            .is_ok_and(|bytes| bytes.iter().all(|&b| b == 0));
        if zeroed {
            BinaryRegion::array(start, BinaryRegionType::Uint8, length, "padding")
        } else {
            BinaryRegion::unknown(start, length, "unreferenced bytes")
        }
    }

    /// Make `regions` (sorted by offset) tile `[start, end)`: regions that
    /// overlap an earlier one or run past `end` are dropped and reported,
    /// holes become gap regions.
    pub(crate) fn close_regions(
        &mut self,
        start: u64,
        end: u64,
        regions: Vec<BinaryRegion>,
    ) -> Vec<BinaryRegion> {
        let mut closed = Vec::with_capacity(regions.len());
        let mut cursor = start;
        for region in regions {
            if region.offset < cursor || region.end() > end {
                self.note(AnnotateError::MalformedVTable {
                    offset: region.offset,
                    reason: "field overlaps another field or the end of its table",
                    value: region.length,
                });
                continue;
            }
            if region.offset > cursor {
                closed.push(self.gap_region(cursor, region.offset));
            }
            cursor = region.end();
            closed.push(region);
        }
        if cursor < end {
            closed.push(self.gap_region(cursor, end));
        }
        closed
    }
}
