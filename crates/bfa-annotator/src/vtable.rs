use std::collections::BTreeMap;
use std::rc::Rc;

use bfa_schema::{Field, Object, ObjectId};
use bfa_wire::read::{SOFFSET_SIZE, VOFFSET_SIZE};

use crate::annotator::AnnotationPass;
use crate::error::AnnotateError;
use crate::region::{BinaryRegion, BinaryRegionType, BinarySection, BinarySectionType};

/// Bytes before the first field slot: vtable size and table size.
const VTABLE_HEADER_SIZE: u64 = 4;

#[derive(Clone, Copy, Debug)]
pub(crate) struct VTableEntry<'s> {
    pub(crate) field: &'s Field,
    pub(crate) offset_from_table: u16,
}

/// A parsed vtable as seen by one object type.
#[derive(Debug)]
pub(crate) struct VTable<'s> {
    pub(crate) vtable_size: u16,
    pub(crate) table_size: u16,
    /// Known fields with a non-zero slot that lies inside the table.
    pub(crate) fields: BTreeMap<u16, VTableEntry<'s>>,
    /// Non-zero slots past the schema's fields: (id, offset from table).
    pub(crate) unknown: Vec<(u16, u16)>,
}

impl VTable<'_> {
    /// Offset of field `id` from the table start, if present.
    pub(crate) fn slot(&self, id: u16) -> Option<u64> {
        self.fields
            .get(&id)
            .map(|entry| u64::from(entry.offset_from_table))
    }
}

impl<'s> AnnotationPass<'s, '_> {
    /// Parse the vtable at `offset` for a table of type `object`, or return
    /// the cached parse.
    ///
    /// The VTable section is registered the first time the offset is seen,
    /// whichever object reads it. Slots that point outside the table are
    /// kept in the section (commented) but dropped from the entry map and
    /// reported as diagnostics.
    pub(crate) fn resolve_vtable(
        &mut self,
        offset: u64,
        object_id: ObjectId,
        object: &'s Object,
    ) -> Result<Rc<VTable<'s>>, AnnotateError> {
        if let Some(cached) = self.vtables.get(&(offset, object_id)) {
            return Ok(Rc::clone(cached));
        }
        if let Some(existing) = self.sections.get(&offset)
            && existing.section_type != BinarySectionType::VTable
        {
            return Err(AnnotateError::CycleDetected {
                offset,
                expected: BinarySectionType::VTable,
                found: Some(existing.section_type),
            });
        }
        self.check_not_in_progress(offset, BinarySectionType::VTable)?;

        let malformed = |reason: &'static str, value: u64| AnnotateError::MalformedVTable {
            offset,
            reason,
            value,
        };
        let vtable_size = self.reader.read_voffset(offset)?;
        if u64::from(vtable_size) < VTABLE_HEADER_SIZE || vtable_size % 2 != 0 {
            return Err(malformed(
                "vtable size must be even and at least 4",
                u64::from(vtable_size),
            ));
        }
        if self.reader.check_range(offset, u64::from(vtable_size)).is_err() {
            return Err(malformed(
                "vtable extends past the end of the buffer",
                u64::from(vtable_size),
            ));
        }
        let table_size = self.reader.read_voffset(offset + VOFFSET_SIZE)?;
        if u64::from(table_size) < SOFFSET_SIZE {
            return Err(malformed(
                "table size smaller than its vtable offset",
                u64::from(table_size),
            ));
        }
        let slot_count = (vtable_size - 4) / 2;
        let limit = object
            .slot_count()
            .saturating_add(self.config.unknown_field_allowance);
        if slot_count > limit {
            return Err(malformed(
                "more field slots than the schema allows",
                u64::from(slot_count),
            ));
        }

        let shared = self.sections.contains_key(&offset);
        if !shared {
            let end = offset + u64::from(vtable_size);
            self.claim(offset, end, BinarySectionType::VTable)?;
        }

        let mut regions = vec![
            BinaryRegion::scalar(offset, BinaryRegionType::VOffset, "size of this vtable"),
            BinaryRegion::scalar(
                offset + VOFFSET_SIZE,
                BinaryRegionType::VOffset,
                "size of referring table",
            ),
        ];
        let mut fields = BTreeMap::new();
        let mut unknown = Vec::new();
        for id in 0..slot_count {
            let at = offset + VTABLE_HEADER_SIZE + u64::from(id) * VOFFSET_SIZE;
            let slot = self.reader.read_voffset(at)?;
            let field = object.field_by_id(id);
            let mut comment = slot_comment(field, id, slot);
            if slot != 0 {
                let width = field.map_or(1, |f| self.inline_width(f));
                let start = u64::from(slot);
                if start < SOFFSET_SIZE || start + width > u64::from(table_size) {
                    comment.push_str(" <outside table>");
                    self.note(AnnotateError::MalformedVTable {
                        offset: at,
                        reason: "field slot lies outside its table",
                        value: start,
                    });
                } else if let Some(field) = field {
                    fields.insert(
                        id,
                        VTableEntry {
                            field,
                            offset_from_table: slot,
                        },
                    );
                } else {
                    unknown.push((id, slot));
                }
            }
            regions.push(BinaryRegion::scalar(at, BinaryRegionType::VOffset, comment));
        }

        if !shared {
            self.register(
                offset,
                BinarySection::new(
                    BinarySectionType::VTable,
                    Some(object.name.clone()),
                    regions,
                ),
            );
        }
        let vtable = Rc::new(VTable {
            vtable_size,
            table_size,
            fields,
            unknown,
        });
        self.vtables.insert((offset, object_id), Rc::clone(&vtable));
        Ok(vtable)
    }
}

fn slot_comment(field: Option<&Field>, id: u16, slot: u16) -> String {
    match field {
        None if slot == 0 => format!("offset to unknown field (id: {id}) <absent>"),
        None => format!("offset to unknown field (id: {id})"),
        Some(f) if f.deprecated => format!("offset to deprecated field `{}` (id: {id})", f.name),
        Some(f) if slot == 0 => {
            let default = if f.optional {
                "<null> (optional)".to_string()
            } else {
                f.default_text()
                    .map_or_else(|| "<null>".to_string(), |text| format!("<defaults to {text}>"))
            };
            format!("offset to field `{}` (id: {id}) {default}", f.name)
        }
        Some(f) => format!("offset to field `{}` (id: {id})", f.name),
    }
}
