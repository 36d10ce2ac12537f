use bfa_schema::{BaseType, Field, Object};

use crate::annotator::AnnotationPass;
use crate::error::AnnotateError;
use crate::region::{BinarySection, BinarySectionType};
use crate::vtable::VTable;

impl<'s> AnnotationPass<'s, '_> {
    /// The discriminant stored in the twin field (id - 1) of a union
    /// field. An absent twin reads as `NONE`.
    pub(crate) fn union_discriminant(
        &self,
        table_offset: u64,
        field: &Field,
        vtable: &VTable<'_>,
    ) -> Result<u8, AnnotateError> {
        match field.id.checked_sub(1).and_then(|id| vtable.slot(id)) {
            Some(slot) => Ok(self.reader.read::<u8>(table_offset + slot)?),
            None => Ok(0),
        }
    }

    /// Decode the value of `field` selected by `discriminant` at `offset`
    /// and return the variant's name.
    ///
    /// `at` is where the union's offset is stored and is the position
    /// reported for an unresolved discriminant. Table targets are
    /// registered with kind `Union` (or reuse an existing table section),
    /// struct targets become a `Union` section holding the struct's
    /// regions, string targets go through the string decoder.
    pub(crate) fn decode_union(
        &mut self,
        offset: u64,
        at: u64,
        discriminant: u8,
        owner: &str,
        field: &'s Field,
    ) -> Result<&'s str, AnnotateError> {
        let schema = self.schema;
        let (_, union) = schema.enum_of(&field.ty)?;
        let unresolved = || AnnotateError::UnresolvedUnion {
            offset: at,
            discriminant,
            union_name: union.name.clone(),
        };
        let variant = union
            .lookup(i64::from(discriminant))
            .ok_or_else(unresolved)?;
        let Some(target_type) = &variant.union_type else {
            return Err(unresolved());
        };

        match target_type.base_type {
            BaseType::Obj => {
                let (target_id, target) = schema.object_of(target_type)?;
                if target.is_struct {
                    self.decode_union_struct(offset, target)?;
                } else {
                    self.decode_table(offset, target_id, BinarySectionType::Union)?;
                }
            }
            BaseType::String => self.decode_string(offset, owner, &field.name)?,
            _ => return Err(unresolved()),
        }
        Ok(&variant.name)
    }

    fn decode_union_struct(&mut self, offset: u64, target: &'s Object) -> Result<(), AnnotateError> {
        if let Some(existing) = self.sections.get(&offset) {
            if existing.section_type == BinarySectionType::Union {
                return Ok(());
            }
            return Err(AnnotateError::CycleDetected {
                offset,
                expected: BinarySectionType::Union,
                found: Some(existing.section_type),
            });
        }
        self.check_not_in_progress(offset, BinarySectionType::Union)?;
        let (regions, end) = self.decode_struct(offset, target)?;
        self.claim(offset, end, BinarySectionType::Union)?;
        self.register(
            offset,
            BinarySection::new(BinarySectionType::Union, Some(target.name.clone()), regions),
        );
        Ok(())
    }
}
