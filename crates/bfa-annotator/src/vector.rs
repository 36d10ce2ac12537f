use bfa_schema::{BaseType, Field, Object, SchemaError, Type};
use bfa_wire::read::UOFFSET_SIZE;

use crate::annotator::AnnotationPass;
use crate::error::AnnotateError;
use crate::region::{BinaryRegion, BinaryRegionType, BinarySection, BinarySectionType};
use crate::vtable::VTable;

impl<'s, 'b> AnnotationPass<'s, 'b> {
    /// Decode the vector that `field` of the table at `table_offset` points
    /// to and register it as a Vector section.
    ///
    /// Element layout depends on the element type:
    ///
    /// ```text
    /// ┌──────────────────────────┬──────────────────────────────────────┐
    /// │ Element                  │ Annotated as                         │
    /// ├──────────────────────────┼──────────────────────────────────────┤
    /// │ scalar                   │ one region, array_length = count     │
    /// │ struct                   │ inline struct regions per element    │
    /// │ table / string / union   │ one uoffset per element; targets get │
    /// │                          │ their own sections                   │
    /// └──────────────────────────┴──────────────────────────────────────┘
    /// ```
    ///
    /// A failing indirect element is replaced by an error marker and the
    /// remaining elements are still decoded. A twin discriminant vector
    /// that cannot be read fails the whole vector with the read error.
    pub(crate) fn decode_vector(
        &mut self,
        offset: u64,
        table_offset: u64,
        owner: &'s Object,
        field: &'s Field,
        vtable: &VTable<'s>,
    ) -> Result<(), AnnotateError> {
        if let Some(existing) = self.sections.get(&offset) {
            if existing.section_type == BinarySectionType::Vector {
                return Ok(());
            }
            return Err(AnnotateError::CycleDetected {
                offset,
                expected: BinarySectionType::Vector,
                found: Some(existing.section_type),
            });
        }
        self.check_not_in_progress(offset, BinarySectionType::Vector)?;
        self.nested(offset, true, |pass| {
            pass.decode_vector_body(offset, table_offset, owner, field, vtable)
        })
    }

    fn decode_vector_body(
        &mut self,
        offset: u64,
        table_offset: u64,
        owner: &'s Object,
        field: &'s Field,
        vtable: &VTable<'s>,
    ) -> Result<(), AnnotateError> {
        let count = u64::from(self.reader.read::<u32>(offset)?);
        let elements = offset + UOFFSET_SIZE;
        let element = field.ty.element_type();
        let span = count * self.element_width(&element, owner, field)?;
        self.reader.check_range(elements, span)?;
        self.claim(offset, elements + span, BinarySectionType::Vector)?;

        let mut regions = vec![BinaryRegion::scalar(
            offset,
            BinaryRegionType::Uint32,
            "length of vector (# items)",
        )];
        let decoded = self.decode_elements(
            elements,
            count,
            &element,
            table_offset,
            owner,
            field,
            vtable,
            &mut regions,
        );
        if let Err(error) = decoded {
            self.claimed.remove(&offset);
            return Err(error);
        }

        self.register(
            offset,
            BinarySection::new(
                BinarySectionType::Vector,
                Some(format!("{}.{}", owner.name, field.name)),
                regions,
            ),
        );
        Ok(())
    }

    /// Bytes one element occupies in the vector body.
    fn element_width(
        &self,
        element: &Type,
        owner: &Object,
        field: &Field,
    ) -> Result<u64, AnnotateError> {
        match element.base_type {
            base if base.is_scalar() => Ok(base.size()),
            BaseType::Obj => {
                let (_, target) = self.schema.object_of(element)?;
                match (target.is_struct, target.bytesize) {
                    (false, _) => Ok(UOFFSET_SIZE),
                    (true, 0) => Err(SchemaError::EmptyStruct {
                        name: target.name.clone(),
                    }
                    .into()),
                    (true, size) => Ok(u64::from(size)),
                }
            }
            BaseType::String | BaseType::Union => Ok(UOFFSET_SIZE),
            base => Err(SchemaError::UnsupportedField {
                object: owner.name.clone(),
                field: field.name.clone(),
                base_type: base,
            }
            .into()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn decode_elements(
        &mut self,
        elements: u64,
        count: u64,
        element: &Type,
        table_offset: u64,
        owner: &'s Object,
        field: &'s Field,
        vtable: &VTable<'s>,
        regions: &mut Vec<BinaryRegion>,
    ) -> Result<(), AnnotateError> {
        let schema = self.schema;
        match element.base_type {
            base if base.is_scalar() => {
                if count > 0 {
                    regions.push(BinaryRegion::array(
                        elements,
                        BinaryRegionType::from_base_type(base),
                        count,
                        format!("items of `{}` ({base})", field.name),
                    ));
                }
            }
            BaseType::Obj => {
                let (target_id, target) = schema.object_of(element)?;
                if target.is_struct {
                    let size = u64::from(target.bytesize);
                    for index in 0..count {
                        let (inner, _) = self.decode_struct(elements + index * size, target)?;
                        regions.extend(inner);
                    }
                } else {
                    self.indirect_elements(elements, count, regions, |pass, at, index| {
                        let target_offset = pass.reader.read_uoffset(at)?;
                        pass.decode_table(target_offset, target_id, BinarySectionType::Table)?;
                        Ok(BinaryRegion::pointer(
                            at,
                            BinaryRegionType::UOffset,
                            target_offset,
                            format!("offset to table `{}` [{index}]", target.name),
                        ))
                    });
                }
            }
            BaseType::String => {
                self.indirect_elements(elements, count, regions, |pass, at, index| {
                    let target_offset = pass.reader.read_uoffset(at)?;
                    pass.decode_string(target_offset, &owner.name, &field.name)?;
                    Ok(BinaryRegion::pointer(
                        at,
                        BinaryRegionType::UOffset,
                        target_offset,
                        format!("offset to string [{index}]"),
                    ))
                });
            }
            BaseType::Union => {
                let types = self.union_types(table_offset, field, vtable)?;
                self.indirect_elements(elements, count, regions, |pass, at, index| {
                    let discriminant = usize::try_from(index)
                        .ok()
                        .and_then(|i| types.get(i))
                        .copied()
                        .unwrap_or(0);
                    let target_offset = pass.reader.read_uoffset(at)?;
                    let variant =
                        pass.decode_union(target_offset, at, discriminant, &owner.name, field)?;
                    Ok(BinaryRegion::pointer(
                        at,
                        BinaryRegionType::UOffset,
                        target_offset,
                        format!("offset to union [{index}] (`{variant}`)"),
                    ))
                });
            }
            // Rejected by `element_width`.
            _ => {}
        }
        Ok(())
    }

    /// Walk `count` uoffset elements starting at `elements`, replacing any
    /// element whose `decode` fails with an error marker. The caller has
    /// already checked that the elements lie inside the buffer.
    fn indirect_elements(
        &mut self,
        elements: u64,
        count: u64,
        regions: &mut Vec<BinaryRegion>,
        mut decode: impl FnMut(&mut Self, u64, u64) -> Result<BinaryRegion, AnnotateError>,
    ) {
        let end = elements + count * UOFFSET_SIZE;
        for index in 0..count {
            let at = elements + index * UOFFSET_SIZE;
            let region = match decode(self, at, index) {
                Ok(region) => region,
                Err(error) => {
                    let what = format!("vector element [{index}]");
                    self.downgrade(error, at, UOFFSET_SIZE, end, &what)
                }
            };
            regions.push(region);
        }
    }

    /// The discriminant bytes of a union vector, read from its twin
    /// `UType` vector at id - 1. Empty when the twin is absent.
    fn union_types(
        &self,
        table_offset: u64,
        field: &Field,
        vtable: &VTable<'_>,
    ) -> Result<&'b [u8], AnnotateError> {
        let Some(slot) = field.id.checked_sub(1).and_then(|id| vtable.slot(id)) else {
            return Ok(&[]);
        };
        let types = self.reader.read_uoffset(table_offset + slot)?;
        let count = u64::from(self.reader.read::<u32>(types)?);
        Ok(self.reader.slice(types + UOFFSET_SIZE, count)?)
    }
}
