use bfa_schema::{BaseType, Field, Object, ObjectId, SchemaError, Type};
use tracing::debug;

use crate::annotator::AnnotationPass;
use crate::error::AnnotateError;
use crate::region::{BinaryRegion, BinaryRegionType, BinarySection, BinarySectionType};
use crate::vtable::VTable;

impl<'s> AnnotationPass<'s, '_> {
    /// Decode the table at `offset` and register it as `kind`.
    ///
    /// A table-like section already at `offset` is reused as is: shared
    /// subtrees are decoded once, and a revisit through a back-reference
    /// stops here instead of recursing. An offset still on the decode path,
    /// or taken by a section of another kind, is a cycle. Table bytes that
    /// reach into any other section are an overlap.
    pub(crate) fn decode_table(
        &mut self,
        offset: u64,
        object_id: ObjectId,
        kind: BinarySectionType,
    ) -> Result<(), AnnotateError> {
        if let Some(existing) = self.sections.get(&offset) {
            if existing.section_type.is_table_like() {
                return Ok(());
            }
            return Err(AnnotateError::CycleDetected {
                offset,
                expected: kind,
                found: Some(existing.section_type),
            });
        }
        self.check_not_in_progress(offset, kind)?;
        let schema = self.schema;
        let object = schema.object(object_id)?;
        self.nested(offset, true, |pass| {
            pass.decode_table_body(offset, object_id, object, kind)
        })
    }

    fn decode_table_body(
        &mut self,
        offset: u64,
        object_id: ObjectId,
        object: &'s Object,
        kind: BinarySectionType,
    ) -> Result<(), AnnotateError> {
        let vtable_offset = self.reader.read_soffset(offset)?;
        let vtable = self.resolve_vtable(vtable_offset, object_id, object)?;
        let table_size = u64::from(vtable.table_size);
        self.reader.check_range(offset, table_size)?;
        let table_end = offset + table_size;
        self.claim(offset, table_end, kind)?;
        debug!(
            offset,
            vtable = vtable_offset,
            vtable_size = vtable.vtable_size,
            table_size,
            object = %object.name,
            "table layout resolved"
        );

        let mut regions = vec![BinaryRegion::pointer(
            offset,
            BinaryRegionType::SOffset,
            vtable_offset,
            "offset to vtable",
        )];
        for entry in vtable.fields.values() {
            let field = entry.field;
            if field.deprecated {
                continue;
            }
            let position = offset + u64::from(entry.offset_from_table);
            match self.decode_field(offset, object, field, position, &vtable) {
                Ok(field_regions) => regions.extend(field_regions),
                Err(error) => {
                    let width = self.inline_width(field);
                    let what = format!("table field `{}`", field.name);
                    let marker = self.downgrade(error, position, width, table_end, &what);
                    regions.push(marker);
                }
            }
        }

        regions.sort_by_key(|r| r.offset);
        add_unknown_fields(offset, table_end, &vtable, &mut regions);
        let regions = self.close_regions(offset, table_end, regions);
        self.register(
            offset,
            BinarySection::new(kind, Some(object.name.clone()), regions),
        );
        Ok(())
    }

    /// Annotate one present field whose value starts at `position`.
    fn decode_field(
        &mut self,
        table_offset: u64,
        object: &'s Object,
        field: &'s Field,
        position: u64,
        vtable: &VTable<'s>,
    ) -> Result<Vec<BinaryRegion>, AnnotateError> {
        let schema = self.schema;
        let name = &field.name;
        match field.ty.base_type {
            base if base.is_scalar() => {
                let label = format!("table field `{name}`");
                Ok(vec![self.scalar_region(position, &field.ty, &label)?])
            }
            BaseType::Obj => {
                let (target_id, target) = schema.object_of(&field.ty)?;
                if target.is_struct {
                    let (regions, _) = self.decode_struct(position, target)?;
                    return Ok(regions);
                }
                let target_offset = self.reader.read_uoffset(position)?;
                self.decode_table(target_offset, target_id, BinarySectionType::Table)?;
                Ok(vec![BinaryRegion::pointer(
                    position,
                    BinaryRegionType::UOffset,
                    target_offset,
                    format!("offset to field `{name}` (table `{}`)", target.name),
                )])
            }
            BaseType::String => {
                let target_offset = self.reader.read_uoffset(position)?;
                self.decode_string(target_offset, &object.name, name)?;
                Ok(vec![BinaryRegion::pointer(
                    position,
                    BinaryRegionType::UOffset,
                    target_offset,
                    format!("offset to field `{name}` (string)"),
                )])
            }
            BaseType::Vector => {
                let target_offset = self.reader.read_uoffset(position)?;
                self.decode_vector(target_offset, table_offset, object, field, vtable)?;
                Ok(vec![BinaryRegion::pointer(
                    position,
                    BinaryRegionType::UOffset,
                    target_offset,
                    format!("offset to field `{name}` (vector)"),
                )])
            }
            BaseType::Union => {
                let discriminant = self.union_discriminant(table_offset, field, vtable)?;
                let target_offset = self.reader.read_uoffset(position)?;
                let variant =
                    self.decode_union(target_offset, position, discriminant, &object.name, field)?;
                Ok(vec![BinaryRegion::pointer(
                    position,
                    BinaryRegionType::UOffset,
                    target_offset,
                    format!("offset to field `{name}` (union of type `{variant}`)"),
                )])
            }
            base => Err(SchemaError::UnsupportedField {
                object: object.name.clone(),
                field: name.clone(),
                base_type: base,
            }
            .into()),
        }
    }

    /// One scalar at `position`, with the enum value name appended when the
    /// type is enum-backed.
    pub(crate) fn scalar_region(
        &self,
        position: u64,
        ty: &Type,
        label: &str,
    ) -> Result<BinaryRegion, AnnotateError> {
        let base = ty.base_type;
        let region_type = BinaryRegionType::from_base_type(base);
        self.reader.check_range(position, region_type.width())?;
        let mut comment = format!("{label} ({base})");
        if ty.index.is_some() && !base.is_float() {
            let (_, values) = self.schema.enum_of(ty)?;
            let value = self.read_integer(position, base)?;
            if let Some(named) = values.lookup(value) {
                comment = format!("{comment} <{}>", named.name);
            }
        }
        Ok(BinaryRegion::scalar(position, region_type, comment))
    }

    /// Decode the struct stored inline at `position`.
    ///
    /// Returns its regions (members, nested members, fixed arrays and
    /// padding, in layout order) and the offset one past its last byte.
    /// The section map is never touched; the caller folds the regions
    /// into its own section.
    pub(crate) fn decode_struct(
        &mut self,
        position: u64,
        object: &'s Object,
    ) -> Result<(Vec<BinaryRegion>, u64), AnnotateError> {
        self.nested(position, false, |pass| pass.decode_struct_body(position, object))
    }

    fn decode_struct_body(
        &mut self,
        position: u64,
        object: &'s Object,
    ) -> Result<(Vec<BinaryRegion>, u64), AnnotateError> {
        let schema = self.schema;
        self.reader.check_range(position, u64::from(object.bytesize))?;

        let mut regions = Vec::new();
        let mut cursor = position;
        for field in object.ordered_fields() {
            let ty = &field.ty;
            let invalid = || SchemaError::InvalidStructField {
                object: object.name.clone(),
                field: field.name.clone(),
            };
            match ty.base_type {
                base if base.is_scalar() => {
                    let label = format!("struct field `{}.{}`", object.name, field.name);
                    regions.push(self.scalar_region(cursor, ty, &label)?);
                    cursor += base.size();
                }
                BaseType::Obj => {
                    let (_, nested) = schema.object_of(ty)?;
                    if !nested.is_struct {
                        return Err(invalid().into());
                    }
                    let (inner, end) = self.decode_struct(cursor, nested)?;
                    regions.extend(inner);
                    cursor = end;
                }
                BaseType::Array if ty.element.is_scalar() => {
                    let count = u64::from(ty.fixed_length);
                    let region = BinaryRegion::array(
                        cursor,
                        BinaryRegionType::from_base_type(ty.element),
                        count,
                        format!(
                            "array field `{}.{}` ({}[{count}])",
                            object.name, field.name, ty.element
                        ),
                    );
                    cursor = region.end();
                    if count > 0 {
                        regions.push(region);
                    }
                }
                BaseType::Array if ty.element == BaseType::Obj => {
                    let (_, nested) = schema.object_of(ty)?;
                    if !nested.is_struct {
                        return Err(invalid().into());
                    }
                    for _ in 0..ty.fixed_length {
                        let (inner, end) = self.decode_struct(cursor, nested)?;
                        regions.extend(inner);
                        cursor = end;
                    }
                }
                _ => return Err(invalid().into()),
            }
            if field.padding > 0 {
                let padding = BinaryRegion::array(
                    cursor,
                    BinaryRegionType::Uint8,
                    u64::from(field.padding),
                    "padding",
                );
                cursor = padding.end();
                regions.push(padding);
            }
        }
        self.reader.check_range(position, cursor - position)?;
        Ok((regions, cursor))
    }
}

/// Annotate slots the schema does not know. Each one extends to the next
/// region (or slot) boundary, or to the end of the table.
fn add_unknown_fields(
    offset: u64,
    table_end: u64,
    vtable: &VTable<'_>,
    regions: &mut Vec<BinaryRegion>,
) {
    if vtable.unknown.is_empty() {
        return;
    }
    let unknown_starts: Vec<u64> = vtable
        .unknown
        .iter()
        .map(|&(_, slot)| offset + u64::from(slot))
        .collect();
    let mut added = Vec::new();
    for (&(id, _), &at) in vtable.unknown.iter().zip(&unknown_starts) {
        if regions.iter().any(|r| r.offset <= at && at < r.end()) {
            continue;
        }
        let next = regions
            .iter()
            .map(|r| r.offset)
            .chain(unknown_starts.iter().copied())
            .filter(|&start| start > at)
            .min()
            .unwrap_or(table_end)
            .min(table_end);
        let length = next - at;
        let hint = if length == 4 { " <possibly an offset>" } else { "" };
        added.push(BinaryRegion::unknown(
            at,
            length,
            format!("unknown field (id: {id}){hint}"),
        ));
    }
    regions.extend(added);
    regions.sort_by_key(|r| r.offset);
}
