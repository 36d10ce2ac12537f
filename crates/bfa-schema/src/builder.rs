use crate::base_type::BaseType;
use crate::error::SchemaError;
use crate::schema::{Enum, EnumId, EnumVal, Field, Object, ObjectId, Schema, Type};

/// Incrementally assembles a [`Schema`] in code.
///
/// Field ids are assigned in declaration order. Union fields expand to the
/// hidden discriminant twin (`<name>_type`, id `n`) followed by the value
/// field (id `n + 1`), the same pairing a schema compiler emits. Struct
/// layouts (member offsets, padding, `bytesize`, `minalign`) are computed
/// by [`build`](Self::build) using natural alignment.
///
/// ```
/// use bfa_schema::{BaseType, SchemaBuilder, Type};
///
/// let mut builder = SchemaBuilder::new();
/// let vec3 = builder.structure("Vec3");
/// builder.field(vec3, "x", Type::scalar(BaseType::Float));
/// builder.field(vec3, "y", Type::scalar(BaseType::Float));
/// let monster = builder.table("Monster");
/// builder.field(monster, "pos", Type::object(vec3));
/// builder.field(monster, "hp", Type::scalar(BaseType::Short)).default_integer = 100;
/// builder.root(monster);
///
/// let schema = builder.build().unwrap();
/// assert_eq!(schema.objects[vec3.0].bytesize, 8);
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
  objects: Vec<Object>,
  enums: Vec<Enum>,
  root: Option<ObjectId>,
  file_ident: Option<String>,
}

impl SchemaBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Declare a table.
  pub fn table(&mut self, name: &str) -> ObjectId {
    self.push_object(name, false)
  }

  /// Declare a struct. Its layout is computed at build time.
  pub fn structure(&mut self, name: &str) -> ObjectId {
    self.push_object(name, true)
  }

  /// Declare a plain enum over an integer type.
  pub fn enumeration(&mut self, name: &str, underlying: BaseType, values: &[(&str, i64)]) -> EnumId {
    let values = values
      .iter()
      .map(|(name, value)| EnumVal { name: (*name).to_string(), value: *value, union_type: None })
      .collect();
    self.push_enum(Enum {
      name: name.to_string(),
      values,
      is_union: false,
      underlying_type: Type::scalar(underlying),
    })
  }

  /// Declare a union. `NONE = 0` is added first; the listed variants take
  /// discriminants 1, 2, ... in order.
  pub fn union(&mut self, name: &str, variants: &[(&str, Type)]) -> EnumId {
    let mut values = vec![EnumVal { name: "NONE".to_string(), value: 0, union_type: None }];
    values.extend(variants.iter().zip(1..).map(|((name, ty), value)| EnumVal {
      name: (*name).to_string(),
      value,
      union_type: Some(*ty),
    }));
    let id = EnumId(self.enums.len());
    self.push_enum(Enum {
      name: name.to_string(),
      values,
      is_union: true,
      underlying_type: Type::enum_scalar(BaseType::UType, id),
    })
  }

  /// Append a field to `owner` and return it for further adjustment
  /// (defaults, `deprecated`, `optional`).
  ///
  /// # Panics
  ///
  /// Panics if `owner` was not returned by this builder.
  pub fn field(&mut self, owner: ObjectId, name: &str, ty: Type) -> &mut Field {
    let object = &mut self.objects[owner.0];
    let companion = match (ty.base_type, ty.element) {
      (BaseType::Union, _) => Some(Type { base_type: BaseType::UType, ..Type::default() }),
      (BaseType::Vector, BaseType::Union) => Some(Type::vector_of(BaseType::UType)),
      _ => None,
    };
    if let Some(mut companion) = companion {
      companion.index = ty.index;
      let id = object.slot_count();
      object.fields.push(Self::new_field(object.is_struct, format!("{name}_type"), id, companion));
    }
    let id = object.slot_count();
    object.fields.push(Self::new_field(object.is_struct, name.to_string(), id, ty));
    let last = object.fields.len() - 1;
    &mut object.fields[last]
  }

  pub fn root(&mut self, id: ObjectId) -> &mut Self {
    self.root = Some(id);
    self
  }

  pub fn file_identifier(&mut self, ident: &str) -> &mut Self {
    self.file_ident = Some(ident.to_string());
    self
  }

  /// Compute struct layouts and produce the schema.
  ///
  /// # Errors
  ///
  /// - [`SchemaError::InvalidStructField`] for a struct member that cannot
  ///   be stored inline.
  /// - [`SchemaError::RecursiveStruct`] for a struct that contains itself.
  /// - [`SchemaError::EmptyStruct`] for a struct with no bytes.
  /// - [`SchemaError::UnknownObject`] / [`SchemaError::MissingTypeIndex`]
  ///   for a member naming a missing object.
  pub fn build(mut self) -> Result<Schema, SchemaError> {
    let mut states = vec![LayoutState::Pending; self.objects.len()];
    for index in 0..self.objects.len() {
      if self.objects[index].is_struct {
        layout_struct(&mut self.objects, &mut states, index)?;
      }
    }
    Ok(Schema {
      objects: self.objects,
      enums: self.enums,
      root_table: self.root,
      file_ident: self.file_ident,
    })
  }

  fn push_object(&mut self, name: &str, is_struct: bool) -> ObjectId {
    self.objects.push(Object {
      name: name.to_string(),
      fields: Vec::new(),
      is_struct,
      minalign: 1,
      bytesize: 0,
    });
    ObjectId(self.objects.len() - 1)
  }

  fn push_enum(&mut self, value: Enum) -> EnumId {
    self.enums.push(value);
    EnumId(self.enums.len() - 1)
  }

  fn new_field(is_struct: bool, name: String, id: u16, ty: Type) -> Field {
    let mut field = Field::new(name, id, ty);
    if !is_struct {
      field.offset = id.saturating_mul(2).saturating_add(4);
    }
    field
  }
}

#[derive(Clone, Copy)]
enum LayoutState {
  Pending,
  InProgress,
  Done { size: u32, align: u16 },
}

fn align_up(value: u32, align: u16) -> u32 {
  let align = u32::from(align.max(1));
  value.div_ceil(align) * align
}

fn scalar_width(base: BaseType) -> u16 {
  u16::try_from(base.size()).unwrap_or(0)
}

fn layout_struct(
  objects: &mut [Object],
  states: &mut [LayoutState],
  index: usize,
) -> Result<(u32, u16), SchemaError> {
  match states[index] {
    LayoutState::Done { size, align } => return Ok((size, align)),
    LayoutState::InProgress => {
      return Err(SchemaError::RecursiveStruct { name: objects[index].name.clone() });
    }
    LayoutState::Pending => {}
  }
  states[index] = LayoutState::InProgress;

  let types: Vec<Type> = objects[index].fields.iter().map(|f| f.ty).collect();
  let mut members = Vec::with_capacity(types.len());
  for (field_index, ty) in types.iter().enumerate() {
    let invalid = SchemaError::InvalidStructField {
      object: objects[index].name.clone(),
      field: objects[index].fields[field_index].name.clone(),
    };
    let member = match ty.base_type {
      base if base.is_scalar() => {
        let width = scalar_width(base);
        (u32::from(width), width)
      }
      BaseType::Obj => nested_struct(objects, states, ty, invalid)?,
      BaseType::Array if ty.element.is_scalar() => {
        let width = scalar_width(ty.element);
        (u32::from(width) * u32::from(ty.fixed_length), width)
      }
      BaseType::Array if ty.element == BaseType::Obj => {
        let (size, align) = nested_struct(objects, states, &ty.element_type(), invalid)?;
        (size * u32::from(ty.fixed_length), align)
      }
      _ => return Err(invalid),
    };
    members.push(member);
  }

  let object = &mut objects[index];
  let mut offset = 0u32;
  let mut minalign = 1u16;
  for (i, (size, align)) in members.iter().copied().enumerate() {
    let aligned = align_up(offset, align);
    if i > 0 {
      object.fields[i - 1].padding = u16::try_from(aligned - offset).unwrap_or(u16::MAX);
    }
    object.fields[i].offset = u16::try_from(aligned).unwrap_or(u16::MAX);
    object.fields[i].padding = 0;
    offset = aligned + size;
    minalign = minalign.max(align);
  }
  let bytesize = align_up(offset, minalign);
  if bytesize == 0 {
    return Err(SchemaError::EmptyStruct { name: object.name.clone() });
  }
  if let Some(last) = object.fields.last_mut() {
    last.padding = u16::try_from(bytesize - offset).unwrap_or(u16::MAX);
  }
  object.bytesize = bytesize;
  object.minalign = minalign;

  states[index] = LayoutState::Done { size: bytesize, align: minalign };
  Ok((bytesize, minalign))
}

fn nested_struct(
  objects: &mut [Object],
  states: &mut [LayoutState],
  ty: &Type,
  invalid: SchemaError,
) -> Result<(u32, u16), SchemaError> {
  let nested = ty.index.ok_or(SchemaError::MissingTypeIndex { base_type: ty.base_type })?;
  let target = objects.get(nested).ok_or(SchemaError::UnknownObject {
    index: nested,
    count: objects.len(),
  })?;
  if !target.is_struct {
    return Err(invalid);
  }
  layout_struct(objects, states, nested)
}
