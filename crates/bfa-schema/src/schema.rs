use serde::{Deserialize, Serialize};

use crate::base_type::BaseType;
use crate::error::SchemaError;

/// Index of an [`Object`] in [`Schema::objects`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub usize);

/// Index of an [`Enum`] in [`Schema::enums`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumId(pub usize);

/// The full type of a field.
///
/// `element` is only meaningful for `Vector` and `Array`. `index` names
/// the object (for `Obj`, or a vector/array of `Obj`) or the enum (for
/// `Union`, `UType`, vectors of either, and enum-typed scalars).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Type {
  pub base_type: BaseType,
  #[serde(default)]
  pub element: BaseType,
  #[serde(default)]
  pub index: Option<usize>,
  /// Element count of a struct-member `Array`.
  #[serde(default)]
  pub fixed_length: u16,
}

impl Type {
  pub fn scalar(base_type: BaseType) -> Self {
    Self { base_type, ..Self::default() }
  }

  /// A scalar whose values are named by an enum.
  pub fn enum_scalar(underlying: BaseType, id: EnumId) -> Self {
    Self { base_type: underlying, index: Some(id.0), ..Self::default() }
  }

  pub fn string() -> Self {
    Self::scalar(BaseType::String)
  }

  /// A table reference or an inline struct, depending on the object.
  pub fn object(id: ObjectId) -> Self {
    Self { base_type: BaseType::Obj, index: Some(id.0), ..Self::default() }
  }

  pub fn union(id: EnumId) -> Self {
    Self { base_type: BaseType::Union, index: Some(id.0), ..Self::default() }
  }

  pub fn vector_of(element: BaseType) -> Self {
    Self { base_type: BaseType::Vector, element, ..Self::default() }
  }

  pub fn vector_of_objects(id: ObjectId) -> Self {
    Self { base_type: BaseType::Vector, element: BaseType::Obj, index: Some(id.0), fixed_length: 0 }
  }

  pub fn vector_of_unions(id: EnumId) -> Self {
    Self { base_type: BaseType::Vector, element: BaseType::Union, index: Some(id.0), fixed_length: 0 }
  }

  pub fn array_of(element: BaseType, len: u16) -> Self {
    Self { base_type: BaseType::Array, element, index: None, fixed_length: len }
  }

  pub fn array_of_structs(id: ObjectId, len: u16) -> Self {
    Self { base_type: BaseType::Array, element: BaseType::Obj, index: Some(id.0), fixed_length: len }
  }

  /// The type of one element of this vector or array.
  pub fn element_type(&self) -> Self {
    Self { base_type: self.element, element: BaseType::None, index: self.index, fixed_length: 0 }
  }
}

/// One field of a table or struct.
///
/// For table fields `offset` is the vtable slot position (`4 + 2 * id`);
/// for struct fields it is the byte offset inside the struct, and
/// `padding` counts the alignment bytes that follow the field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
  pub name: String,
  pub id: u16,
  #[serde(rename = "type")]
  pub ty: Type,
  #[serde(default)]
  pub offset: u16,
  #[serde(default)]
  pub padding: u16,
  #[serde(default)]
  pub deprecated: bool,
  /// Scalar declared with a `null` default.
  #[serde(default)]
  pub optional: bool,
  #[serde(default)]
  pub default_integer: i64,
  #[serde(default)]
  pub default_real: f64,
}

impl Field {
  pub fn new(name: impl Into<String>, id: u16, ty: Type) -> Self {
    Self {
      name: name.into(),
      id,
      ty,
      offset: 0,
      padding: 0,
      deprecated: false,
      optional: false,
      default_integer: 0,
      default_real: 0.0,
    }
  }

  /// The schema default rendered as text, for fields whose vtable slot
  /// is zero. Non-scalar fields have no default and return `None`.
  pub fn default_text(&self) -> Option<String> {
    let base = self.ty.base_type;
    if !base.is_scalar() {
      return None;
    }
    Some(match base {
      BaseType::Float | BaseType::Double => self.default_real.to_string(),
      BaseType::Bool => (self.default_integer != 0).to_string(),
      _ => self.default_integer.to_string(),
    })
  }
}

/// A table or struct definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Object {
  pub name: String,
  pub fields: Vec<Field>,
  #[serde(default)]
  pub is_struct: bool,
  /// Alignment of the struct (1 for tables).
  #[serde(default = "default_minalign")]
  pub minalign: u16,
  /// Inline size of a struct in bytes (0 for tables).
  #[serde(default)]
  pub bytesize: u32,
}

fn default_minalign() -> u16 {
  1
}

impl Object {
  /// Fields in the order their bytes are laid out: by id for tables, by
  /// offset for structs.
  pub fn ordered_fields(&self) -> Vec<&Field> {
    let mut fields: Vec<&Field> = self.fields.iter().collect();
    if self.is_struct {
      fields.sort_by_key(|f| f.offset);
    } else {
      fields.sort_by_key(|f| f.id);
    }
    fields
  }

  pub fn field_by_id(&self, id: u16) -> Option<&Field> {
    self.fields.iter().find(|f| f.id == id)
  }

  /// One past the highest field id, i.e. the number of vtable slots the
  /// schema knows about.
  pub fn slot_count(&self) -> u16 {
    self.fields.iter().map(|f| f.id.saturating_add(1)).max().unwrap_or(0)
  }
}

/// A named value of an enum or a variant of a union.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumVal {
  pub name: String,
  pub value: i64,
  /// Target type of a union variant (`Obj` or `String`).
  #[serde(default)]
  pub union_type: Option<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enum {
  pub name: String,
  pub values: Vec<EnumVal>,
  #[serde(default)]
  pub is_union: bool,
  #[serde(default)]
  pub underlying_type: Type,
}

impl Enum {
  pub fn lookup(&self, value: i64) -> Option<&EnumVal> {
    self.values.iter().find(|v| v.value == value)
  }
}

/// The read-only object graph the annotator walks.
///
/// Deserializable from JSON so callers can hand over a schema produced by
/// any external compiler. Indices inside [`Type`] are checked lazily,
/// when the annotator first follows them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
  pub objects: Vec<Object>,
  #[serde(default)]
  pub enums: Vec<Enum>,
  #[serde(default)]
  pub root_table: Option<ObjectId>,
  #[serde(default)]
  pub file_ident: Option<String>,
}

impl Schema {
  /// # Errors
  ///
  /// [`SchemaError::UnknownObject`] if `id` is out of range.
  pub fn object(&self, id: ObjectId) -> Result<&Object, SchemaError> {
    self.objects.get(id.0).ok_or(SchemaError::UnknownObject {
      index: id.0,
      count: self.objects.len(),
    })
  }

  /// # Errors
  ///
  /// [`SchemaError::UnknownEnum`] if `id` is out of range.
  pub fn enumeration(&self, id: EnumId) -> Result<&Enum, SchemaError> {
    self.enums.get(id.0).ok_or(SchemaError::UnknownEnum {
      index: id.0,
      count: self.enums.len(),
    })
  }

  /// The table the root offset points at.
  ///
  /// # Errors
  ///
  /// - [`SchemaError::MissingRootTable`] if no root is declared.
  /// - [`SchemaError::UnknownObject`] if the root index dangles.
  /// - [`SchemaError::RootIsStruct`] if the root is a struct.
  pub fn root_table(&self) -> Result<(ObjectId, &Object), SchemaError> {
    let id = self.root_table.ok_or(SchemaError::MissingRootTable)?;
    let object = self.object(id)?;
    if object.is_struct {
      return Err(SchemaError::RootIsStruct { name: object.name.clone() });
    }
    Ok((id, object))
  }

  /// The object a type's `index` refers to.
  ///
  /// # Errors
  ///
  /// [`SchemaError::MissingTypeIndex`] or [`SchemaError::UnknownObject`].
  pub fn object_of(&self, ty: &Type) -> Result<(ObjectId, &Object), SchemaError> {
    let index = ty.index.ok_or(SchemaError::MissingTypeIndex { base_type: ty.base_type })?;
    let id = ObjectId(index);
    Ok((id, self.object(id)?))
  }

  /// The enum a type's `index` refers to.
  ///
  /// # Errors
  ///
  /// [`SchemaError::MissingTypeIndex`] or [`SchemaError::UnknownEnum`].
  pub fn enum_of(&self, ty: &Type) -> Result<(EnumId, &Enum), SchemaError> {
    let index = ty.index.ok_or(SchemaError::MissingTypeIndex { base_type: ty.base_type })?;
    let id = EnumId(index);
    Ok((id, self.enumeration(id)?))
  }
}
