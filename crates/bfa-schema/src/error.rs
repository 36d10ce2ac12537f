use crate::base_type::BaseType;

/// Errors raised while navigating or building a schema.
///
/// The annotator treats the schema as a read-only object graph, so these
/// errors only come from dangling indices or a layout the schema compiler
/// would have rejected. None of them carry a buffer position.
///
/// # Error hierarchy
///
/// ```text
/// ┌──────────────────────────────────────────────────────────┐
/// │ SchemaError (this crate)                                 │
/// │   ├── UnknownObject / UnknownEnum for dangling indices   │
/// │   ├── MissingTypeIndex for Obj/Union types with no index │
/// │   ├── MissingRootTable / RootIsStruct for the entry point│
/// │   ├── InvalidStructField / RecursiveStruct for layouts   │
/// │   └── EmptyStruct / UnsupportedField for unusable types  │
/// └──────────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
  /// A type referenced an object index past the end of the object list.
  #[error("object index {index} out of range ({count} objects)")]
  UnknownObject { index: usize, count: usize },

  /// A type referenced an enum index past the end of the enum list.
  #[error("enum index {index} out of range ({count} enums)")]
  UnknownEnum { index: usize, count: usize },

  /// An `Obj`, `Union` or `UType` type without the index that names its
  /// object or enum.
  #[error("{base_type} type carries no object or enum index")]
  MissingTypeIndex { base_type: BaseType },

  #[error("schema declares no root table")]
  MissingRootTable,

  /// The declared root names a struct. Structs have no vtable and cannot
  /// be the target of the root offset.
  #[error("root type `{name}` is a struct, not a table")]
  RootIsStruct { name: String },

  /// A struct member whose type cannot live inline (string, vector, table
  /// or union).
  #[error("struct `{object}` field `{field}` is not a scalar, struct or fixed array")]
  InvalidStructField { object: String, field: String },

  /// A struct that contains itself, directly or through other structs.
  #[error("struct `{name}` contains itself")]
  RecursiveStruct { name: String },

  /// A struct with no bytes. Nothing can be laid out or iterated over.
  #[error("struct `{name}` has zero size")]
  EmptyStruct { name: String },

  /// A table or vector field whose base type has no wire representation
  /// there (`None`, or `Array` outside a struct).
  #[error("field `{object}.{field}` has unsupported type {base_type}")]
  UnsupportedField {
    object: String,
    field: String,
    base_type: BaseType,
  },
}
