use std::fmt;

use serde::{Deserialize, Serialize};

/// The type tag every schema field carries.
///
/// Dispatch in the annotator is driven entirely by this tag at runtime.
/// Sizes are the inline width of the value as stored in a table or struct:
/// scalars occupy their own width, while strings, vectors, tables and
/// unions are reached through a 4-byte forward offset.
///
/// ```text
/// ┌──────┬──────────┬──────┬──────────────────────────────┐
/// │ Code │ Variant  │ Size │ Stored as                    │
/// ├──────┼──────────┼──────┼──────────────────────────────┤
/// │ 0    │ None     │ 0    │ nothing                      │
/// │ 1    │ UType    │ 1    │ union discriminant           │
/// │ 2    │ Bool     │ 1    │ scalar                       │
/// │ 3    │ Byte     │ 1    │ scalar (i8)                  │
/// │ 4    │ UByte    │ 1    │ scalar (u8)                  │
/// │ 5    │ Short    │ 2    │ scalar (i16)                 │
/// │ 6    │ UShort   │ 2    │ scalar (u16)                 │
/// │ 7    │ Int      │ 4    │ scalar (i32)                 │
/// │ 8    │ UInt     │ 4    │ scalar (u32)                 │
/// │ 9    │ Long     │ 8    │ scalar (i64)                 │
/// │ 10   │ ULong    │ 8    │ scalar (u64)                 │
/// │ 11   │ Float    │ 4    │ scalar (f32)                 │
/// │ 12   │ Double   │ 8    │ scalar (f64)                 │
/// │ 13   │ String   │ 4    │ uoffset                      │
/// │ 14   │ Vector   │ 4    │ uoffset                      │
/// │ 15   │ Obj      │ 4    │ uoffset (table) or inline    │
/// │ 16   │ Union    │ 4    │ uoffset                      │
/// │ 17   │ Array    │ 0    │ inline, struct members only  │
/// └──────┴──────────┴──────┴──────────────────────────────┘
/// ```
///
/// `Obj` reports 4 because that is its width inside a table; an inline
/// struct's width comes from its object's `bytesize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
  #[default]
  None,
  UType,
  Bool,
  Byte,
  UByte,
  Short,
  UShort,
  Int,
  UInt,
  Long,
  ULong,
  Float,
  Double,
  String,
  Vector,
  Obj,
  Union,
  Array,
}

impl BaseType {
  /// Whether the value is a fixed-width number stored inline.
  pub fn is_scalar(self) -> bool {
    matches!(
      self,
      Self::UType
        | Self::Bool
        | Self::Byte
        | Self::UByte
        | Self::Short
        | Self::UShort
        | Self::Int
        | Self::UInt
        | Self::Long
        | Self::ULong
        | Self::Float
        | Self::Double
    )
  }

  pub fn is_float(self) -> bool {
    matches!(self, Self::Float | Self::Double)
  }

  /// Whether the value is a signed integer.
  pub fn is_signed(self) -> bool {
    matches!(self, Self::Byte | Self::Short | Self::Int | Self::Long)
  }

  /// Inline width in bytes. See the table on [`BaseType`].
  pub fn size(self) -> u64 {
    match self {
      Self::None | Self::Array => 0,
      Self::UType | Self::Bool | Self::Byte | Self::UByte => 1,
      Self::Short | Self::UShort => 2,
      Self::Int
      | Self::UInt
      | Self::Float
      | Self::String
      | Self::Vector
      | Self::Obj
      | Self::Union => 4,
      Self::Long | Self::ULong | Self::Double => 8,
    }
  }

  /// The schema-language spelling of this type.
  pub fn name(self) -> &'static str {
    match self {
      Self::None => "none",
      Self::UType => "utype",
      Self::Bool => "bool",
      Self::Byte => "byte",
      Self::UByte => "ubyte",
      Self::Short => "short",
      Self::UShort => "ushort",
      Self::Int => "int",
      Self::UInt => "uint",
      Self::Long => "long",
      Self::ULong => "ulong",
      Self::Float => "float",
      Self::Double => "double",
      Self::String => "string",
      Self::Vector => "vector",
      Self::Obj => "object",
      Self::Union => "union",
      Self::Array => "array",
    }
  }
}

impl fmt::Display for BaseType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}
