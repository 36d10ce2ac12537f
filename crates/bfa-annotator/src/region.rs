use std::fmt;

use bfa_schema::BaseType;

/// What the bytes of one region hold.
///
/// The three offset kinds are the format's own plumbing; the rest are the
/// scalar types a schema field can declare. `Unknown` covers bytes whose
/// meaning could not be established (error markers, unknown fields,
/// unreferenced gaps).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryRegionType {
    Unknown,
    UOffset,
    SOffset,
    VOffset,
    Bool,
    Char,
    Uint8,
    Int8,
    Uint16,
    Int16,
    Uint32,
    Int32,
    Uint64,
    Int64,
    Float,
    Double,
}

impl BinaryRegionType {
    /// The region type that stores a scalar of `base`. Non-scalar types
    /// map to `Unknown`.
    #[must_use]
    pub fn from_base_type(base: BaseType) -> Self {
        match base {
            BaseType::UType | BaseType::UByte => Self::Uint8,
            BaseType::Bool => Self::Bool,
            BaseType::Byte => Self::Int8,
            BaseType::Short => Self::Int16,
            BaseType::UShort => Self::Uint16,
            BaseType::Int => Self::Int32,
            BaseType::UInt => Self::Uint32,
            BaseType::Long => Self::Int64,
            BaseType::ULong => Self::Uint64,
            BaseType::Float => Self::Float,
            BaseType::Double => Self::Double,
            _ => Self::Unknown,
        }
    }

    /// Width of one element in bytes.
    #[must_use]
    pub fn width(self) -> u64 {
        match self {
            Self::Unknown | Self::Bool | Self::Char | Self::Uint8 | Self::Int8 => 1,
            Self::VOffset | Self::Uint16 | Self::Int16 => 2,
            Self::UOffset | Self::SOffset | Self::Uint32 | Self::Int32 | Self::Float => 4,
            Self::Uint64 | Self::Int64 | Self::Double => 8,
        }
    }

    /// C-style type name used in rendered output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "?uint8_t",
            Self::UOffset => "UOffset32",
            Self::SOffset => "SOffset32",
            Self::VOffset => "VOffset16",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::Uint8 => "uint8_t",
            Self::Int8 => "int8_t",
            Self::Uint16 => "uint16_t",
            Self::Int16 => "int16_t",
            Self::Uint32 => "uint32_t",
            Self::Int32 => "int32_t",
            Self::Uint64 => "uint64_t",
            Self::Int64 => "int64_t",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

impl fmt::Display for BinaryRegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One contiguous, typed byte range.
///
/// `array_length` is set when the region stands for N homogeneous
/// elements (a scalar vector body, a string's characters, a run of
/// padding); `length` is then `N * region_type.width()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryRegion {
    pub offset: u64,
    pub length: u64,
    pub region_type: BinaryRegionType,
    pub array_length: Option<u64>,
    /// Absolute target when the value is itself an offset.
    pub points_to_offset: Option<u64>,
    pub comment: String,
}

impl BinaryRegion {
    /// A single scalar occupying `region_type.width()` bytes.
    #[must_use]
    pub fn scalar(offset: u64, region_type: BinaryRegionType, comment: impl Into<String>) -> Self {
        Self {
            offset,
            length: region_type.width(),
            region_type,
            array_length: None,
            points_to_offset: None,
            comment: comment.into(),
        }
    }

    /// `count` consecutive elements folded into one region.
    #[must_use]
    pub fn array(
        offset: u64,
        region_type: BinaryRegionType,
        count: u64,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            offset,
            length: region_type.width().saturating_mul(count),
            region_type,
            array_length: Some(count),
            points_to_offset: None,
            comment: comment.into(),
        }
    }

    /// An offset field whose absolute target is `target`.
    #[must_use]
    pub fn pointer(
        offset: u64,
        region_type: BinaryRegionType,
        target: u64,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            points_to_offset: Some(target),
            ..Self::scalar(offset, region_type, comment)
        }
    }

    /// `length` bytes of unknown meaning.
    #[must_use]
    pub fn unknown(offset: u64, length: u64, comment: impl Into<String>) -> Self {
        Self::array(offset, BinaryRegionType::Unknown, length, comment)
    }

    /// One past the last byte.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }
}

/// The semantic unit a section represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BinarySectionType {
    Header,
    Table,
    RootTable,
    VTable,
    Struct,
    String,
    Vector,
    Union,
    Padding,
}

impl BinarySectionType {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Table => "table",
            Self::RootTable => "root_table",
            Self::VTable => "vtable",
            Self::Struct => "struct",
            Self::String => "string",
            Self::Vector => "vector",
            Self::Union => "union",
            Self::Padding => "padding",
        }
    }

    /// Kinds that hold a table instance (an soffset plus vtable-addressed
    /// fields). A table reached both as a plain field and as a union
    /// value is the same bytes, so these kinds are interchangeable for
    /// dedup.
    #[must_use]
    pub fn is_table_like(self) -> bool {
        matches!(self, Self::Table | Self::RootTable | Self::Union)
    }

    /// Every variant, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Header,
        Self::Table,
        Self::RootTable,
        Self::VTable,
        Self::Struct,
        Self::String,
        Self::Vector,
        Self::Union,
        Self::Padding,
    ];
}

impl fmt::Display for BinarySectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named group of regions forming one semantic unit, in offset order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinarySection {
    pub name: Option<String>,
    pub section_type: BinarySectionType,
    pub regions: Vec<BinaryRegion>,
}

impl BinarySection {
    #[must_use]
    pub fn new(
        section_type: BinarySectionType,
        name: Option<String>,
        regions: Vec<BinaryRegion>,
    ) -> Self {
        Self {
            name,
            section_type,
            regions,
        }
    }

    /// Offset of the first region, or 0 for an empty section.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.regions.first().map_or(0, |r| r.offset)
    }

    /// One past the last byte covered by any region.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.regions
            .iter()
            .map(BinaryRegion::end)
            .max()
            .unwrap_or_else(|| self.start())
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.end() - self.start()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
