use bfa_schema::SchemaError;
use bfa_wire::WireError;

use crate::region::BinarySectionType;

/// Errors that can occur while annotating a buffer.
///
/// Every variant except [`Schema`](Self::Schema) records the buffer offset
/// at which the problem was detected (see [`offset`](Self::offset)).
/// Whether an error aborts the whole call depends on where it happens:
/// failures resolving the root table's own layout are returned from
/// [`BinaryAnnotator::annotate`](crate::BinaryAnnotator::annotate), all
/// others are downgraded to an `Unknown` marker region and collected in
/// [`AnnotationMap::diagnostics`](crate::AnnotationMap::diagnostics).
///
/// Error hierarchy:
///
/// ```text
///   AnnotateError
///   ├── OutOfBounds(WireError)   ← a computed read range leaves the buffer
///   ├── UnresolvedUnion          ← discriminant with no matching variant
///   ├── MalformedVTable          ← vtable sizes inconsistent or truncated
///   ├── CycleDetected            ← offset revisited as a different kind
///   ├── Overlap                  ← section reaches into another section
///   ├── DepthLimitExceeded       ← nesting deeper than `max_depth`
///   └── Schema(SchemaError)      ← dangling object/enum index in the schema
/// ```
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AnnotateError {
    #[error(transparent)]
    OutOfBounds(#[from] WireError),

    /// The twin discriminant field holds a value the union does not
    /// declare, or `NONE` alongside a present value field.
    #[error("union `{union_name}` has no variant for discriminant {discriminant} (at {offset:#X})")]
    UnresolvedUnion {
        offset: u64,
        discriminant: u8,
        union_name: String,
    },

    /// The vtable at `offset` cannot describe the table that points at it.
    #[error("malformed vtable at {offset:#X}: {reason} ({value})")]
    MalformedVTable {
        offset: u64,
        reason: &'static str,
        value: u64,
    },

    /// An offset was reached again while still being decoded, or was
    /// already registered as a section of an incompatible kind.
    #[error("cycle at {offset:#X}: expected {expected}, found {}", describe_found(.found))]
    CycleDetected {
        offset: u64,
        expected: BinarySectionType,
        found: Option<BinarySectionType>,
    },

    /// A section would start or end inside the bytes of another one.
    #[error("{expected} at {offset:#X} overlaps {found} at {found_at:#X}")]
    Overlap {
        offset: u64,
        expected: BinarySectionType,
        found: BinarySectionType,
        found_at: u64,
    },

    #[error("nesting depth limit {limit} exceeded at {offset:#X}")]
    DepthLimitExceeded { offset: u64, limit: usize },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl AnnotateError {
    /// The buffer offset at which the error was detected. Schema lookup
    /// failures have no position and return `None`.
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::OutOfBounds(wire) => Some(wire.offset()),
            Self::UnresolvedUnion { offset, .. }
            | Self::MalformedVTable { offset, .. }
            | Self::CycleDetected { offset, .. }
            | Self::Overlap { offset, .. }
            | Self::DepthLimitExceeded { offset, .. } => Some(*offset),
            Self::Schema(_) => None,
        }
    }
}

#[allow(clippy::ref_option)]
fn describe_found(found: &Option<BinarySectionType>) -> String {
    match found {
        Some(kind) => kind.to_string(),
        None => "an object still being decoded".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_reported() {
        let wire = AnnotateError::from(WireError::OutOfBounds {
            offset: 0x10,
            len: 4,
            buffer_len: 8,
        });
        assert_eq!(wire.offset(), Some(0x10));

        let cycle = AnnotateError::CycleDetected {
            offset: 0x20,
            expected: BinarySectionType::Table,
            found: None,
        };
        assert_eq!(cycle.offset(), Some(0x20));
        assert_eq!(
            cycle.to_string(),
            "cycle at 0x20: expected table, found an object still being decoded"
        );

        let overlap = AnnotateError::Overlap {
            offset: 0x1C,
            expected: BinarySectionType::String,
            found: BinarySectionType::String,
            found_at: 0x18,
        };
        assert_eq!(overlap.offset(), Some(0x1C));
        assert_eq!(overlap.to_string(), "string at 0x1C overlaps string at 0x18");

        let schema = AnnotateError::from(SchemaError::MissingRootTable);
        assert_eq!(schema.offset(), None);
    }

    #[test]
    fn out_of_bounds_displays_wire_message() {
        let err = AnnotateError::from(WireError::OutOfBounds {
            offset: 4,
            len: 4,
            buffer_len: 4,
        });
        assert_eq!(
            err.to_string(),
            "read of 4 bytes at offset 0x4 exceeds buffer length 4"
        );
    }
}
