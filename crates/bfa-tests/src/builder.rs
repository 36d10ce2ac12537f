use std::collections::HashMap;

/// Errors raised when a fixture's labels do not resolve.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixtureError {
    #[error("label `{0}` was never placed")]
    UnknownLabel(String),

    #[error("label `{0}` was placed twice")]
    DuplicateLabel(String),

    /// The stored value would be negative or too wide for its slot.
    #[error("offset at {at:#X} cannot encode the distance to `{label}`")]
    Unreachable { at: usize, label: String },
}

#[derive(Debug)]
enum PatchKind {
    /// `target - at`, forward only.
    UOffset,
    /// `at - target`, either direction.
    SOffset,
    /// `target - table`, written into a vtable slot.
    Slot { table: String },
}

#[derive(Debug)]
struct Patch {
    at: usize,
    kind: PatchKind,
    target: String,
}

/// Forward byte-layout helper for hand-made annotation fixtures.
///
/// Bytes are appended in order. Offsets are written as placeholders naming
/// a label, and [`finish`](Self::finish) patches them once every label is
/// placed. This lays out the bytes a test wants; it does not know about
/// schemas and is not an encoder.
///
/// ```
/// use bfa_tests::FixtureBuilder;
///
/// let mut b = FixtureBuilder::new();
/// b.uoffset("table");
/// b.label("vtable").vtable_header(1, 8).slot("table", "value");
/// b.label("table").soffset("vtable");
/// b.label("value").i32(42);
/// let bytes = b.finish().unwrap();
/// assert_eq!(bytes[..4], [10, 0, 0, 0]);
/// assert_eq!(bytes[4..10], [6, 0, 8, 0, 4, 0]);
/// ```
#[derive(Debug, Default)]
pub struct FixtureBuilder {
    bytes: Vec<u8>,
    labels: HashMap<String, usize>,
    patches: Vec<Patch>,
    duplicate: Option<String>,
}

impl FixtureBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current write position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.bytes.len()
    }

    /// Name the current position.
    pub fn label(&mut self, name: &str) -> &mut Self {
        if self.labels.insert(name.to_string(), self.position()).is_some() {
            self.duplicate.get_or_insert_with(|| name.to_string());
        }
        self
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn zeros(&mut self, count: usize) -> &mut Self {
        self.bytes.resize(self.bytes.len() + count, 0);
        self
    }

    /// Zero-pad up to a multiple of `alignment`.
    pub fn align(&mut self, alignment: usize) -> &mut Self {
        let rem = self.position() % alignment;
        if rem != 0 {
            self.zeros(alignment - rem);
        }
        self
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.bytes(&[value])
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn i16(&mut self, value: i16) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn i64(&mut self, value: i64) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn f32(&mut self, value: f32) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    /// Length prefix, bytes, and the 0 terminator.
    pub fn string(&mut self, text: &str) -> &mut Self {
        let len = u32::try_from(text.len()).unwrap_or(u32::MAX);
        self.u32(len).bytes(text.as_bytes()).u8(0)
    }

    /// Vtable size and table size for a vtable of `slots` field slots.
    pub fn vtable_header(&mut self, slots: u16, table_size: u16) -> &mut Self {
        self.u16(4 + 2 * slots).u16(table_size)
    }

    /// A 4-byte forward offset to `target`.
    pub fn uoffset(&mut self, target: &str) -> &mut Self {
        self.placeholder(4, PatchKind::UOffset, target)
    }

    /// A 4-byte table-to-vtable offset to `target`.
    pub fn soffset(&mut self, target: &str) -> &mut Self {
        self.placeholder(4, PatchKind::SOffset, target)
    }

    /// A vtable slot holding the distance from label `table` to `field`.
    pub fn slot(&mut self, table: &str, field: &str) -> &mut Self {
        let kind = PatchKind::Slot {
            table: table.to_string(),
        };
        self.placeholder(2, kind, field)
    }

    /// An empty vtable slot (defaulted field).
    pub fn absent(&mut self) -> &mut Self {
        self.u16(0)
    }

    /// Resolve every placeholder and return the bytes.
    ///
    /// # Errors
    ///
    /// - [`FixtureError::DuplicateLabel`] if a label was placed twice.
    /// - [`FixtureError::UnknownLabel`] if a placeholder names a label that
    ///   was never placed.
    /// - [`FixtureError::Unreachable`] if a distance is negative where the
    ///   encoding is unsigned, or does not fit its width.
    pub fn finish(mut self) -> Result<Vec<u8>, FixtureError> {
        if let Some(name) = self.duplicate.take() {
            return Err(FixtureError::DuplicateLabel(name));
        }
        for patch in &self.patches {
            let target = self.resolve(&patch.target)?;
            let unreachable = || FixtureError::Unreachable {
                at: patch.at,
                label: patch.target.clone(),
            };
            match &patch.kind {
                PatchKind::UOffset => {
                    let value = target
                        .checked_sub(patch.at)
                        .and_then(|d| u32::try_from(d).ok())
                        .ok_or_else(unreachable)?;
                    self.bytes[patch.at..patch.at + 4].copy_from_slice(&value.to_le_bytes());
                }
                PatchKind::SOffset => {
                    let at = i64::try_from(patch.at).map_err(|_| unreachable())?;
                    let to = i64::try_from(target).map_err(|_| unreachable())?;
                    let value = i32::try_from(at - to).map_err(|_| unreachable())?;
                    self.bytes[patch.at..patch.at + 4].copy_from_slice(&value.to_le_bytes());
                }
                PatchKind::Slot { table } => {
                    let table = self.resolve(table)?;
                    let value = target
                        .checked_sub(table)
                        .and_then(|d| u16::try_from(d).ok())
                        .ok_or_else(unreachable)?;
                    self.bytes[patch.at..patch.at + 2].copy_from_slice(&value.to_le_bytes());
                }
            }
        }
        Ok(self.bytes)
    }

    fn placeholder(&mut self, width: usize, kind: PatchKind, target: &str) -> &mut Self {
        self.patches.push(Patch {
            at: self.position(),
            kind,
            target: target.to_string(),
        });
        self.zeros(width)
    }

    fn resolve(&self, label: &str) -> Result<usize, FixtureError> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| FixtureError::UnknownLabel(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_patched_relative_to_their_position() {
        let mut b = FixtureBuilder::new();
        b.zeros(4).label("vtable").u16(0).u16(0);
        b.label("table").soffset("vtable").uoffset("text");
        b.label("text").string("ab");
        let bytes = b.finish().unwrap();
        // soffset at 8: 8 - 4
        assert_eq!(bytes[8..12], 4i32.to_le_bytes());
        // uoffset at 12: 16 - 12
        assert_eq!(bytes[12..16], 4u32.to_le_bytes());
        assert_eq!(bytes[16..], [2, 0, 0, 0, b'a', b'b', 0]);
    }

    #[test]
    fn backward_uoffset_is_rejected() {
        let mut b = FixtureBuilder::new();
        b.label("start").zeros(4).uoffset("start");
        assert_eq!(
            b.finish(),
            Err(FixtureError::Unreachable {
                at: 4,
                label: "start".to_string()
            })
        );
    }

    #[test]
    fn label_errors_are_reported() {
        let mut b = FixtureBuilder::new();
        b.uoffset("nowhere");
        assert_eq!(
            b.finish(),
            Err(FixtureError::UnknownLabel("nowhere".to_string()))
        );

        let mut b = FixtureBuilder::new();
        b.label("twice").u8(0).label("twice");
        assert_eq!(
            b.finish(),
            Err(FixtureError::DuplicateLabel("twice".to_string()))
        );
    }

    #[test]
    fn align_pads_with_zeros() {
        let mut b = FixtureBuilder::new();
        b.u8(0xFF).align(4).u8(0xEE).align(2);
        assert_eq!(b.finish().unwrap(), [0xFF, 0, 0, 0, 0xEE, 0]);
    }
}
