use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use bfa_schema::{BaseType, Field, ObjectId, Schema};
use bfa_wire::read::UOFFSET_SIZE;
use bfa_wire::{ByteReader, RootHeader};
use tracing::{debug, warn};

use crate::config::AnnotatorConfig;
use crate::error::AnnotateError;
use crate::map::AnnotationMap;
use crate::region::{BinaryRegion, BinaryRegionType, BinarySection, BinarySectionType};
use crate::vtable::VTable;

/// Schema-driven annotator: maps every byte of a buffer to a typed region.
///
/// Annotation proceeds in four steps:
///
///   1. **Root**: Look up the schema's root table and read the 4-byte root
///      offset (plus the optional file identifier) into a Header section.
///   2. **Walk**: Decode the root table, which recursively decodes every
///      table, struct, string, vector and union reachable from it. Each
///      decoder registers its section in one offset-keyed map; vtables and
///      strings shared by several referents are registered once.
///   3. **Gap fill**: Close every hole between sections with a Padding
///      section, so the map covers `[0, buffer_len)`.
///   4. **Report**: Return the map together with the errors that were
///      downgraded during the walk.
///
/// Only a failure to lay out the root table itself aborts the call.
/// Anything found deeper (a bad field offset, an unknown union variant, a
/// cycle) becomes an `Unknown` region in the enclosing section and an
/// entry in [`AnnotationMap::diagnostics`].
///
/// # Example
///
/// ```rust
/// use bfa_annotator::{BinaryAnnotator, BinarySectionType};
/// use bfa_schema::{BaseType, SchemaBuilder, Type};
///
/// let mut builder = SchemaBuilder::new();
/// let root = builder.table("Root");
/// builder.field(root, "value", Type::scalar(BaseType::Int));
/// builder.root(root);
/// let schema = builder.build().unwrap();
///
/// #[rustfmt::skip]
/// let buffer = [
///     12, 0, 0, 0,        // root offset → 12
///     0, 0,               // padding
///     6, 0, 8, 0, 4, 0,   // vtable: 6 bytes, table 8 bytes, value at +4
///     6, 0, 0, 0,         // soffset → vtable at 6
///     42, 0, 0, 0,        // value
/// ];
/// let map = BinaryAnnotator::annotate(&schema, &buffer).unwrap();
/// assert!(map.is_fully_covered());
/// assert_eq!(map.get(12).unwrap().section_type, BinarySectionType::RootTable);
/// ```
pub struct BinaryAnnotator;

impl BinaryAnnotator {
    /// Annotate `buffer` with the default [`AnnotatorConfig`].
    ///
    /// # Errors
    ///
    /// - [`AnnotateError::Schema`] if the schema has no usable root table.
    /// - [`AnnotateError::OutOfBounds`] if the buffer is shorter than the
    ///   root offset, or the root table or its vtable lie outside it.
    /// - [`AnnotateError::MalformedVTable`] if the root vtable is
    ///   inconsistent.
    /// - [`AnnotateError::CycleDetected`] if the root table's vtable
    ///   offset resolves back onto the root table.
    /// - [`AnnotateError::DepthLimitExceeded`] if `max_depth` is 0.
    pub fn annotate(schema: &Schema, buffer: &[u8]) -> Result<AnnotationMap, AnnotateError> {
        Self::annotate_with_config(schema, buffer, &AnnotatorConfig::default())
    }

    /// Annotate `buffer` with explicit limits.
    ///
    /// # Errors
    ///
    /// Same as [`annotate`](Self::annotate).
    pub fn annotate_with_config(
        schema: &Schema,
        buffer: &[u8],
        config: &AnnotatorConfig,
    ) -> Result<AnnotationMap, AnnotateError> {
        AnnotationPass::new(schema, buffer, *config).run()
    }
}

/// Call-scoped state of one annotation. Nothing here outlives `run`.
pub(crate) struct AnnotationPass<'s, 'b> {
    pub(crate) schema: &'s Schema,
    pub(crate) reader: ByteReader<'b>,
    pub(crate) config: AnnotatorConfig,
    pub(crate) sections: BTreeMap<u64, BinarySection>,
    /// Byte ranges reserved by registered sections and by tables and
    /// vectors still being decoded: start → (end, kind).
    pub(crate) claimed: BTreeMap<u64, (u64, BinarySectionType)>,
    /// Offsets of tables and vectors on the current decode path.
    pub(crate) in_progress: BTreeSet<u64>,
    /// Parsed vtables, keyed by (vtable offset, reading object).
    pub(crate) vtables: HashMap<(u64, ObjectId), Rc<VTable<'s>>>,
    /// Offsets already registered as String sections.
    pub(crate) strings: BTreeSet<u64>,
    pub(crate) diagnostics: Vec<AnnotateError>,
    depth: usize,
}

impl<'s, 'b> AnnotationPass<'s, 'b> {
    fn new(schema: &'s Schema, buffer: &'b [u8], config: AnnotatorConfig) -> Self {
        Self {
            schema,
            reader: ByteReader::new(buffer),
            config,
            sections: BTreeMap::new(),
            claimed: BTreeMap::new(),
            in_progress: BTreeSet::new(),
            vtables: HashMap::new(),
            strings: BTreeSet::new(),
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    fn run(mut self) -> Result<AnnotationMap, AnnotateError> {
        // 1. Root table and header.
        let (root_id, root) = self.schema.root_table()?;
        debug!(
            buffer_len = self.reader.len(),
            root = %root.name,
            "annotation started"
        );
        let header = RootHeader::read_from(&self.reader, self.config.detect_file_identifier)?;
        debug!(
            root_offset = header.root_offset,
            identifier = header.identifier_str().unwrap_or(""),
            "header read"
        );
        let mut regions = vec![BinaryRegion::pointer(
            0,
            BinaryRegionType::UOffset,
            header.root_offset,
            format!("offset to root table `{}`", root.name),
        )];
        if header.file_identifier.is_some() {
            regions.push(BinaryRegion::array(
                UOFFSET_SIZE,
                BinaryRegionType::Char,
                4,
                "file identifier",
            ));
        }
        self.claim(0, header.size(), BinarySectionType::Header)?;
        self.register(0, BinarySection::new(BinarySectionType::Header, None, regions));

        // 2. Recursive walk from the root.
        self.decode_table(header.root_offset, root_id, BinarySectionType::RootTable)?;

        // 3. Gap fill.
        self.fill_gaps();

        debug!(
            sections = self.sections.len(),
            diagnostics = self.diagnostics.len(),
            "annotation finished"
        );
        Ok(AnnotationMap::new(
            self.sections,
            self.diagnostics,
            self.reader.len(),
        ))
    }

    /// Insert `section` at `offset` unless something is already there.
    pub(crate) fn register(&mut self, offset: u64, section: BinarySection) {
        debug!(
            offset,
            kind = %section.section_type,
            name = section.name.as_deref().unwrap_or(""),
            regions = section.regions.len(),
            "section registered"
        );
        self.sections.entry(offset).or_insert(section);
    }

    /// Reserve `[offset, end)` for a section of `kind`.
    ///
    /// Fails with [`AnnotateError::Overlap`] when the range intersects a
    /// range reserved earlier. Tables and vectors claim their bytes before
    /// decoding what they point to, so a child reaching back into its
    /// parent is caught as well.
    pub(crate) fn claim(
        &mut self,
        offset: u64,
        end: u64,
        kind: BinarySectionType,
    ) -> Result<(), AnnotateError> {
        let below = self
            .claimed
            .range(..=offset)
            .next_back()
            .filter(|&(_, &(claimed_end, _))| claimed_end > offset);
        let clash = below.or_else(|| self.claimed.range(offset..end).next());
        if let Some((&found_at, &(_, found))) = clash {
            return Err(AnnotateError::Overlap {
                offset,
                expected: kind,
                found,
                found_at,
            });
        }
        self.claimed.insert(offset, (end, kind));
        Ok(())
    }

    /// Run `decode` one nesting level deeper.
    ///
    /// Fails with [`AnnotateError::DepthLimitExceeded`] at the configured
    /// ceiling. With `on_stack`, `offset` is held in the in-progress set for
    /// the duration, so a revisit from inside is seen as a cycle.
    pub(crate) fn nested<T>(
        &mut self,
        offset: u64,
        on_stack: bool,
        decode: impl FnOnce(&mut Self) -> Result<T, AnnotateError>,
    ) -> Result<T, AnnotateError> {
        if self.depth >= self.config.max_depth {
            return Err(AnnotateError::DepthLimitExceeded {
                offset,
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        if on_stack {
            self.in_progress.insert(offset);
        }
        let result = decode(self);
        if on_stack {
            self.in_progress.remove(&offset);
        }
        self.depth -= 1;
        result
    }

    /// Fail with `CycleDetected` if `offset` is on the current decode path.
    pub(crate) fn check_not_in_progress(
        &self,
        offset: u64,
        expected: BinarySectionType,
    ) -> Result<(), AnnotateError> {
        if self.in_progress.contains(&offset) {
            return Err(AnnotateError::CycleDetected {
                offset,
                expected,
                found: None,
            });
        }
        Ok(())
    }

    /// Record `error` and return the `Unknown` marker region that stands in
    /// for the `width` bytes at `at`, clipped to `limit`.
    pub(crate) fn downgrade(
        &mut self,
        error: AnnotateError,
        at: u64,
        width: u64,
        limit: u64,
        what: &str,
    ) -> BinaryRegion {
        warn!(offset = at, error = %error, "{what}: replaced by an error marker");
        let length = width.min(limit.saturating_sub(at)).max(1);
        let region = BinaryRegion::unknown(at, length, format!("{what} <error: {error}>"));
        self.diagnostics.push(error);
        region
    }

    /// Record `error` without producing a region.
    pub(crate) fn note(&mut self, error: AnnotateError) {
        warn!(offset = error.offset(), error = %error, "annotation issue");
        self.diagnostics.push(error);
    }

    /// Bytes a field occupies inside its table or struct.
    pub(crate) fn inline_width(&self, field: &Field) -> u64 {
        match field.ty.base_type {
            BaseType::Obj => match self.schema.object_of(&field.ty) {
                Ok((_, object)) if object.is_struct => u64::from(object.bytesize),
                _ => UOFFSET_SIZE,
            },
            base => base.size(),
        }
    }

    /// Read an integer-like scalar of type `base` as `i64`.
    pub(crate) fn read_integer(&self, at: u64, base: BaseType) -> Result<i64, AnnotateError> {
        Ok(match base {
            BaseType::UType | BaseType::Bool | BaseType::UByte => i64::from(self.reader.read::<u8>(at)?),
            BaseType::Byte => i64::from(self.reader.read::<i8>(at)?),
            BaseType::Short => i64::from(self.reader.read::<i16>(at)?),
            BaseType::UShort => i64::from(self.reader.read::<u16>(at)?),
            BaseType::Int => i64::from(self.reader.read::<i32>(at)?),
            BaseType::UInt => i64::from(self.reader.read::<u32>(at)?),
            BaseType::Long => self.reader.read::<i64>(at)?,
            BaseType::ULong => i64::from_le_bytes(self.reader.read::<u64>(at)?.to_le_bytes()),
            _ => 0,
        })
    }
}
