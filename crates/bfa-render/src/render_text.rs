use bfa_annotator::{AnnotationMap, BinaryRegion, BinarySection, BinarySectionType};

use crate::config::RenderConfig;
use crate::value::{hex_bytes, region_bytes, region_value};

/// Width of the type column, enough for `?uint8_t[9999]`.
const TYPE_COLUMN_WIDTH: usize = 12;

/// Text renderer: one block per section, one aligned line per region.
///
/// Sections appear in offset order and are separated by blank lines. Any
/// diagnostics collected during annotation follow in a final block.
///
/// Example output:
///
/// ```text
/// header:
///   +0x0000 | 0C 00 00 00                 | UOffset32    | 0x0000000C (12) Loc: 0x000C | offset to root table `Root`
///
/// vtable (Root):
///   +0x0004 | 08 00                       | VOffset16    | 0x0008 (8) | size of this vtable
/// ```
pub struct TextRenderer;

impl TextRenderer {
    /// Render every section of `map` against the bytes of `buffer`.
    #[must_use]
    pub fn render_all(map: &AnnotationMap, buffer: &[u8], config: &RenderConfig) -> String {
        let mut blocks = Vec::with_capacity(map.len() + 1);
        for (_, section) in map {
            if !config.include_padding && section.section_type == BinarySectionType::Padding {
                continue;
            }
            blocks.push(Self::render_section(section, buffer, config));
        }

        if !map.diagnostics().is_empty() {
            let mut lines = vec!["diagnostics:".to_string()];
            for diagnostic in map.diagnostics() {
                lines.push(match diagnostic.offset() {
                    Some(offset) => format!("  +0x{offset:04X} | {diagnostic}"),
                    None => format!("  {diagnostic}"),
                });
            }
            blocks.push(lines.join("\n"));
        }

        let mut out = blocks.join("\n\n");
        out.push('\n');
        out
    }

    fn render_section(section: &BinarySection, buffer: &[u8], config: &RenderConfig) -> String {
        let title = match &section.name {
            Some(name) => format!("{} ({name}):", section.section_type),
            None => format!("{}:", section.section_type),
        };
        let mut lines = Vec::with_capacity(section.regions.len() + 1);
        lines.push(title);
        for region in &section.regions {
            lines.push(Self::render_region(region, buffer, config));
        }
        lines.join("\n")
    }

    fn render_region(region: &BinaryRegion, buffer: &[u8], config: &RenderConfig) -> String {
        let bytes = region_bytes(region, buffer);
        // Room for the truncation marker keeps the column fixed.
        let hex_width = config.max_hex_bytes * 3 + 3;
        let hex = hex_bytes(bytes, config.max_hex_bytes);
        let ty = match region.array_length {
            Some(count) => format!("{}[{count}]", region.region_type),
            None => region.region_type.to_string(),
        };
        let value = region_value(region, bytes);
        let line = format!(
            "  +0x{:04X} | {hex:<hex_width$} | {ty:<TYPE_COLUMN_WIDTH$} | {value} | {}",
            region.offset, region.comment
        );
        line.trim_end().to_string()
    }
}
