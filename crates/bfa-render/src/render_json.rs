use bfa_annotator::{AnnotationMap, BinaryRegion, BinarySection, BinarySectionType};
use serde::Serialize;

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::value::{region_bytes, region_value};

#[derive(Serialize)]
struct Document<'a> {
    buffer_len: u64,
    sections: Vec<SectionDoc<'a>>,
    diagnostics: Vec<DiagnosticDoc>,
}

#[derive(Serialize)]
struct SectionDoc<'a> {
    offset: u64,
    length: u64,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    regions: Vec<RegionDoc<'a>>,
}

#[derive(Serialize)]
struct RegionDoc<'a> {
    offset: u64,
    length: u64,
    #[serde(rename = "type")]
    region_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    array_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    points_to: Option<u64>,
    value: String,
    comment: &'a str,
}

#[derive(Serialize)]
struct DiagnosticDoc {
    offset: Option<u64>,
    message: String,
}

/// JSON renderer: the whole map as one pretty-printed document.
///
/// ```text
/// {
///   "buffer_len": 32,
///   "sections": [ { "offset", "length", "kind", "name"?, "regions": [...] } ],
///   "diagnostics": [ { "offset", "message" } ]
/// }
/// ```
///
/// Region values are the same strings the text renderer prints, so both
/// outputs agree on how a byte range reads.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns [`RenderError::Json`] if serialization fails.
    pub fn render_all(
        map: &AnnotationMap,
        buffer: &[u8],
        config: &RenderConfig,
    ) -> Result<String, RenderError> {
        let sections = map
            .iter()
            .filter(|(_, s)| {
                config.include_padding || s.section_type != BinarySectionType::Padding
            })
            .map(|(offset, section)| section_doc(offset, section, buffer))
            .collect();
        let diagnostics = map
            .diagnostics()
            .iter()
            .map(|d| DiagnosticDoc {
                offset: d.offset(),
                message: d.to_string(),
            })
            .collect();
        let document = Document {
            buffer_len: map.buffer_len(),
            sections,
            diagnostics,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

fn section_doc<'a>(offset: u64, section: &'a BinarySection, buffer: &[u8]) -> SectionDoc<'a> {
    SectionDoc {
        offset,
        length: section.len(),
        kind: section.section_type.label(),
        name: section.name.as_deref(),
        regions: section
            .regions
            .iter()
            .map(|r| region_doc(r, buffer))
            .collect(),
    }
}

fn region_doc<'a>(region: &'a BinaryRegion, buffer: &[u8]) -> RegionDoc<'a> {
    RegionDoc {
        offset: region.offset,
        length: region.length,
        region_type: region.region_type.label(),
        array_length: region.array_length,
        points_to: region.points_to_offset,
        value: region_value(region, region_bytes(region, buffer)),
        comment: &region.comment,
    }
}
