use bfa_annotator::AnnotationMap;

use crate::config::{OutputMode, RenderConfig};
use crate::error::RenderError;
use crate::render_json::JsonRenderer;
use crate::render_text::TextRenderer;

/// Turns an [`AnnotationMap`] and the buffer it describes into output.
///
/// The map holds offsets and types only; the buffer supplies the bytes
/// shown next to each region. Implementations are stateless, all choices
/// come through [`RenderConfig`].
///
/// ```text
/// AnnotationMap + &[u8] ──▶ AnnotationRenderer::render() ──▶ String
///                                   │
///                             RenderConfig
///                     (mode, include_padding, max_hex_bytes)
/// ```
pub trait AnnotationRenderer {
    /// # Errors
    ///
    /// Returns [`RenderError::BufferMismatch`] if `buffer` is not the
    /// length the map was built for.
    fn render(
        &self,
        map: &AnnotationMap,
        buffer: &[u8],
        config: &RenderConfig,
    ) -> Result<String, RenderError>;
}

/// Checks the buffer against the map, then dispatches on
/// [`RenderConfig::mode`] to [`TextRenderer`] or [`JsonRenderer`].
pub struct DefaultRenderer;

impl AnnotationRenderer for DefaultRenderer {
    fn render(
        &self,
        map: &AnnotationMap,
        buffer: &[u8],
        config: &RenderConfig,
    ) -> Result<String, RenderError> {
        let actual = buffer.len() as u64;
        if actual != map.buffer_len() {
            return Err(RenderError::BufferMismatch {
                expected: map.buffer_len(),
                actual,
            });
        }
        match config.mode {
            OutputMode::Text => Ok(TextRenderer::render_all(map, buffer, config)),
            OutputMode::Json => JsonRenderer::render_all(map, buffer, config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfa_annotator::BinaryAnnotator;
    use bfa_schema::{BaseType, Schema, SchemaBuilder, Type};

    fn schema() -> Schema {
        let mut b = SchemaBuilder::new();
        let root = b.table("Root");
        b.field(root, "value", Type::scalar(BaseType::Int));
        b.root(root);
        b.build().unwrap()
    }

    #[rustfmt::skip]
    const BUFFER: [u8; 20] = [
        12, 0, 0, 0,
        0, 0,
        6, 0, 8, 0, 4, 0,
        6, 0, 0, 0,
        42, 0, 0, 0,
    ];

    #[test]
    fn mismatched_buffer_is_rejected() {
        let map = BinaryAnnotator::annotate(&schema(), &BUFFER).unwrap();
        let result = DefaultRenderer.render(&map, &BUFFER[..16], &RenderConfig::default());
        assert!(matches!(
            result,
            Err(RenderError::BufferMismatch {
                expected: 20,
                actual: 16
            })
        ));
    }

    #[test]
    fn mode_selects_the_renderer() {
        let map = BinaryAnnotator::annotate(&schema(), &BUFFER).unwrap();
        let text = DefaultRenderer
            .render(&map, &BUFFER, &RenderConfig::default())
            .unwrap();
        assert!(text.starts_with("header:\n"));

        let config = RenderConfig {
            mode: OutputMode::Json,
            ..RenderConfig::default()
        };
        let json = DefaultRenderer.render(&map, &BUFFER, &config).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.contains("\"kind\": \"root_table\""));
    }
}
