/// Settings for rendering an [`AnnotationMap`](bfa_annotator::AnnotationMap).
///
/// ```text
/// ┌─────────────────┬─────────┬───────────────────────────────────────────┐
/// │ Field           │ Default │ Purpose                                   │
/// ├─────────────────┼─────────┼───────────────────────────────────────────┤
/// │ mode            │ Text    │ Text listing or JSON document             │
/// │ include_padding │ true    │ Emit Padding sections                     │
/// │ max_hex_bytes   │ 8       │ Raw bytes shown per region before " ..."  │
/// └─────────────────┴─────────┴───────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    pub mode: OutputMode,
    pub include_padding: bool,
    pub max_hex_bytes: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::Text,
            include_padding: true,
            max_hex_bytes: 8,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// One block per section, one aligned line per region.
    Text,
    /// A pretty-printed JSON document.
    Json,
}
