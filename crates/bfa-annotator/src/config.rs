/// Limits and switches for one annotation pass.
///
/// ```text
/// ┌─────────────────────────┬─────────┬──────────────────────────────────────┐
/// │ Field                   │ Default │ Purpose                              │
/// ├─────────────────────────┼─────────┼──────────────────────────────────────┤
/// │ max_depth               │ 64      │ Ceiling on table/vector/union/struct │
/// │                         │         │ nesting before DepthLimitExceeded    │
/// │ unknown_field_allowance │ 64      │ Extra vtable slots accepted beyond   │
/// │                         │         │ the schema's field count             │
/// │ detect_file_identifier  │ true    │ Claim bytes 4..8 as an identifier    │
/// │                         │         │ when they are printable ASCII        │
/// └─────────────────────────┴─────────┴──────────────────────────────────────┘
/// ```
///
/// Buffers are often produced by a newer schema than the one used to read
/// them, so a vtable may legitimately carry slots this schema does not
/// know. `unknown_field_allowance` bounds how many are tolerated before
/// the vtable is reported as malformed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnnotatorConfig {
    pub max_depth: usize,
    pub unknown_field_allowance: u16,
    pub detect_file_identifier: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            unknown_field_allowance: 64,
            detect_file_identifier: true,
        }
    }
}
