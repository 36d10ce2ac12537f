/// Errors that can occur while rendering an annotation map.
///
/// ```text
/// ┌────────────────┬──────────────────────────────────────────────────┐
/// │ Variant        │ Cause                                            │
/// ├────────────────┼──────────────────────────────────────────────────┤
/// │ BufferMismatch │ Buffer is not the one the map was produced from  │
/// │ Json           │ serde_json failed to serialize the document      │
/// └────────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("buffer is {actual} bytes but the annotation map covers {expected}")]
    BufferMismatch { expected: u64, actual: u64 },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
