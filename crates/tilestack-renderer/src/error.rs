use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Layer '{0}' not found")]
    UnknownLayer(String),

    #[error("Layer '{0}' already exists")]
    DuplicateLayer(String),

    #[error("Invalid map settings: {0}")]
    InvalidSettings(String),

    #[error("Cannot allocate a {width}x{height} pixel buffer")]
    BufferAllocation { width: u32, height: u32 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
