// error.rs - Engine error taxonomy
//
// Only a missing drawing context is meant to reach the embedder. Degenerate
// surfaces are logged and self-heal on the next valid resize.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Generation was asked to scatter particles over a zero-area surface.
    #[error("degenerate surface {width}x{height}")]
    DegenerateSurface { width: u32, height: u32 },

    /// The host surface could not hand out a drawable context.
    #[error("drawing context unavailable: {0}")]
    MissingDrawingContext(String),

    #[error("invalid color {0:?}")]
    InvalidColor(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
