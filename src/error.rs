use crate::codec::DecodeError;

/// All error conditions reported by the stripification pipeline.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum StripError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Non-manifold edge ({}, {}) shared by triangles {triangles:?}", .edge.0, .edge.1)]
    NonManifoldGeometry { edge: (u32, u32), triangles: Vec<u32> },
    #[error("Encoding mismatch: {0}")]
    EncodingMismatch(String),
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StripError>;

/// A recoverable data-quality condition found while building adjacency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// More than two triangles reference `edge`; `triangle` was left unconnected across it.
    NonManifoldEdge { edge: (u32, u32), triangle: u32 },
    /// The triangle repeats a vertex and was routed to the list group.
    DegenerateTriangle { triangle: u32 },
}
