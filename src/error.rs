//! Error kinds surfaced by the facade, per spec.md §7.

/// Errors the pipeline can raise. Every operation that can fail surfaces one
/// of these synchronously and aborts; none is recovered internally.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NavError {
    /// The world rectangle passed to [`crate::Nav2D::new`] has area < 1 unit².
    #[error("world bounding rectangle has area {area} < 1 unit^2")]
    InvalidWorld { area: f32 },

    /// A polygon failed the validator in [`crate::validator`]: too few
    /// vertices, clockwise winding, or non-convex.
    #[error("invalid polygon: {reason}")]
    InvalidPolygon { reason: String },

    /// A rectangle with zero extent was passed to the quadtree.
    #[error("degenerate (zero-extent) bounds passed to the quadtree")]
    DegenerateBounds,

    /// The offset or clip engine returned no usable ring when one was
    /// expected.
    #[error("offset/clip engine failure: {reason}")]
    EngineFailure { reason: String },
}
