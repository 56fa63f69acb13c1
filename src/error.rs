//! Crate error type for invalid-input aborts. Silent no-ops (empty path,
//! invalid buffer on render) stay silent; these are the cases a caller
//! can meaningfully react to.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("document size must be positive, got {width}x{height}")]
    InvalidDocumentSize { width: f64, height: f64 },

    #[error("target raster dimension must be positive, got {0}")]
    InvalidTargetDimension(i32),

    #[error("render buffer is invalid")]
    InvalidBuffer,

    #[error("depth map input must be at least 3x3, got {width}x{height}")]
    UndersizedDepthMap { width: i32, height: i32 },
}
