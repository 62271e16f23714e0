//! Error types for wellplate-grid

use crate::geometry::Axis;
use thiserror::Error;

/// Errors that can occur while calibrating or segmenting a plate
///
/// Every variant is terminal: a failed run produces no mask, composite,
/// or well images.
#[derive(Debug, Error)]
pub enum GridError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] wellplate_core::Error),

    /// Invalid plate layout or parameter
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The user chose to abort at preset selection
    #[error("aborted at plate selection")]
    Aborted,

    /// The fitted grid does not match the image aspect ratio
    #[error("{axis} geometry mismatch of about {mismatch_pixels:.1} pixels")]
    GeometryValidation { axis: Axis, mismatch_pixels: f64 },

    /// A well would be less than one pixel wide or high
    #[error("degenerate well size: {diameter_w:.3} x {diameter_h:.3}")]
    DegenerateGeometry { diameter_w: f64, diameter_h: f64 },

    /// No usable image region
    #[error("missing selection: {0}")]
    MissingSelection(&'static str),

    /// Layout file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for grid operations
pub type GridResult<T> = Result<T, GridError>;
