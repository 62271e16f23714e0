//! Errors from the image primitives

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A side is 0, or the pixel buffer would not fit in memory
    #[error("cannot allocate a {width}x{height} image")]
    InvalidDimension { width: u32, height: u32 },

    #[error("pixel index {index} outside 0..{len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Image and mask (or two operands) differ in size
    #[error("size {}x{} does not match {}x{}", .actual.0, .actual.1, .expected.0, .expected.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("{0} bpp images are not handled here")]
    UnsupportedDepth(u32),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;
