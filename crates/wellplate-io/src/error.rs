//! Errors raised while reading or writing plate images and well stacks

use thiserror::Error;

/// Reading or writing an image failed
///
/// Codec-specific errors are flattened to their message so callers match
/// on one type whatever the file format.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Format not recognised, or its codec feature is disabled
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Header or layout the readers cannot make sense of
    #[error("invalid image data: {0}")]
    InvalidData(String),

    #[error("cannot decode image: {0}")]
    Decode(String),

    #[error("cannot encode image: {0}")]
    Encode(String),

    #[error(transparent)]
    Core(#[from] wellplate_core::Error),
}

pub type IoResult<T> = Result<T, IoError>;
