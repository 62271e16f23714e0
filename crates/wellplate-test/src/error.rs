//! Failures of the regression harness itself, as opposed to failed checks

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TestError {
    /// A synthetic plate or ramp could not be built
    #[error("cannot synthesize test image: {0}")]
    ImageBuild(#[from] wellplate_core::Error),

    /// Display-mode output could not be saved
    #[error("cannot save '{path}': {message}")]
    ImageWrite { path: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type TestResult<T> = Result<T, TestError>;
