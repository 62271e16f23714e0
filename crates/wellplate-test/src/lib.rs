//! Shared harness for the `*_reg` integration tests
//!
//! Each test numbers its checks through [`RegParams`] and builds its plate
//! photographs in memory with [`synthetic_plate`], so there are no binary
//! fixtures. Setting `REGTEST_MODE=display` also saves intermediate images.
//!
//! # Usage
//!
//! ```ignore
//! use wellplate_test::{RegParams, synthetic_plate};
//!
//! let mut rp = RegParams::new("geometry");
//! rp.compare_values(12.0, wells.len() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```

mod error;
mod params;
mod synth;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};
pub use synth::{PlateSpec, ramp_image, synthetic_plate};

/// `tests/regout` under the workspace root, where display mode saves images
pub fn regout_dir() -> String {
    // this crate lives at crates/wellplate-test
    format!("{}/../../tests/regout", env!("CARGO_MANIFEST_DIR"))
}
