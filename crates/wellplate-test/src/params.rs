//! Check bookkeeping for one regression test

use crate::error::{TestError, TestResult};
use crate::regout_dir;
use std::fs;
use wellplate_core::{ImageFormat, Pix};

/// How much a regression test produces besides its verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Only run the checks
    #[default]
    Compare,
    /// Also save intermediate images under `tests/regout`
    Display,
}

impl RegTestMode {
    /// Mode named by `REGTEST_MODE`; anything but "display" compares.
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("REGTEST_MODE").unwrap_or_default())
    }

    fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("display") {
            Self::Display
        } else {
            Self::Compare
        }
    }
}

/// Numbered checks of one `<name>_reg` test.
///
/// Every `compare_*` call takes the next index. A failed check is logged
/// and remembered, and the run continues so one pass reports every
/// mismatch. [`RegParams::cleanup`] gives the verdict.
pub struct RegParams {
    pub test_name: String,
    pub mode: RegTestMode,
    index: usize,
    failures: Vec<String>,
}

impl RegParams {
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();
        eprintln!("\n==== {}_reg ({:?}) ====", test_name, mode);
        Self {
            test_name: test_name.to_string(),
            mode,
            index: 0,
            failures: Vec::new(),
        }
    }

    /// Index of the last check made
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    /// Number the next check and record `detail` if it failed.
    fn check(&mut self, ok: bool, detail: impl FnOnce() -> String) -> bool {
        self.index += 1;
        if !ok {
            let msg = format!("{}_reg check {}: {}", self.test_name, self.index, detail());
            eprintln!("{}", msg);
            self.failures.push(msg);
        }
        ok
    }

    /// `actual` is within `delta` of `expected`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        let diff = (expected - actual).abs();
        self.check(diff <= delta, || {
            format!(
                "expected {}, got {} (off by {}, allowed {})",
                expected, actual, diff, delta
            )
        })
    }

    /// Same size, depth and pixel values.
    pub fn compare_pix(&mut self, expected: &Pix, actual: &Pix) -> bool {
        if !expected.sizes_equal(actual) {
            return self.check(false, || {
                format!(
                    "image is {}x{} at {} bpp, expected {}x{} at {} bpp",
                    actual.width(),
                    actual.height(),
                    actual.depth().bits(),
                    expected.width(),
                    expected.height(),
                    expected.depth().bits()
                )
            });
        }
        let mismatch = (0..expected.height())
            .flat_map(|y| (0..expected.width()).map(move |x| (x, y)))
            .find(|&(x, y)| expected.get_pixel(x, y) != actual.get_pixel(x, y));
        self.check(mismatch.is_none(), || {
            let (x, y) = mismatch.unwrap_or_default();
            format!("first differing pixel at ({}, {})", x, y)
        })
    }

    pub fn compare_strings(&mut self, expected: &str, actual: &str) -> bool {
        self.check(expected == actual, || {
            format!("expected {:?}, got {:?}", expected, actual)
        })
    }

    /// Save `pix` as `<regout>/<test>.<tag>.png` in display mode.
    ///
    /// Returns the path written, or `None` in compare mode.
    pub fn write_pix(&self, pix: &Pix, tag: &str) -> TestResult<Option<String>> {
        if !self.display() {
            return Ok(None);
        }
        fs::create_dir_all(regout_dir())?;
        let path = format!(
            "{}/{}.{}.{}",
            regout_dir(),
            self.test_name,
            tag,
            ImageFormat::Png.extension()
        );
        wellplate_io::write_image(pix, &path, ImageFormat::Png).map_err(|e| {
            TestError::ImageWrite {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;
        eprintln!("saved {}", path);
        Ok(Some(path))
    }

    /// Print the summary; `true` when every check passed.
    pub fn cleanup(self) -> bool {
        let ok = self.failures.is_empty();
        eprintln!(
            "{}_reg: {} of {} checks passed",
            self.test_name,
            self.index - self.failures.len(),
            self.index
        );
        ok
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wellplate_core::PixelDepth;

    #[test]
    fn test_mode_parse() {
        assert_eq!(RegTestMode::parse("Display"), RegTestMode::Display);
        assert_eq!(RegTestMode::parse(""), RegTestMode::Compare);
        assert_eq!(RegTestMode::parse("generate"), RegTestMode::Compare);
    }

    #[test]
    fn test_compare_values() {
        let mut rp = RegParams::new("values");
        assert!(rp.compare_values(100.0, 100.5, 1.0));
        assert!(rp.is_success());
        assert!(!rp.compare_values(100.0, 200.0, 0.0));
        assert!(!rp.is_success());
        assert_eq!(rp.failures().len(), 1);
        assert!(rp.failures()[0].contains("check 2"));
        assert_eq!(rp.index(), 2);
    }

    #[test]
    fn test_compare_pix() {
        let mut rp = RegParams::new("pix");
        let a = Pix::new(3, 3, PixelDepth::Bit8).unwrap();
        let mut pm = a.to_mut();
        assert!(rp.compare_pix(&a, &a.clone()));
        pm.set_pixel(1, 2, 9).unwrap();
        assert!(!rp.compare_pix(&a, &pm.into()));
        assert!(rp.failures()[0].contains("(1, 2)"));
        let b = Pix::new(3, 4, PixelDepth::Bit8).unwrap();
        assert!(!rp.compare_pix(&a, &b));
        assert_eq!(rp.index(), 3);
        assert!(!rp.cleanup());
    }

    #[test]
    fn test_compare_strings() {
        let mut rp = RegParams::new("strings");
        assert!(rp.compare_strings("well 1 of 12", "well 1 of 12"));
        assert!(!rp.compare_strings("a", "b"));
    }
}
