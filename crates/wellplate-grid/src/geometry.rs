//! Grid calibration
//!
//! Fits a regular well grid to an image region. The fitted well pitch is
//! derived independently from the width and from the height; the two
//! estimates must agree within [`PITCH_TOLERANCE`] for the grid to be
//! accepted.
//!
//! With `n` wells along an axis, thickness ratio `k2` and spacing ratio
//! `k3`, the axis spans `n + 2*k2*n + n*k3 - k3` well pitches. The fitted
//! pitch is then shrunk by the reduction percentage so that the well
//! outline stays clear of the plate walls.

use crate::error::{GridError, GridResult};
use crate::layout::PlateLayout;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use wellplate_core::Box;

/// Allowed relative disagreement between the width and height pitches
pub const PITCH_TOLERANCE: f64 = 0.02;

/// Axis along which the fitted grid disagrees with the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// The width-based pitch is larger
    Horizontal,
    /// The height-based pitch is larger (or equal)
    Vertical,
    /// No mismatch
    #[default]
    None,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
            Axis::None => "none",
        })
    }
}

/// Outcome of the pitch consistency check
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationVerdict {
    /// Whether the two pitch estimates agree
    pub ok: bool,
    /// Approximate cropping error across the whole plate, in pixels.
    /// Zero when `ok`.
    pub mismatch_pixels: f64,
    /// Axis of the mismatch; [`Axis::None`] when `ok`
    pub axis: Axis,
}

impl ValidationVerdict {
    /// Convert a failed verdict into [`GridError::GeometryValidation`].
    pub fn into_result(self) -> GridResult<()> {
        if self.ok {
            Ok(())
        } else {
            Err(GridError::GeometryValidation {
                axis: self.axis,
                mismatch_pixels: self.mismatch_pixels,
            })
        }
    }
}

/// Calibrated well grid
///
/// Well diameters equal the reduced pitches. Ratios are the calibrated
/// `k2'` and `k3'`, relative to the reduced diameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedGeometry {
    pub diameter_w: f64,
    pub diameter_h: f64,
    pub pitch_w: f64,
    pub pitch_h: f64,
    pub thickness_ratio: f64,
    pub spacing_ratio: f64,
}

impl CalibratedGeometry {
    /// Geometry with diameters equal to the given pitches.
    pub fn new(pitch_w: f64, pitch_h: f64, thickness_ratio: f64, spacing_ratio: f64) -> Self {
        Self {
            diameter_w: pitch_w,
            diameter_h: pitch_h,
            pitch_w,
            pitch_h,
            thickness_ratio,
            spacing_ratio,
        }
    }

    /// Truncated well size `(w, h)` in pixels.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DegenerateGeometry`] if either truncated
    /// diameter is below one pixel.
    pub fn well_size(&self) -> GridResult<(u32, u32)> {
        let w = self.diameter_w.trunc();
        let h = self.diameter_h.trunc();
        // NaN fails both comparisons
        if !(w >= 1.0 && h >= 1.0) {
            return Err(GridError::DegenerateGeometry {
                diameter_w: self.diameter_w,
                diameter_h: self.diameter_h,
            });
        }
        Ok((w as u32, h as u32))
    }

    /// Left edge of the well in column `i` (1-indexed)
    pub fn center_x(&self, i: u32) -> i32 {
        cell_center(i, self.pitch_w, self.thickness_ratio, self.spacing_ratio)
    }

    /// Top edge of the well in row `j` (1-indexed)
    pub fn center_y(&self, j: u32) -> i32 {
        cell_center(j, self.pitch_h, self.thickness_ratio, self.spacing_ratio)
    }

    /// Bounding box of the well at column `i`, row `j` (both 1-indexed).
    ///
    /// The box is not clipped to any image.
    pub fn cell_box(&self, i: u32, j: u32) -> GridResult<Box> {
        let (w, h) = self.well_size()?;
        Ok(Box::new_unchecked(
            self.center_x(i),
            self.center_y(j),
            w as i32,
            h as i32,
        ))
    }

    /// Largest pitch disagreement accepted by validation, in pixels
    pub fn tolerance_pixels(&self) -> f64 {
        PITCH_TOLERANCE * (self.pitch_w * self.pitch_h).sqrt()
    }
}

/// Placement of the `i`-th well (1-indexed) along one axis.
///
/// Returns `trunc((i-1)*d + (i-0.5)*2*k2*d + (i-1)*k3*d)`: the offset of
/// the well's bounding box from the plate edge. Although historically
/// called a center, this is the top-left coordinate.
pub fn cell_center(i: u32, pitch: f64, k2: f64, k3: f64) -> i32 {
    let i = i as f64;
    ((i - 1.0) * pitch + (i - 0.5) * 2.0 * k2 * pitch + (i - 1.0) * k3 * pitch) as i32
}

/// Number of pitches spanned by `n` wells
fn span(n: f64, k2: f64, k3: f64) -> f64 {
    n + 2.0 * k2 * n + n * k3 - k3
}

/// Fit a well grid to a `width x height` region.
///
/// The geometry is returned even when the verdict fails so that callers
/// can report it; a failed verdict must not be used to build masks or
/// crops.
///
/// # Errors
///
/// Returns [`GridError::Configuration`] for an invalid layout and
/// [`GridError::MissingSelection`] for an empty region.
pub fn solve(
    width: u32,
    height: u32,
    layout: &PlateLayout,
) -> GridResult<(CalibratedGeometry, ValidationVerdict)> {
    layout.validate()?;
    if width == 0 || height == 0 {
        return Err(GridError::MissingSelection("empty image region"));
    }

    let k2 = layout.thickness_ratio;
    let k3 = layout.spacing_ratio;
    let cols = layout.cols as f64;
    let rows = layout.rows as f64;

    let pitch_w = width as f64 / span(cols, k2, k3);
    let pitch_h = height as f64 / span(rows, k2, k3);
    let d1 = (pitch_w + pitch_h) / 2.0;
    let d2 = k2 * d1;
    let d3 = k3 * d1;

    let del = layout.reduction_percent * d1 / 100.0;
    let d1_reduced = d1 - 2.0 * del;
    let k2_cal = (d2 + del) / d1_reduced;
    let k3_cal = d3 / d1_reduced;
    let pitch_w_cal = pitch_w * d1_reduced / d1;
    let pitch_h_cal = pitch_h * d1_reduced / d1;

    debug!(
        pitch_w,
        pitch_h,
        pitch_w_cal,
        pitch_h_cal,
        k2_cal,
        k3_cal,
        "grid fit"
    );

    let geometry = CalibratedGeometry::new(pitch_w_cal, pitch_h_cal, k2_cal, k3_cal);
    let verdict = check_pitches(&geometry, layout.cols, layout.rows);
    Ok((geometry, verdict))
}

/// Compare the width and height pitches of a calibrated grid.
fn check_pitches(geometry: &CalibratedGeometry, cols: u32, rows: u32) -> ValidationVerdict {
    let pw = geometry.pitch_w;
    let ph = geometry.pitch_h;
    let diff = pw - ph;
    if diff * diff <= PITCH_TOLERANCE * PITCH_TOLERANCE * ph * pw {
        return ValidationVerdict {
            ok: true,
            mismatch_pixels: 0.0,
            axis: Axis::None,
        };
    }

    let (axis, n) = if ph < pw {
        (Axis::Horizontal, cols)
    } else {
        (Axis::Vertical, rows)
    };
    ValidationVerdict {
        ok: false,
        mismatch_pixels: diff.abs()
            * span(n as f64, geometry.thickness_ratio, geometry.spacing_ratio),
        axis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PlatePreset;

    #[test]
    fn test_cell_center() {
        // First well sits one wall thickness in
        assert_eq!(cell_center(1, 100.0, 0.1, 0.05), 10);
        // (2-1)*100 + 1.5*2*0.1*100 + 1*0.05*100 = 135
        assert_eq!(cell_center(2, 100.0, 0.1, 0.05), 135);
        // Truncation, not rounding
        assert_eq!(cell_center(1, 19.9, 0.1, 0.0), 1);
    }

    #[test]
    fn test_equal_pitches_pass() {
        let g = CalibratedGeometry::new(120.0, 120.0, 0.3, 0.06);
        let v = check_pitches(&g, 4, 3);
        assert!(v.ok);
        assert_eq!(v.axis, Axis::None);
        assert_eq!(v.mismatch_pixels, 0.0);
    }

    #[test]
    fn test_tolerance_boundary() {
        // 1% apart passes, 3% apart fails
        assert!(check_pitches(&CalibratedGeometry::new(101.0, 100.0, 0.1, 0.05), 4, 3).ok);
        let v = check_pitches(&CalibratedGeometry::new(103.0, 100.0, 0.1, 0.05), 4, 3);
        assert!(!v.ok);
        assert_eq!(v.axis, Axis::Horizontal);
        // 3 px * (4 + 0.8 + 0.2 - 0.05)
        assert!((v.mismatch_pixels - 3.0 * 4.95).abs() < 1e-9);
    }

    #[test]
    fn test_reduction_zero_is_identity() {
        let layout = PlatePreset::TwelveWell.layout().with_reduction(0.0);
        let (g, _) = solve(1200, 897, &layout).unwrap();
        let k2 = layout.thickness_ratio;
        let k3 = layout.spacing_ratio;
        let pitch_w = 1200.0 / span(4.0, k2, k3);
        assert!((g.thickness_ratio - k2).abs() < 1e-12);
        assert!((g.spacing_ratio - k3).abs() < 1e-12);
        assert!((g.pitch_w - pitch_w).abs() < 1e-9);
    }

    #[test]
    fn test_reduction_shrinks() {
        let layout = PlatePreset::TwelveWell.layout();
        let (g0, _) = solve(1200, 897, &layout.with_reduction(0.0)).unwrap();
        let (g5, _) = solve(1200, 897, &layout).unwrap();
        // 5% off each side
        assert!((g5.pitch_w / g0.pitch_w - 0.9).abs() < 1e-9);
        assert!(g5.thickness_ratio > g0.thickness_ratio);
        assert!(g5.spacing_ratio > g0.spacing_ratio);

        let (g15, _) = solve(1200, 897, &layout.with_reduction(15.0)).unwrap();
        assert!((g15.pitch_w / g0.pitch_w - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_solve_deterministic() {
        let layout = PlatePreset::SixWell.layout();
        assert_eq!(solve(640, 430, &layout).unwrap(), solve(640, 430, &layout).unwrap());
    }

    #[test]
    fn test_solve_rejects_bad_input() {
        let layout = PlateLayout::default();
        assert!(matches!(
            solve(0, 10, &layout),
            Err(GridError::MissingSelection(_))
        ));
        let bad = PlateLayout {
            rows: 0,
            ..layout
        };
        assert!(matches!(
            solve(100, 100, &bad),
            Err(GridError::Configuration(_))
        ));
    }

    #[test]
    fn test_well_size() {
        let g = CalibratedGeometry::new(50.9, 40.2, 0.1, 0.05);
        assert_eq!(g.well_size().unwrap(), (50, 40));
        let g = CalibratedGeometry::new(0.99, 40.0, 0.1, 0.05);
        assert!(matches!(
            g.well_size(),
            Err(GridError::DegenerateGeometry { .. })
        ));
        let g = CalibratedGeometry::new(f64::NAN, 40.0, 0.1, 0.05);
        assert!(g.well_size().is_err());
    }

    #[test]
    fn test_verdict_into_result() {
        assert!(ValidationVerdict {
            ok: true,
            ..Default::default()
        }
        .into_result()
        .is_ok());
        let err = ValidationVerdict {
            ok: false,
            mismatch_pixels: 12.5,
            axis: Axis::Vertical,
        }
        .into_result()
        .unwrap_err();
        assert_eq!(err.to_string(), "vertical geometry mismatch of about 12.5 pixels");
    }
}
