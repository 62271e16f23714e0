//! Plate layouts and presets
//!
//! A [`PlateLayout`] describes the well grid of a culture plate: how many
//! wells it has along each axis and the two shape ratios that relate the
//! well diameter to the wall thickness and the gap between wells.
//! Standard plates are available as [`PlatePreset`]s; custom layouts can be
//! loaded from JSON.

use crate::error::{GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Reduction of the fitted well diameter for the standard plates, in percent
pub const PRESET_REDUCTION_PERCENT: f64 = 5.0;

/// Reduction for custom plates and JSON layouts that omit it, in percent
pub const CUSTOM_REDUCTION_PERCENT: f64 = 15.0;

/// Standard plate types
///
/// The numeric selection used by [`PlatePreset::from_selection`] is
/// 1 for 6-well, 2 for 12-well, 3 for 24-well and 4 for a custom layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatePreset {
    /// 6-well plate, 3 columns x 2 rows
    SixWell,
    /// 12-well plate, 4 columns x 3 rows
    #[default]
    TwelveWell,
    /// 24-well plate, 6 columns x 4 rows
    TwentyFourWell,
    /// User-supplied ratios and counts, starting from the 12-well values
    Custom,
}

impl PlatePreset {
    /// All presets in selection order
    pub const ALL: [PlatePreset; 4] = [
        PlatePreset::SixWell,
        PlatePreset::TwelveWell,
        PlatePreset::TwentyFourWell,
        PlatePreset::Custom,
    ];

    /// Resolve a numeric menu selection.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Aborted`] for 0 and
    /// [`GridError::Configuration`] for values above 4.
    pub fn from_selection(selection: u32) -> GridResult<Self> {
        match selection {
            0 => Err(GridError::Aborted),
            1..=4 => Ok(Self::ALL[selection as usize - 1]),
            n => Err(GridError::Configuration(format!(
                "plate selection must be 0..=4, got {n}"
            ))),
        }
    }

    /// Numeric menu selection of this preset
    pub fn selection(self) -> u32 {
        match self {
            Self::SixWell => 1,
            Self::TwelveWell => 2,
            Self::TwentyFourWell => 3,
            Self::Custom => 4,
        }
    }

    /// Short display name
    pub fn name(self) -> &'static str {
        match self {
            Self::SixWell => "6-well",
            Self::TwelveWell => "12-well",
            Self::TwentyFourWell => "24-well",
            Self::Custom => "custom",
        }
    }

    /// Thickness and spacing ratios `(k2, k3)`
    pub fn ratios(self) -> (f64, f64) {
        match self {
            Self::SixWell => (0.04384, 0.03561),
            Self::TwelveWell | Self::Custom => (0.06263, 0.04535),
            Self::TwentyFourWell => (0.10387, 0.04277),
        }
    }

    /// Well counts `(cols, rows)`
    pub fn counts(self) -> (u32, u32) {
        match self {
            Self::SixWell => (3, 2),
            Self::TwelveWell | Self::Custom => (4, 3),
            Self::TwentyFourWell => (6, 4),
        }
    }

    /// Default diameter reduction in percent
    pub fn reduction_percent(self) -> f64 {
        match self {
            Self::Custom => CUSTOM_REDUCTION_PERCENT,
            _ => PRESET_REDUCTION_PERCENT,
        }
    }

    /// Layout with this preset's counts, ratios and reduction
    pub fn layout(self) -> PlateLayout {
        let (cols, rows) = self.counts();
        let (thickness_ratio, spacing_ratio) = self.ratios();
        PlateLayout {
            rows,
            cols,
            thickness_ratio,
            spacing_ratio,
            reduction_percent: self.reduction_percent(),
        }
    }
}

impl fmt::Display for PlatePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_reduction() -> f64 {
    CUSTOM_REDUCTION_PERCENT
}

/// Well grid of a plate
///
/// JSON form:
///
/// ```json
/// { "rows": 3, "cols": 4, "thickness_ratio": 0.06263,
///   "spacing_ratio": 0.04535, "reduction_percent": 15.0 }
/// ```
///
/// `reduction_percent` may be omitted and defaults to 15.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlateLayout {
    /// Number of well rows (vertical count)
    pub rows: u32,
    /// Number of well columns (horizontal count)
    pub cols: u32,
    /// Wall thickness relative to the well diameter (k2)
    pub thickness_ratio: f64,
    /// Gap between neighbouring wells relative to the well diameter (k3)
    pub spacing_ratio: f64,
    /// Shrink of the fitted diameter, in percent of it
    #[serde(default = "default_reduction")]
    pub reduction_percent: f64,
}

impl Default for PlateLayout {
    fn default() -> Self {
        PlatePreset::default().layout()
    }
}

impl PlateLayout {
    /// Create a validated layout.
    pub fn new(
        rows: u32,
        cols: u32,
        thickness_ratio: f64,
        spacing_ratio: f64,
        reduction_percent: f64,
    ) -> GridResult<Self> {
        let layout = Self {
            rows,
            cols,
            thickness_ratio,
            spacing_ratio,
            reduction_percent,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Layout of a preset; shorthand for [`PlatePreset::layout`].
    pub fn preset(preset: PlatePreset) -> Self {
        preset.layout()
    }

    /// Parse and validate a layout from JSON text.
    pub fn from_json_str(json: &str) -> GridResult<Self> {
        let layout: Self = serde_json::from_str(json)
            .map_err(|e| GridError::Configuration(format!("invalid layout JSON: {e}")))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Read, parse and validate a layout from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> GridResult<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> GridResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GridError::Configuration(format!("cannot serialize layout: {e}")))
    }

    /// Replace the well counts.
    ///
    /// The counts are taken as a pair: if either is 0 both current values
    /// are kept.
    pub fn with_counts(mut self, cols: u32, rows: u32) -> Self {
        if cols > 0 && rows > 0 {
            self.cols = cols;
            self.rows = rows;
        }
        self
    }

    /// Replace the shape ratios.
    pub fn with_ratios(mut self, thickness_ratio: f64, spacing_ratio: f64) -> Self {
        self.thickness_ratio = thickness_ratio;
        self.spacing_ratio = spacing_ratio;
        self
    }

    /// Replace the diameter reduction.
    pub fn with_reduction(mut self, reduction_percent: f64) -> Self {
        self.reduction_percent = reduction_percent;
        self
    }

    /// Total number of wells
    pub fn well_count(&self) -> u32 {
        self.rows * self.cols
    }

    /// Check the parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Configuration`] if a count is zero, a ratio is
    /// not a positive finite number, or the reduction is outside `[0, 100)`.
    pub fn validate(&self) -> GridResult<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GridError::Configuration(format!(
                "well counts must be positive, got {} cols x {} rows",
                self.cols, self.rows
            )));
        }
        for (name, value) in [
            ("thickness_ratio", self.thickness_ratio),
            ("spacing_ratio", self.spacing_ratio),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GridError::Configuration(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(0.0..100.0).contains(&self.reduction_percent) {
            return Err(GridError::Configuration(format!(
                "reduction_percent must be in [0, 100), got {}",
                self.reduction_percent
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_selection() {
        assert!(matches!(
            PlatePreset::from_selection(0),
            Err(GridError::Aborted)
        ));
        assert_eq!(PlatePreset::from_selection(1).unwrap(), PlatePreset::SixWell);
        assert_eq!(
            PlatePreset::from_selection(3).unwrap(),
            PlatePreset::TwentyFourWell
        );
        assert_eq!(PlatePreset::from_selection(4).unwrap(), PlatePreset::Custom);
        assert!(matches!(
            PlatePreset::from_selection(5),
            Err(GridError::Configuration(_))
        ));
        for p in PlatePreset::ALL {
            assert_eq!(PlatePreset::from_selection(p.selection()).unwrap(), p);
        }
    }

    #[test]
    fn test_preset_table() {
        let six = PlatePreset::SixWell.layout();
        assert_eq!((six.cols, six.rows), (3, 2));
        assert_eq!(six.thickness_ratio, 0.04384);
        assert_eq!(six.spacing_ratio, 0.03561);

        let tw = PlatePreset::TwentyFourWell.layout();
        assert_eq!((tw.cols, tw.rows), (6, 4));
        assert_eq!(tw.well_count(), 24);
        assert_eq!(tw.thickness_ratio, 0.10387);

        let default = PlateLayout::default();
        assert_eq!((default.cols, default.rows), (4, 3));
        assert_eq!(default.thickness_ratio, 0.06263);
        assert_eq!(default.spacing_ratio, 0.04535);
        assert_eq!(default.reduction_percent, 5.0);
    }

    #[test]
    fn test_preset_reduction() {
        for p in [
            PlatePreset::SixWell,
            PlatePreset::TwelveWell,
            PlatePreset::TwentyFourWell,
        ] {
            assert_eq!(p.layout().reduction_percent, PRESET_REDUCTION_PERCENT);
        }
        let custom = PlatePreset::Custom.layout();
        assert_eq!(custom.reduction_percent, 15.0);
        // Custom starts from the 12-well grid
        assert_eq!(
            custom.with_reduction(PRESET_REDUCTION_PERCENT),
            PlatePreset::TwelveWell.layout()
        );
    }

    #[test]
    fn test_with_counts_pair() {
        let layout = PlateLayout::default().with_counts(8, 5);
        assert_eq!((layout.cols, layout.rows), (8, 5));
        // One missing count keeps both
        assert_eq!((layout.with_counts(5, 0).cols, layout.with_counts(5, 0).rows), (8, 5));
        let layout = PlateLayout::default().with_counts(0, 7);
        assert_eq!((layout.cols, layout.rows), (4, 3));
    }

    #[test]
    fn test_validate() {
        assert!(PlateLayout::default().validate().is_ok());
        assert!(PlateLayout::new(0, 4, 0.06, 0.04, 15.0).is_err());
        assert!(PlateLayout::new(3, 0, 0.06, 0.04, 15.0).is_err());
        assert!(PlateLayout::new(3, 4, 0.0, 0.04, 15.0).is_err());
        assert!(PlateLayout::new(3, 4, 0.06, f64::NAN, 15.0).is_err());
        assert!(PlateLayout::new(3, 4, 0.06, 0.04, 100.0).is_err());
        assert!(PlateLayout::new(3, 4, 0.06, 0.04, -1.0).is_err());
        assert!(PlateLayout::new(3, 4, 0.06, 0.04, 0.0).is_ok());
    }

    #[test]
    fn test_json() {
        let layout =
            PlateLayout::from_json_str(r#"{"rows": 2, "cols": 5, "thickness_ratio": 0.05, "spacing_ratio": 0.04}"#)
                .unwrap();
        assert_eq!((layout.cols, layout.rows), (5, 2));
        assert_eq!(layout.reduction_percent, CUSTOM_REDUCTION_PERCENT);

        let text = layout.to_json_string().unwrap();
        assert_eq!(PlateLayout::from_json_str(&text).unwrap(), layout);

        // Unknown fields and invalid values are rejected
        assert!(PlateLayout::from_json_str(
            r#"{"rows": 2, "cols": 5, "thickness_ratio": 0.05, "spacing_ratio": 0.04, "wells": 10}"#
        )
        .is_err());
        assert!(PlateLayout::from_json_str(
            r#"{"rows": 0, "cols": 5, "thickness_ratio": 0.05, "spacing_ratio": 0.04}"#
        )
        .is_err());
        assert!(PlateLayout::from_json_str(
            r#"{"rows": -1, "cols": 5, "thickness_ratio": 0.05, "spacing_ratio": 0.04}"#
        )
        .is_err());
    }

    #[test]
    fn test_preset_serde_name() {
        let s = serde_json::to_string(&PlatePreset::TwentyFourWell).unwrap();
        assert_eq!(s, "\"twenty-four-well\"");
        assert_eq!(PlatePreset::SixWell.to_string(), "6-well");
    }
}
