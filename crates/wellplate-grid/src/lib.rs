//! wellplate-grid - Well grid segmentation for multi-well plate images
//!
//! This crate locates the regular grid of wells in a photograph of a
//! culture plate and splits the image into one sub-image per well:
//!
//! - **Layouts** - Plate presets (6/12/24-well) and custom layouts
//! - **Geometry** - Fitting and validating the well pitch against the image
//! - **Mask** - Binary mask with one filled ellipse per well
//! - **Composite** - Removing the plate background between wells
//! - **Crop** - Cutting out the wells in row- or column-major order
//! - **Pipeline** - All of the above for one image, with optional previews
//!
//! # Examples
//!
//! ```
//! use wellplate_core::{Pix, PixelDepth};
//! use wellplate_grid::{NoPreview, PlateLayout, SegmentOptions, segment_plate};
//!
//! let plate = Pix::new(400, 299, PixelDepth::Bit8).unwrap();
//! let report = segment_plate(
//!     &plate,
//!     &PlateLayout::default(),
//!     &SegmentOptions::default(),
//!     &mut NoPreview,
//! )
//! .unwrap();
//! assert_eq!(report.wells.len(), 12);
//! assert_eq!(report.wells.well(1).unwrap().image.text(), Some("well 1 of 12"));
//! ```
//!
//! ## Fitting a grid without cropping
//!
//! ```
//! use wellplate_grid::{PlatePreset, solve};
//!
//! let layout = PlatePreset::TwelveWell.layout();
//! let (geometry, verdict) = solve(400, 200, &layout).unwrap();
//! assert!(!verdict.ok);
//! assert!(verdict.mismatch_pixels > 0.0);
//! assert!(geometry.pitch_w > geometry.pitch_h);
//! ```

pub mod composite;
pub mod crop;
mod error;
pub mod geometry;
pub mod layout;
pub mod mask;
pub mod pipeline;

pub use composite::apply_mask;
pub use crop::{WellGrid, WellImage, WellOrder, crop_wells, well_label};
pub use error::{GridError, GridResult};
pub use geometry::{
    Axis, CalibratedGeometry, PITCH_TOLERANCE, ValidationVerdict, cell_center, solve,
};
pub use layout::{CUSTOM_REDUCTION_PERCENT, PRESET_REDUCTION_PERCENT, PlateLayout, PlatePreset};
pub use mask::build_mask;
pub use pipeline::{
    NoPreview, PreviewSink, PreviewStage, SegmentOptions, SegmentationReport, segment_plate,
};
