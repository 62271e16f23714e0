//! wellplate - Multi-well plate image segmentation
//!
//! Finds the regular grid of wells in a photograph of a culture plate,
//! checks that the grid fits the image, removes the plate background
//! between wells and cuts out one image per well for further analysis.
//!
//! # Overview
//!
//! - Image containers and primitives (re-exported from `wellplate-core`)
//! - Image I/O for PNG, JPEG, PNM and TIFF, including well stacks ([`io`])
//! - Grid calibration and segmentation ([`grid`])
//!
//! # Example
//!
//! ```
//! use wellplate::grid::{NoPreview, PlatePreset, SegmentOptions, segment_plate};
//! use wellplate::{Pix, PixelDepth};
//!
//! let plate = Pix::new(400, 299, PixelDepth::Bit8).unwrap();
//! let layout = PlatePreset::TwelveWell.layout();
//! let report = segment_plate(&plate, &layout, &SegmentOptions::default(), &mut NoPreview).unwrap();
//! assert_eq!(report.wells.len(), 12);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use wellplate_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use wellplate_grid as grid;
pub use wellplate_io as io;
