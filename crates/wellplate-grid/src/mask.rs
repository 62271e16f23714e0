//! Well mask construction
//!
//! The mask is an 8 bpp image of the same size as the plate region with
//! every well at 255 and everything else at 0. Wells are drawn as black
//! ellipses on a white canvas which is then inverted.

use crate::error::GridResult;
use crate::geometry::CalibratedGeometry;
use tracing::debug;
use wellplate_core::{Pix, PixMut, PixelDepth, PixelOp};

/// Build the binary well mask for a `width x height` region.
///
/// One axis-aligned filled ellipse of the truncated well size is placed
/// in every grid cell, with its bounding box at
/// `(center_x(i), center_y(j))`. Ellipses reaching past the image edge
/// are clipped; overlapping ellipses are not detected.
///
/// # Errors
///
/// Returns [`crate::GridError::DegenerateGeometry`] if a well would be
/// smaller than one pixel.
pub fn build_mask(
    width: u32,
    height: u32,
    rows: u32,
    cols: u32,
    geometry: &CalibratedGeometry,
) -> GridResult<Pix> {
    let (w, h) = geometry.well_size()?;

    let mut canvas = PixMut::new(width, height, PixelDepth::Bit8)?;
    canvas.set_all();
    for i in 1..=cols {
        for j in 1..=rows {
            let x = geometry.center_x(i);
            let y = geometry.center_y(j);
            debug!(col = i, row = j, x, y, w, h, "well cell");
            canvas.render_filled_ellipse(x, y, w, h, PixelOp::Clear);
        }
    }
    canvas.invert_inplace();

    Ok(canvas.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridError;

    fn geometry() -> CalibratedGeometry {
        CalibratedGeometry::new(50.0, 40.0, 0.06263, 0.04535)
    }

    #[test]
    fn test_mask_polarity() {
        let g = geometry();
        let mask = build_mask(240, 160, 3, 4, &g).unwrap();
        assert_eq!(mask.depth(), PixelDepth::Bit8);
        assert_eq!((mask.width(), mask.height()), (240, 160));

        // Center of the first well is on, the plate corner is off
        let cx = g.center_x(1) as u32 + 25;
        let cy = g.center_y(1) as u32 + 20;
        assert_eq!(mask.get_pixel(cx, cy), Some(255));
        assert_eq!(mask.get_pixel(0, 0), Some(0));
        assert_eq!(mask.get_pixel(239, 159), Some(0));

        // Only 0 and 255 occur
        for y in 0..160 {
            for x in 0..240 {
                let v = mask.get_pixel(x, y).unwrap();
                assert!(v == 0 || v == 255);
            }
        }
    }

    #[test]
    fn test_mask_bounding_box_corners_off() {
        let g = geometry();
        let mask = build_mask(240, 160, 3, 4, &g).unwrap();
        let x0 = g.center_x(2) as u32;
        let y0 = g.center_y(2) as u32;
        assert_eq!(mask.get_pixel(x0, y0), Some(0));
        assert_eq!(mask.get_pixel(x0 + 25, y0 + 20), Some(255));
    }

    #[test]
    fn test_mask_degenerate() {
        let g = CalibratedGeometry::new(0.5, 40.0, 0.1, 0.05);
        assert!(matches!(
            build_mask(100, 100, 2, 2, &g),
            Err(GridError::DegenerateGeometry { .. })
        ));
    }
}
