//! Synthetic test images
//!
//! Plate photographs are simulated by bright disks on a dark background,
//! one per grid cell.

use wellplate_core::pix::graphics::generate_filled_ellipse_pta;
use wellplate_core::{Pix, PixMut, PixelDepth};

/// Description of a synthetic plate image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateSpec {
    pub width: u32,
    pub height: u32,
    pub cols: u32,
    pub rows: u32,
    /// Gray value outside the wells
    pub background: u8,
    /// Gray value inside the wells
    pub well: u8,
}

impl PlateSpec {
    /// A plate with `cols x rows` wells on a dark background.
    pub fn new(width: u32, height: u32, cols: u32, rows: u32) -> Self {
        Self {
            width,
            height,
            cols,
            rows,
            background: 40,
            well: 200,
        }
    }
}

/// Build an 8 bpp plate image.
///
/// Each well is an ellipse inscribed in its grid cell with a margin of
/// one tenth of the cell on every side.
pub fn synthetic_plate(spec: &PlateSpec) -> wellplate_core::Result<Pix> {
    let mut pm = PixMut::new(spec.width, spec.height, PixelDepth::Bit8)?;
    for y in 0..spec.height {
        for x in 0..spec.width {
            pm.set_pixel_unchecked(x, y, spec.background as u32);
        }
    }

    let cell_w = spec.width / spec.cols.max(1);
    let cell_h = spec.height / spec.rows.max(1);
    let (mx, my) = (cell_w / 10, cell_h / 10);
    let disk = generate_filled_ellipse_pta(cell_w - 2 * mx, cell_h - 2 * my);

    for j in 0..spec.rows {
        for i in 0..spec.cols {
            let ox = i * cell_w + mx;
            let oy = j * cell_h + my;
            for (dx, dy) in disk.iter() {
                pm.set_pixel(ox + dx as u32, oy + dy as u32, spec.well as u32)?;
            }
        }
    }

    Ok(pm.into())
}

/// Build an 8 bpp image whose value is `(x + 2y) % 251 + 1`, never zero.
pub fn ramp_image(width: u32, height: u32) -> wellplate_core::Result<Pix> {
    let mut pm = PixMut::new(width, height, PixelDepth::Bit8)?;
    for y in 0..height {
        for x in 0..width {
            pm.set_pixel_unchecked(x, y, (x + 2 * y) % 251 + 1);
        }
    }
    Ok(pm.into())
}
