//! Cropping
//!
//! The region of interest and every well crop are cut out here.

use super::{Pix, PixMut, PixelDepth};
use crate::Box;
use crate::error::{Error, Result};

impl Pix {
    /// Copy of the `w x h` rectangle whose top-left corner is `(x, y)`.
    ///
    /// A rectangle running past the right or bottom edge is shortened to
    /// fit. Resolution and, at 32 bpp, samples per pixel follow the source.
    ///
    /// ```
    /// use wellplate_core::{Pix, PixelDepth};
    ///
    /// let pix = Pix::new(100, 80, PixelDepth::Bit8).unwrap();
    /// let crop = pix.clip_rectangle(80, 60, 50, 50).unwrap();
    /// assert_eq!((crop.width(), crop.height()), (20, 20));
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for an empty rectangle or a corner
    /// outside the image.
    pub fn clip_rectangle(&self, x: u32, y: u32, w: u32, h: u32) -> Result<Pix> {
        let (src_w, src_h) = (self.width(), self.height());
        if w == 0 || h == 0 {
            return Err(Error::InvalidParameter(format!("empty crop {}x{}", w, h)));
        }
        if x >= src_w || y >= src_h {
            return Err(Error::InvalidParameter(format!(
                "crop corner ({}, {}) lies outside {}x{}",
                x, y, src_w, src_h
            )));
        }

        let (out_w, out_h) = (w.min(src_w - x), h.min(src_h - y));
        let mut out = PixMut::new(out_w, out_h, self.depth())?;
        out.copy_resolution_from(self);
        if self.depth() == PixelDepth::Bit32 {
            out.set_spp(self.spp());
        }
        for row in 0..out_h {
            for col in 0..out_w {
                out.set_pixel_unchecked(col, row, self.get_pixel_unchecked(x + col, y + row));
            }
        }
        Ok(out.into())
    }

    /// Crop `region` after clamping it to the image, which may start at
    /// negative coordinates. Also returns the clamped box.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] when nothing of `region` is on the image.
    pub fn clip_box(&self, region: &Box) -> Result<(Pix, Box)> {
        let clipped = region
            .clip(self.width() as i32, self.height() as i32)
            .ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "region {:?} misses the {}x{} image",
                    region,
                    self.width(),
                    self.height()
                ))
            })?;
        let pix = self.clip_rectangle(
            clipped.x as u32,
            clipped.y as u32,
            clipped.w as u32,
            clipped.h as u32,
        )?;
        Ok((pix, clipped))
    }
}
