//! Reduction to 8 bpp gray
//!
//! Plate photographs arrive at whatever depth the camera or scanner
//! produced; everything downstream works on 8 bpp gray.

use super::{Pix, PixMut, PixelDepth};
use crate::color;
use crate::error::{Error, Result};

/// Channel weight of the plain RGB average used by [`Pix::convert_to_8`]
pub const EQUAL_WEIGHT: f32 = 1.0 / 3.0;

impl Pix {
    /// New 8 bpp gray image with this one's size, resolution and label,
    /// each pixel mapped through `gray`.
    fn map_to_gray(&self, gray: impl Fn(u32) -> u32) -> Result<Pix> {
        let mut out = PixMut::new(self.width(), self.height(), PixelDepth::Bit8)?;
        out.copy_resolution_from(self);
        out.set_text(self.text().map(str::to_owned));
        for y in 0..self.height() {
            for x in 0..self.width() {
                out.set_pixel_unchecked(x, y, gray(self.get_pixel_unchecked(x, y)));
            }
        }
        Ok(out.into())
    }

    /// 8 bpp gray copy of the image, whatever its depth.
    ///
    /// | depth | gray value |
    /// |---|---|
    /// | 1 | 0 becomes 255, 1 becomes 0 |
    /// | 2, 4 | levels spread evenly over 0..=255 |
    /// | 8 | unchanged (still a fresh buffer) |
    /// | 16 | high byte |
    /// | 32 | `(r + g + b) / 3`, rounded |
    ///
    /// ```
    /// use wellplate_core::{Pix, PixelDepth};
    ///
    /// let rgb = Pix::new(10, 10, PixelDepth::Bit32).unwrap();
    /// assert_eq!(rgb.convert_to_8().unwrap().depth(), PixelDepth::Bit8);
    /// ```
    pub fn convert_to_8(&self) -> Result<Pix> {
        match self.depth() {
            PixelDepth::Bit8 => Ok(self.deep_clone()),
            PixelDepth::Bit32 => self.convert_rgb_to_gray(EQUAL_WEIGHT, EQUAL_WEIGHT, EQUAL_WEIGHT),
            PixelDepth::Bit1 => self.map_to_gray(|v| if v == 0 { 255 } else { 0 }),
            PixelDepth::Bit2 => self.map_to_gray(|v| v * 85),
            PixelDepth::Bit4 => self.map_to_gray(|v| v * 17),
            PixelDepth::Bit16 => self.map_to_gray(|v| v >> 8),
        }
    }

    /// Weighted gray of a 32 bpp image, rounded to the nearest level.
    ///
    /// Weights that do not add up to 1 are scaled so that they do.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedDepth`] below 32 bpp, and
    /// [`Error::InvalidParameter`] for a negative weight or an all-zero set.
    pub fn convert_rgb_to_gray(&self, rwt: f32, gwt: f32, bwt: f32) -> Result<Pix> {
        if self.depth() != PixelDepth::Bit32 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        if [rwt, gwt, bwt].iter().any(|&w| w < 0.0) {
            return Err(Error::InvalidParameter(format!(
                "negative gray weight in ({}, {}, {})",
                rwt, gwt, bwt
            )));
        }
        let sum = rwt + gwt + bwt;
        if sum <= 0.0 {
            return Err(Error::InvalidParameter("gray weights are all zero".into()));
        }
        let scale = if (sum - 1.0).abs() > 1e-4 { sum.recip() } else { 1.0 };
        let (rwt, gwt, bwt) = (rwt * scale, gwt * scale, bwt * scale);

        self.map_to_gray(|v| {
            let (r, g, b) = color::extract_rgb(v);
            let gray = rwt * f32::from(r) + gwt * f32::from(g) + bwt * f32::from(b);
            ((gray + 0.5) as u32).min(255)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_1bpp_to_8() {
        let mut pm = PixMut::new(4, 1, PixelDepth::Bit1).unwrap();
        pm.set_pixel_unchecked(1, 0, 1);
        let pix8 = Pix::from(pm).convert_to_8().unwrap();
        assert_eq!(pix8.get_pixel(0, 0), Some(255));
        assert_eq!(pix8.get_pixel(1, 0), Some(0));
    }

    #[test]
    fn test_convert_low_depths_to_8() {
        let mut pm2 = PixMut::new(4, 1, PixelDepth::Bit2).unwrap();
        pm2.set_pixel_unchecked(2, 0, 2);
        pm2.set_pixel_unchecked(3, 0, 3);
        let g2 = Pix::from(pm2).convert_to_8().unwrap();
        assert_eq!(g2.get_pixel(2, 0), Some(170));
        assert_eq!(g2.get_pixel(3, 0), Some(255));

        let mut pm4 = PixMut::new(2, 1, PixelDepth::Bit4).unwrap();
        pm4.set_pixel_unchecked(1, 0, 15);
        let g4 = Pix::from(pm4).convert_to_8().unwrap();
        assert_eq!(g4.get_pixel(1, 0), Some(255));
        assert_eq!(g4.get_pixel(0, 0), Some(0));
    }

    #[test]
    fn test_convert_16_uses_msb() {
        let mut pm = PixMut::new(2, 1, PixelDepth::Bit16).unwrap();
        pm.set_pixel_unchecked(0, 0, 0xab12);
        let g = Pix::from(pm).convert_to_8().unwrap();
        assert_eq!(g.get_pixel(0, 0), Some(0xab));
    }

    #[test]
    fn test_convert_rgb_average() {
        let mut pm = PixMut::new(4, 1, PixelDepth::Bit32).unwrap();
        pm.set_rgb(0, 0, 100, 100, 100).unwrap();
        pm.set_rgb(1, 0, 255, 0, 0).unwrap();
        pm.set_rgb(2, 0, 0, 0, 255).unwrap();
        pm.set_rgb(3, 0, 10, 20, 60).unwrap();
        let g = Pix::from(pm).convert_to_8().unwrap();
        assert_eq!(g.depth(), PixelDepth::Bit8);
        assert_eq!(g.get_pixel(0, 0), Some(100));
        // Every channel counts the same
        assert_eq!(g.get_pixel(1, 0), Some(85));
        assert_eq!(g.get_pixel(2, 0), Some(85));
        assert_eq!(g.get_pixel(3, 0), Some(30));
    }

    #[test]
    fn test_convert_rgb_custom_weights() {
        let mut pm = PixMut::new(1, 1, PixelDepth::Bit32).unwrap();
        pm.set_rgb(0, 0, 255, 0, 0).unwrap();
        let g = Pix::from(pm).convert_rgb_to_gray(0.3, 0.5, 0.2).unwrap();
        assert_eq!(g.get_pixel(0, 0), Some(77));
    }

    #[test]
    fn test_convert_8_is_independent_copy() {
        let pix = Pix::new(3, 3, PixelDepth::Bit8).unwrap();
        let g = pix.convert_to_8().unwrap();
        assert_eq!(g.data(), pix.data());
        assert_ne!(g.data().as_ptr(), pix.data().as_ptr());
    }

    #[test]
    fn test_convert_rgb_to_gray_rejects_bad_weights() {
        let pix = Pix::new(2, 2, PixelDepth::Bit32).unwrap();
        assert!(pix.convert_rgb_to_gray(-1.0, 1.0, 1.0).is_err());
        assert!(pix.convert_rgb_to_gray(0.0, 0.0, 0.0).is_err());
        let gray = Pix::new(2, 2, PixelDepth::Bit8).unwrap();
        assert!(gray.convert_rgb_to_gray(1.0, 1.0, 1.0).is_err());
    }
}
