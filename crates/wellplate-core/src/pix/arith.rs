//! Image arithmetic operations
//!
//! Pixel-wise operations used to build and apply well masks:
//!
//! - Inversion (`invert`, `invert_inplace`)
//! - Multiplicative masking (`multiply_by_mask`)

use super::{Pix, PixMut, PixelDepth};
use crate::error::{Error, Result};

impl Pix {
    /// Invert all pixel values.
    ///
    /// Each pixel `v` becomes `max - v`, where `max` is the largest value
    /// representable at the image depth. For 32 bpp images the three color
    /// channels are inverted and alpha is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use wellplate_core::{Pix, PixelDepth};
    ///
    /// let pix = Pix::new(4, 4, PixelDepth::Bit8).unwrap();
    /// let inv = pix.invert();
    /// assert_eq!(inv.get_pixel(0, 0), Some(255));
    /// ```
    pub fn invert(&self) -> Pix {
        let mut pm = self.to_mut();
        pm.invert_inplace();
        pm.into()
    }

    /// Multiply an 8 bpp image by an 8 bpp mask.
    ///
    /// Every output pixel is `mask * src / 255` using integer division,
    /// so a 0 mask value zeroes the pixel and 255 keeps it unchanged.
    /// Neither input is modified.
    ///
    /// # Arguments
    ///
    /// * `mask` - 8-bit mask of the same dimensions as `self`
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if either image is not 8 bpp and
    /// [`Error::DimensionMismatch`] if the sizes differ.
    pub fn multiply_by_mask(&self, mask: &Pix) -> Result<Pix> {
        if self.depth() != PixelDepth::Bit8 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        if mask.depth() != PixelDepth::Bit8 {
            return Err(Error::UnsupportedDepth(mask.depth().bits()));
        }
        if !self.sizes_equal(mask) {
            return Err(Error::DimensionMismatch {
                expected: (self.width(), self.height()),
                actual: (mask.width(), mask.height()),
            });
        }

        let mut result = self.create_template().to_mut();
        for y in 0..self.height() {
            for x in 0..self.width() {
                let s = self.get_pixel_unchecked(x, y);
                let m = mask.get_pixel_unchecked(x, y);
                result.set_pixel_unchecked(x, y, m * s / 255);
            }
        }

        Ok(result.into())
    }
}

impl PixMut {
    /// Invert all pixel values in place.
    ///
    /// See [`Pix::invert`].
    pub fn invert_inplace(&mut self) {
        let depth = self.depth();
        if depth == PixelDepth::Bit32 {
            // Keep the alpha byte
            for word in self.data_mut() {
                *word ^= 0xffff_ff00;
            }
            return;
        }

        // Flip every bit, then clear the padding bits past the row width
        let used_bits = (self.width() * depth.bits()) as usize;
        let full = used_bits / 32;
        let rem = used_bits % 32;
        for y in 0..self.height() {
            let line = self.row_data_mut(y);
            for word in line.iter_mut() {
                *word = !*word;
            }
            if rem != 0 {
                line[full] &= !0u32 << (32 - rem);
            }
            let first_pad = full + usize::from(rem != 0);
            for word in &mut line[first_pad..] {
                *word = 0;
            }
        }
    }
}
