//! Image container
//!
//! `Pix` is what every stage of the plate pipeline passes around: the
//! acquired photograph, the gray working region, the well mask, the
//! identified-wells preview and each cropped well.
//!
//! Rows are stored as packed 32-bit words, MSB first, each row starting on
//! a word boundary. 32 bpp pixels hold RGBA with red in the top byte.
//!
//! `Pix` is shared and read-only. Pixel writes go through a `PixMut`
//! obtained from [`PixMut::new`] or [`Pix::to_mut`]; `Into<Pix>` freezes it
//! again.

mod access;
pub mod arith;
mod clip;
pub mod convert;
pub mod graphics;

pub use access::*;
pub use graphics::PixelOp;

use crate::error::{Error, Result};
use std::sync::Arc;

/// Bits per pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PixelDepth {
    /// Binary
    Bit1 = 1,
    /// 4 gray levels
    Bit2 = 2,
    /// 16 gray levels
    Bit4 = 4,
    /// 8-bit gray, the working depth of the pipeline
    Bit8 = 8,
    /// 16-bit gray
    Bit16 = 16,
    /// RGB or RGBA
    Bit32 = 32,
}

impl PixelDepth {
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Largest sample value at this depth
    pub fn max_value(self) -> u32 {
        match self {
            PixelDepth::Bit32 => u32::MAX,
            _ => (1u32 << self.bits()) - 1,
        }
    }
}

/// Encodings the I/O layer reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    /// Uncompressed TIFF
    Tiff,
    TiffPackbits,
    TiffLzw,
    /// Deflate-compressed TIFF
    TiffZip,
    /// PBM, PGM or PPM
    Pnm,
}

impl ImageFormat {
    /// Usual file extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Tiff | Self::TiffPackbits | Self::TiffLzw | Self::TiffZip => "tif",
            Self::Pnm => "pnm",
        }
    }

    pub fn is_tiff(self) -> bool {
        matches!(
            self,
            Self::Tiff | Self::TiffPackbits | Self::TiffLzw | Self::TiffZip
        )
    }
}

#[derive(Debug, Clone)]
struct PixData {
    width: u32,
    height: u32,
    depth: PixelDepth,
    /// 1 for gray, 3 for RGB, 4 for RGBA
    spp: u32,
    wpl: u32,
    /// Resolution in ppi, 0 when unknown
    xres: i32,
    yres: i32,
    /// Free text; multipage TIFF stores it as the page label
    text: Option<String>,
    data: Vec<u32>,
}

impl PixData {
    fn zeroed(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let wpl = compute_wpl(width, depth)?;
        let len = (wpl as usize)
            .checked_mul(height as usize)
            .ok_or(Error::InvalidDimension { width, height })?;
        Ok(PixData {
            width,
            height,
            depth,
            spp: if depth == PixelDepth::Bit32 { 3 } else { 1 },
            wpl,
            xres: 0,
            yres: 0,
            text: None,
            data: vec![0; len],
        })
    }

    fn row_range(&self, y: u32) -> std::ops::Range<usize> {
        let start = y as usize * self.wpl as usize;
        start..start + self.wpl as usize
    }
}

/// Words per line for a row of `width` pixels.
fn compute_wpl(width: u32, depth: PixelDepth) -> Result<u32> {
    let words = (u64::from(width) * u64::from(depth.bits())).div_ceil(32);
    u32::try_from(words).map_err(|_| Error::InvalidDimension { width, height: 1 })
}

/// Shared, read-only image
///
/// Cloning shares the pixel buffer. Crops, conversions and composites
/// always produce new images.
///
/// ```
/// use wellplate_core::{Pix, PixelDepth};
///
/// let pix = Pix::new(640, 480, PixelDepth::Bit8).unwrap();
/// assert_eq!((pix.width(), pix.height()), (640, 480));
/// ```
#[derive(Debug, Clone)]
pub struct Pix {
    inner: Arc<PixData>,
}

impl Pix {
    /// Zero-filled image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if a side is 0.
    pub fn new(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        Ok(PixMut::new(width, height, depth)?.into())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    /// Samples per pixel
    #[inline]
    pub fn spp(&self) -> u32 {
        self.inner.spp
    }

    /// 32-bit words per row
    #[inline]
    pub fn wpl(&self) -> u32 {
        self.inner.wpl
    }

    #[inline]
    pub fn xres(&self) -> i32 {
        self.inner.xres
    }

    #[inline]
    pub fn yres(&self) -> i32 {
        self.inner.yres
    }

    /// Label text, if any
    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.inner.text.as_deref()
    }

    /// Packed pixel words, row after row
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    /// Words of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u32] {
        &self.inner.data[self.inner.row_range(y)]
    }

    /// Zero-filled image with the size, depth and metadata of this one
    pub fn create_template(&self) -> Self {
        let src = &*self.inner;
        Pix {
            inner: Arc::new(PixData {
                text: src.text.clone(),
                data: vec![0; src.data.len()],
                ..*src
            }),
        }
    }

    /// Same width, height and depth
    pub fn sizes_equal(&self, other: &Pix) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.depth() == other.depth()
    }

    /// Copy with its own pixel buffer
    pub fn deep_clone(&self) -> Self {
        Pix {
            inner: Arc::new((*self.inner).clone()),
        }
    }

    /// Writable copy of this image
    pub fn to_mut(&self) -> PixMut {
        PixMut {
            inner: (*self.inner).clone(),
        }
    }
}

/// Writable image, turned into a [`Pix`] with `into()`
#[derive(Debug)]
pub struct PixMut {
    inner: PixData,
}

impl PixMut {
    /// Zero-filled image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if a side is 0.
    pub fn new(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        Ok(PixMut {
            inner: PixData::zeroed(width, height, depth)?,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    #[inline]
    pub fn wpl(&self) -> u32 {
        self.inner.wpl
    }

    pub fn set_resolution(&mut self, xres: i32, yres: i32) {
        self.inner.xres = xres;
        self.inner.yres = yres;
    }

    pub fn copy_resolution_from(&mut self, src: &Pix) {
        self.set_resolution(src.xres(), src.yres());
    }

    pub fn set_text(&mut self, text: Option<String>) {
        self.inner.text = text;
    }

    /// Samples per pixel; 4 marks a 32 bpp image as RGBA.
    pub fn set_spp(&mut self, spp: u32) {
        self.inner.spp = spp;
    }

    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.inner.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.inner.data
    }

    #[inline]
    pub fn row_data_mut(&mut self, y: u32) -> &mut [u32] {
        let range = self.inner.row_range(y);
        &mut self.inner.data[range]
    }

    /// Set every bit: white at gray depths.
    pub fn set_all(&mut self) {
        self.inner.data.fill(u32::MAX);
    }
}

impl From<PixMut> for Pix {
    fn from(pix_mut: PixMut) -> Self {
        Pix {
            inner: Arc::new(pix_mut.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_packing() {
        // 100 px * 8 bits = 25 words
        assert_eq!(Pix::new(100, 200, PixelDepth::Bit8).unwrap().wpl(), 25);
        assert_eq!(Pix::new(32, 1, PixelDepth::Bit1).unwrap().wpl(), 1);
        assert_eq!(Pix::new(33, 1, PixelDepth::Bit1).unwrap().wpl(), 2);
        assert_eq!(Pix::new(10, 1, PixelDepth::Bit32).unwrap().wpl(), 10);
        assert_eq!(PixelDepth::Bit1.max_value(), 1);
        assert_eq!(PixelDepth::Bit8.max_value(), 255);
    }

    #[test]
    fn test_zero_sides_rejected() {
        assert!(Pix::new(0, 100, PixelDepth::Bit8).is_err());
        assert!(Pix::new(100, 0, PixelDepth::Bit8).is_err());
        assert!(PixMut::new(0, 0, PixelDepth::Bit8).is_err());
    }

    #[test]
    fn test_samples_per_pixel() {
        assert_eq!(Pix::new(4, 4, PixelDepth::Bit8).unwrap().spp(), 1);
        assert_eq!(Pix::new(4, 4, PixelDepth::Bit32).unwrap().spp(), 3);
    }

    #[test]
    fn test_clone_and_deep_clone() {
        let pix = Pix::new(16, 16, PixelDepth::Bit8).unwrap();
        assert_eq!(pix.clone().data().as_ptr(), pix.data().as_ptr());
        assert_ne!(pix.deep_clone().data().as_ptr(), pix.data().as_ptr());
    }

    #[test]
    fn test_label_and_resolution() {
        let mut pm = PixMut::new(10, 10, PixelDepth::Bit8).unwrap();
        pm.set_resolution(300, 150);
        pm.set_text(Some("well 1 of 12".to_string()));
        let pix: Pix = pm.into();
        assert_eq!((pix.xres(), pix.yres()), (300, 150));
        assert_eq!(pix.text(), Some("well 1 of 12"));

        // Crops start from a copy and keep the metadata
        let copy: Pix = pix.to_mut().into();
        assert_eq!(copy.text(), Some("well 1 of 12"));
    }

    #[test]
    fn test_create_template_is_zeroed() {
        let mut pm = PixMut::new(20, 10, PixelDepth::Bit8).unwrap();
        pm.set_resolution(72, 72);
        pm.set_all();
        assert_eq!(pm.get_pixel(19, 9), Some(255));
        let src: Pix = pm.into();

        let tmpl = src.create_template();
        assert!(tmpl.sizes_equal(&src));
        assert_eq!(tmpl.xres(), 72);
        assert!(tmpl.data().iter().all(|&w| w == 0));
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(ImageFormat::TiffLzw.extension(), "tif");
        assert!(ImageFormat::TiffZip.is_tiff());
        assert!(!ImageFormat::Png.is_tiff());
    }
}
