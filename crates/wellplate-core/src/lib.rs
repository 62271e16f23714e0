//! Image primitives for plate segmentation
//!
//! - [`Pix`] / [`PixMut`]: shared and writable images
//! - [`Box`]: rectangles for regions of interest and well crops
//! - [`Pta`]: point arrays carrying rendered shapes
//! - [`Pixa`]: images with their source boxes, such as a plate's well stack

pub mod box_;
pub mod error;
pub mod pix;
pub mod pixa;
pub mod pta;

pub use box_::Box;
pub use error::{Error, Result};
pub use pix::{ImageFormat, Pix, PixMut, PixelDepth, PixelOp};
pub use pixa::Pixa;
pub use pta::Pta;

/// Packing of 32 bpp pixels as `0xRRGGBBAA`
pub mod color {
    const RED_SHIFT: u32 = 24;
    const GREEN_SHIFT: u32 = 16;
    const BLUE_SHIFT: u32 = 8;

    #[inline]
    fn channel(pixel: u32, shift: u32) -> u8 {
        (pixel >> shift) as u8
    }

    /// Opaque RGB pixel
    #[inline]
    pub fn compose_rgb(r: u8, g: u8, b: u8) -> u32 {
        compose_rgba(r, g, b, 255)
    }

    #[inline]
    pub fn compose_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
        u32::from_be_bytes([r, g, b, a])
    }

    #[inline]
    pub fn alpha(pixel: u32) -> u8 {
        pixel as u8
    }

    #[inline]
    pub fn extract_rgb(pixel: u32) -> (u8, u8, u8) {
        (
            channel(pixel, RED_SHIFT),
            channel(pixel, GREEN_SHIFT),
            channel(pixel, BLUE_SHIFT),
        )
    }

    #[inline]
    pub fn extract_rgba(pixel: u32) -> (u8, u8, u8, u8) {
        let (r, g, b) = extract_rgb(pixel);
        (r, g, b, alpha(pixel))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_compose_extract() {
            let p = compose_rgb(1, 2, 3);
            assert_eq!(p, 0x0102_03ff);
            assert_eq!(extract_rgb(p), (1, 2, 3));
            assert_eq!(alpha(p), 255);
            assert_eq!(extract_rgba(compose_rgba(9, 8, 7, 6)), (9, 8, 7, 6));
        }
    }
}
