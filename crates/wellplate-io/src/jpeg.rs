//! JPEG image format support
//!
//! Reads JPEG images using the `jpeg-decoder` crate. Plate photographs
//! from cameras usually arrive as JPEG; writing is not supported.

use crate::{IoError, IoResult};
use jpeg_decoder::{Decoder, PixelFormat};
use std::io::Read;
use wellplate_core::{Pix, PixMut, PixelDepth, color};

/// Read a JPEG image from a reader.
///
/// # Arguments
/// * `reader` - A reader positioned at the JPEG SOI marker (`FF D8`)
///
/// # Returns
/// A `Pix` at 8 bpp (grayscale), 16 bpp (16-bit grayscale), or 32 bpp
/// (RGB; CMYK is converted to RGB).
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader);
    let data = decoder
        .decode()
        .map_err(|e| IoError::Decode(format!("JPEG: {}", e)))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::Decode("JPEG has no frame header".to_string()))?;

    let width = info.width as u32;
    let height = info.height as u32;
    let (depth, bytes_per_pixel) = match info.pixel_format {
        PixelFormat::L8 => (PixelDepth::Bit8, 1),
        PixelFormat::L16 => (PixelDepth::Bit16, 2),
        PixelFormat::RGB24 => (PixelDepth::Bit32, 3),
        PixelFormat::CMYK32 => (PixelDepth::Bit32, 4),
        #[allow(unreachable_patterns)]
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported JPEG pixel format: {:?}",
                other
            )));
        }
    };

    let expected = width as usize * height as usize * bytes_per_pixel;
    if data.len() < expected {
        return Err(IoError::InvalidData(format!(
            "JPEG data too short: {} < {}",
            data.len(),
            expected
        )));
    }

    let mut pix_mut = PixMut::new(width, height, depth)?;

    let pixels = data[..expected].chunks_exact(bytes_per_pixel);
    for (i, px) in pixels.enumerate() {
        let x = (i % width as usize) as u32;
        let y = (i / width as usize) as u32;
        let val = match info.pixel_format {
            PixelFormat::L8 => px[0] as u32,
            PixelFormat::L16 => ((px[0] as u32) << 8) | px[1] as u32,
            PixelFormat::RGB24 => color::compose_rgb(px[0], px[1], px[2]),
            _ => {
                // CMYK
                let k = 255 - px[3] as u32;
                let ch = |c: u8| ((255 - c as u32) * k / 255) as u8;
                color::compose_rgb(ch(px[0]), ch(px[1]), ch(px[2]))
            }
        };
        pix_mut.set_pixel_unchecked(x, y, val);
    }

    Ok(pix_mut.into())
}
