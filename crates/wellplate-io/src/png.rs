//! PNG codec
//!
//! The decoder expands palettes and sub-byte gray, so a plate photograph
//! arrives as 8 or 16 bpp gray or as 32 bpp RGB(A). Previews and masks are
//! written as 1, 8 or 16 bpp gray, or RGB(A).

use crate::{IoError, IoResult};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};
use wellplate_core::{Pix, PixMut, PixelDepth, color};

/// Depth and samples per pixel a decoded PNG is stored with.
fn pix_layout(color_type: ColorType, bit_depth: BitDepth) -> IoResult<(PixelDepth, u32)> {
    Ok(match (color_type, bit_depth) {
        (ColorType::Grayscale, BitDepth::Eight) => (PixelDepth::Bit8, 1),
        (ColorType::Grayscale, BitDepth::Sixteen) => (PixelDepth::Bit16, 1),
        (ColorType::Rgb, _) => (PixelDepth::Bit32, 3),
        (ColorType::GrayscaleAlpha | ColorType::Rgba, _) => (PixelDepth::Bit32, 4),
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "PNG with {:?} at {:?}",
                color_type, bit_depth
            )));
        }
    })
}

/// Decode a PNG stream.
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::Decode(format!("PNG: {}", e)))?;
    let (width, height) = (reader.info().width, reader.info().height);
    let (color_type, bit_depth) = reader.output_color_type();
    let (depth, spp) = pix_layout(color_type, bit_depth)?;

    let size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::Decode("PNG output buffer size overflows".to_string()))?;
    let mut buf = vec![0; size];
    let frame = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::Decode(format!("PNG frame: {}", e)))?;

    let mut out = PixMut::new(width, height, depth)?;
    out.set_spp(spp);

    let wide = bit_depth == BitDepth::Sixteen;
    let step = if wide { 2 } else { 1 };
    let channels = color_type.samples();
    for (y, line) in buf[..frame.buffer_size()]
        .chunks_exact(frame.line_size)
        .take(height as usize)
        .enumerate()
    {
        for (x, px) in line.chunks_exact(channels * step).take(width as usize).enumerate() {
            // 16-bit samples are big-endian; color keeps the high byte
            let c = |i: usize| px[i * step];
            let val = match color_type {
                ColorType::Grayscale if wide => u32::from(u16::from_be_bytes([px[0], px[1]])),
                ColorType::Grayscale => u32::from(px[0]),
                ColorType::GrayscaleAlpha => color::compose_rgba(c(0), c(0), c(0), c(1)),
                ColorType::Rgb => color::compose_rgb(c(0), c(1), c(2)),
                _ => color::compose_rgba(c(0), c(1), c(2), c(3)),
            };
            out.set_pixel_unchecked(x as u32, y as u32, val);
        }
    }
    Ok(out.into())
}

/// Encode `pix` as PNG.
///
/// 2 and 4 bpp images are widened to 8 bpp gray first. At 1 bpp, set
/// pixels come out black.
pub fn write_png<W: Write>(pix: &Pix, writer: W) -> IoResult<()> {
    let (color_type, bit_depth) = match pix.depth() {
        PixelDepth::Bit2 | PixelDepth::Bit4 => return write_png(&pix.convert_to_8()?, writer),
        PixelDepth::Bit1 => (ColorType::Grayscale, BitDepth::One),
        PixelDepth::Bit8 => (ColorType::Grayscale, BitDepth::Eight),
        PixelDepth::Bit16 => (ColorType::Grayscale, BitDepth::Sixteen),
        PixelDepth::Bit32 if pix.spp() == 4 => (ColorType::Rgba, BitDepth::Eight),
        PixelDepth::Bit32 => (ColorType::Rgb, BitDepth::Eight),
    };
    let (width, height) = (pix.width(), pix.height());
    let bits = color_type.samples() * bit_depth as usize;
    let line = (width as usize * bits).div_ceil(8);

    let mut data = vec![0u8; line * height as usize];
    for (y, row) in data.chunks_exact_mut(line).enumerate() {
        for x in 0..width {
            let val = pix.get_pixel_unchecked(x, y as u32);
            let i = x as usize;
            match (color_type, bit_depth) {
                (ColorType::Grayscale, BitDepth::One) => {
                    if val == 0 {
                        row[i / 8] |= 0x80 >> (i % 8);
                    }
                }
                (ColorType::Grayscale, BitDepth::Sixteen) => {
                    row[2 * i..2 * i + 2].copy_from_slice(&(val as u16).to_be_bytes());
                }
                (ColorType::Grayscale, _) => row[i] = val as u8,
                (ColorType::Rgb, _) => {
                    let (r, g, b) = color::extract_rgb(val);
                    row[3 * i..3 * i + 3].copy_from_slice(&[r, g, b]);
                }
                _ => {
                    let (r, g, b, a) = color::extract_rgba(val);
                    row[4 * i..4 * i + 4].copy_from_slice(&[r, g, b, a]);
                }
            }
        }
    }

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(bit_depth);
    encoder
        .write_header()
        .and_then(|mut w| w.write_image_data(&data))
        .map_err(|e| IoError::Encode(format!("PNG: {}", e)))
}
