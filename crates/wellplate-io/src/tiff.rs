//! TIFF codec for well stacks
//!
//! Reading and writing of single and multipage TIFFs. Every page carries
//! the image text as its `ImageDescription` tag, which is how per-well
//! labels survive a round trip through a well stack.

use crate::{IoError, IoResult};
use std::io::{Read, Seek, Write};
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{self, Gray8, Gray16, RGB8, RGBA8};
use tiff::encoder::{Compression, DeflateLevel, TiffEncoder, TiffValue};
use tiff::tags::Tag;
use wellplate_core::{ImageFormat, Pix, PixMut, PixelDepth, color};

/// Compression applied to every page that is written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiffCompression {
    #[default]
    None,
    PackBits,
    /// What the CLI uses for well stacks
    Lzw,
    /// Deflate
    Zip,
}

impl TiffCompression {
    /// Compression implied by a TIFF `ImageFormat`; `None` for other formats.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        Some(match format {
            ImageFormat::Tiff => Self::None,
            ImageFormat::TiffPackbits => Self::PackBits,
            ImageFormat::TiffLzw => Self::Lzw,
            ImageFormat::TiffZip => Self::Zip,
            _ => return None,
        })
    }

    fn codec(self) -> Compression {
        match self {
            Self::None => Compression::Uncompressed,
            Self::PackBits => Compression::Packbits,
            Self::Lzw => Compression::Lzw,
            Self::Zip => Compression::Deflate(DeflateLevel::default()),
        }
    }
}

fn decode_err(e: impl std::fmt::Display) -> IoError {
    IoError::Decode(format!("TIFF: {}", e))
}

fn encode_err(e: impl std::fmt::Display) -> IoError {
    IoError::Encode(format!("TIFF: {}", e))
}

/// First page of a TIFF; later pages are ignored.
pub fn read_tiff<R: Read + Seek>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader).map_err(decode_err)?;
    decode_tiff_image(&mut decoder)
}

/// Every page of a TIFF in file order, such as the wells of a stack.
pub fn read_tiff_multipage<R: Read + Seek>(reader: R) -> IoResult<Vec<Pix>> {
    let mut decoder = Decoder::new(reader).map_err(decode_err)?;
    let mut pages = vec![decode_tiff_image(&mut decoder)?];
    while decoder.more_images() {
        decoder.next_image().map_err(decode_err)?;
        pages.push(decode_tiff_image(&mut decoder)?);
    }
    Ok(pages)
}

/// Decode the directory the decoder is positioned on.
fn decode_tiff_image<R: Read + Seek>(decoder: &mut Decoder<R>) -> IoResult<Pix> {
    let (width, height) = decoder.dimensions().map_err(decode_err)?;
    let color_type = decoder.colortype().map_err(decode_err)?;
    // 0 = WhiteIsZero
    let white_is_zero = decoder
        .get_tag_u32(Tag::PhotometricInterpretation)
        .map(|v| v == 0)
        .unwrap_or(false);
    let description = decoder.get_tag_ascii_string(Tag::ImageDescription).ok();
    let xres = decoder.get_tag_f32(Tag::XResolution).ok();
    let yres = decoder.get_tag_f32(Tag::YResolution).ok();

    let (pix_depth, spp) = match color_type {
        ColorType::Gray(1) => (PixelDepth::Bit1, 1),
        ColorType::Gray(2) => (PixelDepth::Bit2, 1),
        ColorType::Gray(4) => (PixelDepth::Bit4, 1),
        ColorType::Gray(8) => (PixelDepth::Bit8, 1),
        ColorType::Gray(16) => (PixelDepth::Bit16, 1),
        ColorType::RGB(8) | ColorType::RGB(16) => (PixelDepth::Bit32, 3),
        ColorType::RGBA(8) | ColorType::RGBA(16) => (PixelDepth::Bit32, 4),
        ColorType::GrayA(8) | ColorType::GrayA(16) => (PixelDepth::Bit32, 4),
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "TIFF pages of type {:?}",
                color_type
            )));
        }
    };

    let image_data = decoder.read_image().map_err(decode_err)?;

    let mut pix_mut = PixMut::new(width, height, pix_depth)?;
    pix_mut.set_spp(spp);
    pix_mut.set_text(description);
    if let (Some(x), Some(y)) = (xres, yres) {
        pix_mut.set_resolution(x.round() as i32, y.round() as i32);
    }

    // Pix 1 bpp uses 1 for black, the opposite of BlackIsZero
    let invert = match pix_depth {
        PixelDepth::Bit1 => !white_is_zero,
        PixelDepth::Bit32 => false,
        _ => white_is_zero,
    };

    match image_data {
        DecodingResult::U8(data) => convert_u8_to_pix(&data, &mut pix_mut, color_type)?,
        DecodingResult::U16(data) => convert_u16_to_pix(&data, &mut pix_mut, color_type)?,
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported TIFF sample format for {:?}",
                color_type
            )));
        }
    }

    if invert {
        pix_mut.invert_inplace();
    }
    Ok(pix_mut.into())
}

/// Unpack 8-bit (or packed sub-byte gray) samples into `pix_mut`.
fn convert_u8_to_pix(data: &[u8], pix_mut: &mut PixMut, color_type: ColorType) -> IoResult<()> {
    let width = pix_mut.width();
    let height = pix_mut.height();

    let samples = match color_type {
        ColorType::Gray(bits) => {
            // Sub-byte samples are packed MSB first, rows padded to bytes
            let bits = bits as usize;
            let bytes_per_row = (width as usize * bits).div_ceil(8);
            let mask = ((1u32 << bits) - 1) as u8;
            check_len(data.len(), bytes_per_row * height as usize)?;
            for y in 0..height {
                let row = &data[y as usize * bytes_per_row..][..bytes_per_row];
                for x in 0..width {
                    let bit = x as usize * bits;
                    let shift = 8 - bits - bit % 8;
                    let val = (row[bit / 8] >> shift) & mask;
                    pix_mut.set_pixel_unchecked(x, y, val as u32);
                }
            }
            return Ok(());
        }
        ColorType::GrayA(_) => 2,
        ColorType::RGB(_) => 3,
        _ => 4,
    };

    check_len(data.len(), (width * height) as usize * samples)?;
    for (i, px) in data.chunks_exact(samples).enumerate() {
        let (x, y) = (i as u32 % width, i as u32 / width);
        if y >= height {
            break;
        }
        let pixel = match samples {
            2 => color::compose_rgba(px[0], px[0], px[0], px[1]),
            3 => color::compose_rgb(px[0], px[1], px[2]),
            _ => color::compose_rgba(px[0], px[1], px[2], px[3]),
        };
        pix_mut.set_pixel_unchecked(x, y, pixel);
    }
    Ok(())
}

/// Unpack 16-bit samples into `pix_mut`.
///
/// 16-bit gray is kept; color samples are reduced to their high byte.
fn convert_u16_to_pix(data: &[u16], pix_mut: &mut PixMut, color_type: ColorType) -> IoResult<()> {
    let width = pix_mut.width();
    let height = pix_mut.height();

    let samples = match color_type {
        ColorType::Gray(_) => 1,
        ColorType::GrayA(_) => 2,
        ColorType::RGB(_) => 3,
        _ => 4,
    };

    check_len(data.len(), (width * height) as usize * samples)?;
    let hi = |v: u16| (v >> 8) as u8;
    for (i, px) in data.chunks_exact(samples).enumerate() {
        let (x, y) = (i as u32 % width, i as u32 / width);
        if y >= height {
            break;
        }
        let pixel = match samples {
            1 => px[0] as u32,
            2 => color::compose_rgba(hi(px[0]), hi(px[0]), hi(px[0]), hi(px[1])),
            3 => color::compose_rgb(hi(px[0]), hi(px[1]), hi(px[2])),
            _ => color::compose_rgba(hi(px[0]), hi(px[1]), hi(px[2]), hi(px[3])),
        };
        pix_mut.set_pixel_unchecked(x, y, pixel);
    }
    Ok(())
}

fn check_len(actual: usize, expected: usize) -> IoResult<()> {
    if actual < expected {
        return Err(IoError::InvalidData(format!(
            "TIFF strip data too short: {} < {}",
            actual, expected
        )));
    }
    Ok(())
}

/// Single-page TIFF
pub fn write_tiff<W: Write + Seek>(
    pix: &Pix,
    writer: W,
    compression: TiffCompression,
) -> IoResult<()> {
    write_tiff_multipage(&[pix], writer, compression)
}

/// One page per image, in order, each labelled with its text.
///
/// Pages may differ in size and depth. An empty list is an error, since
/// a TIFF needs at least one directory.
pub fn write_tiff_multipage<W: Write + Seek>(
    pages: &[&Pix],
    writer: W,
    compression: TiffCompression,
) -> IoResult<()> {
    if pages.is_empty() {
        return Err(IoError::InvalidData("a TIFF needs at least one page".to_string()));
    }

    let mut encoder = TiffEncoder::new(writer)
        .map_err(encode_err)?
        .with_compression(compression.codec());

    for pix in pages {
        write_pix_page(&mut encoder, pix)?;
    }

    Ok(())
}

/// Append `pix` as the next directory. Sub-byte depths go out as 8 bpp.
fn write_pix_page<W: Write + Seek>(encoder: &mut TiffEncoder<W>, pix: &Pix) -> IoResult<()> {
    let width = pix.width();
    let height = pix.height();
    let pixels = || (0..height).flat_map(move |y| (0..width).map(move |x| (x, y)));

    match pix.depth() {
        PixelDepth::Bit1 | PixelDepth::Bit2 | PixelDepth::Bit4 => {
            write_pix_page(encoder, &pix.convert_to_8()?)
        }
        PixelDepth::Bit8 => {
            let data: Vec<u8> = pixels()
                .map(|(x, y)| pix.get_pixel_unchecked(x, y) as u8)
                .collect();
            write_page_data::<W, Gray8>(encoder, pix, &data)
        }
        PixelDepth::Bit16 => {
            let data: Vec<u16> = pixels()
                .map(|(x, y)| pix.get_pixel_unchecked(x, y) as u16)
                .collect();
            write_page_data::<W, Gray16>(encoder, pix, &data)
        }
        PixelDepth::Bit32 if pix.spp() == 4 => {
            let data: Vec<u8> = pixels()
                .flat_map(|(x, y)| {
                    let (r, g, b, a) = color::extract_rgba(pix.get_pixel_unchecked(x, y));
                    [r, g, b, a]
                })
                .collect();
            write_page_data::<W, RGBA8>(encoder, pix, &data)
        }
        PixelDepth::Bit32 => {
            let data: Vec<u8> = pixels()
                .flat_map(|(x, y)| {
                    let (r, g, b) = color::extract_rgb(pix.get_pixel_unchecked(x, y));
                    [r, g, b]
                })
                .collect();
            write_page_data::<W, RGB8>(encoder, pix, &data)
        }
    }
}

fn write_page_data<W, C>(
    encoder: &mut TiffEncoder<W>,
    pix: &Pix,
    data: &[C::Inner],
) -> IoResult<()>
where
    W: Write + Seek,
    C: colortype::ColorType,
    [C::Inner]: TiffValue,
{
    let mut image = encoder
        .new_image::<C>(pix.width(), pix.height())
        .map_err(encode_err)?;
    if let Some(text) = pix.text() {
        image
            .encoder()
            .write_tag(Tag::ImageDescription, text)
            .map_err(encode_err)?;
    }
    image.write_data(data).map_err(encode_err)
}
