//! PNM (Portable Any Map) format support
//!
//! Reads PBM, PGM, and PPM in both ASCII (P1/P2/P3) and binary
//! (P4/P5/P6) variants. Writes binary P4 (1 bpp), P5 (8 and 16 bpp),
//! and P6 (32 bpp).

use crate::{IoError, IoResult};
use std::io::{BufRead, Write};
use wellplate_core::{Pix, PixMut, PixelDepth, color};

/// Header fields of a PNM file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PnmHeader {
    kind: u8,
    width: u32,
    height: u32,
    maxval: u32,
}

/// Read one whitespace-delimited token, skipping `#` comments.
fn read_token<R: BufRead>(reader: &mut R) -> IoResult<String> {
    let mut token = String::new();
    let mut in_comment = false;
    let mut byte = [0u8; 1];
    loop {
        if reader.read(&mut byte)? == 0 {
            break;
        }
        let c = byte[0];
        if in_comment {
            in_comment = c != b'\n';
            continue;
        }
        match c {
            b'#' if token.is_empty() => in_comment = true,
            c if c.is_ascii_whitespace() => {
                if !token.is_empty() {
                    break;
                }
            }
            c => token.push(c as char),
        }
    }
    if token.is_empty() {
        return Err(IoError::InvalidData("unexpected end of PNM data".to_string()));
    }
    Ok(token)
}

fn read_number<R: BufRead>(reader: &mut R) -> IoResult<u32> {
    let token = read_token(reader)?;
    token
        .parse()
        .map_err(|_| IoError::InvalidData(format!("invalid PNM number: {:?}", token)))
}

fn read_header<R: BufRead>(reader: &mut R) -> IoResult<PnmHeader> {
    let magic = read_token(reader)?;
    let kind = match magic.as_bytes() {
        [b'P', k @ b'1'..=b'6'] => *k - b'0',
        _ => {
            return Err(IoError::InvalidData(format!(
                "invalid PNM magic: {:?}",
                magic
            )));
        }
    };
    let width = read_number(reader)?;
    let height = read_number(reader)?;
    let maxval = if kind == 1 || kind == 4 {
        1
    } else {
        read_number(reader)?
    };
    if width == 0 || height == 0 || maxval == 0 || maxval > 0xffff {
        return Err(IoError::InvalidData(format!(
            "invalid PNM header: {}x{} maxval {}",
            width, height, maxval
        )));
    }
    Ok(PnmHeader {
        kind,
        width,
        height,
        maxval,
    })
}

/// Read a PNM image from a reader.
///
/// # Returns
/// A `Pix` at 1 bpp (PBM), 8 or 16 bpp (PGM, by maxval), or 32 bpp (PPM).
pub fn read_pnm<R: BufRead>(mut reader: R) -> IoResult<Pix> {
    let header = read_header(&mut reader)?;
    let PnmHeader {
        kind,
        width,
        height,
        maxval,
    } = header;

    let depth = match kind {
        1 | 4 => PixelDepth::Bit1,
        2 | 5 if maxval > 255 => PixelDepth::Bit16,
        2 | 5 => PixelDepth::Bit8,
        _ => PixelDepth::Bit32,
    };
    let mut pix_mut = PixMut::new(width, height, depth)?;

    // Scale samples to 0..255 for 8-bit and color outputs
    let scale8 = |v: u32| (v.min(maxval) * 255 / maxval) as u8;
    let wide = maxval > 255;

    match kind {
        1..=3 => {
            for y in 0..height {
                for x in 0..width {
                    let val = match kind {
                        1 => read_number(&mut reader)? & 1,
                        2 if wide => read_number(&mut reader)?.min(maxval),
                        2 => scale8(read_number(&mut reader)?) as u32,
                        _ => {
                            let r = scale8(read_number(&mut reader)?);
                            let g = scale8(read_number(&mut reader)?);
                            let b = scale8(read_number(&mut reader)?);
                            color::compose_rgb(r, g, b)
                        }
                    };
                    pix_mut.set_pixel_unchecked(x, y, val);
                }
            }
        }
        4 => {
            let bytes_per_row = width.div_ceil(8) as usize;
            let mut row = vec![0u8; bytes_per_row];
            for y in 0..height {
                reader.read_exact(&mut row)?;
                for x in 0..width {
                    let bit = (row[x as usize / 8] >> (7 - x % 8)) & 1;
                    pix_mut.set_pixel_unchecked(x, y, bit as u32);
                }
            }
        }
        _ => {
            let channels = if kind == 5 { 1 } else { 3 };
            let sample_bytes = if wide { 2 } else { 1 };
            let mut row = vec![0u8; width as usize * channels * sample_bytes];
            for y in 0..height {
                reader.read_exact(&mut row)?;
                let mut samples = row.chunks_exact(sample_bytes).map(|s| {
                    if wide {
                        ((s[0] as u32) << 8) | s[1] as u32
                    } else {
                        s[0] as u32
                    }
                });
                for x in 0..width {
                    let mut next = || samples.next().unwrap_or(0);
                    let val = if channels == 1 {
                        let v = next();
                        if wide { v.min(maxval) } else { scale8(v) as u32 }
                    } else {
                        let (r, g, b) = (next(), next(), next());
                        color::compose_rgb(scale8(r), scale8(g), scale8(b))
                    };
                    pix_mut.set_pixel_unchecked(x, y, val);
                }
            }
        }
    }

    Ok(pix_mut.into())
}

/// Write a `Pix` as binary PNM to a writer.
///
/// Chooses P4 (1 bpp), P5 (8 or 16 bpp grayscale), or P6 (32 bpp RGB)
/// based on the pixel depth. 2 and 4 bpp images are widened to 8 bpp.
pub fn write_pnm<W: Write>(pix: &Pix, mut writer: W) -> IoResult<()> {
    let width = pix.width();
    let height = pix.height();

    match pix.depth() {
        PixelDepth::Bit2 | PixelDepth::Bit4 => return write_pnm(&pix.convert_to_8()?, writer),
        PixelDepth::Bit1 => {
            writeln!(writer, "P4\n{} {}", width, height)?;
            let bytes_per_row = width.div_ceil(8) as usize;
            for y in 0..height {
                let mut row = vec![0u8; bytes_per_row];
                for x in 0..width {
                    if pix.get_pixel_unchecked(x, y) != 0 {
                        row[x as usize / 8] |= 0x80 >> (x % 8);
                    }
                }
                writer.write_all(&row)?;
            }
        }
        PixelDepth::Bit8 | PixelDepth::Bit16 => {
            let wide = pix.depth() == PixelDepth::Bit16;
            let maxval = if wide { 65535 } else { 255 };
            writeln!(writer, "P5\n{} {}\n{}", width, height, maxval)?;
            for y in 0..height {
                for x in 0..width {
                    let v = pix.get_pixel_unchecked(x, y);
                    if wide {
                        writer.write_all(&(v as u16).to_be_bytes())?;
                    } else {
                        writer.write_all(&[v as u8])?;
                    }
                }
            }
        }
        PixelDepth::Bit32 => {
            writeln!(writer, "P6\n{} {}\n255", width, height)?;
            for y in 0..height {
                for x in 0..width {
                    let (r, g, b) = color::extract_rgb(pix.get_pixel_unchecked(x, y));
                    writer.write_all(&[r, g, b])?;
                }
            }
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_ascii_pgm_with_comment() {
        let data = b"P2\n# plate\n3 2\n10\n0 5 10\n10 5 0\n";
        let pix = read_pnm(Cursor::new(&data[..])).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit8);
        assert_eq!(pix.get_pixel(0, 0), Some(0));
        assert_eq!(pix.get_pixel(1, 0), Some(127));
        assert_eq!(pix.get_pixel(2, 0), Some(255));
        assert_eq!(pix.get_pixel(0, 1), Some(255));
    }

    #[test]
    fn test_read_ascii_pbm() {
        let data = b"P1\n4 1\n0 1 1 0\n";
        let pix = read_pnm(Cursor::new(&data[..])).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit1);
        assert_eq!(pix.get_pixel(1, 0), Some(1));
        assert_eq!(pix.get_pixel(3, 0), Some(0));
    }

    #[test]
    fn test_pgm_binary_roundtrip() {
        let mut pm = PixMut::new(5, 3, PixelDepth::Bit8).unwrap();
        for y in 0..3 {
            for x in 0..5 {
                pm.set_pixel_unchecked(x, y, x * 50 + y);
            }
        }
        let pix: Pix = pm.into();
        let mut buf = Vec::new();
        write_pnm(&pix, &mut buf).unwrap();
        assert!(buf.starts_with(b"P5\n5 3\n255\n"));
        let back = read_pnm(Cursor::new(buf)).unwrap();
        assert_eq!(back.data(), pix.data());
    }

    #[test]
    fn test_ppm_and_pbm_binary_roundtrip() {
        let mut pm = PixMut::new(3, 2, PixelDepth::Bit32).unwrap();
        pm.set_rgb(2, 1, 9, 8, 7).unwrap();
        let pix: Pix = pm.into();
        let mut buf = Vec::new();
        write_pnm(&pix, &mut buf).unwrap();
        let back = read_pnm(Cursor::new(buf)).unwrap();
        assert_eq!(back.get_rgb(2, 1), Some((9, 8, 7)));

        let mut pm1 = PixMut::new(10, 2, PixelDepth::Bit1).unwrap();
        pm1.set_pixel(9, 1, 1).unwrap();
        let pix1: Pix = pm1.into();
        let mut buf1 = Vec::new();
        write_pnm(&pix1, &mut buf1).unwrap();
        let back1 = read_pnm(Cursor::new(buf1)).unwrap();
        assert_eq!(back1.data(), pix1.data());
    }

    #[test]
    fn test_16bit_pgm() {
        let mut pm = PixMut::new(2, 1, PixelDepth::Bit16).unwrap();
        pm.set_pixel_unchecked(1, 0, 0x1234);
        let pix: Pix = pm.into();
        let mut buf = Vec::new();
        write_pnm(&pix, &mut buf).unwrap();
        let back = read_pnm(Cursor::new(buf)).unwrap();
        assert_eq!(back.depth(), PixelDepth::Bit16);
        assert_eq!(back.get_pixel(1, 0), Some(0x1234));
    }

    #[test]
    fn test_bad_headers() {
        assert!(read_pnm(Cursor::new(&b"P7\n1 1\n255\n"[..])).is_err());
        assert!(read_pnm(Cursor::new(&b"P5\n0 1\n255\n"[..])).is_err());
        assert!(read_pnm(Cursor::new(&b"P5\n2 2\n255\n\x01"[..])).is_err());
    }
}
