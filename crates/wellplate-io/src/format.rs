//! Recognising image files by their leading bytes

use crate::{IoError, IoResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use wellplate_core::ImageFormat;

/// Signatures checked in order; TIFF appears once per byte order.
const SIGNATURES: &[(&[u8], ImageFormat)] = &[
    (b"\x89PNG\r\n\x1a\n", ImageFormat::Png),
    (b"\xff\xd8\xff", ImageFormat::Jpeg),
    (b"II*\0", ImageFormat::Tiff),
    (b"MM\0*", ImageFormat::Tiff),
];

/// Format of the file at `path`, judged from its first bytes.
pub fn detect_format<P: AsRef<Path>>(path: P) -> IoResult<ImageFormat> {
    let mut head = Vec::with_capacity(8);
    File::open(path)?.take(8).read_to_end(&mut head)?;
    detect_format_from_bytes(&head)
}

/// Format of an encoded image held in memory.
///
/// Any TIFF is reported as [`ImageFormat::Tiff`]; its compression is only
/// known once the first directory is decoded.
pub fn detect_format_from_bytes(data: &[u8]) -> IoResult<ImageFormat> {
    if data.len() < 2 {
        return Err(IoError::InvalidData(format!(
            "{} bytes are too few to tell the format",
            data.len()
        )));
    }
    if let Some(&(_, format)) = SIGNATURES.iter().find(|(sig, _)| data.starts_with(sig)) {
        return Ok(format);
    }
    // Netpbm: P1 to P6
    if data[0] == b'P' && (b'1'..=b'6').contains(&data[1]) {
        return Ok(ImageFormat::Pnm);
    }
    Err(IoError::UnsupportedFormat(
        "not a PNG, JPEG, TIFF or PNM image".to_string(),
    ))
}

/// Guess an output format from a file extension.
///
/// Returns `None` for unknown or missing extensions.
pub fn format_from_extension<P: AsRef<Path>>(path: P) -> Option<ImageFormat> {
    let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "tif" | "tiff" => Some(ImageFormat::Tiff),
        "pnm" | "pbm" | "pgm" | "ppm" => Some(ImageFormat::Pnm),
        _ => None,
    }
}
