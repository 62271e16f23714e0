//! Image file I/O for the wellplate crates
//!
//! Supported formats (each behind a cargo feature):
//!
//! | Format | Read | Write | Feature       |
//! |--------|------|-------|---------------|
//! | PNM    | yes  | yes   | `pnm`         |
//! | PNG    | yes  | yes   | `png-format`  |
//! | JPEG   | yes  | no    | `jpeg`        |
//! | TIFF   | yes  | yes   | `tiff-format` |
//!
//! Multipage TIFF is used for well stacks: one page per cropped well,
//! with the page label stored in the ImageDescription tag.

mod error;
pub mod format;

#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png-format")]
pub mod png;
#[cfg(feature = "pnm")]
pub mod pnm;
#[cfg(feature = "tiff-format")]
pub mod tiff;

pub use error::{IoError, IoResult};
pub use format::{detect_format, detect_format_from_bytes, format_from_extension};
pub use wellplate_core::ImageFormat;

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;
use wellplate_core::{Pix, Pixa};

/// Read an image from a file path, detecting the format from its header.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Pix> {
    let data = std::fs::read(path)?;
    read_image_mem(&data)
}

/// Read an image from memory, detecting the format from its header.
pub fn read_image_mem(data: &[u8]) -> IoResult<Pix> {
    let format = detect_format_from_bytes(data)?;
    let cursor = Cursor::new(data);
    match format {
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::read_pnm(cursor),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(cursor),
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::read_jpeg(cursor),
        #[cfg(feature = "tiff-format")]
        f if f.is_tiff() => tiff::read_tiff(cursor),
        other => Err(IoError::UnsupportedFormat(format!(
            "reading {:?} is not supported",
            other
        ))),
    }
}

/// Write an image to a file path in the given format.
pub fn write_image<P: AsRef<Path>>(pix: &Pix, path: P, format: ImageFormat) -> IoResult<()> {
    let data = write_image_mem(pix, format)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&data)?;
    writer.flush()?;
    Ok(())
}

/// Encode an image into memory in the given format.
pub fn write_image_mem(pix: &Pix, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    match format {
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::write_pnm(pix, &mut cursor)?,
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(pix, &mut cursor)?,
        #[cfg(feature = "tiff-format")]
        f if f.is_tiff() => {
            let compression = tiff::TiffCompression::from_image_format(f)
                .unwrap_or(tiff::TiffCompression::None);
            tiff::write_tiff(pix, &mut cursor, compression)?
        }
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "writing {:?} is not supported",
                other
            )));
        }
    }
    Ok(cursor.into_inner())
}

/// Write every image of a `Pixa` as one page of a multipage TIFF.
///
/// Page order follows the `Pixa`; each page's text becomes its label.
#[cfg(feature = "tiff-format")]
pub fn write_pixa_tiff<P: AsRef<Path>>(
    pixa: &Pixa,
    path: P,
    compression: tiff::TiffCompression,
) -> IoResult<()> {
    let data = write_pixa_tiff_mem(pixa, compression)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&data)?;
    writer.flush()?;
    Ok(())
}

/// Encode every image of a `Pixa` into an in-memory multipage TIFF.
#[cfg(feature = "tiff-format")]
pub fn write_pixa_tiff_mem(pixa: &Pixa, compression: tiff::TiffCompression) -> IoResult<Vec<u8>> {
    let pages: Vec<&Pix> = pixa.iter().collect();
    let mut cursor = Cursor::new(Vec::new());
    tiff::write_tiff_multipage(&pages, &mut cursor, compression)?;
    Ok(cursor.into_inner())
}

/// Read every page of a multipage TIFF file into a `Pixa`.
#[cfg(feature = "tiff-format")]
pub fn read_pixa_tiff<P: AsRef<Path>>(path: P) -> IoResult<Pixa> {
    let reader = BufReader::new(File::open(path)?);
    Ok(tiff::read_tiff_multipage(reader)?.into_iter().collect())
}
