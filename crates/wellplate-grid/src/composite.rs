//! Masked compositing
//!
//! Suppresses the plate background between wells by multiplying the
//! source with a 0/255 well mask.

use crate::error::{GridError, GridResult};
use wellplate_core::Pix;

/// Apply a well mask to an 8 bpp source image.
///
/// Each output pixel is `mask * source / 255` with integer division. The
/// source is not modified. Compositing twice with a 0/255 mask gives the
/// same result as compositing once.
///
/// # Errors
///
/// Returns [`GridError::Core`] if either image is not 8 bpp or the sizes
/// differ.
pub fn apply_mask(source: &Pix, mask: &Pix) -> GridResult<Pix> {
    source.multiply_by_mask(mask).map_err(GridError::from)
}
