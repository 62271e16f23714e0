//! Rectangles
//!
//! A [`Box`] is the operator's region of interest or the crop rectangle
//! of one well. Boxes may extend past an image; [`Box::clip`] trims them.

use crate::error::{Error, Result};
use std::str::FromStr;

/// Axis-aligned rectangle in pixel coordinates
///
/// `(x, y)` is the top-left corner; `right()` and `bottom()` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Box {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Box {
    /// Rectangle with a non-negative size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a negative width or height.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Result<Self> {
        if w < 0 || h < 0 {
            return Err(Error::InvalidParameter(format!(
                "box size must be non-negative, got {w}x{h}"
            )));
        }
        Ok(Self { x, y, w, h })
    }

    pub const fn new_unchecked(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Overlap of two boxes, `None` when they share no pixel
    pub fn intersect(&self, other: &Box) -> Option<Box> {
        let (x, y) = (self.x.max(other.x), self.y.max(other.y));
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        (x < right && y < bottom).then(|| Box::new_unchecked(x, y, right - x, bottom - y))
    }

    /// Part of the box inside a `width x height` image
    pub fn clip(&self, width: i32, height: i32) -> Option<Box> {
        self.intersect(&Box::new_unchecked(0, 0, width, height))
    }
}

/// Parse a box from `"x,y,w,h"`.
impl FromStr for Box {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<i32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::InvalidParameter(format!("bad box '{s}': {e}")))?;
        match parts.as_slice() {
            &[x, y, w, h] => Box::new(x, y, w, h),
            _ => Err(Error::InvalidParameter(format!(
                "bad box '{s}': expected x,y,w,h"
            ))),
        }
    }
}
