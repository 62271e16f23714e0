//! Image stacks
//!
//! A [`Pixa`] keeps images in order together with the box each one was cut
//! from, so a cropped well can be traced back to its place on the plate.
//! Multipage TIFF files are read into and written from a `Pixa`.

use crate::box_::Box;
use crate::pix::Pix;

/// Ordered images with an optional source box per image
#[derive(Debug, Clone, Default)]
pub struct Pixa {
    pix: Vec<Pix>,
    boxes: Vec<Box>,
}

impl Pixa {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pix: Vec::with_capacity(capacity),
            boxes: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pix.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pix.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pix> {
        self.pix.get(index)
    }

    /// Append an image cut from `region` of its source.
    pub fn push_with_box(&mut self, pix: Pix, region: Box) {
        self.pix.push(pix);
        self.boxes.push(region);
    }

    /// Source box of the image at `index`; `None` for images added without one
    pub fn get_box(&self, index: usize) -> Option<&Box> {
        self.boxes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pix> {
        self.pix.iter()
    }
}

impl<'a> IntoIterator for &'a Pixa {
    type Item = &'a Pix;
    type IntoIter = std::slice::Iter<'a, Pix>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Collects images without boxes, as read back from a file.
impl FromIterator<Pix> for Pixa {
    fn from_iter<T: IntoIterator<Item = Pix>>(iter: T) -> Self {
        Self {
            pix: iter.into_iter().collect(),
            boxes: Vec::new(),
        }
    }
}

impl std::ops::Index<usize> for Pixa {
    type Output = Pix;

    fn index(&self, index: usize) -> &Self::Output {
        &self.pix[index]
    }
}
