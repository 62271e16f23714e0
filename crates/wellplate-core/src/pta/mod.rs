//! Point arrays
//!
//! A [`Pta`] carries the pixels of a rendered shape, such as the filled
//! ellipse of one well, as parallel x and y coordinate vectors.

/// Array of 2D points
#[derive(Debug, Clone, Default)]
pub struct Pta {
    x: Vec<f32>,
    y: Vec<f32>,
}

impl Pta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn push(&mut self, x: f32, y: f32) {
        self.x.push(x);
        self.y.push(y);
    }

    /// Copy with every point shifted by `(dx, dy)`
    pub fn translate(&self, dx: f32, dy: f32) -> Pta {
        Pta {
            x: self.x.iter().map(|&v| v + dx).collect(),
            y: self.y.iter().map(|&v| v + dy).collect(),
        }
    }

    /// Points in insertion order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (f32, f32)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_translate() {
        let mut pta = Pta::new();
        assert!(pta.is_empty());
        pta.push(0.0, 0.0);
        pta.push(1.0, 2.0);
        let moved = pta.translate(10.0, -1.0);
        assert_eq!(moved.iter().collect::<Vec<_>>(), vec![(10.0, -1.0), (11.0, 1.0)]);
        assert_eq!(moved.iter().len(), 2);
        // The source is left alone
        assert_eq!(pta.iter().next(), Some((0.0, 0.0)));
    }
}
