//! Filled ellipse rendering
//!
//! Wells are drawn as filled axis-aligned ellipses. The shape is generated
//! once as a point array ([`Pta`]) and then stamped onto an image with a
//! [`PixelOp`].

use super::PixMut;
use crate::pta::Pta;

/// What rendering does to each covered pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelOp {
    /// Maximum value for the depth
    #[default]
    Set,
    /// Zero
    Clear,
}

/// Points of a filled ellipse inscribed in a `w x h` rectangle at the origin.
///
/// A pixel belongs to the ellipse when its center lies on or inside the
/// boundary, so the shape is symmetric about both axes of the rectangle and
/// a 1x1 ellipse is a single pixel. Empty if either side is 0.
pub fn generate_filled_ellipse_pta(w: u32, h: u32) -> Pta {
    if w == 0 || h == 0 {
        return Pta::new();
    }

    let mut pta = Pta::with_capacity((w as usize) * (h as usize));
    let a = w as f64 / 2.0;
    let b = h as f64 / 2.0;
    for y in 0..h {
        let dy = (y as f64 + 0.5 - b) / b;
        for x in 0..w {
            let dx = (x as f64 + 0.5 - a) / a;
            if dx * dx + dy * dy <= 1.0 {
                pta.push(x as f32, y as f32);
            }
        }
    }
    pta
}

impl PixMut {
    /// Apply `op` at every point of `pta`; points off the image are skipped.
    pub fn render_pta(&mut self, pta: &Pta, op: PixelOp) {
        let (w, h) = (self.width() as i32, self.height() as i32);
        let value = match op {
            PixelOp::Set => self.depth().max_value(),
            PixelOp::Clear => 0,
        };
        for (x, y) in pta.iter() {
            let (xi, yi) = (x as i32, y as i32);
            if (0..w).contains(&xi) && (0..h).contains(&yi) {
                self.set_pixel_unchecked(xi as u32, yi as u32, value);
            }
        }
    }

    /// Render a filled ellipse inscribed in the `w x h` rectangle at `(x, y)`.
    ///
    /// `(x, y)` is the top-left corner of the bounding rectangle, not the
    /// center. Parts falling outside the image are clipped.
    pub fn render_filled_ellipse(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        op: PixelOp,
    ) {
        let base = generate_filled_ellipse_pta(w, h);
        self.render_pta(&base.translate(x as f32, y as f32), op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Pix, PixelDepth};

    fn count_on(pix: &Pix) -> usize {
        (0..pix.height())
            .flat_map(|y| (0..pix.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| pix.get_pixel_unchecked(x, y) != 0)
            .count()
    }

    #[test]
    fn test_ellipse_degenerate() {
        assert!(generate_filled_ellipse_pta(0, 5).is_empty());
        assert_eq!(generate_filled_ellipse_pta(1, 1).len(), 1);
    }

    #[test]
    fn test_ellipse_area_close_to_analytic() {
        let pta = generate_filled_ellipse_pta(100, 60);
        let analytic = std::f64::consts::PI * 50.0 * 30.0;
        let rel = (pta.len() as f64 - analytic).abs() / analytic;
        assert!(rel < 0.02, "area {} vs {}", pta.len(), analytic);
    }

    #[test]
    fn test_ellipse_stays_in_bounding_box() {
        let pta = generate_filled_ellipse_pta(17, 9);
        for (x, y) in pta.iter() {
            assert!((0.0..17.0).contains(&x));
            assert!((0.0..9.0).contains(&y));
        }
    }

    #[test]
    fn test_render_filled_ellipse_corners_empty() {
        let mut pm = PixMut::new(40, 30, PixelDepth::Bit8).unwrap();
        pm.render_filled_ellipse(5, 5, 20, 10, PixelOp::Set);
        // Bounding-box corners are outside the ellipse
        assert_eq!(pm.get_pixel(5, 5), Some(0));
        assert_eq!(pm.get_pixel(24, 14), Some(0));
        assert_eq!(pm.get_pixel(15, 10), Some(255));
        assert_eq!(pm.get_pixel(4, 10), Some(0));
        assert_eq!(pm.get_pixel(25, 10), Some(0));
    }

    #[test]
    fn test_render_clips_to_image() {
        let mut pm = PixMut::new(10, 10, PixelDepth::Bit8).unwrap();
        pm.render_filled_ellipse(-5, -5, 10, 10, PixelOp::Set);
        let pix: Pix = pm.into();
        assert!(count_on(&pix) > 0);
        assert_eq!(pix.get_pixel(9, 9), Some(0));
    }

    #[test]
    fn test_render_clear() {
        let mut pm = PixMut::new(10, 10, PixelDepth::Bit8).unwrap();
        pm.set_all();
        pm.render_filled_ellipse(2, 2, 3, 3, PixelOp::Clear);
        assert_eq!(pm.get_pixel(3, 3), Some(0));
        assert_eq!(pm.get_pixel(0, 0), Some(255));
        let pix: Pix = pm.into();
        let cleared = generate_filled_ellipse_pta(3, 3).len();
        assert_eq!(count_on(&pix), 100 - cleared);
    }
}
