//! Pixel masking regression test
//!
//! Exercises the primitives the well mask is made of: filled ellipses,
//! inversion, multiplicative masking, rectangle clipping and reduction
//! to 8 bpp gray.

use wellplate_core::{Box, Pix, PixMut, PixelDepth, PixelOp};
use wellplate_test::{RegParams, ramp_image};

fn count_value(pix: &Pix, v: u32) -> usize {
    let mut n = 0;
    for y in 0..pix.height() {
        for x in 0..pix.width() {
            if pix.get_pixel_unchecked(x, y) == v {
                n += 1;
            }
        }
    }
    n
}

#[test]
fn pixmask_reg() {
    let mut rp = RegParams::new("pixmask");

    // --- Test 1: black ellipse on white, inverted ---
    let mut canvas = PixMut::new(60, 40, PixelDepth::Bit8).unwrap();
    canvas.set_all();
    canvas.render_filled_ellipse(10, 5, 40, 30, PixelOp::Clear);
    canvas.invert_inplace();
    let mask: Pix = canvas.into();
    rp.write_pix(&mask, "mask").unwrap();

    let on = count_value(&mask, 255);
    let off = count_value(&mask, 0);
    rp.compare_values((60 * 40) as f64, (on + off) as f64, 0.0);
    // Area close to pi/4 of the bounding box
    let expected = std::f64::consts::FRAC_PI_4 * 40.0 * 30.0;
    rp.compare_values(expected, on as f64, expected * 0.05);
    rp.compare_values(255.0, mask.get_pixel(30, 20).unwrap_or(0) as f64, 0.0);
    rp.compare_values(0.0, mask.get_pixel(10, 5).unwrap_or(1) as f64, 0.0);

    // --- Test 2: masking a ramp ---
    let src = ramp_image(60, 40).unwrap();
    let masked = src.multiply_by_mask(&mask).unwrap();
    rp.compare_values(
        src.get_pixel(30, 20).unwrap_or(0) as f64,
        masked.get_pixel(30, 20).unwrap_or(1) as f64,
        0.0,
    );
    rp.compare_values(off as f64, count_value(&masked, 0) as f64, 0.0);
    let twice = masked.multiply_by_mask(&mask).unwrap();
    rp.compare_pix(&masked, &twice);

    // --- Test 3: double inversion is the identity ---
    rp.compare_pix(&src, &src.invert().invert());

    // --- Test 4: clipping a box that runs off the image ---
    let (clip, used) = src.clip_box(&Box::new_unchecked(50, 30, 20, 20)).unwrap();
    rp.compare_values(10.0, clip.width() as f64, 0.0);
    rp.compare_values(10.0, used.h as f64, 0.0);
    rp.compare_values(
        src.get_pixel(55, 35).unwrap_or(0) as f64,
        clip.get_pixel(5, 5).unwrap_or(1) as f64,
        0.0,
    );
    rp.compare_values(
        1.0,
        if src.clip_box(&Box::new_unchecked(100, 100, 5, 5)).is_err() { 1.0 } else { 0.0 },
        0.0,
    );

    // --- Test 5: color reduces to gray ---
    let mut rgb = PixMut::new(4, 4, PixelDepth::Bit32).unwrap();
    rgb.set_rgb(1, 1, 120, 120, 120).unwrap();
    let gray = Pix::from(rgb).convert_to_8().unwrap();
    rp.compare_values(8.0, gray.depth().bits() as f64, 0.0);
    rp.compare_values(120.0, gray.get_pixel(1, 1).unwrap_or(0) as f64, 1.0);

    assert!(rp.cleanup());
}
