//! Oil-painting stylization.
//!
//! Each output channel takes the most frequent intensity in the clamped
//! square neighborhood around the pixel; ties go to the lowest intensity.
//! The effect flattens gradients into blotches of the locally dominant color.

use image::RgbImage;

/// Neighborhood radius used by the `Oil4` catalog filter.
pub const OIL_RADIUS: u32 = 4;

/// Apply oil-painting stylization with the given neighborhood radius.
pub fn oil(input: &RgbImage, radius: u32) -> RgbImage {
    let (width, height) = input.dimensions();
    let mut out = RgbImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut hist = [[0u16; 256]; 3];
            for j in y.saturating_sub(radius)..=(y + radius).min(height - 1) {
                for i in x.saturating_sub(radius)..=(x + radius).min(width - 1) {
                    let p = input.get_pixel(i, j);
                    for c in 0..3 {
                        hist[c][p[c] as usize] += 1;
                    }
                }
            }
            let px = out.get_pixel_mut(x, y);
            for c in 0..3 {
                px[c] = mode(&hist[c]);
            }
        }
    }
    out
}

/// Index of the first maximum count: the lowest intensity wins ties.
fn mode(hist: &[u16; 256]) -> u8 {
    let mut best = 0usize;
    for (value, &count) in hist.iter().enumerate() {
        if count > hist[best] {
            best = value;
        }
    }
    best as u8
}
