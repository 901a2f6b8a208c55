//! Per-pixel point filters: channel inversion and solarization.

use image::RgbImage;

/// Invert every channel: `v -> 255 - v`.
pub fn invert(input: &RgbImage) -> RgbImage {
    let (width, height) = input.dimensions();
    let raw: Vec<u8> = input.as_raw().iter().map(|&v| 255 - v).collect();
    RgbImage::from_raw(width, height, raw).expect("buffer matches dimensions")
}

/// Solarize every channel by folding it about the midpoint: `v -> |2v - 255|`.
///
/// Both extremes map to full intensity, mid-gray maps to near black.
pub fn solarize(input: &RgbImage) -> RgbImage {
    let (width, height) = input.dimensions();
    let raw: Vec<u8> = input
        .as_raw()
        .iter()
        .map(|&v| (2 * v as i32 - 255).unsigned_abs() as u8)
        .collect();
    RgbImage::from_raw(width, height, raw).expect("buffer matches dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_invert_known_values() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([0, 128, 255]));
        img.put_pixel(1, 0, Rgb([10, 20, 30]));

        let out = invert(&img);
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 127, 0]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([245, 235, 225]));
    }

    #[test]
    fn test_invert_is_involution() {
        let mut img = RgbImage::new(3, 3);
        for (i, p) in img.pixels_mut().enumerate() {
            *p = Rgb([i as u8 * 7, i as u8 * 13, i as u8 * 29]);
        }
        assert_eq!(invert(&invert(&img)), img);
    }

    #[test]
    fn test_solarize_extremes_and_midpoint() {
        let mut img = RgbImage::new(1, 1);
        img.put_pixel(0, 0, Rgb([0, 255, 127]));
        let out = solarize(&img);
        // Black and white both fold to full intensity; 127 folds to 1.
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 255, 1]));
    }
}
