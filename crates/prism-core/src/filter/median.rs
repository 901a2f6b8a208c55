//! 3x3 median filter over a clamped neighborhood.
//!
//! Each channel is computed independently: the R, G, and B samples of the
//! neighborhood are sorted separately and the element at index `count / 2` is
//! taken. For even sample counts (edges and corners) that is the upper median,
//! never an average — the data-parallel variant reproduces this bit-for-bit.

use std::ops::Range;

use image::RgbImage;

/// Apply the sequential 3x3 median filter to the whole image.
pub fn median(input: &RgbImage) -> RgbImage {
    let (width, height) = input.dimensions();
    let mut raw = vec![0u8; input.as_raw().len()];
    median_rows(input, 0..height, &mut raw);
    RgbImage::from_raw(width, height, raw).expect("buffer matches dimensions")
}

/// Compute median-filtered pixels for the row range `rows`, writing them into
/// `out`, which must hold exactly `rows.len() * width * 3` bytes.
///
/// The neighborhood is always read from the full input image, so chunk
/// boundaries do not affect the result; partitioning rows across workers is
/// purely a scheduling choice.
pub(crate) fn median_rows(input: &RgbImage, rows: Range<u32>, out: &mut [u8]) {
    let width = input.width() as usize;
    debug_assert_eq!(out.len(), rows.len() * width * 3);

    let row_start = rows.start;
    for y in rows {
        for x in 0..input.width() {
            let px = median_pixel(input, x, y);
            let off = ((y - row_start) as usize * width + x as usize) * 3;
            out[off..off + 3].copy_from_slice(&px);
        }
    }
}

/// Median of the clamped 3x3 neighborhood of (x, y), one channel at a time.
///
/// Interior pixels see 9 samples, edge pixels 6, corner pixels 4; there is no
/// wraparound.
fn median_pixel(input: &RgbImage, x: u32, y: u32) -> [u8; 3] {
    let (width, height) = input.dimensions();
    let mut r = [0u8; 9];
    let mut g = [0u8; 9];
    let mut b = [0u8; 9];
    let mut count = 0;

    for i in x.saturating_sub(1)..=(x + 1).min(width - 1) {
        for j in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            let p = input.get_pixel(i, j);
            r[count] = p[0];
            g[count] = p[1];
            b[count] = p[2];
            count += 1;
        }
    }

    r[..count].sort_unstable();
    g[..count].sort_unstable();
    b[..count].sort_unstable();
    [r[count / 2], g[count / 2], b[count / 2]]
}
