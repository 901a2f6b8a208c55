//! Data-parallel median filter.
//!
//! Rows are partitioned into contiguous chunks of `ceil(height / workers)`;
//! each worker thread computes the same 3x3 clamped median as the sequential
//! filter and writes its disjoint band of the output buffer. Bands never
//! overlap, so the only synchronization is joining the workers. Worker threads
//! live only for the duration of one `apply` call.

use image::RgbImage;

use super::median::median_rows;

/// Apply the 3x3 median filter using `workers` row-partitioned threads.
///
/// Produces output byte-identical to the sequential filter for any worker
/// count; a worker count of 0 is treated as 1.
pub fn median_parallel(input: &RgbImage, workers: usize) -> RgbImage {
    let (width, height) = input.dimensions();
    let workers = workers.max(1) as u32;
    let chunk_rows = height.div_ceil(workers);
    let row_bytes = width as usize * 3;

    let mut raw = vec![0u8; input.as_raw().len()];

    std::thread::scope(|scope| {
        let mut rest: &mut [u8] = &mut raw;
        let mut start = 0u32;
        while start < height {
            let stop = (start + chunk_rows).min(height);
            let (band, tail) = rest.split_at_mut((stop - start) as usize * row_bytes);
            rest = tail;
            scope.spawn(move || median_rows(input, start..stop, band));
            start = stop;
        }
    });

    RgbImage::from_raw(width, height, raw).expect("buffer matches dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::median::median;
    use image::Rgb;

    fn test_image(width: u32, height: u32) -> RgbImage {
        let mut img = RgbImage::new(width, height);
        for (x, y, p) in img.enumerate_pixels_mut() {
            // Deterministic noise covering the full value range
            let v = x.wrapping_mul(31).wrapping_add(y.wrapping_mul(17));
            *p = Rgb([(v % 256) as u8, (v * 7 % 256) as u8, (v * 13 % 256) as u8]);
        }
        img
    }

    #[test]
    fn test_one_and_four_workers_identical() {
        let img = test_image(17, 23);
        let one = median_parallel(&img, 1);
        let four = median_parallel(&img, 4);
        assert_eq!(one.as_raw(), four.as_raw());
    }

    #[test]
    fn test_matches_sequential() {
        let img = test_image(9, 11);
        for workers in [1, 2, 3, 8] {
            assert_eq!(median_parallel(&img, workers), median(&img));
        }
    }

    #[test]
    fn test_more_workers_than_rows() {
        // 3 rows, 8 workers: the spare workers simply get no band.
        let img = test_image(5, 3);
        assert_eq!(median_parallel(&img, 8), median(&img));
    }

    #[test]
    fn test_zero_workers_treated_as_one() {
        let img = test_image(4, 4);
        assert_eq!(median_parallel(&img, 0), median(&img));
    }
}
