//! Synthetic band generators.
//!
//! These produce predictable values so tests can check percentiles and
//! colors by hand.

/// Row-major band where each cell is `col * 1000 + row`.
///
/// ```
/// use test_utils::create_test_band;
///
/// let band = create_test_band(10, 5);
/// assert_eq!(band.len(), 50);
/// assert_eq!(band[1], 1000.0);
/// assert_eq!(band[10], 1.0);
/// ```
pub fn create_test_band(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// NDVI-like band rising linearly from `low` (first cell) to `high` (last cell).
pub fn create_gradient_band(width: usize, height: usize, low: f64, high: f64) -> Vec<f64> {
    let n = width * height;
    if n <= 1 {
        return vec![low; n];
    }
    (0..n)
        .map(|i| low + (high - low) * i as f64 / (n - 1) as f64)
        .collect()
}

/// Change band in `[-0.5, 0.5]` with every `hole_every`-th cell set to `nodata`.
///
/// The band is a gradient so the non-hole values are all distinct.
pub fn create_delta_band(width: usize, height: usize, nodata: f64, hole_every: usize) -> Vec<f64> {
    let mut data = create_gradient_band(width, height, -0.5, 0.5);
    if hole_every > 0 {
        for (i, v) in data.iter_mut().enumerate() {
            if i % hole_every == 0 {
                *v = nodata;
            }
        }
    }
    data
}

pub fn create_constant_band(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Sentinel-2-like reflectance band (0..10000) and a matching QA60 band.
///
/// Odd cells are flagged opaque cloud (bit 10), every fourth cirrus (bit 11).
pub fn create_cloudy_scene(width: usize, height: usize) -> (Vec<f64>, Vec<f64>) {
    let n = width * height;
    let reflectance = (0..n).map(|i| (i % 10_000) as f64 * 10.0).collect();
    let qa = (0..n)
        .map(|i| {
            let mut bits = 0u32;
            if i % 2 == 1 {
                bits |= 1 << 10;
            }
            if i % 4 == 0 {
                bits |= 1 << 11;
            }
            bits as f64
        })
        .collect();
    (reflectance, qa)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_band_endpoints() {
        let band = create_gradient_band(5, 3, -1.0, 1.0);
        assert_eq!(band.len(), 15);
        assert_eq!(band[0], -1.0);
        assert_eq!(band[14], 1.0);
        assert!(band.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_delta_band_holes() {
        let band = create_delta_band(4, 4, -9999.0, 3);
        assert_eq!(band[0], -9999.0);
        assert_eq!(band[3], -9999.0);
        assert!(band[1] > -1.0);
        assert_eq!(band.iter().filter(|&&v| v == -9999.0).count(), 6);
    }

    #[test]
    fn test_cloudy_scene_flags() {
        let (refl, qa) = create_cloudy_scene(2, 2);
        assert_eq!(refl.len(), 4);
        assert_eq!(qa, vec![2048.0, 1024.0, 0.0, 1024.0]);
    }
}
