//! Color ramps and value normalization.

use serde::{Serialize, Serializer};

/// Blue channel of the change ramp. A fixed visual constant.
pub const RAMP_BLUE: u8 = 76;

/// Alpha for pixels that carry data.
pub const PRESENT_ALPHA: u8 = 216;

/// Denominator guard for the clip rescale.
pub const NORMALIZE_EPSILON: f64 = 1e-9;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// `#rrggbb`, alpha dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Linear color interpolation, rounded to the nearest channel value.
pub fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Color::new(
        lerp(color1.r, color2.r),
        lerp(color1.g, color2.g),
        lerp(color1.b, color2.b),
        lerp(color1.a, color2.a),
    )
}

/// Piecewise-linear ramp over sorted `(position, color)` stops.
fn sample_stops(stops: &[(f64, Color)], t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    for pair in stops.windows(2) {
        let (p0, c0) = pair[0];
        let (p1, c1) = pair[1];
        if t <= p1 {
            return interpolate_color(c0, c1, (t - p0) / (p1 - p0));
        }
    }
    stops.last().map(|&(_, c)| c).unwrap_or(Color::transparent())
}

/// Loss (red) through neutral to growth (green).
///
/// The middle stop is collinear with the ends, so the ramp is a straight
/// red to green blend with red and green both near 128 at 0.5.
const CHANGE_STOPS: [(f64, Color); 3] = [
    (0.0, Color::new(255, 0, RAMP_BLUE, PRESENT_ALPHA)),
    (0.5, Color::new(128, 128, RAMP_BLUE, PRESENT_ALPHA)),
    (1.0, Color::new(0, 255, RAMP_BLUE, PRESENT_ALPHA)),
];

/// Color of a normalized value on the change ramp.
///
/// Non-finite input is a hole: fully transparent.
pub fn ramp_color(norm: f64) -> Color {
    if !norm.is_finite() {
        return Color::transparent();
    }
    sample_stops(&CHANGE_STOPS, norm)
}

/// Clip `value` to `[lower, upper]` and rescale to `[0, 1]`.
///
/// A degenerate range maps every finite value to the ramp midpoint. With
/// `lower > upper` every value clips to `upper` and lands at 1.
/// Non-finite values stay NaN.
pub fn normalize(value: f64, lower: f64, upper: f64) -> f64 {
    if !value.is_finite() {
        return f64::NAN;
    }
    let range = upper - lower;
    if range == 0.0 {
        return 0.5;
    }
    (value.max(lower).min(upper) - lower) / (range + NORMALIZE_EPSILON)
}

const VIRIDIS_STOPS: [(f64, Color); 9] = [
    (0.0, Color::new(0x44, 0x01, 0x54, 255)),
    (0.125, Color::new(0x47, 0x2c, 0x7a, 255)),
    (0.25, Color::new(0x3b, 0x51, 0x8b, 255)),
    (0.375, Color::new(0x2c, 0x71, 0x8e, 255)),
    (0.5, Color::new(0x21, 0x90, 0x8d, 255)),
    (0.625, Color::new(0x27, 0xad, 0x81, 255)),
    (0.75, Color::new(0x5c, 0xc8, 0x63, 255)),
    (0.875, Color::new(0xaa, 0xdc, 0x32, 255)),
    (1.0, Color::new(0xfd, 0xe7, 0x25, 255)),
];

/// Viridis, used for model prediction maps.
pub fn viridis_color(norm: f64) -> Color {
    if !norm.is_finite() {
        return Color::transparent();
    }
    sample_stops(&VIRIDIS_STOPS, norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(ramp_color(0.0), Color::new(255, 0, RAMP_BLUE, PRESENT_ALPHA));
        assert_eq!(ramp_color(1.0), Color::new(0, 255, RAMP_BLUE, PRESENT_ALPHA));
        // Out-of-range input saturates
        assert_eq!(ramp_color(-3.0), ramp_color(0.0));
        assert_eq!(ramp_color(7.0), ramp_color(1.0));
    }

    #[test]
    fn test_ramp_midpoint() {
        let c = ramp_color(0.5);
        assert_eq!((c.r, c.g, c.b, c.a), (128, 128, RAMP_BLUE, PRESENT_ALPHA));
    }

    #[test]
    fn test_ramp_is_monotonic() {
        let mut prev = ramp_color(0.0);
        for i in 1..=100 {
            let c = ramp_color(i as f64 / 100.0);
            assert!(c.r <= prev.r);
            assert!(c.g >= prev.g);
            assert_eq!(c.b, RAMP_BLUE);
            prev = c;
        }
    }

    #[test]
    fn test_ramp_hole() {
        assert_eq!(ramp_color(f64::NAN), Color::transparent());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(0.0, 0.0, 1.0), 0.0);
        assert!((normalize(0.5, 0.0, 1.0) - 0.5).abs() < 1e-8);
        assert!((normalize(2.0, 0.0, 1.0) - 1.0).abs() < 1e-8);
        assert_eq!(normalize(-2.0, 0.0, 1.0), 0.0);
        assert_eq!(normalize(0.3, 0.3, 0.3), 0.5);
        assert!(normalize(f64::NAN, 0.0, 1.0).is_nan());
    }

    #[test]
    fn test_ramp_is_a_straight_blend() {
        assert_eq!(ramp_color(0.25).to_rgba(), [192, 64, RAMP_BLUE, PRESENT_ALPHA]);
        assert_eq!(ramp_color(0.75).to_rgba(), [64, 192, RAMP_BLUE, PRESENT_ALPHA]);
    }

    #[test]
    fn test_normalize_inverted_bounds_saturate_high() {
        for v in [-1.0, 0.2, 0.4, 3.0] {
            assert!((normalize(v, 0.5, 0.1) - 1.0).abs() < 1e-8);
        }
    }

    #[test]
    fn test_viridis_ends_and_hex() {
        assert_eq!(viridis_color(0.0).to_hex(), "#440154");
        assert_eq!(viridis_color(1.0).to_hex(), "#fde725");
        assert_eq!(viridis_color(0.5).to_hex(), "#21908d");
    }

    #[test]
    fn test_interpolate_color_rounds() {
        let c = interpolate_color(Color::new(0, 0, 0, 0), Color::new(255, 255, 255, 255), 0.5);
        assert_eq!(c, Color::new(128, 128, 128, 128));
    }
}
