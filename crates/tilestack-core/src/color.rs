use serde::{Deserialize, Serialize};

/// An 8-bit RGBA tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Build a color from wider integers, clamping each channel to `0..=255`.
    pub fn clamped(r: i32, g: i32, b: i32, a: i32) -> Self {
        let c = |v: i32| v.clamp(0, 255) as u8;
        Self::new(c(r), c(g), c(b), c(a))
    }

    /// Replace the RGB channels, keeping alpha.
    pub fn with_rgb(self, (r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b, ..self }
    }
}

/// Convert HSV to 8-bit RGB.
///
/// `h` is in degrees and wraps into `[0, 360)`; `s` and `v` are percentages
/// clamped to `[0, 100]`.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let h = if h.is_finite() { h.rem_euclid(360.0) } else { 0.0 };
    let s = s.clamp(0.0, 100.0) / 100.0;
    let v = v.clamp(0.0, 100.0) / 100.0;

    let chroma = v * s;
    let sector = h / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let m = v - chroma;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let to_u8 = |c: f64| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_u8(r), to_u8(g), to_u8(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 100.0, 100.0), (255, 0, 0));
        assert_eq!(hsv_to_rgb(120.0, 100.0, 100.0), (0, 255, 0));
        assert_eq!(hsv_to_rgb(240.0, 100.0, 100.0), (0, 0, 255));
    }

    #[test]
    fn test_hsv_sector_boundaries() {
        assert_eq!(hsv_to_rgb(60.0, 100.0, 100.0), (255, 255, 0));
        assert_eq!(hsv_to_rgb(180.0, 100.0, 100.0), (0, 255, 255));
        assert_eq!(hsv_to_rgb(300.0, 100.0, 100.0), (255, 0, 255));
        assert_eq!(hsv_to_rgb(360.0, 100.0, 100.0), (255, 0, 0));
    }

    #[test]
    fn test_hsv_zero_saturation_is_grey() {
        for h in [0.0, 37.0, 120.0, 359.9] {
            assert_eq!(hsv_to_rgb(h, 0.0, 100.0), (255, 255, 255));
        }
        assert_eq!(hsv_to_rgb(200.0, 0.0, 0.0), (0, 0, 0));
    }

    #[test]
    fn test_hsv_midpoint() {
        assert_eq!(hsv_to_rgb(30.0, 100.0, 100.0), (255, 128, 0));
        assert_eq!(hsv_to_rgb(-120.0, 100.0, 100.0), (0, 0, 255));
    }

    #[test]
    fn test_clamped_color() {
        assert_eq!(Rgba::clamped(-5, 300, 128, 1000), Rgba::new(0, 255, 128, 255));
        assert_eq!(Rgba::WHITE.with_rgb((1, 2, 3)), Rgba::new(1, 2, 3, 255));
    }
}
