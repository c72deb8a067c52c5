//! Player color cycling.
//!
//! The player sphere and its light slowly walk around the hue wheel,
//! starting from red and advancing 0.1 hue-units per second.

use glam::Vec3;

/// Hue drift in hue-units (full wheel = 1.0) per second.
const HUE_RATE: f32 = 0.1;

/// A fully-saturated color that cycles hue over time.
#[derive(Debug, Clone, Copy)]
pub struct CyclingColor {
    hue: f32,
}

impl CyclingColor {
    /// Start at pure red (hue 0).
    pub fn new() -> Self {
        Self { hue: 0.0 }
    }

    /// Advance the hue by `dt` seconds of drift, wrapping around the wheel.
    pub fn advance(&mut self, dt: f32) {
        self.hue = (self.hue + HUE_RATE * dt).rem_euclid(1.0);
    }

    /// Current hue in 0..1.
    #[inline]
    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Current color as RGB.
    pub fn rgb(&self) -> Vec3 {
        hsv_to_rgb(self.hue, 1.0, 1.0)
    }
}

impl Default for CyclingColor {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert HSV to RGB.
///
/// * `h` - 0.0 to 1.0 (wraps: red -> yellow -> green -> cyan -> blue -> magenta -> red)
/// * `s` - 0.0 (gray) to 1.0 (vivid)
/// * `v` - 0.0 (black) to 1.0 (bright)
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Vec3 {
    let c = v * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h * 6.0) as u32 % 6 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec3::new(r + m, g + m, b + m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_red() {
        let color = CyclingColor::new();
        let rgb = color.rgb();
        assert!((rgb.x - 1.0).abs() < 0.001);
        assert!(rgb.y < 0.001);
        assert!(rgb.z < 0.001);
    }

    #[test]
    fn test_advance_rate() {
        let mut color = CyclingColor::new();
        color.advance(1.0);
        assert!((color.hue() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_hue_wraps() {
        let mut color = CyclingColor::new();
        color.advance(10.5); // 1.05 hue-units
        assert!(color.hue() >= 0.0 && color.hue() < 1.0);
        assert!((color.hue() - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_hsv_to_rgb_green() {
        let green = hsv_to_rgb(1.0 / 3.0, 1.0, 1.0);
        assert!(green.x < 0.01);
        assert!((green.y - 1.0).abs() < 0.01);
        assert!(green.z < 0.01);
    }
}
