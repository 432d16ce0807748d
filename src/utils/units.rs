//! Length helpers for writing routines. Everything the chassis measures is in inches.

use core::f64::consts::PI;

pub fn ft(from_feet: f64) -> f64 {
    from_feet * 12.0
}

/// One field tile is two feet square.
pub fn tile(from_tiles: f64) -> f64 {
    from_tiles * 24.0
}

pub fn cm(from_centimeters: f64) -> f64 {
    from_centimeters / 2.54
}

pub fn m(from_meters: f64) -> f64 {
    cm(from_meters * 100.0)
}

/// Inches of travel per degree of motor rotation.
///
/// `gear_ratio` is motor-to-wheel: an 84 tooth gear on the motor driving a 60 tooth gear on the
/// wheel is 1.4.
pub fn inches_per_degree(wheel_diameter: f64, gear_ratio: f64) -> f64 {
    gear_ratio / 360.0 * PI * wheel_diameter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(tile(1.5), 36.0);
        assert_eq!(ft(2.0), 24.0);
        assert!((cm(2.54) - 1.0).abs() < 1e-12);
        assert!((m(1.0) - 39.3701).abs() < 1e-3);
    }

    #[test]
    fn full_turn_is_one_circumference() {
        let ratio = inches_per_degree(3.25, 1.0);
        assert!((ratio * 360.0 - 3.25 * PI).abs() < 1e-12);
        let geared = inches_per_degree(2.75, 0.75);
        assert!((geared * 360.0 - 0.75 * 2.75 * PI).abs() < 1e-12);
    }
}
