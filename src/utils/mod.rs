use libm::{fabs, fmod};
pub mod units;

/// Highest voltage a V5 motor accepts.
pub const MAX_VOLTS: f64 = 12.0;

/// Reduces an angle in degrees to `[0, 360)`.
pub fn normalize_360(angle: f64) -> f64 {
    let reduced = fmod(angle, 360.0);
    let wrapped = if reduced < 0.0 { reduced + 360.0 } else { reduced };
    // tiny negative inputs round up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Reduces an angle in degrees to `[-180, 180)`, so differences always take the short way round.
pub fn normalize_180(angle: f64) -> f64 {
    normalize_360(angle + 180.0) - 180.0
}

pub fn threshold(input: f64, min: f64, max: f64) -> f64 {
    if input > max {
        max
    } else if input < min {
        min
    } else {
        input
    }
}

pub fn deadband(input: f64, width: f64) -> f64 {
    if fabs(input) < width { 0.0 } else { input }
}

/// Scales a percentage in `[-100, 100]` to motor volts.
pub fn to_volt(percent: f64) -> f64 {
    percent * MAX_VOLTS / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_360_stays_in_range_and_congruent() {
        let mut angle = -1080.0;
        while angle <= 1080.0 {
            let n = normalize_360(angle);
            assert!((0.0..360.0).contains(&n), "{angle} -> {n}");
            let k = (angle - n) / 360.0;
            assert!((k - libm::round(k)).abs() < 1e-9, "{angle} -> {n}");
            angle += 7.25;
        }
        assert_eq!(normalize_360(360.0), 0.0);
        assert_eq!(normalize_360(-90.0), 270.0);
        assert_eq!(normalize_360(-1e-18), 0.0);
    }

    #[test]
    fn normalize_180_takes_short_way() {
        let mut angle = -1080.0;
        while angle <= 1080.0 {
            let n = normalize_180(angle);
            assert!((-180.0..180.0).contains(&n), "{angle} -> {n}");
            angle += 3.5;
        }
        assert_eq!(normalize_180(180.0), -180.0);
        assert_eq!(normalize_180(190.0 - 170.0), 20.0);
        assert_eq!(normalize_180(170.0 - 190.0), -20.0);
        assert_eq!(normalize_180(350.0), -10.0);
    }

    #[test]
    fn shaping_helpers() {
        assert_eq!(threshold(14.0, -10.0, 10.0), 10.0);
        assert_eq!(threshold(-14.0, -10.0, 10.0), -10.0);
        assert_eq!(threshold(3.0, -10.0, 10.0), 3.0);
        assert_eq!(deadband(4.0, 5.0), 0.0);
        assert_eq!(deadband(-4.9, 5.0), 0.0);
        assert_eq!(deadband(-5.0, 5.0), -5.0);
        assert_eq!(to_volt(100.0), 12.0);
        assert_eq!(to_volt(-50.0), -6.0);
    }
}
