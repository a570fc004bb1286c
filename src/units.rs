//! Quantity helpers on top of `uom`.
//!
//! Every length (altitude, elevation, CG, radius) is held as a `uom` [`Length`],
//! which stores SI meters internally. That gives altitude and elevation a common
//! working unit; feet/knots/degrees are only used at the boundary when values are
//! built or reported. An unknown ("null") quantity is `None`.

pub use uom::si::f64::{Angle, Length, Velocity};
use uom::si::angle::degree;
use uom::si::length::{foot, meter};
use uom::si::velocity::{kilometer_per_hour, knot, meter_per_second};

/// Tolerance used when deciding whether a length is negative
const LENGTH_EPSILON_M: f64 = 1e-6;

/// Tolerance used when deciding whether a speed is negative (push back)
const SPEED_EPSILON_MS: f64 = 1e-6;

pub fn feet(value: f64) -> Length {
    Length::new::<foot>(value)
}

pub fn meters(value: f64) -> Length {
    Length::new::<meter>(value)
}

pub fn knots(value: f64) -> Velocity {
    Velocity::new::<knot>(value)
}

pub fn meters_per_second(value: f64) -> Velocity {
    Velocity::new::<meter_per_second>(value)
}

pub fn km_per_hour(value: f64) -> Velocity {
    Velocity::new::<kilometer_per_hour>(value)
}

pub fn degrees(value: f64) -> Angle {
    Angle::new::<degree>(value)
}

pub fn in_feet(length: Length) -> f64 {
    length.get::<foot>()
}

pub fn in_meters(length: Length) -> f64 {
    length.get::<meter>()
}

pub fn in_knots(speed: Velocity) -> f64 {
    speed.get::<knot>()
}

pub fn in_km_per_hour(speed: Velocity) -> f64 {
    speed.get::<kilometer_per_hour>()
}

pub fn in_meters_per_second(speed: Velocity) -> f64 {
    speed.get::<meter_per_second>()
}

pub fn in_degrees(angle: Angle) -> f64 {
    angle.get::<degree>()
}

/// Normalize an angle into the range (-180°, 180°]
pub fn normalized_degrees(angle: Angle) -> Angle {
    let mut deg = in_degrees(angle) % 360.0;
    if deg > 180.0 {
        deg -= 360.0;
    } else if deg <= -180.0 {
        deg += 360.0;
    }
    degrees(deg)
}

/// Drop NaN / infinite lengths so they are treated as "cannot compute"
pub fn finite_length(length: Length) -> Option<Length> {
    if in_meters(length).is_finite() {
        Some(length)
    } else {
        None
    }
}

/// True if the length is below zero by more than a tiny epsilon
pub fn is_negative_length(length: Length) -> bool {
    in_meters(length) < -LENGTH_EPSILON_M
}

/// True if the speed is below zero by more than a tiny epsilon
pub fn is_negative_speed(speed: Velocity) -> bool {
    in_meters_per_second(speed) < -SPEED_EPSILON_MS
}

pub fn abs_length(length: Length) -> Length {
    meters(in_meters(length).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_degrees() {
        assert!((in_degrees(normalized_degrees(degrees(190.0))) - (-170.0)).abs() < 1e-9);
        assert!((in_degrees(normalized_degrees(degrees(-190.0))) - 170.0).abs() < 1e-9);
        assert!((in_degrees(normalized_degrees(degrees(540.0))) - 180.0).abs() < 1e-9);
        assert!((in_degrees(normalized_degrees(degrees(-180.0))) - 180.0).abs() < 1e-9);
        assert!((in_degrees(normalized_degrees(degrees(45.0))) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_feet_meters_share_storage() {
        let a = feet(1000.0);
        let b = meters(304.8);
        assert!((in_meters(a) - in_meters(b)).abs() < 1e-9);
    }

    #[test]
    fn test_nan_is_not_finite() {
        assert!(finite_length(meters(f64::NAN)).is_none());
        assert!(finite_length(meters(12.0)).is_some());
    }

    #[test]
    fn test_negative_with_epsilon() {
        assert!(!is_negative_length(meters(-1e-9)));
        assert!(is_negative_length(feet(-2.0)));
        assert!(is_negative_speed(knots(-1.0)));
        assert!(!is_negative_speed(knots(0.0)));
    }
}
