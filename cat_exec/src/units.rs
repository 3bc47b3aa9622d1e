//! # Angle units
//!
//! The vehicle model works in radians with yaw measured counter-clockwise from east, while
//! courses and bearings are degrees measured clockwise from north. Both are wrapped in distinct
//! types so the two can only be mixed through an explicit conversion.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use util::maths::{wrap_2pi, wrap_360};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An angle in radians.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Radians(pub f64);

/// An angle in degrees.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f64);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Radians {
    /// Wrap into [0, 2pi).
    pub fn wrapped(self) -> Self {
        Radians(wrap_2pi(self.0))
    }

    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }

    /// Convert a yaw (counter-clockwise from east) into a compass course (clockwise from north)
    /// in [0, 360).
    pub fn to_compass(self) -> Degrees {
        Radians(-self.0 + FRAC_PI_2).wrapped().to_degrees().wrapped()
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl Degrees {
    /// Wrap into [0, 360).
    pub fn wrapped(self) -> Self {
        Degrees(wrap_360(self.0))
    }

    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl std::fmt::Display for Radians {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4} rad", self.0)
    }
}

impl std::fmt::Display for Degrees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} deg", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_yaw_to_compass() {
        // East
        assert!(close(Radians(0.0).to_compass().0, 90.0));
        // North
        assert!(close(Radians(PI / 2.0).to_compass().0, 0.0));
        // West
        assert!(close(Radians(PI).to_compass().0, 270.0));
        // South, given as a negative yaw
        assert!(close(Radians(-PI / 2.0).to_compass().0, 180.0));
    }

    #[test]
    fn test_compass_wraps_large_yaws() {
        // Several turns anticlockwise from north is still north
        let c = Radians(PI / 2.0 + 6.0 * PI).to_compass().0;
        assert!((0.0..1e-9).contains(&c) || (360.0 - 1e-9..360.0).contains(&c), "{}", c);
        // Just clockwise of north
        assert!(close(Radians(PI / 2.0 - 0.5f64.to_radians()).to_compass().0, 0.5));
    }

    #[test]
    fn test_wrapping() {
        assert!(close(Degrees(-90.0).wrapped().0, 270.0));
        assert!(close(Radians(3.0 * PI).wrapped().0, PI));
    }
}
