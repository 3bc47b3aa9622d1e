//! Bearing error calculation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;

use crate::{geodesy::GeometryError, units::Degrees};
use util::maths::wrap_360;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The angular difference between two bearings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BearingError {
    /// Unsigned difference, in [0, 180]
    pub magnitude: Degrees,

    /// Signed difference, in [-180, 180]. Negative when `deg1` lies clockwise of `deg2` by less
    /// than half a turn.
    pub signed: Degrees,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the shortest angular difference between two bearings.
///
/// The magnitude is taken from the angle between the unit vectors of the two bearings, so that
/// wraparound at north is handled without any special cases, and the sign from the relative
/// position of the two bearings in [0, 360).
pub fn bearing_error(deg1: Degrees, deg2: Degrees) -> Result<BearingError, GeometryError> {
    if !(deg1.is_finite() && deg2.is_finite()) {
        return Err(GeometryError::NonFinite("bearing"));
    }

    let v1 = unit_vector(deg1);
    let v2 = unit_vector(deg2);

    // nalgebra clamps the cosine into [-1, 1] before taking acos
    let b = v1.angle(&v2).to_degrees();

    let td1 = wrap_360(v1.y.atan2(v1.x).to_degrees());
    let td2 = wrap_360(v2.y.atan2(v2.x).to_degrees());
    let diff = (td1 - td2).abs();

    let signed = if (td1 > td2 && diff < 180.0) || (td1 < td2 && diff > 180.0) {
        -b
    } else {
        b
    };

    Ok(BearingError {
        magnitude: Degrees(b),
        signed: Degrees(signed),
    })
}

fn unit_vector(deg: Degrees) -> Vector2<f64> {
    let (s, c) = deg.to_radians().0.sin_cos();
    Vector2::new(c, s)
}

#[cfg(test)]
mod test {
    use super::*;

    fn err(d1: f64, d2: f64) -> BearingError {
        bearing_error(Degrees(d1), Degrees(d2)).unwrap()
    }

    #[test]
    fn test_equal_bearings_have_no_error() {
        for h in [0.0, 1.0, 45.0, 90.0, 179.9, 180.0, 270.0, 359.99, 720.0, -90.0].iter() {
            let e = err(*h, *h);
            assert!(e.signed.0.abs() < 1e-6, "{} -> {:?}", h, e);
            assert!(e.magnitude.0.abs() < 1e-6, "{} -> {:?}", h, e);
        }
    }

    #[test]
    fn test_wraparound_at_north() {
        let e = err(359.0, 1.0);
        assert!((e.signed.0 - 2.0).abs() < 1e-9);
        assert!((e.magnitude.0 - 2.0).abs() < 1e-9);

        let e = err(1.0, 359.0);
        assert!((e.signed.0 + 2.0).abs() < 1e-9);
        assert!((e.magnitude.0 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_sign_away_from_north() {
        // Commanded course clockwise of the current course gives a negative error
        assert!((err(100.0, 90.0).signed.0 + 10.0).abs() < 1e-9);
        assert!((err(90.0, 100.0).signed.0 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_error_in_range() {
        let mut d1 = -720.0;
        while d1 <= 720.0 {
            let mut d2 = -360.0;
            while d2 <= 360.0 {
                let e = err(d1, d2);
                assert!(e.signed.0 >= -180.0 && e.signed.0 <= 180.0, "{} {} {:?}", d1, d2, e);
                assert!(e.magnitude.0 >= 0.0 && e.magnitude.0 <= 180.0);
                assert!((e.signed.0.abs() - e.magnitude.0).abs() < 1e-12);
                d2 += 7.3;
            }
            d1 += 11.1;
        }
    }

    #[test]
    fn test_non_finite_bearing() {
        assert!(matches!(
            bearing_error(Degrees(f64::NAN), Degrees(0.0)),
            Err(GeometryError::NonFinite(_))
        ));
        assert!(bearing_error(Degrees(0.0), Degrees(f64::INFINITY)).is_err());
    }
}
