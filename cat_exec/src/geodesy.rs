//! # Geodesy
//!
//! Conversions between the simulator's local East-North-Up (ENU) frame and WGS-84 geodetic
//! coordinates, and the ellipsoidal inverse problem (distance and initial bearing between two
//! geodetic points) using Vincenty's formulae.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::units::Degrees;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// WGS-84 semi-major axis
pub const WGS84_A_M: f64 = 6_378_137.0;

/// WGS-84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// WGS-84 semi-minor axis
pub const WGS84_B_M: f64 = WGS84_A_M * (1.0 - WGS84_F);

/// WGS-84 first eccentricity squared
const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

/// Convergence threshold for the iterative solutions, radians.
const CONVERGENCE_RAD: f64 = 1e-12;

/// Maximum number of iterations of Vincenty's inverse method. Only nearly antipodal points need
/// more than a handful.
const VINCENTY_MAX_ITERS: usize = 200;

/// Maximum number of iterations of the ECEF to geodetic latitude refinement.
const LAT_MAX_ITERS: usize = 20;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A point on or above the WGS-84 ellipsoid.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Geodetic {
    pub lat: Degrees,
    pub lon: Degrees,
    pub alt_m: f64,
}

/// Solution of the inverse problem between two points.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Inverse {
    /// Ellipsoidal distance between the points
    pub distance_m: f64,

    /// Bearing at the first point toward the second, clockwise from north in [0, 360)
    pub initial_bearing: Degrees,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors arising from degenerate geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Points are coincident, the bearing between them is undefined")]
    CoincidentPoints,

    #[error("Non-finite value in geometric input: {0}")]
    NonFinite(&'static str),

    #[error("Latitude {0} is outside [-90, 90]")]
    InvalidLatitude(f64),

    #[error("Inverse solution did not converge (points are nearly antipodal)")]
    NoConvergence,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Geodetic {
    pub fn new(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self {
            lat: Degrees(lat_deg),
            lon: Degrees(lon_deg),
            alt_m,
        }
    }

    fn validate(&self, what: &'static str) -> Result<(), GeometryError> {
        if !(self.lat.is_finite() && self.lon.is_finite() && self.alt_m.is_finite()) {
            return Err(GeometryError::NonFinite(what));
        }
        if self.lat.0.abs() > 90.0 {
            return Err(GeometryError::InvalidLatitude(self.lat.0));
        }
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Convert a geodetic point into Earth-Centred Earth-Fixed cartesian coordinates.
pub fn geodetic_to_ecef(point: &Geodetic) -> Vector3<f64> {
    let (sin_lat, cos_lat) = point.lat.to_radians().0.sin_cos();
    let (sin_lon, cos_lon) = point.lon.to_radians().0.sin_cos();

    // Prime vertical radius of curvature
    let n = WGS84_A_M / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

    Vector3::new(
        (n + point.alt_m) * cos_lat * cos_lon,
        (n + point.alt_m) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + point.alt_m) * sin_lat,
    )
}

/// Convert Earth-Centred Earth-Fixed cartesian coordinates into a geodetic point.
pub fn ecef_to_geodetic(ecef: &Vector3<f64>) -> Geodetic {
    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    let lon = ecef.y.atan2(ecef.x);

    // Refine the latitude from the spherical first guess
    let mut lat = ecef.z.atan2(p * (1.0 - WGS84_E2));
    for _ in 0..LAT_MAX_ITERS {
        let sin_lat = lat.sin();
        let n = WGS84_A_M / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let next = (ecef.z + WGS84_E2 * n * sin_lat).atan2(p);

        let delta = (next - lat).abs();
        lat = next;
        if delta < CONVERGENCE_RAD {
            break;
        }
    }

    // Height above the ellipsoid, this form is well conditioned at the poles as well as the
    // equator
    let (sin_lat, cos_lat) = lat.sin_cos();
    let alt_m =
        p * cos_lat + ecef.z * sin_lat - WGS84_A_M * (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

    Geodetic {
        lat: Degrees(lat.to_degrees()),
        lon: Degrees(lon.to_degrees()),
        alt_m,
    }
}

/// Rotation taking ENU vectors at the reference point into ECEF.
fn enu_to_ecef_rotation(reference: &Geodetic) -> Matrix3<f64> {
    let (sin_lat, cos_lat) = reference.lat.to_radians().0.sin_cos();
    let (sin_lon, cos_lon) = reference.lon.to_radians().0.sin_cos();

    Matrix3::new(
        -sin_lon, -sin_lat * cos_lon, cos_lat * cos_lon,
        cos_lon, -sin_lat * sin_lon, cos_lat * sin_lon,
        0.0, cos_lat, sin_lat,
    )
}

/// Convert an offset in the local ENU frame of `reference` into a geodetic point.
pub fn enu_to_geodetic(
    east_m: f64,
    north_m: f64,
    up_m: f64,
    reference: &Geodetic,
) -> Result<Geodetic, GeometryError> {
    reference.validate("ENU reference")?;
    if !(east_m.is_finite() && north_m.is_finite() && up_m.is_finite()) {
        return Err(GeometryError::NonFinite("ENU offset"));
    }

    let offset_ecef = enu_to_ecef_rotation(reference) * Vector3::new(east_m, north_m, up_m);

    Ok(ecef_to_geodetic(&(geodetic_to_ecef(reference) + offset_ecef)))
}

/// Solve the inverse problem on the WGS-84 ellipsoid using Vincenty's formulae.
///
/// Altitudes are ignored.
pub fn inverse(from: &Geodetic, to: &Geodetic) -> Result<Inverse, GeometryError> {
    from.validate("inverse start point")?;
    to.validate("inverse end point")?;

    let f = WGS84_F;

    let l = (to.lon.0 - from.lon.0).to_radians();
    let u1 = ((1.0 - f) * from.lat.to_radians().0.tan()).atan();
    let u2 = ((1.0 - f) * to.lat.to_radians().0.tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut converged = false;

    // Values from the final iteration
    let mut sin_sigma = 0.0;
    let mut cos_sigma = 0.0;
    let mut sigma = 0.0;
    let mut cos_sq_alpha = 0.0;
    let mut cos_2sigma_m = 0.0;

    for _ in 0..VINCENTY_MAX_ITERS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();

        sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();

        if sin_sigma == 0.0 {
            return Err(GeometryError::CoincidentPoints);
        }

        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;

        // On the equator cos_sq_alpha is zero and the term vanishes
        cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };

        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));

        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - lambda_prev).abs() < CONVERGENCE_RAD {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(GeometryError::NoConvergence);
    }

    let u_sq = cos_sq_alpha * (WGS84_A_M.powi(2) - WGS84_B_M.powi(2)) / WGS84_B_M.powi(2);
    let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    let delta_sigma = b
        * sin_sigma
        * (cos_2sigma_m
            + b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                    - b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma.powi(2))
                        * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));

    let distance_m = WGS84_B_M * a * (sigma - delta_sigma);

    let (sin_lambda, cos_lambda) = lambda.sin_cos();
    let alpha_1 = (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);

    Ok(Inverse {
        distance_m,
        initial_bearing: Degrees(alpha_1.to_degrees()).wrapped(),
    })
}
