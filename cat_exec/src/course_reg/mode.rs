//! Control configuration built from the settings document

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use store_if::doc::{ControllerType, SettingsDoc};

use super::{ConfigError, Params};
use crate::{geodesy::Geodetic, units::Degrees};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The validated control configuration for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlConfig {
    /// The active control mode
    pub mode: ControlMode,

    /// When set the regulator is bypassed and the previous steering command is held
    pub dark_mode: bool,

    /// Route goal index as currently recorded in the settings
    pub goal_index: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The source of the commanded course.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ControlMode {
    /// Steer toward the current route waypoint
    Route,

    /// Hold a constant course
    FixedCourse(Degrees),

    /// Steer toward a fixed location
    FixedLocation(Geodetic),

    /// Steer directly from the raw rudder reference
    ManualRudder(u64),

    /// Steer toward the current route waypoint without moving along the route
    Off,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ControlConfig {
    /// Build the configuration from a settings document.
    ///
    /// Only the fields used by the selected mode are validated, so a stale value in an unused
    /// field does not prevent the vehicle from being controlled.
    pub fn from_settings(settings: &SettingsDoc, params: &Params) -> Result<Self, ConfigError> {
        let ctrl = &settings.controller;

        let mode = match ctrl.kind {
            ControllerType::Route => ControlMode::Route,
            ControllerType::FixedCourse => {
                if !ctrl.ref_course_deg.is_finite() {
                    return Err(ConfigError::InvalidRefCourse(ctrl.ref_course_deg));
                }
                ControlMode::FixedCourse(Degrees(ctrl.ref_course_deg).wrapped())
            }
            ControllerType::FixedLocation => {
                let (lat, lon) = (ctrl.reflocation.latitude, ctrl.reflocation.longitude);
                if !is_valid_position(lat, lon) {
                    return Err(ConfigError::InvalidRefLocation(lat, lon));
                }
                ControlMode::FixedLocation(Geodetic::new(lat, lon, 0.0))
            }
            ControllerType::ManualRudder => {
                let r = settings.rudder.reference;
                if r > params.rudder_ref_max {
                    return Err(ConfigError::InvalidRudderRef(r, params.rudder_ref_max));
                }
                ControlMode::ManualRudder(r)
            }
            ControllerType::Off => ControlMode::Off,
        };

        Ok(Self {
            mode,
            dark_mode: settings.rudder.dark_mode,
            goal_index: settings.route.goal_index as usize,
        })
    }
}

/// True if the latitude and longitude form a usable position.
pub(crate) fn is_valid_position(lat: f64, lon: f64) -> bool {
    lat.is_finite() && lon.is_finite() && lat.abs() <= 90.0
}

#[cfg(test)]
mod test {
    use super::*;

    fn settings(kind: &str, rudder_ref: u64) -> SettingsDoc {
        serde_json::from_str(&format!(
            r#"{{
                "controller": {{
                    "type": "{}",
                    "refCourse": 370,
                    "reflocation": {{"latitude": 57.57, "longitude": 11.92}}
                }},
                "rudder": {{"darkMode": true, "ref": {}}},
                "route": {{"goalIndex": 3}}
            }}"#,
            kind, rudder_ref
        ))
        .unwrap()
    }

    #[test]
    fn test_modes() {
        let p = Params::default();

        let c = ControlConfig::from_settings(&settings("route", 512), &p).unwrap();
        assert_eq!(c.mode, ControlMode::Route);
        assert!(c.dark_mode);
        assert_eq!(c.goal_index, 3);

        let c = ControlConfig::from_settings(&settings("course", 512), &p).unwrap();
        assert_eq!(c.mode, ControlMode::FixedCourse(Degrees(10.0)));

        let c = ControlConfig::from_settings(&settings("location", 512), &p).unwrap();
        assert_eq!(c.mode, ControlMode::FixedLocation(Geodetic::new(57.57, 11.92, 0.0)));

        let c = ControlConfig::from_settings(&settings("rudder", 1023), &p).unwrap();
        assert_eq!(c.mode, ControlMode::ManualRudder(1023));

        let c = ControlConfig::from_settings(&settings("off", 512), &p).unwrap();
        assert_eq!(c.mode, ControlMode::Off);
    }

    #[test]
    fn test_invalid_rudder_ref() {
        let p = Params::default();

        assert_eq!(
            ControlConfig::from_settings(&settings("rudder", 1024), &p),
            Err(ConfigError::InvalidRudderRef(1024, 1023))
        );

        // The reference is only checked when manual rudder is selected
        assert!(ControlConfig::from_settings(&settings("course", 5000), &p).is_ok());
    }

    #[test]
    fn test_invalid_location() {
        let mut s = settings("location", 512);
        s.controller.reflocation.latitude = 95.0;

        assert_eq!(
            ControlConfig::from_settings(&s, &Params::default()),
            Err(ConfigError::InvalidRefLocation(95.0, 11.92))
        );
    }
}
