//! # Settings document
//!
//! Holds the controller configuration, the manual rudder configuration and the route progress.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{lenient_f64, lenient_u64, DocId, Document, GeoPoint};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The settings document (`settings.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDoc {
    pub controller: ControllerSettings,

    pub rudder: RudderSettings,

    pub route: RouteSettings,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Course controller settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSettings {
    /// The active controller type
    #[serde(rename = "type")]
    pub kind: ControllerType,

    /// Reference course for the fixed course controller, degrees clockwise from north
    #[serde(rename = "refCourse", deserialize_with = "lenient_f64")]
    pub ref_course_deg: f64,

    /// Reference location for the fixed location controller.
    ///
    /// In route mode the simulator writes the current goal here so that observers can display
    /// it.
    pub reflocation: GeoPoint,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Manual rudder settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RudderSettings {
    /// When true the regulator is bypassed entirely and the previous steering command is held
    #[serde(rename = "darkMode")]
    pub dark_mode: bool,

    /// Raw manual rudder reference, 0 to 1023 with 512 as centre
    #[serde(rename = "ref", deserialize_with = "lenient_u64")]
    pub reference: u64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Route progress settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSettings {
    /// Index of the current goal waypoint in the route document
    #[serde(rename = "goalIndex", deserialize_with = "lenient_u64")]
    pub goal_index: u64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The controller types which may be selected in the settings document.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ControllerType {
    /// Follow the waypoints of the route document
    #[serde(rename = "route")]
    Route,

    /// Hold `refCourse`
    #[serde(rename = "course")]
    FixedCourse,

    /// Steer toward `reflocation`
    #[serde(rename = "location")]
    FixedLocation,

    /// Steer directly from the manual rudder reference
    #[serde(rename = "rudder")]
    ManualRudder,

    /// No course regulation, rudder centred
    #[serde(rename = "off")]
    Off,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Document for SettingsDoc {
    const ID: DocId = DocId::Settings;
}

impl SettingsDoc {
    /// Record the current route goal in the document.
    pub fn set_goal(&mut self, goal_index: usize, latitude: f64, longitude: f64) {
        self.route.goal_index = goal_index as u64;
        self.controller.reflocation.latitude = latitude;
        self.controller.reflocation.longitude = longitude;
    }
}
