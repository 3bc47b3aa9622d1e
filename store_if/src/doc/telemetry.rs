//! # Telemetry document

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{lenient_f64, DocId, Document, GeoPoint};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The telemetry document (`data.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryDoc {
    pub gps: GpsTelemetry,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Simulated GPS output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsTelemetry {
    /// Current position of the vehicle
    pub location: GeoPoint,

    /// Course of the vehicle in degrees clockwise from north
    #[serde(deserialize_with = "lenient_f64")]
    pub course: f64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Document for TelemetryDoc {
    const ID: DocId = DocId::Telemetry;
}

impl TelemetryDoc {
    /// Create a telemetry document containing only a GPS fix.
    pub fn new(latitude: f64, longitude: f64, course: f64) -> Self {
        Self {
            gps: GpsTelemetry {
                location: GeoPoint::new(latitude, longitude),
                course,
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_telemetry() {
        let t: TelemetryDoc = serde_json::from_str(
            r#"{
                "gps": {
                    "location": {"longitude": 11.924482585745864, "latitude": 57.5726428059939},
                    "course": 45,
                    "satellites": 9
                },
                "battery": {"voltage": 12.4}
            }"#,
        )
        .unwrap();

        assert_eq!(t.gps.location.latitude, 57.5726428059939);
        assert_eq!(t.gps.course, 45.0);
        assert_eq!(t.gps.extra["satellites"], 9);
        assert_eq!(t.extra["battery"]["voltage"], 12.4);
    }
}
