//! # Documents
//!
//! Each document is a JSON object owned by the external façade. Only the fields the simulator
//! reads or writes are typed, everything else is kept in `extra` maps so that a read-modify-write
//! by the simulator never drops fields it does not know about.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod route;
pub mod settings;
pub mod telemetry;

pub use route::*;
pub use settings::*;
pub use telemetry::*;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A document which can be loaded from and saved to a `DocStore`.
pub trait Document: Serialize + DeserializeOwned {
    /// The identity of this document in the store.
    const ID: DocId;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A geodetic point as it appears in the documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeoPoint {
    /// Latitude in degrees
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,

    /// Longitude in degrees
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Identifies one of the documents in the store.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DocId {
    Settings,
    Route,
    Telemetry,
}

/// Numbers in the documents may be written by the façade as JSON numbers or as the raw strings
/// taken from a query string.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Int(u64),
    Float(f64),
    Str(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DocId {
    /// The file name used for this document by file-backed stores.
    pub fn file_name(&self) -> &'static str {
        match self {
            DocId::Settings => "settings.json",
            DocId::Route => "route.json",
            DocId::Telemetry => "data.json",
        }
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            extra: Map::new(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Deserialize an `f64` from a number or a numeric string.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match LenientNumber::deserialize(deserializer)? {
        LenientNumber::Int(i) => Ok(i as f64),
        LenientNumber::Float(f) => Ok(f),
        LenientNumber::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("expected a number, found \"{}\"", s))),
    }
}

/// Deserialize a non-negative integer from a number or a numeric string.
///
/// Floats are accepted only if they have no fractional part.
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let float_to_int = |f: f64| {
        if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
            Ok(f as u64)
        } else {
            Err(D::Error::custom(format!(
                "expected a non-negative integer, found {}",
                f
            )))
        }
    };

    match LenientNumber::deserialize(deserializer)? {
        LenientNumber::Int(i) => Ok(i),
        LenientNumber::Float(f) => float_to_int(f),
        LenientNumber::Str(s) => match s.trim().parse::<u64>() {
            Ok(i) => Ok(i),
            Err(_) => match s.trim().parse::<f64>() {
                Ok(f) => float_to_int(f),
                Err(_) => Err(D::Error::custom(format!(
                    "expected an integer, found \"{}\"",
                    s
                ))),
            },
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_geo_point_lenient_numbers() {
        let p: GeoPoint =
            serde_json::from_str(r#"{"latitude": "57.5", "longitude": 11, "alt": 3}"#).unwrap();

        assert_eq!(p.latitude, 57.5);
        assert_eq!(p.longitude, 11.0);
        assert_eq!(p.extra.get("alt"), Some(&Value::from(3)));

        let bad: Result<GeoPoint, _> =
            serde_json::from_str(r#"{"latitude": "north", "longitude": 11}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_doc_file_names() {
        assert_eq!(DocId::Settings.file_name(), "settings.json");
        assert_eq!(DocId::Route.file_name(), "route.json");
        assert_eq!(DocId::Telemetry.file_name(), "data.json");
    }
}
