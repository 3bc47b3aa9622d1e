//! # Route document
//!
//! A GeoJSON-style feature whose geometry holds the route as `[longitude, latitude]` pairs.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{DocId, Document};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The route document (`route.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDoc {
    pub geometry: RouteGeometry,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Geometry of the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    /// Ordered `[longitude, latitude]` pairs in degrees
    pub coordinates: Vec<[f64; 2]>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Document for RouteDoc {
    const ID: DocId = DocId::Route;
}

impl RouteDoc {
    /// Build a route document from `[longitude, latitude]` pairs.
    pub fn from_coordinates(coordinates: Vec<[f64; 2]>) -> Self {
        let mut extra = Map::new();
        extra.insert("type".into(), Value::from("Feature"));

        let mut geom_extra = Map::new();
        geom_extra.insert("type".into(), Value::from("LineString"));

        Self {
            geometry: RouteGeometry {
                coordinates,
                extra: geom_extra,
            },
            extra,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_route() {
        let r: RouteDoc = serde_json::from_str(
            r#"{
                "type": "Feature",
                "properties": {"name": "harbour loop"},
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[11.92, 57.57], [11.93, 57.58]]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(r.geometry.coordinates, vec![[11.92, 57.57], [11.93, 57.58]]);
        assert_eq!(r.extra["properties"]["name"], "harbour loop");
        assert_eq!(r.geometry.extra["type"], "LineString");
    }

    #[test]
    fn test_from_coordinates() {
        let r = RouteDoc::from_coordinates(vec![[1.0, 2.0]]);
        let v = serde_json::to_value(&r).unwrap();

        assert_eq!(v["type"], "Feature");
        assert_eq!(v["geometry"]["coordinates"][0][1], 2.0);
    }
}
