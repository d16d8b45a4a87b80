use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::encoder::Encoder;
use crate::error::Result;
use crate::model::{Label, Point, SampleValue, Timestamp};

// {"metric":{"__name__":"cpu","host":"h1"},"values":[1.5],"timestamps":[1712417868425]}
#[derive(Serialize)]
struct ImportLine<'a> {
    metric: Metric<'a>,
    values: [SampleValue; 1],
    timestamps: [Timestamp; 1],
}

// Keeps labels in point order.
struct Metric<'a>(&'a [Label]);

impl<'a> Serialize for Metric<'a> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for label in self.0 {
            map.serialize_entry(
                &String::from_utf8_lossy(&label.key),
                &String::from_utf8_lossy(&label.value),
            )?;
        }
        map.end()
    }
}

/// One JSON line per point in the `/api/v1/import` shape.
pub struct JsonEncoder {}

impl JsonEncoder {
    pub fn new() -> Self {
        Self {}
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, point: &Point) -> Result<Vec<u8>> {
        let line = ImportLine {
            metric: Metric(&point.labels),
            values: [point.value],
            timestamps: [point.timestamp],
        };
        Ok(serde_json::to_vec(&line).map_err(|e| ("JSON serialization failed", e))?)
    }
}
