use serde::Serialize;
use serde_json::Value;

/// Latest sensor snapshot mirrored from the telemetry store.
///
/// `None` means "no value received yet" (or a malformed push), distinct
/// from zero. Fields arrive independently; each push is a partial update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SensorReading {
    pub soil_moisture: Option<i64>,
    pub temperature_c: Option<i64>,
    pub humidity: Option<i64>,
    pub water_level: Option<i64>,
}

/// Parse a raw store payload into an integer reading.
///
/// Sensor values arrive as JSON numbers and may be fractional; they are
/// rounded to the nearest integer. Anything non-numeric is unknown.
pub fn rounded(value: &Value) -> Option<i64> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .map(|v| v.round() as i64)
}
