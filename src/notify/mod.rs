use serde::Serialize;

/// User-facing alert produced by the notification boundary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Alert {
    pub title: String,
    pub body: String,
    /// Water level percent that triggered the alert
    pub level: i64,
}

pub const DEFAULT_WATER_LEVEL_THRESHOLD: i64 = 20;

/// Low-water reservoir alert. Fires iff `level < threshold`; pure function
/// of its inputs, no state.
pub fn low_water_alert(level: i64, threshold: i64) -> Option<Alert> {
    if level < threshold {
        Some(Alert {
            title: "Low Water Level".to_string(),
            body: "The water level in the reservoir is low. Please refill the tank \
                   to ensure your plant is watered properly."
                .to_string(),
            level,
        })
    } else {
        None
    }
}
