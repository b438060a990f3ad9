mod reading;
mod store;

pub use reading::{rounded, SensorReading};
pub use store::{MemoryStore, StoreError, StoreUpdate, TelemetryStore};

/// Canonical key paths in the telemetry store. The same paths are used by the
/// irrigation firmware, so spellings are fixed.
pub mod paths {
    pub const SOIL_MOISTURE: &str = "Soil_Moisture_Sensor";
    pub const TEMPERATURE: &str = "Temperature_Humidity_Data/temperature";
    pub const HUMIDITY: &str = "Temperature_Humidity_Data/humidity";
    pub const WATER_LEVEL: &str = "Water_Level_Sensor";
    pub const MANUAL_OVERRIDE: &str = "manual_override";
    pub const MANUAL_PUMP_STATUS: &str = "manual_pump_status";
    pub const AUTO_MODE: &str = "auto_mode";
    pub const ONLINE: &str = "system_status/online";
}
