use serde::Deserialize;

/// Complete Verdant configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct VerdantConfig {
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Auto-irrigation control configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ControlConfig {
    /// Soil-moisture percent below which auto mode irrigates
    #[serde(default = "default_moisture_threshold")]
    pub moisture_threshold: i64,
    /// Mirror manual commands onto manual_pump_status for firmware that
    /// still watches the legacy channel
    #[serde(default = "default_mirror_pump_status")]
    pub mirror_pump_status: bool,
}

fn default_moisture_threshold() -> i64 {
    30
}

fn default_mirror_pump_status() -> bool {
    true
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            moisture_threshold: default_moisture_threshold(),
            mirror_pump_status: default_mirror_pump_status(),
        }
    }
}

/// Notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Water-level percent below which the low-water alert fires
    #[serde(default = "default_water_level_threshold")]
    pub water_level_threshold: i64,
}

fn default_water_level_threshold() -> i64 {
    20
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            water_level_threshold: default_water_level_threshold(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<VerdantConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: VerdantConfig = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = VerdantConfig::default();
        assert_eq!(config.control.moisture_threshold, 30);
        assert_eq!(config.control.mirror_pump_status, true);
        assert_eq!(config.notifications.water_level_threshold, 20);
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            [control]
            moisture_threshold = 40
            mirror_pump_status = false

            [notifications]
            water_level_threshold = 15
        "#;

        let config: VerdantConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.control.moisture_threshold, 40);
        assert_eq!(config.control.mirror_pump_status, false);
        assert_eq!(config.notifications.water_level_threshold, 15);
    }

    #[test]
    fn test_partial_config() {
        // Missing sections use defaults
        let toml = r#"
            [control]
            moisture_threshold = 25
        "#;

        let config: VerdantConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.control.moisture_threshold, 25);
        assert_eq!(config.control.mirror_pump_status, true); // Default
        assert_eq!(config.notifications.water_level_threshold, 20); // Default
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[notifications]\nwater_level_threshold = 10\n"
        )
        .unwrap();

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.notifications.water_level_threshold, 10);
        assert_eq!(config.control.moisture_threshold, 30);
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("/nonexistent/verdant.toml").is_err());
    }
}
