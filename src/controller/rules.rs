use serde::Serialize;

/// Operator-selected control mode. Persisted externally on the `auto_mode`
/// path so other observers (firmware included) see it too.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Auto,
    Manual,
}

impl Mode {
    pub fn as_wire(self) -> &'static str {
        match self {
            Mode::Auto => "on",
            Mode::Manual => "off",
        }
    }

    pub fn from_wire(s: &str) -> Option<Mode> {
        match s {
            "on" => Some(Mode::Auto),
            "off" => Some(Mode::Manual),
            _ => None,
        }
    }
}

/// The single value that ultimately drives the irrigation pump
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PumpCommand {
    On,
    Off,
}

impl PumpCommand {
    pub fn as_wire(self) -> &'static str {
        match self {
            PumpCommand::On => "on",
            PumpCommand::Off => "off",
        }
    }

    pub fn from_wire(s: &str) -> Option<PumpCommand> {
        match s {
            "on" => Some(PumpCommand::On),
            "off" => Some(PumpCommand::Off),
            _ => None,
        }
    }

    pub fn from_bool(on: bool) -> PumpCommand {
        if on {
            PumpCommand::On
        } else {
            PumpCommand::Off
        }
    }
}

/// Threshold rule for the auto-irrigation loop.
///
/// Returns the command to issue, or `None` when no command may be issued:
/// in manual mode the controller never drives the pump, and an unknown
/// moisture reading holds the last command rather than defaulting to on.
pub fn evaluate(mode: Mode, moisture: Option<i64>, threshold: i64) -> Option<PumpCommand> {
    match (mode, moisture) {
        (Mode::Auto, Some(m)) if m < threshold => Some(PumpCommand::On),
        (Mode::Auto, Some(_)) => Some(PumpCommand::Off),
        _ => None,
    }
}

#[cfg(test)]
mod evaluate_tests {
    use super::*;

    #[test]
    fn below_threshold_turns_on() {
        assert_eq!(evaluate(Mode::Auto, Some(29), 30), Some(PumpCommand::On));
        assert_eq!(evaluate(Mode::Auto, Some(0), 30), Some(PumpCommand::On));
    }

    #[test]
    fn at_or_above_threshold_turns_off() {
        assert_eq!(evaluate(Mode::Auto, Some(30), 30), Some(PumpCommand::Off));
        assert_eq!(evaluate(Mode::Auto, Some(31), 30), Some(PumpCommand::Off));
        assert_eq!(evaluate(Mode::Auto, Some(100), 30), Some(PumpCommand::Off));
    }

    #[test]
    fn unknown_moisture_issues_nothing() {
        assert_eq!(evaluate(Mode::Auto, None, 30), None);
    }

    #[test]
    fn manual_mode_issues_nothing() {
        assert_eq!(evaluate(Mode::Manual, Some(5), 30), None);
        assert_eq!(evaluate(Mode::Manual, Some(95), 30), None);
        assert_eq!(evaluate(Mode::Manual, None, 30), None);
    }

    #[test]
    fn command_matches_threshold_comparison_for_full_range() {
        for m in -5..=105 {
            let expected = if m < 30 {
                PumpCommand::On
            } else {
                PumpCommand::Off
            };
            assert_eq!(evaluate(Mode::Auto, Some(m), 30), Some(expected));
        }
    }

    #[test]
    fn wire_encodings_round_trip() {
        assert_eq!(Mode::from_wire(Mode::Auto.as_wire()), Some(Mode::Auto));
        assert_eq!(Mode::from_wire(Mode::Manual.as_wire()), Some(Mode::Manual));
        assert_eq!(Mode::from_wire("auto"), None);
        assert_eq!(
            PumpCommand::from_wire(PumpCommand::On.as_wire()),
            Some(PumpCommand::On)
        );
        assert_eq!(PumpCommand::from_wire(""), None);
        assert_eq!(PumpCommand::from_bool(true), PumpCommand::On);
        assert_eq!(PumpCommand::from_bool(false), PumpCommand::Off);
    }
}
