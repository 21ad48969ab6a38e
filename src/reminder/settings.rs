use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Times offered as one-tap presets
pub const QUICK_TIMES: [&str; 3] = ["08:00", "12:00", "20:00"];

/// Hour and minute of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeOfDay")]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

/// Stored shape of a `TimeOfDay`, range-checked on the way in
#[derive(Deserialize)]
struct RawTimeOfDay {
    hour: u8,
    minute: u8,
}

impl TryFrom<RawTimeOfDay> for TimeOfDay {
    type Error = anyhow::Error;

    fn try_from(raw: RawTimeOfDay) -> Result<Self> {
        Self::new(raw.hour, raw.minute)
    }
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self> {
        if hour > 23 || minute > 59 {
            bail!("Invalid time of day {}:{}", hour, minute);
        }
        Ok(Self { hour, minute })
    }

    /// Parse "HH:MM"
    pub fn parse(text: &str) -> Result<Self> {
        let (hour, minute) = text
            .trim()
            .split_once(':')
            .with_context(|| format!("Expected HH:MM, got '{}'", text))?;
        let hour = hour
            .parse()
            .with_context(|| format!("Invalid hour in '{}'", text))?;
        let minute = minute
            .parse()
            .with_context(|| format!("Invalid minute in '{}'", text))?;
        Self::new(hour, minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Daily reminder configuration (one per device)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSetting {
    pub enabled: bool,
    #[serde(flatten)]
    pub time: TimeOfDay,
}

impl Default for ReminderSetting {
    fn default() -> Self {
        Self {
            enabled: false,
            time: TimeOfDay {
                hour: 20,
                minute: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_of_day() {
        let time = TimeOfDay::parse("09:30").unwrap();
        assert_eq!(time, TimeOfDay { hour: 9, minute: 30 });
        assert_eq!(time.to_string(), "09:30");
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(TimeOfDay::parse("24:00").is_err());
        assert!(TimeOfDay::parse("12:60").is_err());
        assert!(TimeOfDay::parse("noon").is_err());
    }

    #[test]
    fn test_default_setting() {
        let setting = ReminderSetting::default();
        assert!(!setting.enabled);
        assert_eq!(setting.time.to_string(), "20:00");
    }

    #[test]
    fn test_setting_json_shape() {
        let setting = ReminderSetting {
            enabled: true,
            time: TimeOfDay { hour: 8, minute: 5 },
        };
        let json = serde_json::to_value(setting).unwrap();
        assert_eq!(json, serde_json::json!({"enabled": true, "hour": 8, "minute": 5}));
    }

    #[test]
    fn test_setting_rejects_out_of_range_time() {
        let parsed: Result<ReminderSetting, _> =
            serde_json::from_str(r#"{"enabled":true,"hour":99,"minute":0}"#);
        assert!(parsed.is_err());

        let parsed: ReminderSetting =
            serde_json::from_str(r#"{"enabled":true,"hour":7,"minute":45}"#).unwrap();
        assert_eq!(parsed.time.to_string(), "07:45");
    }
}
