use crate::global_variables::{
    ABORT_AFTER_LEAVING_MS, ABORT_WHEN_ABSENT_MS, CONFIRM_PRESENCE_MS, COUNTDOWN_TICK_MS,
    CROSSING_SECONDS, ENDING_SECONDS, REQUEST_DELAY_MS, TRANSITION_MS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimingsError {
    #[error("countdown tick period must be greater than zero")]
    ZeroTickPeriod,

    #[error("{0} countdown must last at least one second")]
    ZeroCountdown(&'static str),
}

/// Delays and countdown lengths driving one crossing cycle.
///
/// Every field is optional when deserialising; missing ones keep the
/// values from `global_variables`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossingTimings {
    pub request_delay_ms: u64,
    pub confirm_presence_ms: u64,
    pub abort_after_leaving_ms: u64,
    pub abort_when_absent_ms: u64,
    pub transition_ms: u64,
    pub tick_period_ms: u64,
    pub crossing_seconds: u32,
    pub ending_seconds: u32,
}

impl Default for CrossingTimings {
    fn default() -> Self {
        Self {
            request_delay_ms: REQUEST_DELAY_MS,
            confirm_presence_ms: CONFIRM_PRESENCE_MS,
            abort_after_leaving_ms: ABORT_AFTER_LEAVING_MS,
            abort_when_absent_ms: ABORT_WHEN_ABSENT_MS,
            transition_ms: TRANSITION_MS,
            tick_period_ms: COUNTDOWN_TICK_MS,
            crossing_seconds: CROSSING_SECONDS,
            ending_seconds: ENDING_SECONDS,
        }
    }
}

impl CrossingTimings {
    /// Reads timings from a JSON file and validates them.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = fs::read_to_string(path)?;
        let timings: CrossingTimings = serde_json::from_str(&raw)?;
        timings.validate()?;
        Ok(timings)
    }

    pub fn validate(&self) -> Result<(), TimingsError> {
        if self.tick_period_ms == 0 {
            return Err(TimingsError::ZeroTickPeriod);
        }
        if self.crossing_seconds == 0 {
            return Err(TimingsError::ZeroCountdown("crossing"));
        }
        if self.ending_seconds == 0 {
            return Err(TimingsError::ZeroCountdown("ending"));
        }
        Ok(())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn confirm_presence(&self) -> Duration {
        Duration::from_millis(self.confirm_presence_ms)
    }

    pub fn abort_after_leaving(&self) -> Duration {
        Duration::from_millis(self.abort_after_leaving_ms)
    }

    pub fn abort_when_absent(&self) -> Duration {
        Duration::from_millis(self.abort_when_absent_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_standard_cycle() {
        let timings = CrossingTimings::default();
        assert_eq!(timings.request_delay(), Duration::from_millis(500));
        assert_eq!(timings.confirm_presence(), Duration::from_secs(3));
        assert_eq!(timings.abort_after_leaving(), Duration::from_secs(1));
        assert_eq!(timings.abort_when_absent(), Duration::from_secs(2));
        assert_eq!(timings.transition(), Duration::from_secs(2));
        assert_eq!(timings.tick_period(), Duration::from_secs(1));
        assert_eq!(timings.crossing_seconds, 5);
        assert_eq!(timings.ending_seconds, 3);
        assert!(timings.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let timings: CrossingTimings =
            serde_json::from_str(r#"{ "crossing_seconds": 8, "transition_ms": 1500 }"#).unwrap();
        assert_eq!(timings.crossing_seconds, 8);
        assert_eq!(timings.transition_ms, 1500);
        assert_eq!(timings.ending_seconds, ENDING_SECONDS);
        assert_eq!(timings.request_delay_ms, REQUEST_DELAY_MS);
    }

    #[test]
    fn zero_tick_period_is_rejected() {
        let timings = CrossingTimings {
            tick_period_ms: 0,
            ..CrossingTimings::default()
        };
        assert_eq!(timings.validate(), Err(TimingsError::ZeroTickPeriod));
    }

    #[test]
    fn zero_countdowns_are_rejected() {
        let crossing = CrossingTimings {
            crossing_seconds: 0,
            ..CrossingTimings::default()
        };
        assert_eq!(
            crossing.validate(),
            Err(TimingsError::ZeroCountdown("crossing"))
        );

        let ending = CrossingTimings {
            ending_seconds: 0,
            ..CrossingTimings::default()
        };
        assert_eq!(ending.validate(), Err(TimingsError::ZeroCountdown("ending")));
    }

    #[test]
    fn json_file_round_trip_through_disk() {
        let path = std::env::temp_dir().join(format!(
            "crossing_timings_{}.json",
            std::process::id()
        ));
        fs::write(&path, r#"{ "request_delay_ms": 250 }"#).unwrap();
        let timings = CrossingTimings::from_json_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(timings.request_delay(), Duration::from_millis(250));
    }

    #[test]
    fn invalid_json_file_is_an_error() {
        let path = std::env::temp_dir().join(format!(
            "crossing_timings_bad_{}.json",
            std::process::id()
        ));
        fs::write(&path, r#"{ "tick_period_ms": 0 }"#).unwrap();
        let result = CrossingTimings::from_json_file(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
