//! Engine configuration.
//!
//! Every default the engine falls back to when input records omit a
//! field lives here, so downstream phases never branch on field presence.

use serde::{Deserialize, Serialize};

use crate::error::{AllocationError, Result};
use crate::models::{
    Weekday, DEFAULT_MAX_HOURS_PER_WEEK, DEFAULT_MIN_REST_HOURS, DEFAULT_SUBJECT_HOURS,
};

/// Staff assigned per work unit when the unit sets no quota.
pub const DEFAULT_STAFF_QUOTA: usize = 6;

/// Weekly hour cap for staff records without one.
pub const DEFAULT_HOUR_CAP: u32 = 40;

/// Allocation engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Staff hour cap when a record has none.
    pub default_hour_cap: u32,
    /// Hours per catalog subject when an entry has none.
    pub default_subject_hours: u32,
    /// Constraint fallback for the weekly ceiling.
    pub default_max_hours_per_week: u32,
    /// Constraint fallback for minimum rest (hours).
    pub default_min_rest_hours: f64,
    /// Staff per work unit when the unit has no quota.
    pub default_staff_quota: usize,
    /// First hour of the auto-placement window.
    pub day_start_hour: u16,
    /// End hour (exclusive) of the auto-placement window.
    pub day_end_hour: u16,
    /// Days scanned by auto-placement, in order.
    pub grid_days: Vec<Weekday>,
    /// Length of one auto-placed session (hours).
    pub session_hours: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_hour_cap: DEFAULT_HOUR_CAP,
            default_subject_hours: DEFAULT_SUBJECT_HOURS,
            default_max_hours_per_week: DEFAULT_MAX_HOURS_PER_WEEK,
            default_min_rest_hours: DEFAULT_MIN_REST_HOURS,
            default_staff_quota: DEFAULT_STAFF_QUOTA,
            day_start_hour: 7,
            day_end_hour: 17,
            grid_days: Weekday::WORK_WEEK.to_vec(),
            session_hours: 1,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the default staff quota.
    pub fn with_staff_quota(mut self, quota: usize) -> Self {
        self.default_staff_quota = quota;
        self
    }

    /// Sets the auto-placement day window.
    pub fn with_day_window(mut self, start_hour: u16, end_hour: u16) -> Self {
        self.day_start_hour = start_hour;
        self.day_end_hour = end_hour;
        self
    }

    /// Sets the auto-placement days.
    pub fn with_grid_days(mut self, days: Vec<Weekday>) -> Self {
        self.grid_days = days;
        self
    }

    /// Sets the session length.
    pub fn with_session_hours(mut self, hours: u16) -> Self {
        self.session_hours = hours;
        self
    }

    /// Sets the constraint fallbacks.
    pub fn with_constraint_defaults(mut self, max_hours_per_week: u32, min_rest_hours: f64) -> Self {
        self.default_max_hours_per_week = max_hours_per_week;
        self.default_min_rest_hours = min_rest_hours;
        self
    }

    /// Checks internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.day_end_hour > 24 {
            return Err(AllocationError::InvalidConfig(format!(
                "day_end_hour {} is past midnight",
                self.day_end_hour
            )));
        }
        if self.day_start_hour >= self.day_end_hour {
            return Err(AllocationError::InvalidConfig(format!(
                "day window {}..{} is empty",
                self.day_start_hour, self.day_end_hour
            )));
        }
        if self.session_hours == 0 {
            return Err(AllocationError::InvalidConfig(
                "session_hours must be positive".into(),
            ));
        }
        if self.session_hours > self.day_end_hour - self.day_start_hour {
            return Err(AllocationError::InvalidConfig(format!(
                "a {}-hour session does not fit the {}..{} day window",
                self.session_hours, self.day_start_hour, self.day_end_hour
            )));
        }
        if self.grid_days.is_empty() {
            return Err(AllocationError::InvalidConfig(
                "grid_days must not be empty".into(),
            ));
        }
        if self.default_max_hours_per_week == 0 || self.default_min_rest_hours < 0.0 {
            return Err(AllocationError::InvalidConfig(
                "constraint defaults must be a positive ceiling and non-negative rest".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_staff_quota, 6);
        assert_eq!(config.default_hour_cap, 40);
        assert_eq!(config.default_subject_hours, 4);
        assert_eq!(config.grid_days.len(), 5);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"default_staff_quota": 2, "day_end_hour": 15}"#)
            .unwrap();
        assert_eq!(config.default_staff_quota, 2);
        assert_eq!(config.day_end_hour, 15);
        assert_eq!(config.day_start_hour, 7);
    }

    #[test]
    fn test_invalid_windows() {
        assert!(EngineConfig::new().with_day_window(10, 10).validate().is_err());
        assert!(EngineConfig::new().with_day_window(8, 25).validate().is_err());
        assert!(EngineConfig::new().with_session_hours(0).validate().is_err());
        assert!(EngineConfig::new()
            .with_day_window(8, 9)
            .with_session_hours(2)
            .validate()
            .is_err());
        assert!(EngineConfig::new().with_grid_days(vec![]).validate().is_err());
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let err = EngineConfig::from_json(r#"{"session_hours": 0}"#).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidConfig(_)));
        let err = EngineConfig::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, AllocationError::Json(_)));
    }
}
