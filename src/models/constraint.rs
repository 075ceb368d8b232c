//! Run-wide workload constraints.
//!
//! A single constraint record applies to every staff member: a weekly
//! hour ceiling (combined with each staff member's own cap) and the
//! minimum rest between consecutive same-day sessions.

use serde::{Deserialize, Serialize};

/// Default weekly hour ceiling.
pub const DEFAULT_MAX_HOURS_PER_WEEK: u32 = 40;

/// Default minimum rest between consecutive sessions (hours).
pub const DEFAULT_MIN_REST_HOURS: f64 = 8.0;

/// Workload constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Weekly hour ceiling applied to every staff member.
    pub max_hours_per_week: u32,
    /// Minimum hours between the end of one session and the start of the
    /// next on the same day.
    pub min_rest_hours: f64,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            max_hours_per_week: DEFAULT_MAX_HOURS_PER_WEEK,
            min_rest_hours: DEFAULT_MIN_REST_HOURS,
        }
    }
}

impl Constraints {
    /// Creates constraints.
    pub fn new(max_hours_per_week: u32, min_rest_hours: f64) -> Self {
        Self {
            max_hours_per_week,
            min_rest_hours,
        }
    }

    /// Minimum rest in whole minutes (rounded up).
    pub fn min_rest_minutes(&self) -> i32 {
        (self.min_rest_hours.max(0.0) * 60.0).ceil() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Constraints::default();
        assert_eq!(c.max_hours_per_week, 40);
        assert!((c.min_rest_hours - 8.0).abs() < 1e-10);
        assert_eq!(c.min_rest_minutes(), 480);
    }

    #[test]
    fn test_fractional_rest() {
        assert_eq!(Constraints::new(40, 0.5).min_rest_minutes(), 30);
        assert_eq!(Constraints::new(40, 0.0).min_rest_minutes(), 0);
    }
}
