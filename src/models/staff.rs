//! Staff model.
//!
//! Staff members are the resources that absorb work: each carries
//! normalized skills and certifications, proficiency ordinals, tenure,
//! a weekly hour cap, hours already committed outside teaching, and
//! scheduling preferences.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{normalize_key, ClockTime, Weekday};

/// A staff member that can be assigned to work units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    /// Unique staff identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Normalized skill keys.
    pub skills: BTreeSet<String>,
    /// Normalized certification keys.
    pub certifications: BTreeSet<String>,
    /// Skill key → proficiency ordinal (1 = Beginner .. 4 = Expert, 0 = unknown).
    pub proficiency: BTreeMap<String, u8>,
    /// Years of experience.
    pub years_experience: f64,
    /// Weekly hour cap.
    pub max_hours_per_week: u32,
    /// Administrative hours already committed per week.
    pub admin_hours: u32,
    /// Extracurricular hours already committed per week.
    pub extracurricular_hours: u32,
    /// Employment status label (e.g. "Full-time").
    pub employment_status: String,
    /// Staff on leave are never assigned.
    pub on_leave: bool,
    /// Scheduling and assignment preferences.
    pub preferences: Preferences,
}

/// Ordinal skill depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProficiencyLevel {
    Beginner = 1,
    Intermediate = 2,
    Advanced = 3,
    Expert = 4,
}

impl ProficiencyLevel {
    /// Parses a textual label, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            "expert" => Some(Self::Expert),
            _ => None,
        }
    }

    /// Ordinal for a label; unknown labels map to 0.
    pub fn ordinal_for(label: &str) -> u8 {
        Self::from_label(label).map_or(0, Self::ordinal)
    }

    /// Ordinal value (1..=4).
    #[inline]
    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

/// Preferred part of the day for teaching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// Starts before noon.
    Morning,
    /// Starts at or after noon.
    Afternoon,
}

impl TimeOfDay {
    /// Parses "morning"/"afternoon" (also "am"/"pm").
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "am" => Some(Self::Morning),
            "afternoon" | "pm" => Some(Self::Afternoon),
            _ => None,
        }
    }

    /// Whether a slot starting at `start` falls in this part of the day.
    pub fn admits(self, start: ClockTime) -> bool {
        match self {
            Self::Morning => start.hour() < 12,
            Self::Afternoon => start.hour() >= 12,
        }
    }
}

/// Assignment and scheduling preferences.
///
/// Empty fields mean "no preference". Preferences narrow candidate sets
/// but never block an assignment outright.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Preferred part of the day.
    pub time_of_day: Option<TimeOfDay>,
    /// Days the staff member prefers not to work.
    pub days_off: BTreeSet<Weekday>,
    /// Normalized preferred subjects.
    pub subjects: BTreeSet<String>,
    /// Normalized preferred grade levels.
    pub grade_levels: BTreeSet<String>,
    /// Normalized shift preference (e.g. "early", "late").
    pub shift: Option<String>,
}

/// A preference record supplied separately from the staff list.
///
/// Replaces the preferences embedded on the matching staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffPreference {
    /// Target staff ID.
    pub staff_id: String,
    /// Replacement preferences.
    pub preferences: Preferences,
}

impl StaffPreference {
    /// Creates a preference record.
    pub fn new(staff_id: impl Into<String>, preferences: Preferences) -> Self {
        Self {
            staff_id: staff_id.into(),
            preferences,
        }
    }
}

impl Preferences {
    /// Whether a slot on `day` is acceptable.
    pub fn allows_day(&self, day: Weekday) -> bool {
        !self.days_off.contains(&day)
    }

    /// Whether a slot starting at `start` is acceptable.
    pub fn allows_start(&self, start: ClockTime) -> bool {
        self.time_of_day.map_or(true, |tod| tod.admits(start))
    }

    /// Whether work on `subject` is acceptable. Unknown subjects pass.
    pub fn allows_subject(&self, subject: Option<&str>) -> bool {
        match subject {
            Some(s) if !self.subjects.is_empty() => self.subjects.contains(&normalize_key(s)),
            _ => true,
        }
    }

    /// Whether work for `grade` is acceptable. Unknown grades pass.
    pub fn allows_grade(&self, grade: Option<&str>) -> bool {
        match grade {
            Some(g) if !self.grade_levels.is_empty() => {
                self.grade_levels.contains(&normalize_key(g))
            }
            _ => true,
        }
    }

    /// Whether work on `shift` is acceptable.
    pub fn allows_shift(&self, shift: Option<&str>) -> bool {
        match (&self.shift, shift) {
            (Some(preferred), Some(s)) => *preferred == normalize_key(s),
            _ => true,
        }
    }

    /// Whether no preference is set at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl StaffMember {
    /// Creates a staff member with a 40-hour cap and no skills.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            skills: BTreeSet::new(),
            certifications: BTreeSet::new(),
            proficiency: BTreeMap::new(),
            years_experience: 0.0,
            max_hours_per_week: 40,
            admin_hours: 0,
            extracurricular_hours: 0,
            employment_status: String::new(),
            on_leave: false,
            preferences: Preferences::default(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a skill without a proficiency level.
    pub fn with_skill(mut self, skill: &str) -> Self {
        self.skills.insert(normalize_key(skill));
        self
    }

    /// Adds a skill with a proficiency level.
    pub fn with_skill_level(mut self, skill: &str, level: ProficiencyLevel) -> Self {
        let key = normalize_key(skill);
        self.proficiency.insert(key.clone(), level.ordinal());
        self.skills.insert(key);
        self
    }

    /// Adds a certification.
    pub fn with_certification(mut self, certification: &str) -> Self {
        self.certifications.insert(normalize_key(certification));
        self
    }

    /// Sets years of experience.
    pub fn with_experience(mut self, years: f64) -> Self {
        self.years_experience = years.max(0.0);
        self
    }

    /// Sets the weekly hour cap.
    pub fn with_max_hours(mut self, hours: u32) -> Self {
        self.max_hours_per_week = hours;
        self
    }

    /// Sets administrative and extracurricular commitments.
    pub fn with_commitments(mut self, admin_hours: u32, extracurricular_hours: u32) -> Self {
        self.admin_hours = admin_hours;
        self.extracurricular_hours = extracurricular_hours;
        self
    }

    /// Marks the staff member as on leave.
    pub fn with_on_leave(mut self, on_leave: bool) -> Self {
        self.on_leave = on_leave;
        self
    }

    /// Sets preferences.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Hours committed outside assigned work.
    pub fn committed_hours(&self) -> u32 {
        self.admin_hours.saturating_add(self.extracurricular_hours)
    }

    /// Whether the staff member has a (normalized) skill.
    pub fn has_skill(&self, key: &str) -> bool {
        self.skills.contains(key)
    }

    /// Proficiency ordinal for a skill key (0 if unknown).
    pub fn proficiency_of(&self, key: &str) -> u8 {
        self.proficiency.get(key).copied().unwrap_or(0)
    }

    /// Whether any required key is among the skills or certifications.
    pub fn qualifies_for(&self, required: &BTreeSet<String>) -> bool {
        required
            .iter()
            .any(|r| self.skills.contains(r) || self.certifications.contains(r))
    }

    /// Whether every required key is among the skills.
    pub fn covers(&self, required: &BTreeSet<String>) -> bool {
        required.is_subset(&self.skills)
    }
}
