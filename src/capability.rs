//! Capability index.
//!
//! Turns raw records into normalized models and builds the lookup
//! structure every later phase reads from. All defaulting happens here:
//! downstream code never checks whether a field was present.
//!
//! # Defaults
//!
//! | Missing | Replaced by |
//! |---------|-------------|
//! | skills / certifications | empty set |
//! | proficiency label | ordinal from label, unknown = 0 |
//! | staff hour cap | `EngineConfig::default_hour_cap` |
//! | subject / unit hours | `EngineConfig::default_subject_hours` |
//! | constraint fields | `EngineConfig` constraint defaults |
//! | preferences | no preference |

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::config::EngineConfig;
use crate::error::{AllocationError, Result};
use crate::input::{
    AllocationRequest, RawConstraints, RawGroup, RawLevel, RawPreference, RawPreferenceFields,
    RawProficiency, RawStaff, RawSubject, RawWorkUnit,
};
use crate::models::{
    normalize_key, ClockTime, Constraints, CurriculumCatalog, FixedSlot, GroupCurriculum,
    Preferences, ProficiencyLevel, StaffMember, StaffPreference, Subject, TimeOfDay, Weekday,
    WorkUnit,
};

/// Typed input of one allocation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedInput {
    pub staff: Vec<StaffMember>,
    pub work_units: Vec<WorkUnit>,
    pub constraints: Constraints,
    pub preferences: Vec<StaffPreference>,
    pub catalog: Option<CurriculumCatalog>,
}

/// Converts a raw request into typed models.
///
/// Fails only when a staff record has neither an ID nor a name.
pub fn normalize_request(request: &AllocationRequest, config: &EngineConfig) -> Result<NormalizedInput> {
    let staff = request
        .staff
        .iter()
        .enumerate()
        .map(|(i, raw)| staff_from_raw(raw, i, config))
        .collect::<Result<Vec<_>>>()?;

    let work_units = request
        .work_units
        .iter()
        .enumerate()
        .map(|(i, raw)| work_unit_from_raw(raw, i, config))
        .collect();

    let preferences = request
        .preferences
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| preference_from_raw(raw, i))
        .collect();

    Ok(NormalizedInput {
        staff,
        work_units,
        constraints: constraints_from_raw(&request.constraints, config),
        preferences,
        catalog: request
            .catalog
            .as_ref()
            .map(|groups| catalog_from_raw(groups, config)),
    })
}

/// Normalizes a staff record.
pub fn staff_from_raw(raw: &RawStaff, position: usize, config: &EngineConfig) -> Result<StaffMember> {
    let name = raw.name.as_deref().map(str::trim).unwrap_or_default().to_string();
    let id = raw
        .id
        .as_ref()
        .and_then(|id| id.to_id())
        .or_else(|| (!name.is_empty()).then(|| name.clone()))
        .ok_or_else(|| {
            AllocationError::InvalidInput(format!("staff record {position} has no id or name"))
        })?;

    let skills = raw
        .skills
        .iter()
        .chain(&raw.additional_skills)
        .map(|s| normalize_key(s))
        .filter(|s| !s.is_empty())
        .collect();
    let certifications = raw
        .certifications
        .iter()
        .map(|s| normalize_key(s))
        .filter(|s| !s.is_empty())
        .collect();

    let proficiency = match &raw.proficiency {
        RawProficiency::Map(levels) => levels
            .iter()
            .map(|(skill, level)| (normalize_key(skill), level_ordinal(level)))
            .collect(),
        RawProficiency::List(_) | RawProficiency::Missing => Default::default(),
    };

    Ok(StaffMember {
        name: if name.is_empty() { id.clone() } else { name },
        id,
        skills,
        certifications,
        proficiency,
        years_experience: raw.years_experience.map_or(0.0, |y| y.max(0.0)),
        max_hours_per_week: raw
            .max_hours_per_week
            .map_or(config.default_hour_cap, whole_hours),
        admin_hours: raw.admin_hours.map_or(0, whole_hours),
        extracurricular_hours: raw.extracurricular_hours.map_or(0, whole_hours),
        employment_status: raw.employment_status.clone().unwrap_or_default(),
        on_leave: raw.on_leave.is_some_and(|f| f.is_set()),
        preferences: raw
            .preferences
            .as_ref()
            .map(preferences_from_raw)
            .unwrap_or_default(),
    })
}

/// Normalizes a work-unit record.
///
/// Required skills are the explicit requirements plus the names of the
/// unit's core and specialized subjects.
pub fn work_unit_from_raw(raw: &RawWorkUnit, position: usize, config: &EngineConfig) -> WorkUnit {
    let text = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let id = raw
        .id
        .as_ref()
        .and_then(|id| id.to_id())
        .or_else(|| text(&raw.name))
        .or_else(|| text(&raw.subject))
        .unwrap_or_else(|| format!("work-unit-{}", position + 1));
    let group = text(&raw.group)
        .or_else(|| text(&raw.name))
        .unwrap_or_else(|| id.clone());

    let required_skills = raw
        .requirements
        .iter()
        .chain(&raw.core_subjects)
        .chain(&raw.specialized_subjects)
        .map(|s| normalize_key(s))
        .filter(|s| !s.is_empty())
        .collect();

    let fixed_slot = fixed_slot_from_raw(raw, &id);

    WorkUnit {
        group,
        subject: text(&raw.subject),
        grade_level: text(&raw.grade),
        required_skills,
        hours_per_week: raw
            .hours_per_week
            .map_or(config.default_subject_hours, whole_hours),
        fixed_slot,
        shift: text(&raw.shift),
        critical: raw.critical.is_some_and(|f| f.is_set()),
        staff_quota: raw.staff_quota.map(|q| q as usize),
        id,
    }
}

fn fixed_slot_from_raw(raw: &RawWorkUnit, id: &str) -> Option<FixedSlot> {
    let given = [&raw.day, &raw.start, &raw.end]
        .iter()
        .filter(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
        .count();
    if given == 0 {
        return None;
    }

    let day = raw.day.as_deref().and_then(Weekday::parse);
    let start = raw.start.as_deref().and_then(|s| s.parse::<ClockTime>().ok());
    let end = raw.end.as_deref().and_then(|s| s.parse::<ClockTime>().ok());
    let slot = match (day, start, end) {
        (Some(day), Some(start), Some(end)) => FixedSlot::new(day, start, end),
        _ => None,
    };
    if slot.is_none() {
        warn!(
            work_unit = id,
            day = ?raw.day,
            start = ?raw.start,
            end = ?raw.end,
            "Ignoring incomplete or inverted fixed slot"
        );
    }
    slot
}

/// Resolves constraint fallbacks.
///
/// Non-positive ceilings become 0 and negative rest periods are kept so
/// validation can report them.
pub fn constraints_from_raw(raw: &RawConstraints, config: &EngineConfig) -> Constraints {
    Constraints {
        max_hours_per_week: raw
            .max_hours_per_week
            .map_or(config.default_max_hours_per_week, whole_hours),
        min_rest_hours: raw.min_rest_hours.unwrap_or(config.default_min_rest_hours),
    }
}

fn preference_from_raw(raw: &RawPreference, position: usize) -> Option<StaffPreference> {
    match raw.staff_id.as_ref().and_then(|id| id.to_id()) {
        Some(staff_id) => Some(StaffPreference::new(staff_id, preferences_from_raw(&raw.fields))),
        None => {
            warn!(record = position, "Ignoring preference record without a staff id");
            None
        }
    }
}

/// Normalizes preference fields. Unrecognized values are dropped.
pub fn preferences_from_raw(raw: &RawPreferenceFields) -> Preferences {
    let time_of_day = raw.time_of_day.as_deref().and_then(|s| {
        let parsed = TimeOfDay::parse(s);
        if parsed.is_none() && !s.trim().is_empty() {
            warn!(value = s, "Ignoring unrecognized time-of-day preference");
        }
        parsed
    });
    let days_off = raw
        .preferred_days_off
        .iter()
        .filter_map(|d| {
            let day = Weekday::parse(d);
            if day.is_none() {
                warn!(value = %d, "Ignoring unrecognized day off");
            }
            day
        })
        .collect();

    Preferences {
        time_of_day,
        days_off,
        subjects: keys(&raw.preferred_subjects),
        grade_levels: keys(&raw.preferred_grades),
        shift: raw
            .shift_preference
            .as_deref()
            .map(normalize_key)
            .filter(|s| !s.is_empty()),
    }
}

/// Normalizes a catalog override. Groups without a name are skipped.
pub fn catalog_from_raw(groups: &[RawGroup], config: &EngineConfig) -> CurriculumCatalog {
    let subject = |raw: &RawSubject| match raw {
        RawSubject::Name(name) => Subject::new(name.trim(), config.default_subject_hours),
        RawSubject::Detailed {
            name,
            hours_per_week,
            required_skills,
        } => {
            let subject = Subject::new(
                name.trim(),
                hours_per_week.map_or(config.default_subject_hours, whole_hours),
            );
            if required_skills.is_empty() {
                subject
            } else {
                subject.with_required_skills(required_skills)
            }
        }
    };

    let groups = groups
        .iter()
        .filter_map(|g| {
            let name = g.group.as_deref().map(str::trim).filter(|s| !s.is_empty());
            if name.is_none() {
                warn!("Ignoring catalog group without a name");
            }
            Some(GroupCurriculum {
                group: name?.to_string(),
                core: g.core_subjects.iter().map(subject).collect(),
                specialized: g.specialized_subjects.iter().map(subject).collect(),
            })
        })
        .collect();
    CurriculumCatalog { groups }
}

fn keys(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|s| normalize_key(s))
        .filter(|s| !s.is_empty())
        .collect()
}

fn level_ordinal(level: &RawLevel) -> u8 {
    match level {
        RawLevel::Label(label) => ProficiencyLevel::ordinal_for(label),
        RawLevel::Ordinal(n) if (1.0..=4.0).contains(&n.round()) => n.round() as u8,
        RawLevel::Ordinal(_) => 0,
    }
}

/// Rounds to whole hours; negative and non-finite values become 0.
fn whole_hours(hours: f64) -> u32 {
    if hours.is_finite() && hours > 0.0 {
        hours.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Normalized lookup structure over one run's staff and work.
///
/// Staff are addressed by their position in input order; that position
/// is the key every later phase uses.
#[derive(Debug, Clone)]
pub struct CapabilityIndex {
    staff: Vec<StaffMember>,
    caps: Vec<u32>,
    positions: HashMap<String, usize>,
    work_units: Vec<WorkUnit>,
    constraints: Constraints,
    catalog: CurriculumCatalog,
}

impl CapabilityIndex {
    /// Builds the index.
    ///
    /// Re-normalizes every key (so hand-built models behave like parsed
    /// ones), applies standalone preference records, and derives each
    /// staff member's effective cap: the smaller of their own cap and the
    /// run-wide ceiling.
    pub fn build(
        staff: Vec<StaffMember>,
        work_units: Vec<WorkUnit>,
        constraints: Constraints,
        preferences: &[StaffPreference],
        catalog: CurriculumCatalog,
    ) -> Self {
        let mut staff: Vec<StaffMember> = staff.into_iter().map(normalize_staff).collect();
        let positions: HashMap<String, usize> = staff
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();

        for pref in preferences {
            match positions.get(&pref.staff_id) {
                Some(&i) => staff[i].preferences = normalize_preferences(pref.preferences.clone()),
                None => warn!(staff_id = %pref.staff_id, "Preference record for unknown staff"),
            }
        }

        let caps = staff
            .iter()
            .map(|s| {
                let cap = s.max_hours_per_week.min(constraints.max_hours_per_week);
                if s.committed_hours() > cap {
                    warn!(
                        staff_id = %s.id,
                        committed = s.committed_hours(),
                        cap,
                        "Committed hours already exceed the weekly cap"
                    );
                }
                cap
            })
            .collect();

        let work_units = work_units.into_iter().map(normalize_work_unit).collect();

        Self {
            staff,
            caps,
            positions,
            work_units,
            constraints,
            catalog,
        }
    }

    /// Staff in input order.
    pub fn staff(&self) -> &[StaffMember] {
        &self.staff
    }

    /// Staff member at a position.
    pub fn member(&self, idx: usize) -> &StaffMember {
        &self.staff[idx]
    }

    /// Number of staff.
    pub fn staff_count(&self) -> usize {
        self.staff.len()
    }

    /// Position of a staff ID.
    pub fn position(&self, staff_id: &str) -> Option<usize> {
        self.positions.get(staff_id).copied()
    }

    /// Effective weekly cap of a staff member.
    pub fn cap(&self, idx: usize) -> u32 {
        self.caps[idx]
    }

    /// Work units in input order.
    pub fn work_units(&self) -> &[WorkUnit] {
        &self.work_units
    }

    /// Run constraints.
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Curriculum catalog.
    pub fn catalog(&self) -> &CurriculumCatalog {
        &self.catalog
    }

    /// Whether a staff member may receive work at all.
    pub fn is_available(&self, idx: usize) -> bool {
        !self.staff[idx].on_leave
    }

    /// Available staff whose skills or certifications meet any required
    /// key, in input order.
    pub fn qualified(&self, required: &BTreeSet<String>) -> Vec<usize> {
        (0..self.staff.len())
            .filter(|&i| self.is_available(i) && self.staff[i].qualifies_for(required))
            .collect()
    }
}

fn normalize_set(set: BTreeSet<String>) -> BTreeSet<String> {
    set.iter()
        .map(|s| normalize_key(s))
        .filter(|s| !s.is_empty())
        .collect()
}

fn normalize_staff(mut s: StaffMember) -> StaffMember {
    s.id = s.id.trim().to_string();
    s.skills = normalize_set(std::mem::take(&mut s.skills));
    s.certifications = normalize_set(std::mem::take(&mut s.certifications));
    s.proficiency = std::mem::take(&mut s.proficiency)
        .into_iter()
        .map(|(k, v)| (normalize_key(&k), v.min(4)))
        .collect();
    s.preferences = normalize_preferences(std::mem::take(&mut s.preferences));
    s
}

fn normalize_preferences(mut p: Preferences) -> Preferences {
    p.subjects = normalize_set(std::mem::take(&mut p.subjects));
    p.grade_levels = normalize_set(std::mem::take(&mut p.grade_levels));
    p.shift = p.shift.map(|s| normalize_key(&s)).filter(|s| !s.is_empty());
    p
}

fn normalize_work_unit(mut u: WorkUnit) -> WorkUnit {
    u.id = u.id.trim().to_string();
    u.required_skills = normalize_set(std::mem::take(&mut u.required_skills));
    if let Some(slot) = u.fixed_slot {
        if slot.window.start >= slot.window.end {
            warn!(work_unit = %u.id, "Ignoring inverted fixed slot");
            u.fixed_slot = None;
        }
    }
    u
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{RawFlag, RawId};
    use std::collections::BTreeMap;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_staff_defaults() {
        let raw = RawStaff {
            id: Some(RawId::Number(12)),
            ..Default::default()
        };
        let s = staff_from_raw(&raw, 0, &config()).unwrap();
        assert_eq!(s.id, "12");
        assert_eq!(s.name, "12");
        assert!(s.skills.is_empty());
        assert_eq!(s.max_hours_per_week, 40);
        assert_eq!(s.committed_hours(), 0);
        assert!(!s.on_leave);
        assert!(s.preferences.is_empty());
    }

    #[test]
    fn test_staff_without_identity_is_invalid() {
        let err = staff_from_raw(&RawStaff::default(), 3, &config()).unwrap_err();
        match err {
            AllocationError::InvalidInput(msg) => assert!(msg.contains("staff record 3")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_staff_normalization() {
        let raw = RawStaff {
            name: Some(" Ana Cruz ".into()),
            skills: vec!["  MATHEMATICS".into(), "Physics".into()],
            additional_skills: vec!["Robotics".into()],
            certifications: vec!["LET ".into()],
            proficiency: RawProficiency::Map(BTreeMap::from([
                ("Mathematics".to_string(), RawLevel::Label("Expert".into())),
                ("Physics".to_string(), RawLevel::Label("Wizard".into())),
                ("Robotics".to_string(), RawLevel::Ordinal(2.0)),
                ("Chess".to_string(), RawLevel::Ordinal(9.0)),
            ])),
            max_hours_per_week: Some(29.6),
            admin_hours: Some(-3.0),
            on_leave: Some(RawFlag::Number(1)),
            ..Default::default()
        };
        let s = staff_from_raw(&raw, 0, &config()).unwrap();
        assert_eq!(s.id, "Ana Cruz");
        assert!(s.has_skill("mathematics"));
        assert!(s.has_skill("robotics"));
        assert!(s.certifications.contains("let"));
        assert_eq!(s.proficiency_of("mathematics"), 4);
        assert_eq!(s.proficiency_of("physics"), 0);
        assert_eq!(s.proficiency_of("robotics"), 2);
        assert_eq!(s.proficiency_of("chess"), 0);
        assert_eq!(s.max_hours_per_week, 30);
        assert_eq!(s.admin_hours, 0);
        assert!(s.on_leave);
    }

    #[test]
    fn test_work_unit_from_strand_record() {
        let raw = RawWorkUnit {
            name: Some("STEM".into()),
            core_subjects: vec!["General Mathematics".into()],
            specialized_subjects: vec!["Pre-Calculus".into()],
            requirements: vec!["Mathematics".into()],
            ..Default::default()
        };
        let u = work_unit_from_raw(&raw, 0, &config());
        assert_eq!(u.id, "STEM");
        assert_eq!(u.group, "STEM");
        assert_eq!(u.hours_per_week, 4);
        assert_eq!(u.required_skills.len(), 3);
        assert!(u.required_skills.contains("pre-calculus"));
        assert!(u.fixed_slot.is_none());
    }

    #[test]
    fn test_work_unit_id_fallback() {
        let u = work_unit_from_raw(&RawWorkUnit::default(), 4, &config());
        assert_eq!(u.id, "work-unit-5");
        assert_eq!(u.group, "work-unit-5");
    }

    #[test]
    fn test_fixed_slot_parsing() {
        let raw = RawWorkUnit {
            id: Some(RawId::Text("U1".into())),
            day: Some("tuesday".into()),
            start: Some("13:00".into()),
            end: Some("14:30".into()),
            ..Default::default()
        };
        let slot = work_unit_from_raw(&raw, 0, &config()).fixed_slot.unwrap();
        assert_eq!(slot.day, Weekday::Tuesday);
        assert_eq!(slot.window.duration_minutes(), 90);

        let inverted = RawWorkUnit {
            end: Some("12:00".into()),
            ..raw.clone()
        };
        assert!(work_unit_from_raw(&inverted, 0, &config()).fixed_slot.is_none());

        let partial = RawWorkUnit {
            end: None,
            ..raw
        };
        assert!(work_unit_from_raw(&partial, 0, &config()).fixed_slot.is_none());
    }

    #[test]
    fn test_constraint_fallbacks() {
        let c = constraints_from_raw(&RawConstraints::default(), &config());
        assert_eq!(c, Constraints::default());

        let c = constraints_from_raw(
            &RawConstraints {
                max_hours_per_week: Some(-5.0),
                min_rest_hours: Some(1.5),
            },
            &config(),
        );
        assert_eq!(c.max_hours_per_week, 0);
        assert!((c.min_rest_hours - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_preferences_parsing() {
        let p = preferences_from_raw(&RawPreferenceFields {
            time_of_day: Some("Afternoon".into()),
            preferred_days_off: vec!["Friday".into(), "Blursday".into()],
            preferred_subjects: vec!["Basic  Calculus".into()],
            preferred_grades: vec![],
            shift_preference: Some(" Late ".into()),
        });
        assert_eq!(p.time_of_day, Some(TimeOfDay::Afternoon));
        assert_eq!(p.days_off.len(), 1);
        assert!(p.subjects.contains("basic calculus"));
        assert_eq!(p.shift.as_deref(), Some("late"));
    }

    #[test]
    fn test_catalog_override() {
        let groups = vec![
            RawGroup {
                group: Some("STEM".into()),
                core_subjects: vec![RawSubject::Name("Oral Communication".into())],
                specialized_subjects: vec![RawSubject::Detailed {
                    name: "Pre-Calculus".into(),
                    hours_per_week: Some(5.0),
                    required_skills: vec!["Mathematics".into()],
                }],
            },
            RawGroup::default(),
        ];
        let catalog = catalog_from_raw(&groups, &config());
        assert_eq!(catalog.group_count(), 1);
        let stem = catalog.group("STEM").unwrap();
        assert_eq!(stem.core[0].hours_per_week, 4);
        assert_eq!(stem.specialized[0].hours_per_week, 5);
        assert!(stem.specialized[0].required_skills.contains("mathematics"));
    }

    #[test]
    fn test_index_effective_caps_and_preferences() {
        let staff = vec![
            StaffMember::new("T1").with_max_hours(50).with_skill("Math"),
            StaffMember::new("T2").with_max_hours(20).with_skill("Art"),
            StaffMember::new("T3").with_skill("Math").with_on_leave(true),
        ];
        let prefs = vec![
            StaffPreference::new(
                "T2",
                Preferences {
                    days_off: [Weekday::Monday].into(),
                    ..Default::default()
                },
            ),
            StaffPreference::new("ghost", Preferences::default()),
        ];
        let index = CapabilityIndex::build(
            staff,
            vec![],
            Constraints::new(30, 8.0),
            &prefs,
            CurriculumCatalog::new(),
        );

        assert_eq!(index.cap(0), 30);
        assert_eq!(index.cap(1), 20);
        assert_eq!(index.position("T2"), Some(1));
        assert!(!index.member(1).preferences.allows_day(Weekday::Monday));

        let required: BTreeSet<String> = ["math".to_string()].into();
        assert_eq!(index.qualified(&required), vec![0]);
    }

    #[test]
    fn test_index_renormalizes_hand_built_models() {
        let mut s = StaffMember::new(" T1 ");
        s.skills.insert("  General   Mathematics".into());
        let mut u = WorkUnit::new("U1", "STEM");
        u.required_skills.insert("GENERAL MATHEMATICS".into());

        let index = CapabilityIndex::build(
            vec![s],
            vec![u],
            Constraints::default(),
            &[],
            CurriculumCatalog::new(),
        );
        assert_eq!(index.member(0).id, "T1");
        assert_eq!(index.qualified(&index.work_units()[0].required_skills), vec![0]);
    }

    #[test]
    fn test_normalize_request_end_to_end() {
        let request = AllocationRequest::from_json(
            r#"{
                "staff": [{"id": 1, "name": "Ana", "skills": ["Math"]}],
                "work_units": [{"id": "U1", "strand": "STEM", "required_skills": ["Math"]}],
                "preferences": [{"staff_id": 1, "preferred_hours": "morning"}, {}],
                "constraints": {"min_rest_hours": 1}
            }"#,
        )
        .unwrap();
        let input = normalize_request(&request, &config()).unwrap();
        assert_eq!(input.staff[0].id, "1");
        assert_eq!(input.work_units[0].group, "STEM");
        assert_eq!(input.preferences.len(), 1);
        assert_eq!(input.preferences[0].preferences.time_of_day, Some(TimeOfDay::Morning));
        assert!((input.constraints.min_rest_hours - 1.0).abs() < 1e-10);
        assert_eq!(input.constraints.max_hours_per_week, 40);
        assert!(input.catalog.is_none());
    }
}
