//! Raw input records.
//!
//! Records arrive from external systems with missing fields, numeric ids,
//! comma-joined lists, and legacy field names. The types here accept all
//! of that; [`crate::capability`] turns them into normalized models.
//!
//! Legacy spellings are folded onto the canonical key before a record is
//! parsed. When a record carries both spellings the canonical one wins.
//!
//! Only structural problems are errors: a request that is not an object,
//! a list field holding something other than a list, or a list element
//! that is not a well-typed record.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::{AllocationError, Result};

/// A complete allocation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Staff records, in input order.
    pub staff: Vec<RawStaff>,
    /// Work-unit records, in input order.
    pub work_units: Vec<RawWorkUnit>,
    /// Constraint record.
    pub constraints: RawConstraints,
    /// Standalone preference records.
    pub preferences: Vec<RawPreference>,
    /// Curriculum override; `None` uses the engine's catalog.
    pub catalog: Option<Vec<RawGroup>>,
}

/// Identifier given as a JSON number or string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    /// Canonical string form (trimmed); `None` when empty.
    pub fn to_id(&self) -> Option<String> {
        let s = match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
        };
        (!s.is_empty()).then_some(s)
    }
}

/// Proficiency given as a label ("Expert") or an ordinal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLevel {
    Ordinal(f64),
    Label(String),
}

/// Proficiency map. Legacy producers send an empty list instead of a map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawProficiency {
    Map(BTreeMap<String, RawLevel>),
    List(Vec<Value>),
    #[default]
    Missing,
}

/// Boolean given as `true`/`false` or `1`/`0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawFlag {
    Bool(bool),
    Number(i64),
}

impl RawFlag {
    pub fn is_set(self) -> bool {
        match self {
            Self::Bool(b) => b,
            Self::Number(n) => n != 0,
        }
    }
}

/// A staff record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStaff {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub skills: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub additional_skills: Vec<String>,
    pub certifications: Vec<String>,
    pub proficiency: RawProficiency,
    pub years_experience: Option<f64>,
    pub max_hours_per_week: Option<f64>,
    pub admin_hours: Option<f64>,
    pub extracurricular_hours: Option<f64>,
    pub employment_status: Option<String>,
    pub on_leave: Option<RawFlag>,
    pub preferences: Option<RawPreferenceFields>,
}

/// Preference fields, shared by embedded and standalone records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPreferenceFields {
    pub time_of_day: Option<String>,
    #[serde(deserialize_with = "string_list")]
    pub preferred_days_off: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub preferred_subjects: Vec<String>,
    pub preferred_grades: Vec<String>,
    pub shift_preference: Option<String>,
}

/// A standalone preference record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPreference {
    pub staff_id: Option<RawId>,
    #[serde(flatten)]
    pub fields: RawPreferenceFields,
}

/// A work-unit (class) record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawWorkUnit {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub group: Option<String>,
    pub subject: Option<String>,
    pub grade: Option<String>,
    #[serde(deserialize_with = "string_list")]
    pub requirements: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub core_subjects: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub specialized_subjects: Vec<String>,
    pub hours_per_week: Option<f64>,
    pub day: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub shift: Option<String>,
    pub critical: Option<RawFlag>,
    pub staff_quota: Option<u32>,
}

/// The constraint record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConstraints {
    pub max_hours_per_week: Option<f64>,
    pub min_rest_hours: Option<f64>,
}

/// A catalog group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawGroup {
    pub group: Option<String>,
    pub core_subjects: Vec<RawSubject>,
    pub specialized_subjects: Vec<RawSubject>,
}

/// A catalog subject: a bare name, or a detailed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSubject {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        hours_per_week: Option<f64>,
        #[serde(default, deserialize_with = "string_list")]
        required_skills: Vec<String>,
    },
}

impl AllocationRequest {
    /// Parses a request from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Builds a request from a JSON value, reporting structural problems
    /// as [`AllocationError::InvalidInput`].
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut root) = value else {
            return Err(AllocationError::InvalidInput(format!(
                "request must be an object, got {}",
                kind_of(&value)
            )));
        };

        let staff = records(&mut root, &["staff", "teachers"], fold_staff)?;
        let work_units = records(&mut root, &["work_units", "classes"], fold_work_unit)?;
        let preferences = records(&mut root, &["preferences"], fold_preference)?;

        let constraints = match take(&mut root, &["constraints"]) {
            None => RawConstraints::default(),
            Some((key, v @ Value::Object(_))) => serde_json::from_value(v)
                .map_err(|e| AllocationError::InvalidInput(format!("`{key}`: {e}")))?,
            Some((key, other)) => {
                return Err(AllocationError::InvalidInput(format!(
                    "`{key}` must be an object, got {}",
                    kind_of(&other)
                )))
            }
        };

        let catalog = match take(&mut root, &["catalog", "strands"]) {
            None => None,
            Some((key, value)) => Some(list_of(key, value, fold_group)?),
        };

        Ok(Self {
            staff,
            work_units,
            constraints,
            preferences,
            catalog,
        })
    }
}

/// Removes the first present, non-null key.
fn take(root: &mut Map<String, Value>, keys: &[&'static str]) -> Option<(&'static str, Value)> {
    keys.iter().find_map(|key| match root.remove(*key) {
        Some(Value::Null) | None => None,
        Some(v) => Some((*key, v)),
    })
}

/// Canonical key and the legacy spellings folded onto it.
type KeyTable = &'static [(&'static str, &'static [&'static str])];

const STAFF_KEYS: KeyTable = &[
    ("id", &["teacher_id", "staff_id"]),
    ("name", &["full_name"]),
    ("skills", &["subjects_expertise"]),
    ("certifications", &["teaching_certifications"]),
    ("proficiency", &["proficiency_levels"]),
    ("years_experience", &["experience"]),
    ("max_hours_per_week", &["max_allowed_hours"]),
];

const PREFERENCE_KEYS: KeyTable = &[
    ("staff_id", &["teacher_id", "id"]),
    ("time_of_day", &["preferred_hours", "preferred_time"]),
    ("preferred_grades", &["preferred_grade_levels"]),
    ("shift_preference", &["shift"]),
];

const WORK_UNIT_KEYS: KeyTable = &[
    ("id", &["class_id"]),
    ("group", &["strand", "strand_name"]),
    ("grade", &["grade_level"]),
    ("requirements", &["required_skills", "skill_certification_requirements"]),
    ("day", &["class_day"]),
    ("start", &["class_time", "start_time"]),
    ("end", &["class_end_time", "end_time"]),
    ("critical", &["is_critical"]),
    ("staff_quota", &["teachers_needed"]),
];

const GROUP_KEYS: KeyTable = &[("group", &["strand", "name"])];

const SUBJECT_KEYS: KeyTable = &[("name", &["subject"])];

/// Moves the first non-null spelling of each key onto its canonical name
/// and drops the rest.
fn fold_keys(fields: &mut Map<String, Value>, table: KeyTable) {
    for (canonical, legacy) in table {
        let mut found = fields.remove(*canonical).filter(|v| !v.is_null());
        for key in *legacy {
            if let Some(v) = fields.remove(*key) {
                if found.is_none() && !v.is_null() {
                    found = Some(v);
                }
            }
        }
        if let Some(v) = found {
            fields.insert((*canonical).to_string(), v);
        }
    }
}

fn fold_staff(fields: &mut Map<String, Value>) {
    fold_keys(fields, STAFF_KEYS);
    if let Some(Value::Object(prefs)) = fields.get_mut("preferences") {
        fold_keys(prefs, PREFERENCE_KEYS);
    }
}

fn fold_preference(fields: &mut Map<String, Value>) {
    fold_keys(fields, PREFERENCE_KEYS);
}

fn fold_work_unit(fields: &mut Map<String, Value>) {
    fold_keys(fields, WORK_UNIT_KEYS);
}

fn fold_group(fields: &mut Map<String, Value>) {
    fold_keys(fields, GROUP_KEYS);
    for list in ["core_subjects", "specialized_subjects"] {
        if let Some(Value::Array(subjects)) = fields.get_mut(list) {
            for subject in subjects.iter_mut().filter_map(Value::as_object_mut) {
                fold_keys(subject, SUBJECT_KEYS);
            }
        }
    }
}

fn records<T: serde::de::DeserializeOwned>(
    root: &mut Map<String, Value>,
    keys: &[&'static str],
    fold: fn(&mut Map<String, Value>),
) -> Result<Vec<T>> {
    match take(root, keys) {
        None => Ok(Vec::new()),
        Some((key, value)) => list_of(key, value, fold),
    }
}

fn list_of<T: serde::de::DeserializeOwned>(
    key: &str,
    value: Value,
    fold: fn(&mut Map<String, Value>),
) -> Result<Vec<T>> {
    let Value::Array(items) = value else {
        return Err(AllocationError::InvalidInput(format!(
            "`{key}` must be a list, got {}",
            kind_of(&value)
        )));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, mut item)| {
            if !item.is_object() {
                return Err(AllocationError::InvalidInput(format!(
                    "`{key}`[{i}] must be an object, got {}",
                    kind_of(&item)
                )));
            }
            if let Some(fields) = item.as_object_mut() {
                fold(fields);
            }
            serde_json::from_value(item)
                .map_err(|e| AllocationError::InvalidInput(format!("`{key}`[{i}]: {e}")))
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Accepts a list of strings (nulls and blanks dropped), a comma-joined
/// string, or null.
fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<Option<String>>),
        Joined(String),
    }

    let items = match Option::<Raw>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Raw::Joined(s)) => s.split(',').map(str::to_string).collect(),
        Some(Raw::List(items)) => items.into_iter().flatten().collect(),
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_request() {
        let req = AllocationRequest::from_json("{}").unwrap();
        assert!(req.staff.is_empty());
        assert!(req.work_units.is_empty());
        assert!(req.catalog.is_none());
        assert_eq!(req.constraints, RawConstraints::default());
    }

    #[test]
    fn test_legacy_field_names() {
        let req = AllocationRequest::from_json(
            r#"{
                "teachers": [{
                    "teacher_id": 7,
                    "full_name": "Ana Cruz",
                    "subjects_expertise": "Mathematics, Physics",
                    "teaching_certifications": null,
                    "proficiency_levels": [],
                    "max_allowed_hours": null,
                    "on_leave": 0
                }],
                "classes": [{
                    "name": "STEM",
                    "core_subjects": ["General Mathematics"],
                    "specialized_subjects": ["Pre-Calculus"],
                    "hours_per_week": 10,
                    "class_day": "Monday",
                    "class_time": "09:00",
                    "class_end_time": "10:00",
                    "is_critical": 1
                }],
                "constraints": {"max_hours_per_week": 30}
            }"#,
        )
        .unwrap();

        let t = &req.staff[0];
        assert_eq!(t.id.as_ref().and_then(RawId::to_id).as_deref(), Some("7"));
        assert_eq!(t.name.as_deref(), Some("Ana Cruz"));
        assert_eq!(t.skills, vec!["Mathematics", "Physics"]);
        assert!(t.certifications.is_empty());
        assert_eq!(t.proficiency, RawProficiency::List(vec![]));
        assert_eq!(t.max_hours_per_week, None);
        assert!(!t.on_leave.unwrap().is_set());

        let c = &req.work_units[0];
        assert_eq!(c.name.as_deref(), Some("STEM"));
        assert_eq!(c.specialized_subjects, vec!["Pre-Calculus"]);
        assert_eq!(c.day.as_deref(), Some("Monday"));
        assert_eq!(c.start.as_deref(), Some("09:00"));
        assert!(c.critical.unwrap().is_set());
        assert_eq!(req.constraints.max_hours_per_week, Some(30.0));
        assert_eq!(req.constraints.min_rest_hours, None);
    }

    #[test]
    fn test_proficiency_map_forms() {
        let staff: RawStaff = serde_json::from_str(
            r#"{"id": "T1", "proficiency": {"Math": "Expert", "Physics": 2}}"#,
        )
        .unwrap();
        let RawProficiency::Map(map) = staff.proficiency else {
            panic!("expected map");
        };
        assert_eq!(map["Math"], RawLevel::Label("Expert".into()));
        assert_eq!(map["Physics"], RawLevel::Ordinal(2.0));
    }

    #[test]
    fn test_non_object_request_rejected() {
        let err = AllocationRequest::from_json("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, AllocationError::InvalidInput(_)));
    }

    #[test]
    fn test_non_list_staff_rejected() {
        let err = AllocationRequest::from_json(r#"{"staff": {"id": 1}}"#).unwrap_err();
        match err {
            AllocationError::InvalidInput(msg) => assert!(msg.contains("`staff` must be a list")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_object_element_rejected() {
        let err = AllocationRequest::from_json(r#"{"work_units": [{"id": 1}, "oops"]}"#).unwrap_err();
        match err {
            AllocationError::InvalidInput(msg) => assert!(msg.contains("`work_units`[1]")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_field_type_rejected() {
        let err =
            AllocationRequest::from_json(r#"{"staff": [{"id": 1, "years_experience": "ten"}]}"#)
                .unwrap_err();
        assert!(matches!(err, AllocationError::InvalidInput(_)));
    }

    #[test]
    fn test_constraints_must_be_object() {
        let err = AllocationRequest::from_json(r#"{"constraints": [40, 8]}"#).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidInput(_)));

        let ok = AllocationRequest::from_json(r#"{"constraints": null}"#).unwrap();
        assert_eq!(ok.constraints, RawConstraints::default());
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let err = AllocationRequest::from_json("{not json").unwrap_err();
        assert!(matches!(err, AllocationError::Json(_)));
    }

    #[test]
    fn test_catalog_subject_forms() {
        let req = AllocationRequest::from_json(
            r#"{"catalog": [{
                "group": "STEM",
                "core_subjects": ["Oral Communication"],
                "specialized_subjects": [{"name": "Pre-Calculus", "hours_per_week": 5,
                                          "required_skills": "Mathematics"}]
            }]}"#,
        )
        .unwrap();
        let groups = req.catalog.unwrap();
        assert_eq!(groups[0].group.as_deref(), Some("STEM"));
        assert_eq!(groups[0].core_subjects[0], RawSubject::Name("Oral Communication".into()));
        match &groups[0].specialized_subjects[0] {
            RawSubject::Detailed {
                name,
                hours_per_week,
                required_skills,
            } => {
                assert_eq!(name, "Pre-Calculus");
                assert_eq!(*hours_per_week, Some(5.0));
                assert_eq!(required_skills, &vec!["Mathematics".to_string()]);
            }
            other => panic!("unexpected subject: {other:?}"),
        }
    }

    #[test]
    fn test_standalone_preference() {
        let req = AllocationRequest::from_json(
            r#"{"preferences": [
                {"teacher_id": 3, "preferred_hours": "morning", "preferred_days_off": ["Friday"]}
            ]}"#,
        )
        .unwrap();
        let pref = &req.preferences[0];
        assert_eq!(pref.staff_id, Some(RawId::Number(3)));
        assert_eq!(pref.fields.time_of_day.as_deref(), Some("morning"));
        assert_eq!(pref.fields.preferred_days_off, vec!["Friday"]);
    }

    #[test]
    fn test_canonical_and_legacy_keys_together() {
        let req = AllocationRequest::from_json(
            r#"{"teachers": [{
                "id": 1,
                "teacher_id": 1,
                "name": "Ana",
                "full_name": "Ana",
                "subjects_expertise": ["Math"],
                "preferences": {"time_of_day": "morning", "preferred_time": "afternoon"}
            }],
            "classes": [{
                "id": "C1",
                "class_id": "C1",
                "strand": "STEM",
                "strand_name": "STEM",
                "required_skills": ["Math"],
                "skill_certification_requirements": null
            }]}"#,
        )
        .unwrap();

        let t = &req.staff[0];
        assert_eq!(t.id, Some(RawId::Number(1)));
        assert_eq!(t.name.as_deref(), Some("Ana"));
        assert_eq!(t.skills, vec!["Math"]);
        let prefs = t.preferences.as_ref().unwrap();
        assert_eq!(prefs.time_of_day.as_deref(), Some("morning"));

        let c = &req.work_units[0];
        assert_eq!(c.id, Some(RawId::Text("C1".into())));
        assert_eq!(c.group.as_deref(), Some("STEM"));
        assert_eq!(c.requirements, vec!["Math"]);
    }

    #[test]
    fn test_null_canonical_key_falls_back_to_legacy() {
        let req = AllocationRequest::from_json(
            r#"{"staff": [{"id": null, "teacher_id": 9, "name": null, "full_name": "Ben"}]}"#,
        )
        .unwrap();
        assert_eq!(req.staff[0].id, Some(RawId::Number(9)));
        assert_eq!(req.staff[0].name.as_deref(), Some("Ben"));
    }

    #[test]
    fn test_catalog_subject_legacy_key() {
        let req = AllocationRequest::from_json(
            r#"{"strands": [{"strand": "ABM", "name": "ABM",
                             "specialized_subjects": [{"subject": "Business Math"}]}]}"#,
        )
        .unwrap();
        let groups = req.catalog.unwrap();
        assert_eq!(groups[0].group.as_deref(), Some("ABM"));
        assert!(matches!(
            &groups[0].specialized_subjects[0],
            RawSubject::Detailed { name, .. } if name == "Business Math"
        ));
    }
}
