//! Curriculum catalog.
//!
//! Maps each group (strand) to its core and specialized subjects. Core
//! subjects are shared across groups; specialized subjects identify a
//! group. Every subject carries a fixed weekly hour load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::normalize_key;

/// Hours per subject when a catalog entry does not say.
pub const DEFAULT_SUBJECT_HOURS: u32 = 4;

/// A subject within a group's curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Display name.
    pub name: String,
    /// Weekly hours charged to the staff member who claims it.
    pub hours_per_week: u32,
    /// Normalized skill keys a staff member must hold, all of them.
    pub required_skills: BTreeSet<String>,
}

impl Subject {
    /// Creates a subject whose only required skill is its own name.
    pub fn new(name: impl Into<String>, hours_per_week: u32) -> Self {
        let name = name.into();
        let required_skills = [normalize_key(&name)].into();
        Self {
            name,
            hours_per_week,
            required_skills,
        }
    }

    /// Replaces the required skills.
    pub fn with_required_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.required_skills = skills
            .into_iter()
            .map(|s| normalize_key(s.as_ref()))
            .collect();
        self
    }
}

/// Subject kind within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Specialized,
    Core,
}

/// One group's curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCurriculum {
    /// Group name.
    pub group: String,
    /// Subjects shared with other groups.
    pub core: Vec<Subject>,
    /// Subjects unique to this group.
    pub specialized: Vec<Subject>,
}

impl GroupCurriculum {
    /// Creates an empty curriculum for a group.
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            core: Vec::new(),
            specialized: Vec::new(),
        }
    }

    /// Adds a core subject.
    pub fn with_core(mut self, subject: Subject) -> Self {
        self.core.push(subject);
        self
    }

    /// Adds a specialized subject.
    pub fn with_specialized(mut self, subject: Subject) -> Self {
        self.specialized.push(subject);
        self
    }

    /// Subjects in claim order: specialized first, then core.
    pub fn subjects_in_claim_order(&self) -> impl Iterator<Item = (SubjectKind, &Subject)> {
        self.specialized
            .iter()
            .map(|s| (SubjectKind::Specialized, s))
            .chain(self.core.iter().map(|s| (SubjectKind::Core, s)))
    }

    /// Total number of subjects.
    pub fn subject_count(&self) -> usize {
        self.core.len() + self.specialized.len()
    }
}

/// Group → curriculum mapping, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumCatalog {
    /// Group curricula.
    pub groups: Vec<GroupCurriculum>,
}

const CORE_SUBJECTS: [&str; 10] = [
    "Oral Communication",
    "Komunikasyon at Pananaliksik",
    "General Mathematics",
    "Earth and Life Science",
    "PE and Health",
    "Personal Development",
    "Understanding Culture, Society, and Politics",
    "Contemporary Philippine Arts",
    "Media and Information Literacy",
    "Entrepreneurship",
];

const SPECIALIZED: [(&str, &[&str]); 5] = [
    (
        "STEM",
        &[
            "Pre-Calculus",
            "Basic Calculus",
            "General Biology 1",
            "General Biology 2",
            "General Chemistry 1",
            "General Chemistry 2",
            "General Physics 1",
            "General Physics 2",
            "Research/Capstone Project",
        ],
    ),
    (
        "ABM",
        &[
            "Business Mathematics",
            "Fundamentals of ABM 1",
            "Fundamentals of ABM 2",
            "Business Finance",
            "Organization and Management",
            "Principles of Marketing",
            "Work Immersion/Research",
        ],
    ),
    (
        "GAS",
        &[
            "Humanities 1",
            "Humanities 2",
            "Social Science 1",
            "Social Science 2",
            "Applied Economics",
            "Research in Daily Life",
            "Work Immersion",
        ],
    ),
    (
        "HUMSS",
        &[
            "Creative Writing",
            "Disciplines and Ideas in Social Sciences",
            "Philippine Politics and Governance",
            "Community Engagement",
            "Trends in Social Sciences",
            "Research in Social Sciences",
        ],
    ),
    (
        "ICT",
        &[
            "Computer Systems Servicing (NC II)",
            "Programming",
            "Web Development",
            "Animation",
            "Work Immersion (ICT Industry)",
        ],
    ),
];

impl CurriculumCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a group curriculum.
    pub fn with_group(mut self, curriculum: GroupCurriculum) -> Self {
        self.groups.push(curriculum);
        self
    }

    /// Senior-high strands (STEM, ABM, GAS, HUMSS, ICT), shared core
    /// subjects, `hours_per_subject` hours each.
    pub fn senior_high(hours_per_subject: u32) -> Self {
        let groups = SPECIALIZED
            .iter()
            .map(|(group, specialized)| GroupCurriculum {
                group: (*group).to_string(),
                core: CORE_SUBJECTS
                    .iter()
                    .map(|s| Subject::new(*s, hours_per_subject))
                    .collect(),
                specialized: specialized
                    .iter()
                    .map(|s| Subject::new(*s, hours_per_subject))
                    .collect(),
            })
            .collect();
        Self { groups }
    }

    /// Finds a group's curriculum by normalized name.
    pub fn group(&self, name: &str) -> Option<&GroupCurriculum> {
        let key = normalize_key(name);
        self.groups.iter().find(|g| normalize_key(&g.group) == key)
    }

    /// Whether `subject` is one of `group`'s specialized subjects.
    pub fn is_specialized(&self, group: &str, subject: &str) -> bool {
        let key = normalize_key(subject);
        self.group(group)
            .is_some_and(|g| g.specialized.iter().any(|s| normalize_key(&s.name) == key))
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total subjects across all groups.
    pub fn subject_count(&self) -> usize {
        self.groups.iter().map(GroupCurriculum::subject_count).sum()
    }

    /// Every required skill key across the catalog.
    pub fn all_required_skills(&self) -> BTreeSet<String> {
        self.groups
            .iter()
            .flat_map(|g| g.subjects_in_claim_order())
            .flat_map(|(_, s)| s.required_skills.iter().cloned())
            .collect()
    }
}
