use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One (class, subject) pair a teacher is qualified to teach.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeachingAssignment {
    pub class: String,
    pub subject: String,
}

impl TeachingAssignment {
    pub fn new(class: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            subject: subject.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Teacher {
    pub name: String,
    pub mappings: Vec<TeachingAssignment>,
}

impl Teacher {
    /// Builds a teacher, dropping repeated (class, subject) pairs while keeping the first.
    pub fn new(name: impl Into<String>, mappings: Vec<TeachingAssignment>) -> Self {
        let mut unique: Vec<TeachingAssignment> = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            if !unique.contains(&mapping) {
                unique.push(mapping);
            }
        }

        Self {
            name: name.into(),
            mappings: unique,
        }
    }

    pub fn teaches(&self, class: &str, subject: &str) -> bool {
        self.mappings
            .iter()
            .any(|mapping| mapping.class == class && mapping.subject == subject)
    }

    pub fn teaches_class(&self, class: &str) -> bool {
        self.mappings.iter().any(|mapping| mapping.class == class)
    }

    pub fn teaches_subject(&self, subject: &str) -> bool {
        self.mappings.iter().any(|mapping| mapping.subject == subject)
    }
}

/// Sort key for class identifiers: numeric level first, then track suffix.
///
/// `"Class 9" < "Class 10" < "Class 11 (BPC)" < "Class 11 (MPC)"`; identifiers without a
/// numeric level sort after every numbered class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRank {
    level: Option<u32>,
    track: Option<String>,
    name: String,
}

impl ClassRank {
    pub fn parse(class_id: &str) -> Self {
        let name = class_id.trim().to_string();
        let digits_start = name.find(|ch: char| ch.is_ascii_digit());

        let (level, track) = match digits_start {
            Some(start) => {
                let rest = &name[start..];
                let digits_len = rest
                    .find(|ch: char| !ch.is_ascii_digit())
                    .unwrap_or(rest.len());
                let level = rest[..digits_len].parse::<u32>().ok();
                let suffix = rest[digits_len..]
                    .trim()
                    .trim_start_matches('(')
                    .trim_end_matches(')')
                    .trim();
                let track = (!suffix.is_empty()).then(|| suffix.to_string());
                (level, track)
            }
            None => (None, None),
        };

        Self { level, track, name }
    }

    pub fn level(&self) -> Option<u32> {
        self.level
    }

    pub fn track(&self) -> Option<&str> {
        self.track.as_deref()
    }
}

impl Ord for ClassRank {
    fn cmp(&self, other: &Self) -> Ordering {
        let level = match (self.level, other.level) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };

        level
            .then_with(|| self.track.cmp(&other.track))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for ClassRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PeriodSlot {
    Morning,
    Afternoon,
}

impl PeriodSlot {
    pub const fn ordered() -> [Self; 2] {
        [Self::Morning, Self::Afternoon]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Morning => "M",
            Self::Afternoon => "A",
        }
    }

    pub const fn revision_periods(self) -> &'static str {
        match self {
            Self::Morning => "1st-2nd",
            Self::Afternoon => "5th-6th",
        }
    }

    pub const fn exam_periods(self) -> &'static str {
        match self {
            Self::Morning => "3rd-4th",
            Self::Afternoon => "7th-8th",
        }
    }

    /// Lenient match used at load boundaries, e.g. `"Morning (Exam: 3rd-4th)"`.
    pub fn from_label(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_ascii_lowercase();
        if lowered.starts_with("morning") || lowered == "m" {
            Some(Self::Morning)
        } else if lowered.starts_with("afternoon") || lowered == "a" {
            Some(Self::Afternoon)
        } else {
            None
        }
    }
}

impl fmt::Display for PeriodSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PeriodSlot {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_label(value).ok_or_else(|| format!("unknown period slot '{value}'"))
    }
}

impl<'de> Deserialize<'de> for PeriodSlot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamType {
    UnitTest,
    Terminal,
}

impl ExamType {
    pub const fn slots_per_day(self) -> usize {
        match self {
            Self::UnitTest => 2,
            Self::Terminal => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::UnitTest => "Unit Test",
            Self::Terminal => "Terminal",
        }
    }
}

impl FromStr for ExamType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "unit_test" | "unit" => Ok(Self::UnitTest),
            "terminal" => Ok(Self::Terminal),
            other => Err(format!("unknown exam type '{other}'")),
        }
    }
}

/// Composite key `"{date}_{class}_{slot}"`; regenerating with the same inputs reproduces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExamId(pub String);

impl ExamId {
    pub fn compose(date: NaiveDate, class: &str, slot: PeriodSlot) -> Self {
        Self(format!("{}_{}_{}", date.format("%Y-%m-%d"), class, slot.label()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamSlot {
    pub id: ExamId,
    pub date: NaiveDate,
    pub class: String,
    pub subject: String,
    pub slot: PeriodSlot,
    pub revision_periods: &'static str,
    pub exam_periods: &'static str,
}

impl ExamSlot {
    pub fn new(
        date: NaiveDate,
        class: impl Into<String>,
        subject: impl Into<String>,
        slot: PeriodSlot,
    ) -> Self {
        let class = class.into();
        Self {
            id: ExamId::compose(date, &class, slot),
            date,
            class,
            subject: subject.into(),
            slot,
            revision_periods: slot.revision_periods(),
            exam_periods: slot.exam_periods(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyRole {
    Revision,
    Invigilation,
}

impl DutyRole {
    pub const fn ordered() -> [Self; 2] {
        [Self::Revision, Self::Invigilation]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Revision => "Revision",
            Self::Invigilation => "Invigilation",
        }
    }
}

impl fmt::Display for DutyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DutyRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "revision" | "rev" => Ok(Self::Revision),
            "invigilation" | "inv" | "exam" => Ok(Self::Invigilation),
            other => Err(format!("unknown duty role '{other}'")),
        }
    }
}

/// Incomplete or inconsistent operator input; nothing was changed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("teacher name is required")]
    MissingName,
    #[error("select at least one class and subject for the teacher")]
    MissingMappings,
    #[error("a teacher named '{0}' already exists")]
    DuplicateTeacher(String),
    #[error("subject name is required")]
    MissingSubject,
    #[error("select at least one class")]
    MissingClasses,
    #[error("class '{0}' is not in the subject catalog")]
    UnknownClass(String),
    #[error("'{subject}' is not offered for {class}")]
    SubjectNotOffered { class: String, subject: String },
    #[error("teacher '{0}' is not on the roster")]
    UnknownTeacher(String),
    #[error("exam days starting {start} run past the last supported date")]
    DateOutOfRange { start: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    #[error("teacher '{0}' not found")]
    Teacher(String),
    #[error("exam '{0}' not found")]
    Exam(ExamId),
}

/// Operator action that the allocation state machine does not allow in its current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("{role} duty is already confirmed")]
    AlreadyConfirmed { role: DutyRole },
    #[error("{role} duty has no confirmed teacher")]
    NotConfirmed { role: DutyRole },
    #[error("no {role} candidate is on offer; choose a teacher manually")]
    NothingOffered { role: DutyRole },
    #[error("a {role} candidate is still on offer; accept or reject it first")]
    CandidatePending { role: DutyRole },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OfficeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}
