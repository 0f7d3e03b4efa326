use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::workflows::exams::{
    Allocation, ClassSubjectCatalog, DutyOffer, DutyRole, ExamId, ExamOffice, ExamSlot,
    OfficeSettings, PeriodSlot, RosterStore, Teacher, TeachingAssignment,
};

/// Placeholder written for a duty with no confirmed teacher.
pub const UNASSIGNED: &str = "Unassigned";

/// Serialized session state, the same shape for the data file and for backups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyDocument {
    #[serde(default)]
    pub teachers: Vec<TeacherRecord>,
    #[serde(default)]
    pub timetable: Vec<TimetableRecord>,
    #[serde(default)]
    pub allocations: BTreeMap<String, AllocationRecord>,
    /// Absent in very old backups; the standard catalog is assumed then.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_subjects: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherRecord {
    pub name: String,
    #[serde(default)]
    pub mappings: Vec<TeachingAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub date: NaiveDate,
    pub class: String,
    pub subject: String,
    pub slot: PeriodSlot,
    #[serde(default)]
    pub rev_p: Option<String>,
    #[serde(default)]
    pub exam_p: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRecord {
    #[serde(default = "unassigned")]
    pub rev_teacher: String,
    #[serde(default = "unassigned")]
    pub inv_teacher: String,
    /// Ranked invigilation pool, same-class tier first.
    #[serde(default)]
    pub backup_invs: Vec<String>,
    #[serde(default)]
    pub rev_pool: Vec<String>,
    #[serde(default)]
    pub rev_idx: usize,
    #[serde(default)]
    pub inv_idx: usize,
    /// Length of the same-class tier at the head of `backup_invs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inv_primary: Option<usize>,
}

fn unassigned() -> String {
    UNASSIGNED.to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("backup is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("teacher record {index} has no name")]
    MissingTeacherName { index: usize },
    #[error("timetable entry {index} has no {field}")]
    IncompleteExam { index: usize, field: &'static str },
}

impl DutyDocument {
    pub fn from_json(raw: &str) -> Result<Self, RestoreError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_office(office: &ExamOffice) -> Self {
        let teachers = office
            .roster()
            .teachers()
            .iter()
            .map(|teacher| TeacherRecord {
                name: teacher.name.clone(),
                mappings: teacher.mappings.clone(),
            })
            .collect();

        let timetable = office
            .timetable()
            .iter()
            .map(|slot| TimetableRecord {
                id: Some(slot.id.to_string()),
                date: slot.date,
                class: slot.class.clone(),
                subject: slot.subject.clone(),
                slot: slot.slot,
                rev_p: Some(slot.revision_periods.to_string()),
                exam_p: Some(slot.exam_periods.to_string()),
            })
            .collect();

        let allocations = office
            .allocations()
            .iter()
            .map(|(exam_id, allocation)| (exam_id.to_string(), allocation_record(allocation)))
            .collect();

        let class_subjects = office
            .catalog()
            .iter()
            .map(|(class, subjects)| (class.to_string(), subjects.to_vec()))
            .collect();

        Self {
            teachers,
            timetable,
            allocations,
            class_subjects: Some(class_subjects),
        }
    }

    /// Rebuilds an office, checking the document's shape first.
    ///
    /// Slot ids are recomputed from (date, class, slot); allocations stored under a legacy
    /// id follow their slot, and allocations with no slot are dropped.
    pub fn into_office(self, settings: OfficeSettings) -> Result<ExamOffice, RestoreError> {
        let mut teachers = Vec::with_capacity(self.teachers.len());
        for (index, record) in self.teachers.into_iter().enumerate() {
            let name = record.name.trim();
            if name.is_empty() {
                return Err(RestoreError::MissingTeacherName { index });
            }
            teachers.push(Teacher::new(name, record.mappings));
        }

        let catalog = match self.class_subjects {
            Some(classes) => {
                let mut catalog = ClassSubjectCatalog::new();
                for (class, subjects) in classes {
                    catalog.insert_class(class, subjects);
                }
                catalog
            }
            None => {
                warn!("backup has no class catalog; using the standard catalog");
                ClassSubjectCatalog::standard()
            }
        };

        let mut timetable: Vec<ExamSlot> = Vec::with_capacity(self.timetable.len());
        let mut legacy_ids: HashMap<String, ExamId> = HashMap::new();
        for (index, record) in self.timetable.into_iter().enumerate() {
            if record.class.trim().is_empty() {
                return Err(RestoreError::IncompleteExam {
                    index,
                    field: "class",
                });
            }
            if record.subject.trim().is_empty() {
                return Err(RestoreError::IncompleteExam {
                    index,
                    field: "subject",
                });
            }

            let slot = ExamSlot::new(
                record.date,
                record.class.trim(),
                record.subject.trim(),
                record.slot,
            );
            if let Some(legacy) = record.id.filter(|legacy| legacy != slot.id.as_str()) {
                legacy_ids.insert(legacy, slot.id.clone());
            }
            match timetable.iter().position(|existing| existing.id == slot.id) {
                Some(position) => {
                    warn!(exam_id = %slot.id, "duplicate timetable entry; keeping the later one");
                    timetable[position] = slot;
                }
                None => timetable.push(slot),
            }
        }

        let mut allocations: BTreeMap<ExamId, Allocation> = BTreeMap::new();
        for (key, record) in self.allocations {
            let (exam_id, current) = match legacy_ids.get(&key) {
                Some(exam_id) => (exam_id.clone(), false),
                None => (ExamId(key), true),
            };
            match allocations.entry(exam_id) {
                Entry::Vacant(entry) => {
                    entry.insert(record.into_allocation());
                }
                Entry::Occupied(mut entry) if current => {
                    warn!(
                        exam_id = %entry.key(),
                        "duplicate allocation; replacing the legacy record"
                    );
                    entry.insert(record.into_allocation());
                }
                Entry::Occupied(entry) => {
                    warn!(
                        exam_id = %entry.key(),
                        "duplicate allocation; ignoring the legacy record"
                    );
                }
            }
        }

        let roster = RosterStore::from_teachers(teachers, settings.roster);
        info!(
            teachers = roster.len(),
            slots = timetable.len(),
            allocations = allocations.len(),
            "document restored"
        );
        Ok(ExamOffice::from_parts(
            roster,
            catalog,
            timetable,
            allocations,
            settings.rest_day,
        ))
    }
}

impl AllocationRecord {
    fn into_allocation(self) -> Allocation {
        let primary = self.inv_primary.unwrap_or(self.backup_invs.len());
        let revision = DutyOffer::restore(self.rev_pool, self.rev_idx, confirmed(self.rev_teacher));
        let invigilation =
            DutyOffer::restore(self.backup_invs, self.inv_idx, confirmed(self.inv_teacher));
        Allocation::from_parts(revision, invigilation, primary)
    }
}

fn allocation_record(allocation: &Allocation) -> AllocationRecord {
    let revision = allocation.duty(DutyRole::Revision);
    let invigilation = allocation.duty(DutyRole::Invigilation);
    AllocationRecord {
        rev_teacher: revision.confirmed().unwrap_or(UNASSIGNED).to_string(),
        inv_teacher: invigilation.confirmed().unwrap_or(UNASSIGNED).to_string(),
        backup_invs: invigilation.pool().to_vec(),
        rev_pool: revision.pool().to_vec(),
        rev_idx: revision.pointer(),
        inv_idx: invigilation.pointer(),
        inv_primary: Some(allocation.primary_invigilators()),
    }
}

fn confirmed(teacher: String) -> Option<String> {
    let teacher = teacher.trim();
    if teacher.is_empty() || teacher == UNASSIGNED {
        None
    } else {
        Some(teacher.to_string())
    }
}
