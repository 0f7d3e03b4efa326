use chrono::NaiveDate;

use crate::workflows::exams::catalog::ClassSubjectCatalog;
use crate::workflows::exams::domain::{ExamId, PeriodSlot, TeachingAssignment};
use crate::workflows::exams::office::{ExamOffice, OfficeSettings};

pub(super) fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date")
}

pub(super) fn catalog() -> ClassSubjectCatalog {
    ClassSubjectCatalog::new()
        .with_class("Class 1", ["Math", "Eng"])
        .with_class("Class 2", ["Math", "Science"])
        .with_class("Class 3", ["Science", "Art"])
}

pub(super) fn assignments(pairs: &[(&str, &str)]) -> Vec<TeachingAssignment> {
    pairs
        .iter()
        .map(|(class, subject)| TeachingAssignment::new(*class, *subject))
        .collect()
}

pub(super) fn office_with(teachers: &[(&str, &[(&str, &str)])]) -> ExamOffice {
    let mut office = ExamOffice::with_catalog(catalog(), OfficeSettings::default());
    for (name, pairs) in teachers {
        office
            .add_teacher(name, assignments(pairs))
            .expect("fixture teacher is valid");
    }
    office
}

pub(super) fn exam_id(class: &str, slot: PeriodSlot) -> ExamId {
    ExamId::compose(monday(), class, slot)
}
