use chrono::{Datelike, NaiveDate, Weekday};
use exam_duty::workflows::archive::{DocumentStore, JsonFileStore, PersistentOffice};
use exam_duty::workflows::exams::report::{write_duty_roster_csv, write_matrix_csv};
use exam_duty::workflows::exams::{
    ClassSubjectCatalog, DutyRole, ExamId, ExamType, OfferStatus, OfficeSettings, PeriodSlot,
    PreserveOrder, RandomShuffler, TeachingAssignment, WorkloadPolicy,
};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid exam start")
}

fn staff() -> Vec<(&'static str, Vec<TeachingAssignment>)> {
    vec![
        (
            "Lakshmi",
            vec![
                TeachingAssignment::new("Class 9", "Maths"),
                TeachingAssignment::new("Class 10", "Maths"),
            ],
        ),
        ("Imran", vec![TeachingAssignment::new("Class 9", "English")]),
        ("Divya", vec![TeachingAssignment::new("Class 10", "Telugu")]),
        ("Kiran", vec![TeachingAssignment::new("Class 8", "Hindi")]),
    ]
}

#[test]
fn standard_catalog_timetable_skips_sundays_and_shares_subject_index() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = JsonFileStore::new(dir.path().join("exam_data.json"));
    let mut session = PersistentOffice::open(store, OfficeSettings::default()).expect("open");

    let slots = session
        .apply(|office| {
            office
                .generate_timetable(monday(), ExamType::Terminal, &mut PreserveOrder)
                .map(|slots| slots.to_vec())
        })
        .expect("generate");

    assert!(slots.iter().all(|slot| slot.date.weekday() != Weekday::Sun));
    let catalog = ClassSubjectCatalog::standard();
    for slot in &slots {
        let subjects = catalog.subjects(&slot.class).expect("catalogued class");
        let day_index = slots
            .iter()
            .map(|other| other.date)
            .filter(|date| *date < slot.date)
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        assert_eq!(subjects[day_index], slot.subject);
    }
    assert_eq!(session.office().allocations().len(), slots.len());
}

#[test]
fn duty_walk_persists_across_restarts_and_exports() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("exam_data.json");
    let mut session =
        PersistentOffice::open(JsonFileStore::new(&path), OfficeSettings::default()).expect("open");

    for (name, mappings) in staff() {
        session
            .apply(|office| office.add_teacher(name, mappings).map(|_| ()))
            .expect("teacher added");
    }

    let mut shuffler = RandomShuffler::seeded(11);
    let maths = session
        .apply(|office| {
            office
                .schedule_exam(monday(), "Class 9", "Maths", PeriodSlot::Morning)
                .map(|slot| slot.id.clone())
        })
        .expect("scheduled");
    assert_eq!(maths, ExamId::compose(monday(), "Class 9", PeriodSlot::Morning));

    let view = session
        .apply(|office| office.allocation_view(&maths, &mut shuffler))
        .expect("opened");
    assert_eq!(view.revision.offered.as_deref(), Some("Lakshmi"));
    assert_eq!(view.invigilation.pool_size, 3, "Imran first, then Kiran and Divya");
    assert_eq!(view.invigilation.offered.as_deref(), Some("Imran"));

    session
        .apply(|office| office.accept_offer(&maths, DutyRole::Revision, &mut shuffler))
        .expect("revision confirmed");
    let after_reject = session
        .apply(|office| office.reject_offer(&maths, DutyRole::Invigilation, &mut shuffler))
        .expect("Imran declines");
    let backup = after_reject
        .invigilation
        .offered
        .clone()
        .expect("a neighbor is offered");
    assert!(["Kiran", "Divya"].contains(&backup.as_str()));

    drop(session);
    let mut reopened = PersistentOffice::open(JsonFileStore::new(&path), OfficeSettings::default())
        .expect("reopen");
    let view = reopened
        .apply(|office| office.accept_offer(&maths, DutyRole::Invigilation, &mut shuffler))
        .expect("backup confirmed");
    assert_eq!(view.invigilation.status, OfferStatus::Confirmed);
    assert_eq!(view.invigilation.confirmed.as_deref(), Some(backup.as_str()));

    let stats = reopened.office().workload_stats(WorkloadPolicy::InvigilationOnly);
    assert_eq!(stats[0].teacher, backup);
    assert_eq!(stats.iter().map(|entry| entry.total).sum::<usize>(), 1);

    let mut matrix = Vec::new();
    write_matrix_csv(&reopened.office().matrix_view(), &mut matrix).expect("matrix csv");
    assert_eq!(
        String::from_utf8(matrix).expect("utf8"),
        "Date,Class 9\n2025-03-03,Maths\n"
    );

    let mut roster = Vec::new();
    write_duty_roster_csv(&reopened.office().duty_roster(), &mut roster).expect("roster csv");
    let roster = String::from_utf8(roster).expect("utf8");
    assert!(roster.contains(&format!("Rev: Lakshmi,Inv: {backup},---,---")));

    let stored = JsonFileStore::new(&path).load().expect("load").expect("document");
    assert_eq!(stored.allocations.len(), 1);
    assert_eq!(stored.teachers.len(), 4);
}
