use super::catalog::ClassSubjectCatalog;
use super::domain::{ExamSlot, ExamType, PeriodSlot, ValidationError};
use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

/// Lays every class's subjects onto consecutive teaching days.
///
/// One subject index is shared by all classes, so on any given day every class sits the
/// same ordinal subject. Classes with shorter lists simply stop contributing slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimetableGenerator {
    rest_day: Weekday,
}

impl Default for TimetableGenerator {
    fn default() -> Self {
        Self::new(Weekday::Sun)
    }
}

impl TimetableGenerator {
    pub fn new(rest_day: Weekday) -> Self {
        Self { rest_day }
    }

    pub fn rest_day(&self) -> Weekday {
        self.rest_day
    }

    /// Fails when the exam days would run past the last date chrono can represent.
    pub fn generate(
        &self,
        catalog: &ClassSubjectCatalog,
        start: NaiveDate,
        exam_type: ExamType,
    ) -> Result<Vec<ExamSlot>, ValidationError> {
        let classes = catalog.ordered_classes();
        let total = catalog.max_subject_count();
        let step = exam_type.slots_per_day();
        let next_day =
            |date: NaiveDate| date.succ_opt().ok_or(ValidationError::DateOutOfRange { start });

        let mut slots = Vec::new();
        let mut subject_index = 0;
        let mut date = start;

        while subject_index < total {
            if date.weekday() == self.rest_day {
                date = next_day(date)?;
                continue;
            }

            for class in &classes {
                let subjects = catalog.subjects(class).unwrap_or_default();
                for (offset, slot) in PeriodSlot::ordered().into_iter().take(step).enumerate() {
                    if let Some(subject) = subjects.get(subject_index + offset) {
                        slots.push(ExamSlot::new(date, *class, subject.as_str(), slot));
                    }
                }
            }

            debug!(%date, subject_index, "exam day laid out");
            subject_index += step;
            if subject_index < total {
                date = next_day(date)?;
            }
        }

        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date")
    }

    #[test]
    fn unit_test_fills_both_slots_and_stops_when_lists_run_out() {
        let catalog = ClassSubjectCatalog::new()
            .with_class("Class 1", ["Math", "Eng"])
            .with_class("Class 2", ["Math"]);

        let slots = TimetableGenerator::default()
            .generate(&catalog, monday(), ExamType::UnitTest)
            .expect("dates in range");

        let summary: Vec<(&str, &str, PeriodSlot)> = slots
            .iter()
            .map(|slot| (slot.class.as_str(), slot.subject.as_str(), slot.slot))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Class 1", "Math", PeriodSlot::Morning),
                ("Class 1", "Eng", PeriodSlot::Afternoon),
                ("Class 2", "Math", PeriodSlot::Morning),
            ]
        );
        assert!(slots.iter().all(|slot| slot.date == monday()));
    }

    #[test]
    fn terminal_uses_one_morning_slot_per_day() {
        let catalog = ClassSubjectCatalog::new().with_class("Class 1", ["Math", "Eng", "EVS"]);

        let slots = TimetableGenerator::default()
            .generate(&catalog, monday(), ExamType::Terminal)
            .expect("dates in range");

        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(|slot| slot.slot == PeriodSlot::Morning));
        assert_eq!(slots[2].date, monday() + Duration::days(2));
        assert_eq!(slots[2].subject, "EVS");
    }

    #[test]
    fn rest_day_is_skipped_without_consuming_subjects() {
        let catalog = ClassSubjectCatalog::new().with_class("Class 1", ["A", "B", "C"]);
        let saturday = NaiveDate::from_ymd_opt(2025, 3, 8).expect("valid date");

        let slots = TimetableGenerator::new(Weekday::Sun)
            .generate(&catalog, saturday, ExamType::Terminal)
            .expect("dates in range");

        let dates: Vec<NaiveDate> = slots.iter().map(|slot| slot.date).collect();
        assert_eq!(
            dates,
            vec![
                saturday,
                saturday + Duration::days(2),
                saturday + Duration::days(3)
            ]
        );
        assert_eq!(slots[1].subject, "B");
    }

    #[test]
    fn start_on_rest_day_moves_to_next_teaching_day() {
        let catalog = ClassSubjectCatalog::new().with_class("Class 1", ["A"]);
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 9).expect("valid date");

        let slots = TimetableGenerator::default()
            .generate(&catalog, sunday, ExamType::Terminal)
            .expect("dates in range");
        assert_eq!(slots[0].date.weekday(), Weekday::Mon);
    }

    #[test]
    fn empty_catalog_yields_no_slots() {
        let slots = TimetableGenerator::default().generate(
            &ClassSubjectCatalog::new(),
            monday(),
            ExamType::UnitTest,
        );
        assert_eq!(slots, Ok(Vec::new()));
    }

    #[test]
    fn generation_is_deterministic() {
        let catalog = ClassSubjectCatalog::standard();
        let generator = TimetableGenerator::default();
        let first = generator
            .generate(&catalog, monday(), ExamType::UnitTest)
            .expect("dates in range");
        let second = generator
            .generate(&catalog, monday(), ExamType::UnitTest)
            .expect("dates in range");
        assert_eq!(first, second);
    }

    #[test]
    fn last_representable_day_still_fits_a_single_exam() {
        let catalog = ClassSubjectCatalog::new().with_class("Class 1", ["A"]);
        let generator = TimetableGenerator::new(NaiveDate::MAX.weekday().succ());

        let slots = generator
            .generate(&catalog, NaiveDate::MAX, ExamType::Terminal)
            .expect("one day is enough");
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].date, NaiveDate::MAX);
    }

    #[test]
    fn running_past_the_calendar_is_rejected() {
        let catalog = ClassSubjectCatalog::new().with_class("Class 1", ["A", "B"]);
        let generator = TimetableGenerator::new(NaiveDate::MAX.weekday().succ());

        assert_eq!(
            generator.generate(&catalog, NaiveDate::MAX, ExamType::Terminal),
            Err(ValidationError::DateOutOfRange {
                start: NaiveDate::MAX
            })
        );
    }
}
