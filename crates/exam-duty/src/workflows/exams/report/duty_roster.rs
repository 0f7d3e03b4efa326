use super::super::allocation::Allocation;
use super::super::domain::{ClassRank, DutyRole, ExamId, ExamSlot, PeriodSlot};
use super::views::{DutyRosterRow, PENDING};
use std::collections::BTreeMap;

const EMPTY_PERIOD: &str = "---";

/// Printable duty sheet: one row per slot, ordered by date then class.
///
/// A morning exam fills the first two period columns and an afternoon exam the last two;
/// the other pair reads `---`.
pub fn build_duty_roster(
    timetable: &[ExamSlot],
    allocations: &BTreeMap<ExamId, Allocation>,
) -> Vec<DutyRosterRow> {
    let mut slots: Vec<&ExamSlot> = timetable.iter().collect();
    slots.sort_by_cached_key(|slot| (slot.date, ClassRank::parse(&slot.class), slot.slot));

    slots
        .into_iter()
        .map(|slot| {
            let allocation = allocations.get(&slot.id);
            let duty = |role: DutyRole, prefix: &str| {
                let teacher = allocation
                    .and_then(|allocation| allocation.duty(role).confirmed())
                    .unwrap_or(PENDING);
                format!("{prefix}: {teacher}")
            };
            let revision = duty(DutyRole::Revision, "Rev");
            let invigilation = duty(DutyRole::Invigilation, "Inv");

            let (morning, afternoon) = match slot.slot {
                PeriodSlot::Morning => (
                    (revision, invigilation),
                    (EMPTY_PERIOD.to_string(), EMPTY_PERIOD.to_string()),
                ),
                PeriodSlot::Afternoon => (
                    (EMPTY_PERIOD.to_string(), EMPTY_PERIOD.to_string()),
                    (revision, invigilation),
                ),
            };

            DutyRosterRow {
                exam_id: slot.id.clone(),
                date: slot.date,
                class: format!("{} ({})", slot.class, slot.subject),
                first_second: morning.0,
                third_fourth: morning.1,
                fifth_sixth: afternoon.0,
                seventh_eighth: afternoon.1,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::super::allocation::DutyOffer;
    use super::*;
    use chrono::NaiveDate;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date")
    }

    #[test]
    fn morning_and_afternoon_fill_their_own_periods() {
        let morning = ExamSlot::new(monday(), "Class 5", "Maths", PeriodSlot::Morning);
        let afternoon = ExamSlot::new(monday(), "Class 5", "EVS", PeriodSlot::Afternoon);
        let mut allocations = BTreeMap::new();
        allocations.insert(
            morning.id.clone(),
            Allocation::from_parts(
                DutyOffer::restore(Vec::new(), 0, Some("Asha".into())),
                DutyOffer::new(vec!["Bina".into()]),
                1,
            ),
        );

        let rows = build_duty_roster(&[afternoon, morning], &allocations);

        assert_eq!(rows[0].class, "Class 5 (Maths)");
        assert_eq!(
            rows[0].periods(),
            ["Rev: Asha", "Inv: Pending", "---", "---"]
        );
        assert_eq!(rows[1].class, "Class 5 (EVS)");
        assert_eq!(
            rows[1].periods(),
            ["---", "---", "Rev: Pending", "Inv: Pending"]
        );
    }
}
