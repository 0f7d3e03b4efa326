use super::super::domain::{ClassRank, ExamSlot, PeriodSlot};
use super::views::{MatrixRow, MatrixView};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// Groups slots by date then class; multiple slots for the same class and day are joined in
/// period order.
///
/// Cells carry the slot code (`Subject (M)`) unless every exam sits in the morning, as in a
/// terminal calendar, where the bare subject is enough.
pub fn build_matrix(timetable: &[ExamSlot]) -> MatrixView {
    let mut classes: Vec<String> = timetable
        .iter()
        .map(|slot| slot.class.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    classes.sort_by_cached_key(|class| ClassRank::parse(class));
    let marked = timetable.iter().any(|slot| slot.slot != PeriodSlot::Morning);

    let mut grid: BTreeMap<NaiveDate, BTreeMap<&str, Vec<(PeriodSlot, &str)>>> = BTreeMap::new();
    for slot in timetable {
        grid.entry(slot.date)
            .or_default()
            .entry(slot.class.as_str())
            .or_default()
            .push((slot.slot, slot.subject.as_str()));
    }

    let rows = grid
        .into_iter()
        .map(|(date, by_class)| {
            let cells = classes
                .iter()
                .map(|class| by_class.get(class.as_str()).map(|entries| cell_text(entries, marked)))
                .collect();
            MatrixRow { date, cells }
        })
        .collect();

    MatrixView { classes, rows }
}

fn cell_text(entries: &[(PeriodSlot, &str)], marked: bool) -> String {
    let mut entries = entries.to_vec();
    entries.sort_by_key(|(slot, _)| *slot);
    entries
        .iter()
        .map(|(slot, subject)| {
            if marked {
                format!("{subject} ({})", slot.code())
            } else {
                subject.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" / ")
}
