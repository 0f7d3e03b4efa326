use exam_duty::workflows::exams::report::{
    AllocationView, DutyRosterRow, DutyView, MatrixView, WorkloadEntry, WorkloadPolicy,
};
use exam_duty::workflows::exams::{ClassSubjectCatalog, ExamSlot, Teacher};

pub fn render_teachers(teachers: &[Teacher]) {
    if teachers.is_empty() {
        println!("No teachers on the roster");
        return;
    }

    for teacher in teachers {
        let mappings = teacher
            .mappings
            .iter()
            .map(|mapping| format!("{} {}", mapping.class, mapping.subject))
            .collect::<Vec<_>>()
            .join(", ");
        println!("- {} | {}", teacher.name, mappings);
    }
}

pub fn render_catalog(catalog: &ClassSubjectCatalog) {
    for (class, subjects) in catalog.iter() {
        println!("- {}: {}", class, subjects.join(", "));
    }
}

pub fn render_timetable(slots: &[ExamSlot]) {
    if slots.is_empty() {
        println!("No exams scheduled");
        return;
    }

    for slot in slots {
        println!(
            "- {} | {} | {} | {} ({})",
            slot.id,
            slot.date,
            slot.class,
            slot.subject,
            slot.slot.label()
        );
    }
}

pub fn render_allocation(view: &AllocationView) {
    println!(
        "{} {} on {} ({})",
        view.class,
        view.subject,
        view.date,
        view.slot.label()
    );
    render_duty(&view.revision);
    render_duty(&view.invigilation);
}

fn render_duty(duty: &DutyView) {
    let detail = match (&duty.confirmed, &duty.offered) {
        (Some(teacher), _) => teacher.clone(),
        (None, Some(teacher)) => {
            let tier = duty
                .tier
                .map(|tier| format!(", {}", tier.label()))
                .unwrap_or_default();
            format!(
                "{} ({} of {}{})",
                teacher,
                duty.position.unwrap_or_default(),
                duty.pool_size,
                tier
            )
        }
        (None, None) => format!("any rostered teacher ({} declined)", duty.pool_size),
    };

    println!(
        "- {} [periods {}] {}: {}",
        duty.role_label, duty.periods, duty.status_label, detail
    );
}

pub fn render_matrix(matrix: &MatrixView) {
    if matrix.rows.is_empty() {
        println!("No exams scheduled");
        return;
    }

    for row in &matrix.rows {
        println!("\n{}", row.date);
        for (class, cell) in matrix.classes.iter().zip(&row.cells) {
            if let Some(cell) = cell {
                println!("- {}: {}", class, cell);
            }
        }
    }
}

pub fn render_workload(entries: &[WorkloadEntry], policy: WorkloadPolicy) {
    println!("Workload ({})", policy.label());
    if entries.is_empty() {
        println!("- none");
        return;
    }

    for entry in entries {
        let note = if entry.on_roster { "" } else { " (left roster)" };
        println!(
            "- {}: {} (revision {}, invigilation {}){}",
            entry.teacher, entry.total, entry.revision, entry.invigilation, note
        );
    }
}

pub fn render_duty_roster(rows: &[DutyRosterRow]) {
    if rows.is_empty() {
        println!("No exams scheduled");
        return;
    }

    for row in rows {
        let periods = DutyRosterRow::PERIOD_HEADERS
            .iter()
            .zip(row.periods())
            .map(|(header, cell)| format!("{header} {cell}"))
            .collect::<Vec<_>>()
            .join(" | ");
        println!("- {} | {} | {}", row.date, row.class, periods);
    }
}
