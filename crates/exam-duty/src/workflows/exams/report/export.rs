use super::views::{DutyRosterRow, MatrixView, WorkloadEntry};
use std::io::Write;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("export write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes the date × class grid with a leading `Date` column; empty cells stay blank.
pub fn write_matrix_csv<W: Write>(matrix: &MatrixView, writer: W) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["Date"];
    header.extend(matrix.classes.iter().map(String::as_str));
    csv.write_record(&header)?;

    for row in &matrix.rows {
        let mut record = vec![row.date.format("%Y-%m-%d").to_string()];
        record.extend(row.cells.iter().map(|cell| cell.clone().unwrap_or_default()));
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_duty_roster_csv<W: Write>(
    rows: &[DutyRosterRow],
    writer: W,
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["Date", "Class"];
    header.extend(DutyRosterRow::PERIOD_HEADERS);
    csv.write_record(&header)?;

    for row in rows {
        let date = row.date.format("%Y-%m-%d").to_string();
        let mut record = vec![date.as_str(), row.class.as_str()];
        record.extend(row.periods());
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_workload_csv<W: Write>(
    entries: &[WorkloadEntry],
    writer: W,
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Teacher", "Invigilation", "Revision", "Total", "On roster"])?;
    for entry in entries {
        csv.write_record([
            entry.teacher.clone(),
            entry.invigilation.to_string(),
            entry.revision.to_string(),
            entry.total.to_string(),
            if entry.on_roster { "yes" } else { "no" }.to_string(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}
