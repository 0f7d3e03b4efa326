mod duty_roster;
mod export;
mod matrix;
pub mod views;
mod workload;

pub use duty_roster::build_duty_roster;
pub use export::{write_duty_roster_csv, write_matrix_csv, write_workload_csv, ExportError};
pub use matrix::build_matrix;
pub use views::{
    AllocationView, DutyRosterRow, DutyView, MatrixRow, MatrixView, WorkloadEntry, PENDING,
};
pub use workload::{tally_workload, WorkloadPolicy};
