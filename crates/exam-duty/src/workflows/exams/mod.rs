//! Exam calendar generation and the per-slot revision/invigilation duty walk.

pub mod allocation;
pub mod catalog;
pub mod domain;
pub mod eligibility;
mod office;
pub mod report;
pub mod roster;
pub mod shuffle;
mod timetable;

#[cfg(test)]
mod tests;

pub use allocation::{Allocation, DutyOffer, OfferStatus};
pub use catalog::ClassSubjectCatalog;
pub use domain::{
    ClassRank, DutyRole, ExamId, ExamSlot, ExamType, NotFoundError, OfficeError, PeriodSlot,
    Teacher, TeachingAssignment, TransitionError, ValidationError,
};
pub use eligibility::{CandidateTier, EligibilityResolver, InvigilationPool};
pub use office::{ExamOffice, OfficeSettings};
pub use report::{
    AllocationView, DutyRosterRow, DutyView, ExportError, MatrixRow, MatrixView, WorkloadEntry,
    WorkloadPolicy,
};
pub use roster::{RosterPolicy, RosterStore};
pub use shuffle::{PoolShuffler, PreserveOrder, RandomShuffler};
pub use timetable::TimetableGenerator;
