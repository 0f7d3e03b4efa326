use super::super::allocation::{Allocation, OfferStatus};
use super::super::domain::{DutyRole, ExamId, ExamSlot, PeriodSlot};
use super::super::eligibility::CandidateTier;
use chrono::NaiveDate;
use serde::Serialize;

pub const PENDING: &str = "Pending";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DutyView {
    pub role: DutyRole,
    pub role_label: &'static str,
    pub periods: &'static str,
    pub status: OfferStatus,
    pub status_label: &'static str,
    pub offered: Option<String>,
    /// 1-based position of the offered candidate in the pool.
    pub position: Option<usize>,
    pub pool_size: usize,
    pub confirmed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<CandidateTier>,
}

/// Operator-facing snapshot of both duties for one exam slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationView {
    pub exam_id: ExamId,
    pub date: NaiveDate,
    pub class: String,
    pub subject: String,
    pub slot: PeriodSlot,
    pub revision: DutyView,
    pub invigilation: DutyView,
}

impl AllocationView {
    pub fn build(slot: &ExamSlot, allocation: &Allocation) -> Self {
        let duty_view = |role: DutyRole, periods: &'static str| {
            let offer = allocation.duty(role);
            let status = offer.status();
            let offered = offer.offered().map(str::to_string);
            let position = offered.as_ref().map(|_| offer.pointer() + 1);
            let tier = match role {
                DutyRole::Invigilation => allocation.offered_tier(),
                DutyRole::Revision => None,
            };

            DutyView {
                role,
                role_label: role.label(),
                periods,
                status,
                status_label: status.label(),
                offered,
                position,
                pool_size: offer.pool().len(),
                confirmed: offer.confirmed().map(str::to_string),
                tier,
            }
        };

        Self {
            exam_id: slot.id.clone(),
            date: slot.date,
            class: slot.class.clone(),
            subject: slot.subject.clone(),
            slot: slot.slot,
            revision: duty_view(DutyRole::Revision, slot.revision_periods),
            invigilation: duty_view(DutyRole::Invigilation, slot.exam_periods),
        }
    }

    pub fn duty(&self, role: DutyRole) -> &DutyView {
        match role {
            DutyRole::Revision => &self.revision,
            DutyRole::Invigilation => &self.invigilation,
        }
    }
}

/// Date × class grid of the exam calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatrixView {
    /// Column headers in class rank order.
    pub classes: Vec<String>,
    pub rows: Vec<MatrixRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub date: NaiveDate,
    /// One cell per entry in `MatrixView::classes`; `None` when the class sits nothing.
    pub cells: Vec<Option<String>>,
}

impl MatrixView {
    pub fn cell(&self, date: NaiveDate, class: &str) -> Option<&str> {
        let column = self.classes.iter().position(|header| header == class)?;
        self.rows
            .iter()
            .find(|row| row.date == date)
            .and_then(|row| row.cells[column].as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkloadEntry {
    pub teacher: String,
    pub invigilation: usize,
    pub revision: usize,
    /// Duties counted under the active workload policy.
    pub total: usize,
    /// False for confirmed teachers who have since left the roster.
    pub on_roster: bool,
}

/// One line of the printable duty sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DutyRosterRow {
    pub exam_id: ExamId,
    pub date: NaiveDate,
    pub class: String,
    #[serde(rename = "1st-2nd")]
    pub first_second: String,
    #[serde(rename = "3rd-4th")]
    pub third_fourth: String,
    #[serde(rename = "5th-6th")]
    pub fifth_sixth: String,
    #[serde(rename = "7th-8th")]
    pub seventh_eighth: String,
}

impl DutyRosterRow {
    pub const PERIOD_HEADERS: [&'static str; 4] = ["1st-2nd", "3rd-4th", "5th-6th", "7th-8th"];

    pub fn periods(&self) -> [&str; 4] {
        [
            self.first_second.as_str(),
            self.third_fourth.as_str(),
            self.fifth_sixth.as_str(),
            self.seventh_eighth.as_str(),
        ]
    }
}
