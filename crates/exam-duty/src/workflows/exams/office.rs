use super::allocation::Allocation;
use super::catalog::ClassSubjectCatalog;
use super::domain::{
    DutyRole, ExamId, ExamSlot, ExamType, NotFoundError, OfficeError, PeriodSlot, Teacher,
    TeachingAssignment, ValidationError,
};
use super::eligibility::EligibilityResolver;
use super::report::{
    build_duty_roster, build_matrix, tally_workload, AllocationView, DutyRosterRow, MatrixView,
    WorkloadEntry, WorkloadPolicy,
};
use super::roster::{RosterPolicy, RosterStore};
use super::shuffle::PoolShuffler;
use super::timetable::TimetableGenerator;
use chrono::{NaiveDate, Weekday};
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfficeSettings {
    pub rest_day: Weekday,
    pub roster: RosterPolicy,
}

impl Default for OfficeSettings {
    fn default() -> Self {
        Self {
            rest_day: Weekday::Sun,
            roster: RosterPolicy::default(),
        }
    }
}

/// Complete session state: roster, catalog, exam calendar and duty allocations.
///
/// Every command validates before it mutates, so a failed command leaves the office
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamOffice {
    roster: RosterStore,
    catalog: ClassSubjectCatalog,
    timetable: Vec<ExamSlot>,
    allocations: BTreeMap<ExamId, Allocation>,
    generator: TimetableGenerator,
}

impl ExamOffice {
    pub fn new(settings: OfficeSettings) -> Self {
        Self::with_catalog(ClassSubjectCatalog::standard(), settings)
    }

    pub fn with_catalog(catalog: ClassSubjectCatalog, settings: OfficeSettings) -> Self {
        Self {
            roster: RosterStore::new(settings.roster),
            catalog,
            timetable: Vec::new(),
            allocations: BTreeMap::new(),
            generator: TimetableGenerator::new(settings.rest_day),
        }
    }

    /// Reassembles persisted state. Allocations without a matching slot are dropped.
    pub fn from_parts(
        roster: RosterStore,
        catalog: ClassSubjectCatalog,
        timetable: Vec<ExamSlot>,
        mut allocations: BTreeMap<ExamId, Allocation>,
        rest_day: Weekday,
    ) -> Self {
        allocations.retain(|exam_id, _| {
            let known = timetable.iter().any(|slot| &slot.id == exam_id);
            if !known {
                warn!(%exam_id, "dropping allocation for unknown exam");
            }
            known
        });

        Self {
            roster,
            catalog,
            timetable,
            allocations,
            generator: TimetableGenerator::new(rest_day),
        }
    }

    pub fn settings(&self) -> OfficeSettings {
        OfficeSettings {
            rest_day: self.generator.rest_day(),
            roster: self.roster.policy(),
        }
    }

    pub fn roster(&self) -> &RosterStore {
        &self.roster
    }

    pub fn catalog(&self) -> &ClassSubjectCatalog {
        &self.catalog
    }

    pub fn timetable(&self) -> &[ExamSlot] {
        &self.timetable
    }

    pub fn allocations(&self) -> &BTreeMap<ExamId, Allocation> {
        &self.allocations
    }

    pub fn exam(&self, exam_id: &ExamId) -> Option<&ExamSlot> {
        self.timetable.iter().find(|slot| &slot.id == exam_id)
    }

    pub fn allocation(&self, exam_id: &ExamId) -> Option<&Allocation> {
        self.allocations.get(exam_id)
    }

    pub fn add_teacher(
        &mut self,
        name: &str,
        mappings: Vec<TeachingAssignment>,
    ) -> Result<&Teacher, OfficeError> {
        Ok(self.roster.add_teacher(name, mappings, &self.catalog)?)
    }

    pub fn remove_teacher(&mut self, name: &str) -> Result<Teacher, OfficeError> {
        Ok(self.roster.remove_teacher(name)?)
    }

    pub fn replace_mappings(
        &mut self,
        name: &str,
        mappings: Vec<TeachingAssignment>,
    ) -> Result<&Teacher, OfficeError> {
        self.roster.replace_mappings(name, mappings, &self.catalog)
    }

    pub fn add_subject_to_classes(
        &mut self,
        subject: &str,
        classes: &[String],
    ) -> Result<usize, OfficeError> {
        let modified = self.catalog.add_subject_to_classes(subject, classes)?;
        info!(subject = subject.trim(), modified, "subject added to classes");
        Ok(modified)
    }

    pub fn all_subjects(&self) -> Vec<String> {
        self.catalog.all_subjects()
    }

    /// Rebuilds the whole calendar from the catalog and opens every allocation.
    ///
    /// Existing slots and allocations are discarded; nothing is merged. When the calendar
    /// cannot be laid out the office is left as it was.
    pub fn generate_timetable(
        &mut self,
        start: NaiveDate,
        exam_type: ExamType,
        shuffler: &mut dyn PoolShuffler,
    ) -> Result<&[ExamSlot], OfficeError> {
        let timetable = self
            .generator
            .generate(&self.catalog, start, exam_type)
            .inspect_err(|err| warn!(%start, error = %err, "timetable not generated"))?;

        let resolver = EligibilityResolver::new(&self.roster, &self.catalog);
        let mut allocations = BTreeMap::new();
        for slot in &timetable {
            allocations.insert(slot.id.clone(), Allocation::create(slot, &resolver, shuffler));
        }
        self.timetable = timetable;
        self.allocations = allocations;

        info!(
            %start,
            exam_type = exam_type.label(),
            slots = self.timetable.len(),
            "timetable regenerated"
        );
        Ok(self.timetable.as_slice())
    }

    /// Adds or updates a single slot by its composite key.
    ///
    /// Changing the subject of an existing slot deletes its allocation so eligibility is
    /// recomputed on next access.
    pub fn schedule_exam(
        &mut self,
        date: NaiveDate,
        class: &str,
        subject: &str,
        slot: PeriodSlot,
    ) -> Result<&ExamSlot, OfficeError> {
        let class = class.trim();
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(ValidationError::MissingSubject.into());
        }
        if !self.catalog.contains_class(class) {
            return Err(ValidationError::UnknownClass(class.to_string()).into());
        }
        if !self.catalog.offers(class, subject) {
            return Err(ValidationError::SubjectNotOffered {
                class: class.to_string(),
                subject: subject.to_string(),
            }
            .into());
        }

        let exam = ExamSlot::new(date, class, subject, slot);
        let position = match self.timetable.iter().position(|slot| slot.id == exam.id) {
            Some(position) => {
                if self.timetable[position].subject != exam.subject {
                    info!(exam_id = %exam.id, subject, "exam subject changed; allocation reset");
                    self.allocations.remove(&exam.id);
                    self.timetable[position] = exam;
                }
                position
            }
            None => {
                info!(exam_id = %exam.id, subject, "exam scheduled");
                self.timetable.push(exam);
                self.timetable.len() - 1
            }
        };

        Ok(&self.timetable[position])
    }

    pub fn clear_timetable(&mut self) {
        info!(
            slots = self.timetable.len(),
            allocations = self.allocations.len(),
            "timetable cleared"
        );
        self.timetable.clear();
        self.allocations.clear();
    }

    /// Returns the slot's allocation, building its candidate pools on first access.
    pub fn open_allocation(
        &mut self,
        exam_id: &ExamId,
        shuffler: &mut dyn PoolShuffler,
    ) -> Result<&mut Allocation, OfficeError> {
        let slot = self
            .timetable
            .iter()
            .find(|slot| &slot.id == exam_id)
            .ok_or_else(|| NotFoundError::Exam(exam_id.clone()))?;

        if !self.allocations.contains_key(exam_id) {
            let resolver = EligibilityResolver::new(&self.roster, &self.catalog);
            let allocation = Allocation::create(slot, &resolver, shuffler);
            info!(
                %exam_id,
                revision_pool = allocation.duty(DutyRole::Revision).pool().len(),
                invigilation_pool = allocation.duty(DutyRole::Invigilation).pool().len(),
                "allocation opened"
            );
            self.allocations.insert(exam_id.clone(), allocation);
        }

        self.allocations
            .get_mut(exam_id)
            .ok_or_else(|| NotFoundError::Exam(exam_id.clone()).into())
    }

    pub fn allocation_view(
        &mut self,
        exam_id: &ExamId,
        shuffler: &mut dyn PoolShuffler,
    ) -> Result<AllocationView, OfficeError> {
        self.open_allocation(exam_id, shuffler)?;
        self.view_of(exam_id)
    }

    pub fn accept_offer(
        &mut self,
        exam_id: &ExamId,
        role: DutyRole,
        shuffler: &mut dyn PoolShuffler,
    ) -> Result<AllocationView, OfficeError> {
        let allocation = self.open_allocation(exam_id, shuffler)?;
        let teacher = allocation.duty_mut(role).accept(role)?;
        info!(%exam_id, role = role.label(), teacher, "offer accepted");
        self.view_of(exam_id)
    }

    pub fn reject_offer(
        &mut self,
        exam_id: &ExamId,
        role: DutyRole,
        shuffler: &mut dyn PoolShuffler,
    ) -> Result<AllocationView, OfficeError> {
        let allocation = self.open_allocation(exam_id, shuffler)?;
        let status = allocation.duty_mut(role).reject(role)?;
        info!(%exam_id, role = role.label(), status = status.label(), "offer rejected");
        self.view_of(exam_id)
    }

    /// Confirms any rostered teacher once the pool is exhausted.
    pub fn assign_manually(
        &mut self,
        exam_id: &ExamId,
        role: DutyRole,
        teacher: &str,
        shuffler: &mut dyn PoolShuffler,
    ) -> Result<AllocationView, OfficeError> {
        let teacher = teacher.trim();
        if !self.roster.contains(teacher) {
            return Err(ValidationError::UnknownTeacher(teacher.to_string()).into());
        }

        let allocation = self.open_allocation(exam_id, shuffler)?;
        allocation.duty_mut(role).assign_manually(role, teacher)?;
        warn!(%exam_id, role = role.label(), teacher, "duty assigned manually");
        self.view_of(exam_id)
    }

    pub fn unassign(
        &mut self,
        exam_id: &ExamId,
        role: DutyRole,
        shuffler: &mut dyn PoolShuffler,
    ) -> Result<AllocationView, OfficeError> {
        let allocation = self.open_allocation(exam_id, shuffler)?;
        allocation.duty_mut(role).unassign(role)?;
        info!(%exam_id, role = role.label(), "duty unassigned");
        self.view_of(exam_id)
    }

    pub fn matrix_view(&self) -> MatrixView {
        build_matrix(&self.timetable)
    }

    pub fn workload_stats(&self, policy: WorkloadPolicy) -> Vec<WorkloadEntry> {
        tally_workload(&self.roster, self.allocations.values(), policy)
    }

    pub fn duty_roster(&self) -> Vec<DutyRosterRow> {
        build_duty_roster(&self.timetable, &self.allocations)
    }

    fn view_of(&self, exam_id: &ExamId) -> Result<AllocationView, OfficeError> {
        let slot = self
            .exam(exam_id)
            .ok_or_else(|| NotFoundError::Exam(exam_id.clone()))?;
        let allocation = self
            .allocation(exam_id)
            .ok_or_else(|| NotFoundError::Exam(exam_id.clone()))?;
        Ok(AllocationView::build(slot, allocation))
    }
}
