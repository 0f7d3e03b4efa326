use super::domain::{DutyRole, ExamSlot, TransitionError};
use super::eligibility::{CandidateTier, EligibilityResolver};
use super::shuffle::PoolShuffler;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    CandidateOffered,
    PoolExhausted,
    Confirmed,
}

impl OfferStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CandidateOffered => "Candidate offered",
            Self::PoolExhausted => "Choose manually",
            Self::Confirmed => "Confirmed",
        }
    }
}

/// Walk through a fixed candidate pool for one duty.
///
/// The pool is frozen at creation; `pointer` only moves forward on reject and returns to
/// zero on unassign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DutyOffer {
    pool: Vec<String>,
    pointer: usize,
    confirmed: Option<String>,
}

impl DutyOffer {
    pub fn new(pool: Vec<String>) -> Self {
        Self {
            pool,
            pointer: 0,
            confirmed: None,
        }
    }

    /// Rebuilds persisted state, clamping a pointer that runs past the pool.
    pub fn restore(pool: Vec<String>, pointer: usize, confirmed: Option<String>) -> Self {
        let pointer = pointer.min(pool.len());
        Self {
            pool,
            pointer,
            confirmed,
        }
    }

    pub fn status(&self) -> OfferStatus {
        if self.confirmed.is_some() {
            OfferStatus::Confirmed
        } else if self.pointer < self.pool.len() {
            OfferStatus::CandidateOffered
        } else {
            OfferStatus::PoolExhausted
        }
    }

    pub fn offered(&self) -> Option<&str> {
        match self.status() {
            OfferStatus::CandidateOffered => Some(self.pool[self.pointer].as_str()),
            _ => None,
        }
    }

    pub fn confirmed(&self) -> Option<&str> {
        self.confirmed.as_deref()
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn accept(&mut self, role: DutyRole) -> Result<&str, TransitionError> {
        if self.confirmed.is_some() {
            return Err(TransitionError::AlreadyConfirmed { role });
        }
        let candidate = self
            .offered()
            .ok_or(TransitionError::NothingOffered { role })?
            .to_string();

        Ok(self.confirmed.insert(candidate).as_str())
    }

    pub fn reject(&mut self, role: DutyRole) -> Result<OfferStatus, TransitionError> {
        match self.status() {
            OfferStatus::Confirmed => Err(TransitionError::AlreadyConfirmed { role }),
            OfferStatus::PoolExhausted => Err(TransitionError::NothingOffered { role }),
            OfferStatus::CandidateOffered => {
                self.pointer += 1;
                Ok(self.status())
            }
        }
    }

    /// Confirms any teacher once the pool has nothing left to offer.
    ///
    /// This bypasses eligibility entirely, including the subject conflict rule.
    pub fn assign_manually(
        &mut self,
        role: DutyRole,
        teacher: &str,
    ) -> Result<(), TransitionError> {
        match self.status() {
            OfferStatus::Confirmed => Err(TransitionError::AlreadyConfirmed { role }),
            OfferStatus::CandidateOffered => Err(TransitionError::CandidatePending { role }),
            OfferStatus::PoolExhausted => {
                self.confirmed = Some(teacher.to_string());
                Ok(())
            }
        }
    }

    pub fn unassign(&mut self, role: DutyRole) -> Result<OfferStatus, TransitionError> {
        if self.confirmed.take().is_none() {
            return Err(TransitionError::NotConfirmed { role });
        }
        self.pointer = 0;
        Ok(self.status())
    }
}

/// Both duty walks for one exam slot, keyed by the slot's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    revision: DutyOffer,
    invigilation: DutyOffer,
    primary_invigilators: usize,
}

impl Allocation {
    pub fn create(
        slot: &ExamSlot,
        resolver: &EligibilityResolver<'_>,
        shuffler: &mut dyn PoolShuffler,
    ) -> Self {
        let revision = resolver.revision_candidates(&slot.class, &slot.subject);
        let invigilation = resolver.invigilation_candidates(&slot.class, &slot.subject, shuffler);
        let primary_invigilators = invigilation.primary.len();

        Self {
            revision: DutyOffer::new(revision),
            invigilation: DutyOffer::new(invigilation.ranked()),
            primary_invigilators,
        }
    }

    pub fn from_parts(
        revision: DutyOffer,
        invigilation: DutyOffer,
        primary_invigilators: usize,
    ) -> Self {
        let primary_invigilators = primary_invigilators.min(invigilation.pool().len());
        Self {
            revision,
            invigilation,
            primary_invigilators,
        }
    }

    pub fn duty(&self, role: DutyRole) -> &DutyOffer {
        match role {
            DutyRole::Revision => &self.revision,
            DutyRole::Invigilation => &self.invigilation,
        }
    }

    pub fn duty_mut(&mut self, role: DutyRole) -> &mut DutyOffer {
        match role {
            DutyRole::Revision => &mut self.revision,
            DutyRole::Invigilation => &mut self.invigilation,
        }
    }

    pub fn primary_invigilators(&self) -> usize {
        self.primary_invigilators
    }

    /// Tier of the invigilator currently on offer, if any.
    pub fn offered_tier(&self) -> Option<CandidateTier> {
        self.invigilation.offered()?;
        if self.invigilation.pointer() < self.primary_invigilators {
            Some(CandidateTier::SameClass)
        } else {
            Some(CandidateTier::NeighborClass)
        }
    }
}
