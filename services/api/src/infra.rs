use chrono::NaiveDate;
use exam_duty::workflows::archive::{DocumentStore, PersistentOffice};
use exam_duty::workflows::exams::{RandomShuffler, WorkloadPolicy};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// The persisted office plus the shuffler used when pools are built.
pub(crate) struct Desk<S> {
    pub(crate) session: PersistentOffice<S>,
    pub(crate) shuffler: RandomShuffler,
}

/// Shared handle for the HTTP handlers; one request mutates the office at a time.
pub(crate) struct OfficeService<S> {
    desk: Mutex<Desk<S>>,
    workload_policy: WorkloadPolicy,
}

impl<S: DocumentStore> OfficeService<S> {
    pub(crate) fn new(
        session: PersistentOffice<S>,
        shuffler: RandomShuffler,
        workload_policy: WorkloadPolicy,
    ) -> Self {
        Self {
            desk: Mutex::new(Desk { session, shuffler }),
            workload_policy,
        }
    }

    /// A panicked request never leaves a half-applied office behind, so a poisoned lock is
    /// still safe to reuse.
    pub(crate) fn desk(&self) -> MutexGuard<'_, Desk<S>> {
        self.desk.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn workload_policy(&self) -> WorkloadPolicy {
        self.workload_policy
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}
