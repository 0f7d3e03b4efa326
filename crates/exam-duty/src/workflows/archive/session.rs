use tracing::{info, warn};

use super::document::{DutyDocument, RestoreError};
use super::store::{DocumentStore, StoreError};
use crate::workflows::exams::{ExamOffice, OfficeError, OfficeSettings};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Office(#[from] OfficeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Restore(#[from] RestoreError),
}

/// Keeps the in-memory office and its stored document in lockstep.
///
/// Commands run against a draft copy; the draft replaces the live office only once it has
/// been saved, so a failed command or a failed save leaves both sides as they were.
#[derive(Debug)]
pub struct PersistentOffice<S> {
    office: ExamOffice,
    store: S,
    settings: OfficeSettings,
}

impl<S: DocumentStore> PersistentOffice<S> {
    /// Loads the stored document, or starts an empty office with the standard catalog.
    pub fn open(store: S, settings: OfficeSettings) -> Result<Self, SessionError> {
        let office = match store.load()? {
            Some(document) => document.into_office(settings)?,
            None => {
                info!("starting with an empty office");
                ExamOffice::new(settings)
            }
        };

        Ok(Self {
            office,
            store,
            settings,
        })
    }

    pub fn office(&self) -> &ExamOffice {
        &self.office
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> OfficeSettings {
        self.settings
    }

    pub fn apply<T>(
        &mut self,
        command: impl FnOnce(&mut ExamOffice) -> Result<T, OfficeError>,
    ) -> Result<T, SessionError> {
        let mut draft = self.office.clone();
        let output = command(&mut draft)?;
        self.commit(draft)?;
        Ok(output)
    }

    pub fn backup_json(&self) -> Result<String, SessionError> {
        DutyDocument::from_office(&self.office)
            .to_json()
            .map_err(|err| SessionError::Store(StoreError::Serialize(err)))
    }

    /// Replaces everything with the uploaded backup; nothing changes if it does not parse.
    pub fn restore_json(&mut self, raw: &str) -> Result<(), SessionError> {
        let restored = DutyDocument::from_json(raw)
            .and_then(|document| document.into_office(self.settings))
            .inspect_err(|err| warn!(error = %err, "backup rejected"))?;
        self.commit(restored)?;
        info!("backup restored");
        Ok(())
    }

    fn commit(&mut self, draft: ExamOffice) -> Result<(), StoreError> {
        self.store.save(&DutyDocument::from_office(&draft))?;
        self.office = draft;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::archive::store::MemoryStore;
    use crate::workflows::exams::{
        ClassSubjectCatalog, DutyRole, ExamType, PreserveOrder, TeachingAssignment,
        ValidationError,
    };
    use chrono::NaiveDate;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).expect("valid date")
    }

    fn session() -> PersistentOffice<MemoryStore> {
        PersistentOffice::open(MemoryStore::default(), OfficeSettings::default())
            .expect("empty store opens")
    }

    fn add_asha(office: &mut ExamOffice) -> Result<(), OfficeError> {
        office
            .add_teacher("Asha", vec![TeachingAssignment::new("Class 1", "Maths")])
            .map(|_| ())
    }

    #[test]
    fn empty_store_opens_with_standard_catalog() {
        let session = session();
        assert_eq!(session.office().catalog(), &ClassSubjectCatalog::standard());
        assert!(session.store().snapshot().is_none());
    }

    #[test]
    fn successful_commands_are_saved() {
        let mut session = session();
        session.apply(add_asha).expect("teacher added");

        let saved = session.store().snapshot().expect("document saved");
        assert_eq!(saved.teachers.len(), 1);
        assert_eq!(saved, DutyDocument::from_office(session.office()));
    }

    #[test]
    fn failed_commands_write_nothing() {
        let mut session = session();
        session.apply(add_asha).expect("teacher added");
        let before = session.store().snapshot();

        let result = session.apply(add_asha);

        assert!(matches!(
            result,
            Err(SessionError::Office(OfficeError::Validation(
                ValidationError::DuplicateTeacher(_)
            )))
        ));
        assert_eq!(session.store().snapshot(), before);
        assert_eq!(session.office().roster().len(), 1);
    }

    #[test]
    fn failed_saves_leave_memory_untouched() {
        let mut session = session();
        session.store().fail_saves(true);

        assert!(matches!(
            session.apply(add_asha),
            Err(SessionError::Store(_))
        ));
        assert!(session.office().roster().is_empty());
    }

    #[test]
    fn reopening_resumes_the_walk() {
        let mut session = session();
        session.apply(add_asha).expect("teacher added");
        let exam = session
            .apply(|office| {
                let slots =
                    office.generate_timetable(monday(), ExamType::Terminal, &mut PreserveOrder)?;
                let maths = slots
                    .iter()
                    .find(|slot| slot.class == "Class 1" && slot.subject == "Maths")
                    .expect("Class 1 sits Maths");
                Ok(maths.id.clone())
            })
            .expect("generated");
        session
            .apply(|office| office.accept_offer(&exam, DutyRole::Revision, &mut PreserveOrder))
            .expect("accepted");

        let document = session.store().snapshot().expect("saved");
        let reopened = PersistentOffice::open(
            MemoryStore::with_document(document),
            OfficeSettings::default(),
        )
        .expect("reopen");

        assert_eq!(reopened.office(), session.office());
        assert_eq!(
            reopened
                .office()
                .allocation(&exam)
                .and_then(|allocation| allocation.duty(DutyRole::Revision).confirmed()),
            Some("Asha")
        );
    }

    #[test]
    fn malformed_restore_keeps_existing_state() {
        let mut session = session();
        session.apply(add_asha).expect("teacher added");
        let backup = session.backup_json().expect("backup");

        assert!(matches!(
            session.restore_json("{ not json"),
            Err(SessionError::Restore(RestoreError::Malformed(_)))
        ));
        assert_eq!(session.office().roster().len(), 1);

        session
            .apply(|office| office.remove_teacher("Asha").map(|_| ()))
            .expect("removed");
        session.restore_json(&backup).expect("restore");
        assert!(session.office().roster().contains("Asha"));
        assert_eq!(
            session.store().snapshot().map(|document| document.teachers.len()),
            Some(1)
        );
    }
}
