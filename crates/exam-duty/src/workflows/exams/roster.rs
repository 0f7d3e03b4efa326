use super::catalog::ClassSubjectCatalog;
use super::domain::{NotFoundError, OfficeError, Teacher, TeachingAssignment, ValidationError};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterPolicy {
    /// Keep the permissive behavior where two teachers may share a name.
    pub allow_duplicate_names: bool,
}

/// Teacher profiles in entry order. Entry order is the revision offer order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterStore {
    teachers: Vec<Teacher>,
    policy: RosterPolicy,
}

impl RosterStore {
    pub fn new(policy: RosterPolicy) -> Self {
        Self {
            teachers: Vec::new(),
            policy,
        }
    }

    /// Rehydrates a roster as stored; no catalog checks are applied.
    pub fn from_teachers(teachers: Vec<Teacher>, policy: RosterPolicy) -> Self {
        Self { teachers, policy }
    }

    pub fn policy(&self) -> RosterPolicy {
        self.policy
    }

    pub fn add_teacher(
        &mut self,
        name: &str,
        mappings: Vec<TeachingAssignment>,
        catalog: &ClassSubjectCatalog,
    ) -> Result<&Teacher, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let mappings = validate_mappings(mappings, catalog)?;
        if !self.policy.allow_duplicate_names && self.contains(name) {
            return Err(ValidationError::DuplicateTeacher(name.to_string()));
        }

        info!(teacher = name, mappings = mappings.len(), "teacher added");
        self.teachers.push(Teacher::new(name, mappings));
        Ok(&self.teachers[self.teachers.len() - 1])
    }

    /// Removes the first teacher with `name`.
    pub fn remove_teacher(&mut self, name: &str) -> Result<Teacher, NotFoundError> {
        let position = self
            .teachers
            .iter()
            .position(|teacher| teacher.name == name)
            .ok_or_else(|| NotFoundError::Teacher(name.to_string()))?;

        info!(teacher = name, "teacher removed");
        Ok(self.teachers.remove(position))
    }

    /// Replaces the full mapping set of the first teacher with `name`.
    pub fn replace_mappings(
        &mut self,
        name: &str,
        mappings: Vec<TeachingAssignment>,
        catalog: &ClassSubjectCatalog,
    ) -> Result<&Teacher, OfficeError> {
        let mappings = validate_mappings(mappings, catalog)?;
        let teacher = self
            .teachers
            .iter_mut()
            .find(|teacher| teacher.name == name)
            .ok_or_else(|| NotFoundError::Teacher(name.to_string()))?;

        *teacher = Teacher::new(name, mappings);
        info!(teacher = name, mappings = teacher.mappings.len(), "teacher mappings replaced");
        Ok(&*teacher)
    }

    pub fn find(&self, name: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|teacher| teacher.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn teacher_names(&self) -> Vec<String> {
        self.teachers
            .iter()
            .map(|teacher| teacher.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.teachers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teachers.is_empty()
    }
}

fn validate_mappings(
    mappings: Vec<TeachingAssignment>,
    catalog: &ClassSubjectCatalog,
) -> Result<Vec<TeachingAssignment>, ValidationError> {
    if mappings.is_empty() {
        return Err(ValidationError::MissingMappings);
    }

    mappings
        .into_iter()
        .map(|mapping| {
            let class = mapping.class.trim();
            let subject = mapping.subject.trim();
            if subject.is_empty() {
                return Err(ValidationError::MissingSubject);
            }
            if !catalog.contains_class(class) {
                return Err(ValidationError::UnknownClass(class.to_string()));
            }
            if !catalog.offers(class, subject) {
                return Err(ValidationError::SubjectNotOffered {
                    class: class.to_string(),
                    subject: subject.to_string(),
                });
            }
            Ok(TeachingAssignment::new(class, subject))
        })
        .collect()
}
