use super::domain::{ClassRank, ValidationError};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const CORE_PRIMARY: [&str; 5] = ["EVS", "English", "Telugu", "EHV", "Maths"];

/// Subjects offered per class. Insertion order within a class is the exam sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassSubjectCatalog {
    classes: BTreeMap<String, Vec<String>>,
}

impl ClassSubjectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The school's standard class list, used when no document exists yet.
    pub fn standard() -> Self {
        let mut catalog = Self::new();

        for level in 1..=10 {
            let mut subjects: Vec<&str> = CORE_PRIMARY.to_vec();
            match level {
                1 | 2 => {}
                3 | 4 => subjects.push("Hindi"),
                5..=8 => subjects.extend(["Hindi", "Computer"]),
                _ => subjects.insert(0, "AI"),
            }
            catalog.insert_class(format!("Class {level}"), subjects);
        }

        for level in [11, 12] {
            catalog.insert_class(
                format!("Class {level} (MPC)"),
                ["English", "Telugu", "EHV", "Maths", "Physics", "Chemistry"],
            );
            catalog.insert_class(
                format!("Class {level} (BPC)"),
                ["English", "Telugu", "EHV", "Biology", "Physics", "Chemistry"],
            );
            catalog.insert_class(
                format!("Class {level} (CAE)"),
                [
                    "English",
                    "Telugu",
                    "EHV",
                    "Business Studies",
                    "Accounts",
                    "Economics",
                ],
            );
        }

        catalog
    }

    pub fn with_class<I, S>(mut self, class: impl Into<String>, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert_class(class, subjects);
        self
    }

    /// Replaces the subject list of `class`, keeping the first occurrence of repeats.
    pub fn insert_class<I, S>(&mut self, class: impl Into<String>, subjects: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for subject in subjects {
            let subject = subject.into();
            if !ordered.contains(&subject) {
                ordered.push(subject);
            }
        }
        self.classes.insert(class.into(), ordered);
    }

    pub fn subjects(&self, class: &str) -> Option<&[String]> {
        self.classes.get(class).map(Vec::as_slice)
    }

    pub fn contains_class(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    pub fn offers(&self, class: &str, subject: &str) -> bool {
        self.subjects(class)
            .is_some_and(|subjects| subjects.iter().any(|offered| offered == subject))
    }

    /// Class identifiers in ordinal rank order.
    pub fn ordered_classes(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        classes.sort_by_cached_key(|class| ClassRank::parse(class));
        classes
    }

    /// Classes one rank above and below `class`; empty when `class` is not catalogued.
    pub fn neighbors(&self, class: &str) -> Vec<&str> {
        let ordered = self.ordered_classes();
        let Some(position) = ordered.iter().position(|candidate| *candidate == class) else {
            return Vec::new();
        };

        let mut neighbors = Vec::with_capacity(2);
        if position > 0 {
            neighbors.push(ordered[position - 1]);
        }
        if let Some(next) = ordered.get(position + 1) {
            neighbors.push(*next);
        }
        neighbors
    }

    /// Appends `subject` to every listed class that lacks it and returns how many changed.
    ///
    /// All classes are checked before anything is modified.
    pub fn add_subject_to_classes(
        &mut self,
        subject: &str,
        classes: &[String],
    ) -> Result<usize, ValidationError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(ValidationError::MissingSubject);
        }
        if classes.is_empty() {
            return Err(ValidationError::MissingClasses);
        }
        if let Some(unknown) = classes.iter().find(|class| !self.contains_class(class)) {
            return Err(ValidationError::UnknownClass(unknown.clone()));
        }

        let mut modified = 0;
        for class in classes {
            if let Some(subjects) = self.classes.get_mut(class) {
                if !subjects.iter().any(|existing| existing == subject) {
                    subjects.push(subject.to_string());
                    modified += 1;
                }
            }
        }

        Ok(modified)
    }

    /// Sorted, de-duplicated union of every class's subjects.
    pub fn all_subjects(&self) -> Vec<String> {
        self.classes
            .values()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn max_subject_count(&self) -> usize {
        self.classes.values().map(Vec::len).max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.classes
            .iter()
            .map(|(class, subjects)| (class.as_str(), subjects.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_matches_school_structure() {
        let catalog = ClassSubjectCatalog::standard();
        assert_eq!(catalog.len(), 16);
        assert_eq!(
            catalog.subjects("Class 9").expect("class 9 present")[0],
            "AI"
        );
        assert_eq!(catalog.subjects("Class 5").expect("class 5").len(), 7);
        assert!(catalog.offers("Class 12 (CAE)", "Accounts"));
        assert_eq!(catalog.ordered_classes().first(), Some(&"Class 1"));
        assert_eq!(catalog.ordered_classes().last(), Some(&"Class 12 (MPC)"));
    }

    #[test]
    fn neighbors_respect_boundaries() {
        let catalog = ClassSubjectCatalog::new()
            .with_class("Class 1", ["Maths"])
            .with_class("Class 2", ["Maths"])
            .with_class("Class 10", ["Maths"]);

        assert_eq!(catalog.neighbors("Class 1"), vec!["Class 2"]);
        assert_eq!(catalog.neighbors("Class 2"), vec!["Class 1", "Class 10"]);
        assert_eq!(catalog.neighbors("Class 10"), vec!["Class 2"]);
        assert!(catalog.neighbors("Class 7").is_empty());
    }

    #[test]
    fn add_subject_is_idempotent_per_class() {
        let mut catalog = ClassSubjectCatalog::new()
            .with_class("Class 1", ["Maths"])
            .with_class("Class 2", ["Maths", "Art"]);
        let classes = vec!["Class 1".to_string(), "Class 2".to_string()];

        assert_eq!(catalog.add_subject_to_classes("Art", &classes), Ok(1));
        assert_eq!(catalog.add_subject_to_classes("Art", &classes), Ok(0));
        assert_eq!(
            catalog.subjects("Class 1").expect("class 1"),
            ["Maths".to_string(), "Art".to_string()]
        );
    }

    #[test]
    fn add_subject_rejects_incomplete_input_without_changes() {
        let mut catalog = ClassSubjectCatalog::new().with_class("Class 1", ["Maths"]);
        let before = catalog.clone();

        assert_eq!(
            catalog.add_subject_to_classes("  ", &["Class 1".to_string()]),
            Err(ValidationError::MissingSubject)
        );
        assert_eq!(
            catalog.add_subject_to_classes("Art", &[]),
            Err(ValidationError::MissingClasses)
        );
        assert_eq!(
            catalog.add_subject_to_classes("Art", &["Class 1".to_string(), "Class 9".to_string()]),
            Err(ValidationError::UnknownClass("Class 9".to_string()))
        );
        assert_eq!(catalog, before);
    }

    #[test]
    fn all_subjects_is_sorted_union() {
        let catalog = ClassSubjectCatalog::new()
            .with_class("Class 1", ["Maths", "English"])
            .with_class("Class 2", ["English", "Art"]);
        assert_eq!(catalog.all_subjects(), vec!["Art", "English", "Maths"]);
    }
}
