use super::catalog::ClassSubjectCatalog;
use super::roster::RosterStore;
use super::shuffle::PoolShuffler;
use serde::Serialize;

/// Which eligibility rule admitted an invigilation candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateTier {
    /// Teaches the exam class, but not the exam subject.
    SameClass,
    /// Teaches an adjacent class only, and not the exam subject.
    NeighborClass,
}

impl CandidateTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SameClass => "Same class",
            Self::NeighborClass => "Neighbor class",
        }
    }
}

/// Ranked invigilation pool: every primary candidate is offered before any backup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvigilationPool {
    pub primary: Vec<String>,
    pub backup: Vec<String>,
}

impl InvigilationPool {
    pub fn len(&self) -> usize {
        self.primary.len() + self.backup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.backup.is_empty()
    }

    pub fn ranked(self) -> Vec<String> {
        let mut ranked = self.primary;
        ranked.extend(self.backup);
        ranked
    }
}

/// Computes candidate lists for an exam from the roster and catalog.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityResolver<'a> {
    roster: &'a RosterStore,
    catalog: &'a ClassSubjectCatalog,
}

impl<'a> EligibilityResolver<'a> {
    pub fn new(roster: &'a RosterStore, catalog: &'a ClassSubjectCatalog) -> Self {
        Self { roster, catalog }
    }

    /// Teachers mapped to exactly (`class`, `subject`), in roster order.
    pub fn revision_candidates(&self, class: &str, subject: &str) -> Vec<String> {
        self.roster
            .teachers()
            .iter()
            .filter(|teacher| teacher.teaches(class, subject))
            .map(|teacher| teacher.name.clone())
            .collect()
    }

    /// Teachers with no stake in `subject`, same-class tier first, each tier shuffled.
    ///
    /// Anyone who teaches `subject` in any class is excluded from both tiers.
    pub fn invigilation_candidates(
        &self,
        class: &str,
        subject: &str,
        shuffler: &mut dyn PoolShuffler,
    ) -> InvigilationPool {
        let neighbors = self.catalog.neighbors(class);
        let mut pool = InvigilationPool::default();

        for teacher in self.roster.teachers() {
            if teacher.teaches_subject(subject) {
                continue;
            }

            if teacher.teaches_class(class) {
                pool.primary.push(teacher.name.clone());
            } else if neighbors
                .iter()
                .any(|neighbor| teacher.teaches_class(neighbor))
            {
                pool.backup.push(teacher.name.clone());
            }
        }

        shuffler.shuffle(&mut pool.primary);
        shuffler.shuffle(&mut pool.backup);
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::super::domain::TeachingAssignment;
    use super::super::roster::RosterPolicy;
    use super::super::shuffle::PreserveOrder;
    use super::*;

    fn catalog() -> ClassSubjectCatalog {
        ClassSubjectCatalog::new()
            .with_class("Class 1", ["Maths", "English"])
            .with_class("Class 2", ["Maths", "Science", "English"])
            .with_class("Class 3", ["Science", "Art"])
    }

    fn roster(entries: &[(&str, &[(&str, &str)])]) -> RosterStore {
        let catalog = catalog();
        let mut roster = RosterStore::new(RosterPolicy::default());
        for (name, mappings) in entries {
            let mappings = mappings
                .iter()
                .map(|(class, subject)| TeachingAssignment::new(*class, *subject))
                .collect();
            roster
                .add_teacher(name, mappings, &catalog)
                .expect("fixture teacher is valid");
        }
        roster
    }

    #[test]
    fn revision_pool_is_exact_class_subject_match_in_roster_order() {
        let roster = roster(&[
            ("Bina", &[("Class 1", "Maths")]),
            ("Chen", &[("Class 2", "Maths")]),
            ("Anil", &[("Class 1", "Maths"), ("Class 1", "English")]),
        ]);
        let catalog = catalog();
        let resolver = EligibilityResolver::new(&roster, &catalog);

        assert_eq!(
            resolver.revision_candidates("Class 1", "Maths"),
            vec!["Bina", "Anil"]
        );
        assert!(resolver.revision_candidates("Class 3", "Art").is_empty());
    }

    #[test]
    fn invigilation_pool_ranks_same_class_before_neighbors() {
        let roster = roster(&[
            ("Neighbor", &[("Class 2", "Science")]),
            ("SameClass", &[("Class 1", "English")]),
            ("FarAway", &[("Class 3", "Art")]),
            ("MathsElsewhere", &[("Class 2", "Maths")]),
        ]);
        let catalog = catalog();
        let resolver = EligibilityResolver::new(&roster, &catalog);

        let pool = resolver.invigilation_candidates("Class 1", "Maths", &mut PreserveOrder);
        assert_eq!(pool.primary, vec!["SameClass"]);
        assert_eq!(pool.backup, vec!["Neighbor"]);
        assert_eq!(pool.ranked(), vec!["SameClass", "Neighbor"]);
    }

    #[test]
    fn subject_teachers_never_invigilate_their_subject() {
        let roster = roster(&[
            ("Asha", &[("Class 1", "Maths")]),
            ("Bina", &[("Class 1", "English"), ("Class 2", "Maths")]),
        ]);
        let catalog = catalog();
        let resolver = EligibilityResolver::new(&roster, &catalog);

        let pool = resolver.invigilation_candidates("Class 1", "Maths", &mut PreserveOrder);
        assert!(pool.is_empty(), "both teachers teach Maths somewhere");
    }

    #[test]
    fn middle_class_draws_backups_from_both_sides() {
        let roster = roster(&[
            ("Lower", &[("Class 1", "English")]),
            ("Upper", &[("Class 3", "Art")]),
        ]);
        let catalog = catalog();
        let resolver = EligibilityResolver::new(&roster, &catalog);

        let pool = resolver.invigilation_candidates("Class 2", "Science", &mut PreserveOrder);
        assert!(pool.primary.is_empty());
        assert_eq!(pool.backup, vec!["Lower", "Upper"]);
    }
}
