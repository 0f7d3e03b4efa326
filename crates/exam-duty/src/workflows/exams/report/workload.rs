use super::super::allocation::Allocation;
use super::super::domain::DutyRole;
use super::super::roster::RosterStore;
use super::views::WorkloadEntry;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which confirmed duties count towards a teacher's workload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadPolicy {
    #[default]
    #[serde(alias = "invigilation")]
    InvigilationOnly,
    AllDuties,
}

impl WorkloadPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InvigilationOnly => "Invigilation only",
            Self::AllDuties => "Revision and invigilation",
        }
    }
}

impl FromStr for WorkloadPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "invigilation" | "invigilation_only" => Ok(Self::InvigilationOnly),
            "all" | "all_duties" => Ok(Self::AllDuties),
            other => Err(format!("unknown workload policy '{other}'")),
        }
    }
}

/// Counts confirmed duties per teacher, busiest first.
///
/// Roster order breaks ties. Confirmed teachers no longer on the roster are appended so
/// the invigilation column always sums to the number of confirmed invigilations.
pub fn tally_workload<'a>(
    roster: &RosterStore,
    allocations: impl IntoIterator<Item = &'a Allocation>,
    policy: WorkloadPolicy,
) -> Vec<WorkloadEntry> {
    let mut entries: Vec<WorkloadEntry> = Vec::with_capacity(roster.len());
    for name in roster.teacher_names() {
        if !entries.iter().any(|entry| entry.teacher == name) {
            entries.push(blank_entry(name, true));
        }
    }

    for allocation in allocations {
        for role in DutyRole::ordered() {
            let Some(teacher) = allocation.duty(role).confirmed() else {
                continue;
            };
            let position = match entries.iter().position(|entry| entry.teacher == teacher) {
                Some(position) => position,
                None => {
                    entries.push(blank_entry(teacher.to_string(), false));
                    entries.len() - 1
                }
            };
            let entry = &mut entries[position];
            match role {
                DutyRole::Invigilation => entry.invigilation += 1,
                DutyRole::Revision => entry.revision += 1,
            }
        }
    }

    for entry in &mut entries {
        entry.total = match policy {
            WorkloadPolicy::InvigilationOnly => entry.invigilation,
            WorkloadPolicy::AllDuties => entry.invigilation + entry.revision,
        };
    }
    entries.sort_by(|a, b| b.total.cmp(&a.total));
    entries
}

fn blank_entry(teacher: String, on_roster: bool) -> WorkloadEntry {
    WorkloadEntry {
        teacher,
        invigilation: 0,
        revision: 0,
        total: 0,
        on_roster,
    }
}
