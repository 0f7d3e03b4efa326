use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const EXAM: &str = "2025-03-03_Class 9_Morning";

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("temp dir"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_exam-duty"))
            .current_dir(self.dir.path())
            .arg("--data")
            .arg(self.path("exam_data.json"))
            .args(["--seed", "7"])
            .args(args)
            .env_remove("EXAM_WORKLOAD_POLICY")
            .env_remove("EXAM_ALLOW_DUPLICATE_NAMES")
            .env_remove("EXAM_REST_DAY")
            .env("RUST_LOG", "warn")
            .output()
            .expect("binary runs")
    }

    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).expect("utf-8 output")
    }

    fn json(&self, args: &[&str]) -> Value {
        let mut with_flag = args.to_vec();
        with_flag.push("--json");
        serde_json::from_str(&self.ok(&with_flag)).expect("json output")
    }
}

fn seed_staff(workspace: &Workspace) {
    workspace.ok(&[
        "teacher", "add", "Lakshmi", "--map", "Class 9:Maths", "--map", "Class 10:Maths",
    ]);
    workspace.ok(&["teacher", "add", "Imran", "--map", "Class 9:English"]);
    workspace.ok(&["teacher", "add", "Divya", "--map", "Class 10:Telugu"]);
    workspace.ok(&[
        "schedule", "add", "--date", "2025-03-03", "--class", "Class 9", "--subject", "Maths",
        "--slot", "morning",
    ]);
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("file written")
}

#[test]
fn duties_are_offered_accepted_and_reported_across_invocations() {
    let workspace = Workspace::new();
    seed_staff(&workspace);

    let view = workspace.json(&["allocate", "show", EXAM]);
    assert_eq!(view["revision"]["offered"], "Lakshmi");
    assert_eq!(view["invigilation"]["offered"], "Imran");
    assert_eq!(view["invigilation"]["tier"], "same_class");

    workspace.ok(&["allocate", "accept", EXAM, "rev"]);
    let view = workspace.json(&["allocate", "accept", EXAM, "inv"]);
    assert_eq!(view["revision"]["confirmed"], "Lakshmi");
    assert_eq!(view["invigilation"]["confirmed"], "Imran");
    assert_eq!(view["invigilation"]["status"], "confirmed");

    let workload = workspace.json(&["report", "workload"]);
    assert_eq!(workload[0]["teacher"], "Imran");
    assert_eq!(workload[0]["total"], 1);
    assert_eq!(workload[1]["total"], 0);

    let sheet = workspace.path("duties.csv");
    workspace.ok(&["export", "duties", "--out", sheet.to_str().expect("utf-8 path")]);
    let csv = read(&sheet);
    assert!(csv.starts_with("Date,Class,1st-2nd,3rd-4th,5th-6th,7th-8th"));
    assert!(csv.contains("2025-03-03,Class 9 (Maths),Rev: Lakshmi,Inv: Imran,---,---"));
}

#[test]
fn manual_assignment_waits_for_an_exhausted_pool() {
    let workspace = Workspace::new();
    seed_staff(&workspace);

    let refused = workspace.run(&["allocate", "assign", EXAM, "revision", "Divya"]);
    assert!(!refused.status.success());

    workspace.ok(&["allocate", "reject", EXAM, "revision"]);
    let view = workspace.json(&["allocate", "assign", EXAM, "revision", "Divya"]);
    assert_eq!(view["revision"]["confirmed"], "Divya");

    let view = workspace.json(&["allocate", "unassign", EXAM, "revision"]);
    assert_eq!(view["revision"]["offered"], "Lakshmi");
}

#[test]
fn backup_restores_a_removed_teacher() {
    let workspace = Workspace::new();
    seed_staff(&workspace);

    let backup = workspace.path("backup.json");
    workspace.ok(&["backup", "--out", backup.to_str().expect("utf-8 path")]);
    assert!(read(&backup).contains("\"Lakshmi\""));

    workspace.ok(&["teacher", "remove", "Imran"]);
    assert_eq!(
        workspace.json(&["teacher", "list"]).as_array().map(Vec::len),
        Some(2)
    );

    workspace.ok(&["restore", backup.to_str().expect("utf-8 path")]);
    let teachers = workspace.json(&["teacher", "list"]);
    assert!(teachers
        .as_array()
        .expect("teacher list")
        .iter()
        .any(|teacher| teacher["name"] == "Imran"));
}

#[test]
fn unknown_classes_are_rejected_without_touching_the_file() {
    let workspace = Workspace::new();
    seed_staff(&workspace);
    let before = read(&workspace.path("exam_data.json"));

    let output = workspace.run(&["teacher", "add", "Ravi", "--map", "Class 42:Maths"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("application error"));
    assert_eq!(read(&workspace.path("exam_data.json")), before);
}

#[test]
fn generation_past_the_last_calendar_day_fails_cleanly() {
    let workspace = Workspace::new();
    seed_staff(&workspace);
    let before = read(&workspace.path("exam_data.json"));

    let output = workspace.run(&["schedule", "generate", "--start", "+262142-12-31"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("application error"));
    assert!(stderr.contains("last supported date"));
    assert_eq!(read(&workspace.path("exam_data.json")), before);
}
