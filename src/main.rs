mod render;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use exam_duty::config::AppConfig;
use exam_duty::error::AppError;
use exam_duty::telemetry;
use exam_duty::workflows::archive::{JsonFileStore, PersistentOffice};
use exam_duty::workflows::exams::report::{
    write_duty_roster_csv, write_matrix_csv, write_workload_csv,
};
use exam_duty::workflows::exams::{
    DutyRole, ExamId, ExamType, PeriodSlot, RandomShuffler, TeachingAssignment, WorkloadPolicy,
};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "exam-duty",
    about = "Plan exam days and assign revision and invigilation duties from the command line",
    version
)]
struct Cli {
    /// Data file to load and update (defaults to EXAM_DATA_PATH)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Fix the invigilation shuffle for reproducible pools
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the teacher roster
    Teacher {
        #[command(subcommand)]
        command: TeacherCommand,
    },
    /// Inspect or extend the class/subject catalog
    Subject {
        #[command(subcommand)]
        command: SubjectCommand,
    },
    /// Generate or edit the exam calendar
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },
    /// Walk the revision and invigilation offers for one exam
    Allocate {
        #[command(subcommand)]
        command: AllocateCommand,
    },
    /// Print a report
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
    /// Write a report as CSV
    Export(ExportArgs),
    /// Write the whole data document as JSON
    Backup {
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace everything with a JSON backup
    Restore {
        /// Backup file produced by `backup`
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum TeacherCommand {
    /// List teachers in roster order
    List,
    /// Add a teacher with one or more CLASS:SUBJECT mappings
    Add {
        name: String,
        #[arg(long = "map", value_parser = parse_mapping, required = true)]
        mappings: Vec<TeachingAssignment>,
    },
    /// Remove a teacher by name
    Remove { name: String },
    /// Replace a teacher's mappings
    Map {
        name: String,
        #[arg(long = "map", value_parser = parse_mapping, required = true)]
        mappings: Vec<TeachingAssignment>,
    },
}

#[derive(Subcommand, Debug)]
enum SubjectCommand {
    /// Show every class with its subjects
    List,
    /// Offer a subject in the given classes
    Add {
        subject: String,
        #[arg(long = "class", required = true)]
        classes: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ScheduleCommand {
    /// Show the exam calendar
    List,
    /// Rebuild the calendar from the catalog, discarding existing duties
    Generate {
        /// First exam day (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,
        /// unit-test (two exams a day) or terminal (one)
        #[arg(long = "type", value_parser = parse_exam_type, default_value = "unit-test")]
        exam_type: ExamType,
    },
    /// Add or update one exam slot
    Add(ScheduleArgs),
    /// Drop every exam and duty
    Clear,
}

#[derive(Args, Debug)]
struct ScheduleArgs {
    #[arg(long, value_parser = parse_date)]
    date: NaiveDate,
    #[arg(long)]
    class: String,
    #[arg(long)]
    subject: String,
    /// morning or afternoon
    #[arg(long, value_parser = parse_slot)]
    slot: PeriodSlot,
}

#[derive(Subcommand, Debug)]
enum AllocateCommand {
    /// Show both duties for an exam, building its pools if needed
    Show { exam_id: String },
    /// Confirm the teacher currently on offer
    Accept {
        exam_id: String,
        #[arg(value_parser = parse_role)]
        role: DutyRole,
    },
    /// Pass over the teacher on offer
    Reject {
        exam_id: String,
        #[arg(value_parser = parse_role)]
        role: DutyRole,
    },
    /// Choose any rostered teacher once the pool is exhausted
    Assign {
        exam_id: String,
        #[arg(value_parser = parse_role)]
        role: DutyRole,
        teacher: String,
    },
    /// Clear a confirmed teacher and restart the offer walk
    Unassign {
        exam_id: String,
        #[arg(value_parser = parse_role)]
        role: DutyRole,
    },
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Date by class exam grid
    Matrix,
    /// Confirmed duties per teacher
    Workload {
        /// invigilation or all_duties (defaults to EXAM_WORKLOAD_POLICY)
        #[arg(long, value_parser = parse_policy)]
        policy: Option<WorkloadPolicy>,
    },
    /// Period-by-period duty sheet
    Duties,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// matrix, duties or workload
    #[arg(value_parser = ["matrix", "duties", "workload"])]
    report: String,
    /// Output file (stdout when omitted)
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(data) = cli.data {
        config.office.data_path = data;
    }
    if let Some(seed) = cli.seed {
        config.office.shuffle_seed = Some(seed);
    }

    telemetry::init_stderr(&config.telemetry)?;

    let mut session = PersistentOffice::open(config.office.store(), config.office.settings())?;
    let mut shuffler = config.office.shuffler();
    let output = Output { json: cli.json };

    match cli.command {
        Command::Teacher { command } => run_teacher(&mut session, command, output),
        Command::Subject { command } => run_subject(&mut session, command, output),
        Command::Schedule { command } => run_schedule(&mut session, &mut shuffler, command, output),
        Command::Allocate { command } => run_allocate(&mut session, &mut shuffler, command, output),
        Command::Report { command } => {
            run_report(&session, command, config.office.workload_policy, output)
        }
        Command::Export(args) => run_export(&session, args, config.office.workload_policy),
        Command::Backup { out } => {
            let document = session.backup_json()?;
            write_output(out, document.as_bytes())
        }
        Command::Restore { file } => {
            let raw = fs::read_to_string(&file)?;
            session.restore_json(&raw)?;
            info!(file = %file.display(), "backup restored");
            println!("Restored {}", file.display());
            Ok(())
        }
    }
}

type Session = PersistentOffice<JsonFileStore>;

#[derive(Debug, Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    fn emit<T: serde::Serialize>(
        self,
        value: &T,
        text: impl FnOnce(&T),
    ) -> Result<(), AppError> {
        if self.json {
            let rendered = serde_json::to_string_pretty(value)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            println!("{rendered}");
        } else {
            text(value);
        }
        Ok(())
    }
}

fn run_teacher(
    session: &mut Session,
    command: TeacherCommand,
    output: Output,
) -> Result<(), AppError> {
    match command {
        TeacherCommand::List => {
            let teachers = session.office().roster().teachers().to_vec();
            output.emit(&teachers, |teachers| render::render_teachers(teachers))
        }
        TeacherCommand::Add { name, mappings } => {
            let teacher = session.apply(|office| office.add_teacher(&name, mappings).cloned())?;
            output.emit(&teacher, |teacher| {
                println!("Added {}", teacher.name);
                render::render_teachers(std::slice::from_ref(teacher));
            })
        }
        TeacherCommand::Remove { name } => {
            let teacher = session.apply(|office| office.remove_teacher(&name))?;
            output.emit(&teacher, |teacher| println!("Removed {}", teacher.name))
        }
        TeacherCommand::Map { name, mappings } => {
            let teacher =
                session.apply(|office| office.replace_mappings(&name, mappings).cloned())?;
            output.emit(&teacher, |teacher| {
                println!("Updated {}", teacher.name);
                render::render_teachers(std::slice::from_ref(teacher));
            })
        }
    }
}

fn run_subject(
    session: &mut Session,
    command: SubjectCommand,
    output: Output,
) -> Result<(), AppError> {
    match command {
        SubjectCommand::List => {
            let catalog = session.office().catalog().clone();
            output.emit(&catalog, render::render_catalog)
        }
        SubjectCommand::Add { subject, classes } => {
            let modified =
                session.apply(|office| office.add_subject_to_classes(&subject, &classes))?;
            output.emit(&modified, |modified| {
                println!("{} added to {} class(es)", subject.trim(), modified)
            })
        }
    }
}

fn run_schedule(
    session: &mut Session,
    shuffler: &mut RandomShuffler,
    command: ScheduleCommand,
    output: Output,
) -> Result<(), AppError> {
    match command {
        ScheduleCommand::List => {
            let slots = session.office().timetable().to_vec();
            output.emit(&slots, |slots| render::render_timetable(slots))
        }
        ScheduleCommand::Generate { start, exam_type } => {
            let slots = session.apply(|office| {
                office
                    .generate_timetable(start, exam_type, shuffler)
                    .map(|slots| slots.to_vec())
            })?;
            output.emit(&slots, |slots| {
                println!("{} timetable from {start}: {} exam(s)", exam_type.label(), slots.len());
                render::render_timetable(slots);
            })
        }
        ScheduleCommand::Add(args) => {
            let slot = session.apply(|office| {
                office
                    .schedule_exam(args.date, &args.class, &args.subject, args.slot)
                    .cloned()
            })?;
            output.emit(&slot, |slot| println!("Scheduled {}", slot.id))
        }
        ScheduleCommand::Clear => {
            session.apply(|office| {
                office.clear_timetable();
                Ok(())
            })?;
            output.emit(&serde_json::json!({ "cleared": true }), |_| {
                println!("Timetable cleared")
            })
        }
    }
}

fn run_allocate(
    session: &mut Session,
    shuffler: &mut RandomShuffler,
    command: AllocateCommand,
    output: Output,
) -> Result<(), AppError> {
    let view = match command {
        AllocateCommand::Show { exam_id } => {
            let exam_id = ExamId(exam_id);
            session.apply(|office| office.allocation_view(&exam_id, shuffler))?
        }
        AllocateCommand::Accept { exam_id, role } => {
            let exam_id = ExamId(exam_id);
            session.apply(|office| office.accept_offer(&exam_id, role, shuffler))?
        }
        AllocateCommand::Reject { exam_id, role } => {
            let exam_id = ExamId(exam_id);
            session.apply(|office| office.reject_offer(&exam_id, role, shuffler))?
        }
        AllocateCommand::Assign {
            exam_id,
            role,
            teacher,
        } => {
            let exam_id = ExamId(exam_id);
            session.apply(|office| office.assign_manually(&exam_id, role, &teacher, shuffler))?
        }
        AllocateCommand::Unassign { exam_id, role } => {
            let exam_id = ExamId(exam_id);
            session.apply(|office| office.unassign(&exam_id, role, shuffler))?
        }
    };

    output.emit(&view, render::render_allocation)
}

fn run_report(
    session: &Session,
    command: ReportCommand,
    default_policy: WorkloadPolicy,
    output: Output,
) -> Result<(), AppError> {
    let office = session.office();
    match command {
        ReportCommand::Matrix => output.emit(&office.matrix_view(), render::render_matrix),
        ReportCommand::Workload { policy } => {
            let policy = policy.unwrap_or(default_policy);
            output.emit(&office.workload_stats(policy), |entries| {
                render::render_workload(entries, policy)
            })
        }
        ReportCommand::Duties => output.emit(&office.duty_roster(), |rows| {
            render::render_duty_roster(rows)
        }),
    }
}

fn run_export(session: &Session, args: ExportArgs, policy: WorkloadPolicy) -> Result<(), AppError> {
    let office = session.office();
    let mut buffer = Vec::new();
    match args.report.as_str() {
        "matrix" => write_matrix_csv(&office.matrix_view(), &mut buffer)?,
        "duties" => write_duty_roster_csv(&office.duty_roster(), &mut buffer)?,
        _ => write_workload_csv(&office.workload_stats(policy), &mut buffer)?,
    }
    write_output(args.out, &buffer)
}

fn write_output(out: Option<PathBuf>, bytes: &[u8]) -> Result<(), AppError> {
    match out {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(&path)?);
            writer.write_all(bytes)?;
            writer.flush()?;
            info!(path = %path.display(), bytes = bytes.len(), "file written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn parse_mapping(raw: &str) -> Result<TeachingAssignment, String> {
    let (class, subject) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected CLASS:SUBJECT, got '{raw}'"))?;
    let (class, subject) = (class.trim(), subject.trim());
    if class.is_empty() || subject.is_empty() {
        return Err(format!("expected CLASS:SUBJECT, got '{raw}'"));
    }
    Ok(TeachingAssignment::new(class, subject))
}

fn parse_exam_type(raw: &str) -> Result<ExamType, String> {
    raw.parse()
}

fn parse_slot(raw: &str) -> Result<PeriodSlot, String> {
    raw.parse()
}

fn parse_role(raw: &str) -> Result<DutyRole, String> {
    raw.parse()
}

fn parse_policy(raw: &str) -> Result<WorkloadPolicy, String> {
    raw.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn mappings_split_on_the_first_colon() {
        assert_eq!(
            parse_mapping("Class 11 (MPC): Physics"),
            Ok(TeachingAssignment::new("Class 11 (MPC)", "Physics"))
        );
        assert!(parse_mapping("Class 1").is_err());
        assert!(parse_mapping(":Maths").is_err());
    }

    #[test]
    fn allocate_accepts_short_role_names() {
        let cli = Cli::try_parse_from([
            "exam-duty",
            "allocate",
            "accept",
            "2025-03-03_Class 1_Morning",
            "inv",
        ])
        .expect("parses");

        match cli.command {
            Command::Allocate {
                command: AllocateCommand::Accept { exam_id, role },
            } => {
                assert_eq!(exam_id, "2025-03-03_Class 1_Morning");
                assert_eq!(role, DutyRole::Invigilation);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn generate_defaults_to_unit_tests() {
        let cli = Cli::try_parse_from([
            "exam-duty",
            "schedule",
            "generate",
            "--start",
            "2025-03-03",
        ])
        .expect("parses");
        assert!(matches!(
            cli.command,
            Command::Schedule {
                command: ScheduleCommand::Generate {
                    exam_type: ExamType::UnitTest,
                    ..
                }
            }
        ));
    }
}
