use crate::infra::{deserialize_date, AppState, OfficeService};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use exam_duty::error::AppError;
use exam_duty::workflows::archive::DocumentStore;
use exam_duty::workflows::exams::report::{write_duty_roster_csv, write_matrix_csv};
use exam_duty::workflows::exams::{
    AllocationView, ClassSubjectCatalog, DutyRole, DutyRosterRow, ExamId, ExamSlot, ExamType,
    MatrixView, PeriodSlot, Teacher, TeachingAssignment, WorkloadEntry, WorkloadPolicy,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct NewTeacherRequest {
    pub(crate) name: String,
    pub(crate) mappings: Vec<TeachingAssignment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MappingsRequest {
    pub(crate) mappings: Vec<TeachingAssignment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubjectRequest {
    pub(crate) subject: String,
    pub(crate) classes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubjectResponse {
    pub(crate) subject: String,
    pub(crate) classes_modified: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateRequest {
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) start_date: NaiveDate,
    pub(crate) exam_type: ExamType,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleRequest {
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) date: NaiveDate,
    pub(crate) class: String,
    pub(crate) subject: String,
    pub(crate) slot: PeriodSlot,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ManualAssignRequest {
    pub(crate) teacher: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WorkloadQuery {
    #[serde(default)]
    pub(crate) policy: Option<WorkloadPolicy>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WorkloadResponse {
    pub(crate) policy: WorkloadPolicy,
    pub(crate) policy_label: &'static str,
    pub(crate) entries: Vec<WorkloadEntry>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum OfferAction {
    Accept,
    Reject,
    Unassign,
}

type Shared<S> = State<Arc<OfficeService<S>>>;

pub(crate) fn office_router<S>(service: Arc<OfficeService<S>>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/teachers",
            get(list_teachers::<S>).post(add_teacher::<S>),
        )
        .route("/api/v1/teachers/:name", delete(remove_teacher::<S>))
        .route(
            "/api/v1/teachers/:name/mappings",
            put(replace_mappings::<S>),
        )
        .route("/api/v1/catalog", get(catalog::<S>))
        .route("/api/v1/catalog/subjects", post(add_subject::<S>))
        .route(
            "/api/v1/timetable",
            get(timetable::<S>).delete(clear_timetable::<S>),
        )
        .route("/api/v1/timetable/generate", post(generate_timetable::<S>))
        .route("/api/v1/timetable/exams", post(schedule_exam::<S>))
        .route("/api/v1/allocations/:exam_id", get(allocation::<S>))
        .route(
            "/api/v1/allocations/:exam_id/:role/assign",
            post(assign_manually::<S>),
        )
        .route(
            "/api/v1/allocations/:exam_id/:role/:action",
            post(offer_action::<S>),
        )
        .route("/api/v1/reports/matrix", get(matrix::<S>))
        .route("/api/v1/reports/matrix.csv", get(matrix_csv::<S>))
        .route("/api/v1/reports/workload", get(workload::<S>))
        .route("/api/v1/reports/duty-roster", get(duty_roster::<S>))
        .route("/api/v1/reports/duty-roster.csv", get(duty_roster_csv::<S>))
        .route("/api/v1/backup", get(backup::<S>))
        .route("/api/v1/restore", post(restore::<S>))
        .with_state(service)
}

pub(crate) fn with_office_routes<S>(service: Arc<OfficeService<S>>) -> Router
where
    S: DocumentStore + 'static,
{
    office_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn list_teachers<S: DocumentStore>(State(service): Shared<S>) -> Json<Vec<Teacher>> {
    let desk = service.desk();
    Json(desk.session.office().roster().teachers().to_vec())
}

async fn add_teacher<S: DocumentStore>(
    State(service): Shared<S>,
    Json(request): Json<NewTeacherRequest>,
) -> Result<(StatusCode, Json<Teacher>), AppError> {
    let mut desk = service.desk();
    let teacher = desk
        .session
        .apply(|office| office.add_teacher(&request.name, request.mappings).cloned())?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

async fn remove_teacher<S: DocumentStore>(
    State(service): Shared<S>,
    Path(name): Path<String>,
) -> Result<Json<Teacher>, AppError> {
    let mut desk = service.desk();
    let removed = desk.session.apply(|office| office.remove_teacher(&name))?;
    Ok(Json(removed))
}

async fn replace_mappings<S: DocumentStore>(
    State(service): Shared<S>,
    Path(name): Path<String>,
    Json(request): Json<MappingsRequest>,
) -> Result<Json<Teacher>, AppError> {
    let mut desk = service.desk();
    let teacher = desk
        .session
        .apply(|office| office.replace_mappings(&name, request.mappings).cloned())?;
    Ok(Json(teacher))
}

async fn catalog<S: DocumentStore>(State(service): Shared<S>) -> Json<ClassSubjectCatalog> {
    let desk = service.desk();
    Json(desk.session.office().catalog().clone())
}

async fn add_subject<S: DocumentStore>(
    State(service): Shared<S>,
    Json(request): Json<SubjectRequest>,
) -> Result<Json<SubjectResponse>, AppError> {
    let mut desk = service.desk();
    let classes_modified = desk
        .session
        .apply(|office| office.add_subject_to_classes(&request.subject, &request.classes))?;
    Ok(Json(SubjectResponse {
        subject: request.subject.trim().to_string(),
        classes_modified,
    }))
}

async fn timetable<S: DocumentStore>(State(service): Shared<S>) -> Json<Vec<ExamSlot>> {
    let desk = service.desk();
    Json(desk.session.office().timetable().to_vec())
}

async fn generate_timetable<S: DocumentStore>(
    State(service): Shared<S>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<Vec<ExamSlot>>, AppError> {
    let mut guard = service.desk();
    let desk = &mut *guard;
    let shuffler = &mut desk.shuffler;
    let slots = desk.session.apply(|office| {
        office
            .generate_timetable(request.start_date, request.exam_type, shuffler)
            .map(|slots| slots.to_vec())
    })?;
    Ok(Json(slots))
}

async fn schedule_exam<S: DocumentStore>(
    State(service): Shared<S>,
    Json(request): Json<ScheduleRequest>,
) -> Result<(StatusCode, Json<ExamSlot>), AppError> {
    let mut desk = service.desk();
    let slot = desk.session.apply(|office| {
        office
            .schedule_exam(request.date, &request.class, &request.subject, request.slot)
            .cloned()
    })?;
    Ok((StatusCode::CREATED, Json(slot)))
}

async fn clear_timetable<S: DocumentStore>(
    State(service): Shared<S>,
) -> Result<StatusCode, AppError> {
    let mut desk = service.desk();
    desk.session.apply(|office| {
        office.clear_timetable();
        Ok(())
    })?;
    Ok(StatusCode::NO_CONTENT)
}

async fn allocation<S: DocumentStore>(
    State(service): Shared<S>,
    Path(exam_id): Path<String>,
) -> Result<Json<AllocationView>, AppError> {
    let exam_id = ExamId(exam_id);
    let mut guard = service.desk();
    let desk = &mut *guard;
    let shuffler = &mut desk.shuffler;
    let view = desk
        .session
        .apply(|office| office.allocation_view(&exam_id, shuffler))?;
    Ok(Json(view))
}

async fn offer_action<S: DocumentStore>(
    State(service): Shared<S>,
    Path((exam_id, role, action)): Path<(String, DutyRole, OfferAction)>,
) -> Result<Json<AllocationView>, AppError> {
    let exam_id = ExamId(exam_id);
    let mut guard = service.desk();
    let desk = &mut *guard;
    let shuffler = &mut desk.shuffler;
    let view = desk.session.apply(|office| match action {
        OfferAction::Accept => office.accept_offer(&exam_id, role, shuffler),
        OfferAction::Reject => office.reject_offer(&exam_id, role, shuffler),
        OfferAction::Unassign => office.unassign(&exam_id, role, shuffler),
    })?;
    Ok(Json(view))
}

async fn assign_manually<S: DocumentStore>(
    State(service): Shared<S>,
    Path((exam_id, role)): Path<(String, DutyRole)>,
    Json(request): Json<ManualAssignRequest>,
) -> Result<Json<AllocationView>, AppError> {
    let exam_id = ExamId(exam_id);
    let mut guard = service.desk();
    let desk = &mut *guard;
    let shuffler = &mut desk.shuffler;
    let view = desk.session.apply(|office| {
        office.assign_manually(&exam_id, role, &request.teacher, shuffler)
    })?;
    Ok(Json(view))
}

async fn matrix<S: DocumentStore>(State(service): Shared<S>) -> Json<MatrixView> {
    let desk = service.desk();
    Json(desk.session.office().matrix_view())
}

async fn matrix_csv<S: DocumentStore>(
    State(service): Shared<S>,
) -> Result<impl IntoResponse, AppError> {
    let matrix = service.desk().session.office().matrix_view();
    let mut body = Vec::new();
    write_matrix_csv(&matrix, &mut body)?;
    Ok(csv_download("exam_timetable.csv", body))
}

async fn workload<S: DocumentStore>(
    State(service): Shared<S>,
    Query(query): Query<WorkloadQuery>,
) -> Json<WorkloadResponse> {
    let policy = query.policy.unwrap_or(service.workload_policy());
    let desk = service.desk();
    Json(WorkloadResponse {
        policy,
        policy_label: policy.label(),
        entries: desk.session.office().workload_stats(policy),
    })
}

async fn duty_roster<S: DocumentStore>(State(service): Shared<S>) -> Json<Vec<DutyRosterRow>> {
    let desk = service.desk();
    Json(desk.session.office().duty_roster())
}

async fn duty_roster_csv<S: DocumentStore>(
    State(service): Shared<S>,
) -> Result<impl IntoResponse, AppError> {
    let rows = service.desk().session.office().duty_roster();
    let mut body = Vec::new();
    write_duty_roster_csv(&rows, &mut body)?;
    Ok(csv_download("duty_roster.csv", body))
}

async fn backup<S: DocumentStore>(
    State(service): Shared<S>,
) -> Result<impl IntoResponse, AppError> {
    let body = service.desk().session.backup_json()?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"exam_backup.json\"",
            ),
        ],
        body,
    ))
}

async fn restore<S: DocumentStore>(
    State(service): Shared<S>,
    body: String,
) -> Result<StatusCode, AppError> {
    service.desk().session.restore_json(&body)?;
    Ok(StatusCode::NO_CONTENT)
}

fn csv_download(filename: &'static str, body: Vec<u8>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}
