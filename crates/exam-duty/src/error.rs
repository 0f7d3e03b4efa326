use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::archive::{RestoreError, SessionError, StoreError};
use crate::workflows::exams::{ExportError, OfficeError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Office(OfficeError),
    Store(StoreError),
    Restore(RestoreError),
    Export(ExportError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Office(OfficeError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Office(OfficeError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Office(OfficeError::Transition(_)) => StatusCode::CONFLICT,
            AppError::Restore(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Store(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Office(err) => write!(f, "{}", err),
            AppError::Store(err) => write!(f, "storage error: {}", err),
            AppError::Restore(err) => write!(f, "restore failed: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Office(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Restore(err) => Some(err),
            AppError::Export(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<OfficeError> for AppError {
    fn from(value: OfficeError) -> Self {
        Self::Office(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<RestoreError> for AppError {
    fn from(value: RestoreError) -> Self {
        Self::Restore(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        match value {
            SessionError::Office(err) => Self::Office(err),
            SessionError::Store(err) => Self::Store(err),
            SessionError::Restore(err) => Self::Restore(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::exams::{
        DutyRole, ExamId, NotFoundError, TransitionError, ValidationError,
    };

    #[test]
    fn office_errors_map_to_client_statuses() {
        let cases = [
            (
                AppError::from(OfficeError::from(ValidationError::MissingName)),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(OfficeError::from(NotFoundError::Exam(ExamId(
                    "2025-03-03_Class 1_Morning".to_string(),
                )))),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(OfficeError::from(TransitionError::AlreadyConfirmed {
                    role: DutyRole::Revision,
                })),
                StatusCode::CONFLICT,
            ),
            (AppError::from(ConfigError::InvalidPort), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status(), expected, "{error}");
        }
    }

    #[test]
    fn malformed_restore_is_a_bad_request() {
        let error = crate::workflows::archive::DutyDocument::from_json("[")
            .map(|_| ())
            .map_err(|err| AppError::from(SessionError::from(err)))
            .expect_err("not a document");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert!(error.to_string().starts_with("restore failed"));
    }
}
