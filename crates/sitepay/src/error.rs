use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::import::ImportError;
use crate::workflows::insurance::EnrollmentServiceError;
use crate::workflows::payroll::PayrollServiceError;
use crate::workflows::workforce::RepositoryError;
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
    Import(ImportError),
    Enrollment(EnrollmentServiceError),
    Payroll(PayrollServiceError),
    Repository(RepositoryError),
    Json(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Enrollment(err) => write!(f, "enrollment error: {}", err),
            AppError::Payroll(err) => write!(f, "payroll error: {}", err),
            AppError::Repository(err) => write!(f, "repository error: {}", err),
            AppError::Json(err) => write!(f, "json error: {}", err),
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
            AppError::Import(err) => Some(err),
            AppError::Enrollment(err) => Some(err),
            AppError::Payroll(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::Json(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Import(_) | AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Enrollment(EnrollmentServiceError::Repository(err))
            | AppError::Payroll(PayrollServiceError::Repository(err))
            | AppError::Repository(err) => repository_status(err),
            AppError::Enrollment(EnrollmentServiceError::Transition(_))
            | AppError::Payroll(PayrollServiceError::Record(_)) => StatusCode::CONFLICT,
            AppError::Enrollment(
                EnrollmentServiceError::WorkerNotFound(_)
                | EnrollmentServiceError::EnrollmentNotFound { .. },
            ) => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

fn repository_status(error: &RepositoryError) -> StatusCode {
    match error {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict => StatusCode::CONFLICT,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
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

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<EnrollmentServiceError> for AppError {
    fn from(value: EnrollmentServiceError) -> Self {
        Self::Enrollment(value)
    }
}

impl From<PayrollServiceError> for AppError {
    fn from(value: PayrollServiceError) -> Self {
        Self::Payroll(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
