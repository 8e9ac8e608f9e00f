use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::service::{PayrollService, PayrollServiceError};
use crate::workflows::insurance::EnrollmentRepository;
use crate::workflows::workforce::{
    PaymentInfo, RepositoryError, SiteId, WorkerId, WorkforceRepository, YearMonth,
};

type SharedService<W, E> = Arc<PayrollService<W, E>>;

/// Router builder exposing record confirmation, payment and the monthly statement.
pub fn payroll_router<W, E>(service: SharedService<W, E>) -> Router
where
    W: WorkforceRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    let base = "/api/v1/sites/:site_id/payroll/:year_month";
    Router::new()
        .route(base, get(statement_handler::<W, E>))
        .route(&format!("{base}/confirm"), post(confirm_handler::<W, E>))
        .route(&format!("{base}/pay"), post(pay_handler::<W, E>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct PayRequest {
    /// Empty pays every worker with records in the month.
    #[serde(default)]
    pub(crate) workers: Vec<WorkerId>,
    pub(crate) payment: PaymentInfo,
}

fn parse_period(raw: &str) -> Result<YearMonth, Response> {
    raw.parse::<YearMonth>().map_err(|error| {
        let payload = json!({ "error": error.to_string() });
        (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
    })
}

pub(crate) fn error_response(error: PayrollServiceError) -> Response {
    let status = match &error {
        PayrollServiceError::Record(_) | PayrollServiceError::Repository(RepositoryError::Conflict) => {
            StatusCode::CONFLICT
        }
        PayrollServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        PayrollServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn statement_handler<W, E>(
    State(service): State<SharedService<W, E>>,
    Path((site_id, year_month)): Path<(String, String)>,
) -> Response
where
    W: WorkforceRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    let year_month = match parse_period(&year_month) {
        Ok(period) => period,
        Err(response) => return response,
    };
    match service.statement(&SiteId(site_id), year_month) {
        Ok(statement) => (StatusCode::OK, axum::Json(statement)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn confirm_handler<W, E>(
    State(service): State<SharedService<W, E>>,
    Path((site_id, year_month)): Path<(String, String)>,
) -> Response
where
    W: WorkforceRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    let year_month = match parse_period(&year_month) {
        Ok(period) => period,
        Err(response) => return response,
    };
    match service.confirm_records(&SiteId(site_id), year_month) {
        Ok(confirmed) => {
            (StatusCode::OK, axum::Json(json!({ "confirmed": confirmed }))).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn pay_handler<W, E>(
    State(service): State<SharedService<W, E>>,
    Path((site_id, year_month)): Path<(String, String)>,
    axum::Json(request): axum::Json<PayRequest>,
) -> Response
where
    W: WorkforceRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    let year_month = match parse_period(&year_month) {
        Ok(period) => period,
        Err(response) => return response,
    };
    match service.pay(
        &SiteId(site_id),
        year_month,
        &request.workers,
        request.payment,
    ) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}
