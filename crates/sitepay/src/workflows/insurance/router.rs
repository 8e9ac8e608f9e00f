use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::InsuranceType;
use super::enrollment::EnrollmentTransitionError;
use super::repository::EnrollmentRepository;
use super::service::{EnrollmentServiceError, InsuranceEnrollmentService};
use crate::workflows::workforce::{
    RepositoryError, SiteId, WorkerId, WorkforceRepository, YearMonth,
};

type SharedService<W, E> = Arc<InsuranceEnrollmentService<W, E>>;

/// Router builder exposing the monthly enrollment workflow.
pub fn insurance_router<W, E>(service: SharedService<W, E>) -> Router
where
    W: WorkforceRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    let base = "/api/v1/sites/:site_id/insurance/:year_month";
    Router::new()
        .route(base, get(coverage_handler::<W, E>))
        .route(&format!("{base}/evaluate"), post(evaluate_handler::<W, E>))
        .route(
            &format!("{base}/workers/:worker_id/override"),
            put(override_handler::<W, E>),
        )
        .route(
            &format!("{base}/workers/:worker_id/confirm"),
            post(confirm_handler::<W, E>).delete(cancel_handler::<W, E>),
        )
        .route(
            &format!("{base}/workers/:worker_id/report"),
            post(report_handler::<W, E>),
        )
        .route(
            &format!("{base}/workers/:worker_id/loss"),
            post(loss_handler::<W, E>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverrideRequest {
    pub(crate) insurance: InsuranceType,
    /// `null` clears the manual decision.
    #[serde(default)]
    pub(crate) required: Option<bool>,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmRequest {
    pub(crate) confirmed_by: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LossRequest {
    pub(crate) loss_date: NaiveDate,
}

fn parse_period(raw: &str) -> Result<YearMonth, Response> {
    raw.parse::<YearMonth>().map_err(|error| {
        let payload = json!({ "error": error.to_string() });
        (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
    })
}

pub(crate) fn error_response(error: EnrollmentServiceError) -> Response {
    let status = match &error {
        EnrollmentServiceError::WorkerNotFound(_)
        | EnrollmentServiceError::EnrollmentNotFound { .. }
        | EnrollmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        EnrollmentServiceError::Transition(EnrollmentTransitionError::Locked)
        | EnrollmentServiceError::Transition(EnrollmentTransitionError::InvalidTransition {
            ..
        })
        | EnrollmentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        EnrollmentServiceError::Transition(
            EnrollmentTransitionError::LossBeforeAcquisition { .. },
        ) => StatusCode::UNPROCESSABLE_ENTITY,
        EnrollmentServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(result: Result<T, EnrollmentServiceError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn evaluate_handler<W, E>(
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
    respond(service.evaluate_month(&SiteId(site_id), year_month))
}

pub(crate) async fn coverage_handler<W, E>(
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
    respond(service.coverage(&SiteId(site_id), year_month))
}

pub(crate) async fn override_handler<W, E>(
    State(service): State<SharedService<W, E>>,
    Path((site_id, year_month, worker_id)): Path<(String, String, String)>,
    axum::Json(request): axum::Json<OverrideRequest>,
) -> Response
where
    W: WorkforceRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    let year_month = match parse_period(&year_month) {
        Ok(period) => period,
        Err(response) => return response,
    };
    respond(service.set_manual_override(
        &SiteId(site_id),
        year_month,
        &WorkerId(worker_id),
        request.insurance,
        request.required,
        request.reason,
    ))
}

pub(crate) async fn confirm_handler<W, E>(
    State(service): State<SharedService<W, E>>,
    Path((site_id, year_month, worker_id)): Path<(String, String, String)>,
    axum::Json(request): axum::Json<ConfirmRequest>,
) -> Response
where
    W: WorkforceRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    let year_month = match parse_period(&year_month) {
        Ok(period) => period,
        Err(response) => return response,
    };
    respond(service.confirm(
        &SiteId(site_id),
        year_month,
        &WorkerId(worker_id),
        &request.confirmed_by,
        Utc::now(),
    ))
}

pub(crate) async fn cancel_handler<W, E>(
    State(service): State<SharedService<W, E>>,
    Path((site_id, year_month, worker_id)): Path<(String, String, String)>,
) -> Response
where
    W: WorkforceRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    let year_month = match parse_period(&year_month) {
        Ok(period) => period,
        Err(response) => return response,
    };
    respond(service.cancel_confirmation(&SiteId(site_id), year_month, &WorkerId(worker_id)))
}

pub(crate) async fn report_handler<W, E>(
    State(service): State<SharedService<W, E>>,
    Path((site_id, year_month, worker_id)): Path<(String, String, String)>,
) -> Response
where
    W: WorkforceRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    let year_month = match parse_period(&year_month) {
        Ok(period) => period,
        Err(response) => return response,
    };
    respond(service.mark_reported(&SiteId(site_id), year_month, &WorkerId(worker_id)))
}

pub(crate) async fn loss_handler<W, E>(
    State(service): State<SharedService<W, E>>,
    Path((site_id, year_month, worker_id)): Path<(String, String, String)>,
    axum::Json(request): axum::Json<LossRequest>,
) -> Response
where
    W: WorkforceRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    let year_month = match parse_period(&year_month) {
        Ok(period) => period,
        Err(response) => return response,
    };
    respond(service.record_loss(
        &SiteId(site_id),
        year_month,
        &WorkerId(worker_id),
        request.loss_date,
    ))
}
