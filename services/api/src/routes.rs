use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sitepay::error::AppError;
use sitepay::workflows::import::WorkRecordImporter;
use sitepay::workflows::insurance::{
    insurance_router, EligibilityConfig, EligibilityEngine, EligibilityInput, EligibilityOutcome,
    EnrollmentRepository, InsuranceEnrollmentService, InsuranceType,
};
use sitepay::workflows::payroll::{
    payroll_router, CoverageLookup, DeductionCalculator, DeductionConfig, PayrollService,
    PayrollStatement,
};
use sitepay::workflows::workforce::{SiteId, WorkRecord, WorkerId, WorkforceRepository, YearMonth};
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct EligibilityCheckRequest {
    pub(crate) workers: Vec<EligibilityInput>,
    /// Thresholds to evaluate against; defaults apply when absent.
    #[serde(default)]
    pub(crate) config: Option<EligibilityConfig>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EligibilityCheckResponse {
    pub(crate) outcomes: Vec<EligibilityOutcome>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PayrollStatementRequest {
    pub(crate) site_id: SiteId,
    pub(crate) year_month: YearMonth,
    #[serde(default)]
    pub(crate) records: Vec<WorkRecord>,
    /// Work record export; rows without a site column belong to `site_id`.
    #[serde(default)]
    pub(crate) records_csv: Option<String>,
    /// Required insurances per worker. Workers missing from the map only pay employment insurance.
    #[serde(default)]
    pub(crate) coverage: BTreeMap<WorkerId, Vec<InsuranceType>>,
    #[serde(default)]
    pub(crate) config: Option<DeductionConfig>,
}

pub(crate) fn with_sitepay_routes<W, E>(
    insurance: Arc<InsuranceEnrollmentService<W, E>>,
    payroll: Arc<PayrollService<W, E>>,
) -> axum::Router
where
    W: WorkforceRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    insurance_router(insurance)
        .merge(payroll_router(payroll))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/eligibility/check",
            axum::routing::post(eligibility_check_endpoint),
        )
        .route(
            "/api/v1/payroll/statement",
            axum::routing::post(payroll_statement_endpoint),
        )
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

pub(crate) async fn eligibility_check_endpoint(
    Json(payload): Json<EligibilityCheckRequest>,
) -> Json<EligibilityCheckResponse> {
    let engine = EligibilityEngine::new(payload.config.unwrap_or_default());
    let outcomes = payload
        .workers
        .iter()
        .map(|input| engine.classify(input))
        .collect();
    Json(EligibilityCheckResponse { outcomes })
}

pub(crate) async fn payroll_statement_endpoint(
    Json(payload): Json<PayrollStatementRequest>,
) -> Result<Json<PayrollStatement>, AppError> {
    let PayrollStatementRequest {
        site_id,
        year_month,
        mut records,
        records_csv,
        coverage,
        config,
    } = payload;

    if let Some(csv) = records_csv {
        let reader = Cursor::new(csv.into_bytes());
        records.extend(WorkRecordImporter::from_reader(reader, Some(&site_id))?);
    }

    let mut lookup = CoverageLookup::default();
    for (worker_id, required) in coverage {
        lookup.insert(worker_id, required);
    }

    let calculator = DeductionCalculator::new(config.unwrap_or_default());
    let statement = PayrollStatement::build(&calculator, site_id, year_month, &records, &lookup);
    Ok(Json(statement))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryEnrollments, InMemoryWorkforce};
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use sitepay::workflows::insurance::CoverageStatus;
    use sitepay::workflows::workforce::{WorkStatus, WorkerType};
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn input(id: &str, worker_type: WorkerType, wage: u64, days: u32, hours: f32) -> EligibilityInput {
        EligibilityInput {
            worker_id: WorkerId(id.to_string()),
            worker_type,
            age: 40,
            monthly_wage: wage,
            work_days: days,
            work_hours: hours,
            overrides: Default::default(),
        }
    }

    fn test_app(ready: bool) -> (axum::Router, InMemoryWorkforce) {
        let workforce = Arc::new(InMemoryWorkforce::default());
        let enrollments = Arc::new(InMemoryEnrollments::default());
        let insurance = Arc::new(InsuranceEnrollmentService::new(
            workforce.clone(),
            enrollments.clone(),
            EligibilityConfig::default(),
        ));
        let payroll = Arc::new(PayrollService::new(
            workforce.clone(),
            enrollments,
            DeductionConfig::default(),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let app = with_sitepay_routes(insurance, payroll).layer(Extension(state));
        (app, (*workforce).clone())
    }

    fn march_record(day: u32) -> WorkRecord {
        WorkRecord {
            worker_id: WorkerId("w-1".to_string()),
            site_id: SiteId("site-a".to_string()),
            work_date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            work_hours: 8.0,
            daily_wage: 200_000,
            status: WorkStatus::Registration,
            registration_month: YearMonth::new(2025, 3).unwrap(),
            payment: None,
        }
    }

    #[tokio::test]
    async fn eligibility_check_classifies_each_worker() {
        let request = EligibilityCheckRequest {
            workers: vec![
                input("w-1", WorkerType::Daily, 2_400_000, 12, 96.0),
                input("w-2", WorkerType::PartTime, 400_000, 4, 16.0),
            ],
            config: None,
        };

        let Json(body) = eligibility_check_endpoint(Json(request)).await;
        assert_eq!(body.outcomes.len(), 2);
        assert_eq!(body.outcomes[0].required_types().len(), 4);

        let part_time = &body.outcomes[1];
        assert_eq!(
            part_time.required_types(),
            vec![InsuranceType::IndustrialAccident]
        );
        let pension = part_time
            .decision(InsuranceType::NationalPension)
            .expect("pension decision");
        assert_eq!(pension.status, CoverageStatus::AutoExempted);
    }

    #[tokio::test]
    async fn payroll_statement_reads_csv_and_defaults_to_employment_insurance() {
        let request = PayrollStatementRequest {
            site_id: SiteId("site-a".to_string()),
            year_month: YearMonth::new(2025, 3).unwrap(),
            records: Vec::new(),
            records_csv: Some(
                "근로자ID,근무일,근무시간,일당\nw-1,2025-03-03,8,\"200,000\"\nw-1,2025-03-04,8,200000원\n"
                    .to_string(),
            ),
            coverage: BTreeMap::new(),
            config: None,
        };

        let Json(statement) = payroll_statement_endpoint(Json(request))
            .await
            .expect("statement builds");

        assert_eq!(statement.workers.len(), 1);
        let total = &statement.grand_total;
        assert_eq!(total.work_days, 2);
        assert_eq!(total.gross_pay, 400_000);
        assert_eq!(total.income_tax, 2_700);
        assert_eq!(total.local_tax, 260);
        assert_eq!(total.employment_insurance, 3_600);
        assert_eq!(total.national_pension, 0);
        assert_eq!(total.net_pay, 393_440);
    }

    #[tokio::test]
    async fn payroll_statement_rejects_malformed_csv() {
        let request = PayrollStatementRequest {
            site_id: SiteId("site-a".to_string()),
            year_month: YearMonth::new(2025, 3).unwrap(),
            records: Vec::new(),
            records_csv: Some("근로자ID,근무일\nw-1,2025-03-03\n".to_string()),
            coverage: BTreeMap::new(),
            config: None,
        };

        let error = payroll_statement_endpoint(Json(request))
            .await
            .expect_err("missing columns");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn readiness_reflects_startup_state() {
        let (app, _) = test_app(false);
        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let (app, _) = test_app(true);
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn payroll_routes_confirm_then_pay() {
        let (app, workforce) = test_app(true);
        for day in [3, 4] {
            workforce.insert_work_record(march_record(day)).unwrap();
        }

        let pay_body = json!({
            "payment": { "paid_on": "2025-04-10", "method": "bank_transfer" }
        })
        .to_string();
        let blocked = app
            .clone()
            .oneshot(
                Request::post("/api/v1/sites/site-a/payroll/2025-03/pay")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(pay_body.clone()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(blocked.status(), StatusCode::CONFLICT);

        let confirmed = app
            .clone()
            .oneshot(
                Request::post("/api/v1/sites/site-a/payroll/2025-03/confirm")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(confirmed.status(), StatusCode::OK);

        let paid = app
            .clone()
            .oneshot(
                Request::post("/api/v1/sites/site-a/payroll/2025-03/pay")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(pay_body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(paid.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(paid.into_body(), usize::MAX)
            .await
            .unwrap();
        let receipt: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(receipt["paid_records"], 2);
        assert_eq!(receipt["net_total"], 393_440);

        let malformed = app
            .oneshot(
                Request::get("/api/v1/sites/site-a/payroll/2025-3x")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    }
}
