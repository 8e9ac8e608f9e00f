use crate::cli::ServeArgs;
use crate::infra::{seed_from_paths, AppState, InMemoryEnrollments, InMemoryWorkforce};
use crate::routes::with_sitepay_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use sitepay::config::AppConfig;
use sitepay::error::AppError;
use sitepay::telemetry;
use sitepay::workflows::insurance::InsuranceEnrollmentService;
use sitepay::workflows::payroll::PayrollService;
use sitepay::workflows::workforce::SiteId;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let workforce = Arc::new(InMemoryWorkforce::default());
    let enrollments = Arc::new(InMemoryEnrollments::default());
    let default_site = args.default_site.take().map(SiteId);
    let seeded = seed_from_paths(
        &workforce,
        args.workers.as_deref(),
        args.records.as_deref(),
        default_site.as_ref(),
    )?;
    if seeded.workers > 0 || seeded.records > 0 {
        info!(
            workers = seeded.workers,
            records = seeded.records,
            "seeded in-memory store from csv"
        );
    }

    let insurance_service = Arc::new(InsuranceEnrollmentService::new(
        workforce.clone(),
        enrollments.clone(),
        config.eligibility.clone(),
    ));
    let payroll_service = Arc::new(PayrollService::new(
        workforce,
        enrollments,
        config.deductions.clone(),
    ));

    let app = with_sitepay_routes(insurance_service, payroll_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "sitepay service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
