use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::insurance::{
    insurance_router, EligibilityConfig, EligibilityEngine, EnrollmentRepository,
    InsuranceEnrollment, InsuranceEnrollmentService,
};
use crate::workflows::workforce::{
    RepositoryError, ResidentNumber, SiteId, WorkRecord, WorkStatus, Worker, WorkerId,
    WorkerType, WorkforceRepository, YearMonth,
};

pub(super) type TestService = InsuranceEnrollmentService<MemoryWorkforce, MemoryEnrollments>;

pub(super) fn site() -> SiteId {
    SiteId("site-a".to_string())
}

pub(super) fn month(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).expect("valid month")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn worker_id(raw: &str) -> WorkerId {
    WorkerId(raw.to_string())
}

pub(super) fn worker(id: &str, resident_number: &str, worker_type: WorkerType) -> Worker {
    Worker {
        id: worker_id(id),
        name: format!("Worker {id}"),
        resident_number: ResidentNumber::parse(resident_number).expect("valid resident number"),
        contact: None,
        nationality_code: None,
        residence_status_code: None,
        job_code: None,
        bank: None,
        worker_type,
        resignation_date: None,
    }
}

/// One record per listed day of `period`, all at the same hours and wage.
pub(super) fn records(
    id: &str,
    period: YearMonth,
    days: &[u32],
    hours: f32,
    wage: u64,
) -> Vec<WorkRecord> {
    days.iter()
        .map(|day| {
            let work_date = date(period.year(), period.month(), *day);
            WorkRecord {
                worker_id: worker_id(id),
                site_id: site(),
                work_date,
                work_hours: hours,
                daily_wage: wage,
                status: WorkStatus::Normal,
                registration_month: period,
                payment: None,
            }
        })
        .collect()
}

pub(super) fn build_service() -> (TestService, Arc<MemoryWorkforce>, Arc<MemoryEnrollments>) {
    let workforce = Arc::new(MemoryWorkforce::default());
    let enrollments = Arc::new(MemoryEnrollments::default());
    let service = InsuranceEnrollmentService::new(
        workforce.clone(),
        enrollments.clone(),
        EligibilityConfig::default(),
    );
    (service, workforce, enrollments)
}

pub(super) fn router_with_service(service: TestService) -> Router {
    insurance_router(Arc::new(service))
}

pub(super) fn engine() -> EligibilityEngine {
    EligibilityEngine::new(EligibilityConfig::default())
}

/// Daily worker born 1965-05-10 working 12 full days in March 2025.
pub(super) fn seed_full_month(workforce: &MemoryWorkforce) {
    workforce.add_worker(worker("w-1", "650510-1234567", WorkerType::Daily));
    workforce.add_records(records(
        "w-1",
        month(2025, 3),
        &[3, 4, 5, 6, 7, 10, 11, 12, 13, 14, 17, 18],
        8.0,
        200_000,
    ));
}

#[derive(Default, Clone)]
pub(super) struct MemoryWorkforce {
    workers: Arc<Mutex<HashMap<WorkerId, Worker>>>,
    records: Arc<Mutex<Vec<WorkRecord>>>,
}

impl MemoryWorkforce {
    pub(super) fn add_worker(&self, worker: Worker) {
        self.upsert_worker(worker).expect("insert worker");
    }

    pub(super) fn add_records(&self, records: Vec<WorkRecord>) {
        for record in records {
            self.insert_work_record(record).expect("insert record");
        }
    }
}

impl WorkforceRepository for MemoryWorkforce {
    fn worker(&self, id: &WorkerId) -> Result<Option<Worker>, RepositoryError> {
        let guard = self.workers.lock().expect("workforce mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn upsert_worker(&self, worker: Worker) -> Result<(), RepositoryError> {
        let mut guard = self.workers.lock().expect("workforce mutex poisoned");
        guard.insert(worker.id.clone(), worker);
        Ok(())
    }

    fn work_records(
        &self,
        site: &SiteId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WorkRecord>, RepositoryError> {
        let guard = self.records.lock().expect("workforce mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| &record.site_id == site)
            .filter(|record| record.work_date >= from && record.work_date <= to)
            .cloned()
            .collect())
    }

    fn insert_work_record(&self, record: WorkRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("workforce mutex poisoned");
        if guard.iter().any(|existing| same_key(existing, &record)) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record);
        Ok(())
    }

    fn update_work_record(&self, record: WorkRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("workforce mutex poisoned");
        match guard.iter_mut().find(|existing| same_key(existing, &record)) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

fn same_key(a: &WorkRecord, b: &WorkRecord) -> bool {
    a.worker_id == b.worker_id && a.site_id == b.site_id && a.work_date == b.work_date
}

type EnrollmentKey = (WorkerId, SiteId, YearMonth);

#[derive(Default, Clone)]
pub(super) struct MemoryEnrollments {
    pub(super) rows: Arc<Mutex<BTreeMap<EnrollmentKey, InsuranceEnrollment>>>,
}

impl EnrollmentRepository for MemoryEnrollments {
    fn upsert(
        &self,
        enrollment: InsuranceEnrollment,
    ) -> Result<InsuranceEnrollment, RepositoryError> {
        let mut guard = self.rows.lock().expect("enrollment mutex poisoned");
        let key = (
            enrollment.worker_id.clone(),
            enrollment.site_id.clone(),
            enrollment.year_month,
        );
        guard.insert(key, enrollment.clone());
        Ok(enrollment)
    }

    fn fetch(
        &self,
        worker: &WorkerId,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<Option<InsuranceEnrollment>, RepositoryError> {
        let guard = self.rows.lock().expect("enrollment mutex poisoned");
        Ok(guard
            .get(&(worker.clone(), site.clone(), year_month))
            .cloned())
    }

    fn for_site_month(
        &self,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<Vec<InsuranceEnrollment>, RepositoryError> {
        let guard = self.rows.lock().expect("enrollment mutex poisoned");
        Ok(guard
            .values()
            .filter(|row| &row.site_id == site && row.year_month == year_month)
            .cloned()
            .collect())
    }

    fn history_before(
        &self,
        site: &SiteId,
        before: YearMonth,
    ) -> Result<Vec<InsuranceEnrollment>, RepositoryError> {
        let guard = self.rows.lock().expect("enrollment mutex poisoned");
        Ok(guard
            .values()
            .filter(|row| &row.site_id == site && row.year_month < before)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableEnrollments;

impl EnrollmentRepository for UnavailableEnrollments {
    fn upsert(
        &self,
        _enrollment: InsuranceEnrollment,
    ) -> Result<InsuranceEnrollment, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(
        &self,
        _worker: &WorkerId,
        _site: &SiteId,
        _year_month: YearMonth,
    ) -> Result<Option<InsuranceEnrollment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_site_month(
        &self,
        _site: &SiteId,
        _year_month: YearMonth,
    ) -> Result<Vec<InsuranceEnrollment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn history_before(
        &self,
        _site: &SiteId,
        _before: YearMonth,
    ) -> Result<Vec<InsuranceEnrollment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
