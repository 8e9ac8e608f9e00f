use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use sitepay::workflows::import::{ImportError, WorkRecordImporter, WorkerImporter};
use sitepay::workflows::insurance::{EnrollmentRepository, InsuranceEnrollment};
use sitepay::workflows::workforce::{
    RepositoryError, SiteId, WorkRecord, Worker, WorkerId, WorkforceRepository, YearMonth,
};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryWorkforce {
    workers: Arc<Mutex<HashMap<WorkerId, Worker>>>,
    records: Arc<Mutex<Vec<WorkRecord>>>,
}

impl WorkforceRepository for InMemoryWorkforce {
    fn worker(&self, id: &WorkerId) -> Result<Option<Worker>, RepositoryError> {
        Ok(lock(&self.workers)?.get(id).cloned())
    }

    fn upsert_worker(&self, worker: Worker) -> Result<(), RepositoryError> {
        lock(&self.workers)?.insert(worker.id.clone(), worker);
        Ok(())
    }

    fn work_records(
        &self,
        site: &SiteId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WorkRecord>, RepositoryError> {
        Ok(lock(&self.records)?
            .iter()
            .filter(|record| {
                &record.site_id == site && record.work_date >= from && record.work_date <= to
            })
            .cloned()
            .collect())
    }

    fn insert_work_record(&self, record: WorkRecord) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.iter().any(|existing| same_record(existing, &record)) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record);
        Ok(())
    }

    fn update_work_record(&self, record: WorkRecord) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        match guard
            .iter_mut()
            .find(|existing| same_record(existing, &record))
        {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

fn same_record(left: &WorkRecord, right: &WorkRecord) -> bool {
    left.worker_id == right.worker_id
        && left.site_id == right.site_id
        && left.work_date == right.work_date
}

type EnrollmentKey = (WorkerId, SiteId, YearMonth);

#[derive(Default, Clone)]
pub(crate) struct InMemoryEnrollments {
    rows: Arc<Mutex<BTreeMap<EnrollmentKey, InsuranceEnrollment>>>,
}

impl EnrollmentRepository for InMemoryEnrollments {
    fn upsert(
        &self,
        enrollment: InsuranceEnrollment,
    ) -> Result<InsuranceEnrollment, RepositoryError> {
        let key = (
            enrollment.worker_id.clone(),
            enrollment.site_id.clone(),
            enrollment.year_month,
        );
        lock(&self.rows)?.insert(key, enrollment.clone());
        Ok(enrollment)
    }

    fn fetch(
        &self,
        worker: &WorkerId,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<Option<InsuranceEnrollment>, RepositoryError> {
        let key = (worker.clone(), site.clone(), year_month);
        Ok(lock(&self.rows)?.get(&key).cloned())
    }

    fn for_site_month(
        &self,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<Vec<InsuranceEnrollment>, RepositoryError> {
        Ok(lock(&self.rows)?
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
        Ok(lock(&self.rows)?
            .values()
            .filter(|row| &row.site_id == site && row.year_month < before)
            .cloned()
            .collect())
    }
}

/// Failure while loading CSV exports into the in-memory repositories.
#[derive(Debug)]
pub(crate) enum SeedError {
    Import(ImportError),
    Repository(RepositoryError),
}

impl From<ImportError> for SeedError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<RepositoryError> for SeedError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<SeedError> for sitepay::error::AppError {
    fn from(value: SeedError) -> Self {
        match value {
            SeedError::Import(err) => err.into(),
            SeedError::Repository(err) => err.into(),
        }
    }
}

/// Counts of rows loaded by [`seed_from_paths`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SeedSummary {
    pub(crate) workers: usize,
    pub(crate) records: usize,
}

pub(crate) fn seed_from_paths(
    workforce: &InMemoryWorkforce,
    workers: Option<&Path>,
    records: Option<&Path>,
    default_site: Option<&SiteId>,
) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary::default();
    if let Some(path) = workers {
        for worker in WorkerImporter::from_path(path)? {
            workforce.upsert_worker(worker)?;
            summary.workers += 1;
        }
    }
    if let Some(path) = records {
        for record in WorkRecordImporter::from_path(path, default_site)? {
            workforce.insert_work_record(record)?;
            summary.records += 1;
        }
    }
    Ok(summary)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_year_month(raw: &str) -> Result<YearMonth, String> {
    raw.trim()
        .parse::<YearMonth>()
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM ({err})"))
}
