#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use sitepay::workflows::import::{WorkRecordImporter, WorkerImporter};
use sitepay::workflows::insurance::{EnrollmentRepository, InsuranceEnrollment};
use sitepay::workflows::workforce::{
    RepositoryError, SiteId, WorkRecord, Worker, WorkerId, WorkforceRepository, YearMonth,
};

pub const WORKERS_CSV: &[u8] = include_bytes!("../../data/workers.csv");
pub const WORK_RECORDS_CSV: &[u8] = include_bytes!("../../data/work_records.csv");

pub fn site() -> SiteId {
    SiteId("site-a".to_string())
}

pub fn march() -> YearMonth {
    YearMonth::new(2025, 3).expect("valid month")
}

pub fn worker_id(raw: &str) -> WorkerId {
    WorkerId(raw.to_string())
}

/// Repositories seeded from the bundled sample site export.
pub fn seeded() -> (Arc<MemoryWorkforce>, Arc<MemoryEnrollments>) {
    let workforce = Arc::new(MemoryWorkforce::default());
    for worker in WorkerImporter::from_reader(WORKERS_CSV).expect("workers import") {
        workforce.upsert_worker(worker).expect("store worker");
    }
    for record in WorkRecordImporter::from_reader(WORK_RECORDS_CSV, None).expect("records import")
    {
        workforce.insert_work_record(record).expect("store record");
    }
    (workforce, Arc::new(MemoryEnrollments::default()))
}

#[derive(Default)]
pub struct MemoryWorkforce {
    workers: Mutex<BTreeMap<WorkerId, Worker>>,
    records: Mutex<Vec<WorkRecord>>,
}

impl MemoryWorkforce {
    pub fn records(&self) -> Vec<WorkRecord> {
        self.records.lock().expect("records mutex").clone()
    }
}

impl WorkforceRepository for MemoryWorkforce {
    fn worker(&self, id: &WorkerId) -> Result<Option<Worker>, RepositoryError> {
        Ok(self.workers.lock().expect("workers mutex").get(id).cloned())
    }

    fn upsert_worker(&self, worker: Worker) -> Result<(), RepositoryError> {
        self.workers
            .lock()
            .expect("workers mutex")
            .insert(worker.id.clone(), worker);
        Ok(())
    }

    fn work_records(
        &self,
        site: &SiteId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WorkRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("records mutex")
            .iter()
            .filter(|record| &record.site_id == site && (from..=to).contains(&record.work_date))
            .cloned()
            .collect())
    }

    fn insert_work_record(&self, record: WorkRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("records mutex");
        if guard.iter().any(|existing| same_day(existing, &record)) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record);
        Ok(())
    }

    fn update_work_record(&self, record: WorkRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("records mutex");
        let slot = guard
            .iter_mut()
            .find(|existing| same_day(existing, &record))
            .ok_or(RepositoryError::NotFound)?;
        *slot = record;
        Ok(())
    }
}

fn same_day(a: &WorkRecord, b: &WorkRecord) -> bool {
    a.worker_id == b.worker_id && a.site_id == b.site_id && a.work_date == b.work_date
}

#[derive(Default)]
pub struct MemoryEnrollments {
    rows: Mutex<Vec<InsuranceEnrollment>>,
}

impl EnrollmentRepository for MemoryEnrollments {
    fn upsert(
        &self,
        enrollment: InsuranceEnrollment,
    ) -> Result<InsuranceEnrollment, RepositoryError> {
        let mut guard = self.rows.lock().expect("enrollment mutex");
        guard.retain(|row| {
            !(row.worker_id == enrollment.worker_id
                && row.site_id == enrollment.site_id
                && row.year_month == enrollment.year_month)
        });
        guard.push(enrollment.clone());
        Ok(enrollment)
    }

    fn fetch(
        &self,
        worker: &WorkerId,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<Option<InsuranceEnrollment>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .expect("enrollment mutex")
            .iter()
            .find(|row| {
                &row.worker_id == worker && &row.site_id == site && row.year_month == year_month
            })
            .cloned())
    }

    fn for_site_month(
        &self,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<Vec<InsuranceEnrollment>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .expect("enrollment mutex")
            .iter()
            .filter(|row| &row.site_id == site && row.year_month == year_month)
            .cloned()
            .collect())
    }

    fn history_before(
        &self,
        site: &SiteId,
        before: YearMonth,
    ) -> Result<Vec<InsuranceEnrollment>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .expect("enrollment mutex")
            .iter()
            .filter(|row| &row.site_id == site && row.year_month < before)
            .cloned()
            .collect())
    }
}
