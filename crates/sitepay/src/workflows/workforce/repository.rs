use chrono::NaiveDate;

use super::domain::{SiteId, Worker, WorkerId};
use super::records::WorkRecord;

/// Storage abstraction over worker master data and daily work records.
pub trait WorkforceRepository: Send + Sync {
    fn worker(&self, id: &WorkerId) -> Result<Option<Worker>, RepositoryError>;
    fn upsert_worker(&self, worker: Worker) -> Result<(), RepositoryError>;
    /// Records for `site` with `from <= work_date <= to`.
    fn work_records(
        &self,
        site: &SiteId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WorkRecord>, RepositoryError>;
    fn insert_work_record(&self, record: WorkRecord) -> Result<(), RepositoryError>;
    /// Replaces the record keyed by worker, site and work date.
    fn update_work_record(&self, record: WorkRecord) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
