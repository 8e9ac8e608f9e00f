use super::enrollment::InsuranceEnrollment;
use crate::workflows::workforce::{RepositoryError, SiteId, WorkerId, YearMonth};

/// Storage abstraction for enrollment rows keyed by worker, site and month.
pub trait EnrollmentRepository: Send + Sync {
    /// Inserts or replaces the row for the enrollment's key.
    fn upsert(
        &self,
        enrollment: InsuranceEnrollment,
    ) -> Result<InsuranceEnrollment, RepositoryError>;
    fn fetch(
        &self,
        worker: &WorkerId,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<Option<InsuranceEnrollment>, RepositoryError>;
    fn for_site_month(
        &self,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<Vec<InsuranceEnrollment>, RepositoryError>;
    /// Every row for `site` with a month strictly before `before`.
    fn history_before(
        &self,
        site: &SiteId,
        before: YearMonth,
    ) -> Result<Vec<InsuranceEnrollment>, RepositoryError>;
}
