use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::bucketing::{bucket_workers, WorkerBucket, WorkerBuckets};
use super::domain::{EnrollmentStatus, InsuranceType};
use super::eligibility::{EligibilityConfig, EligibilityEngine, EligibilityOutcome};
use super::enrollment::{CoverageRecord, EnrollmentTransitionError, InsuranceEnrollment};
use super::repository::EnrollmentRepository;
use crate::workflows::workforce::{
    RepositoryError, SiteId, WorkHistory, WorkHistoryAggregator, WorkerId, WorkforceRepository,
    YearMonth,
};

/// Service composing the aggregator, bucketing, eligibility engine and repositories.
pub struct InsuranceEnrollmentService<W, E> {
    workforce: Arc<W>,
    enrollments: Arc<E>,
    engine: Arc<EligibilityEngine>,
}

/// Per-worker result of a monthly evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerEvaluation {
    pub worker_id: WorkerId,
    pub worker_name: String,
    pub bucket: WorkerBucket,
    pub history: WorkHistory,
    pub outcome: EligibilityOutcome,
    pub enrollment: InsuranceEnrollment,
    /// The stored row was already reported and was not rewritten.
    pub locked: bool,
}

/// Enrolled worker with no work this month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LossCandidate {
    pub worker_id: WorkerId,
    pub last_enrolled_month: YearMonth,
    pub acquisition_date: Option<NaiveDate>,
    pub suggested_loss_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyEvaluation {
    pub site_id: SiteId,
    pub year_month: YearMonth,
    pub buckets: WorkerBuckets,
    pub workers: Vec<WorkerEvaluation>,
    pub loss_candidates: Vec<LossCandidate>,
}

impl<W, E> InsuranceEnrollmentService<W, E>
where
    W: WorkforceRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    pub fn new(workforce: Arc<W>, enrollments: Arc<E>, config: EligibilityConfig) -> Self {
        Self {
            workforce,
            enrollments,
            engine: Arc::new(EligibilityEngine::new(config)),
        }
    }

    pub fn engine(&self) -> &EligibilityEngine {
        &self.engine
    }

    /// Classify every worker at `site` for `year_month` and persist the enrollment rows.
    pub fn evaluate_month(
        &self,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<MonthlyEvaluation, EnrollmentServiceError> {
        let histories = self.histories(site, year_month)?;
        let enrolled = self.active_enrollments(site, year_month)?;

        let worked = histories
            .values()
            .filter(|history| !history.current.is_empty())
            .map(|history| &history.worker_id);
        let buckets = bucket_workers(worked, enrolled.keys());

        let mut workers = Vec::new();
        let groups = [
            (WorkerBucket::NewEnrollment, &buckets.new_enrollments),
            (WorkerBucket::Active, &buckets.active),
        ];
        for (bucket, ids) in groups {
            for worker_id in ids {
                let history = histories
                    .get(worker_id)
                    .cloned()
                    .unwrap_or_else(|| WorkHistory::empty(worker_id.clone()));
                let evaluation = self.evaluate_worker(
                    site,
                    year_month,
                    bucket,
                    history,
                    enrolled.get(worker_id),
                )?;
                workers.push(evaluation);
            }
        }

        let loss_candidates = buckets
            .inactive
            .iter()
            .filter_map(|worker_id| {
                let enrollment = enrolled.get(worker_id)?;
                let suggested = histories
                    .get(worker_id)
                    .and_then(WorkHistory::suggested_loss_date)
                    .unwrap_or_else(|| year_month.first_day());
                let suggested_loss_date = match enrollment.acquisition_date {
                    Some(acquired) if acquired > suggested => acquired,
                    _ => suggested,
                };
                Some(LossCandidate {
                    worker_id: worker_id.clone(),
                    last_enrolled_month: enrollment.year_month,
                    acquisition_date: enrollment.acquisition_date,
                    suggested_loss_date,
                })
            })
            .collect();

        info!(
            site = %site.0,
            %year_month,
            new = buckets.new_enrollments.len(),
            active = buckets.active.len(),
            inactive = buckets.inactive.len(),
            "monthly insurance evaluation complete"
        );

        Ok(MonthlyEvaluation {
            site_id: site.clone(),
            year_month,
            buckets,
            workers,
            loss_candidates,
        })
    }

    /// Set (`Some`) or clear (`None`) the manual decision for one insurance type.
    pub fn set_manual_override(
        &self,
        site: &SiteId,
        year_month: YearMonth,
        worker_id: &WorkerId,
        insurance: InsuranceType,
        required: Option<bool>,
        reason: Option<String>,
    ) -> Result<InsuranceEnrollment, EnrollmentServiceError> {
        let mut enrollment = self.require_enrollment(site, year_month, worker_id)?;
        if enrollment.is_locked() {
            return Err(EnrollmentTransitionError::Locked.into());
        }

        let mut overrides = enrollment.manual_overrides();
        match required {
            Some(required) => overrides.set(insurance, required),
            None => {
                overrides.decisions.remove(&insurance);
            }
        }
        if reason.is_some() {
            overrides.reason = reason;
        }

        let worker = self
            .workforce
            .worker(worker_id)?
            .ok_or_else(|| EnrollmentServiceError::WorkerNotFound(worker_id.0.clone()))?;
        let history = self
            .histories(site, year_month)?
            .remove(worker_id)
            .unwrap_or_else(|| WorkHistory::empty(worker_id.clone()));

        let manual_reason = if overrides.is_empty() {
            None
        } else {
            overrides.reason.clone()
        };
        let outcome = self
            .engine
            .classify_history(&worker, &history, year_month, overrides);
        for decision in &outcome.decisions {
            enrollment.set_status(decision.insurance, decision.status);
            enrollment
                .reasons
                .insert(decision.insurance, decision.reason.clone());
        }
        enrollment.manual_reason = manual_reason;

        if enrollment.enrollment_status == EnrollmentStatus::Confirmed {
            enrollment.cancel_confirmation()?;
            debug!(worker = %worker_id.0, "override reopened a confirmed enrollment");
        }

        info!(
            site = %site.0,
            %year_month,
            worker = %worker_id.0,
            insurance = insurance.label(),
            ?required,
            "manual override applied"
        );

        Ok(self.enrollments.upsert(enrollment)?)
    }

    pub fn confirm(
        &self,
        site: &SiteId,
        year_month: YearMonth,
        worker_id: &WorkerId,
        confirmed_by: &str,
        confirmed_at: DateTime<Utc>,
    ) -> Result<InsuranceEnrollment, EnrollmentServiceError> {
        let mut enrollment = self.require_enrollment(site, year_month, worker_id)?;
        enrollment.confirm(confirmed_by, confirmed_at)?;
        info!(worker = %worker_id.0, %year_month, confirmed_by, "enrollment confirmed");
        Ok(self.enrollments.upsert(enrollment)?)
    }

    pub fn cancel_confirmation(
        &self,
        site: &SiteId,
        year_month: YearMonth,
        worker_id: &WorkerId,
    ) -> Result<InsuranceEnrollment, EnrollmentServiceError> {
        let mut enrollment = self.require_enrollment(site, year_month, worker_id)?;
        enrollment.cancel_confirmation()?;
        info!(worker = %worker_id.0, %year_month, "enrollment confirmation cancelled");
        Ok(self.enrollments.upsert(enrollment)?)
    }

    pub fn mark_reported(
        &self,
        site: &SiteId,
        year_month: YearMonth,
        worker_id: &WorkerId,
    ) -> Result<InsuranceEnrollment, EnrollmentServiceError> {
        let mut enrollment = self.require_enrollment(site, year_month, worker_id)?;
        enrollment.mark_reported()?;
        info!(worker = %worker_id.0, %year_month, "enrollment reported");
        Ok(self.enrollments.upsert(enrollment)?)
    }

    /// Record the loss of coverage for a worker who stopped working at the site.
    ///
    /// When no row exists for `year_month`, the most recent earlier row is carried forward.
    pub fn record_loss(
        &self,
        site: &SiteId,
        year_month: YearMonth,
        worker_id: &WorkerId,
        loss_date: NaiveDate,
    ) -> Result<InsuranceEnrollment, EnrollmentServiceError> {
        let mut enrollment = match self.enrollments.fetch(worker_id, site, year_month)? {
            Some(enrollment) => enrollment,
            None => {
                let previous = self
                    .latest_before(site, year_month)?
                    .remove(worker_id)
                    .ok_or_else(|| EnrollmentServiceError::EnrollmentNotFound {
                        worker: worker_id.0.clone(),
                        site: site.0.clone(),
                        year_month,
                    })?;
                InsuranceEnrollment {
                    year_month,
                    enrollment_status: EnrollmentStatus::Pending,
                    confirmation: None,
                    ..previous
                }
            }
        };

        enrollment.record_loss(loss_date)?;
        info!(worker = %worker_id.0, %year_month, %loss_date, "coverage loss recorded");
        Ok(self.enrollments.upsert(enrollment)?)
    }

    /// Flattened per-insurance rows for display, ordered by worker.
    pub fn coverage(
        &self,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<Vec<CoverageRecord>, EnrollmentServiceError> {
        let mut rows = self.enrollments.for_site_month(site, year_month)?;
        rows.sort_by(|a, b| a.worker_id.cmp(&b.worker_id));
        Ok(rows.iter().flat_map(InsuranceEnrollment::flatten).collect())
    }

    fn evaluate_worker(
        &self,
        site: &SiteId,
        year_month: YearMonth,
        bucket: WorkerBucket,
        history: WorkHistory,
        previous: Option<&InsuranceEnrollment>,
    ) -> Result<WorkerEvaluation, EnrollmentServiceError> {
        let worker_id = history.worker_id.clone();
        let worker = self
            .workforce
            .worker(&worker_id)?
            .ok_or_else(|| EnrollmentServiceError::WorkerNotFound(worker_id.0.clone()))?;
        if worker.resigned_before(year_month.first_day()) {
            warn!(worker = %worker_id.0, "work recorded after resignation date");
        }

        let existing = self.enrollments.fetch(&worker_id, site, year_month)?;
        let overrides = existing
            .as_ref()
            .map(InsuranceEnrollment::manual_overrides)
            .unwrap_or_default();
        let outcome = self
            .engine
            .classify_history(&worker, &history, year_month, overrides);

        if let Some(locked) = existing.as_ref().filter(|row| row.is_locked()) {
            debug!(worker = %worker_id.0, "reported enrollment left untouched");
            return Ok(WorkerEvaluation {
                worker_id,
                worker_name: worker.name,
                bucket,
                history,
                outcome,
                enrollment: locked.clone(),
                locked: true,
            });
        }

        let acquisition_date = existing
            .as_ref()
            .and_then(|row| row.acquisition_date)
            .or_else(|| previous.and_then(|row| row.acquisition_date))
            .or_else(|| history.suggested_acquisition_date());

        let mut enrollment =
            InsuranceEnrollment::from_outcome(&outcome, site.clone(), year_month, acquisition_date);

        if let Some(existing) = existing {
            let unchanged = InsuranceType::ordered()
                .into_iter()
                .all(|insurance| existing.status(insurance) == enrollment.status(insurance));
            enrollment.manual_reason = existing.manual_reason;
            enrollment.loss_date = existing.loss_date;
            if unchanged {
                enrollment.enrollment_status = existing.enrollment_status;
                enrollment.confirmation = existing.confirmation;
            } else if existing.enrollment_status == EnrollmentStatus::Confirmed {
                warn!(
                    worker = %worker_id.0,
                    %year_month,
                    "eligibility changed after confirmation; enrollment reopened"
                );
            }
        }

        let enrollment = self.enrollments.upsert(enrollment)?;

        Ok(WorkerEvaluation {
            worker_id,
            worker_name: worker.name,
            bucket,
            history,
            outcome,
            enrollment,
            locked: false,
        })
    }

    fn histories(
        &self,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<BTreeMap<WorkerId, WorkHistory>, RepositoryError> {
        let records = self.workforce.work_records(
            site,
            year_month.previous().first_day(),
            year_month.last_day(),
        )?;
        Ok(WorkHistoryAggregator::new(year_month).aggregate(&records))
    }

    /// Most recent row per worker from months before `year_month`.
    fn latest_before(
        &self,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<BTreeMap<WorkerId, InsuranceEnrollment>, RepositoryError> {
        let mut latest: BTreeMap<WorkerId, InsuranceEnrollment> = BTreeMap::new();
        for row in self.enrollments.history_before(site, year_month)? {
            let newer = latest
                .get(&row.worker_id)
                .map(|current| row.year_month > current.year_month)
                .unwrap_or(true);
            if newer {
                latest.insert(row.worker_id.clone(), row);
            }
        }
        Ok(latest)
    }

    fn active_enrollments(
        &self,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<BTreeMap<WorkerId, InsuranceEnrollment>, RepositoryError> {
        let start = year_month.first_day();
        let mut latest = self.latest_before(site, year_month)?;
        latest.retain(|_, row| row.is_active_on(start));
        Ok(latest)
    }

    fn require_enrollment(
        &self,
        site: &SiteId,
        year_month: YearMonth,
        worker_id: &WorkerId,
    ) -> Result<InsuranceEnrollment, EnrollmentServiceError> {
        self.enrollments
            .fetch(worker_id, site, year_month)?
            .ok_or_else(|| EnrollmentServiceError::EnrollmentNotFound {
                worker: worker_id.0.clone(),
                site: site.0.clone(),
                year_month,
            })
    }
}

/// Error raised by the enrollment service.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Transition(#[from] EnrollmentTransitionError),
    #[error("worker {0} is not registered")]
    WorkerNotFound(String),
    #[error("no enrollment for worker {worker} at site {site} in {year_month}")]
    EnrollmentNotFound {
        worker: String,
        site: String,
        year_month: YearMonth,
    },
}
