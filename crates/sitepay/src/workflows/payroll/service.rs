use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::config::DeductionConfig;
use super::deduction::DeductionCalculator;
use super::statement::{CoverageLookup, PayrollStatement};
use crate::workflows::insurance::EnrollmentRepository;
use crate::workflows::workforce::{
    PaymentInfo, RepositoryError, SiteId, WorkRecord, WorkRecordError, WorkStatus, WorkerId,
    WorkforceRepository, YearMonth,
};

/// Confirms, pays and reports on the work records of a site.
pub struct PayrollService<W, E> {
    workforce: Arc<W>,
    enrollments: Arc<E>,
    calculator: DeductionCalculator,
}

/// Result of paying a set of workers for a month.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReceipt {
    pub payment: PaymentInfo,
    pub paid_records: usize,
    pub net_total: u64,
    /// Already-paid records that were left alone.
    pub skipped_records: usize,
    /// Statement covering only the records paid by this call.
    pub statement: PayrollStatement,
}

impl<W, E> PayrollService<W, E>
where
    W: WorkforceRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    pub fn new(workforce: Arc<W>, enrollments: Arc<E>, config: DeductionConfig) -> Self {
        Self {
            workforce,
            enrollments,
            calculator: DeductionCalculator::new(config),
        }
    }

    /// Moves every registration record of the month to normal. Returns how many changed.
    pub fn confirm_records(
        &self,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<usize, PayrollServiceError> {
        let mut confirmed = 0;
        for mut record in self.month_records(site, year_month)? {
            if record.status != WorkStatus::Registration {
                continue;
            }
            record.confirm()?;
            self.workforce.update_work_record(record)?;
            confirmed += 1;
        }
        info!(site = %site.0, %year_month, confirmed, "work records confirmed");
        Ok(confirmed)
    }

    /// Pays the normal-status records of `workers` (every worker when empty).
    ///
    /// Nothing is written if any selected record is still in registration, and records already
    /// marked paid are reverted when a later write fails. Monthly insurance withheld by earlier
    /// payments of the month is not charged again.
    pub fn pay(
        &self,
        site: &SiteId,
        year_month: YearMonth,
        workers: &[WorkerId],
        payment: PaymentInfo,
    ) -> Result<PaymentReceipt, PayrollServiceError> {
        let selected: BTreeSet<&WorkerId> = workers.iter().collect();
        let records: Vec<WorkRecord> = self
            .month_records(site, year_month)?
            .into_iter()
            .filter(|record| selected.is_empty() || selected.contains(&record.worker_id))
            .collect();

        if let Some(draft) = records
            .iter()
            .find(|record| record.status == WorkStatus::Registration)
        {
            warn!(
                worker = %draft.worker_id.0,
                date = %draft.work_date,
                "payment blocked by unconfirmed record"
            );
            return Err(WorkRecordError::NotConfirmed {
                worker: draft.worker_id.0.clone(),
                date: draft.work_date,
            }
            .into());
        }

        let mut withheld_wages: BTreeMap<WorkerId, u64> = BTreeMap::new();
        let mut paid = Vec::new();
        let mut skipped_records = 0;
        for mut record in records {
            if record.status == WorkStatus::Paid {
                *withheld_wages.entry(record.worker_id.clone()).or_default() += record.daily_wage;
                skipped_records += 1;
                continue;
            }
            let written = record
                .mark_paid(payment.clone())
                .map_err(PayrollServiceError::from)
                .and_then(|()| Ok(self.workforce.update_work_record(record.clone())?));
            if let Err(err) = written {
                self.revert_payments(&paid);
                return Err(err);
            }
            paid.push(record);
        }

        let statement = self.build_statement(site, year_month, &paid, &withheld_wages)?;
        info!(
            site = %site.0,
            %year_month,
            paid = paid.len(),
            skipped = skipped_records,
            net_pay = statement.grand_total.net_pay,
            "work records paid"
        );

        Ok(PaymentReceipt {
            payment,
            paid_records: paid.len(),
            net_total: statement.grand_total.net_pay,
            skipped_records,
            statement,
        })
    }

    /// Monthly statement over every record of the site, whatever its status.
    pub fn statement(
        &self,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<PayrollStatement, PayrollServiceError> {
        let records = self.month_records(site, year_month)?;
        self.build_statement(site, year_month, &records, &BTreeMap::new())
    }

    fn revert_payments(&self, paid: &[WorkRecord]) {
        for record in paid {
            let mut record = record.clone();
            let reverted = record
                .revert_payment()
                .map_err(PayrollServiceError::from)
                .and_then(|()| Ok(self.workforce.update_work_record(record.clone())?));
            if let Err(err) = reverted {
                warn!(
                    worker = %record.worker_id.0,
                    date = %record.work_date,
                    error = %err,
                    "failed to revert payment"
                );
            }
        }
    }

    fn build_statement(
        &self,
        site: &SiteId,
        year_month: YearMonth,
        records: &[WorkRecord],
        withheld_wages: &BTreeMap<WorkerId, u64>,
    ) -> Result<PayrollStatement, PayrollServiceError> {
        let enrollments = self.enrollments.for_site_month(site, year_month)?;
        let coverage = CoverageLookup::from_enrollments(&enrollments);

        let mut names = BTreeMap::new();
        for worker_id in records.iter().map(|record| &record.worker_id) {
            if names.contains_key(worker_id) {
                continue;
            }
            if let Some(worker) = self.workforce.worker(worker_id)? {
                names.insert(worker_id.clone(), worker.name);
            }
        }

        Ok(PayrollStatement::build_batch(
            &self.calculator,
            site.clone(),
            year_month,
            records,
            withheld_wages,
            &coverage,
        )
        .with_names(&names))
    }

    fn month_records(
        &self,
        site: &SiteId,
        year_month: YearMonth,
    ) -> Result<Vec<WorkRecord>, RepositoryError> {
        self.workforce
            .work_records(site, year_month.first_day(), year_month.last_day())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PayrollServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Record(#[from] WorkRecordError),
}
