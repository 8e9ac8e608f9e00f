use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CoverageStatus, EnrollmentStatus, InsuranceType, ManualOverrides};
use super::eligibility::EligibilityOutcome;
use crate::workflows::workforce::{SiteId, WorkerId, YearMonth};

/// Who confirmed an enrollment row and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationAudit {
    pub confirmed_by: String,
    pub confirmed_at: DateTime<Utc>,
}

/// One worker's enrollment at a site for a month, with the four insurances as sibling fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceEnrollment {
    pub worker_id: WorkerId,
    pub site_id: SiteId,
    pub year_month: YearMonth,
    pub national_pension: CoverageStatus,
    pub health_insurance: CoverageStatus,
    pub employment_insurance: CoverageStatus,
    pub industrial_accident: CoverageStatus,
    pub acquisition_date: Option<NaiveDate>,
    pub loss_date: Option<NaiveDate>,
    #[serde(default)]
    pub manual_reason: Option<String>,
    pub enrollment_status: EnrollmentStatus,
    #[serde(default)]
    pub confirmation: Option<ConfirmationAudit>,
    #[serde(default)]
    pub reasons: BTreeMap<InsuranceType, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrollmentTransitionError {
    #[error("enrollment has been reported and can no longer change")]
    Locked,
    #[error("cannot move enrollment from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
    #[error("loss date {loss} precedes acquisition date {acquisition}")]
    LossBeforeAcquisition {
        loss: NaiveDate,
        acquisition: NaiveDate,
    },
}

impl InsuranceEnrollment {
    pub fn from_outcome(
        outcome: &EligibilityOutcome,
        site_id: SiteId,
        year_month: YearMonth,
        acquisition_date: Option<NaiveDate>,
    ) -> Self {
        let status_of = |insurance| {
            outcome
                .decision(insurance)
                .map(|decision| decision.status)
                .unwrap_or(CoverageStatus::AutoExempted)
        };

        let reasons = outcome
            .decisions
            .iter()
            .map(|decision| (decision.insurance, decision.reason.clone()))
            .collect();

        Self {
            worker_id: outcome.worker_id.clone(),
            site_id,
            year_month,
            national_pension: status_of(InsuranceType::NationalPension),
            health_insurance: status_of(InsuranceType::HealthInsurance),
            employment_insurance: status_of(InsuranceType::EmploymentInsurance),
            industrial_accident: status_of(InsuranceType::IndustrialAccident),
            acquisition_date,
            loss_date: None,
            manual_reason: None,
            enrollment_status: EnrollmentStatus::Pending,
            confirmation: None,
            reasons,
        }
    }

    pub fn status(&self, insurance: InsuranceType) -> CoverageStatus {
        match insurance {
            InsuranceType::NationalPension => self.national_pension,
            InsuranceType::HealthInsurance => self.health_insurance,
            InsuranceType::EmploymentInsurance => self.employment_insurance,
            InsuranceType::IndustrialAccident => self.industrial_accident,
        }
    }

    pub fn set_status(&mut self, insurance: InsuranceType, status: CoverageStatus) {
        let slot = match insurance {
            InsuranceType::NationalPension => &mut self.national_pension,
            InsuranceType::HealthInsurance => &mut self.health_insurance,
            InsuranceType::EmploymentInsurance => &mut self.employment_insurance,
            InsuranceType::IndustrialAccident => &mut self.industrial_accident,
        };
        *slot = status;
    }

    /// Manual decisions currently stored on the row, for re-use in a recomputation.
    pub fn manual_overrides(&self) -> ManualOverrides {
        let mut overrides = ManualOverrides {
            decisions: BTreeMap::new(),
            reason: self.manual_reason.clone(),
        };
        for insurance in InsuranceType::ordered() {
            let status = self.status(insurance);
            if status.is_manual() {
                overrides.set(insurance, status.is_required());
            }
        }
        overrides
    }

    /// Covered on `on`: acquired on or before it and not yet lost.
    pub fn is_active_on(&self, on: NaiveDate) -> bool {
        let acquired = self
            .acquisition_date
            .map(|date| date <= on)
            .unwrap_or(false);
        let lost = self.loss_date.map(|date| date <= on).unwrap_or(false);
        acquired && !lost
    }

    pub fn is_locked(&self) -> bool {
        self.enrollment_status == EnrollmentStatus::Reported
    }

    pub fn confirm(
        &mut self,
        confirmed_by: &str,
        confirmed_at: DateTime<Utc>,
    ) -> Result<(), EnrollmentTransitionError> {
        self.transition(EnrollmentStatus::Pending, EnrollmentStatus::Confirmed)?;
        self.confirmation = Some(ConfirmationAudit {
            confirmed_by: confirmed_by.to_string(),
            confirmed_at,
        });
        Ok(())
    }

    pub fn cancel_confirmation(&mut self) -> Result<(), EnrollmentTransitionError> {
        self.transition(EnrollmentStatus::Confirmed, EnrollmentStatus::Pending)?;
        self.confirmation = None;
        Ok(())
    }

    pub fn mark_reported(&mut self) -> Result<(), EnrollmentTransitionError> {
        self.transition(EnrollmentStatus::Confirmed, EnrollmentStatus::Reported)
    }

    pub fn record_loss(&mut self, loss_date: NaiveDate) -> Result<(), EnrollmentTransitionError> {
        if self.is_locked() {
            return Err(EnrollmentTransitionError::Locked);
        }
        if let Some(acquisition) = self.acquisition_date {
            if loss_date < acquisition {
                return Err(EnrollmentTransitionError::LossBeforeAcquisition {
                    loss: loss_date,
                    acquisition,
                });
            }
        }
        self.loss_date = Some(loss_date);
        Ok(())
    }

    fn transition(
        &mut self,
        expected: EnrollmentStatus,
        next: EnrollmentStatus,
    ) -> Result<(), EnrollmentTransitionError> {
        if self.is_locked() {
            return Err(EnrollmentTransitionError::Locked);
        }
        if self.enrollment_status != expected {
            return Err(EnrollmentTransitionError::InvalidTransition {
                from: self.enrollment_status.label(),
                to: next.label(),
            });
        }
        self.enrollment_status = next;
        Ok(())
    }

    /// Splits the row into one record per insurance type, in [`InsuranceType::ordered`] order.
    pub fn flatten(&self) -> Vec<CoverageRecord> {
        InsuranceType::ordered()
            .into_iter()
            .map(|insurance| {
                let status = self.status(insurance);
                CoverageRecord {
                    worker_id: self.worker_id.clone(),
                    site_id: self.site_id.clone(),
                    year_month: self.year_month,
                    insurance,
                    insurance_label: insurance.korean_label(),
                    status,
                    required: status.is_required(),
                    acquisition_date: self.acquisition_date,
                    loss_date: self.loss_date,
                    reason: self.reasons.get(&insurance).cloned(),
                    enrollment_status: self.enrollment_status,
                }
            })
            .collect()
    }
}

/// Display row for one insurance type of an enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageRecord {
    pub worker_id: WorkerId,
    pub site_id: SiteId,
    pub year_month: YearMonth,
    pub insurance: InsuranceType,
    pub insurance_label: &'static str,
    pub status: CoverageStatus,
    pub required: bool,
    pub acquisition_date: Option<NaiveDate>,
    pub loss_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub enrollment_status: EnrollmentStatus,
}
