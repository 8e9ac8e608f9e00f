use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{SiteId, WorkerId};
use super::period::YearMonth;

/// Lifecycle of a daily work record from site registration to payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Registration,
    Normal,
    Paid,
}

impl WorkStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Registration => "Registration",
            Self::Normal => "Normal",
            Self::Paid => "Paid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Cash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub paid_on: NaiveDate,
    pub method: PaymentMethod,
    #[serde(default)]
    pub memo: Option<String>,
}

/// One worker's attendance and wage at a site on a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRecord {
    pub worker_id: WorkerId,
    pub site_id: SiteId,
    pub work_date: NaiveDate,
    pub work_hours: f32,
    pub daily_wage: u64,
    pub status: WorkStatus,
    pub registration_month: YearMonth,
    #[serde(default)]
    pub payment: Option<PaymentInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkRecordError {
    #[error("work record for {worker} on {date} is still in registration and cannot be paid")]
    NotConfirmed { worker: String, date: NaiveDate },
    #[error("work record for {worker} on {date} is already paid")]
    AlreadyPaid { worker: String, date: NaiveDate },
    #[error("work record for {worker} on {date} has not been paid")]
    NotPaid { worker: String, date: NaiveDate },
}

impl WorkRecord {
    /// Registration -> Normal. Already confirmed records are left as they are.
    pub fn confirm(&mut self) -> Result<(), WorkRecordError> {
        match self.status {
            WorkStatus::Registration => {
                self.status = WorkStatus::Normal;
                Ok(())
            }
            WorkStatus::Normal => Ok(()),
            WorkStatus::Paid => Err(self.already_paid()),
        }
    }

    pub fn mark_paid(&mut self, payment: PaymentInfo) -> Result<(), WorkRecordError> {
        match self.status {
            WorkStatus::Registration => Err(WorkRecordError::NotConfirmed {
                worker: self.worker_id.0.clone(),
                date: self.work_date,
            }),
            WorkStatus::Paid => Err(self.already_paid()),
            WorkStatus::Normal => {
                self.status = WorkStatus::Paid;
                self.payment = Some(payment);
                Ok(())
            }
        }
    }

    pub fn revert_payment(&mut self) -> Result<(), WorkRecordError> {
        if self.status != WorkStatus::Paid {
            return Err(WorkRecordError::NotPaid {
                worker: self.worker_id.0.clone(),
                date: self.work_date,
            });
        }
        self.status = WorkStatus::Normal;
        self.payment = None;
        Ok(())
    }

    fn already_paid(&self) -> WorkRecordError {
        WorkRecordError::AlreadyPaid {
            worker: self.worker_id.0.clone(),
            date: self.work_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: WorkStatus) -> WorkRecord {
        let work_date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        WorkRecord {
            worker_id: WorkerId("w-1".to_string()),
            site_id: SiteId("site-a".to_string()),
            work_date,
            work_hours: 8.0,
            daily_wage: 180_000,
            status,
            registration_month: YearMonth::of(work_date),
            payment: None,
        }
    }

    fn payment() -> PaymentInfo {
        PaymentInfo {
            paid_on: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            method: PaymentMethod::BankTransfer,
            memo: None,
        }
    }

    #[test]
    fn registration_records_must_be_confirmed_before_payment() {
        let mut draft = record(WorkStatus::Registration);
        assert!(matches!(
            draft.mark_paid(payment()),
            Err(WorkRecordError::NotConfirmed { .. })
        ));

        draft.confirm().expect("confirm");
        draft.mark_paid(payment()).expect("pay");
        assert_eq!(draft.status, WorkStatus::Paid);
        assert_eq!(draft.payment, Some(payment()));
    }

    #[test]
    fn paid_records_reject_second_payment_until_reverted() {
        let mut paid = record(WorkStatus::Normal);
        paid.mark_paid(payment()).unwrap();
        assert!(matches!(
            paid.mark_paid(payment()),
            Err(WorkRecordError::AlreadyPaid { .. })
        ));

        paid.revert_payment().unwrap();
        assert_eq!(paid.status, WorkStatus::Normal);
        assert!(paid.payment.is_none());
        assert!(paid.revert_payment().is_err());
    }
}
