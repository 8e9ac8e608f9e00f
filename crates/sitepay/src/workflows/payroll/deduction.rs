use chrono::NaiveDate;
use serde::Serialize;

use super::config::DeductionConfig;
use crate::workflows::workforce::{WorkRecord, WorkStatus, WorkerId};

/// Withholding for a single work record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDeduction {
    pub worker_id: WorkerId,
    pub work_date: NaiveDate,
    pub work_hours: f32,
    pub status: WorkStatus,
    pub gross_pay: u64,
    pub income_tax: u64,
    pub local_tax: u64,
    pub employment_insurance: u64,
    pub total_deduction: u64,
    pub net_pay: u64,
}

/// Monthly employee shares withheld on a worker's subtotal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SocialInsuranceShare {
    pub national_pension: u64,
    pub health_insurance: u64,
    pub long_term_care: u64,
}

impl SocialInsuranceShare {
    pub fn total(&self) -> u64 {
        self.national_pension + self.health_insurance + self.long_term_care
    }

    fn saturating_sub(self, other: Self) -> Self {
        Self {
            national_pension: self.national_pension.saturating_sub(other.national_pension),
            health_insurance: self.health_insurance.saturating_sub(other.health_insurance),
            long_term_care: self.long_term_care.saturating_sub(other.long_term_care),
        }
    }
}

/// Applies [`DeductionConfig`] to daily wages.
#[derive(Debug, Clone, Default)]
pub struct DeductionCalculator {
    config: DeductionConfig,
}

impl DeductionCalculator {
    pub fn new(config: DeductionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeductionConfig {
        &self.config
    }

    /// Daily-wage income tax: 6% of the wage above the daily exemption, less the 55% credit.
    pub fn income_tax(&self, daily_wage: u64) -> u64 {
        let config = &self.config;
        let taxable = daily_wage.saturating_sub(config.daily_income_exemption);
        let computed = config.income_tax_rate.apply(taxable);
        let credited = computed - config.income_tax_credit_rate.apply(computed);
        let tax = config.truncate(credited);
        if tax < config.minimum_withholding {
            0
        } else {
            tax
        }
    }

    pub fn local_tax(&self, income_tax: u64) -> u64 {
        self.config
            .truncate(self.config.local_tax_rate.apply(income_tax))
    }

    pub fn employment_insurance(&self, wage: u64) -> u64 {
        self.config
            .truncate(self.config.employment_insurance_rate.apply(wage))
    }

    pub fn deduct(&self, record: &WorkRecord, employment_insured: bool) -> RecordDeduction {
        let gross_pay = record.daily_wage;
        let income_tax = self.income_tax(gross_pay);
        let local_tax = self.local_tax(income_tax);
        let employment_insurance = if employment_insured {
            self.employment_insurance(gross_pay)
        } else {
            0
        };
        let total_deduction = income_tax + local_tax + employment_insurance;

        RecordDeduction {
            worker_id: record.worker_id.clone(),
            work_date: record.work_date,
            work_hours: record.work_hours,
            status: record.status,
            gross_pay,
            income_tax,
            local_tax,
            employment_insurance,
            total_deduction,
            net_pay: gross_pay.saturating_sub(total_deduction),
        }
    }

    /// Pension is charged on the wage clamped to the standard monthly income range.
    pub fn social_insurance(
        &self,
        monthly_wage: u64,
        pension_insured: bool,
        health_insured: bool,
    ) -> SocialInsuranceShare {
        let config = &self.config;
        let mut share = SocialInsuranceShare::default();

        if pension_insured && monthly_wage > 0 {
            let base = monthly_wage.clamp(config.pension_income_floor, config.pension_income_ceiling);
            share.national_pension = config.truncate(config.national_pension_rate.apply(base));
        }

        if health_insured && monthly_wage > 0 {
            let premium = config.health_insurance_rate.apply(monthly_wage);
            share.health_insurance = config.truncate(premium);
            share.long_term_care = config.truncate(config.long_term_care_rate.apply(premium));
        }

        share
    }

    /// Shares still owed for the month once `withheld_wage` has already been charged.
    pub fn remaining_social_insurance(
        &self,
        withheld_wage: u64,
        additional_wage: u64,
        pension_insured: bool,
        health_insured: bool,
    ) -> SocialInsuranceShare {
        let month = self.social_insurance(
            withheld_wage + additional_wage,
            pension_insured,
            health_insured,
        );
        let withheld = self.social_insurance(withheld_wage, pension_insured, health_insured);
        month.saturating_sub(withheld)
    }
}
