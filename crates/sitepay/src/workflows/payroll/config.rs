use serde::{Deserialize, Serialize};

/// Percentage held as parts per 100,000 so that rates like 3.545% stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(u32);

impl Rate {
    pub const fn per_100k(parts: u32) -> Self {
        Self(parts)
    }

    pub const fn parts(self) -> u32 {
        self.0
    }

    /// Applies the rate and truncates toward zero.
    pub fn apply(self, amount: u64) -> u64 {
        (u128::from(amount) * u128::from(self.0) / 100_000) as u64
    }

    pub fn percent(self) -> f64 {
        f64::from(self.0) / 1_000.0
    }
}

/// Withholding rates and limits for daily-wage payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionConfig {
    /// Daily earned-income deduction before tax.
    pub daily_income_exemption: u64,
    pub income_tax_rate: Rate,
    pub income_tax_credit_rate: Rate,
    /// Computed income tax below this amount is not withheld.
    pub minimum_withholding: u64,
    pub local_tax_rate: Rate,
    pub employment_insurance_rate: Rate,
    pub national_pension_rate: Rate,
    pub pension_income_floor: u64,
    pub pension_income_ceiling: u64,
    pub health_insurance_rate: Rate,
    /// Charged on the health insurance premium, not on wages.
    pub long_term_care_rate: Rate,
    /// Amounts are truncated to a multiple of this unit.
    pub truncation_unit: u64,
}

impl Default for DeductionConfig {
    fn default() -> Self {
        Self {
            daily_income_exemption: 150_000,
            income_tax_rate: Rate::per_100k(6_000),
            income_tax_credit_rate: Rate::per_100k(55_000),
            minimum_withholding: 1_000,
            local_tax_rate: Rate::per_100k(10_000),
            employment_insurance_rate: Rate::per_100k(900),
            national_pension_rate: Rate::per_100k(4_500),
            pension_income_floor: 400_000,
            pension_income_ceiling: 6_370_000,
            health_insurance_rate: Rate::per_100k(3_545),
            long_term_care_rate: Rate::per_100k(12_950),
            truncation_unit: 10,
        }
    }
}

impl DeductionConfig {
    pub(crate) fn truncate(&self, amount: u64) -> u64 {
        if self.truncation_unit <= 1 {
            amount
        } else {
            amount - amount % self.truncation_unit
        }
    }
}
