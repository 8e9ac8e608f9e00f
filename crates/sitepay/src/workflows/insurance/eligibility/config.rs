use serde::{Deserialize, Serialize};

/// Thresholds for the monthly eligibility rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    pub pension_max_age: u32,
    pub pension_min_monthly_wage: u64,
    pub pension_min_work_days: u32,
    pub pension_min_work_hours: f32,
    pub health_min_work_hours: f32,
    /// Applies to non-daily workers only; daily workers are always covered.
    pub employment_min_work_hours: f32,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            pension_max_age: 60,
            pension_min_monthly_wage: 2_200_000,
            pension_min_work_days: 8,
            pension_min_work_hours: 60.0,
            health_min_work_hours: 60.0,
            employment_min_work_hours: 60.0,
        }
    }
}
