use super::super::domain::InsuranceType;
use super::config::EligibilityConfig;
use super::EligibilityInput;
use crate::workflows::workforce::format_won;

/// Automatic result of one insurance rule before overrides are applied.
pub(crate) struct RuleFinding {
    pub insurance: InsuranceType,
    pub required: bool,
    pub reason: String,
}

pub(crate) fn evaluate_rules(
    input: &EligibilityInput,
    config: &EligibilityConfig,
) -> Vec<RuleFinding> {
    vec![
        national_pension(input, config),
        health_insurance(input, config),
        employment_insurance(input, config),
        industrial_accident(input),
    ]
}

fn national_pension(input: &EligibilityInput, config: &EligibilityConfig) -> RuleFinding {
    if input.age > config.pension_max_age {
        return RuleFinding {
            insurance: InsuranceType::NationalPension,
            required: false,
            reason: format!(
                "age {} exceeds limit {}",
                input.age, config.pension_max_age
            ),
        };
    }

    let mut met = Vec::new();
    let mut missed = Vec::new();

    let wage = format!(
        "monthly wage {} {} {}",
        format_won(input.monthly_wage),
        if input.monthly_wage >= config.pension_min_monthly_wage {
            "meets"
        } else {
            "below"
        },
        format_won(config.pension_min_monthly_wage)
    );
    if input.monthly_wage >= config.pension_min_monthly_wage {
        met.push(wage);
    } else {
        missed.push(wage);
    }

    if input.work_days >= config.pension_min_work_days {
        met.push(format!(
            "{} work days meets {}",
            input.work_days, config.pension_min_work_days
        ));
    } else {
        missed.push(format!(
            "{} work days below {}",
            input.work_days, config.pension_min_work_days
        ));
    }

    if input.work_hours >= config.pension_min_work_hours {
        met.push(format!(
            "{:.1} hours meets {:.1}",
            input.work_hours, config.pension_min_work_hours
        ));
    } else {
        missed.push(format!(
            "{:.1} hours below {:.1}",
            input.work_hours, config.pension_min_work_hours
        ));
    }

    if met.is_empty() {
        RuleFinding {
            insurance: InsuranceType::NationalPension,
            required: false,
            reason: missed.join(", "),
        }
    } else {
        RuleFinding {
            insurance: InsuranceType::NationalPension,
            required: true,
            reason: format!(
                "age {} within limit {}; {}",
                input.age,
                config.pension_max_age,
                met.join(", ")
            ),
        }
    }
}

fn health_insurance(input: &EligibilityInput, config: &EligibilityConfig) -> RuleFinding {
    let required = input.work_hours >= config.health_min_work_hours;
    RuleFinding {
        insurance: InsuranceType::HealthInsurance,
        required,
        reason: format!(
            "{:.1} hours {} monthly minimum {:.1}",
            input.work_hours,
            if required { "meets" } else { "below" },
            config.health_min_work_hours
        ),
    }
}

fn employment_insurance(input: &EligibilityInput, config: &EligibilityConfig) -> RuleFinding {
    if input.worker_type.is_daily() {
        return RuleFinding {
            insurance: InsuranceType::EmploymentInsurance,
            required: true,
            reason: "daily workers are always covered".to_string(),
        };
    }

    let required = input.work_hours >= config.employment_min_work_hours;
    RuleFinding {
        insurance: InsuranceType::EmploymentInsurance,
        required,
        reason: format!(
            "{} worker with {:.1} hours {} monthly minimum {:.1}",
            input.worker_type.label().to_lowercase(),
            input.work_hours,
            if required { "meets" } else { "below" },
            config.employment_min_work_hours
        ),
    }
}

fn industrial_accident(input: &EligibilityInput) -> RuleFinding {
    RuleFinding {
        insurance: InsuranceType::IndustrialAccident,
        required: true,
        reason: format!(
            "{} workers are always covered",
            input.worker_type.label().to_lowercase()
        ),
    }
}
