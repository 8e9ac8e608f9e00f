use super::common::*;
use crate::workflows::insurance::{
    CoverageStatus, EligibilityInput, InsuranceType, ManualOverrides,
};
use crate::workflows::workforce::{WorkHistoryAggregator, WorkerType};

fn input(worker_type: WorkerType, age: u32, wage: u64, days: u32, hours: f32) -> EligibilityInput {
    EligibilityInput {
        worker_id: worker_id("w-1"),
        worker_type,
        age,
        monthly_wage: wage,
        work_days: days,
        work_hours: hours,
        overrides: ManualOverrides::default(),
    }
}

#[test]
fn short_stint_daily_worker_needs_only_employment_and_accident_cover() {
    let outcome = engine().classify(&input(WorkerType::Daily, 45, 1_000_000, 5, 40.0));

    assert!(!outcome.is_required(InsuranceType::NationalPension));
    assert!(!outcome.is_required(InsuranceType::HealthInsurance));
    assert!(outcome.is_required(InsuranceType::EmploymentInsurance));
    assert!(outcome.is_required(InsuranceType::IndustrialAccident));
    assert_eq!(
        outcome.summary(),
        "required: Employment Insurance, Industrial Accident Insurance"
    );

    let pension = outcome
        .decision(InsuranceType::NationalPension)
        .expect("pension decision");
    assert_eq!(pension.status, CoverageStatus::AutoExempted);
    assert!(pension.reason.contains("5 work days below 8"));
    assert!(pension.reason.contains("1,000,000"));
}

#[test]
fn pension_requires_any_one_threshold_within_age_limit() {
    let engine = engine();

    let by_days = engine.classify(&input(WorkerType::Daily, 60, 1_600_000, 8, 40.0));
    assert!(by_days.is_required(InsuranceType::NationalPension));

    let by_wage = engine.classify(&input(WorkerType::Daily, 30, 2_200_000, 3, 24.0));
    assert!(by_wage.is_required(InsuranceType::NationalPension));

    let by_hours = engine.classify(&input(WorkerType::Daily, 30, 900_000, 7, 60.0));
    assert!(by_hours.is_required(InsuranceType::NationalPension));
    assert!(by_hours.is_required(InsuranceType::HealthInsurance));
}

#[test]
fn pension_is_exempt_above_age_limit() {
    let outcome = engine().classify(&input(WorkerType::Daily, 61, 4_000_000, 20, 160.0));
    let pension = outcome
        .decision(InsuranceType::NationalPension)
        .expect("pension decision");

    assert!(!pension.required);
    assert_eq!(pension.reason, "age 61 exceeds limit 60");
    assert!(outcome.is_required(InsuranceType::HealthInsurance));
}

#[test]
fn employment_insurance_for_non_daily_workers_follows_hours() {
    let engine = engine();
    let short = engine.classify(&input(WorkerType::PartTime, 35, 800_000, 10, 59.5));
    assert!(!short.is_required(InsuranceType::EmploymentInsurance));
    assert!(short.is_required(InsuranceType::IndustrialAccident));

    let full = engine.classify(&input(WorkerType::Regular, 35, 3_000_000, 22, 176.0));
    assert!(full.is_required(InsuranceType::EmploymentInsurance));
}

#[test]
fn manual_overrides_win_over_automatic_findings() {
    let mut facts = input(WorkerType::Daily, 45, 1_000_000, 5, 40.0);
    facts
        .overrides
        .set(InsuranceType::NationalPension, true);
    facts
        .overrides
        .set(InsuranceType::EmploymentInsurance, false);
    facts.overrides.reason = Some("voluntary pension enrollment".to_string());

    let outcome = engine().classify(&facts);
    let pension = outcome
        .decision(InsuranceType::NationalPension)
        .expect("pension decision");
    assert_eq!(pension.status, CoverageStatus::ManualRequired);
    assert!(pension
        .reason
        .starts_with("manual override: voluntary pension enrollment (automatic:"));

    let employment = outcome
        .decision(InsuranceType::EmploymentInsurance)
        .expect("employment decision");
    assert_eq!(employment.status, CoverageStatus::ManualExempted);
    assert!(!employment.required);

    let health = outcome
        .decision(InsuranceType::HealthInsurance)
        .expect("health decision");
    assert_eq!(health.status, CoverageStatus::AutoExempted);
}

#[test]
fn history_classification_takes_age_on_first_day_of_month() {
    let veteran = worker("w-1", "640315-1234567", WorkerType::Daily);
    let march = month(2025, 3);
    let april = month(2025, 4);

    let mut all = records("w-1", march, &[3, 4, 5, 6, 7, 10, 11, 12], 8.0, 180_000);
    all.extend(records("w-1", april, &[1, 2, 3, 4, 7, 8, 9, 10], 8.0, 180_000));

    let march_history = WorkHistoryAggregator::new(march).aggregate(&all);
    let march_outcome = engine().classify_history(
        &veteran,
        &march_history[&worker_id("w-1")],
        march,
        ManualOverrides::default(),
    );
    assert!(march_outcome.is_required(InsuranceType::NationalPension));

    let april_history = WorkHistoryAggregator::new(april).aggregate(&all);
    let april_outcome = engine().classify_history(
        &veteran,
        &april_history[&worker_id("w-1")],
        april,
        ManualOverrides::default(),
    );
    assert!(!april_outcome.is_required(InsuranceType::NationalPension));
}
