use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::deduction::{DeductionCalculator, RecordDeduction};
use crate::workflows::insurance::{InsuranceEnrollment, InsuranceType};
use crate::workflows::workforce::{SiteId, WorkRecord, WorkerId, YearMonth};

/// Required insurance types per worker, consulted while withholding.
///
/// Workers without an entry are treated as covered by employment insurance only.
#[derive(Debug, Clone, Default)]
pub struct CoverageLookup {
    required: BTreeMap<WorkerId, BTreeSet<InsuranceType>>,
}

impl CoverageLookup {
    pub fn from_enrollments<'a, I>(enrollments: I) -> Self
    where
        I: IntoIterator<Item = &'a InsuranceEnrollment>,
    {
        let mut lookup = Self::default();
        for enrollment in enrollments {
            let required = InsuranceType::ordered()
                .into_iter()
                .filter(|insurance| enrollment.status(*insurance).is_required());
            lookup.insert(enrollment.worker_id.clone(), required);
        }
        lookup
    }

    pub fn insert<I>(&mut self, worker_id: WorkerId, required: I)
    where
        I: IntoIterator<Item = InsuranceType>,
    {
        self.required
            .insert(worker_id, required.into_iter().collect());
    }

    pub fn covers(&self, worker_id: &WorkerId, insurance: InsuranceType) -> bool {
        match self.required.get(worker_id) {
            Some(required) => required.contains(&insurance),
            None => insurance == InsuranceType::EmploymentInsurance,
        }
    }
}

/// Summed amounts for a worker or for a whole statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PayrollTotals {
    pub work_days: u32,
    pub work_hours: f32,
    pub gross_pay: u64,
    pub income_tax: u64,
    pub local_tax: u64,
    pub employment_insurance: u64,
    pub national_pension: u64,
    pub health_insurance: u64,
    pub long_term_care: u64,
    pub total_deduction: u64,
    pub net_pay: u64,
}

impl PayrollTotals {
    fn add_line(&mut self, line: &RecordDeduction) {
        self.work_hours += line.work_hours;
        self.gross_pay += line.gross_pay;
        self.income_tax += line.income_tax;
        self.local_tax += line.local_tax;
        self.employment_insurance += line.employment_insurance;
        self.total_deduction += line.total_deduction;
        self.net_pay += line.net_pay;
    }

    fn add(&mut self, other: &PayrollTotals) {
        self.work_days += other.work_days;
        self.work_hours += other.work_hours;
        self.gross_pay += other.gross_pay;
        self.income_tax += other.income_tax;
        self.local_tax += other.local_tax;
        self.employment_insurance += other.employment_insurance;
        self.national_pension += other.national_pension;
        self.health_insurance += other.health_insurance;
        self.long_term_care += other.long_term_care;
        self.total_deduction += other.total_deduction;
        self.net_pay += other.net_pay;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerPayroll {
    pub worker_id: WorkerId,
    pub worker_name: Option<String>,
    pub lines: Vec<RecordDeduction>,
    pub subtotal: PayrollTotals,
}

/// Monthly payroll for a site: one section per worker plus the grand total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollStatement {
    pub site_id: SiteId,
    pub year_month: YearMonth,
    pub workers: Vec<WorkerPayroll>,
    pub grand_total: PayrollTotals,
}

impl PayrollStatement {
    /// Builds the statement from the records at `site_id` dated within `year_month`.
    pub fn build<'a, I>(
        calculator: &DeductionCalculator,
        site_id: SiteId,
        year_month: YearMonth,
        records: I,
        coverage: &CoverageLookup,
    ) -> Self
    where
        I: IntoIterator<Item = &'a WorkRecord>,
    {
        Self::build_batch(
            calculator,
            site_id,
            year_month,
            records,
            &BTreeMap::new(),
            coverage,
        )
    }

    /// Like [`PayrollStatement::build`] for one payment run of a month.
    ///
    /// `withheld_wages` holds each worker's gross already paid earlier in the month; monthly
    /// insurance on those wages was withheld then, so only the remainder is charged here.
    pub fn build_batch<'a, I>(
        calculator: &DeductionCalculator,
        site_id: SiteId,
        year_month: YearMonth,
        records: I,
        withheld_wages: &BTreeMap<WorkerId, u64>,
        coverage: &CoverageLookup,
    ) -> Self
    where
        I: IntoIterator<Item = &'a WorkRecord>,
    {
        let mut by_worker: BTreeMap<WorkerId, Vec<&WorkRecord>> = BTreeMap::new();
        for record in records {
            if record.site_id == site_id && year_month.contains(record.work_date) {
                by_worker
                    .entry(record.worker_id.clone())
                    .or_default()
                    .push(record);
            }
        }

        let mut grand_total = PayrollTotals::default();
        let workers: Vec<WorkerPayroll> = by_worker
            .into_iter()
            .map(|(worker_id, mut records)| {
                records.sort_by_key(|record| record.work_date);
                let withheld_wage = withheld_wages.get(&worker_id).copied().unwrap_or(0);
                let section =
                    worker_section(calculator, worker_id, &records, withheld_wage, coverage);
                grand_total.add(&section.subtotal);
                section
            })
            .collect();

        Self {
            site_id,
            year_month,
            workers,
            grand_total,
        }
    }

    /// Fills in display names for workers found in `names`.
    pub fn with_names(mut self, names: &BTreeMap<WorkerId, String>) -> Self {
        for section in &mut self.workers {
            if let Some(name) = names.get(&section.worker_id) {
                section.worker_name = Some(name.clone());
            }
        }
        self
    }

    pub fn worker(&self, worker_id: &WorkerId) -> Option<&WorkerPayroll> {
        self.workers
            .iter()
            .find(|section| &section.worker_id == worker_id)
    }
}

fn worker_section(
    calculator: &DeductionCalculator,
    worker_id: WorkerId,
    records: &[&WorkRecord],
    withheld_wage: u64,
    coverage: &CoverageLookup,
) -> WorkerPayroll {
    let employment_insured = coverage.covers(&worker_id, InsuranceType::EmploymentInsurance);
    let lines: Vec<RecordDeduction> = records
        .iter()
        .map(|record| calculator.deduct(record, employment_insured))
        .collect();

    let mut subtotal = PayrollTotals::default();
    let mut days: BTreeSet<NaiveDate> = BTreeSet::new();
    for line in &lines {
        days.insert(line.work_date);
        subtotal.add_line(line);
    }
    subtotal.work_days = days.len() as u32;

    let share = calculator.remaining_social_insurance(
        withheld_wage,
        subtotal.gross_pay,
        coverage.covers(&worker_id, InsuranceType::NationalPension),
        coverage.covers(&worker_id, InsuranceType::HealthInsurance),
    );
    subtotal.national_pension = share.national_pension;
    subtotal.health_insurance = share.health_insurance;
    subtotal.long_term_care = share.long_term_care;
    subtotal.total_deduction += share.total();
    subtotal.net_pay = subtotal.gross_pay.saturating_sub(subtotal.total_deduction);

    WorkerPayroll {
        worker_id,
        worker_name: None,
        lines,
        subtotal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::workforce::WorkStatus;

    fn record(worker: &str, site: &str, day: u32, wage: u64) -> WorkRecord {
        let work_date = NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
        WorkRecord {
            worker_id: WorkerId(worker.to_string()),
            site_id: SiteId(site.to_string()),
            work_date,
            work_hours: 8.0,
            daily_wage: wage,
            status: WorkStatus::Normal,
            registration_month: YearMonth::of(work_date),
            payment: None,
        }
    }

    fn march() -> YearMonth {
        YearMonth::new(2025, 3).unwrap()
    }

    #[test]
    fn groups_lines_by_worker_and_sums_totals() {
        let records = vec![
            record("w-2", "site-a", 5, 250_000),
            record("w-1", "site-a", 4, 200_000),
            record("w-1", "site-a", 3, 200_000),
            record("w-1", "site-b", 3, 200_000),
        ];

        let statement = PayrollStatement::build(
            &DeductionCalculator::default(),
            SiteId("site-a".to_string()),
            march(),
            &records,
            &CoverageLookup::default(),
        );

        assert_eq!(statement.workers.len(), 2);
        let first = &statement.workers[0];
        assert_eq!(first.worker_id, WorkerId("w-1".to_string()));
        assert_eq!(first.lines[0].work_date, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(first.subtotal.work_days, 2);
        assert_eq!(first.subtotal.gross_pay, 400_000);
        assert_eq!(first.subtotal.total_deduction, 6_560);
        assert_eq!(first.subtotal.national_pension, 0);

        assert_eq!(statement.grand_total.gross_pay, 650_000);
        assert_eq!(statement.grand_total.income_tax, 2_700 + 2_700);
        assert_eq!(statement.grand_total.local_tax, 270 + 260);
        assert_eq!(statement.grand_total.employment_insurance, 3_600 + 2_250);
        assert_eq!(
            statement.grand_total.net_pay,
            statement.grand_total.gross_pay - statement.grand_total.total_deduction
        );
    }

    #[test]
    fn monthly_insurance_applies_to_covered_workers_only() {
        let records: Vec<WorkRecord> = (3..=14)
            .map(|day| record("w-1", "site-a", day, 200_000))
            .collect();
        let mut coverage = CoverageLookup::default();
        coverage.insert(
            WorkerId("w-1".to_string()),
            [
                InsuranceType::NationalPension,
                InsuranceType::HealthInsurance,
                InsuranceType::IndustrialAccident,
            ],
        );

        let statement = PayrollStatement::build(
            &DeductionCalculator::default(),
            SiteId("site-a".to_string()),
            march(),
            &records,
            &coverage,
        );
        let section = &statement.workers[0];

        assert_eq!(section.subtotal.gross_pay, 2_400_000);
        assert_eq!(section.subtotal.employment_insurance, 0);
        assert_eq!(section.subtotal.national_pension, 108_000);
        assert_eq!(section.subtotal.health_insurance, 85_080);
        assert_eq!(section.subtotal.long_term_care, 11_010);
        assert_eq!(
            section.subtotal.total_deduction,
            12 * (1_350 + 130) + 108_000 + 85_080 + 11_010
        );
    }

    #[test]
    fn names_are_attached_when_known() {
        let records = vec![record("w-1", "site-a", 3, 200_000)];
        let names = BTreeMap::from([(WorkerId("w-1".to_string()), "Kim".to_string())]);
        let statement = PayrollStatement::build(
            &DeductionCalculator::default(),
            SiteId("site-a".to_string()),
            march(),
            &records,
            &CoverageLookup::default(),
        )
        .with_names(&names);

        let section = statement
            .worker(&WorkerId("w-1".to_string()))
            .expect("section");
        assert_eq!(section.worker_name.as_deref(), Some("Kim"));
    }

    #[test]
    fn later_payment_run_only_charges_the_remaining_monthly_insurance() {
        let records = vec![record("w-1", "site-a", 31, 200_000)];
        let mut coverage = CoverageLookup::default();
        coverage.insert(
            WorkerId("w-1".to_string()),
            [InsuranceType::NationalPension, InsuranceType::HealthInsurance],
        );
        let withheld = BTreeMap::from([(WorkerId("w-1".to_string()), 2_400_000)]);

        let statement = PayrollStatement::build_batch(
            &DeductionCalculator::default(),
            SiteId("site-a".to_string()),
            march(),
            &records,
            &withheld,
            &coverage,
        );
        let subtotal = &statement.workers[0].subtotal;

        assert_eq!(subtotal.gross_pay, 200_000);
        assert_eq!(subtotal.national_pension, 9_000);
        assert_eq!(subtotal.health_insurance, 92_170 - 85_080);
        assert_eq!(subtotal.long_term_care, 11_930 - 11_010);
    }
}

