use crate::infra::{seed_from_paths, InMemoryEnrollments, InMemoryWorkforce, SeedSummary};
use chrono::{Local, NaiveDate};
use clap::Args;
use sitepay::config::AppConfig;
use sitepay::error::AppError;
use sitepay::workflows::insurance::{
    EligibilityEngine, EligibilityInput, EligibilityOutcome, InsuranceEnrollmentService,
    InsuranceType, ManualOverrides, MonthlyEvaluation,
};
use sitepay::workflows::payroll::{PayrollService, PayrollStatement};
use sitepay::workflows::workforce::{
    format_won, PaymentInfo, PaymentMethod, ResidentNumber, SiteId, WorkerId, WorkerType,
    YearMonth,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EligibilityCheckArgs {
    /// Worker type: daily, part_time, contract or regular
    #[arg(long, value_parser = parse_worker_type, default_value = "daily")]
    pub(crate) worker_type: WorkerType,
    /// Age in completed years. Ignored when --resident-number is given.
    #[arg(long, default_value_t = 40)]
    pub(crate) age: u32,
    /// Resident registration number; the age is derived from it
    #[arg(long, value_parser = parse_resident_number)]
    pub(crate) resident_number: Option<ResidentNumber>,
    /// Month the age is taken in (YYYY-MM). Defaults to the current month.
    #[arg(long, value_parser = crate::infra::parse_year_month)]
    pub(crate) month: Option<YearMonth>,
    /// Wages earned in the month (KRW)
    #[arg(long, default_value_t = 0)]
    pub(crate) monthly_wage: u64,
    /// Distinct days worked in the month
    #[arg(long, default_value_t = 0)]
    pub(crate) work_days: u32,
    /// Hours worked in the month
    #[arg(long, default_value_t = 0.0)]
    pub(crate) work_hours: f32,
    /// Print the outcome as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct MonthArgs {
    /// Worker master CSV export
    #[arg(long)]
    pub(crate) workers: PathBuf,
    /// Daily work record CSV export
    #[arg(long)]
    pub(crate) records: PathBuf,
    /// Site the report covers; also used for rows without a site column
    #[arg(long)]
    pub(crate) site: String,
    /// Reporting month (YYYY-MM)
    #[arg(long, value_parser = crate::infra::parse_year_month)]
    pub(crate) month: YearMonth,
    /// Print the result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PayrollStatementArgs {
    #[command(flatten)]
    pub(crate) month: MonthArgs,
    /// Skip the eligibility pass; only employment insurance is withheld
    #[arg(long)]
    pub(crate) without_enrollment: bool,
    /// Print every work record line under each worker
    #[arg(long)]
    pub(crate) lines: bool,
    /// Confirm registration records and pay the month on this date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) pay_on: Option<NaiveDate>,
}

fn parse_resident_number(raw: &str) -> Result<ResidentNumber, String> {
    ResidentNumber::parse(raw).map_err(|err| err.to_string())
}

fn parse_worker_type(raw: &str) -> Result<WorkerType, String> {
    match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "daily" => Ok(WorkerType::Daily),
        "part_time" => Ok(WorkerType::PartTime),
        "contract" => Ok(WorkerType::Contract),
        "regular" => Ok(WorkerType::Regular),
        other => Err(format!(
            "unknown worker type '{other}' (expected daily, part_time, contract or regular)"
        )),
    }
}

struct Workspace {
    workforce: Arc<InMemoryWorkforce>,
    enrollments: Arc<InMemoryEnrollments>,
    summary: SeedSummary,
}

fn load_workspace(args: &MonthArgs) -> Result<Workspace, AppError> {
    let workforce = Arc::new(InMemoryWorkforce::default());
    let site = SiteId(args.site.clone());
    let summary = seed_from_paths(
        &workforce,
        Some(args.workers.as_path()),
        Some(args.records.as_path()),
        Some(&site),
    )?;
    Ok(Workspace {
        workforce,
        enrollments: Arc::new(InMemoryEnrollments::default()),
        summary,
    })
}

pub(crate) fn run_eligibility_check(args: EligibilityCheckArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let month = args
        .month
        .unwrap_or_else(|| YearMonth::of(Local::now().date_naive()));
    let age = args
        .resident_number
        .as_ref()
        .map(|number| number.age_on(month.first_day()))
        .unwrap_or(args.age);

    let input = EligibilityInput {
        worker_id: WorkerId("cli".to_string()),
        worker_type: args.worker_type,
        age,
        monthly_wage: args.monthly_wage,
        work_days: args.work_days,
        work_hours: args.work_hours,
        overrides: ManualOverrides::default(),
    };
    let outcome = EligibilityEngine::new(config.eligibility).classify(&input);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("Eligibility check ({month})");
    println!(
        "- {} worker, age {}, {} KRW over {} days / {:.1} hours",
        input.worker_type.label(),
        input.age,
        format_won(input.monthly_wage),
        input.work_days,
        input.work_hours
    );
    render_decisions(&outcome, "  ");
    println!("Summary: {}", outcome.summary());
    Ok(())
}

pub(crate) fn run_eligibility_report(args: MonthArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let workspace = load_workspace(&args)?;
    let service = InsuranceEnrollmentService::new(
        workspace.workforce.clone(),
        workspace.enrollments.clone(),
        config.eligibility,
    );
    let site = SiteId(args.site.clone());
    let evaluation = service.evaluate_month(&site, args.month)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
        return Ok(());
    }

    render_evaluation(&evaluation, workspace.summary);
    Ok(())
}

pub(crate) fn run_payroll_statement(args: PayrollStatementArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let workspace = load_workspace(&args.month)?;
    let site = SiteId(args.month.site.clone());
    let month = args.month.month;

    if !args.without_enrollment {
        let insurance = InsuranceEnrollmentService::new(
            workspace.workforce.clone(),
            workspace.enrollments.clone(),
            config.eligibility,
        );
        insurance.evaluate_month(&site, month)?;
    }

    let payroll = PayrollService::new(
        workspace.workforce.clone(),
        workspace.enrollments.clone(),
        config.deductions,
    );

    if let Some(paid_on) = args.pay_on {
        let confirmed = payroll.confirm_records(&site, month)?;
        let receipt = payroll.pay(
            &site,
            month,
            &[],
            PaymentInfo {
                paid_on,
                method: PaymentMethod::BankTransfer,
                memo: None,
            },
        )?;
        if !args.month.json {
            println!(
                "Confirmed {} registration records; paid {} records totalling {} KRW on {}",
                confirmed,
                receipt.paid_records,
                format_won(receipt.net_total),
                paid_on
            );
        }
    }

    let statement = payroll.statement(&site, month)?;
    if args.month.json {
        println!("{}", serde_json::to_string_pretty(&statement)?);
        return Ok(());
    }

    render_statement(&statement, args.lines);
    Ok(())
}

fn render_decisions(outcome: &EligibilityOutcome, indent: &str) {
    for insurance in InsuranceType::ordered() {
        if let Some(decision) = outcome.decision(insurance) {
            println!(
                "{indent}- {} ({}): {} [{}] {}",
                insurance.label(),
                insurance.korean_label(),
                if decision.required { "required" } else { "exempt" },
                decision.status.label(),
                decision.reason
            );
        }
    }
}

fn render_evaluation(evaluation: &MonthlyEvaluation, seeded: SeedSummary) {
    println!(
        "Insurance eligibility report: site {} / {}",
        evaluation.site_id.0, evaluation.year_month
    );
    println!(
        "Loaded {} workers and {} work records",
        seeded.workers, seeded.records
    );
    println!(
        "Buckets: {} new, {} active, {} inactive",
        evaluation.buckets.new_enrollments.len(),
        evaluation.buckets.active.len(),
        evaluation.buckets.inactive.len()
    );

    for worker in &evaluation.workers {
        let current = &worker.history.current;
        println!(
            "\n{} {} | {} | {} days, {:.1} hours, {} KRW{}",
            worker.worker_id.0,
            worker.worker_name,
            worker.bucket.label(),
            current.days,
            current.hours,
            format_won(current.wages),
            if worker.locked { " | reported (locked)" } else { "" }
        );
        if let Some(acquired) = worker.enrollment.acquisition_date {
            println!("  Acquisition date: {acquired}");
        }
        render_decisions(&worker.outcome, "  ");
    }

    if evaluation.loss_candidates.is_empty() {
        println!("\nLoss candidates: none");
    } else {
        println!("\nLoss candidates");
        for candidate in &evaluation.loss_candidates {
            println!(
                "- {} (last enrolled {}): suggested loss date {}",
                candidate.worker_id.0, candidate.last_enrolled_month, candidate.suggested_loss_date
            );
        }
    }
}

fn render_statement(statement: &PayrollStatement, lines: bool) {
    println!(
        "Payroll statement: site {} / {}",
        statement.site_id.0, statement.year_month
    );

    for worker in &statement.workers {
        let subtotal = &worker.subtotal;
        println!(
            "\n{} {} | {} days | gross {} | deductions {} | net {}",
            worker.worker_id.0,
            worker.worker_name.as_deref().unwrap_or("(unregistered)"),
            subtotal.work_days,
            format_won(subtotal.gross_pay),
            format_won(subtotal.total_deduction),
            format_won(subtotal.net_pay)
        );
        println!(
            "  income tax {} | local tax {} | employment {} | pension {} | health {} | long-term care {}",
            format_won(subtotal.income_tax),
            format_won(subtotal.local_tax),
            format_won(subtotal.employment_insurance),
            format_won(subtotal.national_pension),
            format_won(subtotal.health_insurance),
            format_won(subtotal.long_term_care)
        );
        if lines {
            for line in &worker.lines {
                println!(
                    "  - {} | {:.1}h | {} | {} | -{} | {}",
                    line.work_date,
                    line.work_hours,
                    line.status.label(),
                    format_won(line.gross_pay),
                    format_won(line.total_deduction),
                    format_won(line.net_pay)
                );
            }
        }
    }

    let total = &statement.grand_total;
    println!(
        "\nTotal: {} workers | gross {} | deductions {} | net {}",
        statement.workers.len(),
        format_won(total.gross_pay),
        format_won(total.total_deduction),
        format_won(total.net_pay)
    );
}
