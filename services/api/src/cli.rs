use crate::report::{
    run_eligibility_check, run_eligibility_report, run_payroll_statement, EligibilityCheckArgs,
    MonthArgs, PayrollStatementArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use sitepay::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sitepay",
    about = "Construction site payroll and four-major-insurance eligibility",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Classify insurance eligibility for a single worker or a whole site month
    Eligibility {
        #[command(subcommand)]
        command: EligibilityCommand,
    },
    /// Build payroll statements from CSV exports
    Payroll {
        #[command(subcommand)]
        command: PayrollCommand,
    },
}

#[derive(Subcommand, Debug)]
enum EligibilityCommand {
    /// Evaluate the four insurances for one set of monthly facts
    Check(EligibilityCheckArgs),
    /// Evaluate every worker of a site month from worker and work record exports
    Report(MonthArgs),
}

#[derive(Subcommand, Debug)]
enum PayrollCommand {
    /// Print the monthly deduction statement for a site
    Statement(PayrollStatementArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Worker master CSV loaded into the in-memory store at startup
    #[arg(long)]
    pub(crate) workers: Option<PathBuf>,
    /// Work record CSV loaded into the in-memory store at startup
    #[arg(long)]
    pub(crate) records: Option<PathBuf>,
    /// Site assigned to work record rows without a site column
    #[arg(long)]
    pub(crate) default_site: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Eligibility {
            command: EligibilityCommand::Check(args),
        } => run_eligibility_check(args),
        Command::Eligibility {
            command: EligibilityCommand::Report(args),
        } => run_eligibility_report(args),
        Command::Payroll {
            command: PayrollCommand::Statement(args),
        } => run_payroll_statement(args),
    }
}
