//! CSV import of workers and daily work records exported from site spreadsheets.

mod mapping;
mod normalizer;
mod parser;

use crate::workflows::workforce::{
    BankAccount, ResidentNumber, ResidentNumberError, SiteId, WorkRecord, WorkStatus, Worker,
    WorkerId, WorkerType, YearMonth,
};
use std::io::Read;
use std::path::Path;

use mapping::Column;
use parser::Row;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingColumn(&'static str),
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
        reason: String,
    },
    ResidentNumber {
        line: u64,
        source: ResidentNumberError,
    },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read import file: {}", err),
            ImportError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            ImportError::MissingColumn(column) => {
                write!(f, "required column `{}` is missing", column)
            }
            ImportError::InvalidField {
                line,
                column,
                value,
                reason,
            } => write!(
                f,
                "line {}: column `{}` has invalid value {:?}: {}",
                line, column, value, reason
            ),
            ImportError::ResidentNumber { line, source } => {
                write!(f, "line {}: {}", line, source)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::ResidentNumber { source, .. } => Some(source),
            ImportError::MissingColumn(_) | ImportError::InvalidField { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads daily work records.
///
/// Rows without a status are imported as registrations; the registration month defaults to
/// the month of the work date.
pub struct WorkRecordImporter;

impl WorkRecordImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        default_site: Option<&SiteId>,
    ) -> Result<Vec<WorkRecord>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, default_site)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        default_site: Option<&SiteId>,
    ) -> Result<Vec<WorkRecord>, ImportError> {
        let required = [
            Column::WorkerId,
            Column::WorkDate,
            Column::WorkHours,
            Column::DailyWage,
        ];
        let (columns, rows) = parser::parse_rows(reader, &required)?;
        if default_site.is_none() && !columns.contains(&Column::SiteId) {
            return Err(ImportError::MissingColumn(Column::SiteId.label()));
        }

        rows.iter()
            .map(|row| work_record(row, default_site))
            .collect()
    }
}

fn work_record(row: &Row, default_site: Option<&SiteId>) -> Result<WorkRecord, ImportError> {
    let worker_id = WorkerId(row.require(Column::WorkerId)?.to_string());
    let site_id = match (row.get(Column::SiteId), default_site) {
        (Some(site), _) => SiteId(site.to_string()),
        (None, Some(site)) => site.clone(),
        (None, None) => row.require(Column::SiteId).map(|site| SiteId(site.to_string()))?,
    };

    let raw_date = row.require(Column::WorkDate)?;
    let work_date = normalizer::parse_date(raw_date)
        .ok_or_else(|| row.invalid(Column::WorkDate, raw_date, "expected a calendar date"))?;

    let raw_hours = row.require(Column::WorkHours)?;
    let work_hours = normalizer::parse_hours(raw_hours)
        .ok_or_else(|| row.invalid(Column::WorkHours, raw_hours, "expected a number of hours"))?;

    let raw_wage = row.require(Column::DailyWage)?;
    let daily_wage = normalizer::parse_amount(raw_wage)
        .ok_or_else(|| row.invalid(Column::DailyWage, raw_wage, "expected an amount in won"))?;

    let status = match row.get(Column::Status) {
        Some(label) => mapping::work_status(label)
            .ok_or_else(|| row.invalid(Column::Status, label, "unknown work status"))?,
        None => WorkStatus::Registration,
    };

    let registration_month = match row.get(Column::RegistrationMonth) {
        Some(raw) => raw
            .parse::<YearMonth>()
            .map_err(|err| row.invalid(Column::RegistrationMonth, raw, &err.to_string()))?,
        None => YearMonth::of(work_date),
    };

    Ok(WorkRecord {
        worker_id,
        site_id,
        work_date,
        work_hours,
        daily_wage,
        status,
        registration_month,
        payment: None,
    })
}

/// Reads worker master data. Workers default to daily employment when no type is given.
pub struct WorkerImporter;

impl WorkerImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Worker>, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Worker>, ImportError> {
        let required = [Column::WorkerId, Column::Name, Column::ResidentNumber];
        let (_, rows) = parser::parse_rows(reader, &required)?;
        rows.iter().map(worker).collect()
    }
}

fn worker(row: &Row) -> Result<Worker, ImportError> {
    let id = WorkerId(row.require(Column::WorkerId)?.to_string());
    let name = row.require(Column::Name)?.to_string();
    let resident_number = ResidentNumber::parse(row.require(Column::ResidentNumber)?)
        .map_err(|source| ImportError::ResidentNumber {
            line: row.line,
            source,
        })?;

    let worker_type = match row.get(Column::WorkerType) {
        Some(label) => mapping::worker_type(label)
            .ok_or_else(|| row.invalid(Column::WorkerType, label, "unknown worker type"))?,
        None => WorkerType::Daily,
    };

    let resignation_date = row
        .get(Column::ResignationDate)
        .map(|raw| {
            normalizer::parse_date(raw)
                .ok_or_else(|| row.invalid(Column::ResignationDate, raw, "expected a calendar date"))
        })
        .transpose()?;

    let bank = match (row.get(Column::BankName), row.get(Column::AccountNumber)) {
        (Some(bank_name), Some(account_number)) => Some(BankAccount {
            bank_name: bank_name.to_string(),
            account_number: account_number.to_string(),
            holder: row
                .get(Column::AccountHolder)
                .unwrap_or(name.as_str())
                .to_string(),
        }),
        _ => None,
    };

    let owned = |column| row.get(column).map(str::to_string);

    Ok(Worker {
        id,
        resident_number,
        contact: owned(Column::Contact),
        nationality_code: owned(Column::NationalityCode),
        residence_status_code: owned(Column::ResidenceStatusCode),
        job_code: owned(Column::JobCode),
        bank,
        worker_type,
        resignation_date,
        name,
    })
}
