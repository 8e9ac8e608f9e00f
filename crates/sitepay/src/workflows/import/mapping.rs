use super::normalizer::normalize_header;
use crate::workflows::workforce::{WorkStatus, WorkerType};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Canonical column understood by the importers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Column {
    WorkerId,
    SiteId,
    WorkDate,
    WorkHours,
    DailyWage,
    Status,
    RegistrationMonth,
    Name,
    ResidentNumber,
    Contact,
    NationalityCode,
    ResidenceStatusCode,
    JobCode,
    BankName,
    AccountNumber,
    AccountHolder,
    WorkerType,
    ResignationDate,
}

impl Column {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::WorkerId => "worker_id",
            Self::SiteId => "site_id",
            Self::WorkDate => "work_date",
            Self::WorkHours => "work_hours",
            Self::DailyWage => "daily_wage",
            Self::Status => "status",
            Self::RegistrationMonth => "registration_month",
            Self::Name => "name",
            Self::ResidentNumber => "resident_number",
            Self::Contact => "contact",
            Self::NationalityCode => "nationality_code",
            Self::ResidenceStatusCode => "residence_status_code",
            Self::JobCode => "job_code",
            Self::BankName => "bank_name",
            Self::AccountNumber => "account_number",
            Self::AccountHolder => "account_holder",
            Self::WorkerType => "worker_type",
            Self::ResignationDate => "resignation_date",
        }
    }
}

static COLUMN_MAP: OnceLock<HashMap<String, Column>> = OnceLock::new();

pub(crate) fn column_for_header(header: &str) -> Option<Column> {
    column_map().get(&normalize_header(header)).copied()
}

fn column_map() -> &'static HashMap<String, Column> {
    COLUMN_MAP.get_or_init(|| {
        const HEADER_TO_COLUMN: &[(&str, Column)] = &[
            ("근로자ID", Column::WorkerId),
            ("근로자 ID", Column::WorkerId),
            ("근로자번호", Column::WorkerId),
            ("Worker ID", Column::WorkerId),
            ("현장ID", Column::SiteId),
            ("현장", Column::SiteId),
            ("현장코드", Column::SiteId),
            ("Site ID", Column::SiteId),
            ("Site", Column::SiteId),
            ("근무일", Column::WorkDate),
            ("근무일자", Column::WorkDate),
            ("작업일", Column::WorkDate),
            ("Work Date", Column::WorkDate),
            ("Date", Column::WorkDate),
            ("근무시간", Column::WorkHours),
            ("작업시간", Column::WorkHours),
            ("Work Hours", Column::WorkHours),
            ("Hours", Column::WorkHours),
            ("일당", Column::DailyWage),
            ("노임", Column::DailyWage),
            ("노무비", Column::DailyWage),
            ("Daily Wage", Column::DailyWage),
            ("Wage", Column::DailyWage),
            ("상태", Column::Status),
            ("Status", Column::Status),
            ("등록월", Column::RegistrationMonth),
            ("귀속월", Column::RegistrationMonth),
            ("Registration Month", Column::RegistrationMonth),
            ("성명", Column::Name),
            ("이름", Column::Name),
            ("Name", Column::Name),
            ("주민등록번호", Column::ResidentNumber),
            ("주민번호", Column::ResidentNumber),
            ("Resident Number", Column::ResidentNumber),
            ("연락처", Column::Contact),
            ("전화번호", Column::Contact),
            ("Contact", Column::Contact),
            ("국적코드", Column::NationalityCode),
            ("국적", Column::NationalityCode),
            ("Nationality Code", Column::NationalityCode),
            ("체류자격", Column::ResidenceStatusCode),
            ("체류자격코드", Column::ResidenceStatusCode),
            ("Residence Status Code", Column::ResidenceStatusCode),
            ("직종코드", Column::JobCode),
            ("직종", Column::JobCode),
            ("Job Code", Column::JobCode),
            ("은행", Column::BankName),
            ("은행명", Column::BankName),
            ("Bank Name", Column::BankName),
            ("Bank", Column::BankName),
            ("계좌번호", Column::AccountNumber),
            ("Account Number", Column::AccountNumber),
            ("예금주", Column::AccountHolder),
            ("Account Holder", Column::AccountHolder),
            ("근로형태", Column::WorkerType),
            ("고용형태", Column::WorkerType),
            ("Worker Type", Column::WorkerType),
            ("퇴직일", Column::ResignationDate),
            ("퇴사일", Column::ResignationDate),
            ("Resignation Date", Column::ResignationDate),
        ];

        HEADER_TO_COLUMN
            .iter()
            .map(|(header, column)| (normalize_header(header), *column))
            .chain(
                ALL_COLUMNS
                    .iter()
                    .map(|column| (column.label().to_string(), *column)),
            )
            .collect()
    })
}

const ALL_COLUMNS: &[Column] = &[
    Column::WorkerId,
    Column::SiteId,
    Column::WorkDate,
    Column::WorkHours,
    Column::DailyWage,
    Column::Status,
    Column::RegistrationMonth,
    Column::Name,
    Column::ResidentNumber,
    Column::Contact,
    Column::NationalityCode,
    Column::ResidenceStatusCode,
    Column::JobCode,
    Column::BankName,
    Column::AccountNumber,
    Column::AccountHolder,
    Column::WorkerType,
    Column::ResignationDate,
];

pub(crate) fn work_status(label: &str) -> Option<WorkStatus> {
    match normalize_header(label).as_str() {
        "등록" | "registration" | "registered" => Some(WorkStatus::Registration),
        "정상" | "normal" | "confirmed" => Some(WorkStatus::Normal),
        "지급" | "지급완료" | "paid" => Some(WorkStatus::Paid),
        _ => None,
    }
}

pub(crate) fn worker_type(label: &str) -> Option<WorkerType> {
    match normalize_header(label).as_str() {
        "일용" | "일용직" | "일용근로자" | "daily" => Some(WorkerType::Daily),
        "단시간" | "단시간근로자" | "part_time" => Some(WorkerType::PartTime),
        "계약" | "계약직" | "contract" => Some(WorkerType::Contract),
        "상용" | "상용직" | "정규직" | "regular" => Some(WorkerType::Regular),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn lookup_for_tests(header: &str) -> Option<&'static str> {
    column_for_header(header).map(Column::label)
}
