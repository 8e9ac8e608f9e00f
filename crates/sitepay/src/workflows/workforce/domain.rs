use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for workers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(pub String);

/// Identifier wrapper for construction sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId(pub String);

/// Employment arrangement; eligibility thresholds differ between daily and other workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerType {
    Daily,
    PartTime,
    Contract,
    Regular,
}

impl WorkerType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::PartTime => "Part-time",
            Self::Contract => "Contract",
            Self::Regular => "Regular",
        }
    }

    pub const fn is_daily(self) -> bool {
        matches!(self, Self::Daily)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResidentNumberError {
    #[error("resident number must contain 13 digits, found {0}")]
    Length(usize),
    #[error("resident number contains a non-digit character")]
    NonDigit,
    #[error("resident number birth date {0} is not a calendar date")]
    BirthDate(String),
}

/// Korean resident registration number (`YYMMDD-GNNNNNN`).
///
/// The seventh digit encodes century, gender and whether the holder is a foreign resident.
/// `Debug` and `masked` never print the serial part.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResidentNumber {
    digits: String,
    birth_date: NaiveDate,
    gender: Gender,
    foreign_resident: bool,
}

impl ResidentNumber {
    pub fn parse(raw: &str) -> Result<Self, ResidentNumberError> {
        let digits: String = raw
            .chars()
            .filter(|ch| !matches!(ch, '-' | ' '))
            .collect();

        if !digits.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(ResidentNumberError::NonDigit);
        }
        if digits.len() != 13 {
            return Err(ResidentNumberError::Length(digits.len()));
        }

        let bytes = digits.as_bytes();
        let digit = |index: usize| u32::from(bytes[index] - b'0');

        let code = digit(6);
        let century = match code {
            9 | 0 => 1800,
            1 | 2 | 5 | 6 => 1900,
            _ => 2000,
        };
        let gender = if code % 2 == 1 {
            Gender::Male
        } else {
            Gender::Female
        };
        let foreign_resident = (5..=8).contains(&code);

        let year = century + (digit(0) * 10 + digit(1)) as i32;
        let month = digit(2) * 10 + digit(3);
        let day = digit(4) * 10 + digit(5);
        let birth_date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| ResidentNumberError::BirthDate(digits[..6].to_string()))?;

        Ok(Self {
            digits,
            birth_date,
            gender,
            foreign_resident,
        })
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn is_foreign_resident(&self) -> bool {
        self.foreign_resident
    }

    /// Completed years of age on `on`.
    pub fn age_on(&self, on: NaiveDate) -> u32 {
        let birth = self.birth_date;
        if on < birth {
            return 0;
        }
        let mut age = on.year() - birth.year();
        if (on.month(), on.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        age.max(0) as u32
    }

    pub fn masked(&self) -> String {
        format!("{}-{}******", &self.digits[..6], &self.digits[6..7])
    }

    pub fn formatted(&self) -> String {
        format!("{}-{}", &self.digits[..6], &self.digits[6..])
    }
}

impl fmt::Debug for ResidentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResidentNumber").field(&self.masked()).finish()
    }
}

impl TryFrom<String> for ResidentNumber {
    type Error = ResidentNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResidentNumber> for String {
    fn from(value: ResidentNumber) -> Self {
        value.formatted()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    pub bank_name: String,
    pub account_number: String,
    pub holder: String,
}

/// Worker master data as registered for a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub resident_number: ResidentNumber,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub nationality_code: Option<String>,
    #[serde(default)]
    pub residence_status_code: Option<String>,
    #[serde(default)]
    pub job_code: Option<String>,
    #[serde(default)]
    pub bank: Option<BankAccount>,
    pub worker_type: WorkerType,
    #[serde(default)]
    pub resignation_date: Option<NaiveDate>,
}

impl Worker {
    pub fn age_on(&self, on: NaiveDate) -> u32 {
        self.resident_number.age_on(on)
    }

    pub fn resigned_before(&self, on: NaiveDate) -> bool {
        self.resignation_date.map(|date| date < on).unwrap_or(false)
    }
}
