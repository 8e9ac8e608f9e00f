use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The four statutory insurances reported for every worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceType {
    NationalPension,
    HealthInsurance,
    EmploymentInsurance,
    IndustrialAccident,
}

impl InsuranceType {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::NationalPension,
            Self::HealthInsurance,
            Self::EmploymentInsurance,
            Self::IndustrialAccident,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NationalPension => "National Pension",
            Self::HealthInsurance => "Health Insurance",
            Self::EmploymentInsurance => "Employment Insurance",
            Self::IndustrialAccident => "Industrial Accident Insurance",
        }
    }

    pub const fn korean_label(self) -> &'static str {
        match self {
            Self::NationalPension => "국민연금",
            Self::HealthInsurance => "건강보험",
            Self::EmploymentInsurance => "고용보험",
            Self::IndustrialAccident => "산재보험",
        }
    }
}

/// Per-insurance status code stored on an enrollment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    AutoRequired,
    AutoExempted,
    ManualRequired,
    ManualExempted,
}

impl CoverageStatus {
    pub const fn automatic(required: bool) -> Self {
        if required {
            Self::AutoRequired
        } else {
            Self::AutoExempted
        }
    }

    pub const fn manual(required: bool) -> Self {
        if required {
            Self::ManualRequired
        } else {
            Self::ManualExempted
        }
    }

    pub const fn is_required(self) -> bool {
        matches!(self, Self::AutoRequired | Self::ManualRequired)
    }

    pub const fn is_manual(self) -> bool {
        matches!(self, Self::ManualRequired | Self::ManualExempted)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AutoRequired => "auto_required",
            Self::AutoExempted => "auto_exempted",
            Self::ManualRequired => "manual_required",
            Self::ManualExempted => "manual_exempted",
        }
    }
}

/// Reporting state of an enrollment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Confirmed,
    Reported,
}

impl EnrollmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Reported => "reported",
        }
    }
}

/// Operator-supplied decisions that take precedence over the automatic rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualOverrides {
    #[serde(default)]
    pub decisions: BTreeMap<InsuranceType, bool>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ManualOverrides {
    pub fn get(&self, insurance: InsuranceType) -> Option<bool> {
        self.decisions.get(&insurance).copied()
    }

    pub fn set(&mut self, insurance: InsuranceType, required: bool) {
        self.decisions.insert(insurance, required);
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}
