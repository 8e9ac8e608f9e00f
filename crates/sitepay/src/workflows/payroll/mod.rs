//! Daily-wage withholding, monthly payroll statements and payment.

pub mod config;
pub mod deduction;
pub mod router;
pub mod service;
pub mod statement;

pub use config::{DeductionConfig, Rate};
pub use deduction::{DeductionCalculator, RecordDeduction, SocialInsuranceShare};
pub use router::payroll_router;
pub use service::{PaymentReceipt, PayrollService, PayrollServiceError};
pub use statement::{CoverageLookup, PayrollStatement, PayrollTotals, WorkerPayroll};
