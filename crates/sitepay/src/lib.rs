//! Construction-site payroll and four-major-insurance enrollment.
//!
//! Daily work records flow through the workforce aggregator into the eligibility engine and
//! monthly enrollment rows, and through the deduction calculator into payroll statements.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
