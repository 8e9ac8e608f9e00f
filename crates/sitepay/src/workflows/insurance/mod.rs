//! Four-major-insurance eligibility, worker bucketing and monthly enrollment rows.

pub mod bucketing;
pub mod domain;
pub mod eligibility;
pub mod enrollment;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use bucketing::{bucket_workers, WorkerBucket, WorkerBuckets};
pub use domain::{CoverageStatus, EnrollmentStatus, InsuranceType, ManualOverrides};
pub use eligibility::{
    EligibilityConfig, EligibilityEngine, EligibilityInput, EligibilityOutcome, InsuranceDecision,
};
pub use enrollment::{
    ConfirmationAudit, CoverageRecord, EnrollmentTransitionError, InsuranceEnrollment,
};
pub use repository::EnrollmentRepository;
pub use router::insurance_router;
pub use service::{
    EnrollmentServiceError, InsuranceEnrollmentService, LossCandidate, MonthlyEvaluation,
    WorkerEvaluation,
};
