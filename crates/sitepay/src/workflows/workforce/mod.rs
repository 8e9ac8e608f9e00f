//! Worker master data, daily work records and their monthly aggregation.

pub mod domain;
pub mod history;
pub mod money;
pub mod period;
pub mod records;
pub mod repository;

pub use domain::{
    BankAccount, Gender, ResidentNumber, ResidentNumberError, SiteId, Worker, WorkerId, WorkerType,
};
pub use history::{MonthlyWork, WorkHistory, WorkHistoryAggregator};
pub use money::format_won;
pub use period::{YearMonth, YearMonthError};
pub use records::{PaymentInfo, PaymentMethod, WorkRecord, WorkRecordError, WorkStatus};
pub use repository::{RepositoryError, WorkforceRepository};
