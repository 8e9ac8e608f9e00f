pub mod import;
pub mod insurance;
pub mod payroll;
pub mod workforce;
