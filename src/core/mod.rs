//! Core calculation engine: pure functions over records held in memory.

pub mod amortization;
pub mod analytics;
pub mod config;
pub mod error;
pub mod log;
pub mod records;
pub mod window;

// Re-export main types for cleaner imports
pub use amortization::{InstallmentSchedule, InterestType, LoanTerms, compute_schedule};
pub use analytics::{AnalysisOptions, FinancialAnalysis, analyze};
pub use error::FinanceError;
pub use records::{CreditAggregate, Ledger, Snapshot};
