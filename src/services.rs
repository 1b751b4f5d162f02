//! Business-logic wrappers atop the repository contract: uniqueness and
//! referential pre-checks, destructive-operation guards, aggregation and
//! trend reads, and one-time fixture seeding.
//!
//! Services hold repositories resolved from whichever backend was active
//! when the service was constructed; backend lifecycle stays with the
//! `ProviderFactory`.

pub mod feedback;
pub mod financial_account;
pub mod organization;
pub mod transaction;
pub mod user;

pub use feedback::FeedbackService;
pub use financial_account::FinancialAccountService;
pub use organization::OrganizationService;
pub use transaction::{MonthlyTrend, TransactionService, TransactionSummary};
pub use user::UserService;
