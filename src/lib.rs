//! Data persistence layer for the Miel household finance tracker.
//!
//! One repository contract, two interchangeable backends: a durable
//! embedded SQLite store and a volatile in-memory store seeded with demo
//! fixtures. A process-wide `ProviderFactory` owns the single active
//! backend, and `SessionManager` drives demo/live mode switches while
//! reporting a tri-state readiness status to consumers.

pub mod config;
pub mod fixtures;
pub mod models;
pub mod provider;
pub mod services;
pub mod session;
pub mod sqlite_storage;
pub mod storage;

// Re-export key types at crate root for convenience
pub use models::{
    AccountKind, AiFeedback, CsvColumns, CsvImportConfig, FeedbackCategory, FeedbackPriority,
    FeedbackType, FinancialAccount, Organization, Transaction, TransactionCategory,
    TransactionType, User,
};
pub use provider::{BackendKind, ProviderFactory};
pub use services::{
    FeedbackService, FinancialAccountService, MonthlyTrend, OrganizationService,
    TransactionService, TransactionSummary, UserService,
};
pub use session::{DatabaseState, ModePreference, SessionManager};
pub use sqlite_storage::{SqliteConfig, SqliteProvider};
pub use storage::{DatabaseProvider, Entity, MemoryProvider, Repository, StorageError};
