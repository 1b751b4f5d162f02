//! Partial-update patches.
//!
//! A patch carries only the fields a caller may change; `id` and
//! `created_at` have no patch field, so they cannot be overwritten by a
//! merge. Unset fields keep their prior value.

use rust_decimal::Decimal;
use time::Date;

use super::{
    AccountKind, CsvImportConfig, FeedbackCategory, FeedbackPriority, FeedbackType,
    TransactionType,
};

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationPatch {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub kind: Option<TransactionType>,
    pub amount: Option<Decimal>,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub date: Option<Date>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionCategoryPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackPatch {
    pub kind: Option<FeedbackType>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub priority: Option<FeedbackPriority>,
    pub category: Option<FeedbackCategory>,
    pub actionable: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct FinancialAccountPatch {
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub config: Option<CsvImportConfig>,
}
