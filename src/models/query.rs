//! Exact-match query criteria for `Repository::find_by`.
//!
//! Every populated field must match exactly; a default (all-`None`) filter
//! matches every record. Both backends evaluate these as a full scan.

use time::Date;

use super::{FeedbackCategory, FeedbackPriority, FeedbackType, TransactionType};

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationFilter {
    pub slug: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub user_id: Option<String>,
    pub organization_id: Option<String>,
    pub category_id: Option<String>,
    pub kind: Option<TransactionType>,
    pub date: Option<Date>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionCategoryFilter {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackFilter {
    pub kind: Option<FeedbackType>,
    pub priority: Option<FeedbackPriority>,
    pub category: Option<FeedbackCategory>,
    pub actionable: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct FinancialAccountFilter {
    pub organization_id: Option<String>,
}
