use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::storage::Entity;

pub mod query;
pub mod update;

use query::{
    FeedbackFilter, FinancialAccountFilter, OrganizationFilter, TransactionCategoryFilter,
    TransactionFilter, UserFilter,
};
use update::{
    FeedbackPatch, FinancialAccountPatch, OrganizationPatch, TransactionCategoryPatch,
    TransactionPatch, UserPatch,
};

/// Placeholder timestamp for records that have not been persisted yet.
/// `Repository::create` replaces identity and timestamps unconditionally.
fn unassigned() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            email: email.into(),
            created_at: unassigned(),
            updated_at: unassigned(),
        }
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    type Patch = UserPatch;
    type Filter = UserFilter;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn assign(&mut self, id: String, now: OffsetDateTime) {
        self.id = id;
        self.created_at = now;
        self.updated_at = now;
    }

    fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
    }

    fn merge(&mut self, patch: Self::Patch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.email.as_deref().map_or(true, |v| v == self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    /// Unique, URL-safe identifier.
    pub slug: String,
    pub user_id: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Organization {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: Option<String>,
        slug: impl Into<String>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            display_name: display_name.into(),
            description,
            slug: slug.into(),
            user_id,
            created_at: unassigned(),
            updated_at: unassigned(),
        }
    }
}

impl Entity for Organization {
    const TABLE: &'static str = "organizations";
    type Patch = OrganizationPatch;
    type Filter = OrganizationFilter;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn assign(&mut self, id: String, now: OffsetDateTime) {
        self.id = id;
        self.created_at = now;
        self.updated_at = now;
    }

    fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
    }

    fn merge(&mut self, patch: Self::Patch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(display_name) = patch.display_name {
            self.display_name = display_name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(slug) = patch.slug {
            self.slug = slug;
        }
        if let Some(user_id) = patch.user_id {
            self.user_id = Some(user_id);
        }
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.slug.as_deref().map_or(true, |v| v == self.slug)
            && filter
                .user_id
                .as_deref()
                .map_or(true, |v| self.user_id.as_deref() == Some(v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub organization_id: String,
    pub kind: TransactionType,
    /// Positive amount in whole yen.
    pub amount: Decimal,
    pub category_id: String,
    pub description: Option<String>,
    /// Occurrence date, distinct from the record's creation timestamp.
    pub date: Date,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    pub fn new(
        user_id: impl Into<String>,
        organization_id: impl Into<String>,
        kind: TransactionType,
        amount: Decimal,
        category_id: impl Into<String>,
        description: Option<String>,
        date: Date,
    ) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.into(),
            organization_id: organization_id.into(),
            kind,
            amount,
            category_id: category_id.into(),
            description,
            date,
            created_at: unassigned(),
            updated_at: unassigned(),
        }
    }
}

impl Entity for Transaction {
    const TABLE: &'static str = "transactions";
    type Patch = TransactionPatch;
    type Filter = TransactionFilter;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn assign(&mut self, id: String, now: OffsetDateTime) {
        self.id = id;
        self.created_at = now;
        self.updated_at = now;
    }

    fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
    }

    fn merge(&mut self, patch: Self::Patch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.user_id.as_deref().map_or(true, |v| v == self.user_id)
            && filter
                .organization_id
                .as_deref()
                .map_or(true, |v| v == self.organization_id)
            && filter
                .category_id
                .as_deref()
                .map_or(true, |v| v == self.category_id)
            && filter.kind.map_or(true, |v| v == self.kind)
            && filter.date.map_or(true, |v| v == self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCategory {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TransactionCategory {
    pub fn new(name: impl Into<String>, icon: Option<String>, color: Option<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            icon,
            color,
            created_at: unassigned(),
            updated_at: unassigned(),
        }
    }
}

impl Entity for TransactionCategory {
    const TABLE: &'static str = "transaction_categories";
    type Patch = TransactionCategoryPatch;
    type Filter = TransactionCategoryFilter;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn assign(&mut self, id: String, now: OffsetDateTime) {
        self.id = id;
        self.created_at = now;
        self.updated_at = now;
    }

    fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
    }

    fn merge(&mut self, patch: Self::Patch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(icon) = patch.icon {
            self.icon = Some(icon);
        }
        if let Some(color) = patch.color {
            self.color = Some(color);
        }
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.name.as_deref().map_or(true, |v| v == self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Insight,
    Warning,
    Suggestion,
    Achievement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackPriority {
    High,
    Medium,
    Low,
}

impl FeedbackPriority {
    /// Fixed dashboard ordering: high before medium before low.
    pub fn rank(self) -> u8 {
        match self {
            FeedbackPriority::High => 0,
            FeedbackPriority::Medium => 1,
            FeedbackPriority::Low => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Spending,
    Saving,
    Income,
    Budget,
    Goal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiFeedback {
    pub id: String,
    pub kind: FeedbackType,
    pub title: String,
    /// Markdown body rendered by the dashboard.
    pub message: String,
    pub priority: FeedbackPriority,
    pub category: FeedbackCategory,
    pub actionable: Option<bool>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl AiFeedback {
    pub fn new(
        kind: FeedbackType,
        title: impl Into<String>,
        message: impl Into<String>,
        priority: FeedbackPriority,
        category: FeedbackCategory,
    ) -> Self {
        Self {
            id: String::new(),
            kind,
            title: title.into(),
            message: message.into(),
            priority,
            category,
            actionable: None,
            created_at: unassigned(),
            updated_at: unassigned(),
        }
    }
}

impl Entity for AiFeedback {
    const TABLE: &'static str = "feedbacks";
    type Patch = FeedbackPatch;
    type Filter = FeedbackFilter;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn assign(&mut self, id: String, now: OffsetDateTime) {
        self.id = id;
        self.created_at = now;
        self.updated_at = now;
    }

    fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
    }

    fn merge(&mut self, patch: Self::Patch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(message) = patch.message {
            self.message = message;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(actionable) = patch.actionable {
            self.actionable = Some(actionable);
        }
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.kind.map_or(true, |v| v == self.kind)
            && filter.priority.map_or(true, |v| v == self.priority)
            && filter.category.map_or(true, |v| v == self.category)
            && filter
                .actionable
                .map_or(true, |v| self.actionable == Some(v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    CreditCard,
    Investment,
    Other,
}

/// Column-name mapping for bank statement CSV ingestion. Carried as plain
/// data; statement parsing itself lives outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvImportConfig {
    /// First data row; some statements prepend summary lines.
    pub start_row: usize,
    pub columns: CsvColumns,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvColumns {
    pub date: String,
    pub description: String,
    pub description_detail: String,
    pub debit: String,
    pub credit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAccount {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub kind: AccountKind,
    pub config: CsvImportConfig,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl FinancialAccount {
    pub fn new(
        organization_id: impl Into<String>,
        name: impl Into<String>,
        kind: AccountKind,
        config: CsvImportConfig,
    ) -> Self {
        Self {
            id: String::new(),
            organization_id: organization_id.into(),
            name: name.into(),
            kind,
            config,
            created_at: unassigned(),
            updated_at: unassigned(),
        }
    }
}

impl Entity for FinancialAccount {
    const TABLE: &'static str = "financial_accounts";
    type Patch = FinancialAccountPatch;
    type Filter = FinancialAccountFilter;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    fn assign(&mut self, id: String, now: OffsetDateTime) {
        self.id = id;
        self.created_at = now;
        self.updated_at = now;
    }

    fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
    }

    fn merge(&mut self, patch: Self::Patch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(config) = patch.config {
            self.config = config;
        }
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter
            .organization_id
            .as_deref()
            .map_or(true, |v| v == self.organization_id)
    }
}
