use std::sync::Arc;

use rust_decimal::Decimal;
use time::{Date, Month, OffsetDateTime};

use crate::models::query::{TransactionCategoryFilter, TransactionFilter};
use crate::models::update::{TransactionCategoryPatch, TransactionPatch};
use crate::models::{Transaction, TransactionCategory, TransactionType};
use crate::storage::{DatabaseProvider, Repository, StorageError};

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTrend {
    /// `YYYY-MM` label.
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

pub struct TransactionService {
    transactions: Arc<dyn Repository<Transaction>>,
    categories: Arc<dyn Repository<TransactionCategory>>,
}

impl TransactionService {
    pub fn new(provider: &Arc<dyn DatabaseProvider>) -> Self {
        Self {
            transactions: provider.transactions(),
            categories: provider.transaction_categories(),
        }
    }

    /// Creates a transaction after verifying its category exists. The check
    /// and the insert are not atomic; see the crate docs on read-then-write
    /// sequences.
    pub async fn create_transaction(
        &self,
        draft: Transaction,
    ) -> Result<Transaction, StorageError> {
        self.ensure_category_exists(&draft.category_id).await?;
        self.transactions.create(draft).await
    }

    pub async fn transaction_by_id(&self, id: &str) -> Result<Option<Transaction>, StorageError> {
        self.transactions.find_by_id(id).await
    }

    pub async fn all_transactions(&self) -> Result<Vec<Transaction>, StorageError> {
        self.transactions.find_all().await
    }

    pub async fn transactions_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Transaction>, StorageError> {
        self.transactions
            .find_by(TransactionFilter {
                user_id: Some(user_id.to_string()),
                ..Default::default()
            })
            .await
    }

    pub async fn transactions_by_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<Transaction>, StorageError> {
        self.transactions
            .find_by(TransactionFilter {
                organization_id: Some(organization_id.to_string()),
                ..Default::default()
            })
            .await
    }

    pub async fn transactions_by_type(
        &self,
        kind: TransactionType,
    ) -> Result<Vec<Transaction>, StorageError> {
        self.transactions
            .find_by(TransactionFilter {
                kind: Some(kind),
                ..Default::default()
            })
            .await
    }

    /// Transactions whose occurrence date falls in `start..=end`.
    pub async fn transactions_by_date_range(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<Transaction>, StorageError> {
        let all = self.transactions.find_all().await?;
        Ok(all
            .into_iter()
            .filter(|t| t.date >= start && t.date <= end)
            .collect())
    }

    pub async fn transactions_by_month(
        &self,
        year: i32,
        month: u8,
        organization_id: Option<&str>,
    ) -> Result<Vec<Transaction>, StorageError> {
        let (start, end) = month_bounds(year, month)?;
        let mut matched = self.transactions_by_date_range(start, end).await?;
        if let Some(org) = organization_id {
            matched.retain(|t| t.organization_id == org);
        }
        Ok(matched)
    }

    pub async fn transaction_summary(
        &self,
        organization_id: Option<&str>,
        range: Option<(Date, Date)>,
    ) -> Result<TransactionSummary, StorageError> {
        let mut transactions = match range {
            Some((start, end)) => self.transactions_by_date_range(start, end).await?,
            None => self.transactions.find_all().await?,
        };
        if let Some(org) = organization_id {
            transactions.retain(|t| t.organization_id == org);
        }
        Ok(summarize(&transactions))
    }

    /// Month-by-month income/expense/balance over a trailing window ending
    /// at the current month.
    pub async fn monthly_trends(
        &self,
        organization_id: Option<&str>,
        months_back: u32,
    ) -> Result<Vec<MonthlyTrend>, StorageError> {
        let today = OffsetDateTime::now_utc().date();
        let mut trends = Vec::with_capacity(months_back as usize);
        for back in (0..months_back).rev() {
            let (year, month) = shift_months_back(today.year(), today.month(), back);
            let transactions = self
                .transactions_by_month(year, month as u8, organization_id)
                .await?;
            let summary = summarize(&transactions);
            trends.push(MonthlyTrend {
                month: format!("{year}-{:02}", month as u8),
                income: summary.total_income,
                expense: summary.total_expense,
                balance: summary.balance,
            });
        }
        Ok(trends)
    }

    pub async fn update_transaction(
        &self,
        id: &str,
        patch: TransactionPatch,
    ) -> Result<Transaction, StorageError> {
        if let Some(category_id) = &patch.category_id {
            self.ensure_category_exists(category_id).await?;
        }
        self.transactions.update(id, patch).await
    }

    pub async fn delete_transaction(&self, id: &str) -> Result<(), StorageError> {
        self.transactions.delete(id).await
    }

    pub async fn create_category(
        &self,
        draft: TransactionCategory,
    ) -> Result<TransactionCategory, StorageError> {
        if self.category_by_name(&draft.name).await?.is_some() {
            return Err(StorageError::Conflict(format!(
                "transaction category '{}' already exists",
                draft.name
            )));
        }
        self.categories.create(draft).await
    }

    pub async fn all_categories(&self) -> Result<Vec<TransactionCategory>, StorageError> {
        self.categories.find_all().await
    }

    pub async fn category_by_id(
        &self,
        id: &str,
    ) -> Result<Option<TransactionCategory>, StorageError> {
        self.categories.find_by_id(id).await
    }

    pub async fn update_category(
        &self,
        id: &str,
        patch: TransactionCategoryPatch,
    ) -> Result<TransactionCategory, StorageError> {
        if let Some(name) = &patch.name {
            if let Some(existing) = self.category_by_name(name).await? {
                if existing.id != id {
                    return Err(StorageError::Conflict(format!(
                        "transaction category '{name}' already exists"
                    )));
                }
            }
        }
        self.categories.update(id, patch).await
    }

    /// Deleting a category still referenced by transactions is refused.
    pub async fn delete_category(&self, id: &str) -> Result<(), StorageError> {
        let referencing = self
            .transactions
            .find_by(TransactionFilter {
                category_id: Some(id.to_string()),
                ..Default::default()
            })
            .await?;
        if !referencing.is_empty() {
            return Err(StorageError::Conflict(format!(
                "cannot delete category with existing transactions, found {}",
                referencing.len()
            )));
        }
        self.categories.delete(id).await
    }

    /// First-run seeding: inserts `defaults` only when the category table is
    /// empty. Idempotent through the emptiness check.
    pub async fn seed_categories_if_empty(
        &self,
        defaults: Vec<TransactionCategory>,
    ) -> Result<(), StorageError> {
        if !self.categories.find_all().await?.is_empty() {
            return Ok(());
        }
        for category in defaults {
            self.categories.create(category).await?;
        }
        tracing::debug!("default transaction categories created");
        Ok(())
    }

    async fn category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<TransactionCategory>, StorageError> {
        let mut matched = self
            .categories
            .find_by(TransactionCategoryFilter {
                name: Some(name.to_string()),
            })
            .await?;
        Ok(matched.pop())
    }

    async fn ensure_category_exists(&self, category_id: &str) -> Result<(), StorageError> {
        if self.categories.find_by_id(category_id).await?.is_none() {
            return Err(StorageError::Conflict(format!(
                "transaction category '{category_id}' not found"
            )));
        }
        Ok(())
    }
}

fn summarize(transactions: &[Transaction]) -> TransactionSummary {
    let mut summary = TransactionSummary {
        total_income: Decimal::ZERO,
        total_expense: Decimal::ZERO,
        balance: Decimal::ZERO,
        transaction_count: transactions.len(),
    };
    for transaction in transactions {
        match transaction.kind {
            TransactionType::Income => summary.total_income += transaction.amount,
            TransactionType::Expense => summary.total_expense += transaction.amount,
        }
    }
    summary.balance = summary.total_income - summary.total_expense;
    summary
}

fn month_bounds(year: i32, month: u8) -> Result<(Date, Date), StorageError> {
    let month = Month::try_from(month)
        .map_err(|e| StorageError::Persistence(format!("invalid month: {e}")))?;
    let start = Date::from_calendar_date(year, month, 1)
        .map_err(|e| StorageError::Persistence(format!("invalid date: {e}")))?;
    let end = Date::from_calendar_date(year, month, time::util::days_in_year_month(year, month))
        .map_err(|e| StorageError::Persistence(format!("invalid date: {e}")))?;
    Ok((start, end))
}

fn shift_months_back(year: i32, month: Month, back: u32) -> (i32, Month) {
    let mut year = year;
    let mut month = month;
    for _ in 0..back {
        month = month.previous();
        if month == Month::December {
            year -= 1;
        }
    }
    (year, month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds_handles_leap_february() {
        let (start, end) = month_bounds(2024, 2).unwrap();
        assert_eq!(start, time::macros::date!(2024 - 02 - 01));
        assert_eq!(end, time::macros::date!(2024 - 02 - 29));
    }

    #[test]
    fn test_shift_months_back_crosses_year_boundary() {
        let (year, month) = shift_months_back(2024, Month::February, 3);
        assert_eq!((year, month), (2023, Month::November));
    }
}
