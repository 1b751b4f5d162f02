use std::sync::Arc;

use crate::models::query::FinancialAccountFilter;
use crate::models::update::FinancialAccountPatch;
use crate::models::FinancialAccount;
use crate::storage::{DatabaseProvider, Repository, StorageError};

pub struct FinancialAccountService {
    repository: Arc<dyn Repository<FinancialAccount>>,
}

impl FinancialAccountService {
    pub fn new(provider: &Arc<dyn DatabaseProvider>) -> Self {
        Self {
            repository: provider.financial_accounts(),
        }
    }

    pub async fn create_account(
        &self,
        draft: FinancialAccount,
    ) -> Result<FinancialAccount, StorageError> {
        self.repository.create(draft).await
    }

    pub async fn account_by_id(&self, id: &str) -> Result<Option<FinancialAccount>, StorageError> {
        self.repository.find_by_id(id).await
    }

    pub async fn all_accounts(&self) -> Result<Vec<FinancialAccount>, StorageError> {
        self.repository.find_all().await
    }

    pub async fn accounts_by_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<FinancialAccount>, StorageError> {
        self.repository
            .find_by(FinancialAccountFilter {
                organization_id: Some(organization_id.to_string()),
            })
            .await
    }

    pub async fn update_account(
        &self,
        id: &str,
        patch: FinancialAccountPatch,
    ) -> Result<FinancialAccount, StorageError> {
        self.repository.update(id, patch).await
    }

    pub async fn delete_account(&self, id: &str) -> Result<(), StorageError> {
        self.repository.delete(id).await
    }

    /// Inserts the fixture accounts when the table is empty; `create`
    /// re-stamps their identity.
    pub async fn seed_if_empty(
        &self,
        fixtures: Vec<FinancialAccount>,
    ) -> Result<(), StorageError> {
        if !self.repository.find_all().await?.is_empty() {
            return Ok(());
        }
        for account in fixtures {
            self.repository.create(account).await?;
        }
        tracing::debug!("fixture financial accounts created");
        Ok(())
    }
}
