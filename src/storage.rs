use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::fixtures;
use crate::models::{
    AiFeedback, FinancialAccount, Organization, Transaction, TransactionCategory, User,
};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{table} record not found: {id}")]
    NotFound { table: &'static str, id: String },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("backend not initialized, call initialize() first")]
    NotInitialized,
    #[error("unsupported backend: {0}")]
    Unsupported(String),
}

impl StorageError {
    pub fn not_found(table: &'static str, id: &str) -> Self {
        StorageError::NotFound {
            table,
            id: id.to_string(),
        }
    }
}

/// A stored record: opaque string id plus creation/update timestamps, all
/// assigned by the repository, never by the caller.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;

    /// Typed partial update; merged over an existing record field by field.
    /// `id` and `created_at` have no patch field and stay immutable.
    type Patch: Clone + Send + Sync + 'static;

    /// Typed exact-match criteria; a default filter matches everything.
    type Filter: Default + Clone + Send + Sync + 'static;

    fn id(&self) -> &str;
    fn created_at(&self) -> OffsetDateTime;
    fn assign(&mut self, id: String, now: OffsetDateTime);
    fn touch(&mut self, now: OffsetDateTime);
    fn merge(&mut self, patch: Self::Patch);
    fn matches(&self, filter: &Self::Filter) -> bool;
}

/// Per-table CRUD contract, identical across backends. Ordering of
/// `find_all`/`find_by` results is unspecified; callers sort when it matters.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Persists `record` with a fresh id and timestamps, discarding any
    /// caller-supplied identity.
    async fn create(&self, record: T) -> Result<T, StorageError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<T>, StorageError>;
    async fn find_all(&self) -> Result<Vec<T>, StorageError>;
    async fn find_by(&self, filter: T::Filter) -> Result<Vec<T>, StorageError>;
    async fn update(&self, id: &str, patch: T::Patch) -> Result<T, StorageError>;
    async fn delete(&self, id: &str) -> Result<(), StorageError>;
}

/// A concrete storage engine owning one repository per table.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    async fn initialize(&self) -> Result<(), StorageError>;
    async fn close(&self) -> Result<(), StorageError>;

    fn users(&self) -> Arc<dyn Repository<User>>;
    fn organizations(&self) -> Arc<dyn Repository<Organization>>;
    fn transactions(&self) -> Arc<dyn Repository<Transaction>>;
    fn transaction_categories(&self) -> Arc<dyn Repository<TransactionCategory>>;
    fn feedbacks(&self) -> Arc<dyn Repository<AiFeedback>>;
    fn financial_accounts(&self) -> Arc<dyn Repository<FinancialAccount>>;
}

impl std::fmt::Debug for dyn DatabaseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn DatabaseProvider")
    }
}

pub(crate) fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

/// Volatile keyed collection for one table. Synchronous in effect, but
/// exposed through the same async contract as the durable backend.
pub struct MemoryRepository<T: Entity> {
    rows: RwLock<HashMap<String, T>>,
    ready: Arc<AtomicBool>,
}

impl<T: Entity> MemoryRepository<T> {
    fn new(ready: Arc<AtomicBool>) -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            ready,
        }
    }

    fn ensure_ready(&self) -> Result<(), StorageError> {
        if self.ready.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::NotInitialized)
        }
    }

    /// Replaces the table contents with fixture records, keeping their ids
    /// and timestamps as-is.
    fn load(&self, records: Vec<T>) {
        let mut rows = self.rows.write().unwrap();
        rows.clear();
        for record in records {
            rows.insert(record.id().to_string(), record);
        }
    }

    fn clear(&self) {
        self.rows.write().unwrap().clear();
    }

    /// Debug helper, not part of the repository contract.
    pub fn snapshot(&self) -> Vec<T> {
        self.rows.read().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn create(&self, record: T) -> Result<T, StorageError> {
        self.ensure_ready()?;
        let mut record = record;
        record.assign(fresh_id(), OffsetDateTime::now_utc());
        self.rows
            .write()
            .unwrap()
            .insert(record.id().to_string(), record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<T>, StorageError> {
        self.ensure_ready()?;
        Ok(self.rows.read().unwrap().get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<T>, StorageError> {
        self.ensure_ready()?;
        Ok(self.rows.read().unwrap().values().cloned().collect())
    }

    async fn find_by(&self, filter: T::Filter) -> Result<Vec<T>, StorageError> {
        self.ensure_ready()?;
        Ok(self
            .rows
            .read()
            .unwrap()
            .values()
            .filter(|r| r.matches(&filter))
            .cloned()
            .collect())
    }

    async fn update(&self, id: &str, patch: T::Patch) -> Result<T, StorageError> {
        self.ensure_ready()?;
        let mut rows = self.rows.write().unwrap();
        let existing = rows
            .get_mut(id)
            .ok_or_else(|| StorageError::not_found(T::TABLE, id))?;
        existing.merge(patch);
        existing.touch(OffsetDateTime::now_utc());
        Ok(existing.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.ensure_ready()?;
        self.rows
            .write()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(T::TABLE, id))
    }
}

/// Non-persistent backend seeded from the demo fixtures. Every `switch` to
/// this backend constructs a fresh instance, so prior demo mutations are
/// discarded by design of the factory, not of this type.
pub struct MemoryProvider {
    users: Arc<MemoryRepository<User>>,
    organizations: Arc<MemoryRepository<Organization>>,
    transactions: Arc<MemoryRepository<Transaction>>,
    transaction_categories: Arc<MemoryRepository<TransactionCategory>>,
    feedbacks: Arc<MemoryRepository<AiFeedback>>,
    financial_accounts: Arc<MemoryRepository<FinancialAccount>>,
    ready: Arc<AtomicBool>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        let ready = Arc::new(AtomicBool::new(false));
        Self {
            users: Arc::new(MemoryRepository::new(ready.clone())),
            organizations: Arc::new(MemoryRepository::new(ready.clone())),
            transactions: Arc::new(MemoryRepository::new(ready.clone())),
            transaction_categories: Arc::new(MemoryRepository::new(ready.clone())),
            feedbacks: Arc::new(MemoryRepository::new(ready.clone())),
            financial_accounts: Arc::new(MemoryRepository::new(ready.clone())),
            ready,
        }
    }

    /// Dumps the current contents of one table as JSON. Debug/reset helper,
    /// not part of the provider contract.
    pub fn dump(&self, table: &str) -> serde_json::Value {
        let result = match table {
            User::TABLE => serde_json::to_value(self.users.snapshot()),
            Organization::TABLE => serde_json::to_value(self.organizations.snapshot()),
            Transaction::TABLE => serde_json::to_value(self.transactions.snapshot()),
            TransactionCategory::TABLE => {
                serde_json::to_value(self.transaction_categories.snapshot())
            }
            AiFeedback::TABLE => serde_json::to_value(self.feedbacks.snapshot()),
            FinancialAccount::TABLE => serde_json::to_value(self.financial_accounts.snapshot()),
            _ => Ok(serde_json::Value::Array(Vec::new())),
        };
        result.unwrap_or(serde_json::Value::Null)
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseProvider for MemoryProvider {
    async fn initialize(&self) -> Result<(), StorageError> {
        if self.ready.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.users.load(fixtures::demo_users());
        self.organizations.load(fixtures::demo_organizations());
        self.transactions.load(fixtures::demo_transactions());
        self.transaction_categories
            .load(fixtures::demo_transaction_categories());
        self.feedbacks.load(fixtures::demo_feedbacks());
        self.financial_accounts
            .load(fixtures::demo_financial_accounts());
        self.ready.store(true, Ordering::SeqCst);
        tracing::debug!("memory provider initialized with demo fixtures");
        Ok(())
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.users.clear();
        self.organizations.clear();
        self.transactions.clear();
        self.transaction_categories.clear();
        self.feedbacks.clear();
        self.financial_accounts.clear();
        self.ready.store(false, Ordering::SeqCst);
        tracing::debug!("memory provider closed");
        Ok(())
    }

    fn users(&self) -> Arc<dyn Repository<User>> {
        self.users.clone()
    }

    fn organizations(&self) -> Arc<dyn Repository<Organization>> {
        self.organizations.clone()
    }

    fn transactions(&self) -> Arc<dyn Repository<Transaction>> {
        self.transactions.clone()
    }

    fn transaction_categories(&self) -> Arc<dyn Repository<TransactionCategory>> {
        self.transaction_categories.clone()
    }

    fn feedbacks(&self) -> Arc<dyn Repository<AiFeedback>> {
        self.feedbacks.clone()
    }

    fn financial_accounts(&self) -> Arc<dyn Repository<FinancialAccount>> {
        self.financial_accounts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::update::UserPatch;

    #[tokio::test]
    async fn test_memory_requires_initialize() {
        let provider = MemoryProvider::new();
        let users = provider.users();
        let err = users.find_all().await.unwrap_err();
        assert!(matches!(err, StorageError::NotInitialized));
    }

    #[tokio::test]
    async fn test_memory_create_assigns_identity() {
        let provider = MemoryProvider::new();
        provider.initialize().await.unwrap();

        let created = provider
            .users()
            .create(User::new("taro@example.com"))
            .await
            .unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.created_at, created.updated_at);

        let found = provider.users().find_by_id(&created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_memory_update_and_delete_missing_id() {
        let provider = MemoryProvider::new();
        provider.initialize().await.unwrap();
        let users = provider.users();

        let err = users
            .update("nope", UserPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));

        let err = users.delete("nope").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_memory_seeded_with_fixtures() {
        let provider = MemoryProvider::new();
        provider.initialize().await.unwrap();

        assert!(!provider.transactions().find_all().await.unwrap().is_empty());
        assert!(!provider
            .transaction_categories()
            .find_all()
            .await
            .unwrap()
            .is_empty());
        assert!(provider.dump(Transaction::TABLE).is_array());
    }
}
