use std::sync::Arc;

use tokio::sync::Mutex;

use crate::sqlite_storage::{SqliteConfig, SqliteProvider};
use crate::storage::{DatabaseProvider, MemoryProvider, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Durable embedded store.
    Sqlite,
    /// Volatile demo store seeded from fixtures.
    Memory,
    /// Reserved for a future server-side store; always fails `Unsupported`.
    Remote,
}

struct ActiveBackend {
    kind: BackendKind,
    provider: Arc<dyn DatabaseProvider>,
}

/// Single access point to the current backend. Owns the active instance's
/// whole lifecycle; services only borrow repositories from it.
///
/// The slot is guarded by an async mutex, so concurrent first users queue on
/// one in-flight construction instead of racing independent ones.
pub struct ProviderFactory {
    sqlite: SqliteConfig,
    active: Mutex<Option<ActiveBackend>>,
}

impl ProviderFactory {
    pub fn new(sqlite: SqliteConfig) -> Self {
        Self {
            sqlite,
            active: Mutex::new(None),
        }
    }

    /// Returns the active backend, constructing one if needed. With no kind
    /// requested, reuses the current kind, defaulting to the durable backend
    /// on first-ever use. A cached instance of the requested kind is
    /// returned as-is, never reinitialized.
    pub async fn get(
        &self,
        kind: Option<BackendKind>,
    ) -> Result<Arc<dyn DatabaseProvider>, StorageError> {
        let mut slot = self.active.lock().await;
        let requested = kind
            .or_else(|| slot.as_ref().map(|a| a.kind))
            .unwrap_or(BackendKind::Sqlite);
        if let Some(active) = slot.as_ref() {
            if active.kind == requested {
                return Ok(active.provider.clone());
            }
        }
        self.replace(&mut slot, requested).await
    }

    /// Tears down the current instance and constructs a fresh one, even for
    /// the same kind. For the memory backend this resets to pristine fixture
    /// data.
    pub async fn switch(
        &self,
        kind: BackendKind,
    ) -> Result<Arc<dyn DatabaseProvider>, StorageError> {
        let mut slot = self.active.lock().await;
        self.replace(&mut slot, kind).await
    }

    /// Tears down the current instance and returns the factory to its
    /// pre-first-use state.
    pub async fn close(&self) -> Result<(), StorageError> {
        let mut slot = self.active.lock().await;
        if let Some(previous) = slot.take() {
            previous.provider.close().await?;
            tracing::debug!(kind = ?previous.kind, "backend closed");
        }
        Ok(())
    }

    pub async fn current_kind(&self) -> Option<BackendKind> {
        self.active.lock().await.as_ref().map(|a| a.kind)
    }

    async fn replace(
        &self,
        slot: &mut Option<ActiveBackend>,
        kind: BackendKind,
    ) -> Result<Arc<dyn DatabaseProvider>, StorageError> {
        if let Some(previous) = slot.take() {
            previous.provider.close().await?;
            tracing::debug!(kind = ?previous.kind, "previous backend torn down");
        }
        let provider = self.build(kind)?;
        provider.initialize().await?;
        *slot = Some(ActiveBackend {
            kind,
            provider: provider.clone(),
        });
        tracing::debug!(?kind, "active backend ready");
        Ok(provider)
    }

    fn build(&self, kind: BackendKind) -> Result<Arc<dyn DatabaseProvider>, StorageError> {
        match kind {
            BackendKind::Sqlite => Ok(Arc::new(SqliteProvider::new(self.sqlite.clone()))),
            BackendKind::Memory => Ok(Arc::new(MemoryProvider::new())),
            BackendKind::Remote => Err(StorageError::Unsupported(
                "remote backend not implemented yet".to_string(),
            )),
        }
    }
}
