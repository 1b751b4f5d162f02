//! Mode-aware initialization: observes the demo-mode signal, drives the
//! provider factory accordingly and reports a tri-state readiness status to
//! consuming views.

use std::{
    path::PathBuf,
    sync::{Arc, RwLock},
};

use crate::fixtures;
use crate::models::TransactionCategory;
use crate::provider::{BackendKind, ProviderFactory};
use crate::services::{FeedbackService, FinancialAccountService, TransactionService};
use crate::storage::{DatabaseProvider, StorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseState {
    Initializing,
    Ready,
    Error(String),
}

/// Persisted demo-mode preference. Stores the literal strings `true` /
/// `false`, one value per install.
#[derive(Debug, Clone)]
pub struct ModePreference {
    path: Option<PathBuf>,
}

impl ModePreference {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Conventional per-user location.
    pub fn default_location() -> Self {
        Self {
            path: dirs::config_dir().map(|dir| dir.join("miel").join("demo-mode")),
        }
    }

    /// No persistence; every session starts from the hardcoded default.
    pub fn volatile() -> Self {
        Self { path: None }
    }

    pub fn load(&self) -> Option<bool> {
        let path = self.path.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(contents) => contents.trim().parse().ok(),
            Err(_) => None,
        }
    }

    pub fn store(&self, demo: bool) {
        let Some(path) = self.path.as_ref() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(path, demo.to_string()) {
            tracing::warn!(error = %e, path = %path.display(), "failed to persist demo-mode preference");
        }
    }
}

/// Default category catalogue created on first-time live setup.
pub fn default_categories() -> Vec<TransactionCategory> {
    let catalogue: [(&str, &str, &str); 10] = [
        ("食費", "🍽️", "#FF6B6B"),
        ("交通費", "🚊", "#4ECDC4"),
        ("住居費", "🏠", "#45B7D1"),
        ("光熱費", "💡", "#FFA726"),
        ("給与", "💰", "#66BB6A"),
        ("副収入", "📈", "#AB47BC"),
        ("娯楽費", "🎮", "#EF5350"),
        ("医療費", "⚕️", "#26A69A"),
        ("教育費", "📚", "#5C6BC0"),
        ("その他", "📋", "#78909C"),
    ];
    catalogue
        .into_iter()
        .map(|(name, icon, color)| {
            TransactionCategory::new(name, Some(icon.to_string()), Some(color.to_string()))
        })
        .collect()
}

/// Drives the backend through demo-mode changes and exposes the readiness
/// state consumers render against: `Initializing` means show a placeholder,
/// `Error` a blocking panel, `Ready` real content.
pub struct SessionManager {
    factory: Arc<ProviderFactory>,
    preference: ModePreference,
    state: RwLock<DatabaseState>,
}

impl SessionManager {
    pub fn new(factory: Arc<ProviderFactory>, preference: ModePreference) -> Self {
        Self {
            factory,
            preference,
            state: RwLock::new(DatabaseState::Initializing),
        }
    }

    pub fn state(&self) -> DatabaseState {
        self.state.read().unwrap().clone()
    }

    pub fn factory(&self) -> &Arc<ProviderFactory> {
        &self.factory
    }

    /// Resolves the effective demo flag: explicit override, then the
    /// persisted preference, then demo-on for first-time users.
    pub fn resolve_mode(&self, explicit: Option<bool>) -> bool {
        explicit.or_else(|| self.preference.load()).unwrap_or(true)
    }

    /// Applies a demo-mode change. Always transitions through
    /// `Initializing`, even when already `Ready`; there is no partial
    /// refresh. The chosen mode is persisted as the new preference.
    pub async fn apply_mode(&self, demo: bool) -> DatabaseState {
        *self.state.write().unwrap() = DatabaseState::Initializing;
        self.preference.store(demo);

        let next = match self.bring_up(demo).await {
            Ok(()) => DatabaseState::Ready,
            Err(e) => {
                tracing::error!(error = %e, demo, "backend switch failed");
                DatabaseState::Error(e.to_string())
            }
        };
        *self.state.write().unwrap() = next.clone();
        next
    }

    async fn bring_up(&self, demo: bool) -> Result<(), StorageError> {
        let kind = if demo {
            BackendKind::Memory
        } else {
            BackendKind::Sqlite
        };
        let provider = self.factory.switch(kind).await?;
        if !demo {
            self.seed_live_defaults(&provider).await?;
        }
        tracing::debug!(demo, "database session ready");
        Ok(())
    }

    /// First-time live setup: default categories plus the feedback and
    /// financial-account fixtures, each guarded by an emptiness check.
    async fn seed_live_defaults(
        &self,
        provider: &Arc<dyn DatabaseProvider>,
    ) -> Result<(), StorageError> {
        TransactionService::new(provider)
            .seed_categories_if_empty(default_categories())
            .await?;
        FeedbackService::new(provider)
            .seed_if_empty(fixtures::demo_feedbacks())
            .await?;
        FinancialAccountService::new(provider)
            .seed_if_empty(fixtures::demo_financial_accounts())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mode_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let preference = ModePreference::at(dir.path().join("demo-mode"));
        let factory = Arc::new(ProviderFactory::new(
            crate::sqlite_storage::SqliteConfig::in_memory(),
        ));
        let manager = SessionManager::new(factory, preference.clone());

        // First-time default is demo-on.
        assert!(manager.resolve_mode(None));

        preference.store(false);
        assert!(!manager.resolve_mode(None));

        // Explicit override wins over the persisted preference.
        assert!(manager.resolve_mode(Some(true)));
    }

    #[test]
    fn test_volatile_preference_never_persists() {
        let preference = ModePreference::volatile();
        preference.store(false);
        assert_eq!(preference.load(), None);
    }
}
