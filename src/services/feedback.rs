use std::{collections::HashSet, sync::Arc};

use crate::models::query::FeedbackFilter;
use crate::models::update::FeedbackPatch;
use crate::models::{AiFeedback, FeedbackCategory, FeedbackPriority, FeedbackType};
use crate::storage::{DatabaseProvider, Repository, StorageError};

/// Number of most-recent entries pulled into the dashboard feed.
const DASHBOARD_RECENT: usize = 5;

pub struct FeedbackService {
    repository: Arc<dyn Repository<AiFeedback>>,
}

impl FeedbackService {
    pub fn new(provider: &Arc<dyn DatabaseProvider>) -> Self {
        Self {
            repository: provider.feedbacks(),
        }
    }

    pub async fn create_feedback(&self, draft: AiFeedback) -> Result<AiFeedback, StorageError> {
        self.repository.create(draft).await
    }

    pub async fn feedback_by_id(&self, id: &str) -> Result<Option<AiFeedback>, StorageError> {
        self.repository.find_by_id(id).await
    }

    pub async fn all_feedbacks(&self) -> Result<Vec<AiFeedback>, StorageError> {
        self.repository.find_all().await
    }

    pub async fn feedbacks_by_priority(
        &self,
        priority: FeedbackPriority,
    ) -> Result<Vec<AiFeedback>, StorageError> {
        self.repository
            .find_by(FeedbackFilter {
                priority: Some(priority),
                ..Default::default()
            })
            .await
    }

    pub async fn feedbacks_by_type(
        &self,
        kind: FeedbackType,
    ) -> Result<Vec<AiFeedback>, StorageError> {
        self.repository
            .find_by(FeedbackFilter {
                kind: Some(kind),
                ..Default::default()
            })
            .await
    }

    pub async fn feedbacks_by_category(
        &self,
        category: FeedbackCategory,
    ) -> Result<Vec<AiFeedback>, StorageError> {
        self.repository
            .find_by(FeedbackFilter {
                category: Some(category),
                ..Default::default()
            })
            .await
    }

    pub async fn actionable_feedbacks(&self) -> Result<Vec<AiFeedback>, StorageError> {
        self.repository
            .find_by(FeedbackFilter {
                actionable: Some(true),
                ..Default::default()
            })
            .await
    }

    /// Assembles the dashboard feed: high-priority entries, actionable
    /// entries and the most recent five, de-duplicated by id, then sorted
    /// high > medium > low with creation order breaking ties.
    pub async fn dashboard_feedbacks(&self) -> Result<Vec<AiFeedback>, StorageError> {
        let high = self
            .feedbacks_by_priority(FeedbackPriority::High)
            .await?;
        let actionable = self.actionable_feedbacks().await?;
        let mut recent = self.all_feedbacks().await?;
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(DASHBOARD_RECENT);

        let mut seen = HashSet::new();
        let mut feed: Vec<AiFeedback> = high
            .into_iter()
            .chain(actionable)
            .chain(recent)
            .filter(|f| seen.insert(f.id.clone()))
            .collect();
        // The repository contract leaves scan order unspecified (the memory
        // backend iterates a hash map), so the tie-break must not lean on
        // the union's order.
        feed.sort_by_key(|f| (f.priority.rank(), f.created_at));
        Ok(feed)
    }

    pub async fn update_feedback(
        &self,
        id: &str,
        patch: FeedbackPatch,
    ) -> Result<AiFeedback, StorageError> {
        self.repository.update(id, patch).await
    }

    pub async fn mark_as_read(&self, id: &str) -> Result<AiFeedback, StorageError> {
        self.update_feedback(
            id,
            FeedbackPatch {
                actionable: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete_feedback(&self, id: &str) -> Result<(), StorageError> {
        self.repository.delete(id).await
    }

    /// Inserts the fixture feedbacks when the table is empty; `create`
    /// re-stamps their identity.
    pub async fn seed_if_empty(&self, fixtures: Vec<AiFeedback>) -> Result<(), StorageError> {
        if !self.repository.find_all().await?.is_empty() {
            return Ok(());
        }
        for feedback in fixtures {
            self.repository.create(feedback).await?;
        }
        tracing::debug!("fixture feedbacks created");
        Ok(())
    }
}
