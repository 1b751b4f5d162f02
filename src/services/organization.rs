use std::sync::Arc;

use crate::models::query::OrganizationFilter;
use crate::models::update::OrganizationPatch;
use crate::models::Organization;
use crate::storage::{DatabaseProvider, Repository, StorageError};

pub struct OrganizationService {
    repository: Arc<dyn Repository<Organization>>,
}

impl OrganizationService {
    pub fn new(provider: &Arc<dyn DatabaseProvider>) -> Self {
        Self {
            repository: provider.organizations(),
        }
    }

    pub async fn create_organization(
        &self,
        draft: Organization,
    ) -> Result<Organization, StorageError> {
        if self.organization_by_slug(&draft.slug).await?.is_some() {
            return Err(StorageError::Conflict(format!(
                "organization with slug '{}' already exists",
                draft.slug
            )));
        }
        self.repository.create(draft).await
    }

    pub async fn organization_by_id(
        &self,
        id: &str,
    ) -> Result<Option<Organization>, StorageError> {
        self.repository.find_by_id(id).await
    }

    pub async fn all_organizations(&self) -> Result<Vec<Organization>, StorageError> {
        self.repository.find_all().await
    }

    pub async fn organizations_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Organization>, StorageError> {
        self.repository
            .find_by(OrganizationFilter {
                user_id: Some(user_id.to_string()),
                ..Default::default()
            })
            .await
    }

    pub async fn organization_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Organization>, StorageError> {
        let mut matched = self
            .repository
            .find_by(OrganizationFilter {
                slug: Some(slug.to_string()),
                ..Default::default()
            })
            .await?;
        Ok(matched.pop())
    }

    pub async fn update_organization(
        &self,
        id: &str,
        patch: OrganizationPatch,
    ) -> Result<Organization, StorageError> {
        if let Some(slug) = &patch.slug {
            if let Some(existing) = self.organization_by_slug(slug).await? {
                if existing.id != id {
                    return Err(StorageError::Conflict(format!(
                        "organization with slug '{slug}' already exists"
                    )));
                }
            }
        }
        self.repository.update(id, patch).await
    }

    pub async fn delete_organization(&self, id: &str) -> Result<(), StorageError> {
        self.repository.delete(id).await
    }

    /// Slugifies `name` and probes numeric suffixes until the slug is free
    /// in the active backend.
    pub async fn generate_unique_slug(&self, name: &str) -> Result<String, StorageError> {
        let base = slugify(name);
        let mut slug = base.clone();
        let mut counter = 1;
        while self.organization_by_slug(&slug).await?.is_some() {
            slug = format!("{base}-{counter}");
            counter += 1;
        }
        Ok(slug)
    }

    pub async fn create_personal_organization(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<Organization, StorageError> {
        let slug = self.generate_unique_slug(display_name).await?;
        self.create_organization(Organization::new(
            display_name,
            display_name,
            Some("Personal organization".to_string()),
            slug,
            Some(user_id.to_string()),
        ))
        .await
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_was_hyphen = false;
        } else if (c.is_whitespace() || c == '-') && !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    slug.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Tanaka   Household -- Books"), "tanaka-household-books");
        assert_eq!(slugify("  XYZ Inc.  "), "xyz-inc");
    }
}
