//! Category service
//!
//! User-scoped category CRUD and seeding of the default set. The guard that
//! blocks deleting a category still used by expenses lives in
//! `aggregate::can_delete_category`, not here.

use crate::audit::{generate_diff, EntityType};
use crate::error::{CifraError, CifraResult};
use crate::models::category::{validate_name, DEFAULT_COLOR, DEFAULT_ICON};
use crate::models::{Category, CategoryId, CategoryUpdate, UserId};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// A user's categories in display order
    pub fn list(&self, user_id: UserId) -> CifraResult<Vec<Category>> {
        self.storage.categories.get_for_user(user_id)
    }

    /// Seed the default categories when the user has none. Returns the
    /// user's categories either way.
    pub fn ensure_defaults(&self, user_id: UserId) -> CifraResult<Vec<Category>> {
        if self.storage.categories.count_for_user(user_id)? > 0 {
            return self.list(user_id);
        }

        let defaults = Category::defaults_for(user_id);
        for category in &defaults {
            self.storage.categories.upsert(category.clone())?;
        }
        self.storage.categories.save()?;

        for category in &defaults {
            self.storage.log_create(
                user_id,
                EntityType::Category,
                category.id.to_string(),
                Some(category.name.clone()),
                category,
            )?;
        }

        tracing::info!(user = %user_id, count = defaults.len(), "seeded default categories");
        Ok(defaults)
    }

    /// Find a category by name (case-insensitive) or by id
    pub fn find(&self, user_id: UserId, identifier: &str) -> CifraResult<Option<Category>> {
        if let Some(category) = self.storage.categories.get_by_name(user_id, identifier)? {
            return Ok(Some(category));
        }

        Ok(self
            .list(user_id)?
            .into_iter()
            .find(|c| c.id.matches_short(identifier)))
    }

    /// Find a category or fail with `NotFound`
    pub fn resolve(&self, user_id: UserId, identifier: &str) -> CifraResult<Category> {
        self.find(user_id, identifier)?
            .ok_or_else(|| CifraError::category_not_found(identifier))
    }

    fn ensure_unique(&self, user_id: UserId, name: &str, except: Option<CategoryId>) -> CifraResult<()> {
        match self.storage.categories.get_by_name(user_id, name)? {
            Some(existing) if Some(existing.id) != except => Err(CifraError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Create a category at the end of the list
    pub fn create(
        &self,
        user_id: UserId,
        name: &str,
        icon: Option<&str>,
        color: Option<&str>,
    ) -> CifraResult<Category> {
        let name = name.trim();
        validate_name(name).map_err(|e| CifraError::Validation(e.to_string()))?;
        self.ensure_unique(user_id, name, None)?;

        let next_order = self
            .list(user_id)?
            .iter()
            .map(|c| c.sort_order)
            .max()
            .map_or(0, |max| max + 1);

        let category = Category::with_style(
            user_id,
            name,
            icon.unwrap_or(DEFAULT_ICON),
            color.unwrap_or(DEFAULT_COLOR),
            next_order,
        );
        category
            .validate()
            .map_err(|e| CifraError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        self.storage.log_create(
            user_id,
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        Ok(category)
    }

    /// Edit name, icon or color. Expenses keep the old category name.
    pub fn update(
        &self,
        user_id: UserId,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> CifraResult<Category> {
        let mut category = self
            .storage
            .categories
            .get(user_id, id)?
            .ok_or_else(|| CifraError::category_not_found(id.to_string()))?;
        let before = category.clone();

        if let Some(name) = &update.name {
            let name = name.trim();
            validate_name(name).map_err(|e| CifraError::Validation(e.to_string()))?;
            self.ensure_unique(user_id, name, Some(id))?;
            category.name = name.to_string();
        }
        if let Some(icon) = &update.icon {
            category.icon = icon.trim().to_string();
        }
        if let Some(color) = &update.color {
            category.color = color.trim().to_string();
        }

        category.updated_at = chrono::Utc::now();
        category
            .validate()
            .map_err(|e| CifraError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        let diff = generate_diff(
            &serde_json::to_value(&before)?,
            &serde_json::to_value(&category)?,
        );
        if diff.is_some() {
            self.storage.log_update(
                user_id,
                EntityType::Category,
                category.id.to_string(),
                Some(category.name.clone()),
                &before,
                &category,
                diff,
            )?;
        }

        Ok(category)
    }

    /// Delete a category
    pub fn delete(&self, user_id: UserId, id: CategoryId) -> CifraResult<Category> {
        let category = self
            .storage
            .categories
            .get(user_id, id)?
            .ok_or_else(|| CifraError::category_not_found(id.to_string()))?;

        self.storage.categories.delete(user_id, id)?;
        self.storage.categories.save()?;

        self.storage.log_delete(
            user_id,
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        Ok(category)
    }

    /// Replace all of a user's categories (backup restore)
    pub fn replace_all(&self, user_id: UserId, categories: Vec<Category>) -> CifraResult<usize> {
        for category in &categories {
            category
                .validate()
                .map_err(|e| CifraError::Validation(format!("{}: {}", category.name, e)))?;
        }

        let count = self.storage.categories.replace_for_user(user_id, categories)?;
        self.storage.categories.save()?;
        Ok(count)
    }
}
