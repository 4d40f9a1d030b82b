//! Category repository for JSON storage
//!
//! Manages loading and saving the `categories` table to categories.json.
//! Reads are always scoped to one user.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::CifraError;
use crate::models::{Category, CategoryId, UserId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable categories table
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct CategoryData {
    categories: Vec<Category>,
}

/// Repository for category persistence
pub struct CategoryRepository {
    path: PathBuf,
    data: RwLock<HashMap<CategoryId, Category>>,
}

fn display_order(a: &Category, b: &Category) -> std::cmp::Ordering {
    a.sort_order
        .cmp(&b.sort_order)
        .then(a.created_at.cmp(&b.created_at))
}

impl CategoryRepository {
    /// Create a new category repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load categories from disk
    pub fn load(&self) -> Result<(), CifraError> {
        let file_data: CategoryData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for category in file_data.categories {
            data.insert(category.id, category);
        }

        Ok(())
    }

    /// Save categories to disk
    pub fn save(&self) -> Result<(), CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut categories: Vec<_> = data.values().cloned().collect();
        categories.sort_by(|a, b| a.user_id.cmp(&b.user_id).then(display_order(a, b)));

        write_json_atomic(&self.path, &CategoryData { categories })
    }

    /// Get a category by id, only if `user_id` owns it
    pub fn get(&self, user_id: UserId, id: CategoryId) -> Result<Option<Category>, CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).filter(|c| c.user_id == user_id).cloned())
    }

    /// All of a user's categories by sort order, then creation time
    pub fn get_for_user(&self, user_id: UserId) -> Result<Vec<Category>, CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut categories: Vec<_> = data
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        categories.sort_by(display_order);
        Ok(categories)
    }

    /// Find a user's category by name (case-insensitive)
    pub fn get_by_name(&self, user_id: UserId, name: &str) -> Result<Option<Category>, CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let needle = name.trim().to_lowercase();
        Ok(data
            .values()
            .find(|c| c.user_id == user_id && c.name.to_lowercase() == needle)
            .cloned())
    }

    /// Insert or update a category
    pub fn upsert(&self, category: Category) -> Result<(), CifraError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(category.id, category);
        Ok(())
    }

    /// Delete a user's category. Returns false when it does not exist or
    /// belongs to someone else.
    pub fn delete(&self, user_id: UserId, id: CategoryId) -> Result<bool, CifraError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        match data.get(&id) {
            Some(c) if c.user_id == user_id => {
                data.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// The user owning a category id, if the id is taken
    pub fn owner_of(&self, id: CategoryId) -> Result<Option<UserId>, CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.get(&id).map(|c| c.user_id))
    }

    /// Replace every category of a user with `categories`
    ///
    /// Fails without changing anything if one of the ids belongs to another
    /// user.
    pub fn replace_for_user(
        &self,
        user_id: UserId,
        categories: Vec<Category>,
    ) -> Result<usize, CifraError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(taken) = categories
            .iter()
            .find(|c| data.get(&c.id).is_some_and(|existing| existing.user_id != user_id))
        {
            return Err(CifraError::Storage(format!(
                "Category id {} belongs to another user",
                taken.id
            )));
        }

        data.retain(|_, c| c.user_id != user_id);
        let count = categories.len();
        for category in categories {
            data.insert(category.id, category);
        }
        Ok(count)
    }

    /// Count a user's categories
    pub fn count_for_user(&self, user_id: UserId) -> Result<usize, CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.values().filter(|c| c.user_id == user_id).count())
    }
}
