//! Category accessor

use crate::models::{Category, CategoryId, CategoryUpdate, UserId};
use crate::services::CategoryService;
use crate::storage::Storage;

/// A user's categories in display order
pub struct CategoryList<'a> {
    storage: &'a Storage,
    user_id: UserId,
    categories: Vec<Category>,
}

impl<'a> CategoryList<'a> {
    /// Open and load the user's categories
    pub fn open(storage: &'a Storage, user_id: UserId) -> Self {
        let mut list = Self {
            storage,
            user_id,
            categories: Vec::new(),
        };
        list.load();
        list
    }

    fn service(&self) -> CategoryService<'a> {
        CategoryService::new(self.storage)
    }

    /// Reload, seeding the defaults for a user with none. If even that
    /// fails the defaults are shown unsaved.
    pub fn load(&mut self) {
        self.categories = match self.service().ensure_defaults(self.user_id) {
            Ok(categories) => categories,
            Err(e) => {
                tracing::error!(user = %self.user_id, error = %e, "failed to load categories");
                Category::defaults_for(self.user_id)
            }
        };
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Category names in display order
    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    /// Find by name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        let needle = name.trim().to_lowercase();
        self.categories
            .iter()
            .find(|c| c.name.to_lowercase() == needle)
    }

    pub fn add(&mut self, name: &str, icon: Option<&str>, color: Option<&str>) -> bool {
        match self.service().create(self.user_id, name, icon, color) {
            Ok(category) => {
                self.categories.push(category);
                true
            }
            Err(e) => {
                tracing::error!(name, error = %e, "failed to add category");
                false
            }
        }
    }

    pub fn update(&mut self, id: CategoryId, update: &CategoryUpdate) -> bool {
        match self.service().update(self.user_id, id, update) {
            Ok(updated) => {
                if let Some(slot) = self.categories.iter_mut().find(|c| c.id == id) {
                    *slot = updated;
                }
                true
            }
            Err(e) => {
                tracing::error!(category = %id, error = %e, "failed to update category");
                false
            }
        }
    }

    /// Delete a category. Callers check `aggregate::can_delete_category`
    /// first.
    pub fn delete(&mut self, id: CategoryId) -> bool {
        match self.service().delete(self.user_id, id) {
            Ok(_) => {
                self.categories.retain(|c| c.id != id);
                true
            }
            Err(e) => {
                tracing::error!(category = %id, error = %e, "failed to delete category");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CifraPaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CifraPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_open_seeds_defaults() {
        let (_temp_dir, storage) = create_test_storage();
        let list = CategoryList::open(&storage, UserId::new());

        assert_eq!(list.categories().len(), 9);
        assert_eq!(list.names()[2], "Alimentación");
        assert!(list.find_by_name("alimentación").is_some());
    }

    #[test]
    fn test_add_update_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        let mut list = CategoryList::open(&storage, user);

        assert!(list.add("Mascotas", Some("Heart"), Some("#ff0000")));
        assert!(!list.add("mascotas", None, None));
        assert!(!list.add(&"m".repeat(51), None, None));

        let id = list.find_by_name("Mascotas").unwrap().id;
        assert!(list.update(
            id,
            &CategoryUpdate {
                color: Some("#00ff00".into()),
                ..Default::default()
            }
        ));
        assert_eq!(list.find_by_name("Mascotas").unwrap().color, "#00ff00");

        assert!(list.delete(id));
        assert!(list.find_by_name("Mascotas").is_none());

        let reopened = CategoryList::open(&storage, user);
        assert_eq!(reopened.categories().len(), 9);
    }
}
