//! Storage layer for Cifra
//!
//! A local stand-in for the hosted backend: one JSON file per table
//! (`users`, `categories`, `expenses`), atomic writes, and reads scoped to
//! the owning user. The session cache and the audit log live alongside.

pub mod categories;
pub mod expenses;
pub mod file_io;
pub mod session;
pub mod users;

pub use categories::CategoryRepository;
pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use session::{SessionData, SessionStore};
pub use users::UserRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::CifraPaths;
use crate::error::CifraError;
use crate::models::UserId;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: CifraPaths,
    audit: AuditLogger,
    pub users: UserRepository,
    pub categories: CategoryRepository,
    pub expenses: ExpenseRepository,
    pub session: SessionStore,
}

impl Storage {
    /// Create a new Storage instance. Tables are not read until `load_all`.
    pub fn new(paths: CifraPaths) -> Result<Self, CifraError> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            users: UserRepository::new(paths.users_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            session: SessionStore::new(paths.session_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &CifraPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load every table from disk
    pub fn load_all(&self) -> Result<(), CifraError> {
        self.users.load()?;
        self.categories.load()?;
        self.expenses.load()?;
        tracing::debug!(dir = %self.paths.data_dir().display(), "tables loaded");
        Ok(())
    }

    /// Save every table to disk
    pub fn save_all(&self) -> Result<(), CifraError> {
        self.users.save()?;
        self.categories.save()?;
        self.expenses.save()?;
        Ok(())
    }

    /// Record a created row
    pub fn log_create<T: Serialize>(
        &self,
        user_id: UserId,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), CifraError> {
        let entry = AuditEntry::create(entity_type, entity_id, entity_name, entity).for_user(user_id);
        self.audit.log(&entry)
    }

    /// Record an updated row
    #[allow(clippy::too_many_arguments)]
    pub fn log_update<T: Serialize>(
        &self,
        user_id: UserId,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> Result<(), CifraError> {
        let entry = AuditEntry::update(entity_type, entity_id, entity_name, before, after, diff_summary)
            .for_user(user_id);
        self.audit.log(&entry)
    }

    /// Record a deleted row
    pub fn log_delete<T: Serialize>(
        &self,
        user_id: UserId,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), CifraError> {
        let entry = AuditEntry::delete(entity_type, entity_id, entity_name, entity).for_user(user_id);
        self.audit.log(&entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, UserProfile};
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CifraPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert_eq!(storage.audit().entry_count().unwrap(), 0);
    }

    #[test]
    fn test_save_all_writes_tables() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CifraPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths.clone()).unwrap();

        let profile = UserProfile::new(UserId::new(), "ana@example.com", "Ana");
        storage
            .categories
            .upsert(Category::new(profile.id, "Salud"))
            .unwrap();
        storage.users.upsert(profile).unwrap();
        storage.save_all().unwrap();

        assert!(paths.users_file().exists());
        assert!(paths.categories_file().exists());
        assert!(paths.expenses_file().exists());
    }

    #[test]
    fn test_audit_helpers_tag_user() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CifraPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        let user = UserId::new();
        let category = Category::new(user, "Salud");

        storage
            .log_create(user, EntityType::Category, category.id.to_string(), Some("Salud".into()), &category)
            .unwrap();

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries[0].user_id, Some(user.to_string()));
    }
}
