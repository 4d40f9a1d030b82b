//! User profile repository for JSON storage
//!
//! Manages loading and saving the `users` table to users.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::CifraError;
use crate::models::{UserId, UserProfile};

use super::file_io::{read_json, write_json_atomic};

/// Serializable users table
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct UserData {
    users: Vec<UserProfile>,
}

/// Repository for user profile persistence
pub struct UserRepository {
    path: PathBuf,
    data: RwLock<HashMap<UserId, UserProfile>>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load profiles from disk
    pub fn load(&self) -> Result<(), CifraError> {
        let file_data: UserData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for profile in file_data.users {
            data.insert(profile.id, profile);
        }

        Ok(())
    }

    /// Save profiles to disk
    pub fn save(&self) -> Result<(), CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        write_json_atomic(&self.path, &UserData { users })
    }

    /// Get a profile by user id
    pub fn get(&self, id: UserId) -> Result<Option<UserProfile>, CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Find a profile by email (case-insensitive)
    pub fn get_by_email(&self, email: &str) -> Result<Option<UserProfile>, CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let needle = email.trim().to_lowercase();
        Ok(data
            .values()
            .find(|p| p.email.to_lowercase() == needle)
            .cloned())
    }

    /// Insert or replace a profile
    pub fn upsert(&self, profile: UserProfile) -> Result<(), CifraError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(profile.id, profile);
        Ok(())
    }

    /// Count profiles
    pub fn count(&self) -> Result<usize, CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, UserRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = UserRepository::new(temp_dir.path().join("users.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_save_reload() {
        let (temp_dir, repo) = create_test_repo();
        let mut profile = UserProfile::new(UserId::new(), "ana@example.com", "Ana");
        profile.salary = Some(Money::from_units(50000));
        let id = profile.id;

        repo.upsert(profile).unwrap();
        repo.save().unwrap();

        let reloaded = UserRepository::new(temp_dir.path().join("users.json"));
        reloaded.load().unwrap();
        let loaded = reloaded.get(id).unwrap().unwrap();
        assert_eq!(loaded.email, "ana@example.com");
        assert_eq!(loaded.salary, Some(Money::from_units(50000)));
    }

    #[test]
    fn test_get_by_email() {
        let (_temp_dir, repo) = create_test_repo();
        let profile = UserProfile::new(UserId::new(), "Ana@Example.com", "Ana");
        let id = profile.id;
        repo.upsert(profile).unwrap();

        assert_eq!(repo.get_by_email("ana@example.com").unwrap().map(|p| p.id), Some(id));
        assert!(repo.get_by_email("otro@example.com").unwrap().is_none());
    }

    #[test]
    fn test_get_unknown_user() {
        let (_temp_dir, repo) = create_test_repo();
        assert!(repo.get(UserId::new()).unwrap().is_none());
    }
}
