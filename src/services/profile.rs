//! Profile service
//!
//! Creates the `users` row on first sign-in and applies profile edits.

use crate::audit::{generate_diff, EntityType};
use crate::auth::Identity;
use crate::error::{CifraError, CifraResult};
use crate::models::profile::ProfileValidationError;
use crate::models::{Money, ProfileUpdate, SalaryType, UserId, UserProfile};
use crate::storage::Storage;

/// Service for user profile management
pub struct ProfileService<'a> {
    storage: &'a Storage,
}

impl<'a> ProfileService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Get a profile by user id
    pub fn get(&self, user_id: UserId) -> CifraResult<Option<UserProfile>> {
        self.storage.users.get(user_id)
    }

    /// Fetch the identity's profile, creating an unconfigured one if missing
    pub fn get_or_create(&self, identity: &Identity) -> CifraResult<UserProfile> {
        if let Some(existing) = self.storage.users.get(identity.id)? {
            return Ok(existing);
        }

        let profile = UserProfile::new(identity.id, identity.email.clone(), identity.display_name());
        self.storage.users.upsert(profile.clone())?;
        self.storage.users.save()?;

        self.storage.log_create(
            profile.id,
            EntityType::Profile,
            profile.id.to_string(),
            profile.name.clone(),
            &profile,
        )?;

        tracing::info!(user = %profile.id, "created profile");
        Ok(profile)
    }

    /// Apply a partial update
    pub fn update(&self, user_id: UserId, update: &ProfileUpdate) -> CifraResult<UserProfile> {
        update
            .validate()
            .map_err(|e| CifraError::Validation(e.to_string()))?;

        let mut profile = self
            .storage
            .users
            .get(user_id)?
            .ok_or_else(|| CifraError::profile_not_found(user_id.to_string()))?;

        let before = profile.clone();
        profile.apply(update);

        self.storage.users.upsert(profile.clone())?;
        self.storage.users.save()?;

        let diff = generate_diff(
            &serde_json::to_value(&before)?,
            &serde_json::to_value(&profile)?,
        );
        if diff.is_some() {
            self.storage.log_update(
                user_id,
                EntityType::Profile,
                profile.id.to_string(),
                profile.name.clone(),
                &before,
                &profile,
                diff,
            )?;
        }

        Ok(profile)
    }

    /// Finish first-run setup: name and a positive salary are required
    pub fn complete_setup(
        &self,
        user_id: UserId,
        name: &str,
        salary: Money,
        salary_type: SalaryType,
    ) -> CifraResult<UserProfile> {
        if name.trim().is_empty() {
            return Err(CifraError::Validation(
                ProfileValidationError::EmptyName.to_string(),
            ));
        }
        if !salary.is_positive() {
            return Err(CifraError::Validation(
                ProfileValidationError::NonPositiveSalary.to_string(),
            ));
        }

        self.update(
            user_id,
            &ProfileUpdate {
                name: Some(name.to_string()),
                salary: Some(salary),
                salary_type: Some(salary_type),
                configured: Some(true),
            },
        )
    }
}
