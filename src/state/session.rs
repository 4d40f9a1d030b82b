//! Session and profile accessor
//!
//! Tracks who is signed in and their profile row. Failures never propagate:
//! they are logged and surface as a missing profile or a `false` result.

use crate::auth::Identity;
use crate::models::{Money, ProfileUpdate, SalaryType, UserProfile};
use crate::services::ProfileService;
use crate::storage::{SessionData, Storage};

/// The signed-in identity and its profile
pub struct SessionState<'a> {
    storage: &'a Storage,
    identity: Option<Identity>,
    profile: Option<UserProfile>,
}

impl<'a> SessionState<'a> {
    /// A signed-out session
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            identity: None,
            profile: None,
        }
    }

    /// Rebuild the session from the local cache
    pub fn restore(storage: &'a Storage) -> Self {
        let mut state = Self::new(storage);

        let cached = match storage.session.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "failed to read session cache");
                return state;
            }
        };

        if let Some(identity) = cached.identity {
            state.profile = state.fetch_profile(&identity);
            state.identity = Some(identity);
        }
        state
    }

    fn fetch_profile(&self, identity: &Identity) -> Option<UserProfile> {
        match ProfileService::new(self.storage).get_or_create(identity) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::error!(user = %identity.id, error = %e, "failed to load profile");
                None
            }
        }
    }

    /// Sign in, creating the profile on first use. The selected month and
    /// created months survive only if the same user signs in again.
    pub fn sign_in(&mut self, identity: Identity) -> bool {
        let mut session = self.storage.session.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "discarding unreadable session cache");
            SessionData::default()
        });

        let same_user = session.identity.as_ref().map(|i| i.id) == Some(identity.id);
        if !same_user {
            session = SessionData::default();
        }
        session.identity = Some(identity.clone());

        if let Err(e) = self.storage.session.save(&session) {
            tracing::error!(error = %e, "failed to write session cache");
            return false;
        }

        self.profile = self.fetch_profile(&identity);
        self.identity = Some(identity);
        self.profile.is_some()
    }

    /// Forget the identity, profile and session cache
    pub fn sign_out(&mut self) {
        if let Err(e) = self.storage.session.clear() {
            tracing::error!(error = %e, "failed to clear session cache");
        }
        self.identity = None;
        self.profile = None;
    }

    pub fn user(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_configured(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.configured)
    }

    /// The profile's salary, zero when unknown
    pub fn salary(&self) -> Money {
        self.profile
            .as_ref()
            .map(UserProfile::salary_or_zero)
            .unwrap_or_default()
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.identity.as_ref().and_then(Identity::avatar_url)
    }

    /// Apply a partial profile update; the cached profile is replaced on
    /// success
    pub fn update_profile(&mut self, update: &ProfileUpdate) -> bool {
        let (Some(identity), Some(_)) = (&self.identity, &self.profile) else {
            return false;
        };

        match ProfileService::new(self.storage).update(identity.id, update) {
            Ok(profile) => {
                self.profile = Some(profile);
                true
            }
            Err(e) => {
                tracing::error!(user = %identity.id, error = %e, "profile update failed");
                false
            }
        }
    }

    /// Record name and salary and mark the profile configured
    pub fn complete_setup(&mut self, name: &str, salary: Money, salary_type: SalaryType) -> bool {
        let (Some(identity), Some(_)) = (&self.identity, &self.profile) else {
            return false;
        };

        match ProfileService::new(self.storage).complete_setup(identity.id, name, salary, salary_type) {
            Ok(profile) => {
                self.profile = Some(profile);
                true
            }
            Err(e) => {
                tracing::error!(user = %identity.id, error = %e, "setup failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CifraPaths;
    use crate::models::UserId;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CifraPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn identity() -> Identity {
        Identity::new(UserId::new(), "ana@example.com")
            .with_metadata("name", "Ana")
            .with_metadata("picture", "https://img/ana.png")
    }

    #[test]
    fn test_sign_in_creates_profile() {
        let (_temp_dir, storage) = create_test_storage();
        let mut session = SessionState::new(&storage);

        assert!(session.sign_in(identity()));
        assert!(session.is_authenticated());
        assert!(!session.is_configured());
        assert_eq!(session.profile().unwrap().display_name(), "Ana");
        assert_eq!(session.avatar_url(), Some("https://img/ana.png"));
    }

    #[test]
    fn test_restore_from_cache() {
        let (_temp_dir, storage) = create_test_storage();
        let identity = identity();
        SessionState::new(&storage).sign_in(identity.clone());

        let restored = SessionState::restore(&storage);
        assert_eq!(restored.user().map(|i| i.id), Some(identity.id));
        assert!(restored.profile().is_some());
    }

    #[test]
    fn test_update_without_user_returns_false() {
        let (_temp_dir, storage) = create_test_storage();
        let mut session = SessionState::new(&storage);
        assert!(!session.update_profile(&ProfileUpdate::default()));
        assert!(!session.complete_setup("Ana", Money::from_units(1), SalaryType::Fixed));
    }

    #[test]
    fn test_complete_setup_and_update() {
        let (_temp_dir, storage) = create_test_storage();
        let mut session = SessionState::new(&storage);
        session.sign_in(identity());

        assert!(!session.complete_setup("Ana", Money::zero(), SalaryType::Fixed));
        assert!(!session.is_configured());

        assert!(session.complete_setup("Ana", Money::from_units(50000), SalaryType::Variable));
        assert!(session.is_configured());
        assert_eq!(session.salary(), Money::from_units(50000));

        assert!(session.update_profile(&ProfileUpdate {
            salary: Some(Money::from_units(60000)),
            ..Default::default()
        }));
        assert_eq!(session.salary(), Money::from_units(60000));
    }

    #[test]
    fn test_sign_out_clears_everything() {
        let (_temp_dir, storage) = create_test_storage();
        let mut session = SessionState::new(&storage);
        session.sign_in(identity());
        session.sign_out();

        assert!(!session.is_authenticated());
        assert!(session.profile().is_none());
        assert!(!SessionState::restore(&storage).is_authenticated());
    }
}
