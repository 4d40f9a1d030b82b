//! Local session cache
//!
//! Holds the signed-in identity between invocations together with the
//! selected month and months created without any expenses yet.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::error::CifraError;
use crate::models::MonthKey;

use super::file_io::{read_json, remove_if_exists, write_json_atomic};

/// Contents of session.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub identity: Option<Identity>,

    /// The month the dashboard shows
    #[serde(default)]
    pub current_month: Option<MonthKey>,

    /// Months added with `month new` that may still be empty
    #[serde(default)]
    pub created_months: Vec<MonthKey>,
}

impl SessionData {
    /// Remember a created month (no duplicates)
    pub fn remember_month(&mut self, month: MonthKey) {
        if !self.created_months.contains(&month) {
            self.created_months.push(month);
        }
    }

    pub fn forget_month(&mut self, month: MonthKey) {
        self.created_months.retain(|m| *m != month);
    }
}

/// Reads and writes the session cache file
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the session; a missing file is an empty session
    pub fn load(&self) -> Result<SessionData, CifraError> {
        read_json(&self.path)
    }

    pub fn save(&self, session: &SessionData) -> Result<(), CifraError> {
        write_json_atomic(&self.path, session)
    }

    /// Remove the session file
    pub fn clear(&self) -> Result<(), CifraError> {
        remove_if_exists(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path().join("session.json"));
        assert_eq!(store.load().unwrap(), SessionData::default());

        let mut session = SessionData {
            identity: Some(Identity::new(UserId::new(), "ana@example.com")),
            current_month: Some(MonthKey::parse("2026-10").unwrap()),
            created_months: Vec::new(),
        };
        session.remember_month(MonthKey::parse("2026-11").unwrap());
        session.remember_month(MonthKey::parse("2026-11").unwrap());
        store.save(&session).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.created_months.len(), 1);

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), SessionData::default());
    }
}
