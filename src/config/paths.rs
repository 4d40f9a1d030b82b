//! Path management for Cifra
//!
//! Resolves where configuration, backend tables, the session cache and logs
//! live on disk.
//!
//! ## Path Resolution Order
//!
//! 1. `CIFRA_DATA_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories`
//!    (e.g. `~/.config/cifra` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::CifraError;

/// Manages all paths used by Cifra
#[derive(Debug, Clone)]
pub struct CifraPaths {
    /// Base directory for all Cifra data
    base_dir: PathBuf,
}

impl CifraPaths {
    /// Create a new CifraPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and no
    /// override is set.
    pub fn new() -> Result<Self, CifraError> {
        let base_dir = if let Ok(custom) = std::env::var("CIFRA_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create CifraPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the directory holding the backend tables
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the directory for diagnostic log files
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the local session cache
    pub fn session_file(&self) -> PathBuf {
        self.base_dir.join("session.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to the `users` table
    pub fn users_file(&self) -> PathBuf {
        self.data_dir().join("users.json")
    }

    /// Get the path to the `categories` table
    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    /// Get the path to the `expenses` table
    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), CifraError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CifraError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| CifraError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.logs_dir())
            .map_err(|e| CifraError::Io(format!("Failed to create logs directory: {}", e)))?;

        Ok(())
    }
}

fn resolve_default_path() -> Result<PathBuf, CifraError> {
    ProjectDirs::from("", "", "cifra")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| CifraError::Config("Could not determine a home directory".into()))
}
