//! User profile model
//!
//! One row per signed-in identity. Holds the salary the dashboard measures
//! spending against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::UserId;
use super::money::Money;

/// Name given to profiles whose provider sent none
pub const DEFAULT_PROFILE_NAME: &str = "Usuario";

/// Whether the salary is the same every month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalaryType {
    #[serde(rename = "Fijo")]
    Fixed,
    #[serde(rename = "Variable")]
    Variable,
}

impl SalaryType {
    /// Parse from user input ("fijo", "fixed", "variable")
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fijo" | "fixed" => Some(Self::Fixed),
            "variable" => Some(Self::Variable),
            _ => None,
        }
    }

    /// The stored label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fixed => "Fijo",
            Self::Variable => "Variable",
        }
    }
}

impl fmt::Display for SalaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The `users` table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Same id as the authenticated identity
    pub id: UserId,

    pub email: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Monthly salary
    #[serde(default)]
    pub salary: Option<Money>,

    #[serde(default)]
    pub salary_type: Option<SalaryType>,

    /// Set once the setup step has been completed
    #[serde(default)]
    pub configured: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Create an unconfigured profile
    pub fn new(id: UserId, email: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: email.into(),
            name: Some(name.into()),
            salary: None,
            salary_type: None,
            configured: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The name to greet the user with
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_PROFILE_NAME)
    }

    /// Salary, or zero when not set
    pub fn salary_or_zero(&self) -> Money {
        self.salary.unwrap_or_default()
    }

    /// Apply a partial update and stamp `updated_at`
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(name) = &update.name {
            self.name = Some(name.trim().to_string());
        }
        if let Some(salary) = update.salary {
            self.salary = Some(salary);
        }
        if let Some(salary_type) = update.salary_type {
            self.salary_type = Some(salary_type);
        }
        if let Some(configured) = update.configured {
            self.configured = configured;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial profile update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub salary: Option<Money>,
    pub salary_type: Option<SalaryType>,
    pub configured: Option<bool>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.salary.is_none()
            && self.salary_type.is_none()
            && self.configured.is_none()
    }

    /// Check the fields that are present
    pub fn validate(&self) -> Result<(), ProfileValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ProfileValidationError::EmptyName);
            }
        }
        if let Some(salary) = self.salary {
            if salary.is_negative() {
                return Err(ProfileValidationError::NegativeSalary);
            }
        }
        Ok(())
    }
}

/// Validation errors for profiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    EmptyName,
    NegativeSalary,
    NonPositiveSalary,
}

impl fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Name cannot be empty"),
            Self::NegativeSalary => write!(f, "Salary cannot be negative"),
            Self::NonPositiveSalary => write!(f, "Salary must be greater than zero"),
        }
    }
}

impl std::error::Error for ProfileValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_is_unconfigured() {
        let profile = UserProfile::new(UserId::new(), "ana@example.com", "Ana");
        assert!(!profile.configured);
        assert_eq!(profile.display_name(), "Ana");
        assert_eq!(profile.salary_or_zero(), Money::zero());
    }

    #[test]
    fn test_display_name_default() {
        let mut profile = UserProfile::new(UserId::new(), "x@example.com", "");
        assert_eq!(profile.display_name(), "Usuario");
        profile.name = None;
        assert_eq!(profile.display_name(), "Usuario");
    }

    #[test]
    fn test_apply_partial_update() {
        let mut profile = UserProfile::new(UserId::new(), "ana@example.com", "Ana");
        let before = profile.updated_at;

        profile.apply(&ProfileUpdate {
            salary: Some(Money::from_units(50000)),
            configured: Some(true),
            ..Default::default()
        });

        assert_eq!(profile.name.as_deref(), Some("Ana"));
        assert_eq!(profile.salary, Some(Money::from_units(50000)));
        assert!(profile.configured);
        assert!(profile.updated_at >= before);
    }

    #[test]
    fn test_update_validation() {
        let update = ProfileUpdate {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(update.validate(), Err(ProfileValidationError::EmptyName));

        let update = ProfileUpdate {
            salary: Some(Money::from_units(-1)),
            ..Default::default()
        };
        assert_eq!(update.validate(), Err(ProfileValidationError::NegativeSalary));
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_salary_type_serialization() {
        assert_eq!(serde_json::to_string(&SalaryType::Fixed).unwrap(), "\"Fijo\"");
        assert_eq!(SalaryType::parse("VARIABLE"), Some(SalaryType::Variable));
        assert_eq!(SalaryType::parse("fixed"), Some(SalaryType::Fixed));
        assert_eq!(SalaryType::parse("mensual"), None);
    }
}
