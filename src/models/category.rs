//! Category model
//!
//! Categories label expenses. Expenses reference their category by name, so
//! a category row only carries presentation data (icon, color, order).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, UserId};

/// Icon used when a category has none or an unknown one
pub const DEFAULT_ICON: &str = "Wallet";

/// Color given to categories created without one
pub const DEFAULT_COLOR: &str = "#64748b";

/// Icon names the dashboard knows how to draw
pub const KNOWN_ICONS: &[&str] = &[
    "Home",
    "Car",
    "Utensils",
    "Heart",
    "Gamepad2",
    "GraduationCap",
    "Shirt",
    "ShoppingCart",
    "Wallet",
];

/// Categories seeded for a user who has none: (name, icon, color)
pub const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    ("Vivienda", "Home", "#3b82f6"),
    ("Transporte", "Car", "#64748b"),
    ("Alimentación", "Utensils", "#6b7280"),
    ("Salud", "Heart", "#9ca3af"),
    ("Entretenimiento", "Gamepad2", "#d1d5db"),
    ("Educación", "GraduationCap", "#3b82f6"),
    ("Ropa", "Shirt", "#64748b"),
    ("Servicios", "ShoppingCart", "#6b7280"),
    ("Otros", "Wallet", "#9ca3af"),
];

/// Maximum category name length, in characters
pub const MAX_NAME_LEN: usize = 50;

/// An expense category owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Owning user
    pub user_id: UserId,

    /// Category name, referenced by expenses
    pub name: String,

    /// Icon name (see [`KNOWN_ICONS`])
    #[serde(default = "default_icon")]
    pub icon: String,

    /// Hex color
    #[serde(default = "default_color")]
    pub color: String,

    /// Position in listings
    #[serde(default)]
    pub sort_order: i32,

    /// When the category was created
    pub created_at: DateTime<Utc>,

    /// When the category was last modified
    pub updated_at: DateTime<Utc>,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Category {
    /// Create a new category with the default icon and color
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            user_id,
            name: name.into(),
            icon: default_icon(),
            color: default_color(),
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a fully specified category
    pub fn with_style(
        user_id: UserId,
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
        sort_order: i32,
    ) -> Self {
        let mut category = Self::new(user_id, name);
        category.icon = icon.into();
        category.color = color.into();
        category.sort_order = sort_order;
        category
    }

    /// The default category set for `user_id`, in display order
    pub fn defaults_for(user_id: UserId) -> Vec<Self> {
        DEFAULT_CATEGORIES
            .iter()
            .enumerate()
            .map(|(i, (name, icon, color))| {
                Self::with_style(user_id, *name, *icon, *color, i as i32)
            })
            .collect()
    }

    /// The icon to draw: the stored one when known, otherwise `Wallet`
    pub fn display_icon(&self) -> &str {
        if KNOWN_ICONS.contains(&self.icon.as_str()) {
            &self.icon
        } else {
            DEFAULT_ICON
        }
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        validate_name(&self.name)?;

        if !is_hex_color(&self.color) {
            return Err(CategoryValidationError::InvalidColor(self.color.clone()));
        }

        Ok(())
    }
}

/// Check a category name against the length rules
pub fn validate_name(name: &str) -> Result<(), CategoryValidationError> {
    if name.trim().is_empty() {
        return Err(CategoryValidationError::EmptyName);
    }

    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(CategoryValidationError::NameTooLong(len));
    }

    Ok(())
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => (hex.len() == 6 || hex.len() == 3) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Fields a category edit may change
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl CategoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.icon.is_none() && self.color.is_none()
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    InvalidColor(String),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max {})", len, MAX_NAME_LEN)
            }
            Self::InvalidColor(color) => write!(f, "Invalid color '{}', expected #rrggbb", color),
        }
    }
}

impl std::error::Error for CategoryValidationError {}
