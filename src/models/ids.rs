//! Strongly-typed ID wrappers for the three backend tables
//!
//! Using newtype wrappers prevents accidentally mixing up a user id with an
//! expense id at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse an ID from a full UUID string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Whether `short` identifies this id: the full UUID, the display
            /// form (`exp-1a2b3c4d`) or a hex prefix of at least 4 chars.
            pub fn matches_short(&self, short: &str) -> bool {
                let short = short.trim();
                let bare = short.strip_prefix($display_prefix).unwrap_or(short);
                if bare.len() < 4 {
                    return false;
                }
                self.0.to_string().starts_with(&bare.to_lowercase())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(UserId, "usr-");
define_id!(CategoryId, "cat-");
define_id!(ExpenseId, "exp-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = ExpenseId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("exp-"));
        assert_eq!(display.len(), 12);
    }

    #[test]
    fn test_id_serialization() {
        let id = CategoryId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: CategoryId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_id_parse() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id = UserId::parse(uuid_str).unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);

        let prefixed: UserId = format!("usr-{}", uuid_str).parse().unwrap();
        assert_eq!(prefixed, id);
    }

    #[test]
    fn test_matches_short() {
        let id = ExpenseId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert!(id.matches_short("exp-550e8400"));
        assert!(id.matches_short("550e"));
        assert!(id.matches_short("550E8400-E29B-41D4-A716-446655440000"));
        assert!(!id.matches_short("55"));
        assert!(!id.matches_short("exp-deadbeef"));
    }
}
