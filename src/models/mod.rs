//! Core data models for Cifra
//!
//! This module contains the rows of the three backend tables (user profiles,
//! categories, expenses) and the value types they are built from.

pub mod category;
pub mod expense;
pub mod ids;
pub mod money;
pub mod month;
pub mod profile;

pub use category::{Category, CategoryUpdate, DEFAULT_CATEGORIES, KNOWN_ICONS};
pub use expense::{Expense, ExpenseType, ExpenseUpdate, NewExpense, PaymentMethod};
pub use ids::{CategoryId, ExpenseId, UserId};
pub use money::Money;
pub use month::MonthKey;
pub use profile::{ProfileUpdate, SalaryType, UserProfile};
