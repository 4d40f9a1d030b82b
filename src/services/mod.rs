//! Service layer for Cifra
//!
//! Validation, audit logging and user scoping on top of the storage layer.
//! Every operation returns a `CifraResult`.

pub mod category;
pub mod expense;
pub mod profile;

pub use category::CategoryService;
pub use expense::{ExpenseService, MonthStats};
pub use profile::ProfileService;
