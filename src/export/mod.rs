//! Export module for Cifra
//!
//! - JSON: full backup of a user's profile, categories and expenses, which
//!   `cifra import` restores
//! - CSV: one month's expenses for spreadsheets

pub mod csv;
pub mod json;

pub use csv::{export_expenses_csv, CSV_HEADERS};
pub use json::{
    backup_file_name, export_backup_json, import_backup, BackupCategory, BackupDocument,
    BackupExpense, BackupUser, ImportSummary,
};
