//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the
//! clap argument parsing with the state accessors. Handlers check their
//! input first so that a failed write can only mean a storage problem.

pub mod audit;
pub mod auth;
pub mod category;
pub mod dashboard;
pub mod expense;
pub mod export;
pub mod month;
pub mod profile;
pub mod setup;

pub use audit::{handle_audit_command, AuditArgs};
pub use auth::{handle_login_command, handle_logout_command, handle_whoami_command, LoginArgs};
pub use category::{handle_category_command, CategoryCommands};
pub use dashboard::{handle_dashboard_command, handle_home_command, DashboardArgs};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, handle_import_command, ExportArgs, ExportFormat, ImportArgs};
pub use month::{handle_month_command, MonthCommands};
pub use profile::{handle_profile_command, ProfileCommands};
pub use setup::{handle_setup_command, SetupArgs};

use crate::auth::Identity;
use crate::error::{CifraError, CifraResult};
use crate::models::{ExpenseType, Money, MonthKey, PaymentMethod, SalaryType};
use crate::state::{AppContext, SessionState};

/// The restored session and its identity, or `Unauthenticated`
pub(crate) fn signed_in(ctx: &AppContext) -> CifraResult<(SessionState<'_>, Identity)> {
    let session = ctx.session();
    let identity = ctx.require_user(&session)?.clone();
    Ok((session, identity))
}

/// An accessor reported failure after the input was already checked
pub(crate) fn write_failed(action: &str) -> CifraError {
    CifraError::Storage(format!(
        "Failed to {}. See the log file for details.",
        action
    ))
}

pub(crate) fn parse_money(s: &str) -> CifraResult<Money> {
    Money::parse(s).map_err(|e| CifraError::Validation(format!("Invalid amount: {}", e)))
}

pub(crate) fn parse_month(s: &str) -> CifraResult<MonthKey> {
    MonthKey::parse(s).map_err(|e| CifraError::Validation(e.to_string()))
}

pub(crate) fn parse_expense_type(s: &str) -> CifraResult<ExpenseType> {
    ExpenseType::parse(s).ok_or_else(|| {
        CifraError::Validation(format!(
            "Unknown expense type '{}'. Use fijo, variable, cuotas or unica.",
            s
        ))
    })
}

pub(crate) fn parse_payment_method(s: &str) -> CifraResult<PaymentMethod> {
    PaymentMethod::parse(s).ok_or_else(|| {
        CifraError::Validation(format!(
            "Unknown payment method '{}'. Use tarjeta, cash or transferencia.",
            s
        ))
    })
}

pub(crate) fn parse_salary_type(s: &str) -> CifraResult<SalaryType> {
    SalaryType::parse(s).ok_or_else(|| {
        CifraError::Validation(format!("Unknown salary type '{}'. Use fijo or variable.", s))
    })
}
