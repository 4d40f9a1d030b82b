//! JSON backup export and import
//!
//! The backup document keeps the wire names of the hosted app so backups
//! move between the two:
//!
//! ```json
//! {
//!   "user": { "nombre": "Ana", "sueldo": 50000, "tipoSueldo": "Fijo", "configurado": true },
//!   "categories": [ { "id": "...", "name": "Vivienda", "icon": "Home", "color": "#3b82f6" } ],
//!   "expenses": { "2026-10": [ { "id": "...", "nombre": "Alquiler", "importe": 250000, ... } ] }
//! }
//! ```
//!
//! Amounts are decimal currency units. Every key is optional on import;
//! a missing key leaves that part of the data alone.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::EntityType;
use crate::error::{CifraError, CifraResult};
use crate::models::category::{DEFAULT_COLOR, DEFAULT_ICON};
use crate::models::{
    Category, CategoryId, Expense, ExpenseId, ExpenseType, Money, MonthKey, PaymentMethod,
    ProfileUpdate, SalaryType, UserId, UserProfile,
};
use crate::services::{CategoryService, ExpenseService, ProfileService};
use crate::storage::Storage;

/// Default backup file name for a given day
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("cifra-backup-{}.json", date.format("%Y-%m-%d"))
}

/// The profile part of a backup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupUser {
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "sueldo", default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,

    #[serde(rename = "tipoSueldo", default, skip_serializing_if = "Option::is_none")]
    pub salary_type: Option<SalaryType>,

    #[serde(rename = "configurado", default, skip_serializing_if = "Option::is_none")]
    pub configured: Option<bool>,
}

/// A category in a backup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupCategory {
    pub id: String,
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// An expense in a backup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupExpense {
    pub id: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "importe")]
    pub amount: f64,
    #[serde(rename = "porcentajeSueldo", default, skip_serializing_if = "Option::is_none")]
    pub salary_percentage: Option<f64>,
    #[serde(rename = "tipoGasto")]
    pub expense_type: ExpenseType,
    #[serde(rename = "medioPago")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "cuotas", default, skip_serializing_if = "Option::is_none")]
    pub installments: Option<u32>,
    #[serde(rename = "fechaCreacion")]
    pub created_at: DateTime<Utc>,
}

/// A full backup of one user's data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<BackupUser>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<BackupCategory>>,

    /// Month key -> expenses of that month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expenses: Option<BTreeMap<String, Vec<BackupExpense>>>,
}

impl From<&UserProfile> for BackupUser {
    fn from(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: Some(profile.email.clone()),
            salary: profile.salary.map(|s| s.to_decimal()),
            salary_type: profile.salary_type,
            configured: Some(profile.configured),
        }
    }
}

impl From<&Category> for BackupCategory {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.as_uuid().to_string(),
            name: category.name.clone(),
            icon: category.icon.clone(),
            color: category.color.clone(),
        }
    }
}

impl From<&Expense> for BackupExpense {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id.as_uuid().to_string(),
            name: expense.name.clone(),
            category: expense.category.clone(),
            amount: expense.amount.to_decimal(),
            salary_percentage: expense.salary_percentage,
            expense_type: expense.expense_type,
            payment_method: expense.payment_method,
            installments: expense.installments,
            created_at: expense.created_at,
        }
    }
}

impl BackupDocument {
    /// Collect everything a user owns. Months created but still empty are
    /// included as empty lists.
    pub fn from_storage(storage: &Storage, user_id: UserId) -> CifraResult<Self> {
        let user = storage.users.get(user_id)?.as_ref().map(BackupUser::from);

        let categories = CategoryService::new(storage)
            .list(user_id)?
            .iter()
            .map(BackupCategory::from)
            .collect();

        let mut expenses: BTreeMap<String, Vec<BackupExpense>> = BTreeMap::new();
        for expense in ExpenseService::new(storage).list_all(user_id)? {
            expenses
                .entry(expense.month.to_string())
                .or_default()
                .push(BackupExpense::from(&expense));
        }

        let session = storage.session.load()?;
        if session.identity.as_ref().map(|i| i.id) == Some(user_id) {
            for month in session.created_months {
                expenses.entry(month.to_string()).or_default();
            }
        }

        Ok(Self {
            user,
            categories: Some(categories),
            expenses: Some(expenses),
        })
    }

    /// Parse a backup, rejecting anything that is not a backup document
    pub fn parse(json: &str) -> CifraResult<Self> {
        let document: Self = serde_json::from_str(json)
            .map_err(|e| CifraError::Import(format!("Invalid backup file: {}", e)))?;

        if document.user.is_none() && document.categories.is_none() && document.expenses.is_none() {
            return Err(CifraError::Import(
                "Backup contains none of 'user', 'categories' or 'expenses'".into(),
            ));
        }
        Ok(document)
    }
}

/// Write a user's backup as pretty JSON
pub fn export_backup_json<W: Write>(storage: &Storage, user_id: UserId, writer: &mut W) -> CifraResult<()> {
    let document = BackupDocument::from_storage(storage, user_id)?;
    serde_json::to_writer_pretty(writer, &document).map_err(|e| CifraError::Export(e.to_string()))?;
    Ok(())
}

/// What an import changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub profile_updated: bool,
    pub categories: Option<usize>,
    /// Each replaced month with its new expense count
    pub months: Vec<(MonthKey, usize)>,
}

/// A backup converted to rows, ready to write
struct PreparedImport {
    profile: Option<ProfileUpdate>,
    categories: Option<Vec<Category>>,
    months: Vec<(MonthKey, Vec<Expense>)>,
}

fn import_amount(value: f64, what: &str) -> CifraResult<Money> {
    Money::try_from_decimal(value)
        .ok_or_else(|| CifraError::Import(format!("{}: amount out of range: {}", what, value)))
}

/// Keep a backup id only when it is free or already ours, and only once per
/// backup. Anything else gets a fresh id.
fn claim_id<I>(
    parsed: Option<I>,
    owner: impl Fn(I) -> CifraResult<Option<UserId>>,
    user_id: UserId,
    seen: &mut HashSet<I>,
) -> CifraResult<I>
where
    I: Copy + Eq + std::hash::Hash + Default,
{
    if let Some(id) = parsed {
        let ours = owner(id)?.map_or(true, |owner| owner == user_id);
        if ours && seen.insert(id) {
            return Ok(id);
        }
    }
    let fresh = I::default();
    seen.insert(fresh);
    Ok(fresh)
}

fn prepare(storage: &Storage, document: &BackupDocument, user_id: UserId) -> CifraResult<PreparedImport> {
    let profile = match &document.user {
        Some(user) => {
            let update = ProfileUpdate {
                name: user.name.clone().filter(|n| !n.trim().is_empty()),
                salary: user.salary.map(|s| import_amount(s, "user")).transpose()?,
                salary_type: user.salary_type,
                configured: user.configured,
            };
            update
                .validate()
                .map_err(|e| CifraError::Import(format!("user: {}", e)))?;
            Some(update)
        }
        None => None,
    };

    let categories = match &document.categories {
        Some(list) => {
            let mut rows = Vec::with_capacity(list.len());
            let mut seen = HashSet::new();
            for (i, entry) in list.iter().enumerate() {
                let mut category = Category::with_style(
                    user_id,
                    entry.name.trim(),
                    entry.icon.clone(),
                    entry.color.clone(),
                    i as i32,
                );
                category.id = claim_id(
                    CategoryId::parse(&entry.id).ok(),
                    |id| storage.categories.owner_of(id),
                    user_id,
                    &mut seen,
                )?;
                category
                    .validate()
                    .map_err(|e| CifraError::Import(format!("category '{}': {}", entry.name, e)))?;
                rows.push(category);
            }
            Some(rows)
        }
        None => None,
    };

    let mut months = Vec::new();
    let mut seen = HashSet::new();
    for (key, entries) in document.expenses.iter().flatten() {
        let month = MonthKey::parse(key).map_err(|e| CifraError::Import(e.to_string()))?;
        let mut rows = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = claim_id(
                ExpenseId::parse(&entry.id).ok(),
                |id| storage.expenses.owner_of(id),
                user_id,
                &mut seen,
            )?;
            let expense = Expense {
                id,
                user_id,
                name: entry.name.trim().to_string(),
                category: entry.category.trim().to_string(),
                amount: import_amount(entry.amount, &entry.name)?,
                salary_percentage: entry.salary_percentage,
                expense_type: entry.expense_type,
                payment_method: entry.payment_method,
                installments: entry.installments.filter(|_| entry.expense_type == ExpenseType::Installments),
                month,
                created_at: entry.created_at,
                updated_at: entry.created_at,
            };
            expense
                .validate()
                .map_err(|e| CifraError::Import(format!("{} '{}': {}", month, entry.name, e)))?;
            rows.push(expense);
        }
        months.push((month, rows));
    }

    Ok(PreparedImport {
        profile,
        categories,
        months,
    })
}

/// Restore a backup into a user's data
///
/// The whole document is checked before anything is written. Then the
/// profile fields are overwritten, the category list is replaced, and each
/// month present in the backup replaces that month's expenses.
pub fn import_backup(storage: &Storage, user_id: UserId, document: &BackupDocument) -> CifraResult<ImportSummary> {
    let prepared = prepare(storage, document, user_id)?;
    let mut summary = ImportSummary::default();

    if let Some(update) = prepared.profile {
        ProfileService::new(storage).update(user_id, &update)?;
        summary.profile_updated = true;
    }

    if let Some(categories) = prepared.categories {
        let before = CategoryService::new(storage).list(user_id)?;
        let count = CategoryService::new(storage).replace_all(user_id, categories)?;
        storage.log_update(
            user_id,
            EntityType::Category,
            "all",
            None,
            &before.len(),
            &count,
            Some(format!("imported {} categories", count)),
        )?;
        summary.categories = Some(count);
    }

    let expenses = ExpenseService::new(storage);
    for (month, rows) in prepared.months {
        let before = expenses.list_month(user_id, month)?;
        let count = expenses.replace_month(user_id, month, rows)?;
        storage.log_update(
            user_id,
            EntityType::Month,
            month.to_string(),
            Some(month.label()),
            &before.len(),
            &count,
            Some(format!("imported {} expenses", count)),
        )?;
        summary.months.push((month, count));
    }

    tracing::info!(
        user = %user_id,
        months = summary.months.len(),
        categories = ?summary.categories,
        "backup imported"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;
    use crate::config::paths::CifraPaths;
    use crate::models::NewExpense;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CifraPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn month(s: &str) -> MonthKey {
        MonthKey::parse(s).unwrap()
    }

    fn seed(storage: &Storage) -> UserId {
        let identity = Identity::new(UserId::new(), "ana@example.com");
        let profiles = ProfileService::new(storage);
        profiles.get_or_create(&identity).unwrap();
        profiles
            .complete_setup(identity.id, "Ana", Money::from_units(50000), SalaryType::Fixed)
            .unwrap();
        CategoryService::new(storage).ensure_defaults(identity.id).unwrap();

        let expenses = ExpenseService::new(storage);
        let salary = Money::from_units(50000);
        let mut cuotas = NewExpense::new(
            "Heladera",
            "Otros",
            Money::from_cents(12_345_67),
            ExpenseType::Installments,
            PaymentMethod::Card,
        );
        cuotas.installments = Some(12);
        expenses.create(identity.id, month("2026-09"), &cuotas, salary).unwrap();
        expenses
            .create(
                identity.id,
                month("2026-10"),
                &NewExpense::new(
                    "Supermercado",
                    "Alimentación",
                    Money::from_units(5000),
                    ExpenseType::Fixed,
                    PaymentMethod::Cash,
                ),
                salary,
            )
            .unwrap();
        identity.id
    }

    #[test]
    fn test_backup_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(backup_file_name(date), "cifra-backup-2026-10-19.json");
    }

    #[test]
    fn test_wire_names() {
        let (_temp_dir, storage) = create_test_storage();
        let user = seed(&storage);

        let mut out = Vec::new();
        export_backup_json(&storage, user, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["user"]["nombre"], "Ana");
        assert_eq!(value["user"]["sueldo"], 50000.0);
        assert_eq!(value["user"]["tipoSueldo"], "Fijo");
        assert_eq!(value["user"]["configurado"], true);
        assert_eq!(value["categories"].as_array().unwrap().len(), 9);

        let october = &value["expenses"]["2026-10"][0];
        assert_eq!(october["nombre"], "Supermercado");
        assert_eq!(october["categoria"], "Alimentación");
        assert_eq!(october["importe"], 5000.0);
        assert_eq!(october["porcentajeSueldo"], 10.0);
        assert_eq!(october["tipoGasto"], "Fijo");
        assert_eq!(october["medioPago"], "Cash");
        assert!(october.get("cuotas").is_none());
        assert_eq!(value["expenses"]["2026-09"][0]["cuotas"], 12);
    }

    #[test]
    fn test_export_then_import_reproduces_data() {
        let (_temp_dir, storage) = create_test_storage();
        let user = seed(&storage);
        let categories_before = CategoryService::new(&storage).list(user).unwrap();
        let september_before = ExpenseService::new(&storage).list_month(user, month("2026-09")).unwrap();
        let october_before = ExpenseService::new(&storage).list_month(user, month("2026-10")).unwrap();

        let document = BackupDocument::from_storage(&storage, user).unwrap();
        let json = serde_json::to_string(&document).unwrap();

        // Wreck the data, then restore it
        ExpenseService::new(&storage).delete_month(user, month("2026-09")).unwrap();
        CategoryService::new(&storage).create(user, "Basura", None, None).unwrap();

        let summary = import_backup(&storage, user, &BackupDocument::parse(&json).unwrap()).unwrap();
        assert!(summary.profile_updated);
        assert_eq!(summary.categories, Some(9));
        assert_eq!(summary.months.len(), 2);

        let categories_after = CategoryService::new(&storage).list(user).unwrap();
        let key = |c: &Category| (c.id, c.name.clone(), c.icon.clone(), c.color.clone(), c.sort_order);
        assert_eq!(
            categories_after.iter().map(key).collect::<Vec<_>>(),
            categories_before.iter().map(key).collect::<Vec<_>>()
        );

        for (m, before) in [("2026-09", september_before), ("2026-10", october_before)] {
            let after = ExpenseService::new(&storage).list_month(user, month(m)).unwrap();
            let strip = |e: &Expense| {
                (
                    e.id,
                    e.name.clone(),
                    e.category.clone(),
                    e.amount,
                    e.salary_percentage,
                    e.expense_type,
                    e.payment_method,
                    e.installments,
                    e.created_at,
                )
            };
            assert_eq!(
                after.iter().map(strip).collect::<Vec<_>>(),
                before.iter().map(strip).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn test_missing_keys_leave_data_alone() {
        let (_temp_dir, storage) = create_test_storage();
        let user = seed(&storage);

        let json = r#"{"expenses": {"2026-10": []}}"#;
        let summary = import_backup(&storage, user, &BackupDocument::parse(json).unwrap()).unwrap();

        assert!(!summary.profile_updated);
        assert_eq!(summary.categories, None);
        assert!(ExpenseService::new(&storage).list_month(user, month("2026-10")).unwrap().is_empty());
        assert_eq!(ExpenseService::new(&storage).list_month(user, month("2026-09")).unwrap().len(), 1);
        assert_eq!(CategoryService::new(&storage).list(user).unwrap().len(), 9);
    }

    #[test]
    fn test_malformed_backup_changes_nothing() {
        let (_temp_dir, storage) = create_test_storage();
        let user = seed(&storage);

        assert!(matches!(BackupDocument::parse("not json"), Err(CifraError::Import(_))));
        assert!(matches!(BackupDocument::parse("{}"), Err(CifraError::Import(_))));

        // Second month is invalid: the first must not be applied either
        let json = r#"{
            "expenses": {
                "2026-10": [],
                "2026-13": []
            }
        }"#;
        let document = BackupDocument::parse(json).unwrap();
        assert!(matches!(import_backup(&storage, user, &document), Err(CifraError::Import(_))));
        assert_eq!(ExpenseService::new(&storage).list_month(user, month("2026-10")).unwrap().len(), 1);
    }

    #[test]
    fn test_imports_hosted_app_ids() {
        let (_temp_dir, storage) = create_test_storage();
        let user = seed(&storage);

        let json = r##"{
            "categories": [ { "id": "1", "name": "Vivienda", "icon": "Home", "color": "#3b82f6" } ],
            "expenses": { "2026-11": [ {
                "id": "1718000000000",
                "nombre": "Alquiler",
                "categoria": "Vivienda",
                "importe": 250000,
                "tipoGasto": "Fijo",
                "medioPago": "Transferencia",
                "fechaCreacion": "2026-11-01T12:00:00.000Z"
            } ] }
        }"##;
        import_backup(&storage, user, &BackupDocument::parse(json).unwrap()).unwrap();

        let categories = CategoryService::new(&storage).list(user).unwrap();
        assert_eq!(categories.len(), 1);
        let november = ExpenseService::new(&storage).list_month(user, month("2026-11")).unwrap();
        assert_eq!(november[0].amount, Money::from_units(250000));
        assert_eq!(november[0].payment_method, PaymentMethod::Transfer);
    }

    #[test]
    fn test_importing_someone_elses_backup_leaves_their_data() {
        let (_temp_dir, storage) = create_test_storage();
        let ana = seed(&storage);
        let ana_categories = CategoryService::new(&storage).list(ana).unwrap();
        let document = BackupDocument::from_storage(&storage, ana).unwrap();

        let bruno = Identity::new(UserId::new(), "bruno@example.com");
        ProfileService::new(&storage).get_or_create(&bruno).unwrap();
        let summary = import_backup(&storage, bruno.id, &document).unwrap();
        assert_eq!(summary.categories, Some(9));

        let after = CategoryService::new(&storage).list(ana).unwrap();
        assert_eq!(
            after.iter().map(|c| c.id).collect::<Vec<_>>(),
            ana_categories.iter().map(|c| c.id).collect::<Vec<_>>()
        );
        let expenses = ExpenseService::new(&storage);
        assert_eq!(expenses.list_month(ana, month("2026-10")).unwrap().len(), 1);
        assert_eq!(expenses.list_month(ana, month("2026-09")).unwrap().len(), 1);

        let copied = CategoryService::new(&storage).list(bruno.id).unwrap();
        assert_eq!(copied.len(), 9);
        assert!(copied.iter().all(|c| ana_categories.iter().all(|a| a.id != c.id)));
        let bruno_october = expenses.list_month(bruno.id, month("2026-10")).unwrap();
        assert_eq!(bruno_october[0].name, "Supermercado");
        assert_ne!(bruno_october[0].id, expenses.list_month(ana, month("2026-10")).unwrap()[0].id);
    }

    #[test]
    fn test_missing_configured_flag_keeps_profile_configured() {
        let (_temp_dir, storage) = create_test_storage();
        let user = seed(&storage);

        let json = r#"{"user": {"nombre": "Ana María"}}"#;
        import_backup(&storage, user, &BackupDocument::parse(json).unwrap()).unwrap();

        let profile = storage.users.get(user).unwrap().unwrap();
        assert_eq!(profile.name.as_deref(), Some("Ana María"));
        assert!(profile.configured);
    }

    #[test]
    fn test_out_of_range_amount_is_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let user = seed(&storage);

        let json = r#"{"expenses": {"2026-10": [ {
            "id": "1",
            "nombre": "Enorme",
            "categoria": "Otros",
            "importe": 1e300,
            "tipoGasto": "Variable",
            "medioPago": "Cash",
            "fechaCreacion": "2026-10-01T12:00:00Z"
        } ] }}"#;
        let document = BackupDocument::parse(json).unwrap();
        assert!(matches!(import_backup(&storage, user, &document), Err(CifraError::Import(_))));
        assert_eq!(ExpenseService::new(&storage).list_month(user, month("2026-10")).unwrap().len(), 1);
    }
}
