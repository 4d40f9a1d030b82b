//! Expense service
//!
//! Validated, user-scoped expense writes and the month-level bulk
//! operations (move a whole month, delete a whole month, replace a month on
//! import).

use serde::Serialize;

use crate::audit::{generate_diff, EntityType};
use crate::error::{CifraError, CifraResult};
use crate::models::{Expense, ExpenseId, ExpenseUpdate, Money, MonthKey, NewExpense, UserId};
use crate::storage::Storage;

/// Total and count of one month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthStats {
    pub month: MonthKey,
    pub total: Money,
    pub count: usize,
}

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Expenses of a month, newest first
    pub fn list_month(&self, user_id: UserId, month: MonthKey) -> CifraResult<Vec<Expense>> {
        self.storage.expenses.get_for_month(user_id, month)
    }

    /// All of a user's expenses, newest first
    pub fn list_all(&self, user_id: UserId) -> CifraResult<Vec<Expense>> {
        self.storage.expenses.get_for_user(user_id)
    }

    /// Months with at least one expense, newest first
    pub fn months(&self, user_id: UserId) -> CifraResult<Vec<MonthKey>> {
        self.storage.expenses.months_for_user(user_id)
    }

    pub fn get(&self, user_id: UserId, id: ExpenseId) -> CifraResult<Option<Expense>> {
        self.storage.expenses.get(user_id, id)
    }

    /// Find an expense by full or short id
    pub fn resolve(&self, user_id: UserId, identifier: &str) -> CifraResult<Expense> {
        if let Ok(id) = identifier.parse::<ExpenseId>() {
            if let Some(expense) = self.get(user_id, id)? {
                return Ok(expense);
            }
        }

        let mut matches = self
            .list_all(user_id)?
            .into_iter()
            .filter(|e| e.id.matches_short(identifier));

        match (matches.next(), matches.next()) {
            (Some(expense), None) => Ok(expense),
            (Some(_), Some(_)) => Err(CifraError::Validation(format!(
                "Expense id '{}' is ambiguous, use more characters",
                identifier
            ))),
            _ => Err(CifraError::expense_not_found(identifier)),
        }
    }

    /// Record an expense in `month`, snapshotting its share of `salary`
    pub fn create(
        &self,
        user_id: UserId,
        month: MonthKey,
        input: &NewExpense,
        salary: Money,
    ) -> CifraResult<Expense> {
        input
            .validate()
            .map_err(|e| CifraError::Validation(e.to_string()))?;

        let expense = Expense::from_input(user_id, month, input, salary);

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage.log_create(
            user_id,
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.name.clone()),
            &expense,
        )?;

        Ok(expense)
    }

    /// Edit an expense. Other users' expenses are reported as not found.
    pub fn update(
        &self,
        user_id: UserId,
        id: ExpenseId,
        update: &ExpenseUpdate,
        salary: Money,
    ) -> CifraResult<Expense> {
        let mut expense = self
            .get(user_id, id)?
            .ok_or_else(|| CifraError::expense_not_found(id.to_string()))?;
        let before = expense.clone();

        expense.apply(update, salary);
        expense
            .validate()
            .map_err(|e| CifraError::Validation(e.to_string()))?;

        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        let diff = generate_diff(
            &serde_json::to_value(&before)?,
            &serde_json::to_value(&expense)?,
        );
        if diff.is_some() {
            self.storage.log_update(
                user_id,
                EntityType::Expense,
                expense.id.to_string(),
                Some(expense.name.clone()),
                &before,
                &expense,
                diff,
            )?;
        }

        Ok(expense)
    }

    /// Delete an expense
    pub fn delete(&self, user_id: UserId, id: ExpenseId) -> CifraResult<Expense> {
        let expense = self
            .get(user_id, id)?
            .ok_or_else(|| CifraError::expense_not_found(id.to_string()))?;

        self.storage.expenses.delete(user_id, id)?;
        self.storage.expenses.save()?;

        self.storage.log_delete(
            user_id,
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.name.clone()),
            &expense,
        )?;

        Ok(expense)
    }

    /// Reassign every expense of `from` to `to`. Returns how many moved.
    pub fn move_month(&self, user_id: UserId, from: MonthKey, to: MonthKey) -> CifraResult<usize> {
        if from == to {
            return Err(CifraError::Validation(format!(
                "Source and target month are both {}",
                from
            )));
        }

        let moved = self.storage.expenses.reassign_month(user_id, from, to)?;
        self.storage.expenses.save()?;

        self.storage.log_update(
            user_id,
            EntityType::Month,
            from.to_string(),
            Some(from.label()),
            &from,
            &to,
            Some(format!("month: {} -> {} ({} expenses)", from, to, moved)),
        )?;

        tracing::info!(%from, %to, moved, "moved month");
        Ok(moved)
    }

    /// Delete every expense of a month. Returns how many were deleted.
    pub fn delete_month(&self, user_id: UserId, month: MonthKey) -> CifraResult<usize> {
        let deleted = self.storage.expenses.delete_month(user_id, month)?;
        self.storage.expenses.save()?;

        self.storage.log_delete(
            user_id,
            EntityType::Month,
            month.to_string(),
            Some(month.label()),
            &deleted,
        )?;

        tracing::info!(%month, count = deleted.len(), "deleted month");
        Ok(deleted.len())
    }

    /// Replace a month's expenses (backup restore)
    pub fn replace_month(
        &self,
        user_id: UserId,
        month: MonthKey,
        expenses: Vec<Expense>,
    ) -> CifraResult<usize> {
        for expense in &expenses {
            expense
                .validate()
                .map_err(|e| CifraError::Validation(format!("{}: {}", expense.name, e)))?;
        }

        let count = self.storage.expenses.replace_month(user_id, month, expenses)?;
        self.storage.expenses.save()?;
        Ok(count)
    }

    /// Total and count of a month
    pub fn month_stats(&self, user_id: UserId, month: MonthKey) -> CifraResult<MonthStats> {
        let expenses = self.list_month(user_id, month)?;
        Ok(MonthStats {
            month,
            total: expenses.iter().map(|e| e.amount).sum(),
            count: expenses.len(),
        })
    }
}
