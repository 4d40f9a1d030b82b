//! Expense repository for JSON storage
//!
//! Manages loading and saving the `expenses` table to expenses.json, indexed
//! by (user, month) so month views never scan other users' rows.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::Utc;

use crate::error::CifraError;
use crate::models::{Expense, ExpenseId, MonthKey, UserId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable expenses table
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

type MonthIndex = HashMap<(UserId, MonthKey), Vec<ExpenseId>>;

/// Repository for expense persistence with a month index
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenseId, Expense>>,
    /// Index: (user_id, month) -> expense_ids
    by_month: RwLock<MonthIndex>,
}

fn newest_first(a: &Expense, b: &Expense) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at)
}

fn unindex(by_month: &mut MonthIndex, expense: &Expense) {
    let key = (expense.user_id, expense.month);
    if let Some(ids) = by_month.get_mut(&key) {
        ids.retain(|id| *id != expense.id);
        if ids.is_empty() {
            by_month.remove(&key);
        }
    }
}

impl ExpenseRepository {
    /// Create a new expense repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_month: RwLock::new(HashMap::new()),
        }
    }

    fn write_locks(
        &self,
    ) -> Result<
        (
            std::sync::RwLockWriteGuard<'_, HashMap<ExpenseId, Expense>>,
            std::sync::RwLockWriteGuard<'_, MonthIndex>,
        ),
        CifraError,
    > {
        let data = self
            .data
            .write()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let by_month = self
            .by_month
            .write()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        Ok((data, by_month))
    }

    /// Load expenses from disk and build the month index
    pub fn load(&self) -> Result<(), CifraError> {
        let file_data: ExpenseData = read_json(&self.path)?;
        let (mut data, mut by_month) = self.write_locks()?;

        data.clear();
        by_month.clear();

        for expense in file_data.expenses {
            by_month
                .entry((expense.user_id, expense.month))
                .or_default()
                .push(expense.id);
            data.insert(expense.id, expense);
        }

        Ok(())
    }

    /// Save expenses to disk
    pub fn save(&self) -> Result<(), CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        expenses.sort_by(|a, b| {
            a.user_id
                .cmp(&b.user_id)
                .then(b.month.cmp(&a.month))
                .then(newest_first(a, b))
        });

        write_json_atomic(&self.path, &ExpenseData { expenses })
    }

    /// Get an expense by id, only if `user_id` owns it
    pub fn get(&self, user_id: UserId, id: ExpenseId) -> Result<Option<Expense>, CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).filter(|e| e.user_id == user_id).cloned())
    }

    /// All of a user's expenses, newest first
    pub fn get_for_user(&self, user_id: UserId) -> Result<Vec<Expense>, CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut expenses: Vec<_> = data
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        expenses.sort_by(newest_first);
        Ok(expenses)
    }

    /// A user's expenses of one month, newest first
    pub fn get_for_month(&self, user_id: UserId, month: MonthKey) -> Result<Vec<Expense>, CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_month = self
            .by_month
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let ids = by_month
            .get(&(user_id, month))
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut expenses: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        expenses.sort_by(newest_first);
        Ok(expenses)
    }

    /// Distinct months holding at least one of the user's expenses, newest first
    pub fn months_for_user(&self, user_id: UserId) -> Result<Vec<MonthKey>, CifraError> {
        let by_month = self
            .by_month
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let months: BTreeSet<MonthKey> = by_month
            .keys()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, month)| *month)
            .collect();
        Ok(months.into_iter().rev().collect())
    }

    /// Insert or update an expense
    pub fn upsert(&self, expense: Expense) -> Result<(), CifraError> {
        let (mut data, mut by_month) = self.write_locks()?;

        if let Some(old) = data.get(&expense.id) {
            unindex(&mut by_month, old);
        }

        by_month
            .entry((expense.user_id, expense.month))
            .or_default()
            .push(expense.id);
        data.insert(expense.id, expense);
        Ok(())
    }

    /// Delete a user's expense. Returns false when it does not exist or
    /// belongs to someone else.
    pub fn delete(&self, user_id: UserId, id: ExpenseId) -> Result<bool, CifraError> {
        let (mut data, mut by_month) = self.write_locks()?;

        match data.get(&id) {
            Some(e) if e.user_id == user_id => {
                if let Some(expense) = data.remove(&id) {
                    unindex(&mut by_month, &expense);
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Move every expense of `from` into `to`. Returns how many moved.
    pub fn reassign_month(
        &self,
        user_id: UserId,
        from: MonthKey,
        to: MonthKey,
    ) -> Result<usize, CifraError> {
        let (mut data, mut by_month) = self.write_locks()?;

        let ids = by_month.remove(&(user_id, from)).unwrap_or_default();
        let now = Utc::now();
        for id in &ids {
            if let Some(expense) = data.get_mut(id) {
                expense.month = to;
                expense.updated_at = now;
            }
        }
        let moved = ids.len();
        by_month.entry((user_id, to)).or_default().extend(ids);
        Ok(moved)
    }

    /// Delete every expense of a month. Returns the deleted rows.
    pub fn delete_month(&self, user_id: UserId, month: MonthKey) -> Result<Vec<Expense>, CifraError> {
        let (mut data, mut by_month) = self.write_locks()?;

        let ids = by_month.remove(&(user_id, month)).unwrap_or_default();
        Ok(ids.iter().filter_map(|id| data.remove(id)).collect())
    }

    /// The user owning an expense id, if the id is taken
    pub fn owner_of(&self, id: ExpenseId) -> Result<Option<UserId>, CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.get(&id).map(|e| e.user_id))
    }

    /// Replace a month's expenses with `expenses`
    ///
    /// Fails without changing anything if one of the ids belongs to another
    /// user.
    pub fn replace_month(
        &self,
        user_id: UserId,
        month: MonthKey,
        expenses: Vec<Expense>,
    ) -> Result<usize, CifraError> {
        let (mut data, mut by_month) = self.write_locks()?;

        if let Some(taken) = expenses
            .iter()
            .find(|e| data.get(&e.id).is_some_and(|existing| existing.user_id != user_id))
        {
            return Err(CifraError::Storage(format!(
                "Expense id {} belongs to another user",
                taken.id
            )));
        }

        for id in by_month.remove(&(user_id, month)).unwrap_or_default() {
            data.remove(&id);
        }

        let count = expenses.len();
        for mut expense in expenses {
            expense.user_id = user_id;
            expense.month = month;
            if let Some(old) = data.get(&expense.id) {
                unindex(&mut by_month, old);
            }
            by_month
                .entry((user_id, month))
                .or_default()
                .push(expense.id);
            data.insert(expense.id, expense);
        }
        Ok(count)
    }

    /// Count a user's expenses
    pub fn count_for_user(&self, user_id: UserId) -> Result<usize, CifraError> {
        let data = self
            .data
            .read()
            .map_err(|e| CifraError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.values().filter(|e| e.user_id == user_id).count())
    }
}
