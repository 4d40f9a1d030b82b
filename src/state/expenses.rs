//! Month-scoped expense accessor
//!
//! Holds the selected month, its expenses (newest first) and the list of
//! months the user can switch between. Writes go through `ExpenseService`;
//! failures are logged and reported as `false`.

use crate::models::{Expense, ExpenseId, ExpenseUpdate, Money, MonthKey, NewExpense, UserId};
use crate::services::{ExpenseService, MonthStats};
use crate::storage::{SessionData, Storage};

/// The expenses of one user, one month at a time
pub struct ExpenseBook<'a> {
    storage: &'a Storage,
    user_id: UserId,
    selected: MonthKey,
    expenses: Vec<Expense>,
    months: Vec<MonthKey>,
    created: Vec<MonthKey>,
}

impl<'a> ExpenseBook<'a> {
    /// Open the book on the cached month, or the current month
    pub fn open(storage: &'a Storage, user_id: UserId) -> Self {
        let session = storage.session.load().unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to read session cache");
            SessionData::default()
        });

        let mut book = Self {
            storage,
            user_id,
            selected: session.current_month.unwrap_or_else(MonthKey::current),
            expenses: Vec::new(),
            months: Vec::new(),
            created: session.created_months,
        };
        book.refresh_months();
        book.load_expenses(book.selected);
        book
    }

    fn service(&self) -> ExpenseService<'a> {
        ExpenseService::new(self.storage)
    }

    pub fn selected_month(&self) -> MonthKey {
        self.selected
    }

    /// Expenses of the selected month, newest first
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Months to offer, newest first
    pub fn available_months(&self) -> &[MonthKey] {
        &self.months
    }

    /// Load a month's expenses into the list; empty on failure
    pub fn load_expenses(&mut self, month: MonthKey) {
        self.expenses = match self.service().list_month(self.user_id, month) {
            Ok(expenses) => expenses,
            Err(e) => {
                tracing::error!(%month, error = %e, "failed to load expenses");
                Vec::new()
            }
        };
    }

    /// Months with expenses, plus the current month and months created in
    /// this session, newest first
    pub fn refresh_months(&mut self) {
        let mut months = self.service().months(self.user_id).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to load months");
            Vec::new()
        });
        months.push(MonthKey::current());
        months.extend(self.created.iter().copied());

        months.sort_by(|a, b| b.cmp(a));
        months.dedup();
        self.months = months;
    }

    fn persist_selection(&self) {
        let result = self.storage.session.load().and_then(|mut session| {
            session.current_month = Some(self.selected);
            session.created_months = self.created.clone();
            self.storage.session.save(&session)
        });
        if let Err(e) = result {
            tracing::error!(error = %e, "failed to write session cache");
        }
    }

    /// Record an expense in the selected month
    pub fn add_expense(&mut self, input: &NewExpense, salary: Money) -> bool {
        match self.service().create(self.user_id, self.selected, input, salary) {
            Ok(expense) => {
                self.expenses.insert(0, expense);
                if !self.months.contains(&self.selected) {
                    self.refresh_months();
                }
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to add expense");
                false
            }
        }
    }

    pub fn update_expense(&mut self, id: ExpenseId, update: &ExpenseUpdate, salary: Money) -> bool {
        match self.service().update(self.user_id, id, update, salary) {
            Ok(updated) => {
                if let Some(slot) = self.expenses.iter_mut().find(|e| e.id == id) {
                    *slot = updated;
                }
                true
            }
            Err(e) => {
                tracing::error!(expense = %id, error = %e, "failed to update expense");
                false
            }
        }
    }

    pub fn delete_expense(&mut self, id: ExpenseId) -> bool {
        match self.service().delete(self.user_id, id) {
            Ok(_) => {
                self.expenses.retain(|e| e.id != id);
                true
            }
            Err(e) => {
                tracing::error!(expense = %id, error = %e, "failed to delete expense");
                false
            }
        }
    }

    /// Total and count of any month
    pub fn month_stats(&self, month: MonthKey) -> Option<MonthStats> {
        self.service()
            .month_stats(self.user_id, month)
            .map_err(|e| tracing::error!(%month, error = %e, "failed to compute month stats"))
            .ok()
    }

    /// Select a month and load it
    pub fn change_month(&mut self, month: MonthKey) {
        self.selected = month;
        self.load_expenses(month);
        self.persist_selection();
    }

    /// Add an empty month to the list and select it. Nothing is written to
    /// the expenses table.
    pub fn create_month(&mut self, month: MonthKey) {
        if !self.created.contains(&month) {
            self.created.push(month);
        }
        self.refresh_months();
        self.selected = month;
        self.expenses.clear();
        self.persist_selection();
    }

    /// Move every expense of `from` to `to`
    pub fn move_month(&mut self, from: MonthKey, to: MonthKey) -> bool {
        if let Err(e) = self.service().move_month(self.user_id, from, to) {
            tracing::error!(%from, %to, error = %e, "failed to move month");
            return false;
        }

        let was_created = self.created.contains(&from);
        self.created.retain(|m| *m != from);
        if was_created && !self.created.contains(&to) {
            self.created.push(to);
        }
        if self.selected == from {
            self.selected = to;
        }
        self.refresh_months();
        self.load_expenses(self.selected);
        self.persist_selection();
        true
    }

    /// Delete every expense of a month. When it was selected, the most
    /// recent remaining month is selected instead.
    pub fn delete_month(&mut self, month: MonthKey) -> bool {
        if let Err(e) = self.service().delete_month(self.user_id, month) {
            tracing::error!(%month, error = %e, "failed to delete month");
            return false;
        }

        self.created.retain(|m| *m != month);
        self.refresh_months();

        if self.selected == month {
            self.selected = self
                .months
                .iter()
                .copied()
                .find(|m| *m != month)
                .unwrap_or_else(MonthKey::current);
        }
        self.load_expenses(self.selected);
        self.persist_selection();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CifraPaths;
    use crate::models::{ExpenseType, PaymentMethod};
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

    fn supermercado() -> NewExpense {
        NewExpense::new(
            "Supermercado",
            "Alimentación",
            Money::from_units(5000),
            ExpenseType::Fixed,
            PaymentMethod::Cash,
        )
    }

    #[test]
    fn test_opens_on_current_month() {
        let (_temp_dir, storage) = create_test_storage();
        let book = ExpenseBook::open(&storage, UserId::new());

        assert_eq!(book.selected_month(), MonthKey::current());
        assert_eq!(book.available_months(), &[MonthKey::current()]);
        assert!(book.expenses().is_empty());
    }

    #[test]
    fn test_add_expense_prepends_with_percentage() {
        let (_temp_dir, storage) = create_test_storage();
        let mut book = ExpenseBook::open(&storage, UserId::new());
        book.change_month(month("2020-05"));

        assert!(book.add_expense(&supermercado(), Money::from_units(50000)));
        let mut second = supermercado();
        second.name = "Verdulería".into();
        assert!(book.add_expense(&second, Money::from_units(50000)));

        assert_eq!(book.expenses()[0].name, "Verdulería");
        assert_eq!(book.expenses()[1].salary_percentage, Some(10.0));
        assert!(book.available_months().contains(&month("2020-05")));
    }

    #[test]
    fn test_invalid_expense_returns_false() {
        let (_temp_dir, storage) = create_test_storage();
        let mut book = ExpenseBook::open(&storage, UserId::new());
        let mut input = supermercado();
        input.amount = Money::zero();

        assert!(!book.add_expense(&input, Money::zero()));
        assert!(book.expenses().is_empty());
    }

    #[test]
    fn test_create_month_inserts_in_descending_order() {
        let (_temp_dir, storage) = create_test_storage();
        let mut book = ExpenseBook::open(&storage, UserId::new());
        let current = MonthKey::current();
        let older = current.prev().prev();

        book.create_month(older);

        assert_eq!(book.available_months(), &[current, older]);
        assert_eq!(book.selected_month(), older);
        assert!(book.expenses().is_empty());
        assert_eq!(storage.expenses.count_for_user(book.user_id).unwrap(), 0);
    }

    #[test]
    fn test_selection_and_created_months_persist() {
        let (_temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        let future = MonthKey::current().next();
        ExpenseBook::open(&storage, user).create_month(future);

        let reopened = ExpenseBook::open(&storage, user);
        assert_eq!(reopened.selected_month(), future);
        assert_eq!(reopened.available_months()[0], future);
    }

    #[test]
    fn test_move_month_follows_selection() {
        let (_temp_dir, storage) = create_test_storage();
        let mut book = ExpenseBook::open(&storage, UserId::new());
        book.change_month(month("2020-01"));
        book.add_expense(&supermercado(), Money::zero());
        book.add_expense(&supermercado(), Money::zero());

        assert!(book.move_month(month("2020-01"), month("2020-02")));

        assert_eq!(book.selected_month(), month("2020-02"));
        assert_eq!(book.expenses().len(), 2);
        assert!(!book.available_months().contains(&month("2020-01")));
        assert_eq!(book.month_stats(month("2020-01")).unwrap().count, 0);
    }

    #[test]
    fn test_move_empty_created_month_keeps_it_listed() {
        let (_temp_dir, storage) = create_test_storage();
        let user = UserId::new();
        let mut book = ExpenseBook::open(&storage, user);
        book.create_month(month("2020-05"));

        assert!(book.move_month(month("2020-05"), month("2020-06")));

        assert_eq!(book.selected_month(), month("2020-06"));
        assert!(book.available_months().contains(&month("2020-06")));
        assert!(!book.available_months().contains(&month("2020-05")));

        let reopened = ExpenseBook::open(&storage, user);
        assert!(reopened.available_months().contains(&month("2020-06")));
        assert!(!reopened.available_months().contains(&month("2020-05")));
    }

    #[test]
    fn test_delete_month_selects_most_recent_remaining() {
        let (_temp_dir, storage) = create_test_storage();
        let mut book = ExpenseBook::open(&storage, UserId::new());
        let current = MonthKey::current();
        let future = current.next();

        book.change_month(future);
        book.add_expense(&supermercado(), Money::zero());

        assert!(book.delete_month(future));
        assert_eq!(book.selected_month(), current);
        assert_eq!(book.available_months(), &[current]);
    }

    #[test]
    fn test_update_and_delete_keep_list_in_sync() {
        let (_temp_dir, storage) = create_test_storage();
        let mut book = ExpenseBook::open(&storage, UserId::new());
        book.add_expense(&supermercado(), Money::from_units(50000));
        let id = book.expenses()[0].id;

        assert!(book.update_expense(
            id,
            &ExpenseUpdate {
                amount: Some(Money::from_units(10000)),
                ..Default::default()
            },
            Money::from_units(50000),
        ));
        assert_eq!(book.expenses()[0].salary_percentage, Some(20.0));

        assert!(book.delete_expense(id));
        assert!(book.expenses().is_empty());
        assert!(!book.delete_expense(id));
    }
}
