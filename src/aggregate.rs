//! Dashboard math
//!
//! Pure functions over a loaded month. Nothing here touches storage; every
//! figure is recomputed from the expense list on demand.

use crate::models::{Category, Expense, ExpenseType, Money, MonthKey};

/// Months shown in the spending trend
pub const TREND_MONTHS: usize = 6;

/// How much of the salary has been spent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendingLevel {
    Healthy,
    /// Above 60%
    Warning,
    /// Above 80%
    Critical,
}

impl SpendingLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "ok",
            Self::Warning => "atención",
            Self::Critical => "crítico",
        }
    }
}

/// Spending in one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub name: String,
    pub color: String,
    pub total: Money,
}

/// Spending of one expense type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeTotal {
    pub expense_type: ExpenseType,
    pub total: Money,
}

/// One month of the trend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub month: MonthKey,
    pub spent: Money,
    pub income: Money,
}

/// The overview figures of a month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub month: MonthKey,
    pub total: Money,
    pub count: usize,
    pub salary_percentage: f64,
    pub estimated_savings: Money,
    pub level: SpendingLevel,
}

impl MonthSummary {
    pub fn compute(month: MonthKey, expenses: &[Expense], salary: Money) -> Self {
        let total = total(expenses);
        let salary_percentage = salary_percentage(total, salary);
        Self {
            month,
            total,
            count: expenses.len(),
            salary_percentage,
            estimated_savings: estimated_savings(total, salary),
            level: spending_level(salary_percentage),
        }
    }
}

/// Sum of amounts
pub fn total(expenses: &[Expense]) -> Money {
    expenses.iter().map(|e| e.amount).sum()
}

/// `total / salary * 100`, or 0 without a salary
pub fn salary_percentage(total: Money, salary: Money) -> f64 {
    total.percentage_of(salary).unwrap_or(0.0)
}

/// `salary - total`, or 0 without a salary. Negative when overspent.
pub fn estimated_savings(total: Money, salary: Money) -> Money {
    if salary.is_positive() {
        salary - total
    } else {
        Money::zero()
    }
}

/// Per-category totals in category order. Expenses match by exact
/// category name; categories with nothing spent are left out.
pub fn by_category(expenses: &[Expense], categories: &[Category]) -> Vec<CategoryTotal> {
    categories
        .iter()
        .map(|category| CategoryTotal {
            name: category.name.clone(),
            color: category.color.clone(),
            total: expenses
                .iter()
                .filter(|e| e.category == category.name)
                .map(|e| e.amount)
                .sum(),
        })
        .filter(|t| !t.total.is_zero())
        .collect()
}

/// Per-type totals, zero totals left out
pub fn by_type(expenses: &[Expense]) -> Vec<TypeTotal> {
    ExpenseType::all()
        .iter()
        .map(|&expense_type| TypeTotal {
            expense_type,
            total: expenses
                .iter()
                .filter(|e| e.expense_type == expense_type)
                .map(|e| e.amount)
                .sum(),
        })
        .filter(|t| !t.total.is_zero())
        .collect()
}

/// Expenses whose name or category contains `term`, ignoring case
pub fn filter_expenses<'e>(expenses: &'e [Expense], term: &str) -> Vec<&'e Expense> {
    let term = term.trim();
    if term.is_empty() {
        return expenses.iter().collect();
    }
    expenses.iter().filter(|e| e.matches(term)).collect()
}

/// The most recent months (at most six) in ascending order, each with its
/// spending and the salary as income
pub fn monthly_trend(month_totals: &[(MonthKey, Money)], salary: Money) -> Vec<TrendPoint> {
    let mut recent: Vec<_> = month_totals.to_vec();
    recent.sort_by(|a, b| b.0.cmp(&a.0));
    recent.truncate(TREND_MONTHS);
    recent.reverse();

    recent
        .into_iter()
        .map(|(month, spent)| TrendPoint {
            month,
            spent,
            income: salary,
        })
        .collect()
}

pub fn spending_level(percentage: f64) -> SpendingLevel {
    if percentage > 80.0 {
        SpendingLevel::Critical
    } else if percentage > 60.0 {
        SpendingLevel::Warning
    } else {
        SpendingLevel::Healthy
    }
}

/// How many expenses reference a category name
pub fn category_usage(expenses: &[Expense], name: &str) -> usize {
    expenses.iter().filter(|e| e.category == name).count()
}

/// A category may be deleted only when no expense references it
pub fn can_delete_category(expenses: &[Expense], name: &str) -> bool {
    category_usage(expenses, name) == 0
}
