//! Expense display formatting
//!
//! Register-style tables for a month and a detail view for one expense.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use super::{format_percentage, truncate};
use crate::models::{Expense, ExpenseType};

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Nombre")]
    name: String,
    #[tabled(rename = "Categoría")]
    category: String,
    #[tabled(rename = "Importe")]
    amount: String,
    #[tabled(rename = "% sueldo")]
    percentage: String,
    #[tabled(rename = "Tipo")]
    expense_type: String,
    #[tabled(rename = "Medio")]
    payment_method: String,
}

fn type_label(expense: &Expense) -> String {
    match (expense.expense_type, expense.installments) {
        (ExpenseType::Installments, Some(n)) => format!("Cuotas ({})", n),
        (t, _) => t.label().to_string(),
    }
}

/// Format expenses as a table. `limit` caps the rows shown and notes how
/// many were left out.
pub fn format_expense_table(expenses: &[&Expense], symbol: &str, limit: Option<usize>) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let shown = limit.unwrap_or(expenses.len()).min(expenses.len());
    let rows: Vec<ExpenseRow> = expenses[..shown]
        .iter()
        .map(|e| ExpenseRow {
            id: e.id.to_string(),
            name: truncate(&e.name, 28),
            category: truncate(&e.category, 20),
            amount: e.amount.format_with_symbol(symbol),
            percentage: format_percentage(e.salary_percentage),
            expense_type: type_label(e),
            payment_method: e.payment_method.label().to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::single(3)).with(Alignment::right()))
        .with(Modify::new(Columns::single(4)).with(Alignment::right()));

    let mut output = table.to_string();
    output.push('\n');
    if shown < expenses.len() {
        output.push_str(&format!("... and {} more\n", expenses.len() - shown));
    }
    output
}

/// Format one expense in full
pub fn format_expense_details(expense: &Expense, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense: {}\n", expense.name));
    output.push_str(&format!("  ID:         {}\n", expense.id));
    output.push_str(&format!("  Month:      {} ({})\n", expense.month.label(), expense.month));
    output.push_str(&format!("  Category:   {}\n", expense.category));
    output.push_str(&format!(
        "  Amount:     {}\n",
        expense.amount.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  % salary:   {}\n",
        format_percentage(expense.salary_percentage)
    ));
    output.push_str(&format!("  Type:       {}\n", type_label(expense)));
    output.push_str(&format!("  Payment:    {}\n", expense.payment_method));
    output.push_str(&format!(
        "  Created:    {}\n",
        expense.created_at.format("%Y-%m-%d %H:%M")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, MonthKey, NewExpense, PaymentMethod, UserId};

    fn expense(name: &str, units: i64) -> Expense {
        let input = NewExpense::new(
            name,
            "Alimentación",
            Money::from_units(units),
            ExpenseType::Fixed,
            PaymentMethod::Cash,
        );
        Expense::from_input(
            UserId::new(),
            MonthKey::parse("2026-10").unwrap(),
            &input,
            Money::from_units(50000),
        )
    }

    #[test]
    fn test_table_contains_rows() {
        let a = expense("Supermercado", 5000);
        let b = expense("Verdulería", 1200);
        let output = format_expense_table(&[&a, &b], "$", None);

        assert!(output.contains("Supermercado"));
        assert!(output.contains("$ 5.000"));
        assert!(output.contains("10.0%"));
        assert!(output.contains("Verdulería"));
        assert!(!output.contains("more"));
    }

    #[test]
    fn test_table_limit() {
        let rows: Vec<_> = (1..=4).map(|i| expense(&format!("Gasto {}", i), 100)).collect();
        let refs: Vec<_> = rows.iter().collect();
        let output = format_expense_table(&refs, "$", Some(2));

        assert!(output.contains("Gasto 1"));
        assert!(!output.contains("Gasto 3"));
        assert!(output.contains("... and 2 more"));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(format_expense_table(&[], "$", None), "No expenses found.\n");
    }

    #[test]
    fn test_details_show_installments() {
        let mut e = expense("Heladera", 120000);
        e.expense_type = ExpenseType::Installments;
        e.installments = Some(12);
        let output = format_expense_details(&e, "$");

        assert!(output.contains("Cuotas (12)"));
        assert!(output.contains("octubre 2026"));
        assert!(output.contains("$ 120.000"));
    }
}
