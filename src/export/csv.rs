//! CSV export of a month's expenses
//!
//! One row per expense, amounts in decimal units, for spreadsheets.

use std::io::Write;

use crate::error::{CifraError, CifraResult};
use crate::models::Expense;

/// Column headers, in the order rows are written
pub const CSV_HEADERS: [&str; 9] = [
    "id",
    "nombre",
    "categoria",
    "importe",
    "porcentaje_sueldo",
    "tipo_gasto",
    "medio_pago",
    "cuotas",
    "fecha_creacion",
];

/// Write `expenses` as CSV
pub fn export_expenses_csv<W: Write>(expenses: &[Expense], writer: W) -> CifraResult<()> {
    let mut csv = ::csv::Writer::from_writer(writer);
    let export_err = |e: ::csv::Error| CifraError::Export(e.to_string());

    csv.write_record(CSV_HEADERS).map_err(export_err)?;

    for expense in expenses {
        csv.write_record([
            expense.id.as_uuid().to_string(),
            expense.name.clone(),
            expense.category.clone(),
            format!("{:.2}", expense.amount.to_decimal()),
            expense
                .salary_percentage
                .map(|p| format!("{:.1}", p))
                .unwrap_or_default(),
            expense.expense_type.label().to_string(),
            expense.payment_method.label().to_string(),
            expense.installments.map(|n| n.to_string()).unwrap_or_default(),
            expense.created_at.to_rfc3339(),
        ])
        .map_err(export_err)?;
    }

    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseType, Money, MonthKey, NewExpense, PaymentMethod, UserId};

    fn expense(name: &str, category: &str, amount: Money) -> Expense {
        let input = NewExpense::new(name, category, amount, ExpenseType::Variable, PaymentMethod::Card);
        Expense::from_input(
            UserId::new(),
            MonthKey::parse("2026-10").unwrap(),
            &input,
            Money::from_units(10000),
        )
    }

    #[test]
    fn test_csv_rows() {
        let expenses = vec![
            expense("Pizza, con amigos", "Entretenimiento", Money::from_cents(150050)),
            expense("Nafta", "Transporte", Money::from_units(2000)),
        ];

        let mut out = Vec::new();
        export_expenses_csv(&expenses, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADERS.join(","));
        assert!(lines[1].contains("\"Pizza, con amigos\",Entretenimiento,1500.50,15.0,Variable,Tarjeta,,"));
        assert!(lines[2].contains(",Nafta,Transporte,2000.00,20.0,"));
    }

    #[test]
    fn test_empty_month_writes_header_only() {
        let mut out = Vec::new();
        export_expenses_csv(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), CSV_HEADERS.join(","));
    }
}
