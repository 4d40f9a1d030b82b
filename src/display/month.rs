//! Month list formatting

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::models::MonthKey;
use crate::services::MonthStats;

#[derive(Tabled)]
struct MonthRow {
    #[tabled(rename = " ")]
    marker: &'static str,
    #[tabled(rename = "Mes")]
    key: String,
    #[tabled(rename = "Nombre")]
    label: String,
    #[tabled(rename = "Gastos")]
    count: usize,
    #[tabled(rename = "Total")]
    total: String,
}

/// Format the month list, newest first, marking the selected month
pub fn format_month_list(months: &[MonthStats], selected: MonthKey, symbol: &str) -> String {
    if months.is_empty() {
        return "No months yet.\n".to_string();
    }

    let rows: Vec<MonthRow> = months
        .iter()
        .map(|m| MonthRow {
            marker: if m.month == selected { "*" } else { "" },
            key: m.month.to_string(),
            label: m.month.label(),
            count: m.count,
            total: m.total.format_with_symbol(symbol),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::new(3..)).with(Alignment::right()));

    let mut output = table.to_string();
    output.push('\n');
    output
}
