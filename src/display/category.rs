//! Category display formatting

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::aggregate::category_usage;
use crate::models::{Category, Expense};

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "#")]
    order: i32,
    #[tabled(rename = "Categoría")]
    name: String,
    #[tabled(rename = "Icono")]
    icon: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Gastos")]
    usage: usize,
    #[tabled(rename = "ID")]
    id: String,
}

/// Format categories in display order, with how many of `expenses` use
/// each one
pub fn format_category_table(categories: &[Category], expenses: &[Expense]) -> String {
    if categories.is_empty() {
        return "No categories found.\n".to_string();
    }

    let rows: Vec<CategoryRow> = categories
        .iter()
        .map(|c| CategoryRow {
            order: c.sort_order,
            name: c.name.clone(),
            icon: c.display_icon().to_string(),
            color: c.color.clone(),
            usage: category_usage(expenses, &c.name),
            id: c.id.to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .with(Modify::new(Columns::single(4)).with(Alignment::right()));

    let mut output = table.to_string();
    output.push('\n');
    output
}

/// Format one category
pub fn format_category_details(category: &Category, usage: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:       {}\n", category.id));
    output.push_str(&format!("  Icon:     {}\n", category.display_icon()));
    output.push_str(&format!("  Color:    {}\n", category.color));
    output.push_str(&format!("  Order:    {}\n", category.sort_order));
    output.push_str(&format!("  Expenses: {}\n", usage));

    output
}
