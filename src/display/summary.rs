//! Dashboard overview formatting
//!
//! The overview cards, the category and type breakdowns, the spending
//! trend and the profile card.

use crate::aggregate::{CategoryTotal, MonthSummary, SpendingLevel, TrendPoint, TypeTotal};
use crate::auth::Identity;
use crate::models::{Money, UserProfile};

const BAR_WIDTH: usize = 30;

fn bar(value: Money, max: Money) -> String {
    if !max.is_positive() || !value.is_positive() {
        return String::new();
    }
    let filled = ((value.cents() as f64 / max.cents() as f64) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(filled.clamp(1, BAR_WIDTH))
}

fn level_marker(level: SpendingLevel) -> &'static str {
    match level {
        SpendingLevel::Healthy => "",
        SpendingLevel::Warning => " (!)",
        SpendingLevel::Critical => " (!!)",
    }
}

/// Format the overview of a month
pub fn format_overview(
    summary: &MonthSummary,
    categories: &[CategoryTotal],
    types: &[TypeTotal],
    salary: Money,
    symbol: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", summary.month.label()));
    output.push_str(&format!("{}\n", "=".repeat(40)));
    output.push_str(&format!(
        "  Total gastado:     {}\n",
        summary.total.format_with_symbol(symbol)
    ));
    output.push_str(&format!("  Gastos:            {}\n", summary.count));
    if salary.is_positive() {
        output.push_str(&format!(
            "  Sueldo:            {}\n",
            salary.format_with_symbol(symbol)
        ));
        output.push_str(&format!(
            "  % del sueldo:      {:.1}% [{}]{}\n",
            summary.salary_percentage,
            summary.level.label(),
            level_marker(summary.level)
        ));
        output.push_str(&format!(
            "  Ahorro estimado:   {}\n",
            summary.estimated_savings.format_with_symbol(symbol)
        ));
    } else {
        output.push_str("  Sueldo:            (sin configurar)\n");
    }

    if !categories.is_empty() {
        output.push_str("\nPor categoría\n");
        let width = categories
            .iter()
            .map(|c| c.name.chars().count())
            .max()
            .unwrap_or(0);
        let max = categories.iter().map(|c| c.total).max().unwrap_or_default();
        for c in categories {
            let pad = width - c.name.chars().count();
            output.push_str(&format!(
                "  {}{}  {:>12}  {}\n",
                c.name,
                " ".repeat(pad),
                c.total.format_with_symbol(symbol),
                bar(c.total, max)
            ));
        }
    }

    if !types.is_empty() {
        output.push_str("\nPor tipo\n");
        for t in types {
            output.push_str(&format!(
                "  {:<10}  {:>12}\n",
                t.expense_type.label(),
                t.total.format_with_symbol(symbol)
            ));
        }
    }

    output
}

/// Format the spending trend, oldest month first
pub fn format_trend(points: &[TrendPoint], symbol: &str) -> String {
    if points.is_empty() {
        return "No months to compare yet.\n".to_string();
    }

    let max = points
        .iter()
        .map(|p| p.spent.max(p.income))
        .max()
        .unwrap_or_default();

    let mut output = String::from("Tendencia\n");
    for p in points {
        output.push_str(&format!(
            "  {:<7}  {:>12}  {}\n",
            p.month.short_label(),
            p.spent.format_with_symbol(symbol),
            bar(p.spent, max)
        ));
    }
    if let Some(last) = points.last() {
        if last.income.is_positive() {
            output.push_str(&format!(
                "  Ingreso mensual: {}\n",
                last.income.format_with_symbol(symbol)
            ));
        }
    }
    output
}

/// Format the profile card
pub fn format_profile(profile: &UserProfile, identity: Option<&Identity>, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Profile: {}\n", profile.display_name()));
    output.push_str(&format!("  Email:       {}\n", profile.email));
    output.push_str(&format!(
        "  Salary:      {}\n",
        profile
            .salary
            .map(|s| s.format_with_symbol(symbol))
            .unwrap_or_else(|| "-".to_string())
    ));
    output.push_str(&format!(
        "  Salary type: {}\n",
        profile
            .salary_type
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    output.push_str(&format!(
        "  Configured:  {}\n",
        if profile.configured { "Yes" } else { "No" }
    ));
    if let Some(avatar) = identity.and_then(|i| i.avatar_url()) {
        output.push_str(&format!("  Avatar:      {}\n", avatar));
    }
    output.push_str(&format!("  ID:          {}\n", profile.id));

    output
}
