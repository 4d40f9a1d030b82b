//! Display formatting for terminal output
//!
//! Every formatter returns a `String`; commands decide where it goes.
//! Amounts are shown es-AR style with the configured currency symbol.

pub mod category;
pub mod expense;
pub mod month;
pub mod summary;

pub use category::{format_category_details, format_category_table};
pub use expense::{format_expense_details, format_expense_table};
pub use month::format_month_list;
pub use summary::{format_overview, format_profile, format_trend};

/// Cut `s` to `max` characters, ending in "..." when cut
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max <= 3 {
        s.chars().take(max).collect()
    } else {
        let kept: String = s.chars().take(max - 3).collect();
        format!("{}...", kept)
    }
}

/// A percentage with one decimal, `-` when absent
pub fn format_percentage(value: Option<f64>) -> String {
    value
        .map(|p| format!("{:.1}%", p))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("Alimentación", 20), "Alimentación");
        assert_eq!(truncate("Alimentación y más", 10), "Aliment...");
        assert_eq!(truncate("ñandú", 2), "ña");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(Some(10.0)), "10.0%");
        assert_eq!(format_percentage(Some(33.333)), "33.3%");
        assert_eq!(format_percentage(None), "-");
    }
}
