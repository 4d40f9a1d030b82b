//! Month CLI commands
//!
//! A month exists once it has an expense, is the current month, or was
//! created with `cifra month new`.

use clap::Subcommand;

use super::{parse_month, signed_in, write_failed};
use crate::display::format_month_list;
use crate::error::{CifraError, CifraResult};
use crate::models::MonthKey;
use crate::state::{AppContext, ExpenseBook};

/// Month subcommands
#[derive(Subcommand, Debug)]
pub enum MonthCommands {
    /// List months, newest first
    List,

    /// Show the selected month
    Current,

    /// Select a month
    Switch {
        /// Month (YYYY-MM)
        month: String,
    },

    /// Add an empty month and select it
    New {
        /// Month (YYYY-MM), defaults to the month after the newest one
        month: Option<String>,
    },

    /// Move every expense of a month to another month
    Move {
        /// Source month (YYYY-MM)
        from: String,
        /// Target month (YYYY-MM)
        to: String,
    },

    /// Delete a month and all of its expenses
    Delete {
        /// Month (YYYY-MM)
        month: String,
    },

    /// Total and count of a month
    Stats {
        /// Month (YYYY-MM), defaults to the selected month
        month: Option<String>,
    },
}

/// Handle a month command
pub fn handle_month_command(ctx: &AppContext, cmd: MonthCommands) -> CifraResult<()> {
    let (_session, identity) = signed_in(ctx)?;
    let symbol = &ctx.settings.currency_symbol;
    let mut book = ExpenseBook::open(&ctx.storage, identity.id);

    match cmd {
        MonthCommands::List => {
            let stats: Vec<_> = book
                .available_months()
                .iter()
                .filter_map(|&m| book.month_stats(m))
                .collect();
            print!("{}", format_month_list(&stats, book.selected_month(), symbol));
        }

        MonthCommands::Current => {
            let month = book.selected_month();
            println!("{} ({})", month.label(), month);
        }

        MonthCommands::Switch { month } => {
            let month = parse_month(&month)?;
            book.change_month(month);
            println!(
                "Switched to {} ({} expenses)",
                month.label(),
                book.expenses().len()
            );
        }

        MonthCommands::New { month } => {
            let month = match month {
                Some(m) => parse_month(&m)?,
                None => book
                    .available_months()
                    .first()
                    .copied()
                    .unwrap_or_else(MonthKey::current)
                    .next(),
            };
            if book.available_months().contains(&month) {
                return Err(CifraError::Duplicate {
                    entity_type: "Month",
                    identifier: month.to_string(),
                });
            }
            book.create_month(month);
            println!("Created {} and selected it", month.label());
        }

        MonthCommands::Move { from, to } => {
            let from = parse_month(&from)?;
            let to = parse_month(&to)?;
            if from == to {
                return Err(CifraError::Validation(
                    "Source and target month are the same".into(),
                ));
            }
            let count = book.month_stats(from).map(|s| s.count).unwrap_or(0);
            if !book.move_month(from, to) {
                return Err(write_failed("move the month"));
            }
            println!(
                "Moved {} expense(s) from {} to {}",
                count,
                from.label(),
                to.label()
            );
        }

        MonthCommands::Delete { month } => {
            let month = parse_month(&month)?;
            if !book.available_months().contains(&month) {
                return Err(CifraError::NotFound {
                    entity_type: "Month",
                    identifier: month.to_string(),
                });
            }
            let count = book.month_stats(month).map(|s| s.count).unwrap_or(0);
            if !book.delete_month(month) {
                return Err(write_failed("delete the month"));
            }
            println!("Deleted {} and its {} expense(s)", month.label(), count);
            println!("Selected month: {}", book.selected_month().label());
        }

        MonthCommands::Stats { month } => {
            let month = match month {
                Some(m) => parse_month(&m)?,
                None => book.selected_month(),
            };
            let stats = book
                .month_stats(month)
                .ok_or_else(|| write_failed("read the month"))?;
            println!("{}", month.label());
            println!("  Expenses: {}", stats.count);
            println!("  Total:    {}", stats.total.format_with_symbol(symbol));
        }
    }

    Ok(())
}
