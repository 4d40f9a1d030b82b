//! Expense CLI commands
//!
//! Expenses are added to the selected month (see `cifra month switch`).

use clap::Subcommand;

use super::{
    parse_expense_type, parse_money, parse_month, parse_payment_method, signed_in, write_failed,
};
use crate::aggregate::filter_expenses;
use crate::display::{format_expense_details, format_expense_table};
use crate::error::{CifraError, CifraResult};
use crate::models::{ExpenseType, ExpenseUpdate, NewExpense};
use crate::services::ExpenseService;
use crate::state::{AppContext, CategoryList, ExpenseBook};

/// Expense subcommands
#[derive(Subcommand, Debug)]
pub enum ExpenseCommands {
    /// Record an expense in the selected month
    Add {
        /// What the money was spent on
        name: String,
        /// Amount (e.g. "5000" or "5.000,50")
        amount: String,
        /// Category name
        #[arg(short, long)]
        category: String,
        /// fijo, variable, cuotas or unica
        #[arg(short = 't', long = "type", default_value = "variable")]
        expense_type: String,
        /// tarjeta, cash or transferencia
        #[arg(short, long, default_value = "cash")]
        payment: String,
        /// Number of installments (only for cuotas)
        #[arg(short, long)]
        installments: Option<u32>,
        /// Switch to this month (YYYY-MM) before adding
        #[arg(short, long)]
        month: Option<String>,
    },

    /// List the expenses of a month
    List {
        /// Month (YYYY-MM), defaults to the selected month
        #[arg(short, long)]
        month: Option<String>,
        /// Only expenses whose name or category contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Maximum number of rows
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show an expense
    Show {
        /// Expense id (full or short)
        expense: String,
    },

    /// Edit an expense
    Edit {
        /// Expense id (full or short)
        expense: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short = 't', long = "type")]
        expense_type: Option<String>,
        #[arg(short, long)]
        payment: Option<String>,
        #[arg(short, long)]
        installments: Option<u32>,
    },

    /// Delete an expense
    Delete {
        /// Expense id (full or short)
        expense: String,
    },
}

/// Canonical category name, or `NotFound`
fn resolve_category(categories: &CategoryList<'_>, name: &str) -> CifraResult<String> {
    categories
        .find_by_name(name)
        .map(|c| c.name.clone())
        .ok_or_else(|| CifraError::category_not_found(name.trim()))
}

/// Handle an expense command
pub fn handle_expense_command(ctx: &AppContext, cmd: ExpenseCommands) -> CifraResult<()> {
    let (session, identity) = signed_in(ctx)?;
    let symbol = &ctx.settings.currency_symbol;

    match cmd {
        ExpenseCommands::Add {
            name,
            amount,
            category,
            expense_type,
            payment,
            installments,
            month,
        } => {
            let categories = CategoryList::open(&ctx.storage, identity.id);
            let mut input = NewExpense::new(
                name,
                resolve_category(&categories, &category)?,
                parse_money(&amount)?,
                parse_expense_type(&expense_type)?,
                parse_payment_method(&payment)?,
            );
            if let Some(n) = installments {
                if input.expense_type != ExpenseType::Installments {
                    return Err(CifraError::Validation(
                        "--installments only applies to expenses of type cuotas".into(),
                    ));
                }
                input = input.with_installments(n);
            }
            input
                .validate()
                .map_err(|e| CifraError::Validation(e.to_string()))?;

            let mut book = ExpenseBook::open(&ctx.storage, identity.id);
            if let Some(m) = month {
                book.change_month(parse_month(&m)?);
            }
            if !book.add_expense(&input, session.salary()) {
                return Err(write_failed("save the expense"));
            }

            let expense = &book.expenses()[0];
            println!(
                "Added {} to {}",
                expense.name,
                book.selected_month().label()
            );
            println!("  Amount: {}", expense.amount.format_with_symbol(symbol));
            if let Some(p) = expense.salary_percentage {
                println!("  Salary: {:.1}%", p);
            }
            println!("  ID:     {}", expense.id);
        }

        ExpenseCommands::List {
            month,
            search,
            limit,
        } => {
            let mut book = ExpenseBook::open(&ctx.storage, identity.id);
            let month = match month {
                Some(m) => parse_month(&m)?,
                None => book.selected_month(),
            };
            if month != book.selected_month() {
                book.load_expenses(month);
            }

            println!("{}", month.label());
            let shown = filter_expenses(book.expenses(), search.as_deref().unwrap_or(""));
            print!("{}", format_expense_table(&shown, symbol, limit));
        }

        ExpenseCommands::Show { expense } => {
            let expense = ExpenseService::new(&ctx.storage).resolve(identity.id, &expense)?;
            print!("{}", format_expense_details(&expense, symbol));
        }

        ExpenseCommands::Edit {
            expense,
            name,
            amount,
            category,
            expense_type,
            payment,
            installments,
        } => {
            let existing = ExpenseService::new(&ctx.storage).resolve(identity.id, &expense)?;

            let category = match category {
                Some(c) => Some(resolve_category(
                    &CategoryList::open(&ctx.storage, identity.id),
                    &c,
                )?),
                None => None,
            };
            let update = ExpenseUpdate {
                name,
                category,
                amount: amount.as_deref().map(parse_money).transpose()?,
                expense_type: expense_type.as_deref().map(parse_expense_type).transpose()?,
                payment_method: payment.as_deref().map(parse_payment_method).transpose()?,
                installments: installments.map(Some),
            };
            if update.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }

            let mut preview = existing.clone();
            preview.apply(&update, session.salary());
            preview
                .validate()
                .map_err(|e| CifraError::Validation(e.to_string()))?;

            let mut book = ExpenseBook::open(&ctx.storage, identity.id);
            if !book.update_expense(existing.id, &update, session.salary()) {
                return Err(write_failed("update the expense"));
            }

            println!("Updated expense: {}", preview.name);
            if update.amount.is_some_and(|a| a != existing.amount) {
                println!(
                    "  Amount: {} -> {}",
                    existing.amount.format_with_symbol(symbol),
                    preview.amount.format_with_symbol(symbol)
                );
            }
        }

        ExpenseCommands::Delete { expense } => {
            let existing = ExpenseService::new(&ctx.storage).resolve(identity.id, &expense)?;

            let mut book = ExpenseBook::open(&ctx.storage, identity.id);
            if !book.delete_expense(existing.id) {
                return Err(write_failed("delete the expense"));
            }
            println!(
                "Deleted {} ({}) from {}",
                existing.name,
                existing.amount.format_with_symbol(symbol),
                existing.month.label()
            );
        }
    }

    Ok(())
}
