//! Dashboard command and the bare `cifra` home screen

use clap::Args;

use super::{parse_month, signed_in};
use crate::aggregate::{by_category, by_type, filter_expenses, monthly_trend, MonthSummary};
use crate::display::{
    format_category_table, format_expense_table, format_month_list, format_overview,
    format_profile, format_trend,
};
use crate::error::CifraResult;
use crate::models::{MonthKey, UserId};
use crate::services::{ExpenseService, MonthStats};
use crate::state::{AppContext, CategoryList, ExpenseBook, Screen, Section, SessionState};

/// Dashboard options
#[derive(Args, Debug, Default)]
pub struct DashboardArgs {
    /// Section to show
    #[arg(short, long, value_enum, default_value_t = Section::Overview)]
    pub section: Section,

    /// Only list expenses whose name or category contains this text
    #[arg(long)]
    pub search: Option<String>,

    /// Month to show (YYYY-MM), without changing the selected month
    #[arg(short, long)]
    pub month: Option<String>,
}

/// Handle a bare `cifra`: show whichever screen the session is on
pub fn handle_home_command(ctx: &AppContext) -> CifraResult<()> {
    let session = ctx.session();

    match ctx.screen(&session) {
        Screen::Landing => {
            println!("Cifra - control your monthly expenses");
            println!();
            println!("Sign in to start:");
            println!("  cifra login --email you@example.com");
            println!();
            println!("Run 'cifra --help' for usage information.");
            Ok(())
        }
        Screen::Setup => {
            let name = session
                .profile()
                .map(|p| p.display_name().to_string())
                .unwrap_or_default();
            println!("Welcome, {}!", name);
            println!();
            println!("Before tracking expenses, tell Cifra your monthly salary:");
            println!("  cifra setup --salary 500000 --salary-type fijo");
            Ok(())
        }
        Screen::Dashboard => handle_dashboard_command(ctx, DashboardArgs::default()),
    }
}

/// Handle `cifra dashboard`
pub fn handle_dashboard_command(ctx: &AppContext, args: DashboardArgs) -> CifraResult<()> {
    let (session, identity) = signed_in(ctx)?;
    let mut book = ExpenseBook::open(&ctx.storage, identity.id);

    let month = match &args.month {
        Some(m) => parse_month(m)?,
        None => book.selected_month(),
    };
    if month != book.selected_month() {
        book.load_expenses(month);
    }

    let name = session
        .profile()
        .map(|p| p.display_name().to_string())
        .unwrap_or_default();
    println!("Hola, {}  ·  {}", name, args.section);
    println!();

    match args.section {
        Section::Overview => {
            show_overview(ctx, &session, &book, identity.id, month, args.search.as_deref())
        }
        Section::Months => {
            let stats = month_stats(&book);
            print!(
                "{}",
                format_month_list(&stats, book.selected_month(), &ctx.settings.currency_symbol)
            );
            Ok(())
        }
        Section::Categories => {
            let categories = CategoryList::open(&ctx.storage, identity.id);
            let expenses = ExpenseService::new(&ctx.storage).list_all(identity.id)?;
            print!("{}", format_category_table(categories.categories(), &expenses));
            Ok(())
        }
        Section::Settings => {
            if let Some(profile) = session.profile() {
                print!(
                    "{}",
                    format_profile(profile, Some(&identity), &ctx.settings.currency_symbol)
                );
            }
            println!();
            println!("Data directory: {}", ctx.paths.base_dir().display());
            Ok(())
        }
    }
}

fn month_stats(book: &ExpenseBook<'_>) -> Vec<MonthStats> {
    book.available_months()
        .iter()
        .filter_map(|&m| book.month_stats(m))
        .collect()
}

fn show_overview(
    ctx: &AppContext,
    session: &SessionState<'_>,
    book: &ExpenseBook<'_>,
    user_id: UserId,
    month: MonthKey,
    search: Option<&str>,
) -> CifraResult<()> {
    let symbol = &ctx.settings.currency_symbol;
    let salary = session.salary();
    let expenses = book.expenses();

    let categories = CategoryList::open(&ctx.storage, user_id);

    let summary = MonthSummary::compute(month, expenses, salary);
    print!(
        "{}",
        format_overview(
            &summary,
            &by_category(expenses, categories.categories()),
            &by_type(expenses),
            salary,
            symbol,
        )
    );

    let totals: Vec<_> = month_stats(book).iter().map(|s| (s.month, s.total)).collect();
    let trend = monthly_trend(&totals, salary);
    if trend.len() > 1 {
        println!();
        print!("{}", format_trend(&trend, symbol));
    }

    println!();
    let term = search.unwrap_or("");
    if !term.trim().is_empty() {
        println!("Buscando \"{}\"", term.trim());
    }
    let shown = filter_expenses(expenses, term);
    print!(
        "{}",
        format_expense_table(&shown, symbol, Some(ctx.settings.list_limit))
    );
    Ok(())
}
