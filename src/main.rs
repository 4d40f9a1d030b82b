use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use cifra::cli::{
    handle_audit_command, handle_category_command, handle_dashboard_command,
    handle_expense_command, handle_export_command, handle_home_command, handle_import_command,
    handle_login_command, handle_logout_command, handle_month_command, handle_profile_command,
    handle_setup_command, handle_whoami_command,
};
use cifra::config::{CifraPaths, Settings};
use cifra::state::AppContext;

#[derive(Parser)]
#[command(
    name = "cifra",
    version,
    about = "Personal expense tracker with monthly salary summaries",
    long_about = "Cifra records your expenses month by month, grouped by category, \
                  and shows how much of your salary they take."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login(cifra::cli::LoginArgs),

    /// Sign out and clear the session
    Logout,

    /// Show who is signed in
    Whoami,

    /// Set your name and salary
    Setup(cifra::cli::SetupArgs),

    /// Show the dashboard
    #[command(alias = "dash")]
    Dashboard(cifra::cli::DashboardArgs),

    /// Expense commands
    #[command(subcommand, alias = "exp")]
    Expense(cifra::cli::ExpenseCommands),

    /// Month commands
    #[command(subcommand)]
    Month(cifra::cli::MonthCommands),

    /// Category commands
    #[command(subcommand, alias = "cat")]
    Category(cifra::cli::CategoryCommands),

    /// Profile commands
    #[command(subcommand)]
    Profile(cifra::cli::ProfileCommands),

    /// Export a backup (JSON) or a month (CSV)
    Export(cifra::cli::ExportArgs),

    /// Restore a JSON backup
    Import(cifra::cli::ImportArgs),

    /// Show recent changes to your data
    Audit(cifra::cli::AuditArgs),

    /// Show current configuration and paths
    Config,
}

/// Diagnostic logs go to a daily file under `logs/`. `CIFRA_LOG` overrides
/// the filter from the settings file.
fn init_logging(paths: &CifraPaths, settings: &Settings) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let logs_dir = paths.logs_dir();
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "cifra.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_env("CIFRA_LOG")
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = CifraPaths::new()?;
    paths.ensure_directories()?;
    let settings = Settings::load_or_create(&paths)?;

    // The guard must live until the process exits
    let _log_guard = init_logging(&paths, &settings);
    info!(version = env!("CARGO_PKG_VERSION"), "cifra starting");

    let ctx = AppContext::load(paths)?;

    match cli.command {
        Some(Commands::Login(args)) => handle_login_command(&ctx, args)?,
        Some(Commands::Logout) => handle_logout_command(&ctx)?,
        Some(Commands::Whoami) => handle_whoami_command(&ctx)?,
        Some(Commands::Setup(args)) => handle_setup_command(&ctx, args)?,
        Some(Commands::Dashboard(args)) => handle_dashboard_command(&ctx, args)?,
        Some(Commands::Expense(cmd)) => handle_expense_command(&ctx, cmd)?,
        Some(Commands::Month(cmd)) => handle_month_command(&ctx, cmd)?,
        Some(Commands::Category(cmd)) => handle_category_command(&ctx, cmd)?,
        Some(Commands::Profile(cmd)) => handle_profile_command(&ctx, cmd)?,
        Some(Commands::Export(args)) => handle_export_command(&ctx, args)?,
        Some(Commands::Import(args)) => handle_import_command(&ctx, args)?,
        Some(Commands::Audit(args)) => handle_audit_command(&ctx, args)?,
        Some(Commands::Config) => {
            let paths = &ctx.paths;
            let settings = &ctx.settings;
            println!("Cifra Configuration");
            println!("===================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Logs directory:  {}", paths.logs_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  List limit:      {}", settings.list_limit);
            println!(
                "  Site URL:        {}",
                settings.site_url.as_deref().unwrap_or("(request origin)")
            );
            println!("  Log filter:      {}", settings.log_filter);
        }
        None => handle_home_command(&ctx)?,
    }

    Ok(())
}
