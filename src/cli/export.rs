//! CLI commands for backup export and import
//!
//! `cifra export` writes a JSON backup of everything you own, or one
//! month's expenses as CSV. `cifra import` restores a JSON backup.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use super::{parse_month, signed_in};
use crate::error::{CifraError, CifraResult};
use crate::export::{backup_file_name, export_backup_json, export_expenses_csv, import_backup, BackupDocument};
use crate::models::UserId;
use crate::state::{AppContext, ExpenseBook};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Full JSON backup
    Json,
    /// One month's expenses
    Csv,
}

/// Options for `cifra export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file ("-" for stdout). Defaults to cifra-backup-YYYY-MM-DD.json
    /// or cifra-YYYY-MM.csv in the current directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Export format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,

    /// Month to export as CSV (YYYY-MM), defaults to the selected month
    #[arg(short, long)]
    pub month: Option<String>,
}

/// Options for `cifra import`
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Backup file to restore
    pub file: PathBuf,
}

fn open_output(output: &Path) -> CifraResult<Box<dyn Write>> {
    if output == Path::new("-") {
        return Ok(Box::new(io::stdout().lock()));
    }
    let file = File::create(output).map_err(|e| {
        CifraError::Export(format!(
            "Failed to create file {}: {}",
            output.display(),
            e
        ))
    })?;
    Ok(Box::new(BufWriter::new(file)))
}

fn export_json(ctx: &AppContext, user_id: UserId, output: Option<PathBuf>) -> CifraResult<()> {
    let output = output
        .unwrap_or_else(|| PathBuf::from(backup_file_name(chrono::Local::now().date_naive())));

    let mut writer = open_output(&output)?;
    export_backup_json(&ctx.storage, user_id, &mut writer)?;
    writer.flush()?;

    if output != Path::new("-") {
        println!("Backup exported to: {}", output.display());
    }
    Ok(())
}

fn export_csv(
    ctx: &AppContext,
    user_id: UserId,
    output: Option<PathBuf>,
    month: Option<String>,
) -> CifraResult<()> {
    let mut book = ExpenseBook::open(&ctx.storage, user_id);
    let month = match month {
        Some(m) => parse_month(&m)?,
        None => book.selected_month(),
    };
    if month != book.selected_month() {
        book.load_expenses(month);
    }

    let output = output.unwrap_or_else(|| PathBuf::from(format!("cifra-{}.csv", month)));
    let mut writer = open_output(&output)?;
    export_expenses_csv(book.expenses(), &mut writer)?;
    writer.flush()?;

    if output != Path::new("-") {
        println!(
            "Exported {} expense(s) of {} to: {}",
            book.expenses().len(),
            month.label(),
            output.display()
        );
    }
    Ok(())
}

/// Handle `cifra export`
pub fn handle_export_command(ctx: &AppContext, args: ExportArgs) -> CifraResult<()> {
    let (_session, identity) = signed_in(ctx)?;

    match args.format {
        ExportFormat::Json => {
            if args.month.is_some() {
                return Err(CifraError::Validation(
                    "--month only applies to CSV exports".into(),
                ));
            }
            export_json(ctx, identity.id, args.output)
        }
        ExportFormat::Csv => export_csv(ctx, identity.id, args.output, args.month),
    }
}

/// Handle `cifra import`
pub fn handle_import_command(ctx: &AppContext, args: ImportArgs) -> CifraResult<()> {
    let (_session, identity) = signed_in(ctx)?;

    let contents = fs::read_to_string(&args.file).map_err(|e| {
        CifraError::Import(format!("Failed to read {}: {}", args.file.display(), e))
    })?;
    let document = BackupDocument::parse(&contents)?;
    let summary = import_backup(&ctx.storage, identity.id, &document)?;

    println!("Imported {}", args.file.display());
    if summary.profile_updated {
        println!("  Profile updated");
    }
    if let Some(count) = summary.categories {
        println!("  Categories: {}", count);
    }
    for (month, count) in &summary.months {
        println!("  {}: {} expense(s)", month.label(), count);
    }
    Ok(())
}
