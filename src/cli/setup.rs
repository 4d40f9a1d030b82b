//! First-run setup
//!
//! Records the name, salary and salary type and marks the profile as
//! configured. Values not given as flags are asked for on stdin.

use std::io::{self, BufRead, Write};

use clap::Args;

use super::{parse_money, parse_salary_type, signed_in, write_failed};
use crate::error::{CifraError, CifraResult};
use crate::models::{Money, SalaryType};
use crate::state::AppContext;

/// Setup values; missing ones are prompted for
#[derive(Args, Debug, Default)]
pub struct SetupArgs {
    /// Name to greet you with
    #[arg(long)]
    pub name: Option<String>,

    /// Monthly salary (e.g. "500000" or "$ 500.000,00")
    #[arg(long)]
    pub salary: Option<String>,

    /// fijo or variable
    #[arg(long)]
    pub salary_type: Option<String>,
}

/// Prompt for a line; an empty answer or closed stdin gives `None`
fn prompt<R: BufRead>(input: &mut R, prompt: &str) -> CifraResult<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let line = line.trim();
    Ok((!line.is_empty()).then(|| line.to_string()))
}

/// Fill in missing setup values from `input`
fn collect<R: BufRead>(
    args: SetupArgs,
    default_name: &str,
    input: &mut R,
) -> CifraResult<(String, Money, SalaryType)> {
    let name = match args.name {
        Some(name) => name,
        None => prompt(input, &format!("Name [{}]: ", default_name))?
            .unwrap_or_else(|| default_name.to_string()),
    };

    let salary = match args.salary {
        Some(salary) => salary,
        None => prompt(input, "Monthly salary: ")?
            .ok_or_else(|| CifraError::Validation("A salary is required".into()))?,
    };
    let salary = parse_money(&salary)?;

    let salary_type = match args.salary_type {
        Some(t) => parse_salary_type(&t)?,
        None => match prompt(input, "Salary type (fijo/variable) [fijo]: ")? {
            Some(t) => parse_salary_type(&t)?,
            None => SalaryType::Fixed,
        },
    };

    if name.trim().is_empty() {
        return Err(CifraError::Validation("Name cannot be empty".into()));
    }
    if !salary.is_positive() {
        return Err(CifraError::Validation("Salary must be greater than zero".into()));
    }

    Ok((name, salary, salary_type))
}

/// Handle `cifra setup`
pub fn handle_setup_command(ctx: &AppContext, args: SetupArgs) -> CifraResult<()> {
    let (mut session, _identity) = signed_in(ctx)?;

    let default_name = session
        .profile()
        .map(|p| p.display_name().to_string())
        .unwrap_or_default();

    let stdin = io::stdin();
    let (name, salary, salary_type) = collect(args, &default_name, &mut stdin.lock())?;

    if !session.complete_setup(&name, salary, salary_type) {
        return Err(write_failed("save the profile"));
    }

    println!("Profile configured.");
    println!("  Name:   {}", name.trim());
    println!(
        "  Salary: {} ({})",
        salary.format_with_symbol(&ctx.settings.currency_symbol),
        salary_type
    );
    println!();
    println!("Run 'cifra' to see your dashboard.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_flags_skip_prompts() {
        let args = SetupArgs {
            name: Some("Ana".into()),
            salary: Some("50000".into()),
            salary_type: Some("variable".into()),
        };
        let mut input = Cursor::new("");
        let (name, salary, salary_type) = collect(args, "Usuario", &mut input).unwrap();

        assert_eq!(name, "Ana");
        assert_eq!(salary, Money::from_units(50000));
        assert_eq!(salary_type, SalaryType::Variable);
    }

    #[test]
    fn test_prompts_fill_missing_values() {
        let mut input = Cursor::new("\n75000\n\n");
        let (name, salary, salary_type) =
            collect(SetupArgs::default(), "Ana García", &mut input).unwrap();

        assert_eq!(name, "Ana García");
        assert_eq!(salary, Money::from_units(75000));
        assert_eq!(salary_type, SalaryType::Fixed);
    }

    #[test]
    fn test_salary_required() {
        let mut input = Cursor::new("Ana\n");
        let err = collect(SetupArgs::default(), "Usuario", &mut input).unwrap_err();
        assert!(err.is_validation());

        let args = SetupArgs {
            salary: Some("0".into()),
            ..Default::default()
        };
        let err = collect(args, "Usuario", &mut Cursor::new("")).unwrap_err();
        assert!(err.is_validation());
    }
}
