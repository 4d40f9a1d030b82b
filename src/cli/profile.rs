//! Profile CLI commands

use clap::Subcommand;

use super::{parse_money, parse_salary_type, signed_in, write_failed};
use crate::display::format_profile;
use crate::error::{CifraError, CifraResult};
use crate::models::ProfileUpdate;
use crate::state::AppContext;

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show your profile
    Show,

    /// Change name, salary or salary type. Recorded expenses keep the salary
    /// share they were saved with.
    Edit {
        #[arg(short, long)]
        name: Option<String>,
        /// Monthly salary
        #[arg(short, long)]
        salary: Option<String>,
        /// fijo or variable
        #[arg(short = 't', long)]
        salary_type: Option<String>,
    },
}

/// Handle a profile command
pub fn handle_profile_command(ctx: &AppContext, cmd: ProfileCommands) -> CifraResult<()> {
    let (mut session, identity) = signed_in(ctx)?;
    let symbol = &ctx.settings.currency_symbol;

    match cmd {
        ProfileCommands::Show => {
            let profile = session
                .profile()
                .ok_or_else(|| CifraError::profile_not_found(identity.email.clone()))?;
            print!("{}", format_profile(profile, Some(&identity), symbol));
        }

        ProfileCommands::Edit {
            name,
            salary,
            salary_type,
        } => {
            let update = ProfileUpdate {
                name,
                salary: salary.as_deref().map(parse_money).transpose()?,
                salary_type: salary_type.as_deref().map(parse_salary_type).transpose()?,
                configured: None,
            };
            if update.is_empty() {
                println!("Nothing to change.");
                return Ok(());
            }
            update
                .validate()
                .map_err(|e| CifraError::Validation(e.to_string()))?;

            if !session.update_profile(&update) {
                return Err(write_failed("update the profile"));
            }
            println!("Profile updated.");
            if let Some(profile) = session.profile() {
                print!("{}", format_profile(profile, Some(&identity), symbol));
            }
        }
    }

    Ok(())
}
