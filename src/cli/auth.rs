//! Sign-in commands
//!
//! `login` stands in for the OAuth round trip: the identity the provider
//! would return is given on the command line. Signing in again with the
//! same email reuses the existing profile.

use clap::Args;

use super::{signed_in, write_failed};
use crate::auth::Identity;
use crate::error::{CifraError, CifraResult};
use crate::models::UserId;
use crate::state::{AppContext, Screen};

/// Identity details for `cifra login`
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long, env = "CIFRA_EMAIL")]
    pub email: String,

    /// Provider `name` metadata
    #[arg(long)]
    pub name: Option<String>,

    /// Provider `full_name` metadata (preferred over --name)
    #[arg(long)]
    pub full_name: Option<String>,

    /// Provider `avatar_url` metadata
    #[arg(long)]
    pub avatar_url: Option<String>,
}

fn identity_from_args(ctx: &AppContext, args: &LoginArgs) -> CifraResult<Identity> {
    let email = args.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(CifraError::Validation(format!(
            "'{}' is not an email address",
            args.email
        )));
    }

    let id = ctx
        .storage
        .users
        .get_by_email(&email)?
        .map(|profile| profile.id)
        .unwrap_or_else(UserId::new);

    let mut identity = Identity::new(id, email);
    if let Some(name) = &args.name {
        identity = identity.with_metadata("name", name.as_str());
    }
    if let Some(full_name) = &args.full_name {
        identity = identity.with_metadata("full_name", full_name.as_str());
    }
    if let Some(avatar_url) = &args.avatar_url {
        identity = identity.with_metadata("avatar_url", avatar_url.as_str());
    }
    Ok(identity)
}

/// Handle `cifra login`
pub fn handle_login_command(ctx: &AppContext, args: LoginArgs) -> CifraResult<()> {
    let identity = identity_from_args(ctx, &args)?;

    let mut session = ctx.session();
    if !session.sign_in(identity) {
        return Err(write_failed("sign in"));
    }

    let name = session
        .profile()
        .map(|p| p.display_name().to_string())
        .unwrap_or_default();
    println!("Signed in as {} ({})", name, args.email.trim());

    if ctx.screen(&session) == Screen::Setup {
        println!();
        println!("Your profile is not configured yet.");
        println!("Run 'cifra setup' to set your salary.");
    }
    Ok(())
}

/// Handle `cifra logout`
pub fn handle_logout_command(ctx: &AppContext) -> CifraResult<()> {
    let mut session = ctx.session();
    let was_signed_in = session.is_authenticated();
    session.sign_out();

    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

/// Handle `cifra whoami`
pub fn handle_whoami_command(ctx: &AppContext) -> CifraResult<()> {
    let (session, identity) = signed_in(ctx)?;

    println!("{}", identity.email);
    if let Some(profile) = session.profile() {
        println!("  Name:       {}", profile.display_name());
        println!(
            "  Configured: {}",
            if profile.configured { "Yes" } else { "No" }
        );
    }
    if let Some(avatar) = session.avatar_url() {
        println!("  Avatar:     {}", avatar);
    }
    println!("  ID:         {}", identity.id);
    Ok(())
}
